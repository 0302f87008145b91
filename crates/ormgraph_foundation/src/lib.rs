//! Core values, type descriptors, errors and annotations for ormgraph.
//!
//! This crate provides:
//! - [`Value`] - Tagged value union for annotation payloads and converters
//! - [`ValueType`] - Type descriptors for scalar members
//! - [`HostType`] / [`MemberHandle`] - Opaque handles to application types and members
//! - [`Error`] - Rich error types with context
//! - [`Annotations`] / [`RuntimeAnnotations`] - The two annotation tiers
//! - [`LazyCell`] - Lock-free compute-once cells

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod annotation;
pub mod error;
pub mod handle;
pub mod lazy;
pub mod types;
pub mod value;

pub use annotation::{Annotatable, Annotation, Annotations, RuntimeAnnotations, RuntimeValue};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use handle::{HostType, MemberHandle, MemberKind};
pub use lazy::LazyCell;
pub use types::ValueType;
pub use value::Value;
