//! ormgraph - Runtime metadata graph for an object-relational mapper
//!
//! This crate re-exports all layers of the ormgraph system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: ormgraph_metadata - Model builder, frozen model, node views
//! Layer 0: ormgraph_foundation - Core types (Value, ValueType, Error, annotations)
//! ```

pub use ormgraph_foundation as foundation;
pub use ormgraph_metadata as metadata;
