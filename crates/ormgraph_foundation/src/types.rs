//! Value type descriptors for scalar members.
//!
//! A [`ValueType`] names the in-memory type of a property, element or
//! converter side. The core never interprets application types beyond their
//! name; the primitive kinds exist so that type-mapping sources and default
//! comparers have something concrete to dispatch on.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor of a scalar member.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Fixed-point decimal.
    Decimal,
    /// Text.
    String,
    /// Binary blob.
    Bytes,
    /// 128-bit identifier.
    Guid,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time without offset.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
    /// Duration.
    TimeSpan,
    /// Application-defined type, identified by name.
    Named(Arc<str>),
    /// Nullable wrapper around a non-nullable type.
    Nullable(Box<ValueType>),
    /// Collection of elements.
    Collection(Box<ValueType>),
}

impl ValueType {
    /// Creates an application-defined type.
    #[must_use]
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(Arc::from(name.as_ref()))
    }

    /// Wraps a type as nullable. Already-nullable types are returned unchanged.
    #[must_use]
    pub fn nullable(inner: ValueType) -> Self {
        match inner {
            Self::Nullable(_) => inner,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Creates a collection type with the given element type.
    #[must_use]
    pub fn collection(element: ValueType) -> Self {
        Self::Collection(Box::new(element))
    }

    /// Returns true if values of this type may be null.
    ///
    /// Reference-like types (strings, blobs, application types and
    /// collections) are nullable; primitive value kinds only when wrapped.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(
            self,
            Self::Nullable(_) | Self::String | Self::Bytes | Self::Named(_) | Self::Collection(_)
        )
    }

    /// Strips one level of `Nullable`.
    #[must_use]
    pub fn unwrap_nullable(&self) -> &ValueType {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Returns the element type of a collection.
    #[must_use]
    pub fn element_type(&self) -> Option<&ValueType> {
        match self.unwrap_nullable() {
            Self::Collection(element) => Some(element),
            _ => None,
        }
    }

    /// Returns true for integral kinds.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self.unwrap_nullable(),
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    /// Short human-readable name used in debug views.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{self}")
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int8 => write!(f, "i8"),
            Self::Int16 => write!(f, "i16"),
            Self::Int32 => write!(f, "i32"),
            Self::Int64 => write!(f, "i64"),
            Self::UInt8 => write!(f, "u8"),
            Self::UInt16 => write!(f, "u16"),
            Self::UInt32 => write!(f, "u32"),
            Self::UInt64 => write!(f, "u64"),
            Self::Float32 => write!(f, "f32"),
            Self::Float64 => write!(f, "f64"),
            Self::Decimal => write!(f, "decimal"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Guid => write!(f, "guid"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::DateTime => write!(f, "datetime"),
            Self::DateTimeOffset => write!(f, "datetimeoffset"),
            Self::TimeSpan => write!(f, "timespan"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Collection(element) => write!(f, "[{element}]"),
        }
    }
}
