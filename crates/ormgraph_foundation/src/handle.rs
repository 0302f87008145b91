//! Opaque handles to application types and members.
//!
//! The metadata graph stores these for the embedding application and hands
//! them back unchanged; it never inspects the payload.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to the application type backing a structural type.
///
/// Two handles are equal when their names and property-bag flags match.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HostType {
    name: Arc<str>,
    property_bag: bool,
}

impl HostType {
    /// Name of the canonical dictionary-backed host type.
    pub const PROPERTY_BAG_NAME: &'static str = "Dictionary<string, object>";

    /// Creates a handle for a named application type.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            property_bag: false,
        }
    }

    /// Returns the canonical property-bag host type.
    #[must_use]
    pub fn property_bag() -> Self {
        Self {
            name: Arc::from(Self::PROPERTY_BAG_NAME),
            property_bag: true,
        }
    }

    /// Returns the full name of the host type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if instances are dictionaries keyed by member name.
    #[must_use]
    pub const fn is_property_bag(&self) -> bool {
        self.property_bag
    }

    /// Returns the name without namespace qualifiers or generic arguments.
    ///
    /// `App.Models.Order` becomes `Order`, `Outer+Inner` becomes `Inner`,
    /// `Wrapper<T>` and ``Wrapper`1`` become `Wrapper`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

/// Strips namespace separators (`.`, `+`, `::`) and generic decorations.
#[must_use]
pub fn short_name(name: &str) -> &str {
    let without_generics = name
        .find(['<', '`'])
        .map_or(name, |end| &name[..end]);
    let start = without_generics
        .rfind(['.', '+', ':'])
        .map_or(0, |i| i + 1);
    &without_generics[start..]
}

impl fmt::Debug for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostType({})", self.name)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// What kind of application member a [`MemberHandle`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemberKind {
    /// A property with accessors.
    Property,
    /// A backing field.
    Field,
    /// A catch-all indexer taking the member name.
    Indexer,
}

/// Opaque handle to an application member (accessor, field or indexer).
///
/// Handles compare by identity of their payload, so two handles created
/// separately for the same member name are distinct.
#[derive(Clone)]
pub struct MemberHandle {
    kind: MemberKind,
    name: Arc<str>,
    token: Arc<dyn Any + Send + Sync>,
}

impl MemberHandle {
    /// Creates a handle carrying an application payload.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(kind: MemberKind, name: impl AsRef<str>, token: T) -> Self {
        Self {
            kind,
            name: Arc::from(name.as_ref()),
            token: Arc::new(token),
        }
    }

    /// Creates a handle with no payload.
    #[must_use]
    pub fn opaque(kind: MemberKind, name: impl AsRef<str>) -> Self {
        Self::new(kind, name, ())
    }

    /// Returns the member kind.
    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Returns the member name as given by the application.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload if it has type `T`.
    #[must_use]
    pub fn token<T: Any>(&self) -> Option<&T> {
        self.token.downcast_ref::<T>()
    }
}

impl PartialEq for MemberHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for MemberHandle {}

impl Hash for MemberHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.token).cast::<()>() as usize).hash(state);
    }
}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.name)
    }
}
