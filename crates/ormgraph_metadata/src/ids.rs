//! Typed arena identifiers for graph nodes.
//!
//! Every node lives in a per-kind arena owned by the model; ids are indexes
//! into those arenas. Ids are never reused within one model, so an id of a
//! removed node simply stops resolving.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Returns the raw arena index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ArenaId for $name {
            fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

/// Conversion between typed ids and arena slots.
pub(crate) trait ArenaId: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

define_id!(
    /// Identifies an entity type.
    EntityTypeId
);
define_id!(
    /// Identifies a complex type.
    ComplexTypeId
);
define_id!(
    /// Identifies a scalar property.
    PropertyId
);
define_id!(
    /// Identifies a complex property.
    ComplexPropertyId
);
define_id!(
    /// Identifies a primary or alternate key.
    KeyId
);
define_id!(
    /// Identifies a foreign key.
    ForeignKeyId
);
define_id!(
    /// Identifies a navigation.
    NavigationId
);
define_id!(
    /// Identifies a skip navigation.
    SkipNavigationId
);
define_id!(
    /// Identifies an index.
    IndexId
);
define_id!(
    /// Identifies a service property.
    ServicePropertyId
);
define_id!(
    /// Identifies a trigger.
    TriggerId
);

/// Identifies a structural type of either kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum StructuralTypeId {
    /// An entity type.
    Entity(EntityTypeId),
    /// A complex type.
    Complex(ComplexTypeId),
}

impl StructuralTypeId {
    /// Returns the entity type id, if this is an entity type.
    #[must_use]
    pub const fn as_entity(self) -> Option<EntityTypeId> {
        match self {
            Self::Entity(id) => Some(id),
            Self::Complex(_) => None,
        }
    }

    /// Returns the complex type id, if this is a complex type.
    #[must_use]
    pub const fn as_complex(self) -> Option<ComplexTypeId> {
        match self {
            Self::Complex(id) => Some(id),
            Self::Entity(_) => None,
        }
    }
}

impl From<EntityTypeId> for StructuralTypeId {
    fn from(id: EntityTypeId) -> Self {
        Self::Entity(id)
    }
}

impl From<ComplexTypeId> for StructuralTypeId {
    fn from(id: ComplexTypeId) -> Self {
        Self::Complex(id)
    }
}

/// Identifies any annotatable node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeId {
    /// The model itself.
    Model,
    /// An entity type.
    EntityType(EntityTypeId),
    /// A complex type.
    ComplexType(ComplexTypeId),
    /// A scalar property.
    Property(PropertyId),
    /// The element type of a primitive collection property.
    ElementType(PropertyId),
    /// A complex property.
    ComplexProperty(ComplexPropertyId),
    /// A key.
    Key(KeyId),
    /// A foreign key.
    ForeignKey(ForeignKeyId),
    /// A navigation.
    Navigation(NavigationId),
    /// A skip navigation.
    SkipNavigation(SkipNavigationId),
    /// An index.
    Index(IndexId),
    /// A service property.
    ServiceProperty(ServicePropertyId),
    /// A trigger.
    Trigger(TriggerId),
}

macro_rules! node_from {
    ($($id:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$id> for NodeId {
                fn from(id: $id) -> Self {
                    Self::$variant(id)
                }
            }
        )*
    };
}

node_from!(
    EntityTypeId => EntityType,
    ComplexTypeId => ComplexType,
    PropertyId => Property,
    ComplexPropertyId => ComplexProperty,
    KeyId => Key,
    ForeignKeyId => ForeignKey,
    NavigationId => Navigation,
    SkipNavigationId => SkipNavigation,
    IndexId => Index,
    ServicePropertyId => ServiceProperty,
    TriggerId => Trigger,
);

impl From<StructuralTypeId> for NodeId {
    fn from(id: StructuralTypeId) -> Self {
        match id {
            StructuralTypeId::Entity(id) => Self::EntityType(id),
            StructuralTypeId::Complex(id) => Self::ComplexType(id),
        }
    }
}
