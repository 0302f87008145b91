//! Definitions for graph nodes.
//!
//! Definitions describe a node before it is added to a
//! [`ModelBuilder`](crate::ModelBuilder). Fields default to the most common
//! configuration; chain `with_*` calls to override.

use std::sync::Arc;

use ormgraph_foundation::{HostType, MemberHandle, Value, ValueType};

use crate::conversion::{JsonValueReaderWriter, ValueComparer, ValueConverter};
use crate::ids::EntityTypeId;
use crate::mapping::TypeMapping;
use crate::options::{ChangeTrackingStrategy, PropertyAccessMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Behavior Enums
// =============================================================================

/// When the store generates a value for a property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueGenerated {
    /// Never generated.
    #[default]
    Never,
    /// Generated when the instance is inserted.
    OnAdd,
    /// Generated when the instance is updated.
    OnUpdate,
    /// Generated on some updates.
    OnUpdateSometimes,
    /// Generated on insert and update.
    OnAddOrUpdate,
}

/// What happens to a property value when saving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertySaveBehavior {
    /// The value is saved.
    #[default]
    Save,
    /// The value is ignored.
    Ignore,
    /// Saving a modified value is an error.
    Throw,
}

/// What happens to dependents when the principal is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeleteBehavior {
    /// Tracked dependents have their foreign key set to null.
    #[default]
    ClientSetNull,
    /// Deletion is refused while dependents exist.
    Restrict,
    /// Dependents have their foreign key set to null.
    SetNull,
    /// Dependents are deleted.
    Cascade,
    /// Tracked dependents are deleted.
    ClientCascade,
    /// No action is taken.
    NoAction,
    /// No action is taken for tracked dependents.
    ClientNoAction,
}

// =============================================================================
// Entity Types
// =============================================================================

/// Definition of an entity type.
#[derive(Clone, Debug)]
pub struct EntityTypeDef {
    /// Model-unique name.
    pub name: String,
    /// Backing application type.
    pub host_type: HostType,
    /// Base entity type.
    pub base_type: Option<EntityTypeId>,
    /// Whether several entity types share the host type.
    pub shared_host_type: bool,
    /// Whether the type has no primary key.
    pub keyless: bool,
    /// Name of the discriminator property; root types only.
    pub discriminator_property: Option<String>,
    /// Discriminator value of this type.
    pub discriminator_value: Option<Value>,
    /// Change tracking strategy; the model default when unset.
    pub change_tracking_strategy: Option<ChangeTrackingStrategy>,
    /// Property access mode; the model default when unset.
    pub property_access_mode: Option<PropertyAccessMode>,
    /// Indexer of the host type.
    pub indexer: Option<MemberHandle>,
}

impl EntityTypeDef {
    /// Creates a definition backed by `host_type`.
    #[must_use]
    pub fn new(name: impl Into<String>, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            host_type,
            base_type: None,
            shared_host_type: false,
            keyless: false,
            discriminator_property: None,
            discriminator_value: None,
            change_tracking_strategy: None,
            property_access_mode: None,
            indexer: None,
        }
    }

    /// Creates a definition whose host type has the same name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let host = HostType::new(&name);
        Self::new(name, host)
    }

    /// Creates a shared-type definition backed by a property bag.
    #[must_use]
    pub fn property_bag(name: impl Into<String>, indexer: MemberHandle) -> Self {
        Self::new(name, HostType::property_bag())
            .with_shared_host_type(true)
            .with_indexer(indexer)
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base_type(mut self, base: EntityTypeId) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Sets whether the host type is shared.
    #[must_use]
    pub fn with_shared_host_type(mut self, shared: bool) -> Self {
        self.shared_host_type = shared;
        self
    }

    /// Marks the type as keyless.
    #[must_use]
    pub fn keyless(mut self) -> Self {
        self.keyless = true;
        self
    }

    /// Sets the discriminator property name.
    #[must_use]
    pub fn with_discriminator_property(mut self, name: impl Into<String>) -> Self {
        self.discriminator_property = Some(name.into());
        self
    }

    /// Sets the discriminator value.
    #[must_use]
    pub fn with_discriminator_value(mut self, value: impl Into<Value>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }

    /// Sets the change tracking strategy.
    #[must_use]
    pub fn with_change_tracking_strategy(mut self, strategy: ChangeTrackingStrategy) -> Self {
        self.change_tracking_strategy = Some(strategy);
        self
    }

    /// Sets the property access mode.
    #[must_use]
    pub fn with_property_access_mode(mut self, mode: PropertyAccessMode) -> Self {
        self.property_access_mode = Some(mode);
        self
    }

    /// Sets the host type's indexer.
    #[must_use]
    pub fn with_indexer(mut self, indexer: MemberHandle) -> Self {
        self.indexer = Some(indexer);
        self
    }
}

// =============================================================================
// Properties
// =============================================================================

/// Strategy objects and facets shared by properties and element types.
#[derive(Clone, Debug, Default)]
pub struct ValueFacets {
    /// Maximum length.
    pub max_length: Option<i64>,
    /// Whether string data is Unicode.
    pub unicode: Option<bool>,
    /// Numeric precision.
    pub precision: Option<i64>,
    /// Numeric scale.
    pub scale: Option<i64>,
    /// Storage value type.
    pub provider_type: Option<ValueType>,
    /// Converter.
    pub converter: Option<Arc<ValueConverter>>,
    /// Custom value comparer.
    pub value_comparer: Option<Arc<ValueComparer>>,
    /// JSON reader/writer.
    pub json_reader_writer: Option<Arc<dyn JsonValueReaderWriter>>,
    /// Explicit type mapping.
    pub type_mapping: Option<TypeMapping>,
}

/// Definition of a scalar property.
#[derive(Clone, Debug)]
pub struct PropertyDef {
    /// Name, unique among the declaring type's members.
    pub name: String,
    /// Value type.
    pub value_type: ValueType,
    /// Whether null is allowed.
    pub nullable: bool,
    /// Application member; `None` for shadow properties.
    pub member: Option<MemberHandle>,
    /// Whether the property takes part in optimistic concurrency.
    pub concurrency_token: bool,
    /// When the store generates values.
    pub value_generated: ValueGenerated,
    /// Save behavior before the instance is first saved.
    pub before_save: PropertySaveBehavior,
    /// Save behavior afterwards.
    pub after_save: PropertySaveBehavior,
    /// Access mode; the declaring type's when unset.
    pub property_access_mode: Option<PropertyAccessMode>,
    /// Value treated as "not set".
    pub sentinel: Value,
    /// Facets and strategies.
    pub facets: ValueFacets,
    /// Custom key comparer.
    pub key_comparer: Option<Arc<ValueComparer>>,
    /// Custom provider value comparer.
    pub provider_value_comparer: Option<Arc<ValueComparer>>,
}

impl PropertyDef {
    /// Creates a property definition; nullability follows the value type.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            nullable: value_type.is_nullable(),
            value_type,
            member: None,
            concurrency_token: false,
            value_generated: ValueGenerated::Never,
            before_save: PropertySaveBehavior::Save,
            after_save: PropertySaveBehavior::Save,
            property_access_mode: None,
            sentinel: Value::Null,
            facets: ValueFacets::default(),
            key_comparer: None,
            provider_value_comparer: None,
        }
    }

    /// Sets whether null is allowed.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the application member.
    #[must_use]
    pub fn with_member(mut self, member: MemberHandle) -> Self {
        self.member = Some(member);
        self
    }

    /// Marks the property as a concurrency token.
    #[must_use]
    pub fn concurrency_token(mut self) -> Self {
        self.concurrency_token = true;
        self
    }

    /// Sets when values are generated.
    #[must_use]
    pub fn with_value_generated(mut self, value_generated: ValueGenerated) -> Self {
        self.value_generated = value_generated;
        self
    }

    /// Sets the before-save behavior.
    #[must_use]
    pub fn with_before_save(mut self, behavior: PropertySaveBehavior) -> Self {
        self.before_save = behavior;
        self
    }

    /// Sets the after-save behavior.
    #[must_use]
    pub fn with_after_save(mut self, behavior: PropertySaveBehavior) -> Self {
        self.after_save = behavior;
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_property_access_mode(mut self, mode: PropertyAccessMode) -> Self {
        self.property_access_mode = Some(mode);
        self
    }

    /// Sets the sentinel value.
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: impl Into<Value>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.facets.max_length = Some(max_length);
        self
    }

    /// Sets whether string data is Unicode.
    #[must_use]
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.facets.unicode = Some(unicode);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub fn with_precision(mut self, precision: i64, scale: Option<i64>) -> Self {
        self.facets.precision = Some(precision);
        self.facets.scale = scale;
        self
    }

    /// Sets the storage value type.
    #[must_use]
    pub fn with_provider_type(mut self, provider_type: ValueType) -> Self {
        self.facets.provider_type = Some(provider_type);
        self
    }

    /// Sets the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<ValueConverter>) -> Self {
        self.facets.converter = Some(converter);
        self
    }

    /// Sets a custom value comparer.
    #[must_use]
    pub fn with_value_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.facets.value_comparer = Some(comparer);
        self
    }

    /// Sets a custom key comparer.
    #[must_use]
    pub fn with_key_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.key_comparer = Some(comparer);
        self
    }

    /// Sets a custom provider value comparer.
    #[must_use]
    pub fn with_provider_value_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.provider_value_comparer = Some(comparer);
        self
    }

    /// Sets the JSON reader/writer.
    #[must_use]
    pub fn with_json_reader_writer(mut self, rw: Arc<dyn JsonValueReaderWriter>) -> Self {
        self.facets.json_reader_writer = Some(rw);
        self
    }

    /// Sets an explicit type mapping.
    #[must_use]
    pub fn with_type_mapping(mut self, mapping: TypeMapping) -> Self {
        self.facets.type_mapping = Some(mapping);
        self
    }
}

/// Definition of the element type of a primitive collection property.
#[derive(Clone, Debug)]
pub struct ElementTypeDef {
    /// Element value type.
    pub value_type: ValueType,
    /// Whether elements may be null.
    pub nullable: bool,
    /// Facets and strategies.
    pub facets: ValueFacets,
}

impl ElementTypeDef {
    /// Creates an element definition; nullability follows the value type.
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        Self {
            nullable: value_type.is_nullable(),
            value_type,
            facets: ValueFacets::default(),
        }
    }

    /// Sets whether elements may be null.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.facets.max_length = Some(max_length);
        self
    }

    /// Sets the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<ValueConverter>) -> Self {
        self.facets.converter = Some(converter);
        self
    }

    /// Sets a custom comparer.
    #[must_use]
    pub fn with_value_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.facets.value_comparer = Some(comparer);
        self
    }

    /// Sets an explicit type mapping.
    #[must_use]
    pub fn with_type_mapping(mut self, mapping: TypeMapping) -> Self {
        self.facets.type_mapping = Some(mapping);
        self
    }
}

/// Definition of a complex property and the complex type it owns.
#[derive(Clone, Debug)]
pub struct ComplexPropertyDef {
    /// Name, unique among the declaring type's members.
    pub name: String,
    /// Backing type of the complex type.
    pub host_type: HostType,
    /// Name of the complex type; derived from the declaring type when unset.
    pub complex_type_name: Option<String>,
    /// Whether the property may be null.
    pub nullable: bool,
    /// Whether the property holds a collection of complex values.
    pub collection: bool,
    /// Application member.
    pub member: Option<MemberHandle>,
    /// Access mode.
    pub property_access_mode: Option<PropertyAccessMode>,
    /// Change tracking strategy of the complex type.
    pub change_tracking_strategy: Option<ChangeTrackingStrategy>,
}

impl ComplexPropertyDef {
    /// Creates a non-nullable, single-valued complex property.
    #[must_use]
    pub fn new(name: impl Into<String>, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            host_type,
            complex_type_name: None,
            nullable: false,
            collection: false,
            member: None,
            property_access_mode: None,
            change_tracking_strategy: None,
        }
    }

    /// Sets the complex type name.
    #[must_use]
    pub fn with_complex_type_name(mut self, name: impl Into<String>) -> Self {
        self.complex_type_name = Some(name.into());
        self
    }

    /// Sets whether the property may be null.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the property as a collection.
    #[must_use]
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Sets the application member.
    #[must_use]
    pub fn with_member(mut self, member: MemberHandle) -> Self {
        self.member = Some(member);
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_property_access_mode(mut self, mode: PropertyAccessMode) -> Self {
        self.property_access_mode = Some(mode);
        self
    }

    /// Sets the change tracking strategy of the complex type.
    #[must_use]
    pub fn with_change_tracking_strategy(mut self, strategy: ChangeTrackingStrategy) -> Self {
        self.change_tracking_strategy = Some(strategy);
        self
    }
}

// =============================================================================
// Relationships
// =============================================================================

/// Definition of a foreign key's behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForeignKeyDef {
    /// Delete behavior.
    pub delete_behavior: DeleteBehavior,
    /// Whether at most one dependent exists per principal.
    pub unique: bool,
    /// Whether a dependent must have a principal.
    pub required: bool,
    /// Whether a principal must have a dependent.
    pub required_dependent: bool,
    /// Whether the dependent is owned by the principal.
    pub ownership: bool,
}

impl ForeignKeyDef {
    /// Creates an optional, non-unique foreign key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delete behavior.
    #[must_use]
    pub fn with_delete_behavior(mut self, behavior: DeleteBehavior) -> Self {
        self.delete_behavior = behavior;
        self
    }

    /// Marks the foreign key unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the foreign key required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the dependent required.
    #[must_use]
    pub fn required_dependent(mut self) -> Self {
        self.required_dependent = true;
        self
    }

    /// Marks the relationship as ownership.
    #[must_use]
    pub fn ownership(mut self) -> Self {
        self.ownership = true;
        self
    }
}

/// Definition of a navigation.
#[derive(Clone, Debug)]
pub struct NavigationDef {
    /// Name, unique among the declaring type's members.
    pub name: String,
    /// True if declared on the dependent, pointing to the principal.
    pub on_dependent: bool,
    /// Whether the navigation holds a collection.
    pub collection: bool,
    /// Application member.
    pub member: Option<MemberHandle>,
    /// Access mode.
    pub property_access_mode: Option<PropertyAccessMode>,
    /// Whether the target is loaded eagerly.
    pub eager_loaded: bool,
    /// Whether lazy loading is enabled.
    pub lazy_loading_enabled: bool,
}

impl NavigationDef {
    /// Creates a reference navigation on the dependent.
    #[must_use]
    pub fn to_principal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_dependent: true,
            collection: false,
            member: None,
            property_access_mode: None,
            eager_loaded: false,
            lazy_loading_enabled: true,
        }
    }

    /// Creates a navigation on the principal.
    ///
    /// It is a collection unless the foreign key is unique.
    #[must_use]
    pub fn to_dependent(name: impl Into<String>, collection: bool) -> Self {
        Self {
            on_dependent: false,
            collection,
            ..Self::to_principal(name)
        }
    }

    /// Sets the application member.
    #[must_use]
    pub fn with_member(mut self, member: MemberHandle) -> Self {
        self.member = Some(member);
        self
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_property_access_mode(mut self, mode: PropertyAccessMode) -> Self {
        self.property_access_mode = Some(mode);
        self
    }

    /// Marks the navigation eager loaded.
    #[must_use]
    pub fn eager_loaded(mut self) -> Self {
        self.eager_loaded = true;
        self
    }

    /// Sets whether lazy loading is enabled.
    #[must_use]
    pub fn with_lazy_loading(mut self, enabled: bool) -> Self {
        self.lazy_loading_enabled = enabled;
        self
    }
}

/// Definition of a skip navigation across a join entity type.
#[derive(Clone, Debug)]
pub struct SkipNavigationDef {
    /// Name, unique among the declaring type's members.
    pub name: String,
    /// Entity type reached by the navigation.
    pub target: EntityTypeId,
    /// Whether the navigation holds a collection.
    pub collection: bool,
    /// True if the declaring type is the dependent of the foreign key.
    pub on_dependent: bool,
    /// Application member.
    pub member: Option<MemberHandle>,
    /// Access mode.
    pub property_access_mode: Option<PropertyAccessMode>,
    /// Whether the target is loaded eagerly.
    pub eager_loaded: bool,
    /// Whether lazy loading is enabled.
    pub lazy_loading_enabled: bool,
}

impl SkipNavigationDef {
    /// Creates a collection skip navigation declared on the principal of
    /// its foreign key.
    #[must_use]
    pub fn new(name: impl Into<String>, target: EntityTypeId) -> Self {
        Self {
            name: name.into(),
            target,
            collection: true,
            on_dependent: false,
            member: None,
            property_access_mode: None,
            eager_loaded: false,
            lazy_loading_enabled: true,
        }
    }

    /// Sets whether the navigation holds a collection.
    #[must_use]
    pub fn with_collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    /// Declares the navigation on the dependent of its foreign key.
    #[must_use]
    pub fn on_dependent(mut self) -> Self {
        self.on_dependent = true;
        self
    }

    /// Sets the application member.
    #[must_use]
    pub fn with_member(mut self, member: MemberHandle) -> Self {
        self.member = Some(member);
        self
    }

    /// Marks the navigation eager loaded.
    #[must_use]
    pub fn eager_loaded(mut self) -> Self {
        self.eager_loaded = true;
        self
    }
}

// =============================================================================
// Indexes and Service Properties
// =============================================================================

/// Definition of an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexDef {
    /// Name; unnamed indexes are identified by their properties.
    pub name: Option<String>,
    /// Whether values must be unique.
    pub unique: bool,
    /// Per-property descending flags.
    pub descending: Option<Vec<bool>>,
}

impl IndexDef {
    /// Creates an unnamed, non-unique index definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named index definition.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Marks the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets per-property descending flags.
    #[must_use]
    pub fn with_descending(mut self, descending: Vec<bool>) -> Self {
        self.descending = Some(descending);
        self
    }
}

/// Definition of a service property.
#[derive(Clone, Debug)]
pub struct ServicePropertyDef {
    /// Name, unique among the declaring type's members.
    pub name: String,
    /// Type of the injected service.
    pub service_type: HostType,
    /// Application member.
    pub member: Option<MemberHandle>,
    /// Access mode.
    pub property_access_mode: Option<PropertyAccessMode>,
}

impl ServicePropertyDef {
    /// Creates a service property definition.
    #[must_use]
    pub fn new(name: impl Into<String>, service_type: HostType) -> Self {
        Self {
            name: name.into(),
            service_type,
            member: None,
            property_access_mode: None,
        }
    }

    /// Sets the application member.
    #[must_use]
    pub fn with_member(mut self, member: MemberHandle) -> Self {
        self.member = Some(member);
        self
    }
}
