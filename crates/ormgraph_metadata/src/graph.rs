//! The metadata graph: node storage and model-level lookups.
//!
//! [`ModelGraph`] owns every node of a model in per-kind arenas.
//! Cross-node references are ids, and every back-reference set is kept in
//! sync with its forward reference by the builder. Read access goes
//! through the borrowed views in this crate, which resolve ids against
//! the graph they were created from.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{
    Annotatable, Annotations, Error, HostType, LazyCell, MemberHandle, Result, RuntimeAnnotations,
    Value, ValueType,
};
use tracing::warn;

use crate::arena::Arena;
use crate::complex::{ComplexPropertyRef, ComplexTypeRef};
use crate::conversion::{JsonValueReaderWriter, ValueComparer, ValueConverter};
use crate::entity_type::EntityTypeRef;
use crate::foreign_key::ForeignKeyRef;
use crate::ids::{
    ComplexPropertyId, ComplexTypeId, EntityTypeId, ForeignKeyId, IndexId, KeyId, NavigationId,
    NodeId, PropertyId, ServicePropertyId, SkipNavigationId, StructuralTypeId, TriggerId,
};
use crate::index::IndexRef;
use crate::key::KeyRef;
use crate::mapping::{ModelDependencies, TypeConfiguration, TypeMapping};
use crate::navigation::{NavigationRef, SkipNavigationRef};
use crate::options::{ChangeTrackingStrategy, ModelOptions, PropertyAccessMode};
use crate::property::PropertyRef;
use crate::property_list::PropertyList;
use crate::schema::{DeleteBehavior, PropertySaveBehavior, ValueGenerated};
use crate::service::{ServicePropertyRef, TriggerRef};

// =============================================================================
// Node Data
// =============================================================================

/// Identity of a foreign key within its declaring entity type.
pub(crate) type ForeignKeyIdentity = (PropertyList, KeyId, EntityTypeId);

/// State shared by entity and complex types.
pub(crate) struct TypeBaseData {
    pub(crate) name: Arc<str>,
    pub(crate) host_type: HostType,
    pub(crate) base_type: Option<StructuralTypeId>,
    pub(crate) directly_derived: Vec<StructuralTypeId>,
    pub(crate) properties: IndexMap<Arc<str>, PropertyId>,
    pub(crate) complex_properties: IndexMap<Arc<str>, ComplexPropertyId>,
    pub(crate) indexer: Option<MemberHandle>,
    pub(crate) change_tracking_strategy: Option<ChangeTrackingStrategy>,
    pub(crate) property_access_mode: Option<PropertyAccessMode>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

impl TypeBaseData {
    pub(crate) fn new(name: Arc<str>, host_type: HostType) -> Self {
        Self {
            name,
            host_type,
            base_type: None,
            directly_derived: Vec::new(),
            properties: IndexMap::new(),
            complex_properties: IndexMap::new(),
            indexer: None,
            change_tracking_strategy: None,
            property_access_mode: None,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        }
    }
}

pub(crate) struct EntityTypeData {
    pub(crate) base: TypeBaseData,
    pub(crate) shared_host_type: bool,
    pub(crate) keyless: bool,
    pub(crate) primary_key: Option<KeyId>,
    pub(crate) keys: BTreeMap<PropertyList, KeyId>,
    pub(crate) foreign_keys: BTreeMap<ForeignKeyIdentity, ForeignKeyId>,
    pub(crate) referencing_foreign_keys: BTreeSet<ForeignKeyId>,
    pub(crate) navigations: IndexMap<Arc<str>, NavigationId>,
    pub(crate) skip_navigations: IndexMap<Arc<str>, SkipNavigationId>,
    pub(crate) unnamed_indexes: BTreeMap<PropertyList, IndexId>,
    pub(crate) named_indexes: BTreeMap<Arc<str>, IndexId>,
    pub(crate) service_properties: IndexMap<Arc<str>, ServicePropertyId>,
    pub(crate) triggers: IndexMap<Arc<str>, TriggerId>,
    pub(crate) discriminator_property: Option<Arc<str>>,
}

pub(crate) struct ComplexTypeData {
    pub(crate) base: TypeBaseData,
    pub(crate) complex_property: ComplexPropertyId,
}

/// Facets and strategies shared by properties and element types.
pub(crate) struct ValueData {
    pub(crate) value_type: ValueType,
    pub(crate) nullable: bool,
    pub(crate) provider_type: Option<ValueType>,
    pub(crate) converter: Option<Arc<ValueConverter>>,
    pub(crate) value_comparer: Option<Arc<ValueComparer>>,
    pub(crate) json_reader_writer: Option<Arc<dyn JsonValueReaderWriter>>,
    pub(crate) type_mapping: LazyCell<TypeMapping>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct PropertyData {
    pub(crate) name: Arc<str>,
    pub(crate) declaring_type: StructuralTypeId,
    pub(crate) value: ValueData,
    pub(crate) member: Option<MemberHandle>,
    pub(crate) indexer: bool,
    pub(crate) concurrency_token: bool,
    pub(crate) value_generated: ValueGenerated,
    pub(crate) before_save: PropertySaveBehavior,
    pub(crate) after_save: PropertySaveBehavior,
    pub(crate) property_access_mode: Option<PropertyAccessMode>,
    pub(crate) sentinel: Value,
    pub(crate) key_comparer: Option<Arc<ValueComparer>>,
    pub(crate) provider_value_comparer: Option<Arc<ValueComparer>>,
    pub(crate) element_type: Option<Box<ValueData>>,
    pub(crate) primary_key: Option<KeyId>,
    pub(crate) keys: BTreeSet<KeyId>,
    pub(crate) foreign_keys: BTreeSet<ForeignKeyId>,
    pub(crate) indexes: BTreeSet<IndexId>,
    pub(crate) resolved_comparers: ResolvedComparers,
}

#[derive(Default)]
pub(crate) struct ResolvedComparers {
    pub(crate) value: LazyCell<Arc<ValueComparer>>,
    pub(crate) key: LazyCell<Arc<ValueComparer>>,
    pub(crate) provider: LazyCell<Arc<ValueComparer>>,
}

pub(crate) struct ComplexPropertyData {
    pub(crate) name: Arc<str>,
    pub(crate) declaring_type: StructuralTypeId,
    pub(crate) complex_type: ComplexTypeId,
    pub(crate) nullable: bool,
    pub(crate) collection: bool,
    pub(crate) member: Option<MemberHandle>,
    pub(crate) property_access_mode: Option<PropertyAccessMode>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct KeyData {
    pub(crate) properties: PropertyList,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) referencing_foreign_keys: BTreeSet<ForeignKeyId>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct ForeignKeyData {
    pub(crate) properties: PropertyList,
    pub(crate) principal_key: KeyId,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) principal_entity_type: EntityTypeId,
    pub(crate) delete_behavior: DeleteBehavior,
    pub(crate) unique: bool,
    pub(crate) required: bool,
    pub(crate) required_dependent: bool,
    pub(crate) ownership: bool,
    pub(crate) dependent_to_principal: Option<NavigationId>,
    pub(crate) principal_to_dependent: Option<NavigationId>,
    pub(crate) referencing_skip_navigations: BTreeSet<SkipNavigationId>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

/// Member settings shared by navigations and skip navigations.
pub(crate) struct NavigationBaseData {
    pub(crate) name: Arc<str>,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) foreign_key: ForeignKeyId,
    pub(crate) on_dependent: bool,
    pub(crate) collection: bool,
    pub(crate) member: Option<MemberHandle>,
    pub(crate) property_access_mode: Option<PropertyAccessMode>,
    pub(crate) eager_loaded: bool,
    pub(crate) lazy_loading_enabled: bool,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct NavigationData {
    pub(crate) base: NavigationBaseData,
}

pub(crate) struct SkipNavigationData {
    pub(crate) base: NavigationBaseData,
    pub(crate) target_entity_type: EntityTypeId,
    pub(crate) inverse: Option<SkipNavigationId>,
}

pub(crate) struct IndexData {
    pub(crate) properties: PropertyList,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) unique: bool,
    pub(crate) descending: Option<Vec<bool>>,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct ServicePropertyData {
    pub(crate) name: Arc<str>,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) service_type: HostType,
    pub(crate) member: Option<MemberHandle>,
    pub(crate) property_access_mode: Option<PropertyAccessMode>,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

pub(crate) struct TriggerData {
    pub(crate) model_name: Arc<str>,
    pub(crate) declaring_entity_type: EntityTypeId,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
}

/// How entity types claim a host type.
pub(crate) enum HostRegistration {
    /// One entity type owns the host type.
    Unique(EntityTypeId),
    /// Several entity types share it, keyed by name.
    Shared(BTreeMap<String, EntityTypeId>),
}

// =============================================================================
// Model Graph
// =============================================================================

/// Storage and read access for every node of a model.
///
/// Obtained by dereferencing a [`ModelBuilder`](crate::ModelBuilder) or a
/// [`Model`](crate::Model).
pub struct ModelGraph {
    pub(crate) options: ModelOptions,
    pub(crate) frozen: bool,
    pub(crate) annotations: Annotations,
    pub(crate) runtime: RuntimeAnnotations,
    pub(crate) entity_types: Arena<EntityTypeId, EntityTypeData>,
    pub(crate) complex_types: Arena<ComplexTypeId, ComplexTypeData>,
    pub(crate) properties: Arena<PropertyId, PropertyData>,
    pub(crate) complex_properties: Arena<ComplexPropertyId, ComplexPropertyData>,
    pub(crate) keys: Arena<KeyId, KeyData>,
    pub(crate) foreign_keys: Arena<ForeignKeyId, ForeignKeyData>,
    pub(crate) navigations: Arena<NavigationId, NavigationData>,
    pub(crate) skip_navigations: Arena<SkipNavigationId, SkipNavigationData>,
    pub(crate) indexes: Arena<IndexId, IndexData>,
    pub(crate) service_properties: Arena<ServicePropertyId, ServicePropertyData>,
    pub(crate) triggers: Arena<TriggerId, TriggerData>,
    pub(crate) entity_types_by_name: BTreeMap<String, EntityTypeId>,
    pub(crate) host_types: HashMap<HostType, HostRegistration>,
    pub(crate) type_configurations: BTreeMap<ValueType, TypeConfiguration>,
}

impl ModelGraph {
    pub(crate) fn new(options: ModelOptions) -> Self {
        Self {
            options,
            frozen: false,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
            entity_types: Arena::new(),
            complex_types: Arena::new(),
            properties: Arena::new(),
            complex_properties: Arena::new(),
            keys: Arena::new(),
            foreign_keys: Arena::new(),
            navigations: Arena::new(),
            skip_navigations: Arena::new(),
            indexes: Arena::new(),
            service_properties: Arena::new(),
            triggers: Arena::new(),
            entity_types_by_name: BTreeMap::new(),
            host_types: HashMap::new(),
            type_configurations: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Model-level state
    // -------------------------------------------------------------------------

    /// Returns the model options.
    #[must_use]
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Returns true once the model has been finalized.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.frozen
    }

    /// Returns the version of the library that produced the model.
    #[must_use]
    pub fn product_version(&self) -> Option<&str> {
        self.annotations
            .find_value(names::PRODUCT_VERSION)
            .and_then(Value::as_str)
    }

    /// Returns the runtime services, if attached.
    #[must_use]
    pub fn model_dependencies(&self) -> Option<Arc<ModelDependencies>> {
        self.runtime.find_value(names::MODEL_DEPENDENCIES)
    }

    /// Finds the model-wide configuration of a value type.
    #[must_use]
    pub fn find_type_mapping_configuration(&self, value_type: &ValueType) -> Option<&TypeConfiguration> {
        self.type_configurations
            .get(value_type)
            .or_else(|| self.type_configurations.get(value_type.unwrap_nullable()))
    }

    /// Returns every type configuration, ordered by value type.
    pub fn get_type_mapping_configurations(&self) -> impl Iterator<Item = &TypeConfiguration> {
        self.type_configurations.values()
    }

    // -------------------------------------------------------------------------
    // Entity type lookup
    // -------------------------------------------------------------------------

    /// Finds an entity type by name under the configured name comparison.
    #[must_use]
    pub fn find_entity_type(&self, name: &str) -> Option<EntityTypeRef<'_>> {
        let key = self.options.name_comparison.key(name);
        self.entity_types_by_name
            .get(&key)
            .map(|&id| EntityTypeRef::new(self, id))
    }

    /// Gets an entity type by name.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if no entity type has this name.
    pub fn get_entity_type(&self, name: &str) -> Result<EntityTypeRef<'_>> {
        self.find_entity_type(name)
            .ok_or_else(|| Error::node_not_found(format!("entity type '{name}'")))
    }

    /// Returns every entity type, ordered by name.
    #[must_use]
    pub fn get_entity_types(&self) -> Vec<EntityTypeRef<'_>> {
        self.entity_types_by_name
            .values()
            .map(|&id| EntityTypeRef::new(self, id))
            .collect()
    }

    /// Returns entity types without a base type, ordered by name.
    #[must_use]
    pub fn get_root_entity_types(&self) -> Vec<EntityTypeRef<'_>> {
        self.get_entity_types()
            .into_iter()
            .filter(|ty| self.entity_types[ty.id()].base.base_type.is_none())
            .collect()
    }

    /// Returns the number of entity types.
    #[must_use]
    pub fn entity_type_count(&self) -> usize {
        self.entity_types.len()
    }

    /// Finds the entity type that solely owns `host_type`.
    #[must_use]
    pub fn find_entity_type_by_host(&self, host_type: &HostType) -> Option<EntityTypeRef<'_>> {
        match self.host_types.get(host_type)? {
            HostRegistration::Unique(id) => Some(EntityTypeRef::new(self, *id)),
            HostRegistration::Shared(_) => None,
        }
    }

    /// Returns every entity type backed by `host_type`, ordered by name.
    #[must_use]
    pub fn find_entity_types_by_host(&self, host_type: &HostType) -> Vec<EntityTypeRef<'_>> {
        match self.host_types.get(host_type) {
            Some(HostRegistration::Unique(id)) => vec![EntityTypeRef::new(self, *id)],
            Some(HostRegistration::Shared(by_name)) => by_name
                .values()
                .map(|&id| EntityTypeRef::new(self, id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns true if `host_type` backs several entity types.
    #[must_use]
    pub fn is_shared_host_type(&self, host_type: &HostType) -> bool {
        matches!(self.host_types.get(host_type), Some(HostRegistration::Shared(_)))
    }

    // -------------------------------------------------------------------------
    // Id resolution
    // -------------------------------------------------------------------------

    /// Resolves an entity type id.
    #[must_use]
    pub fn entity_type(&self, id: EntityTypeId) -> Option<EntityTypeRef<'_>> {
        self.entity_types
            .contains(id)
            .then(|| EntityTypeRef::new(self, id))
    }

    /// Resolves a complex type id.
    #[must_use]
    pub fn complex_type(&self, id: ComplexTypeId) -> Option<ComplexTypeRef<'_>> {
        self.complex_types
            .contains(id)
            .then(|| ComplexTypeRef::new(self, id))
    }

    /// Resolves a property id.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<PropertyRef<'_>> {
        self.properties
            .contains(id)
            .then(|| PropertyRef::new(self, id))
    }

    /// Resolves a complex property id.
    #[must_use]
    pub fn complex_property(&self, id: ComplexPropertyId) -> Option<ComplexPropertyRef<'_>> {
        self.complex_properties
            .contains(id)
            .then(|| ComplexPropertyRef::new(self, id))
    }

    /// Resolves a key id.
    #[must_use]
    pub fn key(&self, id: KeyId) -> Option<KeyRef<'_>> {
        self.keys.contains(id).then(|| KeyRef::new(self, id))
    }

    /// Resolves a foreign key id.
    #[must_use]
    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<ForeignKeyRef<'_>> {
        self.foreign_keys
            .contains(id)
            .then(|| ForeignKeyRef::new(self, id))
    }

    /// Resolves a navigation id.
    #[must_use]
    pub fn navigation(&self, id: NavigationId) -> Option<NavigationRef<'_>> {
        self.navigations
            .contains(id)
            .then(|| NavigationRef::new(self, id))
    }

    /// Resolves a skip navigation id.
    #[must_use]
    pub fn skip_navigation(&self, id: SkipNavigationId) -> Option<SkipNavigationRef<'_>> {
        self.skip_navigations
            .contains(id)
            .then(|| SkipNavigationRef::new(self, id))
    }

    /// Resolves an index id.
    #[must_use]
    pub fn index(&self, id: IndexId) -> Option<IndexRef<'_>> {
        self.indexes.contains(id).then(|| IndexRef::new(self, id))
    }

    /// Resolves a service property id.
    #[must_use]
    pub fn service_property(&self, id: ServicePropertyId) -> Option<ServicePropertyRef<'_>> {
        self.service_properties
            .contains(id)
            .then(|| ServicePropertyRef::new(self, id))
    }

    /// Resolves a trigger id.
    #[must_use]
    pub fn trigger(&self, id: TriggerId) -> Option<TriggerRef<'_>> {
        self.triggers.contains(id).then(|| TriggerRef::new(self, id))
    }

    // -------------------------------------------------------------------------
    // Internal access
    // -------------------------------------------------------------------------

    pub(crate) fn type_base(&self, id: StructuralTypeId) -> &TypeBaseData {
        match id {
            StructuralTypeId::Entity(id) => &self.entity_types[id].base,
            StructuralTypeId::Complex(id) => &self.complex_types[id].base,
        }
    }

    pub(crate) fn type_base_mut(&mut self, id: StructuralTypeId) -> Option<&mut TypeBaseData> {
        match id {
            StructuralTypeId::Entity(id) => self.entity_types.get_mut(id).map(|e| &mut e.base),
            StructuralTypeId::Complex(id) => self.complex_types.get_mut(id).map(|c| &mut c.base),
        }
    }

    pub(crate) fn contains_type(&self, id: StructuralTypeId) -> bool {
        match id {
            StructuralTypeId::Entity(id) => self.entity_types.contains(id),
            StructuralTypeId::Complex(id) => self.complex_types.contains(id),
        }
    }

    /// Returns a cached runtime value, computing it on first use.
    ///
    /// Values are only cached once the model is frozen; while building,
    /// every call recomputes so results never go stale. A slot already
    /// holding a value of another type is logged and left untouched.
    pub(crate) fn memoize<T, F>(&self, runtime: &RuntimeAnnotations, name: &str, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: Fn() -> T,
    {
        if !self.frozen {
            return Arc::new(compute());
        }
        match runtime.get_or_add_value(name, &compute) {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    annotation = name,
                    %error,
                    "runtime slot holds a foreign value, not caching"
                );
                Arc::new(compute())
            }
        }
    }

    /// Like [`ModelGraph::memoize`], for values held in a dedicated cell.
    pub(crate) fn memoize_cell<T: Clone>(&self, cell: &LazyCell<T>, value: T) -> T {
        if self.frozen {
            cell.get_or_init(|| value).clone()
        } else {
            value
        }
    }

    pub(crate) fn node_annotations(&self, node: NodeId) -> Option<(&Annotations, &RuntimeAnnotations)> {
        Some(match node {
            NodeId::Model => (&self.annotations, &self.runtime),
            NodeId::EntityType(id) => {
                let base = &self.entity_types.get(id)?.base;
                (&base.annotations, &base.runtime)
            }
            NodeId::ComplexType(id) => {
                let base = &self.complex_types.get(id)?.base;
                (&base.annotations, &base.runtime)
            }
            NodeId::Property(id) => {
                let value = &self.properties.get(id)?.value;
                (&value.annotations, &value.runtime)
            }
            NodeId::ElementType(id) => {
                let element = self.properties.get(id)?.element_type.as_deref()?;
                (&element.annotations, &element.runtime)
            }
            NodeId::ComplexProperty(id) => {
                let data = self.complex_properties.get(id)?;
                (&data.annotations, &data.runtime)
            }
            NodeId::Key(id) => {
                let data = self.keys.get(id)?;
                (&data.annotations, &data.runtime)
            }
            NodeId::ForeignKey(id) => {
                let data = self.foreign_keys.get(id)?;
                (&data.annotations, &data.runtime)
            }
            NodeId::Navigation(id) => {
                let base = &self.navigations.get(id)?.base;
                (&base.annotations, &base.runtime)
            }
            NodeId::SkipNavigation(id) => {
                let base = &self.skip_navigations.get(id)?.base;
                (&base.annotations, &base.runtime)
            }
            NodeId::Index(id) => {
                let data = self.indexes.get(id)?;
                (&data.annotations, &data.runtime)
            }
            NodeId::ServiceProperty(id) => {
                let data = self.service_properties.get(id)?;
                (&data.annotations, &data.runtime)
            }
            NodeId::Trigger(id) => {
                let data = self.triggers.get(id)?;
                (&data.annotations, &data.runtime)
            }
        })
    }

    pub(crate) fn node_annotations_mut(&mut self, node: NodeId) -> Option<&mut Annotations> {
        Some(match node {
            NodeId::Model => &mut self.annotations,
            NodeId::EntityType(id) => &mut self.entity_types.get_mut(id)?.base.annotations,
            NodeId::ComplexType(id) => &mut self.complex_types.get_mut(id)?.base.annotations,
            NodeId::Property(id) => &mut self.properties.get_mut(id)?.value.annotations,
            NodeId::ElementType(id) => {
                &mut self.properties.get_mut(id)?.element_type.as_deref_mut()?.annotations
            }
            NodeId::ComplexProperty(id) => &mut self.complex_properties.get_mut(id)?.annotations,
            NodeId::Key(id) => &mut self.keys.get_mut(id)?.annotations,
            NodeId::ForeignKey(id) => &mut self.foreign_keys.get_mut(id)?.annotations,
            NodeId::Navigation(id) => &mut self.navigations.get_mut(id)?.base.annotations,
            NodeId::SkipNavigation(id) => &mut self.skip_navigations.get_mut(id)?.base.annotations,
            NodeId::Index(id) => &mut self.indexes.get_mut(id)?.annotations,
            NodeId::ServiceProperty(id) => &mut self.service_properties.get_mut(id)?.annotations,
            NodeId::Trigger(id) => &mut self.triggers.get_mut(id)?.annotations,
        })
    }

    /// Annotations of any node, by id.
    #[must_use]
    pub fn find_node_annotations(&self, node: NodeId) -> Option<&Annotations> {
        self.node_annotations(node).map(|(annotations, _)| annotations)
    }
}

impl Annotatable for ModelGraph {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.runtime
    }
}

impl fmt::Debug for ModelGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelGraph")
            .field("frozen", &self.frozen)
            .field("entity_types", &self.entity_types.len())
            .field("properties", &self.properties.len())
            .field("keys", &self.keys.len())
            .field("foreign_keys", &self.foreign_keys.len())
            .finish_non_exhaustive()
    }
}
