//! Entity types: structural types with keys and relationships.

use std::collections::HashSet;
use std::fmt;

use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{Annotatable, Annotations, RuntimeAnnotations, Value};

use crate::foreign_key::ForeignKeyRef;
use crate::graph::{EntityTypeData, ModelGraph};
use crate::ids::{EntityTypeId, KeyId, PropertyId, StructuralTypeId};
use crate::index::IndexRef;
use crate::key::KeyRef;
use crate::navigation::{NavigationRef, SkipNavigationRef};
use crate::property::PropertyRef;
use crate::property_list::PropertyList;
use crate::service::{ServicePropertyRef, TriggerRef};
use crate::structural::StructuralType;

/// View of an entity type.
#[derive(Clone, Copy)]
pub struct EntityTypeRef<'g> {
    graph: &'g ModelGraph,
    id: EntityTypeId,
}

impl<'g> EntityTypeRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: EntityTypeId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g EntityTypeData {
        &self.graph.entity_types[self.id]
    }

    /// Walks this type and its base types, nearest first.
    fn self_and_bases(self) -> impl Iterator<Item = EntityTypeRef<'g>> {
        std::iter::successors(Some(self), |ty| ty.base_type())
    }

    /// Returns the entity type id.
    #[must_use]
    pub fn id(self) -> EntityTypeId {
        self.id
    }

    /// Returns true if the host type backs other entity types as well.
    #[must_use]
    pub fn has_shared_host_type(self) -> bool {
        self.data().shared_host_type
    }

    /// Returns true if the type was declared without a key.
    #[must_use]
    pub fn is_keyless(self) -> bool {
        self.root_type().data().keyless
    }

    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------

    /// Returns the primary key, declared on the root of the hierarchy.
    #[must_use]
    pub fn find_primary_key(self) -> Option<KeyRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.data().primary_key)
            .map(|id| KeyRef::new(self.graph, id))
    }

    /// Finds a key declared on this type with exactly these properties,
    /// in this order.
    #[must_use]
    pub fn find_declared_key(self, properties: &[PropertyId]) -> Option<KeyRef<'g>> {
        self.data()
            .keys
            .get(&PropertyList::new(properties))
            .map(|&id| KeyRef::new(self.graph, id))
    }

    /// Finds a key on this type or a base type.
    #[must_use]
    pub fn find_key(self, properties: &[PropertyId]) -> Option<KeyRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_key(properties))
    }

    /// Returns keys declared on this type, ordered by property list.
    #[must_use]
    pub fn get_declared_keys(self) -> Vec<KeyRef<'g>> {
        self.data()
            .keys
            .values()
            .map(|&id| KeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type keys first, then declared ones.
    #[must_use]
    pub fn get_keys(self) -> Vec<KeyRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_keys)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Foreign keys
    // -------------------------------------------------------------------------

    /// Finds the foreign key with this exact identity on this type or a base type.
    #[must_use]
    pub fn find_foreign_key(
        self,
        properties: &[PropertyId],
        principal_key: KeyId,
        principal_entity_type: EntityTypeId,
    ) -> Option<ForeignKeyRef<'g>> {
        let identity = (PropertyList::new(properties), principal_key, principal_entity_type);
        self.self_and_bases()
            .find_map(|ty| ty.data().foreign_keys.get(&identity).copied())
            .map(|id| ForeignKeyRef::new(self.graph, id))
    }

    /// Returns foreign keys declared on this type over exactly these properties.
    #[must_use]
    pub fn find_declared_foreign_keys(self, properties: &[PropertyId]) -> Vec<ForeignKeyRef<'g>> {
        self.get_declared_foreign_keys()
            .into_iter()
            .filter(|fk| fk.property_list().as_slice() == properties)
            .collect()
    }

    /// Returns foreign keys on this type or its bases over exactly these properties.
    #[must_use]
    pub fn find_foreign_keys(self, properties: &[PropertyId]) -> Vec<ForeignKeyRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(|ty| ty.find_declared_foreign_keys(properties))
            .collect()
    }

    /// Returns the single-property foreign keys over `property`.
    ///
    /// Composite foreign keys that merely include it are not returned.
    #[must_use]
    pub fn find_foreign_keys_for_property(self, property: PropertyId) -> Vec<ForeignKeyRef<'g>> {
        self.find_foreign_keys(&[property])
    }

    /// Returns foreign keys declared on this type, ordered by identity.
    #[must_use]
    pub fn get_declared_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.data()
            .foreign_keys
            .values()
            .map(|&id| ForeignKeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type foreign keys first, then declared ones.
    #[must_use]
    pub fn get_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_foreign_keys)
            .collect()
    }

    /// Returns foreign keys declared on derived types.
    #[must_use]
    pub fn get_derived_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_foreign_keys)
            .collect()
    }

    /// Returns foreign keys whose principal is this exact type, in creation order.
    #[must_use]
    pub fn get_declared_referencing_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.data()
            .referencing_foreign_keys
            .iter()
            .map(|&id| ForeignKeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns foreign keys whose principal is this type or a base type.
    #[must_use]
    pub fn get_referencing_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_referencing_foreign_keys)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Navigations
    // -------------------------------------------------------------------------

    /// Finds a navigation declared on this type only.
    #[must_use]
    pub fn find_declared_navigation(self, name: &str) -> Option<NavigationRef<'g>> {
        self.data()
            .navigations
            .get(name)
            .map(|&id| NavigationRef::new(self.graph, id))
    }

    /// Finds a navigation on this type or a base type.
    #[must_use]
    pub fn find_navigation(self, name: &str) -> Option<NavigationRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_navigation(name))
    }

    /// Returns navigations declared on this type, in declaration order.
    #[must_use]
    pub fn get_declared_navigations(self) -> Vec<NavigationRef<'g>> {
        self.data()
            .navigations
            .values()
            .map(|&id| NavigationRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type navigations first, then declared ones.
    #[must_use]
    pub fn get_navigations(self) -> Vec<NavigationRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_navigations)
            .collect()
    }

    /// Returns navigations declared on derived types.
    #[must_use]
    pub fn get_derived_navigations(self) -> Vec<NavigationRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_navigations)
            .collect()
    }

    /// Finds a skip navigation declared on this type only.
    #[must_use]
    pub fn find_declared_skip_navigation(self, name: &str) -> Option<SkipNavigationRef<'g>> {
        self.data()
            .skip_navigations
            .get(name)
            .map(|&id| SkipNavigationRef::new(self.graph, id))
    }

    /// Finds a skip navigation on this type or a base type.
    #[must_use]
    pub fn find_skip_navigation(self, name: &str) -> Option<SkipNavigationRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_skip_navigation(name))
    }

    /// Returns skip navigations declared on this type.
    #[must_use]
    pub fn get_declared_skip_navigations(self) -> Vec<SkipNavigationRef<'g>> {
        self.data()
            .skip_navigations
            .values()
            .map(|&id| SkipNavigationRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type skip navigations first, then declared ones.
    #[must_use]
    pub fn get_skip_navigations(self) -> Vec<SkipNavigationRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_skip_navigations)
            .collect()
    }

    /// Returns skip navigations declared on derived types.
    #[must_use]
    pub fn get_derived_skip_navigations(self) -> Vec<SkipNavigationRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_skip_navigations)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Indexes
    // -------------------------------------------------------------------------

    /// Finds an unnamed index declared on this type over these properties.
    #[must_use]
    pub fn find_declared_index(self, properties: &[PropertyId]) -> Option<IndexRef<'g>> {
        self.data()
            .unnamed_indexes
            .get(&PropertyList::new(properties))
            .map(|&id| IndexRef::new(self.graph, id))
    }

    /// Finds an unnamed index on this type or a base type.
    #[must_use]
    pub fn find_index(self, properties: &[PropertyId]) -> Option<IndexRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_index(properties))
    }

    /// Finds a named index on this type or a base type.
    #[must_use]
    pub fn find_index_by_name(self, name: &str) -> Option<IndexRef<'g>> {
        self.self_and_bases().find_map(|ty| {
            ty.data()
                .named_indexes
                .get(name)
                .map(|&id| IndexRef::new(self.graph, id))
        })
    }

    /// Returns indexes declared on this type: unnamed ones by property list,
    /// then named ones by name.
    #[must_use]
    pub fn get_declared_indexes(self) -> Vec<IndexRef<'g>> {
        let data = self.data();
        data.unnamed_indexes
            .values()
            .chain(data.named_indexes.values())
            .map(|&id| IndexRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type indexes first, then declared ones.
    #[must_use]
    pub fn get_indexes(self) -> Vec<IndexRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_indexes)
            .collect()
    }

    /// Returns indexes declared on derived types.
    #[must_use]
    pub fn get_derived_indexes(self) -> Vec<IndexRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_indexes)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Service properties and triggers
    // -------------------------------------------------------------------------

    /// Finds a service property declared on this type only.
    #[must_use]
    pub fn find_declared_service_property(self, name: &str) -> Option<ServicePropertyRef<'g>> {
        self.data()
            .service_properties
            .get(name)
            .map(|&id| ServicePropertyRef::new(self.graph, id))
    }

    /// Finds a service property on this type or a base type.
    #[must_use]
    pub fn find_service_property(self, name: &str) -> Option<ServicePropertyRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_service_property(name))
    }

    /// Returns service properties declared on this type.
    #[must_use]
    pub fn get_declared_service_properties(self) -> Vec<ServicePropertyRef<'g>> {
        self.data()
            .service_properties
            .values()
            .map(|&id| ServicePropertyRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type service properties first, then declared ones.
    #[must_use]
    pub fn get_service_properties(self) -> Vec<ServicePropertyRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_service_properties)
            .collect()
    }

    /// Finds a trigger declared on this type.
    #[must_use]
    pub fn find_declared_trigger(self, model_name: &str) -> Option<TriggerRef<'g>> {
        self.data()
            .triggers
            .get(model_name)
            .map(|&id| TriggerRef::new(self.graph, id))
    }

    /// Finds a trigger on this type or a base type.
    #[must_use]
    pub fn find_trigger(self, model_name: &str) -> Option<TriggerRef<'g>> {
        self.self_and_bases()
            .find_map(|ty| ty.find_declared_trigger(model_name))
    }

    /// Returns triggers declared on this type.
    #[must_use]
    pub fn get_declared_triggers(self) -> Vec<TriggerRef<'g>> {
        self.data()
            .triggers
            .values()
            .map(|&id| TriggerRef::new(self.graph, id))
            .collect()
    }

    /// Returns base-type triggers first, then declared ones.
    #[must_use]
    pub fn get_triggers(self) -> Vec<TriggerRef<'g>> {
        self.get_all_base_types_inclusive()
            .into_iter()
            .flat_map(EntityTypeRef::get_declared_triggers)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Discriminator
    // -------------------------------------------------------------------------

    /// Returns the discriminator property name, stored on the hierarchy root.
    #[must_use]
    pub fn discriminator_property_name(self) -> Option<&'g str> {
        self.root_type().data().discriminator_property.as_deref()
    }

    /// Returns the discriminator property.
    #[must_use]
    pub fn find_discriminator_property(self) -> Option<PropertyRef<'g>> {
        self.discriminator_property_name()
            .and_then(|name| self.find_property(name))
    }

    /// Returns the discriminator value of this type.
    ///
    /// Without an explicit value, types in a hierarchy with a discriminator
    /// default to their short name unless mapping completeness was set.
    #[must_use]
    pub fn discriminator_value(self) -> Option<Value> {
        if let Some(value) = self.annotations().find_value(names::DISCRIMINATOR_VALUE) {
            return Some(value.clone());
        }
        let explicit_completeness = self
            .root_type()
            .annotations()
            .find_value(names::DISCRIMINATOR_MAPPING_COMPLETE)
            .is_some();
        (self.discriminator_property_name().is_some() && !explicit_completeness)
            .then(|| Value::string(self.short_name()))
    }

    /// Returns true if every discriminator value in the hierarchy is mapped.
    ///
    /// Defaults to true.
    #[must_use]
    pub fn is_discriminator_mapping_complete(self) -> bool {
        self.root_type()
            .annotations()
            .find_value(names::DISCRIMINATOR_MAPPING_COMPLETE)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Returns the query filter, declared on the hierarchy root.
    #[must_use]
    pub fn query_filter(self) -> Option<&'g Value> {
        let root = self.root_type();
        root.graph.entity_types[root.id]
            .base
            .annotations
            .find_value(names::QUERY_FILTER)
    }

    // -------------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------------

    /// Returns the ownership foreign key of this type, if owned.
    #[must_use]
    pub fn find_ownership(self) -> Option<ForeignKeyRef<'g>> {
        self.root_type()
            .get_declared_foreign_keys()
            .into_iter()
            .find(|fk| fk.is_ownership())
    }

    /// Returns true if another entity type owns this one.
    #[must_use]
    pub fn is_owned(self) -> bool {
        self.find_ownership().is_some()
    }

    /// Returns true if `target` is this type or one of its owners,
    /// transitively.
    ///
    /// An owner matches any `target` assignable to it, since ownership
    /// declared against a base type also covers its derived types.
    #[must_use]
    pub fn is_in_ownership_path(self, target: EntityTypeRef<'g>) -> bool {
        if self == target {
            return true;
        }
        let mut visited = HashSet::from([self.id]);
        let mut current = self;
        while let Some(ownership) = current.find_ownership() {
            current = ownership.principal_entity_type();
            if current.is_assignable_from(target) {
                return true;
            }
            if !visited.insert(current.id) {
                return false;
            }
        }
        false
    }
}

impl<'g> StructuralType<'g> for EntityTypeRef<'g> {
    fn graph(self) -> &'g ModelGraph {
        self.graph
    }

    fn structural_id(self) -> StructuralTypeId {
        StructuralTypeId::Entity(self.id)
    }

    fn from_structural(graph: &'g ModelGraph, id: StructuralTypeId) -> Option<Self> {
        id.as_entity().map(|id| Self::new(graph, id))
    }
}

impl Annotatable for EntityTypeRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().base.annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().base.runtime
    }
}

impl PartialEq for EntityTypeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for EntityTypeRef<'_> {}

impl fmt::Debug for EntityTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.display_name())
    }
}
