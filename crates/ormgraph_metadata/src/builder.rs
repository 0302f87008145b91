//! Model construction.
//!
//! [`ModelBuilder`] owns every node while a model is assembled. Each
//! `add_*` operation validates its inputs against the current graph, then
//! creates the node and wires every back-reference it implies, so a failed
//! call leaves the graph untouched. [`ModelBuilder::finalize`] moves the
//! storage into a frozen [`Model`].

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{
    Annotation, Annotations, Error, ErrorContext, ErrorKind, LazyCell, Result, RuntimeAnnotations,
    Value, ValueType,
};
use tracing::{debug, info};

use crate::entity_type::EntityTypeRef;
use crate::graph::{
    ComplexPropertyData, ComplexTypeData, EntityTypeData, ForeignKeyData, HostRegistration,
    IndexData, KeyData, ModelGraph, NavigationBaseData, NavigationData, PropertyData,
    ResolvedComparers, ServicePropertyData, SkipNavigationData, TriggerData, TypeBaseData,
    ValueData,
};
use crate::ids::{
    ComplexPropertyId, ComplexTypeId, EntityTypeId, ForeignKeyId, IndexId, KeyId, NavigationId,
    NodeId, PropertyId, ServicePropertyId, SkipNavigationId, StructuralTypeId, TriggerId,
};
use crate::mapping::{TypeConfiguration, TypeMapping};
use crate::model::Model;
use crate::options::ModelOptions;
use crate::property_list::PropertyList;
use crate::schema::{
    ComplexPropertyDef, ElementTypeDef, EntityTypeDef, ForeignKeyDef, IndexDef, NavigationDef,
    PropertyDef, ServicePropertyDef, SkipNavigationDef, ValueFacets,
};
use crate::structural::{StructuralType, StructuralTypeRef};

/// Single-threaded, mutable model under construction.
///
/// Read access to the partial model is available through [`Deref`] to
/// [`ModelGraph`]; runtime values computed through a builder are never
/// cached.
pub struct ModelBuilder {
    graph: ModelGraph,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    /// Creates an empty builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ModelOptions::default())
    }

    /// Creates an empty builder.
    #[must_use]
    pub fn with_options(options: ModelOptions) -> Self {
        Self {
            graph: ModelGraph::new(options),
        }
    }

    /// Freezes the model.
    #[must_use]
    pub fn finalize(self) -> Model {
        let mut graph = self.graph;
        graph.frozen = true;
        info!(
            entity_types = graph.entity_types.len(),
            properties = graph.properties.len(),
            keys = graph.keys.len(),
            foreign_keys = graph.foreign_keys.len(),
            "model finalized"
        );
        Model::from_graph(graph)
    }

    // =========================================================================
    // Entity types
    // =========================================================================

    /// Adds an entity type.
    ///
    /// # Errors
    ///
    /// - `DuplicateEntityType` if the name is taken, or if the host type is
    ///   already mapped in a way that conflicts with `shared_host_type`
    /// - `NodeNotFound` if the base type does not exist
    /// - `InvalidHierarchy` if a derived type declares a discriminator property
    pub fn add_entity_type(&mut self, def: EntityTypeDef) -> Result<EntityTypeId> {
        let EntityTypeDef {
            name,
            host_type,
            base_type,
            shared_host_type,
            keyless,
            discriminator_property,
            discriminator_value,
            change_tracking_strategy,
            property_access_mode,
            indexer,
        } = def;

        let lookup_key = self.graph.options.name_comparison.key(&name);
        if self.graph.entity_types_by_name.contains_key(&lookup_key) {
            return Err(Error::new(ErrorKind::DuplicateEntityType(name)));
        }
        if let Some(base) = base_type {
            self.require_entity(base)?;
            if discriminator_property.is_some() {
                return Err(Error::invalid_hierarchy(format!(
                    "discriminator property of '{name}' must be declared on the root type"
                )));
            }
        }
        match self.graph.host_types.get(&host_type) {
            Some(HostRegistration::Unique(existing)) => {
                let existing = EntityTypeRef::new(&self.graph, *existing).display_name();
                return Err(Error::new(ErrorKind::DuplicateEntityType(format!(
                    "{name}: host type '{host_type}' is already mapped by '{existing}'"
                ))));
            }
            Some(HostRegistration::Shared(_)) if !shared_host_type => {
                return Err(Error::new(ErrorKind::DuplicateEntityType(format!(
                    "{name}: host type '{host_type}' is shared and needs a shared-type entity type"
                ))));
            }
            _ => {}
        }

        let name: Arc<str> = Arc::from(name);
        let mut base = TypeBaseData::new(Arc::clone(&name), host_type.clone());
        base.base_type = base_type.map(StructuralTypeId::Entity);
        base.indexer = indexer;
        base.change_tracking_strategy = change_tracking_strategy;
        base.property_access_mode = property_access_mode;
        if let Some(value) = discriminator_value {
            base.annotations
                .set_annotation(names::DISCRIMINATOR_VALUE, value);
        }

        let id = self.graph.entity_types.insert(EntityTypeData {
            base,
            shared_host_type,
            keyless,
            primary_key: None,
            keys: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
            referencing_foreign_keys: BTreeSet::new(),
            navigations: IndexMap::new(),
            skip_navigations: IndexMap::new(),
            unnamed_indexes: BTreeMap::new(),
            named_indexes: BTreeMap::new(),
            service_properties: IndexMap::new(),
            triggers: IndexMap::new(),
            discriminator_property: discriminator_property.map(Arc::from),
        });

        if let Some(base) = base_type {
            self.graph.entity_types[base]
                .base
                .directly_derived
                .push(StructuralTypeId::Entity(id));
        }
        if shared_host_type {
            let registration = self
                .graph
                .host_types
                .entry(host_type)
                .or_insert_with(|| HostRegistration::Shared(BTreeMap::new()));
            if let HostRegistration::Shared(by_name) = registration {
                by_name.insert(lookup_key.clone(), id);
            }
        } else {
            self.graph
                .host_types
                .insert(host_type, HostRegistration::Unique(id));
        }
        self.graph.entity_types_by_name.insert(lookup_key, id);

        debug!(entity_type = %name, base = ?base_type, "entity type added");
        Ok(id)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Adds a scalar property to an entity or complex type.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the declaring type does not exist
    /// - `DuplicateMember` if a member with this name exists anywhere in
    ///   the type's hierarchy
    pub fn add_property(
        &mut self,
        declaring: impl Into<StructuralTypeId>,
        def: PropertyDef,
    ) -> Result<PropertyId> {
        self.insert_property(declaring.into(), def, false)
    }

    /// Adds a property accessed through the declaring type's indexer.
    ///
    /// # Errors
    ///
    /// Same as [`ModelBuilder::add_property`], plus `NonIndexerEntityType`
    /// if the type has no indexer.
    pub fn add_indexer_property(
        &mut self,
        declaring: impl Into<StructuralTypeId>,
        def: PropertyDef,
    ) -> Result<PropertyId> {
        self.insert_property(declaring.into(), def, true)
    }

    fn insert_property(
        &mut self,
        declaring: StructuralTypeId,
        def: PropertyDef,
        indexer: bool,
    ) -> Result<PropertyId> {
        let PropertyDef {
            name,
            value_type,
            nullable,
            member,
            concurrency_token,
            value_generated,
            before_save,
            after_save,
            property_access_mode,
            sentinel,
            facets,
            key_comparer,
            provider_value_comparer,
        } = def;

        self.require_type(declaring)?;
        self.check_member_name(declaring, &name)?;
        let member = if indexer {
            let ty = StructuralTypeRef::new(&self.graph, declaring);
            match ty.find_indexer_property_info() {
                Some(handle) => Some(handle.clone()),
                None => return Err(Error::non_indexer_entity_type(name, ty.display_name())),
            }
        } else {
            member
        };

        let name: Arc<str> = Arc::from(name);
        let id = self.graph.properties.insert(PropertyData {
            name: Arc::clone(&name),
            declaring_type: declaring,
            value: value_data(value_type, nullable, facets),
            member,
            indexer,
            concurrency_token,
            value_generated,
            before_save,
            after_save,
            property_access_mode,
            sentinel,
            key_comparer,
            provider_value_comparer,
            element_type: None,
            primary_key: None,
            keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            indexes: BTreeSet::new(),
            resolved_comparers: ResolvedComparers::default(),
        });
        if let Some(base) = self.graph.type_base_mut(declaring) {
            base.properties.insert(Arc::clone(&name), id);
        }

        debug!(property = %name, declaring = ?declaring, indexer, "property added");
        Ok(id)
    }

    /// Marks a property as a primitive collection with this element type.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the property does not exist.
    pub fn set_element_type(&mut self, property: PropertyId, def: ElementTypeDef) -> Result<()> {
        let ElementTypeDef {
            value_type,
            nullable,
            facets,
        } = def;
        let data = self.property_mut(property)?;
        data.element_type = Some(Box::new(value_data(value_type, nullable, facets)));
        data.resolved_comparers = ResolvedComparers::default();
        Ok(())
    }

    /// Sets the type mapping of a property, bypassing the mapping source.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the property does not exist.
    pub fn set_type_mapping(&mut self, property: PropertyId, mapping: TypeMapping) -> Result<()> {
        let data = self.property_mut(property)?;
        data.value.type_mapping = LazyCell::new();
        data.value.type_mapping.get_or_init(|| mapping);
        data.resolved_comparers = ResolvedComparers::default();
        Ok(())
    }

    // =========================================================================
    // Complex properties
    // =========================================================================

    /// Adds a complex property together with the complex type it owns.
    ///
    /// Without an explicit name the complex type is named
    /// `"{declaring}.{property}#{host}"`.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the declaring type does not exist
    /// - `DuplicateMember` if the name is taken in the hierarchy
    pub fn add_complex_property(
        &mut self,
        declaring: impl Into<StructuralTypeId>,
        def: ComplexPropertyDef,
    ) -> Result<(ComplexPropertyId, ComplexTypeId)> {
        let declaring = declaring.into();
        let ComplexPropertyDef {
            name,
            host_type,
            complex_type_name,
            nullable,
            collection,
            member,
            property_access_mode,
            change_tracking_strategy,
        } = def;

        self.require_type(declaring)?;
        self.check_member_name(declaring, &name)?;
        let type_name = complex_type_name.unwrap_or_else(|| {
            let owner = &self.graph.type_base(declaring).name;
            format!("{owner}.{name}#{}", host_type.short_name())
        });

        let property_id = self.graph.complex_properties.next_id();
        let mut base = TypeBaseData::new(Arc::from(type_name), host_type);
        base.change_tracking_strategy = change_tracking_strategy;
        let complex_type = self.graph.complex_types.insert(ComplexTypeData {
            base,
            complex_property: property_id,
        });

        let name: Arc<str> = Arc::from(name);
        self.graph.complex_properties.insert(ComplexPropertyData {
            name: Arc::clone(&name),
            declaring_type: declaring,
            complex_type,
            nullable,
            collection,
            member,
            property_access_mode,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });
        if let Some(base) = self.graph.type_base_mut(declaring) {
            base.complex_properties.insert(Arc::clone(&name), property_id);
        }

        debug!(complex_property = %name, declaring = ?declaring, "complex property added");
        Ok((property_id, complex_type))
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Adds a key over `properties`, in order.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the entity type or a property does not exist
    /// - `InvalidHierarchy` if the type is derived or keyless, the list is
    ///   empty, or a property is not declared on the type or its bases
    /// - `DuplicateKey` if a key with the same ordered list exists
    pub fn add_key(&mut self, entity_type: EntityTypeId, properties: &[PropertyId]) -> Result<KeyId> {
        let entity = self.require_entity(entity_type)?;
        let entity_name = entity.display_name();
        if entity.base_type().is_some() {
            return Err(Error::invalid_hierarchy(format!(
                "keys of '{entity_name}' must be declared on the root type"
            )));
        }
        if entity.is_keyless() {
            return Err(Error::invalid_hierarchy(format!(
                "'{entity_name}' is keyless and cannot declare keys"
            )));
        }
        self.check_entity_properties(entity, properties)?;
        if entity.find_declared_key(properties).is_some() {
            return Err(Error::new(ErrorKind::DuplicateKey(format!(
                "{entity_name} {{{}}}",
                self.property_names(properties)
            ))));
        }

        let list = PropertyList::new(properties);
        let id = self.graph.keys.insert(KeyData {
            properties: list.clone(),
            declaring_entity_type: entity_type,
            referencing_foreign_keys: BTreeSet::new(),
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });
        self.graph.entity_types[entity_type].keys.insert(list, id);
        for &property in properties {
            self.graph.properties[property].keys.insert(id);
        }

        debug!(entity_type = %entity_name, key = ?id, "key added");
        Ok(id)
    }

    /// Makes the key over `properties` the primary key, adding it if needed.
    ///
    /// # Errors
    ///
    /// Same as [`ModelBuilder::add_key`].
    pub fn set_primary_key(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
    ) -> Result<KeyId> {
        let existing = self
            .require_entity(entity_type)?
            .find_declared_key(properties)
            .map(|key| key.id());
        let key = match existing {
            Some(key) => key,
            None => self.add_key(entity_type, properties)?,
        };
        self.replace_primary_key(entity_type, Some(key));
        debug!(entity_type = ?entity_type, key = ?key, "primary key set");
        Ok(key)
    }

    /// Clears the primary key; the key itself stays as an alternate key.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the entity type does not exist.
    pub fn clear_primary_key(&mut self, entity_type: EntityTypeId) -> Result<()> {
        self.require_entity(entity_type)?;
        self.replace_primary_key(entity_type, None);
        Ok(())
    }

    fn replace_primary_key(&mut self, entity_type: EntityTypeId, key: Option<KeyId>) {
        if let Some(old) = self.graph.entity_types[entity_type].primary_key.take() {
            let list = self.graph.keys[old].properties.clone();
            for property in list.iter() {
                self.graph.properties[property].primary_key = None;
            }
        }
        if let Some(new) = key {
            let list = self.graph.keys[new].properties.clone();
            for property in list.iter() {
                self.graph.properties[property].primary_key = Some(new);
            }
            self.graph.entity_types[entity_type].primary_key = Some(new);
        }
    }

    /// Removes a key.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the key does not exist
    /// - `InUse` if the key is primary or referenced by a foreign key
    pub fn remove_key(&mut self, key: KeyId) -> Result<()> {
        let view = self
            .graph
            .key(key)
            .ok_or_else(|| Error::node_not_found(format!("{key:?}")))?;
        if let Some(fk) = view.get_referencing_foreign_keys().first() {
            return Err(Error::in_use(format!("{view:?}"), format!("{fk:?}")));
        }
        if view.is_primary_key() {
            return Err(Error::in_use(
                format!("{view:?}"),
                format!("primary key of '{}'", view.declaring_entity_type().display_name()),
            ));
        }
        let entity_type = view.declaring_entity_type().id();
        let list = view.property_list().clone();

        self.graph.entity_types[entity_type].keys.remove(&list);
        for property in list.iter() {
            self.graph.properties[property].keys.remove(&key);
        }
        self.graph.keys.remove(key);
        debug!(key = ?key, "key removed");
        Ok(())
    }

    // =========================================================================
    // Foreign keys
    // =========================================================================

    /// Adds a foreign key from `properties` on `entity_type` to
    /// `principal_key` on `principal_entity_type`.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if an entity type, the key or a property does not exist
    /// - `ForeignKeyArityMismatch` if the property counts differ
    /// - `InvalidHierarchy` if a property is not declared on the dependent or
    ///   its bases, or the principal key is not on the principal or its bases
    /// - `DuplicateForeignKey` if the same relationship already exists
    pub fn add_foreign_key(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
        principal_key: KeyId,
        principal_entity_type: EntityTypeId,
        def: ForeignKeyDef,
    ) -> Result<ForeignKeyId> {
        let dependent = self.require_entity(entity_type)?;
        let principal = self.require_entity(principal_entity_type)?;
        let key = self
            .graph
            .key(principal_key)
            .ok_or_else(|| Error::node_not_found(format!("{principal_key:?}")))?;
        let context = || {
            ErrorContext::new()
                .with_operation("add_foreign_key")
                .with_node(format!("EntityType '{}'", dependent.display_name()))
        };

        if properties.len() != key.property_list().len() {
            return Err(
                Error::foreign_key_arity_mismatch(properties.len(), key.property_list().len())
                    .with_context(context()),
            );
        }
        self.check_entity_properties(dependent, properties)?;
        if !key.declaring_entity_type().is_assignable_from(principal) {
            return Err(Error::invalid_hierarchy(format!(
                "{key:?} is not declared on '{}' or its base types",
                principal.display_name()
            ))
            .with_context(context()));
        }
        if dependent
            .find_foreign_key(properties, principal_key, principal_entity_type)
            .is_some()
        {
            return Err(Error::new(ErrorKind::DuplicateForeignKey(format!(
                "{} {{{}}} -> {}",
                dependent.display_name(),
                self.property_names(properties),
                principal.display_name()
            ))));
        }
        let dependent_name = dependent.display_name();
        let principal_name = principal.display_name();

        let ForeignKeyDef {
            delete_behavior,
            unique,
            required,
            required_dependent,
            ownership,
        } = def;
        let list = PropertyList::new(properties);
        let id = self.graph.foreign_keys.insert(ForeignKeyData {
            properties: list.clone(),
            principal_key,
            declaring_entity_type: entity_type,
            principal_entity_type,
            delete_behavior,
            unique,
            required,
            required_dependent,
            ownership,
            dependent_to_principal: None,
            principal_to_dependent: None,
            referencing_skip_navigations: BTreeSet::new(),
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });

        self.graph.entity_types[entity_type]
            .foreign_keys
            .insert((list, principal_key, principal_entity_type), id);
        self.graph.entity_types[principal_entity_type]
            .referencing_foreign_keys
            .insert(id);
        self.graph.keys[principal_key]
            .referencing_foreign_keys
            .insert(id);
        for &property in properties {
            self.graph.properties[property].foreign_keys.insert(id);
        }

        debug!(
            dependent = %dependent_name,
            principal = %principal_name,
            foreign_key = ?id,
            "foreign key added"
        );
        Ok(id)
    }

    /// Removes a foreign key, its navigations and every back-reference to it.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the foreign key does not exist
    /// - `InUse` if a skip navigation uses it
    pub fn remove_foreign_key(&mut self, foreign_key: ForeignKeyId) -> Result<()> {
        let fk = self
            .graph
            .foreign_key(foreign_key)
            .ok_or_else(|| Error::node_not_found(format!("{foreign_key:?}")))?;
        if let Some(skip) = fk.get_referencing_skip_navigations().first() {
            return Err(Error::in_use(format!("{fk:?}"), format!("{skip:?}")));
        }
        let navigations: Vec<NavigationId> = [fk.dependent_to_principal(), fk.principal_to_dependent()]
            .into_iter()
            .flatten()
            .map(|navigation| navigation.id())
            .collect();
        let entity_type = fk.declaring_entity_type().id();
        let principal_entity_type = fk.principal_entity_type().id();
        let principal_key = fk.principal_key().id();
        let list = fk.property_list().clone();

        for navigation in navigations {
            self.detach_navigation(navigation);
        }
        self.graph.entity_types[entity_type]
            .foreign_keys
            .remove(&(list.clone(), principal_key, principal_entity_type));
        self.graph.entity_types[principal_entity_type]
            .referencing_foreign_keys
            .remove(&foreign_key);
        self.graph.keys[principal_key]
            .referencing_foreign_keys
            .remove(&foreign_key);
        for property in list.iter() {
            self.graph.properties[property]
                .foreign_keys
                .remove(&foreign_key);
        }
        self.graph.foreign_keys.remove(foreign_key);

        debug!(foreign_key = ?foreign_key, "foreign key removed");
        Ok(())
    }

    // =========================================================================
    // Navigations
    // =========================================================================

    /// Adds a navigation on one end of a foreign key.
    ///
    /// The navigation is declared on the dependent when
    /// [`NavigationDef::on_dependent`] is set, otherwise on the principal.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the foreign key does not exist
    /// - `NavigationAlreadySet` if that end already has a navigation
    /// - `InvalidHierarchy` for a collection navigation to the principal
    /// - `DuplicateMember` if the name is taken on the declaring type
    pub fn add_navigation(
        &mut self,
        foreign_key: ForeignKeyId,
        def: NavigationDef,
    ) -> Result<NavigationId> {
        let NavigationDef {
            name,
            on_dependent,
            collection,
            member,
            property_access_mode,
            eager_loaded,
            lazy_loading_enabled,
        } = def;

        let fk = self
            .graph
            .foreign_key(foreign_key)
            .ok_or_else(|| Error::node_not_found(format!("{foreign_key:?}")))?;
        let (declaring, existing) = if on_dependent {
            (fk.declaring_entity_type(), fk.dependent_to_principal())
        } else {
            (fk.principal_entity_type(), fk.principal_to_dependent())
        };
        if let Some(existing) = existing {
            return Err(Error::new(ErrorKind::NavigationAlreadySet(format!(
                "{fk:?} already has navigation '{}'",
                existing.name()
            ))));
        }
        if on_dependent && collection {
            return Err(Error::invalid_hierarchy(format!(
                "navigation '{name}' points to the principal and cannot be a collection"
            )));
        }
        self.check_member_name(declaring.structural_id(), &name)?;
        let declaring_id = declaring.id();

        let name: Arc<str> = Arc::from(name);
        let id = self.graph.navigations.insert(NavigationData {
            base: NavigationBaseData {
                name: Arc::clone(&name),
                declaring_entity_type: declaring_id,
                foreign_key,
                on_dependent,
                collection,
                member,
                property_access_mode,
                eager_loaded,
                lazy_loading_enabled,
                annotations: Annotations::new(),
                runtime: RuntimeAnnotations::new(),
            },
        });
        let fk_data = &mut self.graph.foreign_keys[foreign_key];
        if on_dependent {
            fk_data.dependent_to_principal = Some(id);
        } else {
            fk_data.principal_to_dependent = Some(id);
        }
        self.graph.entity_types[declaring_id]
            .navigations
            .insert(Arc::clone(&name), id);

        debug!(navigation = %name, foreign_key = ?foreign_key, on_dependent, "navigation added");
        Ok(id)
    }

    /// Removes a navigation and clears its foreign key end.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the navigation does not exist.
    pub fn remove_navigation(&mut self, navigation: NavigationId) -> Result<()> {
        if self.detach_navigation(navigation).is_none() {
            return Err(Error::node_not_found(format!("{navigation:?}")));
        }
        debug!(navigation = ?navigation, "navigation removed");
        Ok(())
    }

    fn detach_navigation(&mut self, id: NavigationId) -> Option<NavigationData> {
        let data = self.graph.navigations.remove(id)?;
        let base = &data.base;
        if let Some(entity) = self.graph.entity_types.get_mut(base.declaring_entity_type) {
            entity.navigations.shift_remove(&*base.name);
        }
        if let Some(fk) = self.graph.foreign_keys.get_mut(base.foreign_key) {
            if fk.dependent_to_principal == Some(id) {
                fk.dependent_to_principal = None;
            }
            if fk.principal_to_dependent == Some(id) {
                fk.principal_to_dependent = None;
            }
        }
        Some(data)
    }

    /// Adds a skip navigation on `entity_type` through `foreign_key`.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if an entity type or the foreign key does not exist
    /// - `InvalidHierarchy` if the foreign key end selected by
    ///   [`SkipNavigationDef::on_dependent`] is not this type or a base
    /// - `DuplicateMember` if the name is taken on the type
    pub fn add_skip_navigation(
        &mut self,
        entity_type: EntityTypeId,
        foreign_key: ForeignKeyId,
        def: SkipNavigationDef,
    ) -> Result<SkipNavigationId> {
        let SkipNavigationDef {
            name,
            target,
            collection,
            on_dependent,
            member,
            property_access_mode,
            eager_loaded,
            lazy_loading_enabled,
        } = def;

        let declaring = self.require_entity(entity_type)?;
        self.require_entity(target)?;
        let fk = self
            .graph
            .foreign_key(foreign_key)
            .ok_or_else(|| Error::node_not_found(format!("{foreign_key:?}")))?;
        let end = if on_dependent {
            fk.declaring_entity_type()
        } else {
            fk.principal_entity_type()
        };
        if !end.is_assignable_from(declaring) {
            return Err(Error::invalid_hierarchy(format!(
                "{fk:?} does not connect '{}' to a join type",
                declaring.display_name()
            )));
        }
        self.check_member_name(declaring.structural_id(), &name)?;

        let name: Arc<str> = Arc::from(name);
        let id = self.graph.skip_navigations.insert(SkipNavigationData {
            base: NavigationBaseData {
                name: Arc::clone(&name),
                declaring_entity_type: entity_type,
                foreign_key,
                on_dependent,
                collection,
                member,
                property_access_mode,
                eager_loaded,
                lazy_loading_enabled,
                annotations: Annotations::new(),
                runtime: RuntimeAnnotations::new(),
            },
            target_entity_type: target,
            inverse: None,
        });
        self.graph.entity_types[entity_type]
            .skip_navigations
            .insert(Arc::clone(&name), id);
        self.graph.foreign_keys[foreign_key]
            .referencing_skip_navigations
            .insert(id);

        debug!(skip_navigation = %name, foreign_key = ?foreign_key, "skip navigation added");
        Ok(id)
    }

    /// Sets the inverse of a skip navigation.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if either skip navigation does not exist
    /// - `InvalidHierarchy` unless `inverse` is declared on the target of
    ///   `skip_navigation` and targets its declaring type
    pub fn set_skip_navigation_inverse(
        &mut self,
        skip_navigation: SkipNavigationId,
        inverse: SkipNavigationId,
    ) -> Result<()> {
        let navigation = self
            .graph
            .skip_navigation(skip_navigation)
            .ok_or_else(|| Error::node_not_found(format!("{skip_navigation:?}")))?;
        let candidate = self
            .graph
            .skip_navigation(inverse)
            .ok_or_else(|| Error::node_not_found(format!("{inverse:?}")))?;
        let declared_on_target = candidate
            .declaring_entity_type()
            .is_assignable_from(navigation.target_entity_type());
        let points_back = navigation
            .declaring_entity_type()
            .is_assignable_from(candidate.target_entity_type());
        if !declared_on_target || !points_back {
            return Err(Error::invalid_hierarchy(format!(
                "{candidate:?} cannot be the inverse of {navigation:?}"
            )));
        }
        self.graph.skip_navigations[skip_navigation].inverse = Some(inverse);
        Ok(())
    }

    /// Removes a skip navigation; inverses pointing at it are cleared.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the skip navigation does not exist.
    pub fn remove_skip_navigation(&mut self, skip_navigation: SkipNavigationId) -> Result<()> {
        let data = self
            .graph
            .skip_navigations
            .remove(skip_navigation)
            .ok_or_else(|| Error::node_not_found(format!("{skip_navigation:?}")))?;
        if let Some(entity) = self.graph.entity_types.get_mut(data.base.declaring_entity_type) {
            entity.skip_navigations.shift_remove(&*data.base.name);
        }
        if let Some(fk) = self.graph.foreign_keys.get_mut(data.base.foreign_key) {
            fk.referencing_skip_navigations.remove(&skip_navigation);
        }
        let pointing: Vec<SkipNavigationId> = self
            .graph
            .skip_navigations
            .iter()
            .filter(|(_, other)| other.inverse == Some(skip_navigation))
            .map(|(id, _)| id)
            .collect();
        for id in pointing {
            self.graph.skip_navigations[id].inverse = None;
        }
        debug!(skip_navigation = ?skip_navigation, "skip navigation removed");
        Ok(())
    }

    // =========================================================================
    // Indexes, service properties and triggers
    // =========================================================================

    /// Adds an index over `properties`, in order.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the entity type or a property does not exist
    /// - `InvalidHierarchy` if a property is not on the type or its bases,
    ///   or the descending flags do not match the property count
    /// - `DuplicateIndex` if an unnamed index over the same list, or a named
    ///   index with the same name, exists in the hierarchy
    pub fn add_index(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
        def: IndexDef,
    ) -> Result<IndexId> {
        let IndexDef {
            name,
            unique,
            descending,
        } = def;

        let entity = self.require_entity(entity_type)?;
        let entity_name = entity.display_name();
        self.check_entity_properties(entity, properties)?;
        if descending
            .as_ref()
            .is_some_and(|flags| flags.len() != properties.len())
        {
            return Err(Error::invalid_hierarchy(format!(
                "index on '{entity_name}' has {} properties but a different number of descending flags",
                properties.len()
            )));
        }
        let duplicate = match &name {
            Some(name) => entity
                .root_type()
                .get_derived_types_inclusive()
                .into_iter()
                .any(|ty| ty.find_index_by_name(name).is_some()),
            None => entity.find_index(properties).is_some(),
        };
        if duplicate {
            let described = name
                .clone()
                .unwrap_or_else(|| format!("{{{}}}", self.property_names(properties)));
            return Err(Error::new(ErrorKind::DuplicateIndex(format!(
                "{described} on {entity_name}"
            ))));
        }

        let list = PropertyList::new(properties);
        let name: Option<Arc<str>> = name.map(Arc::from);
        let id = self.graph.indexes.insert(IndexData {
            properties: list.clone(),
            name: name.clone(),
            unique,
            descending,
            declaring_entity_type: entity_type,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });
        let entity = &mut self.graph.entity_types[entity_type];
        match name {
            Some(name) => {
                entity.named_indexes.insert(name, id);
            }
            None => {
                entity.unnamed_indexes.insert(list, id);
            }
        }
        for &property in properties {
            self.graph.properties[property].indexes.insert(id);
        }

        debug!(entity_type = %entity_name, index = ?id, unique, "index added");
        Ok(id)
    }

    /// Removes an index.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the index does not exist.
    pub fn remove_index(&mut self, index: IndexId) -> Result<()> {
        let data = self
            .graph
            .indexes
            .remove(index)
            .ok_or_else(|| Error::node_not_found(format!("{index:?}")))?;
        if let Some(entity) = self.graph.entity_types.get_mut(data.declaring_entity_type) {
            match &data.name {
                Some(name) => {
                    entity.named_indexes.remove(name);
                }
                None => {
                    entity.unnamed_indexes.remove(&data.properties);
                }
            }
        }
        for property in data.properties.iter() {
            if let Some(property) = self.graph.properties.get_mut(property) {
                property.indexes.remove(&index);
            }
        }
        debug!(index = ?index, "index removed");
        Ok(())
    }

    /// Adds a service property.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the entity type does not exist
    /// - `DuplicateMember` if the name is taken in the hierarchy
    pub fn add_service_property(
        &mut self,
        entity_type: EntityTypeId,
        def: ServicePropertyDef,
    ) -> Result<ServicePropertyId> {
        let ServicePropertyDef {
            name,
            service_type,
            member,
            property_access_mode,
        } = def;
        self.require_entity(entity_type)?;
        self.check_member_name(StructuralTypeId::Entity(entity_type), &name)?;

        let name: Arc<str> = Arc::from(name);
        let id = self.graph.service_properties.insert(ServicePropertyData {
            name: Arc::clone(&name),
            declaring_entity_type: entity_type,
            service_type,
            member,
            property_access_mode,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });
        self.graph.entity_types[entity_type]
            .service_properties
            .insert(Arc::clone(&name), id);
        debug!(service_property = %name, "service property added");
        Ok(id)
    }

    /// Removes a service property.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the service property does not exist.
    pub fn remove_service_property(&mut self, service_property: ServicePropertyId) -> Result<()> {
        let data = self
            .graph
            .service_properties
            .remove(service_property)
            .ok_or_else(|| Error::node_not_found(format!("{service_property:?}")))?;
        if let Some(entity) = self.graph.entity_types.get_mut(data.declaring_entity_type) {
            entity.service_properties.shift_remove(&*data.name);
        }
        Ok(())
    }

    /// Adds a trigger.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the entity type does not exist
    /// - `DuplicateMember` if the hierarchy already has a trigger with this name
    pub fn add_trigger(
        &mut self,
        entity_type: EntityTypeId,
        model_name: impl Into<String>,
    ) -> Result<TriggerId> {
        let model_name = model_name.into();
        let entity = self.require_entity(entity_type)?;
        let taken = entity
            .root_type()
            .get_derived_types_inclusive()
            .into_iter()
            .any(|ty| ty.find_declared_trigger(&model_name).is_some());
        if taken {
            return Err(Error::duplicate_member(model_name, entity.display_name()));
        }

        let model_name: Arc<str> = Arc::from(model_name);
        let id = self.graph.triggers.insert(TriggerData {
            model_name: Arc::clone(&model_name),
            declaring_entity_type: entity_type,
            annotations: Annotations::new(),
            runtime: RuntimeAnnotations::new(),
        });
        self.graph.entity_types[entity_type]
            .triggers
            .insert(Arc::clone(&model_name), id);
        debug!(trigger = %model_name, "trigger added");
        Ok(id)
    }

    /// Removes a trigger.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the trigger does not exist.
    pub fn remove_trigger(&mut self, trigger: TriggerId) -> Result<()> {
        let data = self
            .graph
            .triggers
            .remove(trigger)
            .ok_or_else(|| Error::node_not_found(format!("{trigger:?}")))?;
        if let Some(entity) = self.graph.entity_types.get_mut(data.declaring_entity_type) {
            entity.triggers.shift_remove(&*data.model_name);
        }
        Ok(())
    }

    /// Removes a property.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the property does not exist
    /// - `InUse` if a key, foreign key or index contains it
    pub fn remove_property(&mut self, property: PropertyId) -> Result<()> {
        let view = self
            .graph
            .property(property)
            .ok_or_else(|| Error::node_not_found(format!("{property:?}")))?;
        let referenced_by = view
            .get_containing_keys()
            .first()
            .map(|key| format!("{key:?}"))
            .or_else(|| view.get_containing_foreign_keys().first().map(|fk| format!("{fk:?}")))
            .or_else(|| view.get_containing_indexes().first().map(|index| format!("{index:?}")));
        if let Some(referenced_by) = referenced_by {
            return Err(Error::in_use(format!("property '{}'", view.name()), referenced_by));
        }
        let declaring = view.declaring_type().structural_id();
        let name: Arc<str> = Arc::from(view.name());

        if let Some(base) = self.graph.type_base_mut(declaring) {
            base.properties.shift_remove(&*name);
        }
        self.graph.properties.remove(property);
        debug!(property = %name, "property removed");
        Ok(())
    }

    // =========================================================================
    // Annotations and model-level settings
    // =========================================================================

    /// Adds an annotation to any node.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node does not exist
    /// - `DuplicateAnnotation` if the name is taken on the node
    pub fn add_annotation(
        &mut self,
        node: impl Into<NodeId>,
        name: &str,
        value: Value,
    ) -> Result<Annotation> {
        self.annotations_mut(node.into())?.add_annotation(name, value)
    }

    /// Sets an annotation on any node; setting an equal value is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn set_annotation(
        &mut self,
        node: impl Into<NodeId>,
        name: &str,
        value: Value,
    ) -> Result<Annotation> {
        Ok(self.annotations_mut(node.into())?.set_annotation(name, value))
    }

    /// Removes an annotation from any node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn remove_annotation(
        &mut self,
        node: impl Into<NodeId>,
        name: &str,
    ) -> Result<Option<Annotation>> {
        Ok(self.annotations_mut(node.into())?.remove_annotation(name))
    }

    /// Sets the discriminator value of an entity type.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the entity type does not exist.
    pub fn set_discriminator_value(&mut self, entity_type: EntityTypeId, value: Value) -> Result<()> {
        self.set_annotation(entity_type, names::DISCRIMINATOR_VALUE, value)
            .map(|_| ())
    }

    /// Sets whether every discriminator value of the hierarchy is mapped.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the entity type does not exist.
    pub fn set_discriminator_mapping_complete(
        &mut self,
        entity_type: EntityTypeId,
        complete: bool,
    ) -> Result<()> {
        let root = self.require_entity(entity_type)?.root_type().id();
        self.set_annotation(root, names::DISCRIMINATOR_MAPPING_COMPLETE, Value::Bool(complete))
            .map(|_| ())
    }

    /// Sets the query filter of a hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the entity type does not exist.
    pub fn set_query_filter(&mut self, entity_type: EntityTypeId, filter: Value) -> Result<()> {
        let root = self.require_entity(entity_type)?.root_type().id();
        self.set_annotation(root, names::QUERY_FILTER, filter)
            .map(|_| ())
    }

    /// Records the version of the library building the model.
    pub fn set_product_version(&mut self, version: &str) {
        self.graph
            .annotations
            .set_annotation(names::PRODUCT_VERSION, Value::string(version));
    }

    /// Adds or replaces the model-wide configuration of a value type.
    pub fn add_type_mapping_configuration(&mut self, configuration: TypeConfiguration) {
        self.graph
            .type_configurations
            .insert(configuration.value_type.clone(), configuration);
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    fn require_entity(&self, id: EntityTypeId) -> Result<EntityTypeRef<'_>> {
        self.graph
            .entity_type(id)
            .ok_or_else(|| Error::node_not_found(format!("{id:?}")))
    }

    fn require_type(&self, id: StructuralTypeId) -> Result<()> {
        if self.graph.contains_type(id) {
            Ok(())
        } else {
            Err(Error::node_not_found(format!("{id:?}")))
        }
    }

    fn property_mut(&mut self, id: PropertyId) -> Result<&mut PropertyData> {
        self.graph
            .properties
            .get_mut(id)
            .ok_or_else(|| Error::node_not_found(format!("{id:?}")))
    }

    fn annotations_mut(&mut self, node: NodeId) -> Result<&mut Annotations> {
        self.graph
            .node_annotations_mut(node)
            .ok_or_else(|| Error::node_not_found(format!("{node:?}")))
    }

    /// Rejects `name` if any type in the hierarchy of `declaring` has a
    /// member with it.
    fn check_member_name(&self, declaring: StructuralTypeId, name: &str) -> Result<()> {
        let ty = StructuralTypeRef::new(&self.graph, declaring);
        let taken = ty
            .get_derived_types_inclusive()
            .into_iter()
            .any(|candidate| candidate.find_member(name).is_some());
        if taken {
            Err(Error::duplicate_member(name, ty.display_name()))
        } else {
            Ok(())
        }
    }

    /// Checks that `properties` is non-empty and every property is declared
    /// on `entity` or one of its base types.
    fn check_entity_properties(&self, entity: EntityTypeRef<'_>, properties: &[PropertyId]) -> Result<()> {
        if properties.is_empty() {
            return Err(Error::invalid_hierarchy(format!(
                "a property list on '{}' must not be empty",
                entity.display_name()
            )));
        }
        for &id in properties {
            let property = self
                .graph
                .property(id)
                .ok_or_else(|| Error::node_not_found(format!("{id:?}")))?;
            let declared_here = property
                .declaring_type()
                .as_entity_type()
                .is_some_and(|declaring| declaring.is_assignable_from(entity));
            if !declared_here {
                return Err(Error::invalid_hierarchy(format!(
                    "property '{}' is not declared on '{}' or its base types",
                    property.name(),
                    entity.display_name()
                )));
            }
        }
        Ok(())
    }

    fn property_names(&self, properties: &[PropertyId]) -> String {
        properties
            .iter()
            .filter_map(|&id| self.graph.property(id))
            .map(|property| property.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Deref for ModelBuilder {
    type Target = ModelGraph;

    fn deref(&self) -> &ModelGraph {
        &self.graph
    }
}

impl std::fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ModelBuilder").field(&self.graph).finish()
    }
}

fn value_data(value_type: ValueType, nullable: bool, facets: ValueFacets) -> ValueData {
    let ValueFacets {
        max_length,
        unicode,
        precision,
        scale,
        provider_type,
        converter,
        value_comparer,
        json_reader_writer,
        type_mapping,
    } = facets;

    let mut annotations = Annotations::new();
    let facet_values = [
        (names::MAX_LENGTH, max_length.map(Value::Int)),
        (names::UNICODE, unicode.map(Value::Bool)),
        (names::PRECISION, precision.map(Value::Int)),
        (names::SCALE, scale.map(Value::Int)),
    ];
    for (name, value) in facet_values {
        if let Some(value) = value {
            annotations.set_annotation(name, value);
        }
    }

    let mapping_cell = LazyCell::new();
    if let Some(mapping) = type_mapping {
        mapping_cell.get_or_init(|| mapping);
    }

    ValueData {
        value_type,
        nullable,
        provider_type,
        converter,
        value_comparer,
        json_reader_writer,
        type_mapping: mapping_cell,
        annotations,
        runtime: RuntimeAnnotations::new(),
    }
}
