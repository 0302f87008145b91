//! Scalar properties and primitive collection element types.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{
    Annotatable, Annotations, Error, ErrorKind, MemberHandle, Result, RuntimeAnnotations, Value,
    ValueType,
};

use crate::conversion::{JsonValueReaderWriter, ValueComparer, ValueConverter};
use crate::counts::{self, PropertyIndexes};
use crate::entity_type::EntityTypeRef;
use crate::foreign_key::ForeignKeyRef;
use crate::graph::{ModelGraph, PropertyData, ValueData};
use crate::ids::PropertyId;
use crate::index::IndexRef;
use crate::key::KeyRef;
use crate::mapping::{MappingInfo, TypeMapping};
use crate::options::{ChangeTrackingStrategy, PropertyAccessMode};
use crate::schema::{PropertySaveBehavior, ValueGenerated};
use crate::structural::{StructuralType, StructuralTypeRef};

type ComparerSelector = for<'a> fn(&'a PropertyData) -> Option<&'a Arc<ValueComparer>>;

/// View of a scalar property.
#[derive(Clone, Copy)]
pub struct PropertyRef<'g> {
    graph: &'g ModelGraph,
    id: PropertyId,
}

impl<'g> PropertyRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: PropertyId) -> Self {
        Self { graph, id }
    }

    pub(crate) fn graph_ref(self) -> &'g ModelGraph {
        self.graph
    }

    fn data(self) -> &'g PropertyData {
        &self.graph.properties[self.id]
    }

    /// Returns the property id.
    #[must_use]
    pub fn id(self) -> PropertyId {
        self.id
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(self) -> &'g str {
        &self.data().name
    }

    /// Returns the declaring entity or complex type.
    #[must_use]
    pub fn declaring_type(self) -> StructuralTypeRef<'g> {
        StructuralTypeRef::new(self.graph, self.data().declaring_type)
    }

    /// Returns the entity type containing the property, through complex
    /// types if needed.
    #[must_use]
    pub fn declaring_entity_type(self) -> Option<EntityTypeRef<'g>> {
        self.declaring_type().containing_entity_type()
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(self) -> &'g ValueType {
        &self.data().value.value_type
    }

    /// Returns true if null is allowed.
    #[must_use]
    pub fn is_nullable(self) -> bool {
        self.data().value.nullable
    }

    /// Returns the application member, `None` for shadow properties.
    #[must_use]
    pub fn member(self) -> Option<&'g MemberHandle> {
        self.data().member.as_ref()
    }

    /// Returns true if values are read through the type's indexer.
    #[must_use]
    pub fn is_indexer_property(self) -> bool {
        self.data().indexer
    }

    /// Returns true if the property has no application member.
    #[must_use]
    pub fn is_shadow_property(self) -> bool {
        self.data().member.is_none()
    }

    /// Returns true if the property is a concurrency token.
    #[must_use]
    pub fn is_concurrency_token(self) -> bool {
        self.data().concurrency_token
    }

    /// Returns when the store generates values.
    #[must_use]
    pub fn value_generated(self) -> ValueGenerated {
        self.data().value_generated
    }

    /// Returns the before-save behavior.
    #[must_use]
    pub fn before_save_behavior(self) -> PropertySaveBehavior {
        self.data().before_save
    }

    /// Returns the after-save behavior.
    #[must_use]
    pub fn after_save_behavior(self) -> PropertySaveBehavior {
        self.data().after_save
    }

    /// Returns the access mode, falling back to the declaring type's.
    #[must_use]
    pub fn property_access_mode(self) -> PropertyAccessMode {
        self.data()
            .property_access_mode
            .unwrap_or_else(|| self.declaring_type().property_access_mode())
    }

    /// Returns the value treated as "not set".
    #[must_use]
    pub fn sentinel(self) -> &'g Value {
        &self.data().sentinel
    }

    /// Returns the maximum length.
    #[must_use]
    pub fn max_length(self) -> Option<i64> {
        facet_int(&self.data().value, names::MAX_LENGTH)
    }

    /// Returns whether string data is Unicode.
    #[must_use]
    pub fn is_unicode(self) -> Option<bool> {
        self.data()
            .value
            .annotations
            .find_value(names::UNICODE)
            .and_then(Value::as_bool)
    }

    /// Returns the numeric precision.
    #[must_use]
    pub fn precision(self) -> Option<i64> {
        facet_int(&self.data().value, names::PRECISION)
    }

    /// Returns the numeric scale.
    #[must_use]
    pub fn scale(self) -> Option<i64> {
        facet_int(&self.data().value, names::SCALE)
    }

    /// Returns the storage value type.
    #[must_use]
    pub fn provider_value_type(self) -> Option<&'g ValueType> {
        self.data().value.provider_type.as_ref()
    }

    /// Returns the configured converter.
    #[must_use]
    pub fn value_converter(self) -> Option<&'g Arc<ValueConverter>> {
        self.data().value.converter.as_ref()
    }

    /// Returns the configured JSON reader/writer.
    #[must_use]
    pub fn json_value_reader_writer(self) -> Option<&'g Arc<dyn JsonValueReaderWriter>> {
        self.data().value.json_reader_writer.as_ref()
    }

    // -------------------------------------------------------------------------
    // Keys, foreign keys and indexes
    // -------------------------------------------------------------------------

    /// Returns true if the property is part of the primary key.
    #[must_use]
    pub fn is_primary_key(self) -> bool {
        self.data().primary_key.is_some()
    }

    /// Returns the primary key containing the property.
    #[must_use]
    pub fn find_containing_primary_key(self) -> Option<KeyRef<'g>> {
        self.data()
            .primary_key
            .map(|id| KeyRef::new(self.graph, id))
    }

    /// Returns true if the property is part of any key.
    #[must_use]
    pub fn is_key(self) -> bool {
        !self.data().keys.is_empty()
    }

    /// Returns the keys containing the property, in creation order.
    #[must_use]
    pub fn get_containing_keys(self) -> Vec<KeyRef<'g>> {
        self.data()
            .keys
            .iter()
            .map(|&id| KeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns true if the property is part of any foreign key.
    #[must_use]
    pub fn is_foreign_key(self) -> bool {
        !self.data().foreign_keys.is_empty()
    }

    /// Returns the foreign keys containing the property, in creation order.
    #[must_use]
    pub fn get_containing_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.data()
            .foreign_keys
            .iter()
            .map(|&id| ForeignKeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns true if the property is part of any index.
    #[must_use]
    pub fn is_index(self) -> bool {
        !self.data().indexes.is_empty()
    }

    /// Returns true if the property is part of a unique index.
    #[must_use]
    pub fn is_unique_index(self) -> bool {
        self.get_containing_indexes()
            .into_iter()
            .any(IndexRef::is_unique)
    }

    /// Returns the indexes containing the property, in creation order.
    #[must_use]
    pub fn get_containing_indexes(self) -> Vec<IndexRef<'g>> {
        self.data()
            .indexes
            .iter()
            .map(|&id| IndexRef::new(self.graph, id))
            .collect()
    }

    /// Returns the principal key property at this property's position in
    /// the first foreign key containing it.
    #[must_use]
    pub fn find_first_principal(self) -> Option<PropertyRef<'g>> {
        let graph = self.graph;
        let fk_id = self.data().foreign_keys.iter().next()?;
        let fk = &graph.foreign_keys[*fk_id];
        let position = fk.properties.position(self.id)?;
        graph.keys[fk.principal_key]
            .properties
            .as_slice()
            .get(position)
            .map(|&id| PropertyRef::new(graph, id))
    }

    /// Like [`PropertyRef::find_first_principal`], but `None` when the
    /// principal is this property itself.
    #[must_use]
    pub fn find_first_different_principal(self) -> Option<PropertyRef<'g>> {
        self.find_first_principal()
            .filter(|principal| principal.id != self.id)
    }

    /// Returns this property and every property it transitively
    /// references through foreign keys, breadth-first.
    #[must_use]
    pub fn get_principals(self) -> Vec<PropertyRef<'g>> {
        let graph = self.graph;
        let mut principals = vec![self];
        let mut next = 0;
        while let Some(&current) = principals.get(next) {
            next += 1;
            for &fk_id in &current.data().foreign_keys {
                let fk = &graph.foreign_keys[fk_id];
                let Some(position) = fk.properties.position(current.id) else {
                    continue;
                };
                if let Some(&principal) = graph.keys[fk.principal_key].properties.as_slice().get(position) {
                    if principals.iter().all(|p| p.id != principal) {
                        principals.push(PropertyRef::new(graph, principal));
                    }
                }
            }
        }
        principals
    }

    // -------------------------------------------------------------------------
    // Change tracking
    // -------------------------------------------------------------------------

    /// Returns true if the tracker keeps this property's original value.
    #[must_use]
    pub fn requires_original_value(self) -> bool {
        self.declaring_type().change_tracking_strategy()
            != ChangeTrackingStrategy::ChangingAndChangedNotifications
            || self.is_concurrency_token()
            || self.is_key()
            || self.is_foreign_key()
            || self.is_unique_index()
    }

    /// Returns true if the store may generate the value.
    #[must_use]
    pub fn may_be_store_generated(self) -> bool {
        self.value_generated() != ValueGenerated::Never || self.is_foreign_key()
    }

    /// Returns the slot indexes of the property.
    ///
    /// Always `Some` for a property resolved from a live graph.
    #[must_use]
    pub fn property_indexes(self) -> Option<PropertyIndexes> {
        counts::property_indexes(self)
    }

    // -------------------------------------------------------------------------
    // Type mapping and comparers
    // -------------------------------------------------------------------------

    /// Returns the facets the type mapping is requested with.
    ///
    /// Facets unset on the property come from the model's configuration of
    /// its value type.
    #[must_use]
    pub fn mapping_info(self) -> MappingInfo {
        mapping_info(self.graph, &self.data().value, false)
    }

    /// Returns the resolved type mapping, if already available.
    #[must_use]
    pub fn find_type_mapping(self) -> Option<&'g TypeMapping> {
        self.data().value.type_mapping.get()
    }

    /// Returns the type mapping, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFinalized` if no mapping was set and the model has
    /// no type mapping source, or `NoTypeMapping` if the source cannot map
    /// the property.
    pub fn type_mapping(self) -> Result<&'g TypeMapping> {
        resolve_type_mapping(self.graph, &self.data().value, false, || {
            format!("property '{}.{}'", self.declaring_type().display_name(), self.name())
        })
    }

    /// Returns the comparer for property values.
    ///
    /// A custom comparer wins; otherwise the first principal property's
    /// comparer is used, transitively; otherwise the type mapping's.
    ///
    /// # Errors
    ///
    /// Returns the type mapping error when the mapping is needed but
    /// unavailable.
    pub fn get_value_comparer(self) -> Result<Arc<ValueComparer>> {
        let cache = &self.data().resolved_comparers.value;
        if let Some(comparer) = cache.get() {
            return Ok(Arc::clone(comparer));
        }
        let resolved = match self.resolve_through_principals(|d| d.value.value_comparer.as_ref()) {
            Some(comparer) => comparer,
            None => Arc::clone(self.type_mapping()?.comparer()),
        };
        Ok(self.graph.memoize_cell(cache, resolved))
    }

    /// Returns the comparer for key values, resolved like
    /// [`PropertyRef::get_value_comparer`].
    ///
    /// # Errors
    ///
    /// Returns the type mapping error when the mapping is needed but
    /// unavailable.
    pub fn get_key_value_comparer(self) -> Result<Arc<ValueComparer>> {
        let cache = &self.data().resolved_comparers.key;
        if let Some(comparer) = cache.get() {
            return Ok(Arc::clone(comparer));
        }
        let resolved = match self.resolve_through_principals(|d| {
            d.key_comparer.as_ref().or(d.value.value_comparer.as_ref())
        }) {
            Some(comparer) => comparer,
            None => Arc::clone(self.type_mapping()?.key_comparer()),
        };
        Ok(self.graph.memoize_cell(cache, resolved))
    }

    /// Returns the comparer for storage values.
    ///
    /// # Errors
    ///
    /// Returns the type mapping error when the mapping is needed but
    /// unavailable.
    pub fn get_provider_value_comparer(self) -> Result<Arc<ValueComparer>> {
        let cache = &self.data().resolved_comparers.provider;
        if let Some(comparer) = cache.get() {
            return Ok(Arc::clone(comparer));
        }
        let resolved = match self.resolve_through_principals(|d| d.provider_value_comparer.as_ref()) {
            Some(comparer) => comparer,
            None => match self.value_converter() {
                Some(converter) => Arc::new(ValueComparer::default_for(
                    converter.provider_type().clone(),
                )),
                None => Arc::clone(self.type_mapping()?.provider_value_comparer()),
            },
        };
        Ok(self.graph.memoize_cell(cache, resolved))
    }

    /// Follows first principals until a property yields a comparer.
    /// A cycle yields `None`.
    fn resolve_through_principals(self, select: ComparerSelector) -> Option<Arc<ValueComparer>> {
        let mut visited = HashSet::new();
        let mut current = self;
        loop {
            if let Some(comparer) = select(current.data()) {
                return Some(Arc::clone(comparer));
            }
            if !visited.insert(current.id) {
                return None;
            }
            current = current.find_first_different_principal()?;
        }
    }

    // -------------------------------------------------------------------------
    // Element type
    // -------------------------------------------------------------------------

    /// Returns the element type of a primitive collection property.
    #[must_use]
    pub fn element_type(self) -> Option<ElementTypeRef<'g>> {
        self.data()
            .element_type
            .as_ref()
            .map(|_| ElementTypeRef::new(self.graph, self.id))
    }

    /// Returns true if the property holds a primitive collection.
    #[must_use]
    pub fn is_primitive_collection(self) -> bool {
        self.data().element_type.is_some()
    }
}

impl Annotatable for PropertyRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().value.annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().value.runtime
    }
}

impl PartialEq for PropertyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for PropertyRef<'_> {}

impl fmt::Debug for PropertyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Property({}.{} ({}))",
            self.declaring_type().display_name(),
            self.name(),
            self.value_type()
        )
    }
}

// =============================================================================
// Element Type
// =============================================================================

/// View of the element type of a primitive collection property.
#[derive(Clone, Copy)]
pub struct ElementTypeRef<'g> {
    graph: &'g ModelGraph,
    property: PropertyId,
}

impl<'g> ElementTypeRef<'g> {
    /// Only [`PropertyRef::element_type`] builds these, after checking the
    /// property has an element type. Element types are never cleared, so
    /// `data` always finds one.
    pub(crate) fn new(graph: &'g ModelGraph, property: PropertyId) -> Self {
        debug_assert!(graph.properties[property].element_type.is_some());
        Self { graph, property }
    }

    fn data(self) -> &'g ValueData {
        match self.graph.properties[self.property].element_type.as_deref() {
            Some(data) => data,
            None => panic!("property {:?} has no element type", self.property),
        }
    }

    /// Returns the collection property owning this element type.
    #[must_use]
    pub fn collection_property(self) -> PropertyRef<'g> {
        PropertyRef::new(self.graph, self.property)
    }

    /// Returns the element value type.
    #[must_use]
    pub fn value_type(self) -> &'g ValueType {
        &self.data().value_type
    }

    /// Returns true if elements may be null.
    #[must_use]
    pub fn is_nullable(self) -> bool {
        self.data().nullable
    }

    /// Returns the maximum element length.
    #[must_use]
    pub fn max_length(self) -> Option<i64> {
        facet_int(self.data(), names::MAX_LENGTH)
    }

    /// Returns the element converter.
    #[must_use]
    pub fn value_converter(self) -> Option<&'g Arc<ValueConverter>> {
        self.data().converter.as_ref()
    }

    /// Returns the element type mapping, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Same as [`PropertyRef::type_mapping`].
    pub fn type_mapping(self) -> Result<&'g TypeMapping> {
        resolve_type_mapping(self.graph, self.data(), true, || {
            format!("element type of '{}'", self.collection_property().name())
        })
    }

    /// Returns the element comparer: the custom one, else the mapping's.
    ///
    /// # Errors
    ///
    /// Same as [`PropertyRef::type_mapping`].
    pub fn get_value_comparer(self) -> Result<Arc<ValueComparer>> {
        match &self.data().value_comparer {
            Some(comparer) => Ok(Arc::clone(comparer)),
            None => Ok(Arc::clone(self.type_mapping()?.comparer())),
        }
    }
}

impl Annotatable for ElementTypeRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl fmt::Debug for ElementTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementType({})", self.value_type())
    }
}

// =============================================================================
// Shared resolution
// =============================================================================

fn facet_int(data: &ValueData, name: &str) -> Option<i64> {
    data.annotations.find_value(name).and_then(Value::as_int)
}

fn mapping_info(graph: &ModelGraph, data: &ValueData, is_element: bool) -> MappingInfo {
    let config = graph.find_type_mapping_configuration(&data.value_type);
    let unicode = data
        .annotations
        .find_value(names::UNICODE)
        .and_then(Value::as_bool);
    MappingInfo {
        value_type: Some(data.value_type.clone()),
        provider_type: data
            .provider_type
            .clone()
            .or_else(|| config.and_then(|c| c.provider_type.clone())),
        max_length: facet_int(data, names::MAX_LENGTH).or_else(|| config.and_then(|c| c.max_length)),
        unicode: unicode.or_else(|| config.and_then(|c| c.unicode)),
        precision: facet_int(data, names::PRECISION).or_else(|| config.and_then(|c| c.precision)),
        scale: facet_int(data, names::SCALE).or_else(|| config.and_then(|c| c.scale)),
        converter: data
            .converter
            .clone()
            .or_else(|| config.and_then(|c| c.converter.clone())),
        is_element,
    }
}

fn resolve_type_mapping<'g, F>(
    graph: &'g ModelGraph,
    data: &'g ValueData,
    is_element: bool,
    describe: F,
) -> Result<&'g TypeMapping>
where
    F: FnOnce() -> String,
{
    if let Some(mapping) = data.type_mapping.get() {
        return Ok(mapping);
    }
    let dependencies = graph
        .model_dependencies()
        .ok_or_else(|| Error::model_not_finalized("type_mapping"))?;
    let info = mapping_info(graph, data, is_element);
    let mapping = dependencies
        .type_mapping_source()
        .find_mapping(&info)
        .ok_or_else(|| Error::new(ErrorKind::NoTypeMapping(describe())))?;
    Ok(data.type_mapping.get_or_init(|| mapping))
}
