//! Primary and alternate keys.

use std::fmt;
use std::sync::Arc;

use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{Annotatable, Annotations, RuntimeAnnotations, Value};

use crate::entity_type::EntityTypeRef;
use crate::foreign_key::ForeignKeyRef;
use crate::graph::{KeyData, ModelGraph};
use crate::ids::KeyId;
use crate::property::PropertyRef;
use crate::property_list::PropertyList;
use crate::structural::StructuralType;

/// View of a key.
#[derive(Clone, Copy)]
pub struct KeyRef<'g> {
    graph: &'g ModelGraph,
    id: KeyId,
}

impl<'g> KeyRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: KeyId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g KeyData {
        &self.graph.keys[self.id]
    }

    /// Returns the key id.
    #[must_use]
    pub fn id(self) -> KeyId {
        self.id
    }

    /// Returns the key's property list.
    #[must_use]
    pub fn property_list(self) -> &'g PropertyList {
        &self.data().properties
    }

    /// Returns the key properties in order.
    #[must_use]
    pub fn properties(self) -> Vec<PropertyRef<'g>> {
        self.data()
            .properties
            .iter()
            .map(|id| PropertyRef::new(self.graph, id))
            .collect()
    }

    /// Returns the entity type declaring the key.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }

    /// Returns true if this is the declaring type's primary key.
    #[must_use]
    pub fn is_primary_key(self) -> bool {
        self.graph.entity_types[self.data().declaring_entity_type].primary_key == Some(self.id)
    }

    /// Returns the foreign keys targeting this key, in creation order.
    #[must_use]
    pub fn get_referencing_foreign_keys(self) -> Vec<ForeignKeyRef<'g>> {
        self.data()
            .referencing_foreign_keys
            .iter()
            .map(|&id| ForeignKeyRef::new(self.graph, id))
            .collect()
    }

    /// Returns true if any foreign key targets this key.
    #[must_use]
    pub fn is_referenced(self) -> bool {
        !self.data().referencing_foreign_keys.is_empty()
    }

    /// Returns the factory building key values from tracked instances.
    ///
    /// Built on first use and cached once the model is frozen.
    #[must_use]
    pub fn key_value_factory(self) -> Arc<KeyValueFactory> {
        self.graph.memoize(
            &self.data().runtime,
            names::KEY_VALUE_FACTORY,
            || KeyValueFactory::for_key(self),
        )
    }
}

impl Annotatable for KeyRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for KeyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for KeyRef<'_> {}

impl fmt::Debug for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.properties().into_iter().map(PropertyRef::name).collect();
        write!(f, "Key({} {{{}}})", self.declaring_entity_type().name(), names.join(", "))
    }
}

// =============================================================================
// Key Values
// =============================================================================

/// The value of a key for one instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValue(Vec<Value>);

impl KeyValue {
    /// Returns the component values in key order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Returns the single component of a one-property key.
    #[must_use]
    pub fn as_single(&self) -> Option<&Value> {
        match self.0.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }
}

/// Builds [`KeyValue`]s from a row of property values.
///
/// Rows are indexed by property index, as given by
/// [`PropertyRef::property_indexes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValueFactory {
    key: KeyId,
    property_indexes: Vec<usize>,
}

impl KeyValueFactory {
    fn for_key(key: KeyRef<'_>) -> Self {
        let property_indexes = key
            .properties()
            .into_iter()
            .filter_map(|p| p.property_indexes().map(|i| i.index))
            .collect();
        Self {
            key: key.id,
            property_indexes,
        }
    }

    /// Returns the key the factory builds values for.
    #[must_use]
    pub fn key(&self) -> KeyId {
        self.key
    }

    /// Returns the row positions read, in key order.
    #[must_use]
    pub fn property_indexes(&self) -> &[usize] {
        &self.property_indexes
    }

    /// Builds the key value of a row.
    ///
    /// Returns `None` if any component is null or out of range.
    #[must_use]
    pub fn create_key(&self, row: &[Value]) -> Option<KeyValue> {
        self.property_indexes
            .iter()
            .map(|&index| row.get(index).filter(|value| !value.is_null()).cloned())
            .collect::<Option<Vec<Value>>>()
            .map(KeyValue)
    }
}
