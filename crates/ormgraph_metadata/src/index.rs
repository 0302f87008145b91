//! Indexes over entity type properties.

use std::fmt;

use ormgraph_foundation::{Annotatable, Annotations, RuntimeAnnotations};

use crate::entity_type::EntityTypeRef;
use crate::graph::{IndexData, ModelGraph};
use crate::ids::IndexId;
use crate::property::PropertyRef;
use crate::property_list::PropertyList;

/// View of an index.
#[derive(Clone, Copy)]
pub struct IndexRef<'g> {
    graph: &'g ModelGraph,
    id: IndexId,
}

impl<'g> IndexRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: IndexId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g IndexData {
        &self.graph.indexes[self.id]
    }

    /// Returns the index id.
    #[must_use]
    pub fn id(self) -> IndexId {
        self.id
    }

    /// Returns the index name; `None` for unnamed indexes.
    #[must_use]
    pub fn name(self) -> Option<&'g str> {
        self.data().name.as_deref()
    }

    /// Returns the property list.
    #[must_use]
    pub fn property_list(self) -> &'g PropertyList {
        &self.data().properties
    }

    /// Returns the indexed properties in order.
    #[must_use]
    pub fn properties(self) -> Vec<PropertyRef<'g>> {
        self.data()
            .properties
            .iter()
            .map(|id| PropertyRef::new(self.graph, id))
            .collect()
    }

    /// Returns true if values must be unique.
    #[must_use]
    pub fn is_unique(self) -> bool {
        self.data().unique
    }

    /// Returns per-property descending flags, if set.
    #[must_use]
    pub fn is_descending(self) -> Option<&'g [bool]> {
        self.data().descending.as_deref()
    }

    /// Returns the declaring entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }
}

impl Annotatable for IndexRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for IndexRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for IndexRef<'_> {}

impl fmt::Debug for IndexRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.properties().into_iter().map(PropertyRef::name).collect();
        match self.name() {
            Some(name) => write!(f, "Index({name} {{{}}})", names.join(", ")),
            None => write!(f, "Index({{{}}})", names.join(", ")),
        }
    }
}
