//! Slot layout of structural types for change tracking.
//!
//! Each property of a type gets a dense index, plus optional indexes into
//! the original-value, shadow, relationship and store-generated arrays of
//! a tracked instance. Base-type members come first, so a property keeps
//! its indexes in every derived type.

use std::collections::HashMap;
use std::sync::Arc;

use ormgraph_foundation::annotation::names;

use crate::graph::ModelGraph;
use crate::ids::{ComplexPropertyId, NavigationId, PropertyId, SkipNavigationId, StructuralTypeId};
use crate::property::PropertyRef;
use crate::structural::StructuralType;

/// Number of members and tracked slots of a structural type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyCounts {
    /// Scalar properties.
    pub property_count: usize,
    /// Navigations and skip navigations.
    pub navigation_count: usize,
    /// Complex properties.
    pub complex_property_count: usize,
    /// Properties whose original value is kept.
    pub original_value_count: usize,
    /// Shadow properties.
    pub shadow_count: usize,
    /// Key and foreign key properties, then navigations.
    pub relationship_count: usize,
    /// Properties the store may generate.
    pub store_generated_count: usize,
}

/// Slot indexes of one property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyIndexes {
    /// Index among all properties.
    pub index: usize,
    /// Index into original values.
    pub original_value_index: Option<usize>,
    /// Index into shadow values.
    pub shadow_index: Option<usize>,
    /// Index into relationship snapshot values.
    pub relationship_index: Option<usize>,
    /// Index into store-generated values.
    pub store_generation_index: Option<usize>,
}

/// Slot indexes of one navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationIndexes {
    /// Index among all navigations.
    pub index: usize,
    /// Index into relationship snapshot values.
    pub relationship_index: usize,
}

#[derive(Debug, Default)]
pub(crate) struct PropertySlots {
    pub(crate) counts: PropertyCounts,
    pub(crate) properties: HashMap<PropertyId, PropertyIndexes>,
    pub(crate) navigations: HashMap<NavigationId, NavigationIndexes>,
    pub(crate) skip_navigations: HashMap<SkipNavigationId, NavigationIndexes>,
    pub(crate) complex_properties: HashMap<ComplexPropertyId, usize>,
}

/// Returns the slot layout of a type, computing it on first use.
pub(crate) fn property_slots(graph: &ModelGraph, id: StructuralTypeId) -> Arc<PropertySlots> {
    graph.memoize(&graph.type_base(id).runtime, names::PROPERTY_COUNTS, || {
        compute_slots(graph, id)
    })
}

fn compute_slots(graph: &ModelGraph, id: StructuralTypeId) -> PropertySlots {
    let data = graph.type_base(id);
    let mut counts = data
        .base_type
        .map(|base| property_slots(graph, base).counts)
        .unwrap_or_default();
    let mut slots = PropertySlots::default();

    for &property_id in data.properties.values() {
        let property = PropertyRef::new(graph, property_id);
        let indexes = PropertyIndexes {
            index: next(&mut counts.property_count),
            original_value_index: property
                .requires_original_value()
                .then(|| next(&mut counts.original_value_count)),
            shadow_index: property
                .is_shadow_property()
                .then(|| next(&mut counts.shadow_count)),
            relationship_index: (property.is_key() || property.is_foreign_key())
                .then(|| next(&mut counts.relationship_count)),
            store_generation_index: property
                .may_be_store_generated()
                .then(|| next(&mut counts.store_generated_count)),
        };
        slots.properties.insert(property_id, indexes);
    }

    for &complex_id in data.complex_properties.values() {
        slots
            .complex_properties
            .insert(complex_id, next(&mut counts.complex_property_count));
    }

    if let Some(entity) = id.as_entity() {
        let entity = &graph.entity_types[entity];
        for &navigation in entity.navigations.values() {
            let indexes = NavigationIndexes {
                index: next(&mut counts.navigation_count),
                relationship_index: next(&mut counts.relationship_count),
            };
            slots.navigations.insert(navigation, indexes);
        }
        for &skip in entity.skip_navigations.values() {
            let indexes = NavigationIndexes {
                index: next(&mut counts.navigation_count),
                relationship_index: next(&mut counts.relationship_count),
            };
            slots.skip_navigations.insert(skip, indexes);
        }
    }

    slots.counts = counts;
    slots
}

fn next(counter: &mut usize) -> usize {
    let index = *counter;
    *counter += 1;
    index
}

/// Slot indexes of a property, from its declaring type's layout.
pub(crate) fn property_indexes(property: PropertyRef<'_>) -> Option<PropertyIndexes> {
    let slots = property_slots(property.graph_ref(), property.declaring_type().structural_id());
    slots.properties.get(&property.id()).copied()
}
