//! Navigations and skip navigations.

use std::fmt;

use ormgraph_foundation::{Annotatable, Annotations, MemberHandle, RuntimeAnnotations};

use crate::counts::{self, NavigationIndexes};
use crate::entity_type::EntityTypeRef;
use crate::foreign_key::ForeignKeyRef;
use crate::graph::{ModelGraph, NavigationBaseData};
use crate::ids::{NavigationId, SkipNavigationId, StructuralTypeId};
use crate::options::PropertyAccessMode;
use crate::structural::StructuralType;

/// View of a navigation along a foreign key.
#[derive(Clone, Copy)]
pub struct NavigationRef<'g> {
    graph: &'g ModelGraph,
    id: NavigationId,
}

impl<'g> NavigationRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: NavigationId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g NavigationBaseData {
        &self.graph.navigations[self.id].base
    }

    /// Returns the navigation id.
    #[must_use]
    pub fn id(self) -> NavigationId {
        self.id
    }

    /// Returns the navigation name.
    #[must_use]
    pub fn name(self) -> &'g str {
        &self.data().name
    }

    /// Returns the declaring entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }

    /// Returns the foreign key the navigation follows.
    #[must_use]
    pub fn foreign_key(self) -> ForeignKeyRef<'g> {
        ForeignKeyRef::new(self.graph, self.data().foreign_key)
    }

    /// Returns true if declared on the dependent, pointing to the principal.
    #[must_use]
    pub fn is_on_dependent(self) -> bool {
        self.data().on_dependent
    }

    /// Returns true if the navigation holds a collection.
    #[must_use]
    pub fn is_collection(self) -> bool {
        self.data().collection
    }

    /// Returns the entity type the navigation reaches.
    #[must_use]
    pub fn target_entity_type(self) -> EntityTypeRef<'g> {
        let fk = self.foreign_key();
        if self.is_on_dependent() {
            fk.principal_entity_type()
        } else {
            fk.declaring_entity_type()
        }
    }

    /// Returns the navigation at the other end of the foreign key.
    #[must_use]
    pub fn inverse(self) -> Option<NavigationRef<'g>> {
        let fk = self.foreign_key();
        if self.is_on_dependent() {
            fk.principal_to_dependent()
        } else {
            fk.dependent_to_principal()
        }
    }

    /// Returns the application member.
    #[must_use]
    pub fn member(self) -> Option<&'g MemberHandle> {
        self.data().member.as_ref()
    }

    /// Returns the access mode, falling back to the declaring type's.
    #[must_use]
    pub fn property_access_mode(self) -> PropertyAccessMode {
        self.data()
            .property_access_mode
            .unwrap_or_else(|| self.declaring_entity_type().property_access_mode())
    }

    /// Returns true if the target is loaded eagerly.
    #[must_use]
    pub fn is_eager_loaded(self) -> bool {
        self.data().eager_loaded
    }

    /// Returns true if lazy loading is enabled.
    #[must_use]
    pub fn lazy_loading_enabled(self) -> bool {
        self.data().lazy_loading_enabled
    }

    /// Returns the slot indexes of the navigation.
    #[must_use]
    pub fn navigation_indexes(self) -> Option<NavigationIndexes> {
        let slots = counts::property_slots(
            self.graph,
            StructuralTypeId::Entity(self.data().declaring_entity_type),
        );
        slots.navigations.get(&self.id).copied()
    }
}

impl Annotatable for NavigationRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for NavigationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for NavigationRef<'_> {}

impl fmt::Debug for NavigationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Navigation({}.{} -> {})",
            self.declaring_entity_type().name(),
            self.name(),
            self.target_entity_type().name()
        )
    }
}

// =============================================================================
// Skip Navigation
// =============================================================================

/// View of a many-to-many navigation across a join entity type.
#[derive(Clone, Copy)]
pub struct SkipNavigationRef<'g> {
    graph: &'g ModelGraph,
    id: SkipNavigationId,
}

impl<'g> SkipNavigationRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: SkipNavigationId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g NavigationBaseData {
        &self.graph.skip_navigations[self.id].base
    }

    /// Returns the skip navigation id.
    #[must_use]
    pub fn id(self) -> SkipNavigationId {
        self.id
    }

    /// Returns the navigation name.
    #[must_use]
    pub fn name(self) -> &'g str {
        &self.data().name
    }

    /// Returns the declaring entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }

    /// Returns the entity type reached through the join type.
    #[must_use]
    pub fn target_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(
            self.graph,
            self.graph.skip_navigations[self.id].target_entity_type,
        )
    }

    /// Returns the foreign key between the declaring type and the join type.
    #[must_use]
    pub fn foreign_key(self) -> ForeignKeyRef<'g> {
        ForeignKeyRef::new(self.graph, self.data().foreign_key)
    }

    /// Returns the join entity type.
    #[must_use]
    pub fn join_entity_type(self) -> EntityTypeRef<'g> {
        let fk = self.foreign_key();
        if self.is_on_dependent() {
            fk.principal_entity_type()
        } else {
            fk.declaring_entity_type()
        }
    }

    /// Returns true if the declaring type is the dependent of the foreign key.
    #[must_use]
    pub fn is_on_dependent(self) -> bool {
        self.data().on_dependent
    }

    /// Returns true if the navigation holds a collection.
    #[must_use]
    pub fn is_collection(self) -> bool {
        self.data().collection
    }

    /// Returns the skip navigation going the other way.
    #[must_use]
    pub fn inverse(self) -> Option<SkipNavigationRef<'g>> {
        self.graph.skip_navigations[self.id]
            .inverse
            .map(|id| SkipNavigationRef::new(self.graph, id))
    }

    /// Returns the application member.
    #[must_use]
    pub fn member(self) -> Option<&'g MemberHandle> {
        self.data().member.as_ref()
    }

    /// Returns the access mode, falling back to the declaring type's.
    #[must_use]
    pub fn property_access_mode(self) -> PropertyAccessMode {
        self.data()
            .property_access_mode
            .unwrap_or_else(|| self.declaring_entity_type().property_access_mode())
    }

    /// Returns true if the target is loaded eagerly.
    #[must_use]
    pub fn is_eager_loaded(self) -> bool {
        self.data().eager_loaded
    }

    /// Returns true if lazy loading is enabled.
    #[must_use]
    pub fn lazy_loading_enabled(self) -> bool {
        self.data().lazy_loading_enabled
    }

    /// Returns the slot indexes of the navigation.
    #[must_use]
    pub fn navigation_indexes(self) -> Option<NavigationIndexes> {
        let slots = counts::property_slots(
            self.graph,
            StructuralTypeId::Entity(self.data().declaring_entity_type),
        );
        slots.skip_navigations.get(&self.id).copied()
    }
}

impl Annotatable for SkipNavigationRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for SkipNavigationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for SkipNavigationRef<'_> {}

impl fmt::Debug for SkipNavigationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SkipNavigation({}.{} -> {})",
            self.declaring_entity_type().name(),
            self.name(),
            self.target_entity_type().name()
        )
    }
}
