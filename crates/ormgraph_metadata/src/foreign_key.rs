//! Foreign keys: the edges between dependent and principal entity types.

use std::fmt;

use ormgraph_foundation::{Annotatable, Annotations, RuntimeAnnotations};

use crate::entity_type::EntityTypeRef;
use crate::graph::{ForeignKeyData, ModelGraph};
use crate::ids::ForeignKeyId;
use crate::key::KeyRef;
use crate::navigation::{NavigationRef, SkipNavigationRef};
use crate::property::PropertyRef;
use crate::property_list::PropertyList;
use crate::schema::DeleteBehavior;
use crate::structural::StructuralType;

/// View of a foreign key.
#[derive(Clone, Copy)]
pub struct ForeignKeyRef<'g> {
    graph: &'g ModelGraph,
    id: ForeignKeyId,
}

impl<'g> ForeignKeyRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: ForeignKeyId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g ForeignKeyData {
        &self.graph.foreign_keys[self.id]
    }

    /// Returns the foreign key id.
    #[must_use]
    pub fn id(self) -> ForeignKeyId {
        self.id
    }

    /// Returns the dependent property list.
    #[must_use]
    pub fn property_list(self) -> &'g PropertyList {
        &self.data().properties
    }

    /// Returns the dependent properties in order.
    #[must_use]
    pub fn properties(self) -> Vec<PropertyRef<'g>> {
        self.data()
            .properties
            .iter()
            .map(|id| PropertyRef::new(self.graph, id))
            .collect()
    }

    /// Returns the referenced key.
    #[must_use]
    pub fn principal_key(self) -> KeyRef<'g> {
        KeyRef::new(self.graph, self.data().principal_key)
    }

    /// Returns the dependent entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }

    /// Returns the principal entity type.
    #[must_use]
    pub fn principal_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().principal_entity_type)
    }

    /// Returns the delete behavior.
    #[must_use]
    pub fn delete_behavior(self) -> DeleteBehavior {
        self.data().delete_behavior
    }

    /// Returns true if at most one dependent exists per principal.
    #[must_use]
    pub fn is_unique(self) -> bool {
        self.data().unique
    }

    /// Returns true if every dependent must have a principal.
    #[must_use]
    pub fn is_required(self) -> bool {
        self.data().required
    }

    /// Returns true if every principal must have a dependent.
    #[must_use]
    pub fn is_required_dependent(self) -> bool {
        self.data().required_dependent
    }

    /// Returns true if the principal owns the dependent.
    #[must_use]
    pub fn is_ownership(self) -> bool {
        self.data().ownership
    }

    /// Returns true if both ends are the same entity type.
    #[must_use]
    pub fn is_self_referencing(self) -> bool {
        self.data().declaring_entity_type == self.data().principal_entity_type
    }

    /// Returns the navigation on the dependent, pointing to the principal.
    #[must_use]
    pub fn dependent_to_principal(self) -> Option<NavigationRef<'g>> {
        self.data()
            .dependent_to_principal
            .map(|id| NavigationRef::new(self.graph, id))
    }

    /// Returns the navigation on the principal, pointing to dependents.
    #[must_use]
    pub fn principal_to_dependent(self) -> Option<NavigationRef<'g>> {
        self.data()
            .principal_to_dependent
            .map(|id| NavigationRef::new(self.graph, id))
    }

    /// Returns the navigation pointing to the principal or to dependents.
    #[must_use]
    pub fn get_navigation(self, points_to_principal: bool) -> Option<NavigationRef<'g>> {
        if points_to_principal {
            self.dependent_to_principal()
        } else {
            self.principal_to_dependent()
        }
    }

    /// Returns the skip navigations that use this foreign key.
    #[must_use]
    pub fn get_referencing_skip_navigations(self) -> Vec<SkipNavigationRef<'g>> {
        self.data()
            .referencing_skip_navigations
            .iter()
            .map(|&id| SkipNavigationRef::new(self.graph, id))
            .collect()
    }

    /// Returns the entity type at the other end from `entity_type`.
    ///
    /// Returns `None` if `entity_type` is at neither end.
    #[must_use]
    pub fn get_related_entity_type(self, entity_type: EntityTypeRef<'g>) -> Option<EntityTypeRef<'g>> {
        let dependent = self.declaring_entity_type();
        let principal = self.principal_entity_type();
        if dependent.is_assignable_from(entity_type) {
            Some(principal)
        } else if principal.is_assignable_from(entity_type) {
            Some(dependent)
        } else {
            None
        }
    }
}

impl Annotatable for ForeignKeyRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for ForeignKeyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for ForeignKeyRef<'_> {}

impl fmt::Debug for ForeignKeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.properties().into_iter().map(PropertyRef::name).collect();
        write!(
            f,
            "ForeignKey({} {{{}}} -> {})",
            self.declaring_entity_type().name(),
            names.join(", "),
            self.principal_entity_type().name()
        )
    }
}
