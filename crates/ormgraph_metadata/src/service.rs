//! Service properties and triggers.

use std::fmt;

use ormgraph_foundation::{Annotatable, Annotations, HostType, MemberHandle, RuntimeAnnotations};

use crate::entity_type::EntityTypeRef;
use crate::graph::{ModelGraph, ServicePropertyData, TriggerData};
use crate::ids::{ServicePropertyId, TriggerId};
use crate::options::PropertyAccessMode;
use crate::structural::StructuralType;

/// View of a member injected with a service instead of stored data.
#[derive(Clone, Copy)]
pub struct ServicePropertyRef<'g> {
    graph: &'g ModelGraph,
    id: ServicePropertyId,
}

impl<'g> ServicePropertyRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: ServicePropertyId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g ServicePropertyData {
        &self.graph.service_properties[self.id]
    }

    /// Returns the service property id.
    #[must_use]
    pub fn id(self) -> ServicePropertyId {
        self.id
    }

    /// Returns the member name.
    #[must_use]
    pub fn name(self) -> &'g str {
        &self.data().name
    }

    /// Returns the injected service type.
    #[must_use]
    pub fn service_type(self) -> &'g HostType {
        &self.data().service_type
    }

    /// Returns the declaring entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
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
}

impl Annotatable for ServicePropertyRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for ServicePropertyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for ServicePropertyRef<'_> {}

impl fmt::Debug for ServicePropertyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceProperty({}: {})", self.name(), self.service_type())
    }
}

/// View of a store trigger declared on an entity type.
#[derive(Clone, Copy)]
pub struct TriggerRef<'g> {
    graph: &'g ModelGraph,
    id: TriggerId,
}

impl<'g> TriggerRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: TriggerId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g TriggerData {
        &self.graph.triggers[self.id]
    }

    /// Returns the trigger id.
    #[must_use]
    pub fn id(self) -> TriggerId {
        self.id
    }

    /// Returns the trigger's model name.
    #[must_use]
    pub fn model_name(self) -> &'g str {
        &self.data().model_name
    }

    /// Returns the declaring entity type.
    #[must_use]
    pub fn declaring_entity_type(self) -> EntityTypeRef<'g> {
        EntityTypeRef::new(self.graph, self.data().declaring_entity_type)
    }
}

impl Annotatable for TriggerRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl fmt::Debug for TriggerRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger({})", self.model_name())
    }
}
