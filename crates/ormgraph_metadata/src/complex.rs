//! Complex types and the complex properties that own them.
//!
//! A complex type has no identity of its own: each complex property owns
//! exactly one complex type, whose members are stored inline with the
//! containing entity.

use std::fmt;

use ormgraph_foundation::{Annotatable, Annotations, MemberHandle, RuntimeAnnotations};

use crate::graph::{ComplexPropertyData, ModelGraph};
use crate::ids::{ComplexPropertyId, ComplexTypeId, StructuralTypeId};
use crate::options::PropertyAccessMode;
use crate::structural::{StructuralType, StructuralTypeRef};

/// View of a complex type.
#[derive(Clone, Copy)]
pub struct ComplexTypeRef<'g> {
    graph: &'g ModelGraph,
    id: ComplexTypeId,
}

impl<'g> ComplexTypeRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: ComplexTypeId) -> Self {
        Self { graph, id }
    }

    /// Returns the complex type id.
    #[must_use]
    pub fn id(self) -> ComplexTypeId {
        self.id
    }

    /// Returns the complex property owning this type.
    #[must_use]
    pub fn complex_property(self) -> ComplexPropertyRef<'g> {
        ComplexPropertyRef::new(self.graph, self.graph.complex_types[self.id].complex_property)
    }
}

impl<'g> StructuralType<'g> for ComplexTypeRef<'g> {
    fn graph(self) -> &'g ModelGraph {
        self.graph
    }

    fn structural_id(self) -> StructuralTypeId {
        StructuralTypeId::Complex(self.id)
    }

    fn from_structural(graph: &'g ModelGraph, id: StructuralTypeId) -> Option<Self> {
        id.as_complex().map(|id| Self::new(graph, id))
    }
}

impl Annotatable for ComplexTypeRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.graph.complex_types[self.id].base.annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.graph.complex_types[self.id].base.runtime
    }
}

impl PartialEq for ComplexTypeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for ComplexTypeRef<'_> {}

impl fmt::Debug for ComplexTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComplexType({})", self.display_name())
    }
}

// =============================================================================
// Complex Property
// =============================================================================

/// View of a property whose value is a complex type instance.
#[derive(Clone, Copy)]
pub struct ComplexPropertyRef<'g> {
    graph: &'g ModelGraph,
    id: ComplexPropertyId,
}

impl<'g> ComplexPropertyRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: ComplexPropertyId) -> Self {
        Self { graph, id }
    }

    fn data(self) -> &'g ComplexPropertyData {
        &self.graph.complex_properties[self.id]
    }

    /// Returns the complex property id.
    #[must_use]
    pub fn id(self) -> ComplexPropertyId {
        self.id
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(self) -> &'g str {
        &self.data().name
    }

    /// Returns the declaring type.
    #[must_use]
    pub fn declaring_type(self) -> StructuralTypeRef<'g> {
        StructuralTypeRef::new(self.graph, self.data().declaring_type)
    }

    /// Returns the owned complex type.
    #[must_use]
    pub fn complex_type(self) -> ComplexTypeRef<'g> {
        ComplexTypeRef::new(self.graph, self.data().complex_type)
    }

    /// Returns true if the property may be null.
    #[must_use]
    pub fn is_nullable(self) -> bool {
        self.data().nullable
    }

    /// Returns true if the property holds a collection.
    #[must_use]
    pub fn is_collection(self) -> bool {
        self.data().collection
    }

    /// Returns the application member.
    #[must_use]
    pub fn member(self) -> Option<&'g MemberHandle> {
        self.data().member.as_ref()
    }

    /// Returns true if the property has no application member.
    #[must_use]
    pub fn is_shadow_property(self) -> bool {
        self.data().member.is_none()
    }

    /// Returns the access mode, falling back to the declaring type's.
    #[must_use]
    pub fn property_access_mode(self) -> PropertyAccessMode {
        self.data()
            .property_access_mode
            .unwrap_or_else(|| self.declaring_type().property_access_mode())
    }
}

impl Annotatable for ComplexPropertyRef<'_> {
    fn annotations(&self) -> &Annotations {
        &self.data().annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.data().runtime
    }
}

impl PartialEq for ComplexPropertyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for ComplexPropertyRef<'_> {}

impl fmt::Debug for ComplexPropertyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComplexProperty({}.{} ({}))",
            self.declaring_type().display_name(),
            self.name(),
            self.complex_type().name()
        )
    }
}
