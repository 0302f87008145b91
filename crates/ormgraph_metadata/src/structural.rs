//! Behavior shared by entity and complex types.
//!
//! [`StructuralType`] is implemented by every type view. Its provided
//! methods cover the inheritance walks and member lookups that are the
//! same for both kinds; kind-specific members live on
//! [`EntityTypeRef`] and [`ComplexTypeRef`].

use std::collections::VecDeque;
use std::fmt;

use ormgraph_foundation::{
    Annotatable, Annotations, Error, ErrorContext, HostType, MemberHandle, Result,
    RuntimeAnnotations,
};

use crate::complex::{ComplexPropertyRef, ComplexTypeRef};
use crate::counts::{self, PropertyCounts};
use crate::entity_type::EntityTypeRef;
use crate::graph::{ModelGraph, TypeBaseData};
use crate::ids::StructuralTypeId;
use crate::navigation::{NavigationRef, SkipNavigationRef};
use crate::options::{ChangeTrackingStrategy, PropertyAccessMode};
use crate::property::PropertyRef;
use crate::service::ServicePropertyRef;

/// Read access shared by entity and complex types.
///
/// Views are `Copy`; every method takes `self` by value and returns
/// results borrowed from the graph, not from the view.
pub trait StructuralType<'g>: Copy + Sized {
    /// Returns the graph this view reads from.
    fn graph(self) -> &'g ModelGraph;

    /// Returns the id of this type.
    fn structural_id(self) -> StructuralTypeId;

    /// Wraps an id of the same kind; `None` for the other kind.
    fn from_structural(graph: &'g ModelGraph, id: StructuralTypeId) -> Option<Self>;

    /// Returns a kind-erased view of this type.
    fn as_structural(self) -> StructuralTypeRef<'g> {
        StructuralTypeRef::new(self.graph(), self.structural_id())
    }

    /// Returns the type name.
    fn name(self) -> &'g str {
        &data(self).name
    }

    /// Returns the backing application type.
    fn host_type(self) -> &'g HostType {
        &data(self).host_type
    }

    /// Returns the name without namespace qualifiers.
    ///
    /// Shared-type entity types use their own name, others the host type's.
    fn short_name(self) -> &'g str {
        if self.has_shared_host_type() {
            ormgraph_foundation::handle::short_name(self.name())
        } else {
            self.host_type().short_name()
        }
    }

    /// Returns the name used in messages and debug views.
    fn display_name(self) -> String {
        if self.has_shared_host_type() {
            format!("{} ({})", self.name(), self.host_type().short_name())
        } else {
            self.name().to_owned()
        }
    }

    /// Returns true for entity types sharing their host type.
    fn has_shared_host_type(self) -> bool {
        self.as_structural()
            .as_entity_type()
            .is_some_and(EntityTypeRef::has_shared_host_type)
    }

    /// Returns true if instances are property bags.
    fn is_property_bag(self) -> bool {
        self.host_type().is_property_bag()
    }

    /// Returns the indexer of the host type.
    fn find_indexer_property_info(self) -> Option<&'g MemberHandle> {
        data(self).indexer.as_ref()
    }

    // -------------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------------

    /// Returns the direct base type.
    fn base_type(self) -> Option<Self> {
        let base = data(self).base_type?;
        Self::from_structural(self.graph(), base)
    }

    /// Returns the root of the hierarchy; the type itself if it has no base.
    fn root_type(self) -> Self {
        let mut current = self;
        while let Some(base) = current.base_type() {
            current = base;
        }
        current
    }

    /// Returns the directly derived types in declaration order.
    fn get_directly_derived_types(self) -> Vec<Self> {
        let graph = self.graph();
        data(self)
            .directly_derived
            .iter()
            .filter_map(|&id| Self::from_structural(graph, id))
            .collect()
    }

    /// Returns all derived types, breadth-first.
    fn get_derived_types(self) -> Vec<Self> {
        let graph = self.graph();
        let mut derived = Vec::new();
        let mut queue: VecDeque<StructuralTypeId> =
            data(self).directly_derived.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            queue.extend(graph.type_base(id).directly_derived.iter().copied());
            if let Some(ty) = Self::from_structural(graph, id) {
                derived.push(ty);
            }
        }
        derived
    }

    /// Returns this type followed by all derived types.
    fn get_derived_types_inclusive(self) -> Vec<Self> {
        let mut types = vec![self];
        types.extend(self.get_derived_types());
        types
    }

    /// Returns all base types, root first.
    fn get_all_base_types(self) -> Vec<Self> {
        let mut bases = self.get_all_base_types_ascending();
        bases.reverse();
        bases
    }

    /// Returns all base types, nearest first.
    fn get_all_base_types_ascending(self) -> Vec<Self> {
        let mut bases = Vec::new();
        let mut current = self.base_type();
        while let Some(base) = current {
            bases.push(base);
            current = base.base_type();
        }
        bases
    }

    /// Returns all base types root first, followed by this type.
    fn get_all_base_types_inclusive(self) -> Vec<Self> {
        let mut types = self.get_all_base_types();
        types.push(self);
        types
    }

    /// Returns true if `other` is this type or derives from it.
    fn is_assignable_from(self, other: Self) -> bool {
        let target = self.structural_id();
        let mut current = Some(other);
        while let Some(ty) = current {
            if ty.structural_id() == target {
                return true;
            }
            current = ty.base_type();
        }
        false
    }

    /// Returns true if this type derives, directly or not, from `base`.
    fn is_strictly_derived_from(self, base: Self) -> bool {
        self.structural_id() != base.structural_id() && base.is_assignable_from(self)
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Finds a property declared on this type only.
    fn find_declared_property(self, name: &str) -> Option<PropertyRef<'g>> {
        let graph = self.graph();
        data(self)
            .properties
            .get(name)
            .map(|&id| PropertyRef::new(graph, id))
    }

    /// Finds a property on this type or a base type.
    fn find_property(self, name: &str) -> Option<PropertyRef<'g>> {
        self.find_declared_property(name)
            .or_else(|| self.base_type().and_then(|base| base.find_property(name)))
    }

    /// Gets a property on this type or a base type.
    ///
    /// # Errors
    ///
    /// Returns `PropertyNotFound` if no such property exists.
    fn get_property(self, name: &str) -> Result<PropertyRef<'g>> {
        self.find_property(name).ok_or_else(|| {
            Error::property_not_found(name, self.display_name()).with_context(
                ErrorContext::new()
                    .with_operation("get_property")
                    .with_node(self.display_name()),
            )
        })
    }

    /// Finds each named property; `None` if any is missing.
    fn find_properties(self, names: &[&str]) -> Option<Vec<PropertyRef<'g>>> {
        names.iter().map(|name| self.find_property(name)).collect()
    }

    /// Returns properties declared on this type, in declaration order.
    fn get_declared_properties(self) -> Vec<PropertyRef<'g>> {
        let graph = self.graph();
        data(self)
            .properties
            .values()
            .map(|&id| PropertyRef::new(graph, id))
            .collect()
    }

    /// Returns base-type properties first, then declared ones.
    fn get_properties(self) -> Vec<PropertyRef<'g>> {
        let mut properties = self
            .base_type()
            .map(StructuralType::get_properties)
            .unwrap_or_default();
        properties.extend(self.get_declared_properties());
        properties
    }

    /// Returns properties declared on derived types.
    fn get_derived_properties(self) -> Vec<PropertyRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(StructuralType::get_declared_properties)
            .collect()
    }

    /// Finds properties named `name` on this type, its bases and derived types.
    fn find_properties_in_hierarchy(self, name: &str) -> Vec<PropertyRef<'g>> {
        let mut found: Vec<PropertyRef<'g>> = self.find_property(name).into_iter().collect();
        found.extend(
            self.get_derived_types()
                .into_iter()
                .filter_map(|derived| derived.find_declared_property(name)),
        );
        found
    }

    // -------------------------------------------------------------------------
    // Complex properties
    // -------------------------------------------------------------------------

    /// Finds a complex property declared on this type only.
    fn find_declared_complex_property(self, name: &str) -> Option<ComplexPropertyRef<'g>> {
        let graph = self.graph();
        data(self)
            .complex_properties
            .get(name)
            .map(|&id| ComplexPropertyRef::new(graph, id))
    }

    /// Finds a complex property on this type or a base type.
    fn find_complex_property(self, name: &str) -> Option<ComplexPropertyRef<'g>> {
        self.find_declared_complex_property(name)
            .or_else(|| self.base_type().and_then(|base| base.find_complex_property(name)))
    }

    /// Returns complex properties declared on this type.
    fn get_declared_complex_properties(self) -> Vec<ComplexPropertyRef<'g>> {
        let graph = self.graph();
        data(self)
            .complex_properties
            .values()
            .map(|&id| ComplexPropertyRef::new(graph, id))
            .collect()
    }

    /// Returns base-type complex properties first, then declared ones.
    fn get_complex_properties(self) -> Vec<ComplexPropertyRef<'g>> {
        let mut properties = self
            .base_type()
            .map(StructuralType::get_complex_properties)
            .unwrap_or_default();
        properties.extend(self.get_declared_complex_properties());
        properties
    }

    /// Returns complex properties declared on derived types.
    fn get_derived_complex_properties(self) -> Vec<ComplexPropertyRef<'g>> {
        self.get_derived_types()
            .into_iter()
            .flat_map(StructuralType::get_declared_complex_properties)
            .collect()
    }

    /// Returns all properties, then the flattened properties of each
    /// complex property, depth-first.
    fn get_flattened_properties(self) -> Vec<PropertyRef<'g>> {
        let mut properties = self.get_properties();
        for complex in self.get_complex_properties() {
            properties.extend(complex.complex_type().get_flattened_properties());
        }
        properties
    }

    /// Like [`StructuralType::get_flattened_properties`], declared members only.
    fn get_flattened_declared_properties(self) -> Vec<PropertyRef<'g>> {
        let mut properties = self.get_declared_properties();
        for complex in self.get_declared_complex_properties() {
            properties.extend(complex.complex_type().get_flattened_properties());
        }
        properties
    }

    /// Finds any member by name on this type or a base type.
    fn find_member(self, name: &str) -> Option<MemberRef<'g>> {
        if let Some(property) = self.find_property(name) {
            return Some(MemberRef::Property(property));
        }
        if let Some(complex) = self.find_complex_property(name) {
            return Some(MemberRef::ComplexProperty(complex));
        }
        let entity = self.as_structural().as_entity_type()?;
        entity
            .find_navigation(name)
            .map(MemberRef::Navigation)
            .or_else(|| entity.find_skip_navigation(name).map(MemberRef::SkipNavigation))
            .or_else(|| entity.find_service_property(name).map(MemberRef::ServiceProperty))
    }

    // -------------------------------------------------------------------------
    // Settings and runtime state
    // -------------------------------------------------------------------------

    /// Returns the change tracking strategy.
    ///
    /// Falls back to the base type, then to the type containing a complex
    /// type, then to the model default.
    fn change_tracking_strategy(self) -> ChangeTrackingStrategy {
        let mut current = Some(self.as_structural());
        while let Some(ty) = current {
            if let Some(strategy) = data(ty).change_tracking_strategy {
                return strategy;
            }
            current = ty.base_type().or_else(|| ty.containing_type());
        }
        self.graph().options.change_tracking_strategy
    }

    /// Returns the property access mode, with the same fallback as
    /// [`StructuralType::change_tracking_strategy`].
    fn property_access_mode(self) -> PropertyAccessMode {
        let mut current = Some(self.as_structural());
        while let Some(ty) = current {
            if let Some(mode) = data(ty).property_access_mode {
                return mode;
            }
            current = ty.base_type().or_else(|| ty.containing_type());
        }
        self.graph().options.property_access_mode
    }

    /// Returns member counts, including base types.
    ///
    /// Computed on first use and cached once the model is frozen.
    fn property_counts(self) -> PropertyCounts {
        counts::property_slots(self.graph(), self.structural_id()).counts
    }
}

// =============================================================================
// Structural Type View
// =============================================================================

/// View of an entity or complex type.
#[derive(Clone, Copy)]
pub struct StructuralTypeRef<'g> {
    graph: &'g ModelGraph,
    id: StructuralTypeId,
}

impl<'g> StructuralTypeRef<'g> {
    pub(crate) fn new(graph: &'g ModelGraph, id: StructuralTypeId) -> Self {
        Self { graph, id }
    }

    /// Returns the type id.
    #[must_use]
    pub fn id(self) -> StructuralTypeId {
        self.id
    }

    /// Returns the entity type view, if this is an entity type.
    #[must_use]
    pub fn as_entity_type(self) -> Option<EntityTypeRef<'g>> {
        self.id
            .as_entity()
            .map(|id| EntityTypeRef::new(self.graph, id))
    }

    /// Returns the complex type view, if this is a complex type.
    #[must_use]
    pub fn as_complex_type(self) -> Option<ComplexTypeRef<'g>> {
        self.id
            .as_complex()
            .map(|id| ComplexTypeRef::new(self.graph, id))
    }

    /// Returns the type declaring the complex property of a complex type.
    #[must_use]
    pub fn containing_type(self) -> Option<Self> {
        self.as_complex_type()
            .map(|complex| complex.complex_property().declaring_type())
    }

    /// Returns the entity type at the top of the complex type nesting;
    /// an entity type is its own containing entity type.
    #[must_use]
    pub fn containing_entity_type(self) -> Option<EntityTypeRef<'g>> {
        let mut current = self;
        while let Some(parent) = current.containing_type() {
            current = parent;
        }
        current.as_entity_type()
    }
}

impl<'g> StructuralType<'g> for StructuralTypeRef<'g> {
    fn graph(self) -> &'g ModelGraph {
        self.graph
    }

    fn structural_id(self) -> StructuralTypeId {
        self.id
    }

    fn from_structural(graph: &'g ModelGraph, id: StructuralTypeId) -> Option<Self> {
        Some(Self::new(graph, id))
    }
}

impl Annotatable for StructuralTypeRef<'_> {
    fn annotations(&self) -> &Annotations {
        &data(*self).annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &data(*self).runtime
    }
}

impl PartialEq for StructuralTypeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for StructuralTypeRef<'_> {}

impl fmt::Debug for StructuralTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructuralType({})", self.display_name())
    }
}

// =============================================================================
// Members
// =============================================================================

/// Any named member of a structural type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRef<'g> {
    /// A scalar property.
    Property(PropertyRef<'g>),
    /// A complex property.
    ComplexProperty(ComplexPropertyRef<'g>),
    /// A navigation.
    Navigation(NavigationRef<'g>),
    /// A skip navigation.
    SkipNavigation(SkipNavigationRef<'g>),
    /// A service property.
    ServiceProperty(ServicePropertyRef<'g>),
}

impl<'g> MemberRef<'g> {
    /// Returns the member name.
    #[must_use]
    pub fn name(self) -> &'g str {
        match self {
            Self::Property(p) => p.name(),
            Self::ComplexProperty(p) => p.name(),
            Self::Navigation(n) => n.name(),
            Self::SkipNavigation(n) => n.name(),
            Self::ServiceProperty(s) => s.name(),
        }
    }

    /// Returns the type declaring the member.
    #[must_use]
    pub fn declaring_type(self) -> StructuralTypeRef<'g> {
        match self {
            Self::Property(p) => p.declaring_type(),
            Self::ComplexProperty(p) => p.declaring_type(),
            Self::Navigation(n) => n.declaring_entity_type().as_structural(),
            Self::SkipNavigation(n) => n.declaring_entity_type().as_structural(),
            Self::ServiceProperty(s) => s.declaring_entity_type().as_structural(),
        }
    }
}

fn data<'g, T: StructuralType<'g>>(ty: T) -> &'g TypeBaseData {
    ty.graph().type_base(ty.structural_id())
}
