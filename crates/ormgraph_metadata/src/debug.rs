//! Human-readable dumps of the metadata graph.
//!
//! The text is for inspection during development and carries no
//! compatibility guarantee. Rendering never fails: problems found along the
//! way (an unresolvable type mapping, a missing slot layout) are written
//! inline as `<error: ...>`.

use std::fmt::Write;

use ormgraph_foundation::{Annotatable, Annotations};

use crate::complex::{ComplexPropertyRef, ComplexTypeRef};
use crate::entity_type::EntityTypeRef;
use crate::foreign_key::ForeignKeyRef;
use crate::graph::ModelGraph;
use crate::index::IndexRef;
use crate::key::KeyRef;
use crate::navigation::{NavigationRef, SkipNavigationRef};
use crate::options::ChangeTrackingStrategy;
use crate::property::{ElementTypeRef, PropertyRef};
use crate::schema::ValueGenerated;
use crate::service::{ServicePropertyRef, TriggerRef};
use crate::structural::StructuralType;

/// What a debug dump includes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugStringOptions {
    /// Render annotations and type mappings.
    pub include_annotations: bool,
    /// Render change-tracking slot indexes.
    pub include_property_indexes: bool,
    /// Render only the first line of each node.
    pub single_line: bool,
}

impl DebugStringOptions {
    /// Members and facets only.
    #[must_use]
    pub const fn short() -> Self {
        Self {
            include_annotations: false,
            include_property_indexes: false,
            single_line: false,
        }
    }

    /// Everything.
    #[must_use]
    pub const fn long() -> Self {
        Self {
            include_annotations: true,
            include_property_indexes: true,
            single_line: false,
        }
    }

    /// A one-line summary.
    #[must_use]
    pub const fn single_line() -> Self {
        Self {
            include_annotations: false,
            include_property_indexes: false,
            single_line: true,
        }
    }
}

/// Short and long renderings of one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugView {
    short_view: String,
    long_view: String,
}

impl DebugView {
    fn new(render: impl Fn(DebugStringOptions) -> String) -> Self {
        Self {
            short_view: render(DebugStringOptions::short()),
            long_view: render(DebugStringOptions::long()),
        }
    }

    /// Returns the rendering without annotations or slot indexes.
    #[must_use]
    pub fn short_view(&self) -> &str {
        &self.short_view
    }

    /// Returns the full rendering.
    #[must_use]
    pub fn long_view(&self) -> &str {
        &self.long_view
    }
}

macro_rules! debug_view {
    ($($view:ident),* $(,)?) => {
        $(
            impl $view<'_> {
                /// Returns the short and long renderings of this node.
                #[must_use]
                pub fn debug_view(self) -> DebugView {
                    DebugView::new(|options| self.to_debug_string(options, 0))
                }
            }
        )*
    };
}

debug_view!(
    EntityTypeRef,
    ComplexTypeRef,
    PropertyRef,
    ElementTypeRef,
    ComplexPropertyRef,
    KeyRef,
    ForeignKeyRef,
    NavigationRef,
    SkipNavigationRef,
    IndexRef,
    ServicePropertyRef,
    TriggerRef,
);

// =============================================================================
// Model
// =============================================================================

impl ModelGraph {
    /// Renders the model and every entity type.
    #[must_use]
    pub fn to_debug_string(&self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}Model:");
        if options.single_line {
            let _ = write!(out, " {} entity types", self.entity_type_count());
            return out;
        }
        for entity_type in self.get_entity_types() {
            out.push('\n');
            out.push_str(&entity_type.to_debug_string(options, indent + 2));
        }
        write_annotations(&mut out, &self.annotations, options, indent);
        out
    }

    /// Returns the short and long renderings of the model.
    #[must_use]
    pub fn debug_view(&self) -> DebugView {
        DebugView::new(|options| self.to_debug_string(options, 0))
    }
}

// =============================================================================
// Structural types
// =============================================================================

impl EntityTypeRef<'_> {
    /// Renders the entity type and its declared members.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}EntityType: {}", self.display_name());
        if let Some(base) = self.base_type() {
            let _ = write!(out, " Base: {}", base.display_name());
        }
        if self.is_keyless() {
            out.push_str(" Keyless");
        }
        if self.is_owned() {
            out.push_str(" Owned");
        }
        if self.has_shared_host_type() {
            let _ = write!(out, " Shared: {}", self.host_type());
        }
        let strategy = self.change_tracking_strategy();
        if strategy != ChangeTrackingStrategy::Snapshot {
            let _ = write!(out, " ChangeTrackingStrategy.{strategy:?}");
        }
        if let Some(value) = self.discriminator_value() {
            let _ = write!(out, " Discriminator: {value}");
        }
        if options.single_line {
            return out;
        }

        let inner = indent + 2;
        let members = indent + 4;
        write_section(&mut out, "Properties", inner, self.get_declared_properties(), |p| {
            p.to_debug_string(options, members)
        });
        write_section(
            &mut out,
            "Complex properties",
            inner,
            self.get_declared_complex_properties(),
            |p| p.to_debug_string(options, members),
        );
        write_section(&mut out, "Navigations", inner, self.get_declared_navigations(), |n| {
            n.to_debug_string(options, members)
        });
        write_section(
            &mut out,
            "Skip navigations",
            inner,
            self.get_declared_skip_navigations(),
            |n| n.to_debug_string(options, members),
        );
        write_section(&mut out, "Keys", inner, self.get_declared_keys(), |k| {
            k.to_debug_string(options, members)
        });
        write_section(&mut out, "Foreign keys", inner, self.get_declared_foreign_keys(), |fk| {
            fk.to_debug_string(options, members)
        });
        write_section(&mut out, "Indexes", inner, self.get_declared_indexes(), |i| {
            i.to_debug_string(options, members)
        });
        write_section(
            &mut out,
            "Service properties",
            inner,
            self.get_declared_service_properties(),
            |s| s.to_debug_string(options, members),
        );
        write_section(&mut out, "Triggers", inner, self.get_declared_triggers(), |t| {
            t.to_debug_string(options, members)
        });
        write_annotations(&mut out, self.annotations(), options, indent);
        out
    }
}

impl ComplexTypeRef<'_> {
    /// Renders the complex type and its members.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}ComplexType: {}", self.display_name());
        if options.single_line {
            return out;
        }
        let members = indent + 4;
        write_section(&mut out, "Properties", indent + 2, self.get_declared_properties(), |p| {
            p.to_debug_string(options, members)
        });
        write_section(
            &mut out,
            "Complex properties",
            indent + 2,
            self.get_declared_complex_properties(),
            |p| p.to_debug_string(options, members),
        );
        write_annotations(&mut out, self.annotations(), options, indent);
        out
    }
}

// =============================================================================
// Properties
// =============================================================================

impl PropertyRef<'_> {
    /// Renders the property with its facets.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{} ({})", self.name(), self.value_type());
        let flags = [
            (self.is_shadow_property(), " Shadow"),
            (self.is_indexer_property(), " Indexer"),
            (!self.is_nullable(), " Required"),
            (self.is_primary_key(), " PK"),
            (self.is_foreign_key(), " FK"),
            (self.is_index(), " Index"),
            (self.is_concurrency_token(), " Concurrency"),
        ];
        for (set, flag) in flags {
            if set {
                out.push_str(flag);
            }
        }
        if self.value_generated() != ValueGenerated::Never {
            let _ = write!(out, " ValueGenerated.{:?}", self.value_generated());
        }
        if let Some(max_length) = self.max_length() {
            let _ = write!(out, " MaxLength({max_length})");
        }
        if let Some(unicode) = self.is_unicode() {
            out.push_str(if unicode { " Unicode" } else { " Ansi" });
        }
        if let Some(precision) = self.precision() {
            let _ = write!(out, " Precision({precision})");
        }
        if let Some(scale) = self.scale() {
            let _ = write!(out, " Scale({scale})");
        }
        if let Some(provider) = self.provider_value_type() {
            let _ = write!(out, " Provider: {provider}");
        }
        if let Some(converter) = self.value_converter() {
            let _ = write!(out, " Converter: {}", converter.name());
        }
        if options.include_property_indexes {
            match self.property_indexes() {
                Some(indexes) => {
                    let _ = write!(
                        out,
                        " PropertyIndexes({}, {}, {}, {}, {})",
                        indexes.index,
                        slot(indexes.original_value_index),
                        slot(indexes.shadow_index),
                        slot(indexes.relationship_index),
                        slot(indexes.store_generation_index)
                    );
                }
                None => out.push_str(" PropertyIndexes(<error: no slot layout>)"),
            }
        }
        if options.single_line {
            return out;
        }

        if let Some(element) = self.element_type() {
            out.push('\n');
            out.push_str(&element.to_debug_string(options, indent + 2));
        }
        if options.include_annotations {
            let _ = write!(out, "\n{pad}  TypeMapping: ");
            match self.type_mapping() {
                Ok(mapping) => out.push_str(mapping.store_type().unwrap_or("-")),
                Err(e) => {
                    let _ = write!(out, "<error: {e}>");
                }
            }
        }
        write_annotations(&mut out, self.annotations(), options, indent);
        out
    }
}

impl ElementTypeRef<'_> {
    /// Renders the element type of a primitive collection.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}Element type: {}", self.value_type());
        if !self.is_nullable() {
            out.push_str(" Required");
        }
        if let Some(max_length) = self.max_length() {
            let _ = write!(out, " MaxLength({max_length})");
        }
        if let Some(converter) = self.value_converter() {
            let _ = write!(out, " Converter: {}", converter.name());
        }
        if options.single_line {
            return out;
        }
        write_annotations(&mut out, self.annotations(), options, indent);
        out
    }
}

impl ComplexPropertyRef<'_> {
    /// Renders the complex property and the complex type it owns.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{} ({})", self.name(), self.complex_type().host_type());
        if self.is_shadow_property() {
            out.push_str(" Shadow");
        }
        if !self.is_nullable() {
            out.push_str(" Required");
        }
        if self.is_collection() {
            out.push_str(" Collection");
        }
        if options.single_line {
            return out;
        }
        out.push('\n');
        out.push_str(&self.complex_type().to_debug_string(options, indent + 2));
        write_annotations(&mut out, self.annotations(), options, indent);
        out
    }
}

impl ServicePropertyRef<'_> {
    /// Renders the service property.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{} ({})", self.name(), self.service_type());
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

// =============================================================================
// Keys and relationships
// =============================================================================

impl KeyRef<'_> {
    /// Renders the key's property list.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{}", names(self.properties()));
        if self.is_primary_key() {
            out.push_str(" PK");
        }
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

impl ForeignKeyRef<'_> {
    /// Renders both ends of the relationship.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!(
            "{pad}{} {{{}}} -> {} {{{}}}",
            self.declaring_entity_type().display_name(),
            names(self.properties()),
            self.principal_entity_type().display_name(),
            names(self.principal_key().properties())
        );
        let flags = [
            (self.is_unique(), " Unique"),
            (self.is_required(), " Required"),
            (self.is_required_dependent(), " RequiredDependent"),
            (self.is_ownership(), " Ownership"),
        ];
        for (set, flag) in flags {
            if set {
                out.push_str(flag);
            }
        }
        let _ = write!(out, " {:?}", self.delete_behavior());
        if let Some(navigation) = self.principal_to_dependent() {
            let _ = write!(out, " ToDependent: {}", navigation.name());
        }
        if let Some(navigation) = self.dependent_to_principal() {
            let _ = write!(out, " ToPrincipal: {}", navigation.name());
        }
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

impl NavigationRef<'_> {
    /// Renders the navigation and where it points.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let target = self.target_entity_type().display_name();
        let mut out = if self.is_collection() {
            format!("{pad}{} (Collection<{target}>)", self.name())
        } else {
            format!("{pad}{} ({target})", self.name())
        };
        out.push_str(if self.is_on_dependent() {
            " ToPrincipal"
        } else {
            " ToDependent"
        });
        let _ = write!(out, " {target}");
        if let Some(inverse) = self.inverse() {
            let _ = write!(out, " Inverse: {}", inverse.name());
        }
        if self.is_eager_loaded() {
            out.push_str(" Eager");
        }
        if options.include_property_indexes {
            write_navigation_indexes(&mut out, self.navigation_indexes());
        }
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

impl SkipNavigationRef<'_> {
    /// Renders the skip navigation and its join type.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let target = self.target_entity_type().display_name();
        let mut out = if self.is_collection() {
            format!("{pad}{} (Collection<{target}>)", self.name())
        } else {
            format!("{pad}{} ({target})", self.name())
        };
        let _ = write!(out, " {target}");
        if let Some(inverse) = self.inverse() {
            let _ = write!(out, " Inverse: {}", inverse.name());
        }
        let _ = write!(out, " Join: {}", self.join_entity_type().display_name());
        if self.is_eager_loaded() {
            out.push_str(" Eager");
        }
        if options.include_property_indexes {
            write_navigation_indexes(&mut out, self.navigation_indexes());
        }
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

impl IndexRef<'_> {
    /// Renders the index's property list and options.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{}", names(self.properties()));
        if let Some(name) = self.name() {
            let _ = write!(out, " {name}");
        }
        if self.is_unique() {
            out.push_str(" Unique");
        }
        if let Some(descending) = self.is_descending() {
            let flags: Vec<&str> = descending
                .iter()
                .map(|&d| if d { "Desc" } else { "Asc" })
                .collect();
            let _ = write!(out, " ({})", flags.join(", "));
        }
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

impl TriggerRef<'_> {
    /// Renders the trigger.
    #[must_use]
    pub fn to_debug_string(self, options: DebugStringOptions, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = format!("{pad}{}", self.model_name());
        if !options.single_line {
            write_annotations(&mut out, self.annotations(), options, indent);
        }
        out
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn write_section<T>(
    out: &mut String,
    title: &str,
    indent: usize,
    items: Vec<T>,
    render: impl Fn(T) -> String,
) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n{}{title}:", " ".repeat(indent));
    for item in items {
        out.push('\n');
        out.push_str(&render(item));
    }
}

fn write_annotations(
    out: &mut String,
    annotations: &Annotations,
    options: DebugStringOptions,
    indent: usize,
) {
    if !options.include_annotations || annotations.is_empty() {
        return;
    }
    let pad = " ".repeat(indent + 2);
    let _ = write!(out, "\n{pad}Annotations:");
    for annotation in annotations.iter() {
        let _ = write!(out, "\n{pad}  {}: {}", annotation.name(), annotation.value());
    }
}

fn write_navigation_indexes(out: &mut String, indexes: Option<crate::counts::NavigationIndexes>) {
    match indexes {
        Some(indexes) => {
            let _ = write!(
                out,
                " PropertyIndexes({}, {})",
                indexes.index, indexes.relationship_index
            );
        }
        None => out.push_str(" PropertyIndexes(<error: no slot layout>)"),
    }
}

fn names(properties: Vec<PropertyRef<'_>>) -> String {
    properties
        .into_iter()
        .map(PropertyRef::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[allow(clippy::cast_possible_wrap)]
fn slot(index: Option<usize>) -> i64 {
    index.map_or(-1, |i| i as i64)
}
