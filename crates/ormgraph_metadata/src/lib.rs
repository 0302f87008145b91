//! Entity types, keys, relationships and the frozen runtime model for ormgraph.
//!
//! This crate provides:
//! - [`ModelBuilder`] - Single-threaded construction with validated wiring
//! - [`Model`] - The immutable, shareable model produced by finalization
//! - [`ModelGraph`] - Read access shared by both, through borrowed views
//! - [`EntityTypeRef`], [`PropertyRef`], [`KeyRef`], [`ForeignKeyRef`], ... -
//!   Copyable views resolving ids against the graph
//! - [`TypeMapping`] / [`TypeMappingSource`] - Store mappings resolved lazily
//! - [`DebugView`] - Human-readable dumps of any node

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arena;
pub mod builder;
pub mod complex;
pub mod conversion;
pub mod counts;
pub mod debug;
pub mod entity_type;
pub mod foreign_key;
pub mod graph;
pub mod ids;
pub mod index;
pub mod key;
pub mod mapping;
pub mod model;
pub mod navigation;
pub mod options;
pub mod property;
pub mod property_list;
pub mod schema;
pub mod service;
pub mod structural;

pub use builder::ModelBuilder;
pub use complex::{ComplexPropertyRef, ComplexTypeRef};
pub use conversion::{DefaultJsonReaderWriter, JsonValueReaderWriter, ValueComparer, ValueConverter};
pub use counts::{NavigationIndexes, PropertyCounts, PropertyIndexes};
pub use debug::{DebugStringOptions, DebugView};
pub use entity_type::EntityTypeRef;
pub use foreign_key::ForeignKeyRef;
pub use graph::ModelGraph;
pub use ids::{
    ComplexPropertyId, ComplexTypeId, EntityTypeId, ForeignKeyId, IndexId, KeyId, NavigationId,
    NodeId, PropertyId, ServicePropertyId, SkipNavigationId, StructuralTypeId, TriggerId,
};
pub use index::IndexRef;
pub use key::{KeyRef, KeyValue, KeyValueFactory};
pub use mapping::{
    DefaultTypeMappingSource, MappingInfo, ModelDependencies, TypeConfiguration, TypeMapping,
    TypeMappingSource,
};
pub use model::{AdHocEntityType, Model};
pub use navigation::{NavigationRef, SkipNavigationRef};
pub use options::{ChangeTrackingStrategy, ModelOptions, NameComparison, PropertyAccessMode};
pub use property::{ElementTypeRef, PropertyRef};
pub use property_list::PropertyList;
pub use schema::{
    ComplexPropertyDef, DeleteBehavior, ElementTypeDef, EntityTypeDef, ForeignKeyDef, IndexDef,
    NavigationDef, PropertyDef, PropertySaveBehavior, ServicePropertyDef, SkipNavigationDef,
    ValueFacets, ValueGenerated,
};
pub use service::{ServicePropertyRef, TriggerRef};
pub use structural::{MemberRef, StructuralType, StructuralTypeRef};
