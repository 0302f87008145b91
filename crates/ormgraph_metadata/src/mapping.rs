//! Type mappings and the services that resolve them.
//!
//! A [`TypeMapping`] bundles the storage-facing strategy objects for one
//! member. Mappings are either set explicitly while building, or resolved
//! lazily on the frozen model through the [`TypeMappingSource`] held by
//! the model's [`ModelDependencies`].

use std::fmt;
use std::sync::Arc;

use ormgraph_foundation::ValueType;

use crate::conversion::{JsonValueReaderWriter, ValueComparer, ValueConverter};

// =============================================================================
// Type Mapping
// =============================================================================

/// Storage-facing behavior of a property or element type.
#[derive(Clone)]
pub struct TypeMapping {
    value_type: ValueType,
    store_type: Option<Arc<str>>,
    converter: Option<Arc<ValueConverter>>,
    comparer: Arc<ValueComparer>,
    key_comparer: Arc<ValueComparer>,
    provider_value_comparer: Arc<ValueComparer>,
    json_reader_writer: Option<Arc<dyn JsonValueReaderWriter>>,
    element_mapping: Option<Box<TypeMapping>>,
}

impl TypeMapping {
    /// Creates a mapping using structural comparers for `value_type`.
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        let comparer = Arc::new(ValueComparer::default_for(value_type.clone()));
        Self {
            value_type,
            store_type: None,
            converter: None,
            key_comparer: Arc::clone(&comparer),
            provider_value_comparer: Arc::clone(&comparer),
            comparer,
            json_reader_writer: None,
            element_mapping: None,
        }
    }

    /// Sets the storage type name.
    #[must_use]
    pub fn with_store_type(mut self, store_type: impl AsRef<str>) -> Self {
        self.store_type = Some(Arc::from(store_type.as_ref()));
        self
    }

    /// Sets the converter; provider values are then compared structurally
    /// in the converter's provider type.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<ValueConverter>) -> Self {
        self.provider_value_comparer = Arc::new(ValueComparer::default_for(
            converter.provider_type().clone(),
        ));
        self.converter = Some(converter);
        self
    }

    /// Sets the value comparer.
    #[must_use]
    pub fn with_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.comparer = comparer;
        self
    }

    /// Sets the key comparer.
    #[must_use]
    pub fn with_key_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.key_comparer = comparer;
        self
    }

    /// Sets the provider value comparer.
    #[must_use]
    pub fn with_provider_value_comparer(mut self, comparer: Arc<ValueComparer>) -> Self {
        self.provider_value_comparer = comparer;
        self
    }

    /// Sets the JSON reader/writer.
    #[must_use]
    pub fn with_json_reader_writer(mut self, rw: Arc<dyn JsonValueReaderWriter>) -> Self {
        self.json_reader_writer = Some(rw);
        self
    }

    /// Sets the mapping of collection elements.
    #[must_use]
    pub fn with_element_mapping(mut self, mapping: TypeMapping) -> Self {
        self.element_mapping = Some(Box::new(mapping));
        self
    }

    /// Returns the mapped value type.
    #[must_use]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Returns the storage type name.
    #[must_use]
    pub fn store_type(&self) -> Option<&str> {
        self.store_type.as_deref()
    }

    /// Returns the converter.
    #[must_use]
    pub fn converter(&self) -> Option<&Arc<ValueConverter>> {
        self.converter.as_ref()
    }

    /// Returns the value comparer.
    #[must_use]
    pub fn comparer(&self) -> &Arc<ValueComparer> {
        &self.comparer
    }

    /// Returns the key comparer.
    #[must_use]
    pub fn key_comparer(&self) -> &Arc<ValueComparer> {
        &self.key_comparer
    }

    /// Returns the provider value comparer.
    #[must_use]
    pub fn provider_value_comparer(&self) -> &Arc<ValueComparer> {
        &self.provider_value_comparer
    }

    /// Returns the JSON reader/writer.
    #[must_use]
    pub fn json_reader_writer(&self) -> Option<&Arc<dyn JsonValueReaderWriter>> {
        self.json_reader_writer.as_ref()
    }

    /// Returns the element mapping.
    #[must_use]
    pub fn element_mapping(&self) -> Option<&TypeMapping> {
        self.element_mapping.as_deref()
    }
}

impl fmt::Debug for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.store_type {
            Some(store) => write!(f, "TypeMapping({} as {store})", self.value_type),
            None => write!(f, "TypeMapping({})", self.value_type),
        }
    }
}

// =============================================================================
// Mapping Source
// =============================================================================

/// Facets describing the member a mapping is requested for.
#[derive(Clone, Debug, Default)]
pub struct MappingInfo {
    /// Model value type.
    pub value_type: Option<ValueType>,
    /// Requested storage value type.
    pub provider_type: Option<ValueType>,
    /// Maximum length.
    pub max_length: Option<i64>,
    /// Whether string data is Unicode.
    pub unicode: Option<bool>,
    /// Numeric precision.
    pub precision: Option<i64>,
    /// Numeric scale.
    pub scale: Option<i64>,
    /// Converter configured on the member.
    pub converter: Option<Arc<ValueConverter>>,
    /// Whether the member is a collection element.
    pub is_element: bool,
}

/// Resolves type mappings for members.
pub trait TypeMappingSource: Send + Sync {
    /// Finds a mapping, or `None` if the member cannot be mapped.
    fn find_mapping(&self, info: &MappingInfo) -> Option<TypeMapping>;
}

/// Maps every value type with structural comparers.
///
/// Application-defined types are only mapped when a converter is given.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTypeMappingSource;

impl TypeMappingSource for DefaultTypeMappingSource {
    fn find_mapping(&self, info: &MappingInfo) -> Option<TypeMapping> {
        let value_type = info.value_type.clone()?;
        if matches!(value_type.unwrap_nullable(), ValueType::Named(_)) && info.converter.is_none() {
            return None;
        }

        let mut mapping = TypeMapping::new(value_type.clone());
        if let Some(converter) = &info.converter {
            mapping = mapping.with_converter(Arc::clone(converter));
        }
        if let Some(element) = value_type.element_type() {
            let element_info = MappingInfo {
                value_type: Some(element.clone()),
                is_element: true,
                ..MappingInfo::default()
            };
            if let Some(element_mapping) = self.find_mapping(&element_info) {
                mapping = mapping.with_element_mapping(element_mapping);
            }
        }
        Some(mapping)
    }
}

// =============================================================================
// Model Dependencies
// =============================================================================

/// Services a frozen model needs at runtime.
#[derive(Clone)]
pub struct ModelDependencies {
    type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl ModelDependencies {
    /// Creates dependencies around a mapping source.
    #[must_use]
    pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>) -> Self {
        Self {
            type_mapping_source,
        }
    }

    /// Returns the type mapping source.
    #[must_use]
    pub fn type_mapping_source(&self) -> &dyn TypeMappingSource {
        self.type_mapping_source.as_ref()
    }
}

impl Default for ModelDependencies {
    fn default() -> Self {
        Self::new(Arc::new(DefaultTypeMappingSource))
    }
}

impl fmt::Debug for ModelDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelDependencies")
    }
}

// =============================================================================
// Type Configuration
// =============================================================================

/// Model-wide facets applied to every member of a value type.
#[derive(Clone, Debug)]
pub struct TypeConfiguration {
    /// The configured value type.
    pub value_type: ValueType,
    /// Maximum length.
    pub max_length: Option<i64>,
    /// Whether string data is Unicode.
    pub unicode: Option<bool>,
    /// Numeric precision.
    pub precision: Option<i64>,
    /// Numeric scale.
    pub scale: Option<i64>,
    /// Storage value type.
    pub provider_type: Option<ValueType>,
    /// Converter.
    pub converter: Option<Arc<ValueConverter>>,
}

impl TypeConfiguration {
    /// Creates an empty configuration for `value_type`.
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            max_length: None,
            unicode: None,
            precision: None,
            scale: None,
            provider_type: None,
            converter: None,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets whether string data is Unicode.
    #[must_use]
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = Some(unicode);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub fn with_precision(mut self, precision: i64, scale: Option<i64>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    /// Sets the storage value type.
    #[must_use]
    pub fn with_provider_type(mut self, provider_type: ValueType) -> Self {
        self.provider_type = Some(provider_type);
        self
    }

    /// Sets the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }
}
