//! Value converters, comparers and JSON reader/writers.
//!
//! These are opaque strategy objects attached to properties and element
//! types. The graph only stores, resolves and hands them back.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use ormgraph_foundation::{Error, Result, Value, ValueType};

type ConvertFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;
type HashFn = Arc<dyn Fn(&Value) -> u64 + Send + Sync>;

// =============================================================================
// Value Converter
// =============================================================================

/// Converts between model values and their storage representation.
///
/// Null is never passed to the conversion functions; it maps to null.
#[derive(Clone)]
pub struct ValueConverter {
    name: Arc<str>,
    model_type: ValueType,
    provider_type: ValueType,
    to_provider: ConvertFn,
    from_provider: ConvertFn,
}

impl ValueConverter {
    /// Creates a converter from a pair of functions.
    pub fn new<T, F>(
        name: impl AsRef<str>,
        model_type: ValueType,
        provider_type: ValueType,
        to_provider: T,
        from_provider: F,
    ) -> Self
    where
        T: Fn(&Value) -> Value + Send + Sync + 'static,
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            model_type,
            provider_type,
            to_provider: Arc::new(to_provider),
            from_provider: Arc::new(from_provider),
        }
    }

    /// Returns the converter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model-side value type.
    #[must_use]
    pub fn model_type(&self) -> &ValueType {
        &self.model_type
    }

    /// Returns the storage-side value type.
    #[must_use]
    pub fn provider_type(&self) -> &ValueType {
        &self.provider_type
    }

    /// Converts a model value to its storage representation.
    #[must_use]
    pub fn convert_to_provider(&self, value: &Value) -> Value {
        if value.is_null() {
            Value::Null
        } else {
            (self.to_provider)(value)
        }
    }

    /// Converts a storage value back to the model representation.
    #[must_use]
    pub fn convert_from_provider(&self, value: &Value) -> Value {
        if value.is_null() {
            Value::Null
        } else {
            (self.from_provider)(value)
        }
    }
}

impl fmt::Debug for ValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValueConverter({}: {} -> {})",
            self.name, self.model_type, self.provider_type
        )
    }
}

// =============================================================================
// Value Comparer
// =============================================================================

/// Equality, hashing and snapshotting of property values.
#[derive(Clone)]
pub struct ValueComparer {
    name: Arc<str>,
    value_type: ValueType,
    equals: EqualsFn,
    hash: HashFn,
    snapshot: ConvertFn,
}

impl ValueComparer {
    /// Creates a comparer from equality and hash functions.
    ///
    /// Snapshots are plain clones unless [`ValueComparer::with_snapshot`]
    /// overrides them.
    pub fn new<E, H>(name: impl AsRef<str>, value_type: ValueType, equals: E, hash: H) -> Self
    where
        E: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        H: Fn(&Value) -> u64 + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            value_type,
            equals: Arc::new(equals),
            hash: Arc::new(hash),
            snapshot: Arc::new(Value::clone),
        }
    }

    /// Returns the structural comparer for `value_type`.
    #[must_use]
    pub fn default_for(value_type: ValueType) -> Self {
        let name = format!("Default<{value_type}>");
        Self::new(name, value_type, |a, b| a == b, default_hash)
    }

    /// Replaces the snapshot function.
    #[must_use]
    pub fn with_snapshot<S>(mut self, snapshot: S) -> Self
    where
        S: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.snapshot = Arc::new(snapshot);
        self
    }

    /// Returns the comparer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the compared value type.
    #[must_use]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Returns true if the values are equal under this comparer.
    #[must_use]
    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        (self.equals)(a, b)
    }

    /// Hashes a value consistently with [`ValueComparer::equals`].
    #[must_use]
    pub fn hash_value(&self, value: &Value) -> u64 {
        (self.hash)(value)
    }

    /// Returns a copy of the value safe to keep as an original value.
    #[must_use]
    pub fn snapshot(&self, value: &Value) -> Value {
        (self.snapshot)(value)
    }
}

fn default_hash(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl fmt::Debug for ValueComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueComparer({})", self.name)
    }
}

// =============================================================================
// JSON Reader/Writer
// =============================================================================

/// Reads and writes values of one type as JSON.
pub trait JsonValueReaderWriter: fmt::Debug + Send + Sync {
    /// Returns the value type handled.
    fn value_type(&self) -> &ValueType;

    /// Writes a value as a JSON value.
    fn to_json(&self, value: &Value) -> serde_json::Value;

    /// Reads a value from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `Conversion` if the JSON does not hold a value of this type.
    fn from_json(&self, json: &serde_json::Value) -> Result<Value>;

    /// Writes a value as JSON text.
    fn to_json_string(&self, value: &Value) -> String {
        self.to_json(value).to_string()
    }

    /// Reads a value from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Conversion` if the text is not valid JSON for this type.
    fn from_json_str(&self, text: &str) -> Result<Value> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::conversion(e.to_string()))?;
        self.from_json(&json)
    }
}

/// JSON reader/writer driven by the value type descriptor.
///
/// Guids are written as 32-digit hex strings, decimals as strings and
/// byte arrays as arrays of numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultJsonReaderWriter {
    value_type: ValueType,
}

impl DefaultJsonReaderWriter {
    /// Creates a reader/writer for `value_type`.
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }
}

impl JsonValueReaderWriter for DefaultJsonReaderWriter {
    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn to_json(&self, value: &Value) -> serde_json::Value {
        write_json(value)
    }

    fn from_json(&self, json: &serde_json::Value) -> Result<Value> {
        read_json(&self.value_type, json)
    }
}

fn write_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::UInt(n) => Json::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Decimal(s) | Value::String(s) => Json::String(s.to_string()),
        Value::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::Guid(g) => Json::String(format!("{g:032x}")),
        Value::List(items) => Json::Array(items.iter().map(write_json).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), write_json(v)))
                .collect(),
        ),
    }
}

fn mismatch(expected: &ValueType, json: &serde_json::Value) -> Error {
    Error::conversion(format!("expected {expected}, found JSON {json}"))
}

fn read_json(ty: &ValueType, json: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    if json.is_null() {
        return if ty.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(mismatch(ty, json))
        };
    }

    match ty {
        ValueType::Nullable(inner) => read_json(inner, json),
        ValueType::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| mismatch(ty, json)),
        ValueType::Int8 | ValueType::Int16 | ValueType::Int32 | ValueType::Int64 => {
            json.as_i64().map(Value::Int).ok_or_else(|| mismatch(ty, json))
        }
        ValueType::UInt8 | ValueType::UInt16 | ValueType::UInt32 | ValueType::UInt64 => {
            json.as_u64().map(Value::UInt).ok_or_else(|| mismatch(ty, json))
        }
        ValueType::Float32 | ValueType::Float64 => {
            json.as_f64().map(Value::Float).ok_or_else(|| mismatch(ty, json))
        }
        ValueType::Decimal => match json {
            Json::String(s) => Ok(Value::Decimal(Arc::from(s.as_str()))),
            Json::Number(n) => Ok(Value::Decimal(Arc::from(n.to_string().as_str()))),
            _ => Err(mismatch(ty, json)),
        },
        ValueType::Guid => json
            .as_str()
            .and_then(|s| u128::from_str_radix(&s.replace('-', ""), 16).ok())
            .map(Value::Guid)
            .ok_or_else(|| mismatch(ty, json)),
        ValueType::Bytes => {
            let items = json.as_array().ok_or_else(|| mismatch(ty, json))?;
            let bytes = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| mismatch(ty, json))
                })
                .collect::<Result<Vec<u8>>>()?;
            Ok(Value::Bytes(Arc::from(bytes)))
        }
        ValueType::Collection(element) => {
            let items = json.as_array().ok_or_else(|| mismatch(ty, json))?;
            let values = items
                .iter()
                .map(|item| read_json(element, item))
                .collect::<Result<im::Vector<Value>>>()?;
            Ok(Value::List(values))
        }
        ValueType::String
        | ValueType::Date
        | ValueType::Time
        | ValueType::DateTime
        | ValueType::DateTimeOffset
        | ValueType::TimeSpan => json
            .as_str()
            .map(Value::from)
            .ok_or_else(|| mismatch(ty, json)),
        ValueType::Named(_) => Ok(read_untyped(json)),
    }
}

fn read_untyped(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_u64().map(Value::UInt))
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::List(items.iter().map(read_untyped).collect()),
        Json::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Arc::from(k.as_str()), read_untyped(v)))
                .collect(),
        ),
    }
}
