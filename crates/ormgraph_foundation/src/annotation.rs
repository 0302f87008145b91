//! Extensible name/value metadata attached to every graph node.
//!
//! Two independent tiers:
//! - [`Annotations`] - the primary tier, populated while the model is built.
//!   Backed by a persistent ordered map so clones share structure and
//!   enumeration is alphabetical.
//! - [`RuntimeAnnotations`] - values computed on first use after the model is
//!   frozen. Backed by an atomically published persistent map: readers never
//!   block, writers compute outside any lock and race to publish with
//!   compare-and-swap. The first published value wins and every caller
//!   observes that same instance.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::{Error, ErrorKind, Result};
use crate::value::Value;

/// Well-known annotation names.
pub mod names {
    /// Maximum length of string or binary data.
    pub const MAX_LENGTH: &str = "MaxLength";
    /// Whether string data is Unicode.
    pub const UNICODE: &str = "Unicode";
    /// Numeric precision.
    pub const PRECISION: &str = "Precision";
    /// Numeric scale.
    pub const SCALE: &str = "Scale";
    /// Discriminator value of an entity type.
    pub const DISCRIMINATOR_VALUE: &str = "DiscriminatorValue";
    /// Whether every discriminator value in the hierarchy is mapped.
    pub const DISCRIMINATOR_MAPPING_COMPLETE: &str = "DiscriminatorMappingComplete";
    /// Version of the library that produced the model.
    pub const PRODUCT_VERSION: &str = "ProductVersion";
    /// Opaque query filter expression text.
    pub const QUERY_FILTER: &str = "QueryFilter";

    /// Runtime tier: memoized property counts and slot indexes of a structural type.
    pub const PROPERTY_COUNTS: &str = "Runtime:PropertyCounts";
    /// Runtime tier: key value factory of a key.
    pub const KEY_VALUE_FACTORY: &str = "Runtime:KeyValueFactory";
    /// Runtime tier: services the model needs at runtime.
    pub const MODEL_DEPENDENCIES: &str = "Runtime:ModelDependencies";
}

/// One annotation entry.
///
/// Cloning shares the entry; [`Annotation::ptr_eq`] tells whether two
/// handles are the same stored entry.
#[derive(Clone)]
pub struct Annotation {
    inner: Arc<AnnotationEntry>,
}

struct AnnotationEntry {
    name: Arc<str>,
    value: Value,
}

impl Annotation {
    /// Creates a detached annotation.
    #[must_use]
    pub fn new(name: impl AsRef<str>, value: Value) -> Self {
        Self {
            inner: Arc::new(AnnotationEntry {
                name: Arc::from(name.as_ref()),
                value,
            }),
        }
    }

    /// Returns the annotation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the annotation value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.inner.value
    }

    /// Returns true if both handles refer to the same stored entry.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name && self.inner.value == other.inner.value
    }
}

impl Eq for Annotation {}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.inner.name, self.inner.value)
    }
}

/// Primary annotation tier.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    entries: im::OrdMap<Arc<str>, Annotation>,
}

impl Annotations {
    /// Creates an empty annotation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new annotation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAnnotation` if `name` is already present.
    pub fn add_annotation(&mut self, name: &str, value: Value) -> Result<Annotation> {
        if self.entries.contains_key(name) {
            return Err(Error::duplicate_annotation(name));
        }
        let annotation = Annotation::new(name, value);
        self.entries.insert(Arc::from(name), annotation.clone());
        Ok(annotation)
    }

    /// Adds or replaces an annotation.
    ///
    /// If the stored value already equals `value`, nothing changes and the
    /// stored entry is returned.
    pub fn set_annotation(&mut self, name: &str, value: Value) -> Annotation {
        if let Some(existing) = self.entries.get(name) {
            if *existing.value() == value {
                return existing.clone();
            }
        }
        let annotation = Annotation::new(name, value);
        self.entries.insert(Arc::from(name), annotation.clone());
        annotation
    }

    /// Finds an annotation by name.
    #[must_use]
    pub fn find_annotation(&self, name: &str) -> Option<&Annotation> {
        self.entries.get(name)
    }

    /// Gets an annotation by name.
    ///
    /// # Errors
    ///
    /// Returns `AnnotationNotFound` if `name` is absent.
    pub fn get_annotation(&self, name: &str) -> Result<&Annotation> {
        self.find_annotation(name)
            .ok_or_else(|| Error::annotation_not_found(name))
    }

    /// Returns the value of an annotation, if present.
    #[must_use]
    pub fn find_value(&self, name: &str) -> Option<&Value> {
        self.find_annotation(name).map(Annotation::value)
    }

    /// Removes an annotation, returning it if it was present.
    pub fn remove_annotation(&mut self, name: &str) -> Option<Annotation> {
        self.entries.remove(name)
    }

    /// Iterates annotations in alphabetical order of name.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.values()
    }

    /// Returns the number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A runtime annotation value.
pub type RuntimeValue = Arc<dyn Any + Send + Sync>;

type RuntimeMap = im::OrdMap<Arc<str>, RuntimeValue>;

/// Runtime annotation tier.
///
/// Safe to use through a shared reference from any number of threads.
pub struct RuntimeAnnotations {
    entries: ArcSwap<RuntimeMap>,
}

impl RuntimeAnnotations {
    /// Creates an empty runtime tier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(RuntimeMap::new()),
        }
    }

    /// Finds a runtime annotation value.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<RuntimeValue> {
        self.entries.load().get(name).cloned()
    }

    /// Finds a runtime annotation value of type `T`.
    ///
    /// Returns `None` if absent or of a different type.
    #[must_use]
    pub fn find_value<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.find(name).and_then(|v| v.downcast::<T>().ok())
    }

    /// Publishes a value, replacing any existing one.
    pub fn set(&self, name: &str, value: RuntimeValue) {
        let key: Arc<str> = Arc::from(name);
        self.entries.rcu(|current| current.update(key.clone(), value.clone()));
    }

    /// Publishes a value only if `name` is absent.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAnnotation` if a value is already published.
    pub fn add(&self, name: &str, value: RuntimeValue) -> Result<()> {
        let key: Arc<str> = Arc::from(name);
        loop {
            let current = self.entries.load_full();
            if current.contains_key(name) {
                return Err(Error::duplicate_annotation(name));
            }
            let next = Arc::new(current.update(key.clone(), value.clone()));
            let previous = self.entries.compare_and_swap(&current, next);
            if Arc::ptr_eq(&previous, &current) {
                return Ok(());
            }
        }
    }

    /// Returns the published value for `name`, computing it if absent.
    ///
    /// `factory` runs outside any lock and may run on several threads at
    /// once; only the first value published is kept and every caller
    /// receives that instance. The factory must be side-effect free.
    ///
    /// # Errors
    ///
    /// Returns an error if the published value is not of type `T`.
    pub fn get_or_add_value<T, F>(&self, name: &str, factory: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.find(name) {
            return downcast(name, existing);
        }

        let created: RuntimeValue = Arc::new(factory());
        let key: Arc<str> = Arc::from(name);
        loop {
            let current = self.entries.load_full();
            if let Some(existing) = current.get(name) {
                tracing::trace!(annotation = name, "runtime annotation race lost, adopting winner");
                return downcast(name, existing.clone());
            }
            let next = Arc::new(current.update(key.clone(), created.clone()));
            let previous = self.entries.compare_and_swap(&current, next);
            if Arc::ptr_eq(&previous, &current) {
                return downcast(name, created);
            }
        }
    }

    /// Removes a runtime annotation, returning its value if present.
    pub fn remove(&self, name: &str) -> Option<RuntimeValue> {
        loop {
            let current = self.entries.load_full();
            let existing = current.get(name)?.clone();
            let next = Arc::new(current.without(name));
            let previous = self.entries.compare_and_swap(&current, next);
            if Arc::ptr_eq(&previous, &current) {
                return Some(existing);
            }
        }
    }

    /// Returns the names of all runtime annotations, alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<Arc<str>> {
        self.entries.load().keys().cloned().collect()
    }

    /// Returns the number of runtime annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Returns true if there are no runtime annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

fn downcast<T: Any + Send + Sync>(name: &str, value: RuntimeValue) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| {
        Error::new(ErrorKind::Internal(format!(
            "runtime annotation {name} holds a value of a different type"
        )))
    })
}

impl Default for RuntimeAnnotations {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuntimeAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Read access to the annotations of a graph node.
pub trait Annotatable {
    /// Returns the primary annotation tier.
    fn annotations(&self) -> &Annotations;

    /// Returns the runtime annotation tier.
    fn runtime_annotations(&self) -> &RuntimeAnnotations;

    /// Finds an annotation by name.
    fn find_annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().find_annotation(name)
    }

    /// Gets an annotation by name.
    ///
    /// # Errors
    ///
    /// Returns `AnnotationNotFound` if absent.
    fn get_annotation(&self, name: &str) -> Result<&Annotation> {
        self.annotations().get_annotation(name)
    }

    /// Iterates annotations alphabetically.
    fn get_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations().iter()
    }

    /// Finds a runtime annotation value.
    fn find_runtime_annotation(&self, name: &str) -> Option<RuntimeValue> {
        self.runtime_annotations().find(name)
    }

    /// Returns the runtime annotation `name`, computing and publishing it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the published value is not of type `T`.
    fn get_or_add_runtime_annotation_value<T, F>(&self, name: &str, factory: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.runtime_annotations().get_or_add_value(name, factory)
    }
}
