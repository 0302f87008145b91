//! Error types for the ormgraph metadata model.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! `find_*` operations report absence with `Option`; the errors below are
//! reserved for caller misuse (asserted existence, duplicate registration,
//! invalid graph shape).

use std::fmt;

use thiserror::Error;

/// The main error type for metadata operations.
#[derive(Debug, Error)]
#[error("{kind}{}", render_context(.context))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a duplicate annotation error.
    #[must_use]
    pub fn duplicate_annotation(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAnnotation(name.into()))
    }

    /// Creates an annotation not found error.
    #[must_use]
    pub fn annotation_not_found(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::AnnotationNotFound(name.into()))
    }

    /// Creates a property not found error.
    #[must_use]
    pub fn property_not_found(property: impl Into<String>, declaring_type: impl Into<String>) -> Self {
        Self::new(ErrorKind::PropertyNotFound {
            property: property.into(),
            declaring_type: declaring_type.into(),
        })
    }

    /// Creates a node not found error.
    #[must_use]
    pub fn node_not_found(node: impl Into<String>) -> Self {
        Self::new(ErrorKind::NodeNotFound(node.into()))
    }

    /// Creates a duplicate member error.
    #[must_use]
    pub fn duplicate_member(member: impl Into<String>, declaring_type: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateMember {
            member: member.into(),
            declaring_type: declaring_type.into(),
        })
    }

    /// Creates a foreign key arity mismatch error.
    #[must_use]
    pub fn foreign_key_arity_mismatch(dependent: usize, principal: usize) -> Self {
        Self::new(ErrorKind::ForeignKeyArityMismatch {
            dependent,
            principal,
        })
    }

    /// Creates a non-indexer type error.
    #[must_use]
    pub fn non_indexer_entity_type(property: impl Into<String>, declaring_type: impl Into<String>) -> Self {
        Self::new(ErrorKind::NonIndexerEntityType {
            property: property.into(),
            declaring_type: declaring_type.into(),
        })
    }

    /// Creates a model-not-finalized error for the named operation.
    #[must_use]
    pub fn model_not_finalized(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelNotFinalized(operation.into()))
    }

    /// Creates an invalid hierarchy error.
    #[must_use]
    pub fn invalid_hierarchy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidHierarchy(message.into()))
    }

    /// Creates a value conversion error.
    #[must_use]
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion(message.into()))
    }

    /// Creates an in-use error for a node still referenced elsewhere.
    #[must_use]
    pub fn in_use(node: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::new(ErrorKind::InUse {
            node: node.into(),
            referenced_by: referenced_by.into(),
        })
    }
}

#[allow(clippy::ref_option)]
fn render_context(context: &Option<ErrorContext>) -> String {
    context.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An annotation with this name already exists on the node.
    #[error("duplicate annotation: {0}")]
    DuplicateAnnotation(String),

    /// The requested annotation does not exist on the node.
    #[error("annotation not found: {0}")]
    AnnotationNotFound(String),

    /// The requested property does not exist on the type.
    #[error("property not found: {property} on {declaring_type}")]
    PropertyNotFound {
        /// The property name that was requested.
        property: String,
        /// The type that was queried.
        declaring_type: String,
    },

    /// An id does not resolve to a live node.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An entity type with this name is already registered.
    #[error("duplicate entity type: {0}")]
    DuplicateEntityType(String),

    /// A member with this name is already declared on the type.
    #[error("duplicate member: {member} on {declaring_type}")]
    DuplicateMember {
        /// The member name.
        member: String,
        /// The declaring type.
        declaring_type: String,
    },

    /// A key with the same property list already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A foreign key with the same identity already exists.
    #[error("duplicate foreign key: {0}")]
    DuplicateForeignKey(String),

    /// An index with the same property list or name already exists.
    #[error("duplicate index: {0}")]
    DuplicateIndex(String),

    /// Dependent and principal property counts differ.
    #[error(
        "foreign key arity mismatch: {dependent} dependent properties, {principal} principal key properties"
    )]
    ForeignKeyArityMismatch {
        /// Number of dependent properties.
        dependent: usize,
        /// Number of principal key properties.
        principal: usize,
    },

    /// An indexer property was added to a type without an indexer.
    #[error("cannot add indexer property {property}: {declaring_type} has no indexer")]
    NonIndexerEntityType {
        /// The property name.
        property: String,
        /// The declaring type.
        declaring_type: String,
    },

    /// The operation requires a resolved type mapping.
    #[error("model not finalized: {0} requires a finalized model with type mapping dependencies")]
    ModelNotFinalized(String),

    /// The type mapping source could not map the member.
    #[error("no type mapping for {0}")]
    NoTypeMapping(String),

    /// The inheritance or declaration shape is invalid.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A navigation end of the foreign key is already populated.
    #[error("navigation already set: {0}")]
    NavigationAlreadySet(String),

    /// The node is still referenced and cannot be removed.
    #[error("{node} is in use by {referenced_by}")]
    InUse {
        /// The node that was to be removed.
        node: String,
        /// What still references it.
        referenced_by: String,
    },

    /// A value could not be converted to or from its serialized form.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Path of graph nodes leading to the failing node, outermost first.
    pub path: Vec<String>,
    /// Name of the operation that failed.
    pub operation: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failing operation.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Appends a node to the path.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.path.push(node.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = &self.operation {
            write!(f, "in {op}")?;
            if !self.path.is_empty() {
                write!(f, " ")?;
            }
        }
        if !self.path.is_empty() {
            write!(f, "at {}", self.path.join(" / "))?;
        }
        Ok(())
    }
}

/// Result type alias using the metadata [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
