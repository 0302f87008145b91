//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use ormgraph_foundation::{Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_duplicate_annotation() {
    let err = Error::duplicate_annotation("MaxLength");
    assert!(matches!(err.kind, ErrorKind::DuplicateAnnotation(_)));
    assert!(format!("{err}").contains("MaxLength"));
}

#[test]
fn error_property_not_found() {
    let err = Error::property_not_found("Total", "Order");
    assert!(matches!(err.kind, ErrorKind::PropertyNotFound { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("Total"));
    assert!(msg.contains("Order"));
}

#[test]
fn error_arity_mismatch() {
    let err = Error::foreign_key_arity_mismatch(2, 1);
    assert!(matches!(
        err.kind,
        ErrorKind::ForeignKeyArityMismatch {
            dependent: 2,
            principal: 1
        }
    ));
    let msg = format!("{err}");
    assert!(msg.contains('2'));
    assert!(msg.contains('1'));
}

#[test]
fn error_non_indexer_entity_type() {
    let err = Error::non_indexer_entity_type("Extra", "Order");
    assert!(matches!(err.kind, ErrorKind::NonIndexerEntityType { .. }));
    assert!(format!("{err}").contains("Extra"));
}

#[test]
fn error_in_use() {
    let err = Error::in_use("property 'Id'", "Key(Order {Id})");
    assert!(matches!(err.kind, ErrorKind::InUse { .. }));
    assert!(format!("{err}").contains("Key(Order {Id})"));
}

#[test]
fn error_model_not_finalized() {
    let err = Error::model_not_finalized("type_mapping");
    assert!(matches!(err.kind, ErrorKind::ModelNotFinalized(_)));
    assert!(format!("{err}").contains("type_mapping"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_appended_to_display() {
    let err = Error::invalid_hierarchy("keys must be declared on the root type").with_context(
        ErrorContext::new()
            .with_operation("add_key")
            .with_node("EntityType 'Dog'"),
    );
    let msg = format!("{err}");
    assert!(msg.contains("root type"));
    assert!(msg.contains("add_key"));
    assert!(msg.contains("EntityType 'Dog'"));
}

#[test]
fn plain_error_has_no_context() {
    let err = Error::node_not_found("KeyId(3)");
    assert!(err.context.is_none());
    assert!(format!("{err}").contains("KeyId(3)"));
}

#[test]
fn errors_are_std_errors() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    assert_error(&Error::new(ErrorKind::Internal("unreachable state".into())));
}
