//! Integration tests for the annotation tiers and compute-once cells

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{
    Annotatable, Annotation, Annotations, ErrorKind, LazyCell, RuntimeAnnotations, Value,
};

// =============================================================================
// Primary Tier
// =============================================================================

#[test]
fn set_annotation_is_idempotent_for_equal_values() {
    let mut annotations = Annotations::new();
    let first = annotations.set_annotation(names::MAX_LENGTH, Value::Int(64));
    let again = annotations.set_annotation(names::MAX_LENGTH, Value::Int(64));
    assert!(Annotation::ptr_eq(&first, &again));

    let changed = annotations.set_annotation(names::MAX_LENGTH, Value::Int(128));
    assert!(!Annotation::ptr_eq(&first, &changed));
    assert_eq!(
        annotations.find_value(names::MAX_LENGTH),
        Some(&Value::Int(128))
    );
}

#[test]
fn add_annotation_rejects_duplicates() {
    let mut annotations = Annotations::new();
    annotations
        .add_annotation(names::UNICODE, Value::Bool(false))
        .unwrap();
    let err = annotations
        .add_annotation(names::UNICODE, Value::Bool(true))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateAnnotation(_)));
    assert_eq!(
        annotations.find_value(names::UNICODE),
        Some(&Value::Bool(false))
    );
}

#[test]
fn enumeration_is_ordered_by_name() {
    let mut annotations = Annotations::new();
    for name in [names::SCALE, names::MAX_LENGTH, names::PRECISION] {
        annotations.set_annotation(name, Value::Int(1));
    }
    let listed: Vec<&str> = annotations.iter().map(Annotation::name).collect();
    assert_eq!(listed, vec!["MaxLength", "Precision", "Scale"]);
}

#[test]
fn missing_annotation_is_an_error_only_when_asserted() {
    let annotations = Annotations::new();
    assert!(annotations.find_annotation("Table").is_none());
    let err = annotations.get_annotation("Table").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AnnotationNotFound(_)));
}

// =============================================================================
// Runtime Tier
// =============================================================================

#[test]
fn runtime_add_rejects_duplicates() {
    let runtime = RuntimeAnnotations::new();
    runtime.add("Counter", Arc::new(1_u32)).unwrap();
    let err = runtime.add("Counter", Arc::new(2_u32)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateAnnotation(_)));
    assert_eq!(runtime.find_value::<u32>("Counter").as_deref(), Some(&1));
}

#[test]
fn runtime_find_value_checks_the_type() {
    let runtime = RuntimeAnnotations::new();
    runtime.set("Label", Arc::new(String::from("orders")));
    assert!(runtime.find_value::<u32>("Label").is_none());
    assert_eq!(
        runtime.find_value::<String>("Label").as_deref().map(String::as_str),
        Some("orders")
    );
}

#[test]
fn concurrent_get_or_add_converges_on_one_instance() {
    let runtime = Arc::new(RuntimeAnnotations::new());
    let barrier = Arc::new(Barrier::new(8));
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let runtime = Arc::clone(&runtime);
            let barrier = Arc::clone(&barrier);
            let calls = Arc::clone(&calls);
            thread::spawn(move || {
                barrier.wait();
                runtime
                    .get_or_add_value("Computed", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        vec![i; 4]
                    })
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<Arc<Vec<i32>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(calls.load(Ordering::SeqCst) >= 1);
    for result in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], result));
    }
    assert_eq!(runtime.len(), 1);
}

#[test]
fn runtime_remove_and_names() {
    let runtime = RuntimeAnnotations::default();
    runtime.set("b", Arc::new(()));
    runtime.set("a", Arc::new(()));
    let listed: Vec<String> = runtime.names().iter().map(ToString::to_string).collect();
    assert_eq!(listed, vec!["a", "b"]);
    assert!(runtime.remove("a").is_some());
    assert!(runtime.remove("a").is_none());
    assert_eq!(runtime.len(), 1);
}

// =============================================================================
// Annotatable
// =============================================================================

struct Node {
    annotations: Annotations,
    runtime: RuntimeAnnotations,
}

impl Annotatable for Node {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn runtime_annotations(&self) -> &RuntimeAnnotations {
        &self.runtime
    }
}

#[test]
fn annotatable_defaults_delegate_to_both_tiers() {
    let mut annotations = Annotations::new();
    annotations.set_annotation(names::PRECISION, Value::Int(18));
    let node = Node {
        annotations,
        runtime: RuntimeAnnotations::new(),
    };

    assert_eq!(
        node.get_annotation(names::PRECISION).unwrap().value(),
        &Value::Int(18)
    );
    assert_eq!(node.get_annotations().count(), 1);
    assert!(node.find_runtime_annotation("Cached").is_none());

    let first = node
        .get_or_add_runtime_annotation_value("Cached", || 5_usize)
        .unwrap();
    let second = node
        .get_or_add_runtime_annotation_value("Cached", || 6_usize)
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*second, 5);
}

// =============================================================================
// LazyCell
// =============================================================================

#[test]
fn lazy_cell_publishes_once() {
    let cell: LazyCell<String> = LazyCell::new();
    assert!(cell.get().is_none());
    assert_eq!(cell.get_or_init(|| "first".to_string()), "first");
    assert_eq!(cell.get_or_init(|| "second".to_string()), "first");
    assert_eq!(cell.set("third".to_string()), Err("third".to_string()));
}

#[test]
fn lazy_cell_failed_init_publishes_nothing() {
    let cell: LazyCell<u32> = LazyCell::default();
    let failed: Result<&u32, &str> = cell.get_or_try_init(|| Err("unavailable"));
    assert_eq!(failed, Err("unavailable"));
    assert!(cell.get().is_none());
    assert_eq!(cell.get_or_try_init::<_, &str>(|| Ok(3)), Ok(&3));
}
