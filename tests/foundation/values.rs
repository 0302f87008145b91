//! Integration tests for values and value types

use ormgraph_foundation::{HostType, MemberHandle, MemberKind, Value, ValueType};

// =============================================================================
// Values
// =============================================================================

#[test]
fn conversions_into_value() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(42_i32).as_int(), Some(42));
    assert_eq!(Value::from("Orders").as_str(), Some("Orders"));
    assert_eq!(Value::from(String::from("x")), Value::string("x"));
    assert!(Value::from(None::<i64>).is_null());
    assert_eq!(Value::from(Some(7_i64)).as_int(), Some(7));
}

#[test]
fn value_display() {
    assert_eq!(Value::string("Orders").to_string(), "Orders");
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Null.to_string(), "null");
    let list = Value::list([Value::Int(1), Value::Int(2)]);
    assert_eq!(list.to_string(), "[1, 2]");
}

#[test]
fn value_types_of_values() {
    assert_eq!(Value::Bool(false).value_type(), ValueType::Bool);
    assert_eq!(Value::string("a").value_type(), ValueType::String);
}

// =============================================================================
// Value Types
// =============================================================================

#[test]
fn nullability() {
    assert!(!ValueType::Int32.is_nullable());
    assert!(ValueType::nullable(ValueType::Int32).is_nullable());
    assert!(ValueType::String.is_nullable());
    assert_eq!(
        ValueType::nullable(ValueType::Int32).unwrap_nullable(),
        &ValueType::Int32
    );
}

#[test]
fn collections_expose_element_type() {
    let tags = ValueType::collection(ValueType::String);
    assert_eq!(tags.element_type(), Some(&ValueType::String));
    assert_eq!(tags.to_string(), "[string]");
    assert_eq!(ValueType::Int64.element_type(), None);
}

// =============================================================================
// Handles
// =============================================================================

#[test]
fn host_type_short_names() {
    assert_eq!(HostType::new("Shop.Orders.Order").short_name(), "Order");
    assert!(HostType::property_bag().is_property_bag());
}

#[test]
fn member_handles_carry_tokens() {
    let handle = MemberHandle::new(MemberKind::Property, "Total", 17_u32);
    assert_eq!(handle.name(), "Total");
    assert_eq!(handle.kind(), MemberKind::Property);
    assert_eq!(handle.token::<u32>(), Some(&17));
    assert_eq!(handle.token::<String>(), None);
    assert_eq!(handle.clone(), handle);
}
