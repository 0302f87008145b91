//! Integration tests for the build, finalize and use lifecycle

use ormgraph::foundation::{Value, ValueType};
use ormgraph::metadata::{DeleteBehavior, StructuralType};

use crate::{shop, shop_builder};

// =============================================================================
// Building
// =============================================================================

#[test]
fn builder_exposes_the_graph_while_building() {
    let builder = shop_builder();
    assert!(!builder.is_read_only());
    assert_eq!(builder.entity_type_count(), 3);
    assert!(builder.find_entity_type("OrderLine").is_some());
}

#[test]
fn finalized_model_is_read_only() {
    let model = shop();
    assert!(model.is_read_only());
    assert_eq!(model.finalize_model().entity_type_count(), 3);
    assert_eq!(model.product_version(), Some("0.1.0"));
}

// =============================================================================
// Walking the Model
// =============================================================================

#[test]
fn relationships_chain_from_customer_to_lines() {
    let model = shop();
    let customer = model.get_entity_type("Customer").unwrap();

    let orders = customer.find_navigation("Orders").unwrap();
    let order = orders.target_entity_type();
    assert_eq!(order.name(), "Order");

    let lines = order.find_navigation("Lines").unwrap();
    let line = lines.target_entity_type();
    assert_eq!(line.name(), "OrderLine");
    assert_eq!(lines.foreign_key().delete_behavior(), DeleteBehavior::Cascade);

    let back = line.find_navigation("Order").unwrap().target_entity_type();
    assert_eq!(back, order);
}

#[test]
fn principal_chain_of_a_dependent_key_column() {
    let model = shop();
    let line_order = model
        .get_entity_type("OrderLine")
        .unwrap()
        .get_property("OrderId")
        .unwrap();

    let principals: Vec<String> = line_order
        .get_principals()
        .into_iter()
        .map(|p| format!("{}.{}", p.declaring_type().name(), p.name()))
        .collect();
    assert_eq!(principals, vec!["OrderLine.OrderId", "Order.Id"]);
    assert!(line_order.is_primary_key());
    assert!(line_order.is_foreign_key());
}

#[test]
fn store_generated_properties() {
    let model = shop();
    let order = model.get_entity_type("Order").unwrap();
    assert!(order.get_property("Id").unwrap().may_be_store_generated());
    assert!(order.get_property("CustomerId").unwrap().may_be_store_generated());
    assert!(!order.get_property("Placed").unwrap().may_be_store_generated());
}

#[test]
fn unique_index_is_visible_from_the_property() {
    let model = shop();
    let email = model
        .get_entity_type("Customer")
        .unwrap()
        .get_property("Email")
        .unwrap();
    assert!(email.is_unique_index());
    assert_eq!(email.max_length(), Some(254));
    assert_eq!(
        email.get_containing_indexes()[0].name(),
        Some("IX_Customer_Email")
    );
}

// =============================================================================
// Runtime Services
// =============================================================================

#[test]
fn every_property_maps_with_default_services() {
    let model = shop();
    for entity_type in model.get_entity_types() {
        for property in entity_type.get_properties() {
            let mapping = property.type_mapping().unwrap();
            assert_eq!(mapping.value_type(), property.value_type());
            assert!(property.get_value_comparer().is_ok());
        }
    }
}

#[test]
fn key_values_from_rows() {
    let model = shop();
    let line = model.get_entity_type("OrderLine").unwrap();
    let factory = line.find_primary_key().unwrap().key_value_factory();

    let row = [Value::Int(41), Value::Int(2), Value::Int(5)];
    let key = factory.create_key(&row).unwrap();
    assert_eq!(key.values(), &[Value::Int(41), Value::Int(2)]);

    let comparer = line.get_property("OrderId").unwrap().get_key_value_comparer().unwrap();
    assert_eq!(comparer.value_type(), &ValueType::Int64);
}
