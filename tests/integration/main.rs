//! Cross-layer integration tests for ormgraph
//!
//! Tests that build a complete model, freeze it, and use it from many
//! threads at once.

mod concurrency;
mod debug_views;
mod lifecycle;

use ormgraph::foundation::ValueType;
use ormgraph::metadata::{
    DeleteBehavior, EntityTypeDef, ForeignKeyDef, IndexDef, Model, ModelBuilder, NavigationDef,
    PropertyDef, ValueGenerated,
};

/// A small shop: customers, orders and order lines.
///
/// - `Customer(Id, Email)` with a unique index on `Email`
/// - `Order(Id, CustomerId, Placed)` with `Customer.Orders` / `Order.Customer`
/// - `OrderLine(OrderId, LineNo, Quantity)` with `Order.Lines` / `OrderLine.Order`
pub fn shop_builder() -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    builder.set_product_version("0.1.0");

    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let customer_id = builder
        .add_property(
            customer,
            PropertyDef::new("Id", ValueType::Int64).with_value_generated(ValueGenerated::OnAdd),
        )
        .unwrap();
    let email = builder
        .add_property(
            customer,
            PropertyDef::new("Email", ValueType::String)
                .with_nullable(false)
                .with_max_length(254),
        )
        .unwrap();
    let customer_key = builder.set_primary_key(customer, &[customer_id]).unwrap();
    builder
        .add_index(customer, &[email], IndexDef::named("IX_Customer_Email").unique())
        .unwrap();

    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    let order_id = builder
        .add_property(
            order,
            PropertyDef::new("Id", ValueType::Int64).with_value_generated(ValueGenerated::OnAdd),
        )
        .unwrap();
    let order_customer = builder
        .add_property(order, PropertyDef::new("CustomerId", ValueType::Int64))
        .unwrap();
    builder
        .add_property(order, PropertyDef::new("Placed", ValueType::DateTime))
        .unwrap();
    let order_key = builder.set_primary_key(order, &[order_id]).unwrap();
    let placed_by = builder
        .add_foreign_key(
            order,
            &[order_customer],
            customer_key,
            customer,
            ForeignKeyDef::new().required(),
        )
        .unwrap();
    builder
        .add_navigation(placed_by, NavigationDef::to_dependent("Orders", true))
        .unwrap();
    builder
        .add_navigation(placed_by, NavigationDef::to_principal("Customer"))
        .unwrap();

    let line = builder
        .add_entity_type(EntityTypeDef::named("OrderLine"))
        .unwrap();
    let line_order = builder
        .add_property(line, PropertyDef::new("OrderId", ValueType::Int64))
        .unwrap();
    let line_no = builder
        .add_property(line, PropertyDef::new("LineNo", ValueType::Int32))
        .unwrap();
    builder
        .add_property(line, PropertyDef::new("Quantity", ValueType::Int32))
        .unwrap();
    builder.set_primary_key(line, &[line_order, line_no]).unwrap();
    let contains = builder
        .add_foreign_key(
            line,
            &[line_order],
            order_key,
            order,
            ForeignKeyDef::new()
                .required()
                .with_delete_behavior(DeleteBehavior::Cascade),
        )
        .unwrap();
    builder
        .add_navigation(contains, NavigationDef::to_dependent("Lines", true))
        .unwrap();
    builder
        .add_navigation(contains, NavigationDef::to_principal("Order"))
        .unwrap();

    builder
}

/// The shop model, finalized and wired to the default mapping source.
pub fn shop() -> Model {
    let model = shop_builder().finalize();
    model
        .set_model_dependencies(ormgraph::metadata::ModelDependencies::default())
        .unwrap();
    model
}
