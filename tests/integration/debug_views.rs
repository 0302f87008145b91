//! Integration tests for debug renderings of a complete model

use ormgraph::metadata::DebugStringOptions;

use crate::{shop, shop_builder};

#[test]
fn model_view_lists_every_entity_type_in_name_order() {
    let model = shop();
    let text = model.to_debug_string(DebugStringOptions::short(), 0);
    let positions: Vec<usize> = ["EntityType: Customer", "EntityType: Order", "EntityType: OrderLine"]
        .iter()
        .map(|header| text.find(header).unwrap())
        .collect();
    assert!(text.starts_with("Model:"));
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn single_line_summary() {
    let model = shop();
    assert_eq!(
        model.to_debug_string(DebugStringOptions::single_line(), 0),
        "Model: 3 entity types"
    );
}

#[test]
fn entity_type_view_shows_relationships() {
    let model = shop();
    let view = model.get_entity_type("OrderLine").unwrap().debug_view();
    let short = view.short_view();

    assert!(short.starts_with("EntityType: OrderLine"));
    assert!(short.contains("OrderId (i64) Shadow Required PK FK"));
    assert!(short.contains("Navigations:"));
    assert!(short.contains("Foreign keys:"));
    assert!(short.contains("Cascade"));
    assert!(!short.contains("PropertyIndexes"));
}

#[test]
fn long_view_adds_slots_and_mappings() {
    let model = shop();
    let view = model.get_entity_type("Customer").unwrap().debug_view();
    let long = view.long_view();

    assert!(long.contains("PropertyIndexes(0,"));
    assert!(long.contains("TypeMapping:"));
    assert!(!long.contains("<error"));
    assert!(long.contains("MaxLength(254)"));
}

#[test]
fn long_view_before_wiring_reports_mapping_errors_inline() {
    let builder = shop_builder();
    let view = builder.get_entity_type("Order").unwrap().debug_view();
    assert!(view.long_view().contains("<error: model not finalized"));
    assert!(!view.short_view().contains("<error"));
}

#[test]
fn member_views_render_single_nodes() {
    let model = shop();
    let customer = model.get_entity_type("Customer").unwrap();

    let key = customer.find_primary_key().unwrap().debug_view();
    assert!(key.short_view().contains("Id PK"));

    let index = customer
        .find_index_by_name("IX_Customer_Email")
        .unwrap()
        .debug_view();
    assert!(index.short_view().contains("Email"));
    assert!(index.short_view().contains("Unique"));
}
