//! Integration tests for sharing a finalized model across threads

use std::sync::{Arc, Barrier};
use std::thread;

use ormgraph::foundation::{HostType, ValueType};
use ormgraph::metadata::{
    EntityTypeDef, Model, ModelBuilder, ModelDependencies, PropertyDef, StructuralType,
};

use crate::{shop, shop_builder};

const THREADS: usize = 8;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn model_is_send_and_sync() {
    assert_send_sync::<Model>();
}

// =============================================================================
// Concurrent Reads
// =============================================================================

#[test]
fn concurrent_readers_observe_the_same_runtime_values() {
    let model = Arc::new(shop());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let model = Arc::clone(&model);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let line = model.get_entity_type("OrderLine").unwrap();
                let counts = line.property_counts();
                let factory = line.find_primary_key().unwrap().key_value_factory();
                let order_id = line.get_property("OrderId").unwrap();
                let comparer = order_id.get_value_comparer().unwrap();
                let mapping: *const _ = order_id.type_mapping().unwrap();
                (counts, factory, comparer, mapping as usize)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let (counts, factory, comparer, mapping) = &results[0];
    for (other_counts, other_factory, other_comparer, other_mapping) in &results[1..] {
        assert_eq!(counts, other_counts);
        assert!(Arc::ptr_eq(factory, other_factory));
        assert!(Arc::ptr_eq(comparer, other_comparer));
        assert_eq!(mapping, other_mapping);
    }
}

#[test]
fn concurrent_dependency_registration_has_one_winner() {
    let model = Arc::new(shop_builder().finalize());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let model = Arc::clone(&model);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                model
                    .set_model_dependencies(ModelDependencies::default())
                    .unwrap()
            })
        })
        .collect();

    let winners: Vec<Arc<ModelDependencies>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    for winner in &winners[1..] {
        assert!(Arc::ptr_eq(&winners[0], winner));
    }
}

// =============================================================================
// Ad-hoc Entity Types
// =============================================================================

fn single_type_model(name: &str) -> Arc<Model> {
    let mut builder = ModelBuilder::new();
    let ty = builder.add_entity_type(EntityTypeDef::named(name)).unwrap();
    builder
        .add_property(ty, PropertyDef::new("Value", ValueType::String))
        .unwrap();
    Arc::new(builder.finalize())
}

#[test]
fn racing_ad_hoc_registrations_converge() {
    let model = Arc::new(shop());
    let host = HostType::new("Reports.DailyTotal");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let model = Arc::clone(&model);
            let host = host.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let ad_hoc = single_type_model("DailyTotal");
                let id = ad_hoc.get_entity_type("DailyTotal").unwrap().id();
                barrier.wait();
                model.add_ad_hoc_entity_type(host, ad_hoc, id).unwrap()
            })
        })
        .collect();

    let registrations: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for registration in &registrations[1..] {
        assert_eq!(&registrations[0], registration);
    }
    assert_eq!(model.ad_hoc_entity_type_count(), 1);

    let found = model.find_ad_hoc_entity_type(&host).unwrap();
    assert_eq!(found, registrations[0]);
    assert_eq!(found.entity_type().name(), "DailyTotal");
    assert!(found.entity_type().find_property("Value").is_some());

    // The shop model itself is unchanged.
    assert!(model.find_entity_type("DailyTotal").is_none());
}
