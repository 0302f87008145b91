//! Integration tests for the runtime tier: type mappings, comparers and
//! slot layouts of a finalized model

use std::sync::Arc;

use ormgraph_foundation::annotation::names;
use ormgraph_foundation::{Annotatable, ErrorKind, Value, ValueType};
use ormgraph_metadata::{
    DefaultJsonReaderWriter, DefaultTypeMappingSource, ElementTypeDef, EntityTypeDef,
    ForeignKeyDef, JsonValueReaderWriter, Model, ModelBuilder, ModelDependencies, NavigationDef,
    PropertyDef, StructuralType, TypeConfiguration, TypeMapping, ValueComparer, ValueConverter,
};
use serde_json::json;

fn case_insensitive() -> Arc<ValueComparer> {
    Arc::new(ValueComparer::new(
        "IgnoreCase",
        ValueType::String,
        |a, b| match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => a == b,
        },
        |v| v.as_str().map_or(0, |s| s.len() as u64),
    ))
}

/// `Customer(Code)` referenced by `Invoice(CustomerCode)`; `Code` carries a
/// case-insensitive comparer.
fn invoices() -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let code = builder
        .add_property(
            customer,
            PropertyDef::new("Code", ValueType::String)
                .with_nullable(false)
                .with_value_comparer(case_insensitive()),
        )
        .unwrap();
    let key = builder.set_primary_key(customer, &[code]).unwrap();

    let invoice = builder
        .add_entity_type(EntityTypeDef::named("Invoice"))
        .unwrap();
    let number = builder
        .add_property(invoice, PropertyDef::new("Number", ValueType::Int64))
        .unwrap();
    builder.set_primary_key(invoice, &[number]).unwrap();
    let customer_code = builder
        .add_property(
            invoice,
            PropertyDef::new("CustomerCode", ValueType::String).with_max_length(16),
        )
        .unwrap();
    let fk = builder
        .add_foreign_key(invoice, &[customer_code], key, customer, ForeignKeyDef::new())
        .unwrap();
    builder
        .add_navigation(fk, NavigationDef::to_principal("Customer"))
        .unwrap();
    builder
}

fn with_default_dependencies(model: Model) -> Model {
    model
        .set_model_dependencies(ModelDependencies::new(Arc::new(DefaultTypeMappingSource)))
        .unwrap();
    model
}

// =============================================================================
// Comparers
// =============================================================================

#[test]
fn comparer_flows_from_the_principal() {
    let model = invoices().finalize();
    let invoice = model.get_entity_type("Invoice").unwrap();
    let customer_code = invoice.get_property("CustomerCode").unwrap();

    // Resolved without type mapping services.
    let comparer = customer_code.get_value_comparer().unwrap();
    assert_eq!(comparer.name(), "IgnoreCase");
    assert!(comparer.equals(&Value::string("acme"), &Value::string("ACME")));
    assert_eq!(customer_code.get_key_value_comparer().unwrap().name(), "IgnoreCase");
}

#[test]
fn resolved_comparers_are_cached_once_frozen() {
    let model = invoices().finalize();
    let code = model
        .get_entity_type("Customer")
        .unwrap()
        .get_property("Code")
        .unwrap();
    let first = code.get_value_comparer().unwrap();
    let second = code.get_value_comparer().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn comparer_falls_back_to_the_type_mapping() {
    let model = with_default_dependencies(invoices().finalize());
    let number = model
        .get_entity_type("Invoice")
        .unwrap()
        .get_property("Number")
        .unwrap();

    let comparer = number.get_value_comparer().unwrap();
    assert!(Arc::ptr_eq(&comparer, number.type_mapping().unwrap().comparer()));
    assert!(comparer.equals(&Value::Int(7), &Value::Int(7)));
    assert!(!comparer.equals(&Value::Int(7), &Value::Int(8)));
}

#[test]
fn principal_cycle_falls_back_to_the_type_mapping() {
    // Ledger.Id -> Account.Id and Account.Id -> Ledger.Id.
    let mut builder = ModelBuilder::new();
    let ledger = builder.add_entity_type(EntityTypeDef::named("Ledger")).unwrap();
    let ledger_id = builder
        .add_property(ledger, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let ledger_key = builder.set_primary_key(ledger, &[ledger_id]).unwrap();
    let account = builder.add_entity_type(EntityTypeDef::named("Account")).unwrap();
    let account_id = builder
        .add_property(account, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let account_key = builder.set_primary_key(account, &[account_id]).unwrap();
    builder
        .add_foreign_key(ledger, &[ledger_id], account_key, account, ForeignKeyDef::new())
        .unwrap();
    builder
        .add_foreign_key(account, &[account_id], ledger_key, ledger, ForeignKeyDef::new())
        .unwrap();
    let model = with_default_dependencies(builder.finalize());

    let id = model.get_entity_type("Ledger").unwrap().get_property("Id").unwrap();
    assert_eq!(
        id.find_first_different_principal()
            .map(|p| p.declaring_type().name()),
        Some("Account")
    );
    assert_eq!(id.get_principals().len(), 2);

    let comparer = id.get_value_comparer().unwrap();
    assert!(Arc::ptr_eq(&comparer, id.type_mapping().unwrap().comparer()));
    let key_comparer = id.get_key_value_comparer().unwrap();
    assert_eq!(key_comparer.value_type(), &ValueType::Int32);
}

#[test]
fn provider_comparer_follows_the_converter() {
    let cents = Arc::new(ValueConverter::new(
        "Cents",
        ValueType::Decimal,
        ValueType::Int64,
        |v| Value::Int(v.as_str().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0) * 100),
        |v| Value::Decimal(Arc::from(format!("{}", v.as_int().unwrap_or(0) / 100).as_str())),
    ));
    let mut builder = ModelBuilder::new();
    let product = builder
        .add_entity_type(EntityTypeDef::named("Product"))
        .unwrap();
    builder
        .add_property(
            product,
            PropertyDef::new("Price", ValueType::Decimal).with_converter(cents),
        )
        .unwrap();
    let model = builder.finalize();

    let price = model
        .get_entity_type("Product")
        .unwrap()
        .get_property("Price")
        .unwrap();
    let comparer = price.get_provider_value_comparer().unwrap();
    assert_eq!(comparer.value_type(), &ValueType::Int64);
    assert_eq!(price.value_converter().unwrap().name(), "Cents");
}

// =============================================================================
// Type Mappings
// =============================================================================

#[test]
fn type_mapping_requires_model_dependencies() {
    let model = invoices().finalize();
    let number = model
        .get_entity_type("Invoice")
        .unwrap()
        .get_property("Number")
        .unwrap();

    let err = number.type_mapping().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ModelNotFinalized(_)));
    assert!(number.find_type_mapping().is_none());

    // A failed resolution publishes nothing; dependencies can still be attached.
    let model = with_default_dependencies(model);
    let number = model
        .get_entity_type("Invoice")
        .unwrap()
        .get_property("Number")
        .unwrap();
    assert_eq!(number.type_mapping().unwrap().value_type(), &ValueType::Int64);
    assert!(number.find_type_mapping().is_some());
}

#[test]
fn unmappable_property_reports_no_type_mapping() {
    let mut builder = ModelBuilder::new();
    let shipment = builder
        .add_entity_type(EntityTypeDef::named("Shipment"))
        .unwrap();
    builder
        .add_property(
            shipment,
            PropertyDef::new("Destination", ValueType::named("Shop.Address")),
        )
        .unwrap();
    let model = with_default_dependencies(builder.finalize());

    let destination = model
        .get_entity_type("Shipment")
        .unwrap()
        .get_property("Destination")
        .unwrap();
    let err = destination.type_mapping().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoTypeMapping(_)));
    assert!(format!("{err}").contains("Shipment.Destination"));
}

#[test]
fn explicit_type_mapping_needs_no_services() {
    let mut builder = ModelBuilder::new();
    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    builder
        .add_property(
            order,
            PropertyDef::new("Placed", ValueType::DateTime)
                .with_type_mapping(TypeMapping::new(ValueType::DateTime).with_store_type("timestamp")),
        )
        .unwrap();
    let model = builder.finalize();

    let placed = model
        .get_entity_type("Order")
        .unwrap()
        .get_property("Placed")
        .unwrap();
    assert_eq!(placed.type_mapping().unwrap().store_type(), Some("timestamp"));
}

#[test]
fn model_configuration_supplies_missing_facets() {
    let mut builder = invoices();
    builder.add_type_mapping_configuration(
        TypeConfiguration::new(ValueType::String)
            .with_max_length(256)
            .with_unicode(false),
    );
    let model = builder.finalize();
    let invoice = model.get_entity_type("Invoice").unwrap();

    let info = invoice.get_property("CustomerCode").unwrap().mapping_info();
    assert_eq!(info.max_length, Some(16));
    assert_eq!(info.unicode, Some(false));

    let code = model
        .get_entity_type("Customer")
        .unwrap()
        .get_property("Code")
        .unwrap();
    assert_eq!(code.mapping_info().max_length, Some(256));
}

#[test]
fn first_model_dependencies_win() {
    let model = invoices().finalize();
    let first = model.set_model_dependencies(ModelDependencies::default()).unwrap();
    let second = model.set_model_dependencies(ModelDependencies::default()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(model.model_dependencies().is_some());
}

#[test]
fn element_types_map_separately() {
    let mut builder = ModelBuilder::new();
    let post = builder.add_entity_type(EntityTypeDef::named("Post")).unwrap();
    let tags = builder
        .add_property(
            post,
            PropertyDef::new("Tags", ValueType::collection(ValueType::String)),
        )
        .unwrap();
    builder
        .set_element_type(tags, ElementTypeDef::new(ValueType::String).with_max_length(32))
        .unwrap();
    let model = with_default_dependencies(builder.finalize());

    let tags = model
        .get_entity_type("Post")
        .unwrap()
        .get_property("Tags")
        .unwrap();
    assert!(tags.is_primitive_collection());
    let element = tags.element_type().unwrap();
    assert_eq!(element.collection_property(), tags);
    assert_eq!(element.value_type(), &ValueType::String);
    assert_eq!(element.max_length(), Some(32));
    assert_eq!(element.type_mapping().unwrap().value_type(), &ValueType::String);
    assert!(element.get_value_comparer().is_ok());
}

#[test]
fn json_reader_writer_travels_with_the_property() {
    let mut builder = ModelBuilder::new();
    let post = builder.add_entity_type(EntityTypeDef::named("Post")).unwrap();
    let scores = ValueType::collection(ValueType::Int32);
    builder
        .add_property(
            post,
            PropertyDef::new("Scores", scores.clone())
                .with_json_reader_writer(Arc::new(DefaultJsonReaderWriter::new(scores))),
        )
        .unwrap();
    let model = builder.finalize();

    let property = model
        .get_entity_type("Post")
        .unwrap()
        .get_property("Scores")
        .unwrap();
    let rw = property.json_value_reader_writer().unwrap();
    let value = rw.from_json(&json!([3, 1, 2])).unwrap();
    assert_eq!(rw.to_json(&value), json!([3, 1, 2]));
    assert_eq!(rw.to_json_string(&value), "[3,1,2]");

    let err = rw.from_json(&json!(["three"])).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Conversion(_)));
    assert!(rw.from_json(&json!([1, null])).is_err());
}

// =============================================================================
// Slot Layout
// =============================================================================

#[test]
fn property_counts_cover_the_whole_type() {
    let model = invoices().finalize();
    let invoice = model.get_entity_type("Invoice").unwrap();
    let counts = invoice.property_counts();

    assert_eq!(counts.property_count, 2);
    assert_eq!(counts.navigation_count, 1);
    assert_eq!(counts.complex_property_count, 0);
    // Number (key), CustomerCode (foreign key) and the Customer navigation.
    assert_eq!(counts.relationship_count, 3);
}

#[test]
fn property_indexes_are_dense_and_stable() {
    let model = invoices().finalize();
    let invoice = model.get_entity_type("Invoice").unwrap();

    let indexes: Vec<usize> = invoice
        .get_properties()
        .into_iter()
        .map(|p| p.property_indexes().unwrap().index)
        .collect();
    assert_eq!(indexes, vec![0, 1]);

    let navigation = invoice.find_navigation("Customer").unwrap();
    let slots = navigation.navigation_indexes().unwrap();
    assert_eq!(slots.index, 0);
    assert_eq!(slots.relationship_index, 2);
}

#[test]
fn derived_types_extend_the_base_layout() {
    let mut builder = ModelBuilder::new();
    let animal = builder.add_entity_type(EntityTypeDef::named("Animal")).unwrap();
    let id = builder
        .add_property(animal, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    builder.set_primary_key(animal, &[id]).unwrap();
    let dog = builder
        .add_entity_type(EntityTypeDef::named("Dog").with_base_type(animal))
        .unwrap();
    builder
        .add_property(dog, PropertyDef::new("Breed", ValueType::String))
        .unwrap();
    let model = builder.finalize();

    let dog = model.get_entity_type("Dog").unwrap();
    let animal = model.get_entity_type("Animal").unwrap();
    assert_eq!(animal.property_counts().property_count, 1);
    assert_eq!(dog.property_counts().property_count, 2);
    assert_eq!(
        dog.get_property("Breed").unwrap().property_indexes().unwrap().index,
        1
    );
    assert_eq!(
        dog.get_property("Id").unwrap().property_indexes(),
        animal.get_property("Id").unwrap().property_indexes()
    );
}

#[test]
fn foreign_value_in_a_runtime_slot_is_not_replaced() {
    let model = invoices().finalize();
    let key = model
        .get_entity_type("Invoice")
        .unwrap()
        .find_primary_key()
        .unwrap();
    key.runtime_annotations()
        .set(names::KEY_VALUE_FACTORY, Arc::new("published elsewhere"));

    let factory = key.key_value_factory();
    let row = [Value::Int(12), Value::string("ACME")];
    assert_eq!(factory.create_key(&row).unwrap().values(), &[Value::Int(12)]);

    let slot = key.find_runtime_annotation(names::KEY_VALUE_FACTORY).unwrap();
    assert_eq!(slot.downcast_ref::<&str>(), Some(&"published elsewhere"));
}
