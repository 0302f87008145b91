//! Integration tests for indexes, complex properties, service properties,
//! triggers and node annotations

use ormgraph_foundation::{Annotatable, ErrorKind, HostType, MemberHandle, MemberKind, Value, ValueType};
use ormgraph_metadata::{
    ComplexPropertyDef, EntityTypeDef, IndexDef, MemberRef, ModelBuilder, NodeId, PropertyDef,
    ServicePropertyDef, StructuralType,
};

// =============================================================================
// Indexes
// =============================================================================

#[test]
fn unnamed_indexes_are_identified_by_ordered_properties() {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let last = builder
        .add_property(customer, PropertyDef::new("LastName", ValueType::String))
        .unwrap();
    let first = builder
        .add_property(customer, PropertyDef::new("FirstName", ValueType::String))
        .unwrap();

    let by_name = builder
        .add_index(
            customer,
            &[last, first],
            IndexDef::new().with_descending(vec![false, true]),
        )
        .unwrap();
    builder.add_index(customer, &[first, last], IndexDef::new()).unwrap();
    let err = builder
        .add_index(customer, &[last, first], IndexDef::new().unique())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateIndex(_)));

    let ty = builder.entity_type(customer).unwrap();
    let index = ty.find_index(&[last, first]).unwrap();
    assert_eq!(index.id(), by_name);
    assert_eq!(index.name(), None);
    assert_eq!(index.is_descending(), Some(&[false, true][..]));
    assert_eq!(ty.get_declared_indexes().len(), 2);
    assert!(ty.get_property("LastName").unwrap().is_index());
    assert!(!ty.get_property("LastName").unwrap().is_unique_index());
}

#[test]
fn descending_flags_must_match_the_property_count() {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let email = builder
        .add_property(customer, PropertyDef::new("Email", ValueType::String))
        .unwrap();
    let err = builder
        .add_index(customer, &[email], IndexDef::new().with_descending(vec![true, false]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidHierarchy(_)));
}

#[test]
fn named_indexes_are_unique_across_the_hierarchy() {
    let mut builder = ModelBuilder::new();
    let person = builder.add_entity_type(EntityTypeDef::named("Person")).unwrap();
    let name = builder
        .add_property(person, PropertyDef::new("Name", ValueType::String))
        .unwrap();
    let employee = builder
        .add_entity_type(EntityTypeDef::named("Employee").with_base_type(person))
        .unwrap();
    let badge = builder
        .add_property(employee, PropertyDef::new("Badge", ValueType::Int32))
        .unwrap();

    builder
        .add_index(employee, &[badge], IndexDef::named("IX_Lookup").unique())
        .unwrap();
    let err = builder
        .add_index(person, &[name], IndexDef::named("IX_Lookup"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateIndex(_)));

    // Unnamed indexes over different lists coexist with the named one.
    builder.add_index(person, &[name], IndexDef::new()).unwrap();
    let model = builder.finalize();

    let employee = model.get_entity_type("Employee").unwrap();
    let lookup = employee.find_index_by_name("IX_Lookup").unwrap();
    assert!(lookup.is_unique());
    assert_eq!(lookup.declaring_entity_type(), employee);
    assert_eq!(employee.get_indexes().len(), 2);
    assert!(employee.get_property("Badge").unwrap().is_unique_index());

    let person = model.get_entity_type("Person").unwrap();
    assert_eq!(person.get_derived_indexes(), vec![lookup]);
}

#[test]
fn indexed_property_cannot_be_removed_until_the_index_is() {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let email = builder
        .add_property(customer, PropertyDef::new("Email", ValueType::String))
        .unwrap();
    let index = builder.add_index(customer, &[email], IndexDef::new()).unwrap();

    let err = builder.remove_property(email).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InUse { .. }));

    builder.remove_index(index).unwrap();
    builder.remove_property(email).unwrap();
    assert!(
        builder
            .entity_type(customer)
            .unwrap()
            .find_property("Email")
            .is_none()
    );
}

// =============================================================================
// Complex Properties
// =============================================================================

#[test]
fn complex_types_nest_inside_entity_types() {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    builder
        .add_property(customer, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let (_, address) = builder
        .add_complex_property(
            customer,
            ComplexPropertyDef::new("Address", HostType::new("Shop.Address")),
        )
        .unwrap();
    builder
        .add_property(address, PropertyDef::new("Street", ValueType::String))
        .unwrap();
    let (_, geo) = builder
        .add_complex_property(
            address,
            ComplexPropertyDef::new("Location", HostType::new("Shop.GeoPoint"))
                .with_complex_type_name("GeoPoint"),
        )
        .unwrap();
    builder
        .add_property(geo, PropertyDef::new("Latitude", ValueType::Float64))
        .unwrap();
    let model = builder.finalize();

    let customer = model.get_entity_type("Customer").unwrap();
    let address = customer.find_complex_property("Address").unwrap();
    let address_type = address.complex_type();
    assert_eq!(address_type.name(), "Customer.Address#Address");
    assert_eq!(address_type.complex_property(), address);
    assert_eq!(address.declaring_type(), customer.as_structural());

    let location = address_type.find_complex_property("Location").unwrap();
    assert_eq!(location.complex_type().name(), "GeoPoint");
    assert_eq!(
        location
            .complex_type()
            .as_structural()
            .containing_entity_type(),
        Some(customer)
    );

    let flattened: Vec<&str> = customer
        .get_flattened_properties()
        .into_iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(flattened, vec!["Id", "Street", "Latitude"]);
}

#[test]
fn complex_property_names_share_the_member_namespace() {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    builder
        .add_property(customer, PropertyDef::new("Address", ValueType::String))
        .unwrap();
    let err = builder
        .add_complex_property(
            customer,
            ComplexPropertyDef::new("Address", HostType::new("Shop.Address")),
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }));
}

// =============================================================================
// Indexers and Property Bags
// =============================================================================

#[test]
fn indexer_properties_need_an_indexer() {
    let mut builder = ModelBuilder::new();
    let plain = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    let err = builder
        .add_indexer_property(plain, PropertyDef::new("Extra", ValueType::String))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NonIndexerEntityType { .. }));

    let indexer = MemberHandle::opaque(MemberKind::Indexer, "Item");
    let bag = builder
        .add_entity_type(EntityTypeDef::property_bag("OrderTag", indexer.clone()))
        .unwrap();
    builder
        .add_indexer_property(bag, PropertyDef::new("Tag", ValueType::String))
        .unwrap();

    let bag = builder.entity_type(bag).unwrap();
    assert!(bag.is_property_bag());
    assert!(bag.has_shared_host_type());
    let tag = bag.get_property("Tag").unwrap();
    assert!(tag.is_indexer_property());
    assert_eq!(tag.member(), Some(&indexer));
}

// =============================================================================
// Service Properties and Triggers
// =============================================================================

#[test]
fn service_properties_are_members() {
    let mut builder = ModelBuilder::new();
    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    let context = builder
        .add_service_property(
            order,
            ServicePropertyDef::new("Context", HostType::new("Shop.DbContext")),
        )
        .unwrap();
    let err = builder
        .add_property(order, PropertyDef::new("Context", ValueType::String))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }));

    let ty = builder.entity_type(order).unwrap();
    let service = ty.find_service_property("Context").unwrap();
    assert_eq!(service.id(), context);
    assert_eq!(service.service_type().short_name(), "DbContext");
    assert_eq!(ty.find_member("Context"), Some(MemberRef::ServiceProperty(service)));

    builder.remove_service_property(context).unwrap();
    assert!(
        builder
            .entity_type(order)
            .unwrap()
            .get_service_properties()
            .is_empty()
    );
}

#[test]
fn trigger_names_are_unique_per_hierarchy() {
    let mut builder = ModelBuilder::new();
    let animal = builder.add_entity_type(EntityTypeDef::named("Animal")).unwrap();
    let dog = builder
        .add_entity_type(EntityTypeDef::named("Dog").with_base_type(animal))
        .unwrap();
    builder.add_trigger(dog, "trg_audit").unwrap();
    let err = builder.add_trigger(animal, "trg_audit").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }));

    let stamp = builder.add_trigger(animal, "trg_stamp").unwrap();
    let model = builder.finalize();
    let dog = model.get_entity_type("Dog").unwrap();
    let names: Vec<&str> = dog.get_triggers().into_iter().map(|t| t.model_name()).collect();
    assert_eq!(names, vec!["trg_stamp", "trg_audit"]);
    assert_eq!(dog.find_trigger("trg_stamp").map(|t| t.id()), Some(stamp));
    assert!(dog.find_declared_trigger("trg_stamp").is_none());
    assert_eq!(model.trigger(stamp).unwrap().declaring_entity_type().name(), "Animal");
}

// =============================================================================
// Annotations
// =============================================================================

#[test]
fn annotations_attach_to_any_node() {
    let mut builder = ModelBuilder::new();
    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    let id = builder
        .add_property(order, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let key = builder.set_primary_key(order, &[id]).unwrap();

    builder.set_annotation(order, "Table", Value::string("Orders")).unwrap();
    builder.set_annotation(id, "Column", Value::string("order_id")).unwrap();
    builder.add_annotation(key, "Name", Value::string("PK_Orders")).unwrap();
    builder.set_product_version("1.4.0");
    let err = builder
        .add_annotation(key, "Name", Value::string("PK_Other"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateAnnotation(_)));

    let model = builder.finalize();
    let order = model.get_entity_type("Order").unwrap();
    assert_eq!(
        order.get_annotation("Table").unwrap().value(),
        &Value::string("Orders")
    );
    assert_eq!(
        model
            .find_node_annotations(NodeId::Property(id))
            .and_then(|a| a.find_value("Column")),
        Some(&Value::string("order_id"))
    );
    assert!(model.key(key).unwrap().find_annotation("Name").is_some());
    assert_eq!(model.product_version(), Some("1.4.0"));
}

#[test]
fn removed_annotations_are_returned() {
    let mut builder = ModelBuilder::new();
    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    builder.set_annotation(order, "Schema", Value::string("sales")).unwrap();

    let removed = builder.remove_annotation(order, "Schema").unwrap();
    assert_eq!(removed.map(|a| a.value().clone()), Some(Value::string("sales")));
    assert_eq!(builder.remove_annotation(order, "Schema").unwrap(), None);
}
