//! Integration tests for foreign keys, navigations and skip navigations

use ormgraph_foundation::{ErrorKind, ValueType};
use ormgraph_metadata::{
    DeleteBehavior, EntityTypeDef, EntityTypeId, ForeignKeyDef, ForeignKeyId, KeyId,
    ModelBuilder, NavigationDef, PropertyDef, PropertyId, SkipNavigationDef, StructuralType,
};

struct Shop {
    builder: ModelBuilder,
    order: EntityTypeId,
    line: EntityTypeId,
    order_key: KeyId,
    line_order_id: PropertyId,
    line_no: PropertyId,
}

/// `Order(Id)` and `OrderLine(OrderId, LineNo)`, without relationships.
fn shop() -> Shop {
    let mut builder = ModelBuilder::new();
    let order = builder.add_entity_type(EntityTypeDef::named("Order")).unwrap();
    let order_id = builder
        .add_property(order, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let order_key = builder.set_primary_key(order, &[order_id]).unwrap();

    let line = builder
        .add_entity_type(EntityTypeDef::named("OrderLine"))
        .unwrap();
    let line_order_id = builder
        .add_property(line, PropertyDef::new("OrderId", ValueType::Int32))
        .unwrap();
    let line_no = builder
        .add_property(line, PropertyDef::new("LineNo", ValueType::Int32))
        .unwrap();
    builder.set_primary_key(line, &[line_order_id, line_no]).unwrap();

    Shop {
        builder,
        order,
        line,
        order_key,
        line_order_id,
        line_no,
    }
}

/// Adds `OrderLine.OrderId -> Order.Id` with `Order.Lines` and `OrderLine.Order`.
fn with_lines(shop: &mut Shop) -> ForeignKeyId {
    let fk = shop
        .builder
        .add_foreign_key(
            shop.line,
            &[shop.line_order_id],
            shop.order_key,
            shop.order,
            ForeignKeyDef::new()
                .required()
                .with_delete_behavior(DeleteBehavior::Cascade),
        )
        .unwrap();
    shop.builder
        .add_navigation(fk, NavigationDef::to_dependent("Lines", true))
        .unwrap();
    shop.builder
        .add_navigation(fk, NavigationDef::to_principal("Order"))
        .unwrap();
    fk
}

// =============================================================================
// Foreign Keys
// =============================================================================

#[test]
fn foreign_key_is_visible_from_both_ends() {
    let mut shop = shop();
    let fk = with_lines(&mut shop);
    let model = shop.builder.finalize();

    let order = model.get_entity_type("Order").unwrap();
    let line = model.get_entity_type("OrderLine").unwrap();
    let fk = model.foreign_key(fk).unwrap();

    assert_eq!(fk.declaring_entity_type(), line);
    assert_eq!(fk.principal_entity_type(), order);
    assert_eq!(fk.principal_key(), order.find_primary_key().unwrap());
    assert!(fk.is_required());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::Cascade);

    assert_eq!(line.get_declared_foreign_keys(), vec![fk]);
    assert_eq!(order.get_referencing_foreign_keys(), vec![fk]);
    assert_eq!(fk.principal_key().get_referencing_foreign_keys(), vec![fk]);
    assert!(fk.principal_key().is_referenced());

    let order_id = line.get_property("OrderId").unwrap();
    assert!(order_id.is_foreign_key());
    assert_eq!(order_id.get_containing_foreign_keys(), vec![fk]);
    assert_eq!(line.find_foreign_keys_for_property(order_id.id()), vec![fk]);
    assert_eq!(
        order_id.find_first_principal().map(|p| p.name()),
        Some("Id")
    );
}

#[test]
fn arity_mismatch_leaves_the_graph_untouched() {
    let mut shop = shop();
    let err = shop
        .builder
        .add_foreign_key(
            shop.line,
            &[shop.line_order_id, shop.line_no],
            shop.order_key,
            shop.order,
            ForeignKeyDef::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::ForeignKeyArityMismatch {
            dependent: 2,
            principal: 1
        }
    ));
    assert!(format!("{err}").contains("add_foreign_key"));

    let line = shop.builder.entity_type(shop.line).unwrap();
    assert!(line.get_foreign_keys().is_empty());
    assert!(!line.get_property("OrderId").unwrap().is_foreign_key());
    let order = shop.builder.entity_type(shop.order).unwrap();
    assert!(order.get_referencing_foreign_keys().is_empty());
}

#[test]
fn duplicate_foreign_key_is_rejected() {
    let mut shop = shop();
    with_lines(&mut shop);
    let err = shop
        .builder
        .add_foreign_key(
            shop.line,
            &[shop.line_order_id],
            shop.order_key,
            shop.order,
            ForeignKeyDef::new(),
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateForeignKey(_)));
}

#[test]
fn removing_a_foreign_key_clears_every_back_reference() {
    let mut shop = shop();
    let fk = with_lines(&mut shop);
    shop.builder.remove_foreign_key(fk).unwrap();

    assert!(shop.builder.foreign_key(fk).is_none());
    let order = shop.builder.entity_type(shop.order).unwrap();
    let line = shop.builder.entity_type(shop.line).unwrap();
    assert!(order.get_referencing_foreign_keys().is_empty());
    assert!(order.find_navigation("Lines").is_none());
    assert!(line.find_navigation("Order").is_none());
    assert!(!line.get_property("OrderId").unwrap().is_foreign_key());
    assert!(!order.find_primary_key().unwrap().is_referenced());

    // The principal key is free again.
    let key = order.find_primary_key().unwrap().id();
    shop.builder.clear_primary_key(shop.order).unwrap();
    shop.builder.remove_key(key).unwrap();
}

#[test]
fn referenced_key_cannot_be_removed() {
    let mut shop = shop();
    with_lines(&mut shop);
    shop.builder.clear_primary_key(shop.order).unwrap();
    let err = shop.builder.remove_key(shop.order_key).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InUse { .. }));
}

#[test]
fn self_referencing_foreign_key() {
    let mut builder = ModelBuilder::new();
    let employee = builder
        .add_entity_type(EntityTypeDef::named("Employee"))
        .unwrap();
    let id = builder
        .add_property(employee, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let manager_id = builder
        .add_property(
            employee,
            PropertyDef::new("ManagerId", ValueType::nullable(ValueType::Int32)),
        )
        .unwrap();
    let key = builder.set_primary_key(employee, &[id]).unwrap();
    let fk = builder
        .add_foreign_key(employee, &[manager_id], key, employee, ForeignKeyDef::new())
        .unwrap();

    let fk = builder.foreign_key(fk).unwrap();
    assert!(fk.is_self_referencing());
    assert!(!fk.is_required());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::ClientSetNull);
}

#[test]
fn single_property_scan_skips_composite_foreign_keys() {
    let mut shop = shop();
    let line_key = shop
        .builder
        .entity_type(shop.line)
        .unwrap()
        .find_primary_key()
        .unwrap()
        .id();
    let shipment = shop
        .builder
        .add_entity_type(EntityTypeDef::named("Shipment"))
        .unwrap();
    let order_id = shop
        .builder
        .add_property(shipment, PropertyDef::new("OrderId", ValueType::Int32))
        .unwrap();
    let line_no = shop
        .builder
        .add_property(shipment, PropertyDef::new("LineNo", ValueType::Int32))
        .unwrap();
    let fk = shop
        .builder
        .add_foreign_key(
            shipment,
            &[order_id, line_no],
            line_key,
            shop.line,
            ForeignKeyDef::new(),
        )
        .unwrap();

    let shipment = shop.builder.entity_type(shipment).unwrap();
    assert!(shipment.find_foreign_keys_for_property(order_id).is_empty());
    assert!(shipment.find_foreign_keys_for_property(line_no).is_empty());
    assert!(shipment.find_foreign_keys(&[line_no, order_id]).is_empty());

    let composite = shipment.find_foreign_keys(&[order_id, line_no]);
    assert_eq!(composite.iter().map(|fk| fk.id()).collect::<Vec<_>>(), vec![fk]);
    let property = shipment.get_property("OrderId").unwrap();
    assert!(property.is_foreign_key());
    assert_eq!(property.get_containing_foreign_keys(), composite);
}

// =============================================================================
// Navigations
// =============================================================================

#[test]
fn navigations_are_inverses_of_each_other() {
    let mut shop = shop();
    let fk = with_lines(&mut shop);
    let model = shop.builder.finalize();

    let order = model.get_entity_type("Order").unwrap();
    let line = model.get_entity_type("OrderLine").unwrap();
    let lines = order.find_navigation("Lines").unwrap();
    let to_order = line.find_navigation("Order").unwrap();

    assert!(lines.is_collection());
    assert!(!lines.is_on_dependent());
    assert_eq!(lines.target_entity_type(), line);
    assert_eq!(to_order.target_entity_type(), order);
    assert_eq!(lines.inverse(), Some(to_order));
    assert_eq!(to_order.inverse(), Some(lines));

    let fk = model.foreign_key(fk).unwrap();
    assert_eq!(fk.principal_to_dependent(), Some(lines));
    assert_eq!(fk.dependent_to_principal(), Some(to_order));
    assert_eq!(fk.get_navigation(true), Some(to_order));
    assert_eq!(fk.get_related_entity_type(order), Some(line));
}

#[test]
fn navigation_to_principal_cannot_be_a_collection() {
    let mut shop = shop();
    let fk = shop
        .builder
        .add_foreign_key(
            shop.line,
            &[shop.line_order_id],
            shop.order_key,
            shop.order,
            ForeignKeyDef::new(),
        )
        .unwrap();
    let def = NavigationDef {
        collection: true,
        ..NavigationDef::to_principal("Order")
    };
    let err = shop.builder.add_navigation(fk, def).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidHierarchy(_)));
}

#[test]
fn navigation_names_clash_with_properties() {
    let mut shop = shop();
    let fk = shop
        .builder
        .add_foreign_key(
            shop.line,
            &[shop.line_order_id],
            shop.order_key,
            shop.order,
            ForeignKeyDef::new(),
        )
        .unwrap();
    let err = shop
        .builder
        .add_navigation(fk, NavigationDef::to_principal("LineNo"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateMember { .. }));
}

#[test]
fn removing_a_navigation_keeps_its_inverse() {
    let mut shop = shop();
    let fk = with_lines(&mut shop);
    let lines = shop
        .builder
        .entity_type(shop.order)
        .unwrap()
        .find_navigation("Lines")
        .unwrap()
        .id();
    shop.builder.remove_navigation(lines).unwrap();

    let fk = shop.builder.foreign_key(fk).unwrap();
    assert!(fk.principal_to_dependent().is_none());
    let to_order = fk.dependent_to_principal().unwrap();
    assert!(to_order.inverse().is_none());
    assert!(shop.builder.remove_navigation(lines).is_err());
}

// =============================================================================
// Skip Navigations
// =============================================================================

fn keyed(builder: &mut ModelBuilder, name: &str) -> (EntityTypeId, KeyId) {
    let ty = builder.add_entity_type(EntityTypeDef::named(name)).unwrap();
    let id = builder
        .add_property(ty, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let key = builder.set_primary_key(ty, &[id]).unwrap();
    (ty, key)
}

#[test]
fn many_to_many_through_a_join_type() {
    let mut builder = ModelBuilder::new();
    let (post, post_key) = keyed(&mut builder, "Post");
    let (tag, tag_key) = keyed(&mut builder, "Tag");

    let join = builder
        .add_entity_type(EntityTypeDef::named("PostTag"))
        .unwrap();
    let post_id = builder
        .add_property(join, PropertyDef::new("PostId", ValueType::Int32))
        .unwrap();
    let tag_id = builder
        .add_property(join, PropertyDef::new("TagId", ValueType::Int32))
        .unwrap();
    builder.set_primary_key(join, &[post_id, tag_id]).unwrap();
    let to_post = builder
        .add_foreign_key(join, &[post_id], post_key, post, ForeignKeyDef::new().required())
        .unwrap();
    let to_tag = builder
        .add_foreign_key(join, &[tag_id], tag_key, tag, ForeignKeyDef::new().required())
        .unwrap();

    let tags = builder
        .add_skip_navigation(post, to_post, SkipNavigationDef::new("Tags", tag))
        .unwrap();
    let posts = builder
        .add_skip_navigation(tag, to_tag, SkipNavigationDef::new("Posts", post))
        .unwrap();
    builder.set_skip_navigation_inverse(tags, posts).unwrap();
    builder.set_skip_navigation_inverse(posts, tags).unwrap();

    // A foreign key used by a skip navigation stays.
    let err = builder.remove_foreign_key(to_post).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InUse { .. }));

    let model = builder.finalize();
    let post = model.get_entity_type("Post").unwrap();
    let tags = post.find_skip_navigation("Tags").unwrap();
    assert!(tags.is_collection());
    assert_eq!(tags.target_entity_type().name(), "Tag");
    assert_eq!(tags.join_entity_type().name(), "PostTag");
    assert_eq!(tags.inverse().map(|n| n.name()), Some("Posts"));
    assert_eq!(
        tags.foreign_key().get_referencing_skip_navigations(),
        vec![tags]
    );
}

#[test]
fn skip_navigation_inverse_must_point_back() {
    let mut shop = shop();
    let fk = with_lines(&mut shop);
    let order = shop.order;
    let line = shop.line;
    let from_order = shop
        .builder
        .add_skip_navigation(order, fk, SkipNavigationDef::new("Related", order))
        .unwrap();
    let from_line = shop
        .builder
        .add_skip_navigation(
            line,
            fk,
            SkipNavigationDef::new("Siblings", line).on_dependent(),
        )
        .unwrap();

    let err = shop
        .builder
        .set_skip_navigation_inverse(from_order, from_line)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidHierarchy(_)));

    shop.builder.remove_skip_navigation(from_line).unwrap();
    assert!(
        shop.builder
            .entity_type(line)
            .unwrap()
            .find_skip_navigation("Siblings")
            .is_none()
    );
}

// =============================================================================
// Ownership
// =============================================================================

/// `Customer` (with derived `VipCustomer`) owns `Address`, which owns `GeoPoint`.
fn owned_addresses() -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    let customer = builder
        .add_entity_type(EntityTypeDef::named("Customer"))
        .unwrap();
    let customer_id = builder
        .add_property(customer, PropertyDef::new("Id", ValueType::Int32))
        .unwrap();
    let customer_key = builder.set_primary_key(customer, &[customer_id]).unwrap();
    builder
        .add_entity_type(EntityTypeDef::named("VipCustomer").with_base_type(customer))
        .unwrap();

    let address = builder.add_entity_type(EntityTypeDef::named("Address")).unwrap();
    let address_id = builder
        .add_property(address, PropertyDef::new("CustomerId", ValueType::Int32))
        .unwrap();
    let address_key = builder.set_primary_key(address, &[address_id]).unwrap();
    builder
        .add_foreign_key(
            address,
            &[address_id],
            customer_key,
            customer,
            ForeignKeyDef::new().unique().required().ownership(),
        )
        .unwrap();

    let geo = builder.add_entity_type(EntityTypeDef::named("GeoPoint")).unwrap();
    let geo_id = builder
        .add_property(geo, PropertyDef::new("AddressId", ValueType::Int32))
        .unwrap();
    builder.set_primary_key(geo, &[geo_id]).unwrap();
    builder
        .add_foreign_key(geo, &[geo_id], address_key, address, ForeignKeyDef::new().ownership())
        .unwrap();
    builder
}

#[test]
fn ownership_marks_the_dependent_as_owned() {
    let model = owned_addresses().finalize();
    let customer = model.get_entity_type("Customer").unwrap();
    let address = model.get_entity_type("Address").unwrap();

    let ownership = address.find_ownership().unwrap();
    assert!(ownership.is_ownership());
    assert_eq!(ownership.principal_entity_type(), customer);
    assert!(address.is_owned());
    assert!(!customer.is_owned());
    assert!(customer.find_ownership().is_none());
}

#[test]
fn ownership_path_runs_from_owned_to_owners() {
    let model = owned_addresses().finalize();
    let customer = model.get_entity_type("Customer").unwrap();
    let vip = model.get_entity_type("VipCustomer").unwrap();
    let address = model.get_entity_type("Address").unwrap();
    let geo = model.get_entity_type("GeoPoint").unwrap();

    assert!(address.is_in_ownership_path(address));
    assert!(address.is_in_ownership_path(customer));
    assert!(geo.is_in_ownership_path(address));
    assert!(geo.is_in_ownership_path(customer));

    // Owners never lie on the path of the types they own.
    assert!(!customer.is_in_ownership_path(address));
    assert!(!address.is_in_ownership_path(geo));

    // Ownership declared against the base covers derived owners.
    assert!(geo.is_in_ownership_path(vip));
    assert!(!vip.is_in_ownership_path(customer));
}
