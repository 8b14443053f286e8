use foodhub_core::{MenuItem, ModelError, Order, OrderItem, Restaurant, User, UserType};
use serde_json::{json, Value};

#[test]
fn add_order_links_both_sides_and_assigns_ids() {
    let mut user = User::new("Asha", "asha@example.com", "secret");
    let mut order = Order::new("placeholder");
    order.user = None;

    user.add_order(&mut order);

    let user_id = user.id.clone().unwrap();
    let order_id = order.id.clone().unwrap();
    assert!(user_id.starts_with("USER-"));
    assert!(order_id.starts_with("ORD-"));
    assert_eq!(order.user.as_deref(), Some(user_id.as_str()));
    assert_eq!(user.orders, vec![order_id]);

    user.add_order(&mut order);
    assert_eq!(user.orders.len(), 1);
}

#[test]
fn remove_order_clears_both_sides() {
    let mut user = User::new("Asha", "asha@example.com", "secret");
    let mut order = Order::new("placeholder");
    user.add_order(&mut order);

    user.remove_order(&mut order);

    assert!(user.orders.is_empty());
    assert_eq!(order.user, None);
    assert!(matches!(
        order.validate(),
        Err(ModelError::MissingOwner {
            entity: "order",
            owner: "user"
        })
    ));
}

#[test]
fn restaurant_helpers_keep_menu_and_orders_consistent() {
    let mut restaurant = Restaurant::new("Spice Route");
    let mut item = MenuItem::new("Dal", 6.5);
    let mut order = Order::new("USER-1");

    restaurant.add_menu_item(&mut item);
    restaurant.add_order(&mut order);

    let restaurant_id = restaurant.id.clone().unwrap();
    assert!(restaurant_id.starts_with("REST-"));
    assert_eq!(item.restaurant.as_deref(), Some(restaurant_id.as_str()));
    assert_eq!(order.restaurant.as_deref(), Some(restaurant_id.as_str()));
    assert_eq!(restaurant.menu_items, vec![item.id.clone().unwrap()]);
    assert_eq!(restaurant.orders, vec![order.id.clone().unwrap()]);

    restaurant.remove_menu_item(&mut item);
    restaurant.remove_order(&mut order);
    assert!(restaurant.menu_items.is_empty());
    assert!(restaurant.orders.is_empty());
    assert_eq!(item.restaurant, None);
    assert_eq!(order.restaurant, None);
}

#[test]
fn menu_item_prepare_copies_owner_id_and_name() {
    let mut restaurant = Restaurant::new("Spice Route");
    let mut item = MenuItem::new("Dal", 6.5);
    restaurant.add_menu_item(&mut item);

    item.prepare_for_insert(Some(&restaurant)).unwrap();

    assert_eq!(item.restaurant_id, restaurant.id);
    assert_eq!(item.restaurant_name.as_deref(), Some("Spice Route"));
    assert!(item.created_at.is_some());
}

#[test]
fn menu_item_prepare_rejects_foreign_owner() {
    let mut owner = Restaurant::new("Owner");
    let mut other = Restaurant::new("Other");
    other.prepare_for_insert();
    let mut item = MenuItem::new("Dal", 6.5);
    owner.add_menu_item(&mut item);

    let err = item.prepare_for_insert(Some(&other)).unwrap_err();
    assert!(matches!(err, ModelError::OwnerMismatch { .. }));
    assert_eq!(item.restaurant_name, None);
}

#[test]
fn prepare_for_insert_never_overwrites_identity() {
    let mut user = User::new("Asha", "asha@example.com", "secret");
    user.id = Some("USER-42".to_string());
    user.created_at = Some(1_000);

    user.prepare_for_insert();

    assert_eq!(user.id.as_deref(), Some("USER-42"));
    assert_eq!(user.created_at, Some(1_000));
}

#[test]
fn remove_order_item_detaches_the_line() {
    let mut order = Order::new("USER-1");
    order.add_order_item(OrderItem::new("ITEM-1", 10.0, 2));
    order.add_order_item(OrderItem::new("ITEM-2", 5.0, 1));
    assert!(order
        .order_items
        .iter()
        .all(|line| line.order_id == order.id));

    let target = order.order_items[0].clone();
    let removed = order.remove_order_item(&target).unwrap();

    assert_eq!(removed.order_id, None);
    assert_eq!(order.order_items.len(), 1);
    assert_eq!(order.calculate_total_amount(), 5.0);
}

#[test]
fn user_serialization_hides_password_and_order_list() {
    let mut user = User::new("Asha", "asha@example.com", "secret");
    user.user_type = UserType::Admin;
    user.orders.push("ORD-1".to_string());
    user.prepare_for_insert();

    let value = serde_json::to_value(&user).unwrap();

    assert!(value.get("password").is_none());
    assert!(value.get("orders").is_none());
    assert_eq!(value["userType"], json!("admin"));
    assert!(value["createdAt"].is_i64());
}

#[test]
fn user_deserialization_accepts_password() {
    let user: User = serde_json::from_value(json!({
        "name": "Asha",
        "email": "asha@example.com",
        "password": "secret"
    }))
    .unwrap();

    assert_eq!(user.password, "secret");
    assert_eq!(user.user_type, UserType::Customer);
    assert_eq!(user.id, None);
}

#[test]
fn order_serialization_exposes_mirrors_not_references() {
    let mut user = User::new("Asha", "asha@example.com", "secret");
    user.prepare_for_insert();
    let mut restaurant = Restaurant::new("Spice Route");
    restaurant.prepare_for_insert();

    let mut order = Order::new(user.id.clone().unwrap());
    restaurant.add_order(&mut order);
    order.add_order_item(OrderItem::new("ITEM-1", 10.0, 2));
    order
        .prepare_for_insert(Some(&user), Some(&restaurant))
        .unwrap();

    let value = serde_json::to_value(&order).unwrap();

    assert!(value.get("user").is_none());
    assert!(value.get("restaurant").is_none());
    assert_eq!(value["userId"], json!(user.id));
    assert_eq!(value["restaurantId"], json!(restaurant.id));
    assert_eq!(value["status"], json!("New"));
    let lines = value["orderItems"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["menuItemId"], json!("ITEM-1"));
    assert_eq!(lines[0]["orderId"], json!(order.id));
}

#[test]
fn restaurant_and_menu_item_serialization_skip_back_references() {
    let mut restaurant = Restaurant::new("Spice Route");
    let mut item = MenuItem::new("Dal", 6.5);
    restaurant.add_menu_item(&mut item);
    item.prepare_for_insert(Some(&restaurant)).unwrap();

    let restaurant_json = serde_json::to_value(&restaurant).unwrap();
    let item_json = serde_json::to_value(&item).unwrap();

    assert!(restaurant_json.get("menuItems").is_none());
    assert!(restaurant_json.get("orders").is_none());
    assert_eq!(restaurant_json["rating"], json!(4.0));
    assert!(item_json.get("restaurant").is_none());
    assert_eq!(item_json["restaurantName"], json!("Spice Route"));
    assert_eq!(item_json["isVeg"], Value::Bool(false));
}

#[test]
fn add_order_item_drops_carried_row_id() {
    let mut order = Order::new("USER-1");
    let mut line = OrderItem::new("ITEM-1", 10.0, 1);
    line.id = Some(41);
    line.order_id = Some("ORD-other".to_string());

    order.add_order_item(line);

    assert_eq!(order.order_items[0].id, None);
    assert_eq!(order.order_items[0].order_id, order.id);
}
