use foodhub_core::db::open_db_in_memory;
use foodhub_core::{
    CatalogService, MenuItem, MenuItemRepository, ModelError, Order, OrderItem, OrderRepository,
    RepoError, Restaurant, RestaurantRepository, ServiceError, SqliteMenuItemRepository,
    SqliteOrderRepository, SqliteRestaurantRepository, SqliteUserRepository, User,
    UserRepository,
};
use rusqlite::Connection;

fn catalog(
    conn: &Connection,
) -> CatalogService<SqliteRestaurantRepository<'_>, SqliteMenuItemRepository<'_>> {
    CatalogService::new(
        SqliteRestaurantRepository::try_new(conn).unwrap(),
        SqliteMenuItemRepository::try_new(conn).unwrap(),
    )
}

fn seed_restaurant(conn: &Connection, name: &str) -> String {
    let mut restaurant = Restaurant::new(name);
    restaurant.location = Some("Market Street".to_string());
    catalog(conn).create_restaurant(&mut restaurant).unwrap()
}

#[test]
fn create_restaurant_assigns_id_and_default_rating() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let mut restaurant = Restaurant::new("Spice Route");
    let id = service.create_restaurant(&mut restaurant).unwrap();

    assert!(id.starts_with("REST-"));
    let loaded = service.get_restaurant(&id).unwrap().unwrap();
    assert_eq!(loaded.name, "Spice Route");
    assert_eq!(loaded.rating, 4.0);
    assert_eq!(loaded.created_at, restaurant.created_at);
}

#[test]
fn non_finite_rating_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();

    let mut restaurant = Restaurant::new("Spice Route");
    restaurant.rating = f64::NAN;

    assert!(matches!(
        repo.create_restaurant(&mut restaurant),
        Err(RepoError::Validation(ModelError::NonFinite { .. }))
    ));
}

#[test]
fn add_menu_item_fills_mirrors() {
    let conn = open_db_in_memory().unwrap();
    let restaurant_id = seed_restaurant(&conn, "Spice Route");
    let service = catalog(&conn);

    let mut item = MenuItem::new("Dal", 6.5);
    item.is_veg = true;
    let item_id = service.add_menu_item(&restaurant_id, &mut item).unwrap();

    assert!(item_id.starts_with("ITEM-"));
    assert_eq!(item.restaurant_id.as_deref(), Some(restaurant_id.as_str()));
    assert_eq!(item.restaurant_name.as_deref(), Some("Spice Route"));

    let menu = service.menu_for_restaurant(&restaurant_id).unwrap();
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].restaurant_name.as_deref(), Some("Spice Route"));
    assert!(menu[0].is_veg);
}

#[test]
fn add_menu_item_to_unknown_restaurant_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let err = service
        .add_menu_item("REST-missing", &mut MenuItem::new("Dal", 6.5))
        .unwrap_err();
    assert!(matches!(err, ServiceError::RestaurantNotFound(id) if id == "REST-missing"));
}

#[test]
fn menu_item_without_owner_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuItemRepository::try_new(&conn).unwrap();

    let err = repo
        .create_menu_item(&mut MenuItem::new("Orphan", 1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelError::MissingOwner { .. })
    ));
}

#[test]
fn menu_item_with_dangling_owner_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMenuItemRepository::try_new(&conn).unwrap();

    let mut item = MenuItem::new("Dal", 6.5);
    item.restaurant = Some("REST-gone".to_string());

    assert!(matches!(
        repo.create_menu_item(&mut item),
        Err(RepoError::NotFound {
            entity: "restaurant",
            ..
        })
    ));
}

#[test]
fn rename_restaurant_refreshes_menu_mirrors() {
    let conn = open_db_in_memory().unwrap();
    let restaurant_id = seed_restaurant(&conn, "Old Name");
    let service = catalog(&conn);
    service
        .add_menu_item(&restaurant_id, &mut MenuItem::new("Dal", 6.5))
        .unwrap();
    service
        .add_menu_item(&restaurant_id, &mut MenuItem::new("Naan", 2.0))
        .unwrap();

    let renamed = service
        .rename_restaurant(&restaurant_id, "New Name")
        .unwrap();

    assert_eq!(renamed.name, "New Name");
    let menu = service.menu_for_restaurant(&restaurant_id).unwrap();
    assert_eq!(menu.len(), 2);
    assert!(menu
        .iter()
        .all(|item| item.restaurant_name.as_deref() == Some("New Name")));
}

#[test]
fn move_menu_item_rewrites_owner_mirrors() {
    let conn = open_db_in_memory().unwrap();
    let from_id = seed_restaurant(&conn, "From");
    let to_id = seed_restaurant(&conn, "To");
    let service = catalog(&conn);
    let mut item = MenuItem::new("Dal", 6.5);
    let item_id = service.add_menu_item(&from_id, &mut item).unwrap();

    let moved = service.move_menu_item(&item_id, &to_id).unwrap();

    assert_eq!(moved.restaurant.as_deref(), Some(to_id.as_str()));
    assert_eq!(moved.restaurant_id.as_deref(), Some(to_id.as_str()));
    assert_eq!(moved.restaurant_name.as_deref(), Some("To"));
    assert!(service.menu_for_restaurant(&from_id).unwrap().is_empty());
    assert_eq!(service.menu_for_restaurant(&to_id).unwrap().len(), 1);
}

#[test]
fn load_restaurant_children_lists_owned_ids() {
    let conn = open_db_in_memory().unwrap();
    let restaurant_id = seed_restaurant(&conn, "Spice Route");
    let service = catalog(&conn);
    let item_id = service
        .add_menu_item(&restaurant_id, &mut MenuItem::new("Dal", 6.5))
        .unwrap();

    let repo = SqliteRestaurantRepository::try_new(&conn).unwrap();
    let mut restaurant = repo.get_restaurant(&restaurant_id).unwrap().unwrap();
    assert!(restaurant.menu_items.is_empty());

    repo.load_restaurant_children(&mut restaurant).unwrap();
    assert_eq!(restaurant.menu_items, vec![item_id]);
    assert!(restaurant.orders.is_empty());
}

#[test]
fn remove_restaurant_cascades_to_menu_and_orders() {
    let conn = open_db_in_memory().unwrap();
    let restaurant_id = seed_restaurant(&conn, "Spice Route");
    let service = catalog(&conn);
    let item_id = service
        .add_menu_item(&restaurant_id, &mut MenuItem::new("Dal", 6.5))
        .unwrap();
    let order_id = seed_order(&conn, Some(&restaurant_id), &item_id);

    service.remove_restaurant(&restaurant_id).unwrap();

    assert!(service.get_restaurant(&restaurant_id).unwrap().is_none());
    let menu_items = SqliteMenuItemRepository::try_new(&conn).unwrap();
    assert!(menu_items.get_menu_item(&item_id).unwrap().is_none());
    let orders = SqliteOrderRepository::try_new(&conn).unwrap();
    assert!(orders.get_order(&order_id).unwrap().is_none());
    assert_eq!(count_rows(&conn, "order_items"), 0);
    assert_eq!(count_rows(&conn, "users"), 1);
}

#[test]
fn remove_menu_item_cascades_to_order_lines_only() {
    let conn = open_db_in_memory().unwrap();
    let restaurant_id = seed_restaurant(&conn, "Spice Route");
    let service = catalog(&conn);
    let item_id = service
        .add_menu_item(&restaurant_id, &mut MenuItem::new("Dal", 6.5))
        .unwrap();
    let order_id = seed_order(&conn, Some(&restaurant_id), &item_id);

    service.remove_menu_item(&item_id).unwrap();

    let orders = SqliteOrderRepository::try_new(&conn).unwrap();
    let order = orders.get_order(&order_id).unwrap().unwrap();
    assert!(order.order_items.is_empty());
    assert!(matches!(
        service.remove_menu_item(&item_id),
        Err(ServiceError::MenuItemNotFound(_))
    ));
}

fn seed_order(conn: &Connection, restaurant_id: Option<&str>, item_id: &str) -> String {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    let orders = SqliteOrderRepository::try_new(conn).unwrap();
    let user_id = users
        .create_user(&mut User::new("Asha", "asha@example.com", "secret"))
        .unwrap();

    let mut order = Order::new(user_id);
    order.restaurant = restaurant_id.map(str::to_string);
    order.add_order_item(OrderItem::new(item_id, 6.5, 1));
    order.total_amount = order.calculate_total_amount();
    orders.create_order(&mut order).unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
