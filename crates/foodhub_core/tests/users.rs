use foodhub_core::db::open_db_in_memory;
use foodhub_core::{
    Order, OrderItem, OrderRepository, RepoError, SqliteOrderRepository, SqliteUserRepository,
    User, UserRepository, UserType,
};
use rusqlite::Connection;

#[test]
fn create_assigns_prefixed_id_and_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("Asha", "asha@example.com", "secret");
    let id = repo.create_user(&mut user).unwrap();

    assert!(id.starts_with("USER-"));
    assert_eq!(user.id.as_deref(), Some(id.as_str()));
    let created_at = user.created_at.unwrap();
    assert!(created_at > 0);

    let loaded = repo.get_user(&id).unwrap().unwrap();
    assert_eq!(loaded.email, "asha@example.com");
    assert_eq!(loaded.password, "secret");
    assert_eq!(loaded.user_type, UserType::Customer);
    assert_eq!(loaded.created_at, Some(created_at));
}

#[test]
fn update_keeps_id_and_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("Asha", "asha@example.com", "secret");
    let id = repo.create_user(&mut user).unwrap();
    let created_at = user.created_at;

    user.phone = Some("555-0101".to_string());
    user.user_type = UserType::Admin;
    repo.update_user(&mut user).unwrap();

    let loaded = repo.get_user(&id).unwrap().unwrap();
    assert_eq!(loaded.id.as_deref(), Some(id.as_str()));
    assert_eq!(loaded.created_at, created_at);
    assert_eq!(loaded.phone.as_deref(), Some("555-0101"));
    assert_eq!(loaded.user_type, UserType::Admin);
}

#[test]
fn update_unsaved_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("Asha", "asha@example.com", "secret");
    let err = repo.update_user(&mut user).unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn duplicate_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&mut User::new("Asha", "dup@example.com", "a"))
        .unwrap();
    let err = repo
        .create_user(&mut User::new("Ravi", "dup@example.com", "b"))
        .unwrap_err();

    match err {
        RepoError::DuplicateEmail(email) => assert_eq!(email, "dup@example.com"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.list_users().unwrap().len(), 1);
}

#[test]
fn changing_email_to_a_taken_one_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&mut User::new("Asha", "asha@example.com", "a"))
        .unwrap();
    let mut ravi = User::new("Ravi", "ravi@example.com", "b");
    repo.create_user(&mut ravi).unwrap();

    ravi.email = "asha@example.com".to_string();
    assert!(matches!(
        repo.update_user(&mut ravi),
        Err(RepoError::DuplicateEmail(_))
    ));
}

#[test]
fn find_user_by_email_is_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("Asha", "asha@example.com", "secret");
    let id = repo.create_user(&mut user).unwrap();

    let found = repo.find_user_by_email("asha@example.com").unwrap().unwrap();
    assert_eq!(found.id.as_deref(), Some(id.as_str()));
    assert!(repo.find_user_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn delete_user_cascades_to_orders_and_lines() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let orders = SqliteOrderRepository::try_new(&conn).unwrap();

    let mut user = User::new("Asha", "asha@example.com", "secret");
    let user_id = users.create_user(&mut user).unwrap();
    let menu_item_id = seed_menu_item(&conn);

    let mut order = Order::new(user_id.clone());
    order.add_order_item(OrderItem::new(menu_item_id, 10.0, 2));
    let order_id = orders.create_order(&mut order).unwrap();

    users.load_user_orders(&mut user).unwrap();
    assert_eq!(user.orders, vec![order_id.clone()]);

    users.delete_user(&user_id).unwrap();

    assert!(users.get_user(&user_id).unwrap().is_none());
    assert!(orders.get_order(&order_id).unwrap().is_none());
    assert_eq!(count_rows(&conn, "order_items"), 0);
}

#[test]
fn delete_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.delete_user("USER-0"),
        Err(RepoError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteUserRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection { .. })
    ));
}

fn seed_menu_item(conn: &Connection) -> String {
    conn.execute_batch(
        "INSERT INTO restaurants (id, name, rating, created_at)
         VALUES ('REST-seed', 'Seed Kitchen', 4.0, 1);
         INSERT INTO menu_items (id, name, restaurant_id, restaurant_name, price, rating, is_veg, created_at)
         VALUES ('ITEM-seed', 'Seed Dish', 'REST-seed', 'Seed Kitchen', 10.0, 4.0, 0, 1);",
    )
    .unwrap();
    "ITEM-seed".to_string()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
