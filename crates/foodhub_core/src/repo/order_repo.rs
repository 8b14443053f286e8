//! Order repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist order headers together with their owned line items.
//! - Apply orphan removal: lines dropped from `Order::order_items` are
//!   deleted on the next update.
//!
//! # Invariants
//! - Header and lines are written in one immediate transaction.
//! - `user_id`/`restaurant_id` columns are written from the owning
//!   references after mirrors are refreshed from the resolved owners.
//! - Reads return lines ordered by row id (insertion order).

use crate::model::identity::require_id;
use crate::model::order::{normalize_status, Order, OrderId, OrderItem, DEFAULT_ORDER_STATUS};
use crate::model::user::User;
use crate::repo::restaurant_repo::resolve_restaurant;
use crate::repo::support::{ensure_connection_ready, is_primary_key_violation};
use crate::repo::user_repo::load_user;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;

const ORDER_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    restaurant_id,
    total_amount,
    status,
    delivery_address,
    created_at
FROM orders";

pub trait OrderRepository {
    /// Inserts the header and every line; assigns line row ids in place.
    fn create_order(&self, order: &mut Order) -> RepoResult<OrderId>;
    /// Rewrites the header and synchronizes lines with storage.
    fn update_order(&self, order: &mut Order) -> RepoResult<()>;
    fn get_order(&self, id: &str) -> RepoResult<Option<Order>>;
    /// Newest first.
    fn list_orders(&self) -> RepoResult<Vec<Order>>;
    fn list_orders_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>>;
    fn list_orders_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Order>>;
    /// Replaces only the status label.
    fn update_order_status(&self, id: &str, status: &str) -> RepoResult<()>;
    fn delete_order(&self, id: &str) -> RepoResult<()>;
}

pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "restaurants", "orders", "order_items"])?;
        Ok(Self { conn })
    }

    fn resolve_user(&self, order: &Order) -> RepoResult<Option<User>> {
        let Some(user_id) = order.user.as_deref() else {
            return Ok(None);
        };
        match load_user(self.conn, user_id)? {
            Some(user) => Ok(Some(user)),
            None => Err(RepoError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            }),
        }
    }

    fn query_orders(&self, sql: &str, owner_id: Option<&str>) -> RepoResult<Vec<Order>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match owner_id {
            Some(owner_id) => stmt.query([owner_id])?,
            None => stmt.query([])?,
        };
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            let mut order = parse_order_row(row)?;
            order.order_items = load_order_items(self.conn, require_id(&order.id, "order")?)?;
            orders.push(order);
        }
        Ok(orders)
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &mut Order) -> RepoResult<OrderId> {
        order.validate()?;
        let user = self.resolve_user(order)?;
        let restaurant = resolve_restaurant(self.conn, order.restaurant.as_deref())?;
        order.prepare_for_insert(user.as_ref(), restaurant.as_ref())?;
        let id = require_id(&order.id, "order")?.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO orders (
                id,
                user_id,
                restaurant_id,
                total_amount,
                status,
                delivery_address,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.as_str(),
                order.user.as_deref(),
                order.restaurant.as_deref(),
                order.total_amount,
                order.status.as_str(),
                order.delivery_address.as_deref(),
                order.created_at,
            ],
        )
        .map_err(|err| {
            if is_primary_key_violation(&err, "orders") {
                RepoError::DuplicateId {
                    entity: "order",
                    id: id.clone(),
                }
            } else {
                err.into()
            }
        })?;

        for item in &mut order.order_items {
            insert_order_item(&tx, &id, item)?;
        }
        tx.commit()?;

        Ok(id)
    }

    fn update_order(&self, order: &mut Order) -> RepoResult<()> {
        order.validate()?;
        let user = self.resolve_user(order)?;
        let restaurant = resolve_restaurant(self.conn, order.restaurant.as_deref())?;
        order.prepare_for_update(user.as_ref(), restaurant.as_ref())?;
        let id = require_id(&order.id, "order")?.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE orders
             SET
                user_id = ?2,
                restaurant_id = ?3,
                total_amount = ?4,
                status = ?5,
                delivery_address = ?6
             WHERE id = ?1;",
            params![
                id.as_str(),
                order.user.as_deref(),
                order.restaurant.as_deref(),
                order.total_amount,
                order.status.as_str(),
                order.delivery_address.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "order",
                id,
            });
        }

        let persisted: HashSet<i64> = order_item_ids(&tx, &id)?.into_iter().collect();
        let kept: HashSet<i64> = order
            .order_items
            .iter()
            .filter_map(|item| item.id)
            .filter(|item_id| persisted.contains(item_id))
            .collect();
        let mut removed = 0_usize;
        for existing in persisted.difference(&kept) {
            tx.execute("DELETE FROM order_items WHERE id = ?1;", [existing])?;
            removed += 1;
        }

        // Lines whose row id belongs to another order are inserted as new rows.
        for item in &mut order.order_items {
            match item.id {
                Some(item_id) if kept.contains(&item_id) => {
                    tx.execute(
                        "UPDATE order_items
                         SET
                            menu_item_id = ?3,
                            price = ?4,
                            quantity = ?5
                         WHERE id = ?1 AND order_id = ?2;",
                        params![
                            item_id,
                            id.as_str(),
                            item.menu_item_id.as_str(),
                            item.price,
                            item.quantity,
                        ],
                    )?;
                }
                _ => insert_order_item(&tx, &id, item)?,
            }
        }
        tx.commit()?;

        if removed > 0 {
            debug!(
                "event=order_items_orphan_remove module=repo status=ok order_id={id} removed={removed}"
            );
        }
        Ok(())
    }

    fn get_order(&self, id: &str) -> RepoResult<Option<Order>> {
        let row = self
            .conn
            .query_row(
                &format!("{ORDER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_order_row(row)),
            )
            .optional()?;
        let Some(mut order) = row.transpose()? else {
            return Ok(None);
        };
        order.order_items = load_order_items(self.conn, id)?;
        Ok(Some(order))
    }

    fn list_orders(&self) -> RepoResult<Vec<Order>> {
        self.query_orders(
            &format!("{ORDER_SELECT_SQL} ORDER BY created_at DESC, id DESC;"),
            None,
        )
    }

    fn list_orders_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "{ORDER_SELECT_SQL}
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC;"
            ),
            Some(user_id),
        )
    }

    fn list_orders_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "{ORDER_SELECT_SQL}
                 WHERE restaurant_id = ?1
                 ORDER BY created_at DESC, id DESC;"
            ),
            Some(restaurant_id),
        )
    }

    fn update_order_status(&self, id: &str, status: &str) -> RepoResult<()> {
        let status = normalize_status(status)?;
        let changed = self.conn.execute(
            "UPDATE orders SET status = ?2 WHERE id = ?1;",
            params![id, status],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "order",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn delete_order(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM orders WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "order",
                id: id.to_string(),
            });
        }
        debug!("event=order_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn insert_order_item(
    tx: &Transaction<'_>,
    order_id: &str,
    item: &mut OrderItem,
) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO order_items (
            order_id,
            menu_item_id,
            price,
            quantity
        ) VALUES (?1, ?2, ?3, ?4);",
        params![order_id, item.menu_item_id.as_str(), item.price, item.quantity],
    )?;
    item.id = Some(tx.last_insert_rowid());
    item.order_id = Some(order_id.to_string());
    Ok(())
}

fn order_item_ids(tx: &Transaction<'_>, order_id: &str) -> RepoResult<Vec<i64>> {
    let mut stmt = tx.prepare("SELECT id FROM order_items WHERE order_id = ?1;")?;
    let ids = stmt
        .query_map([order_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn load_order_items(conn: &Connection, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT
            id,
            order_id,
            menu_item_id,
            price,
            quantity
         FROM order_items
         WHERE order_id = ?1
         ORDER BY id ASC;",
    )?;
    let items = stmt
        .query_map([order_id], |row| {
            Ok(OrderItem {
                id: Some(row.get("id")?),
                order_id: Some(row.get("order_id")?),
                menu_item_id: row.get("menu_item_id")?,
                price: row.get("price")?,
                quantity: row.get("quantity")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<Order> {
    let user_id: String = row.get("user_id")?;
    let restaurant_id: Option<String> = row.get("restaurant_id")?;

    Ok(Order {
        id: Some(row.get("id")?),
        user: Some(user_id.clone()),
        user_id: Some(user_id),
        restaurant: restaurant_id.clone(),
        restaurant_id,
        total_amount: row.get("total_amount")?,
        status: row
            .get::<_, Option<String>>("status")?
            .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string()),
        delivery_address: row.get("delivery_address")?,
        created_at: row.get("created_at")?,
        order_items: Vec::new(),
    })
}
