//! Menu item repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every write resolves the owning restaurant first and refreshes the
//!   `restaurant_id`/`restaurant_name` mirrors from it.
//! - The `restaurant_id` column is written from the owning reference.
//! - Deleting a menu item cascades to the order lines that reference it.

use crate::model::identity::require_id;
use crate::model::menu_item::{MenuItem, MenuItemId};
use crate::model::DEFAULT_RATING;
use crate::repo::restaurant_repo::resolve_restaurant;
use crate::repo::support::{
    bool_to_int, ensure_connection_ready, int_to_bool, is_primary_key_violation,
};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const MENU_ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    restaurant_id,
    restaurant_name,
    category,
    price,
    rating,
    image,
    is_veg,
    description,
    created_at
FROM menu_items";

pub trait MenuItemRepository {
    fn create_menu_item(&self, item: &mut MenuItem) -> RepoResult<MenuItemId>;
    fn update_menu_item(&self, item: &mut MenuItem) -> RepoResult<()>;
    fn get_menu_item(&self, id: &str) -> RepoResult<Option<MenuItem>>;
    fn list_menu_items(&self) -> RepoResult<Vec<MenuItem>>;
    fn list_menu_items_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<MenuItem>>;
    fn delete_menu_item(&self, id: &str) -> RepoResult<()>;
}

pub struct SqliteMenuItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMenuItemRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["restaurants", "menu_items", "order_items"])?;
        Ok(Self { conn })
    }

    fn query_items(&self, sql: &str, restaurant_id: Option<&str>) -> RepoResult<Vec<MenuItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match restaurant_id {
            Some(restaurant_id) => stmt.query([restaurant_id])?,
            None => stmt.query([])?,
        };
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_menu_item_row(row)?);
        }
        Ok(items)
    }
}

impl MenuItemRepository for SqliteMenuItemRepository<'_> {
    fn create_menu_item(&self, item: &mut MenuItem) -> RepoResult<MenuItemId> {
        item.validate()?;
        let owner = resolve_restaurant(self.conn, item.restaurant.as_deref())?;
        item.prepare_for_insert(owner.as_ref())?;
        let id = require_id(&item.id, "menu item")?.to_string();

        self.conn
            .execute(
                "INSERT INTO menu_items (
                    id,
                    name,
                    restaurant_id,
                    restaurant_name,
                    category,
                    price,
                    rating,
                    image,
                    is_veg,
                    description,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    id.as_str(),
                    item.name.as_str(),
                    item.restaurant.as_deref(),
                    item.restaurant_name.as_deref(),
                    item.category.as_deref(),
                    item.price,
                    item.rating,
                    item.image.as_deref(),
                    bool_to_int(item.is_veg),
                    item.description.as_deref(),
                    item.created_at,
                ],
            )
            .map_err(|err| {
                if is_primary_key_violation(&err, "menu_items") {
                    RepoError::DuplicateId {
                        entity: "menu item",
                        id: id.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(id)
    }

    fn update_menu_item(&self, item: &mut MenuItem) -> RepoResult<()> {
        item.validate()?;
        let owner = resolve_restaurant(self.conn, item.restaurant.as_deref())?;
        item.prepare_for_update(owner.as_ref())?;
        let id = require_id(&item.id, "menu item")?;

        let changed = self.conn.execute(
            "UPDATE menu_items
             SET
                name = ?2,
                restaurant_id = ?3,
                restaurant_name = ?4,
                category = ?5,
                price = ?6,
                rating = ?7,
                image = ?8,
                is_veg = ?9,
                description = ?10
             WHERE id = ?1;",
            params![
                id,
                item.name.as_str(),
                item.restaurant.as_deref(),
                item.restaurant_name.as_deref(),
                item.category.as_deref(),
                item.price,
                item.rating,
                item.image.as_deref(),
                bool_to_int(item.is_veg),
                item.description.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "menu item",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn get_menu_item(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let row = self
            .conn
            .query_row(
                &format!("{MENU_ITEM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_menu_item_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_menu_items(&self) -> RepoResult<Vec<MenuItem>> {
        self.query_items(
            &format!("{MENU_ITEM_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            None,
        )
    }

    fn list_menu_items_by_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<MenuItem>> {
        self.query_items(
            &format!(
                "{MENU_ITEM_SELECT_SQL}
                 WHERE restaurant_id = ?1
                 ORDER BY created_at ASC, id ASC;"
            ),
            Some(restaurant_id),
        )
    }

    fn delete_menu_item(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM menu_items WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "menu item",
                id: id.to_string(),
            });
        }
        debug!("event=menu_item_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn parse_menu_item_row(row: &Row<'_>) -> RepoResult<MenuItem> {
    let restaurant_id: String = row.get("restaurant_id")?;
    let is_veg = match row.get::<_, Option<i64>>("is_veg")? {
        Some(value) => int_to_bool(value, "menu_items.is_veg")?,
        None => false,
    };

    Ok(MenuItem {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        restaurant: Some(restaurant_id.clone()),
        restaurant_id: Some(restaurant_id),
        restaurant_name: row.get("restaurant_name")?,
        category: row.get("category")?,
        price: row.get("price")?,
        rating: row
            .get::<_, Option<f64>>("rating")?
            .unwrap_or(DEFAULT_RATING),
        image: row.get("image")?,
        is_veg,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}
