//! Restaurant repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a restaurant cascades to its menu items and orders, and from
//!   there to every affected order line.
//! - Renaming does not touch menu item mirrors; those refresh on the next
//!   menu item write (see `CatalogService::rename_restaurant`).

use crate::model::identity::require_id;
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::model::DEFAULT_RATING;
use crate::repo::support::{ensure_connection_ready, is_primary_key_violation};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const RESTAURANT_SELECT_SQL: &str = "SELECT
    id,
    name,
    location,
    admin_email,
    rating,
    image,
    created_at
FROM restaurants";

pub trait RestaurantRepository {
    fn create_restaurant(&self, restaurant: &mut Restaurant) -> RepoResult<RestaurantId>;
    fn update_restaurant(&self, restaurant: &mut Restaurant) -> RepoResult<()>;
    fn get_restaurant(&self, id: &str) -> RepoResult<Option<Restaurant>>;
    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>>;
    fn delete_restaurant(&self, id: &str) -> RepoResult<()>;
    /// Fills `menu_items` and `orders` with the ids this restaurant owns.
    fn load_restaurant_children(&self, restaurant: &mut Restaurant) -> RepoResult<()>;
}

pub struct SqliteRestaurantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRestaurantRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["restaurants", "menu_items", "orders"])?;
        Ok(Self { conn })
    }
}

impl RestaurantRepository for SqliteRestaurantRepository<'_> {
    fn create_restaurant(&self, restaurant: &mut Restaurant) -> RepoResult<RestaurantId> {
        restaurant.validate()?;
        restaurant.prepare_for_insert();
        let id = require_id(&restaurant.id, "restaurant")?.to_string();

        self.conn
            .execute(
                "INSERT INTO restaurants (
                    id,
                    name,
                    location,
                    admin_email,
                    rating,
                    image,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.as_str(),
                    restaurant.name.as_str(),
                    restaurant.location.as_deref(),
                    restaurant.admin_email.as_deref(),
                    restaurant.rating,
                    restaurant.image.as_deref(),
                    restaurant.created_at,
                ],
            )
            .map_err(|err| {
                if is_primary_key_violation(&err, "restaurants") {
                    RepoError::DuplicateId {
                        entity: "restaurant",
                        id: id.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(id)
    }

    fn update_restaurant(&self, restaurant: &mut Restaurant) -> RepoResult<()> {
        restaurant.validate()?;
        restaurant.prepare_for_update()?;
        let id = require_id(&restaurant.id, "restaurant")?;

        let changed = self.conn.execute(
            "UPDATE restaurants
             SET
                name = ?2,
                location = ?3,
                admin_email = ?4,
                rating = ?5,
                image = ?6
             WHERE id = ?1;",
            params![
                id,
                restaurant.name.as_str(),
                restaurant.location.as_deref(),
                restaurant.admin_email.as_deref(),
                restaurant.rating,
                restaurant.image.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "restaurant",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn get_restaurant(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        load_restaurant(self.conn, id)
    }

    fn list_restaurants(&self) -> RepoResult<Vec<Restaurant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESTAURANT_SELECT_SQL} ORDER BY created_at ASC, id ASC;"
        ))?;
        let restaurants = stmt
            .query_map([], |row| Ok(parse_restaurant_row(row)))?
            .collect::<Result<Vec<_>, _>>()?;
        restaurants.into_iter().collect()
    }

    fn delete_restaurant(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM restaurants WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "restaurant",
                id: id.to_string(),
            });
        }
        debug!("event=restaurant_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn load_restaurant_children(&self, restaurant: &mut Restaurant) -> RepoResult<()> {
        let id = require_id(&restaurant.id, "restaurant")?;
        let menu_items = child_ids(self.conn, "menu_items", id)?;
        let orders = child_ids(self.conn, "orders", id)?;
        restaurant.menu_items = menu_items;
        restaurant.orders = orders;
        Ok(())
    }
}

/// Loads one restaurant by id; shared with repositories that resolve owners.
pub(crate) fn load_restaurant(conn: &Connection, id: &str) -> RepoResult<Option<Restaurant>> {
    let row = conn
        .query_row(
            &format!("{RESTAURANT_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_restaurant_row(row)),
        )
        .optional()?;
    row.transpose()
}

/// Resolves an optional owner reference, failing on a dangling id.
pub(crate) fn resolve_restaurant(
    conn: &Connection,
    reference: Option<&str>,
) -> RepoResult<Option<Restaurant>> {
    let Some(id) = reference else {
        return Ok(None);
    };
    match load_restaurant(conn, id)? {
        Some(restaurant) => Ok(Some(restaurant)),
        None => Err(RepoError::NotFound {
            entity: "restaurant",
            id: id.to_string(),
        }),
    }
}

fn child_ids(
    conn: &Connection,
    table: &'static str,
    restaurant_id: &str,
) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id
         FROM {table}
         WHERE restaurant_id = ?1
         ORDER BY created_at ASC, id ASC;"
    ))?;
    let ids = stmt
        .query_map([restaurant_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn parse_restaurant_row(row: &Row<'_>) -> RepoResult<Restaurant> {
    Ok(Restaurant {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        location: row.get("location")?,
        admin_email: row.get("admin_email")?,
        rating: row
            .get::<_, Option<f64>>("rating")?
            .unwrap_or(DEFAULT_RATING),
        image: row.get("image")?,
        created_at: row.get("created_at")?,
        menu_items: Vec::new(),
        orders: Vec::new(),
    })
}
