//! Restaurant record and its owned collections.
//!
//! # Invariants
//! - Removing a restaurant removes its menu items and orders (storage
//!   cascade).
//! - `menu_items` and `orders` are in-memory id views filled by the
//!   repository on demand; neither is persisted nor serialized.

use crate::model::identity::{ensure_created_at, ensure_id, require_id, IdPrefix};
use crate::model::menu_item::{MenuItem, MenuItemId};
use crate::model::order::{Order, OrderId};
use crate::model::{default_rating, ensure_finite, ModelError, DEFAULT_RATING};
use serde::{Deserialize, Serialize};

pub type RestaurantId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(default)]
    pub id: Option<RestaurantId>,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(skip)]
    pub menu_items: Vec<MenuItemId>,
    #[serde(skip)]
    pub orders: Vec<OrderId>,
}

impl Restaurant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: None,
            admin_email: None,
            rating: DEFAULT_RATING,
            image: None,
            created_at: None,
            menu_items: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub fn prepare_for_insert(&mut self) {
        ensure_id(&mut self.id, IdPrefix::Restaurant);
        ensure_created_at(&mut self.created_at);
    }

    pub fn prepare_for_update(&mut self) -> Result<(), ModelError> {
        require_id(&self.id, "restaurant").map(|_| ())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        ensure_finite("restaurant.rating", self.rating)
    }

    /// Links `item` to this restaurant on both sides.
    ///
    /// The item's mirrored `restaurant_id`/`restaurant_name` are refreshed by
    /// the next prepare step, not here.
    pub fn add_menu_item(&mut self, item: &mut MenuItem) {
        let restaurant_id = ensure_id(&mut self.id, IdPrefix::Restaurant).to_string();
        let item_id = ensure_id(&mut item.id, IdPrefix::MenuItem).to_string();
        if !self.menu_items.contains(&item_id) {
            self.menu_items.push(item_id);
        }
        item.restaurant = Some(restaurant_id);
    }

    pub fn remove_menu_item(&mut self, item: &mut MenuItem) {
        if let Some(item_id) = item.id.as_deref() {
            self.menu_items.retain(|id| id != item_id);
        }
        item.restaurant = None;
    }

    pub fn add_order(&mut self, order: &mut Order) {
        let restaurant_id = ensure_id(&mut self.id, IdPrefix::Restaurant).to_string();
        let order_id = ensure_id(&mut order.id, IdPrefix::Order).to_string();
        if !self.orders.contains(&order_id) {
            self.orders.push(order_id);
        }
        order.restaurant = Some(restaurant_id);
    }

    pub fn remove_order(&mut self, order: &mut Order) {
        if let Some(order_id) = order.id.as_deref() {
            self.orders.retain(|id| id != order_id);
        }
        order.restaurant = None;
    }
}
