//! Order record and its line items.
//!
//! # Responsibility
//! - Hold the order header plus the owned, ordered line sequence.
//! - Compute the line total on demand.
//!
//! # Invariants
//! - After any prepare step, `user_id` equals the referenced user's id and
//!   `restaurant_id` follows the restaurant reference (cleared when unset).
//! - Every owned `OrderItem` carries this order's id after a prepare step.
//! - `total_amount` is never recomputed implicitly; callers assign
//!   `calculate_total_amount()` explicitly when they want it persisted.
//! - `status` is an opaque label; no transition rules apply.

use crate::model::identity::{ensure_created_at, ensure_id, require_id, IdPrefix};
use crate::model::menu_item::MenuItemId;
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::model::user::{User, UserId};
use crate::model::{ensure_finite, ensure_owner_matches, ModelError};
use serde::{Deserialize, Serialize};

pub type OrderId = String;

/// Status assigned to freshly placed orders.
pub const DEFAULT_ORDER_STATUS: &str = "New";

/// Status labels used by the existing admin views. Informational only.
pub mod status {
    pub const NEW: &str = "New";
    pub const PREPARING: &str = "Preparing";
    pub const ON_THE_WAY: &str = "On the Way";
    pub const DELIVERED: &str = "Delivered";
    pub const DENIED: &str = "Denied";
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Storage-assigned row id; `None` until first persisted.
    #[serde(default)]
    pub id: Option<i64>,
    /// Back-reference to the owning order.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub menu_item_id: MenuItemId,
    /// Unit price captured when the line was created.
    pub price: f64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(menu_item_id: impl Into<MenuItemId>, price: f64, quantity: u32) -> Self {
        Self {
            id: None,
            order_id: None,
            menu_item_id: menu_item_id.into(),
            price,
            quantity,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(skip)]
    pub user: Option<UserId>,
    /// Mirror of the owning user's id.
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(skip)]
    pub restaurant: Option<RestaurantId>,
    /// Mirror of the referenced restaurant's id.
    #[serde(default)]
    pub restaurant_id: Option<RestaurantId>,
    pub total_amount: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Creates an unsaved order owned by `user` with no lines.
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            id: None,
            user: Some(user.into()),
            user_id: None,
            restaurant: None,
            restaurant_id: None,
            total_amount: 0.0,
            status: DEFAULT_ORDER_STATUS.to_string(),
            delivery_address: None,
            created_at: None,
            order_items: Vec::new(),
        }
    }

    /// Assigns identity/creation time, refreshes mirrors and stamps lines.
    ///
    /// `user` and `restaurant` are the records the order currently
    /// references, as resolved by the caller.
    pub fn prepare_for_insert(
        &mut self,
        user: Option<&User>,
        restaurant: Option<&Restaurant>,
    ) -> Result<(), ModelError> {
        ensure_id(&mut self.id, IdPrefix::Order);
        ensure_created_at(&mut self.created_at);
        self.refresh_owner_mirrors(user, restaurant)?;
        self.stamp_order_items();
        Ok(())
    }

    pub fn prepare_for_update(
        &mut self,
        user: Option<&User>,
        restaurant: Option<&Restaurant>,
    ) -> Result<(), ModelError> {
        require_id(&self.id, "order")?;
        self.refresh_owner_mirrors(user, restaurant)?;
        self.stamp_order_items();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.user.is_none() {
            return Err(ModelError::MissingOwner {
                entity: "order",
                owner: "user",
            });
        }
        ensure_finite("order.total_amount", self.total_amount)?;
        for item in &self.order_items {
            ensure_finite("order_item.price", item.price)?;
        }
        Ok(())
    }

    /// Appends `item` as a new line and points its back-reference at this order.
    ///
    /// Any row id carried over from another order is dropped; the line gets
    /// its own row on the next save.
    pub fn add_order_item(&mut self, mut item: OrderItem) {
        let order_id = ensure_id(&mut self.id, IdPrefix::Order).to_string();
        item.id = None;
        item.order_id = Some(order_id);
        self.order_items.push(item);
    }

    /// Removes the first line equal to `item` and returns it detached.
    ///
    /// The removed line is deleted from storage on the next order update.
    pub fn remove_order_item(&mut self, item: &OrderItem) -> Option<OrderItem> {
        let index = self.order_items.iter().position(|line| line == item)?;
        let mut removed = self.order_items.remove(index);
        removed.order_id = None;
        Some(removed)
    }

    /// Sum of `price * quantity` over the current lines.
    ///
    /// Pure query; `total_amount` is left untouched.
    pub fn calculate_total_amount(&self) -> f64 {
        self.order_items.iter().map(OrderItem::line_total).sum()
    }

    fn refresh_owner_mirrors(
        &mut self,
        user: Option<&User>,
        restaurant: Option<&Restaurant>,
    ) -> Result<(), ModelError> {
        if let Some(user) = user {
            ensure_owner_matches("order", self.user.as_deref(), user.id.as_deref())?;
            self.user_id = user.id.clone();
        }

        match restaurant {
            Some(restaurant) => {
                ensure_owner_matches(
                    "order",
                    self.restaurant.as_deref(),
                    restaurant.id.as_deref(),
                )?;
                self.restaurant_id = restaurant.id.clone();
            }
            None if self.restaurant.is_none() => self.restaurant_id = None,
            None => {}
        }
        Ok(())
    }

    fn stamp_order_items(&mut self) {
        for item in &mut self.order_items {
            item.order_id = self.id.clone();
        }
    }
}

/// Trims a status label and rejects blank input.
pub fn normalize_status(status: &str) -> Result<String, ModelError> {
    let trimmed = status.trim();
    if trimmed.is_empty() {
        return Err(ModelError::BlankStatus);
    }
    Ok(trimmed.to_string())
}

fn default_status() -> String {
    DEFAULT_ORDER_STATUS.to_string()
}
