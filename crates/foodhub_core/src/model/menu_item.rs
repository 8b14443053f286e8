//! Menu item record.
//!
//! # Invariants
//! - After any prepare step with an owner, `restaurant_id` and
//!   `restaurant_name` equal that owner's current id and name.
//! - `restaurant` is the owning reference; it is written as the
//!   `restaurant_id` column and never serialized.

use crate::model::identity::{ensure_created_at, ensure_id, require_id, IdPrefix};
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::model::{
    default_rating, ensure_finite, ensure_owner_matches, ModelError, DEFAULT_RATING,
};
use serde::{Deserialize, Serialize};

pub type MenuItemId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default)]
    pub id: Option<MenuItemId>,
    pub name: String,
    #[serde(skip)]
    pub restaurant: Option<RestaurantId>,
    /// Mirror of the owner's id.
    #[serde(default)]
    pub restaurant_id: Option<RestaurantId>,
    /// Mirror of the owner's name.
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_veg: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl MenuItem {
    /// Creates an unsaved item with no owner.
    ///
    /// Link it with `Restaurant::add_menu_item` before persisting.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            restaurant: None,
            restaurant_id: None,
            restaurant_name: None,
            category: None,
            price,
            rating: DEFAULT_RATING,
            image: None,
            is_veg: false,
            description: None,
            created_at: None,
        }
    }

    /// Assigns identity/creation time and refreshes owner mirrors.
    ///
    /// # Errors
    /// - `OwnerMismatch` when `owner` is not the referenced restaurant.
    pub fn prepare_for_insert(&mut self, owner: Option<&Restaurant>) -> Result<(), ModelError> {
        ensure_id(&mut self.id, IdPrefix::MenuItem);
        ensure_created_at(&mut self.created_at);
        self.refresh_restaurant_mirror(owner)
    }

    /// Refreshes owner mirrors so a reassigned or renamed owner is reflected.
    pub fn prepare_for_update(&mut self, owner: Option<&Restaurant>) -> Result<(), ModelError> {
        require_id(&self.id, "menu item")?;
        self.refresh_restaurant_mirror(owner)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.restaurant.is_none() {
            return Err(ModelError::MissingOwner {
                entity: "menu item",
                owner: "restaurant",
            });
        }
        ensure_finite("menu_item.price", self.price)?;
        ensure_finite("menu_item.rating", self.rating)
    }

    fn refresh_restaurant_mirror(&mut self, owner: Option<&Restaurant>) -> Result<(), ModelError> {
        let Some(owner) = owner else {
            return Ok(());
        };
        ensure_owner_matches(
            "menu item",
            self.restaurant.as_deref(),
            owner.id.as_deref(),
        )?;
        self.restaurant_id = owner.id.clone();
        self.restaurant_name = Some(owner.name.clone());
        Ok(())
    }
}
