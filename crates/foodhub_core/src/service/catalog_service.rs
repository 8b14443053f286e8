//! Restaurant and menu use-case service.
//!
//! # Invariants
//! - Menu items are always linked through `Restaurant::add_menu_item`
//!   before they are inserted.
//! - A restaurant rename re-saves every owned menu item so their
//!   `restaurant_name` mirrors follow.

use crate::model::menu_item::{MenuItem, MenuItemId};
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::menu_item_repo::MenuItemRepository;
use crate::repo::restaurant_repo::RestaurantRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct CatalogService<R: RestaurantRepository, M: MenuItemRepository> {
    restaurants: R,
    menu_items: M,
}

impl<R: RestaurantRepository, M: MenuItemRepository> CatalogService<R, M> {
    pub fn new(restaurants: R, menu_items: M) -> Self {
        Self {
            restaurants,
            menu_items,
        }
    }

    pub fn create_restaurant(&self, restaurant: &mut Restaurant) -> ServiceResult<RestaurantId> {
        Ok(self.restaurants.create_restaurant(restaurant)?)
    }

    pub fn get_restaurant(&self, restaurant_id: &str) -> ServiceResult<Option<Restaurant>> {
        Ok(self.restaurants.get_restaurant(restaurant_id)?)
    }

    pub fn list_restaurants(&self) -> ServiceResult<Vec<Restaurant>> {
        Ok(self.restaurants.list_restaurants()?)
    }

    /// Links `item` to the restaurant and inserts it.
    ///
    /// On success `item` carries its id and refreshed owner mirrors.
    pub fn add_menu_item(
        &self,
        restaurant_id: &str,
        item: &mut MenuItem,
    ) -> ServiceResult<MenuItemId> {
        let mut restaurant = self.require_restaurant(restaurant_id)?;
        restaurant.add_menu_item(item);
        let item_id = self.menu_items.create_menu_item(item)?;

        info!(
            "event=menu_item_add module=service status=ok restaurant_id={restaurant_id} menu_item_id={item_id}"
        );
        Ok(item_id)
    }

    /// Moves a menu item to another restaurant.
    pub fn move_menu_item(
        &self,
        item_id: &str,
        target_restaurant_id: &str,
    ) -> ServiceResult<MenuItem> {
        let mut item = self
            .menu_items
            .get_menu_item(item_id)?
            .ok_or_else(|| ServiceError::MenuItemNotFound(item_id.to_string()))?;
        let mut target = self.require_restaurant(target_restaurant_id)?;

        if let Some(current_id) = item.restaurant.clone() {
            if let Some(mut current) = self.restaurants.get_restaurant(&current_id)? {
                current.remove_menu_item(&mut item);
            }
        }
        target.add_menu_item(&mut item);
        self.menu_items.update_menu_item(&mut item)?;
        Ok(item)
    }

    /// Renames a restaurant and refreshes the name mirror on its menu.
    pub fn rename_restaurant(
        &self,
        restaurant_id: &str,
        name: impl Into<String>,
    ) -> ServiceResult<Restaurant> {
        let mut restaurant = self.require_restaurant(restaurant_id)?;
        restaurant.name = name.into();
        self.restaurants.update_restaurant(&mut restaurant)?;

        let mut refreshed = 0_usize;
        for mut item in self.menu_items.list_menu_items_by_restaurant(restaurant_id)? {
            self.menu_items.update_menu_item(&mut item)?;
            refreshed += 1;
        }

        info!(
            "event=restaurant_rename module=service status=ok restaurant_id={restaurant_id} menu_items_refreshed={refreshed}"
        );
        Ok(restaurant)
    }

    pub fn menu_for_restaurant(&self, restaurant_id: &str) -> ServiceResult<Vec<MenuItem>> {
        self.require_restaurant(restaurant_id)?;
        Ok(self.menu_items.list_menu_items_by_restaurant(restaurant_id)?)
    }

    /// Deletes a restaurant together with its menu and orders.
    pub fn remove_restaurant(&self, restaurant_id: &str) -> ServiceResult<()> {
        self.restaurants.delete_restaurant(restaurant_id)?;
        info!("event=restaurant_remove module=service status=ok restaurant_id={restaurant_id}");
        Ok(())
    }

    pub fn remove_menu_item(&self, item_id: &str) -> ServiceResult<()> {
        Ok(self.menu_items.delete_menu_item(item_id)?)
    }

    fn require_restaurant(&self, restaurant_id: &str) -> ServiceResult<Restaurant> {
        self.restaurants
            .get_restaurant(restaurant_id)?
            .ok_or_else(|| ServiceError::RestaurantNotFound(restaurant_id.to_string()))
    }
}
