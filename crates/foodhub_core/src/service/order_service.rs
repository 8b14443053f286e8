//! Order placement and tracking service.
//!
//! # Responsibility
//! - Price order lines from the current menu and persist the order.
//! - Expose status updates and per-user order history.
//!
//! # Invariants
//! - Line prices are captured from the menu item at placement time.
//! - When the order names a restaurant, every line comes from its menu.
//! - `total_amount` is assigned from `calculate_total_amount()` right
//!   before insert; later menu price changes do not touch placed orders.

use crate::model::menu_item::MenuItemId;
use crate::model::order::{Order, OrderItem};
use crate::model::restaurant::RestaurantId;
use crate::model::user::UserId;
use crate::repo::menu_item_repo::MenuItemRepository;
use crate::repo::order_repo::OrderRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// One requested menu item and its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

/// Request model for placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub restaurant_id: Option<RestaurantId>,
    pub lines: Vec<OrderLine>,
    pub delivery_address: Option<String>,
}

pub struct OrderService<O: OrderRepository, M: MenuItemRepository> {
    orders: O,
    menu_items: M,
}

impl<O: OrderRepository, M: MenuItemRepository> OrderService<O, M> {
    pub fn new(orders: O, menu_items: M) -> Self {
        Self { orders, menu_items }
    }

    /// Builds, prices and inserts an order.
    ///
    /// # Errors
    /// - `EmptyOrder` when `request.lines` is empty.
    /// - `MenuItemNotFound` when a line names an unknown menu item.
    /// - `MenuItemNotInRestaurant` when a line's item belongs to another
    ///   restaurant than `request.restaurant_id`.
    /// - `Repo(NotFound { entity: "user", .. })` for an unknown user.
    pub fn place_order(&self, request: &PlaceOrderRequest) -> ServiceResult<Order> {
        if request.lines.is_empty() {
            return Err(ServiceError::EmptyOrder);
        }

        let mut order = Order::new(request.user_id.clone());
        order.restaurant = request.restaurant_id.clone();
        order.delivery_address = request.delivery_address.clone();

        for line in &request.lines {
            let item = self
                .menu_items
                .get_menu_item(&line.menu_item_id)?
                .ok_or_else(|| ServiceError::MenuItemNotFound(line.menu_item_id.clone()))?;
            if let Some(restaurant_id) = request.restaurant_id.as_deref() {
                if item.restaurant.as_deref() != Some(restaurant_id) {
                    return Err(ServiceError::MenuItemNotInRestaurant {
                        menu_item_id: line.menu_item_id.clone(),
                        restaurant_id: restaurant_id.to_string(),
                    });
                }
            }
            order.add_order_item(OrderItem::new(
                line.menu_item_id.clone(),
                item.price,
                line.quantity,
            ));
        }
        order.total_amount = order.calculate_total_amount();

        let order_id = self.orders.create_order(&mut order)?;
        info!(
            "event=order_place module=service status=ok order_id={order_id} user_id={} lines={} total_amount={:.2}",
            request.user_id,
            order.order_items.len(),
            order.total_amount
        );
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> ServiceResult<Option<Order>> {
        Ok(self.orders.get_order(order_id)?)
    }

    /// Sets a new status label; any non-blank label is accepted.
    pub fn update_order_status(&self, order_id: &str, status: &str) -> ServiceResult<Order> {
        self.orders.update_order_status(order_id, status)?;
        let order = self
            .orders
            .get_order(order_id)?
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))?;

        info!(
            "event=order_status_update module=service status=ok order_id={order_id} order_status={}",
            order.status
        );
        Ok(order)
    }

    pub fn orders_for_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_orders_by_user(user_id)?)
    }

    pub fn orders_for_restaurant(&self, restaurant_id: &str) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_orders_by_restaurant(restaurant_id)?)
    }

    pub fn all_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_orders()?)
    }

    pub fn delete_order(&self, order_id: &str) -> ServiceResult<()> {
        Ok(self.orders.delete_order(order_id)?)
    }
}
