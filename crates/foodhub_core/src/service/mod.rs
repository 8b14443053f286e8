//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Orchestrate multi-record flows (linking, pricing, mirror refresh).
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository prepare/validate steps.
//! - Services stay storage-agnostic; they only see repository traits.

use crate::model::menu_item::MenuItemId;
use crate::model::order::OrderId;
use crate::model::restaurant::RestaurantId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog_service;
pub mod order_service;

/// Errors from service-level operations.
#[derive(Debug)]
pub enum ServiceError {
    RestaurantNotFound(RestaurantId),
    MenuItemNotFound(MenuItemId),
    OrderNotFound(OrderId),
    /// An order must carry at least one line.
    EmptyOrder,
    /// A line names a menu item owned by another restaurant than the order's.
    MenuItemNotInRestaurant {
        menu_item_id: MenuItemId,
        restaurant_id: RestaurantId,
    },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RestaurantNotFound(id) => write!(f, "restaurant not found: {id}"),
            Self::MenuItemNotFound(id) => write!(f, "menu item not found: {id}"),
            Self::OrderNotFound(id) => write!(f, "order not found: {id}"),
            Self::EmptyOrder => write!(f, "order must contain at least one item"),
            Self::MenuItemNotInRestaurant {
                menu_item_id,
                restaurant_id,
            } => write!(
                f,
                "menu item {menu_item_id} is not on the menu of restaurant {restaurant_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "restaurant",
                id,
            } => Self::RestaurantNotFound(id),
            RepoError::NotFound {
                entity: "menu item",
                id,
            } => Self::MenuItemNotFound(id),
            RepoError::NotFound {
                entity: "order",
                id,
            } => Self::OrderNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
