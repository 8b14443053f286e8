//! Core persistence model for FoodHub ordering.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, FoodhubConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::identity::{configure_id_scheme, IdPrefix, IdScheme, IdSchemeError};
pub use model::menu_item::{MenuItem, MenuItemId};
pub use model::order::{Order, OrderId, OrderItem, DEFAULT_ORDER_STATUS};
pub use model::restaurant::{Restaurant, RestaurantId};
pub use model::user::{User, UserId, UserType};
pub use model::{ModelError, DEFAULT_RATING};
pub use repo::menu_item_repo::{MenuItemRepository, SqliteMenuItemRepository};
pub use repo::order_repo::{OrderRepository, SqliteOrderRepository};
pub use repo::restaurant_repo::{RestaurantRepository, SqliteRestaurantRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::CatalogService;
pub use service::order_service::{OrderLine, OrderService, PlaceOrderRequest};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
