//! User record.
//!
//! # Invariants
//! - `email` is unique across users (enforced by storage).
//! - `password` is accepted on input but never serialized outward.
//! - `orders` is an in-memory view of owned order ids; it is not persisted
//!   and not serialized.

use crate::model::identity::{ensure_created_at, ensure_id, require_id, IdPrefix};
use crate::model::order::{Order, OrderId};
use crate::model::ModelError;
use serde::{Deserialize, Serialize};

pub type UserId = String;

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Customer,
    Admin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
    /// Unix epoch milliseconds, set once on first persistence.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(skip)]
    pub orders: Vec<OrderId>,
}

impl User {
    /// Creates an unsaved customer account.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
            user_type: UserType::Customer,
            created_at: None,
            orders: Vec::new(),
        }
    }

    /// Assigns identity and creation time if unset.
    pub fn prepare_for_insert(&mut self) {
        ensure_id(&mut self.id, IdPrefix::User);
        ensure_created_at(&mut self.created_at);
    }

    /// Users carry no mirrored fields; updates only need an identity.
    pub fn prepare_for_update(&mut self) -> Result<(), ModelError> {
        require_id(&self.id, "user").map(|_| ())
    }

    /// Links `order` to this user on both sides.
    pub fn add_order(&mut self, order: &mut Order) {
        let user_id = ensure_id(&mut self.id, IdPrefix::User).to_string();
        let order_id = ensure_id(&mut order.id, IdPrefix::Order).to_string();
        if !self.orders.contains(&order_id) {
            self.orders.push(order_id);
        }
        order.user = Some(user_id);
    }

    /// Detaches `order` from this user on both sides.
    pub fn remove_order(&mut self, order: &mut Order) {
        if let Some(order_id) = order.id.as_deref() {
            self.orders.retain(|id| id != order_id);
        }
        order.user = None;
    }
}
