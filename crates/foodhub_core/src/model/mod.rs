//! Persisted record shapes for the ordering domain.
//!
//! # Responsibility
//! - Define users, restaurants, menu items, orders and order lines.
//! - Own the pre-write preparation step (identity, timestamps, mirrors).
//! - Keep parent/child links consistent through explicit helpers.
//!
//! # Invariants
//! - Relations are identifier-valued; no record holds a live pointer to
//!   another record.
//! - Ownership is a tree: every child has exactly one owner per relation.
//! - Mirrored owner fields are recomputed before every write, never
//!   maintained incrementally.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod identity;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod user;

/// Default rating for restaurants and menu items without reviews.
pub const DEFAULT_RATING: f64 = 4.0;

/// Record-level validation failures raised before any SQL is issued.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Update or relation step needs a record that already has an id.
    MissingId { entity: &'static str },
    /// Required owning reference is not set.
    MissingOwner {
        entity: &'static str,
        owner: &'static str,
    },
    /// Owner passed to a prepare step is not the one the record references.
    OwnerMismatch {
        entity: &'static str,
        expected: Option<String>,
        actual: Option<String>,
    },
    /// Monetary or rating value is NaN or infinite.
    NonFinite { field: &'static str, value: f64 },
    /// Order status is empty after trimming.
    BlankStatus,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId { entity } => write!(f, "{entity} has no id yet"),
            Self::MissingOwner { entity, owner } => {
                write!(f, "{entity} must reference a {owner}")
            }
            Self::OwnerMismatch {
                entity,
                expected,
                actual,
            } => write!(
                f,
                "{entity} references owner {expected:?}, prepare step received {actual:?}"
            ),
            Self::NonFinite { field, value } => {
                write!(f, "{field} must be a finite number, got {value}")
            }
            Self::BlankStatus => write!(f, "order status must not be blank"),
        }
    }
}

impl Error for ModelError {}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::NonFinite { field, value })
    }
}

pub(crate) fn ensure_owner_matches(
    entity: &'static str,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Result<(), ModelError> {
    if expected == actual {
        return Ok(());
    }
    Err(ModelError::OwnerMismatch {
        entity,
        expected: expected.map(str::to_string),
        actual: actual.map(str::to_string),
    })
}

pub(crate) fn default_rating() -> f64 {
    DEFAULT_RATING
}
