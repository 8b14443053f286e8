//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - One use-case oriented repository per record family.
//! - Run record prepare steps right before each insert/update.
//! - Translate storage constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths call `validate()` and the matching `prepare_for_*` step
//!   before SQL mutations.
//! - Owner references are resolved through the store; a dangling
//!   reference is reported as `NotFound`, never written.
//! - Read paths reject invalid persisted values instead of masking them.

mod error;
pub mod menu_item_repo;
pub mod order_repo;
pub mod restaurant_repo;
mod support;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
