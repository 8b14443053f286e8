//! Identifier and creation-timestamp assignment.
//!
//! # Responsibility
//! - Issue prefixed record identifiers (`USER-`, `REST-`, `ITEM-`, `ORD-`).
//! - Fill unset identity slots exactly once.
//!
//! # Invariants
//! - An identifier or `created_at` that is already set is never overwritten.
//! - With `IdScheme::Millis`, identifier bodies issued by one process are
//!   strictly increasing, so two records never share a body in-process.
//! - The scheme is fixed once configured; reconfiguration is rejected.

use crate::model::ModelError;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static ID_SCHEME: OnceCell<IdScheme> = OnceCell::new();
static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Body format used after the `<PREFIX>-` part of an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdScheme {
    /// Epoch milliseconds, bumped past the last issued value when needed.
    /// Keeps the legacy `PREFIX-1712345678901` shape.
    #[default]
    Millis,
    /// Simple-format UUIDv4. Collision resistant across processes.
    Uuid,
}

impl IdScheme {
    /// Parses `millis` or `uuid` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "millis" => Some(Self::Millis),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Millis => "millis",
            Self::Uuid => "uuid",
        }
    }
}

impl Display for IdScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record family an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    User,
    Restaurant,
    MenuItem,
    Order,
}

impl IdPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Restaurant => "REST",
            Self::MenuItem => "ITEM",
            Self::Order => "ORD",
        }
    }
}

/// Rejected attempt to switch the identifier scheme after it was fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSchemeError {
    pub active: IdScheme,
    pub requested: IdScheme,
}

impl Display for IdSchemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id scheme already fixed to `{}`; refusing to switch to `{}`",
            self.active, self.requested
        )
    }
}

impl Error for IdSchemeError {}

/// Fixes the identifier scheme for this process.
///
/// Calling again with the same scheme is a no-op.
///
/// # Errors
/// - Returns `IdSchemeError` when a different scheme is already active, or
///   when an identifier was already issued under the implicit default.
pub fn configure_id_scheme(scheme: IdScheme) -> Result<(), IdSchemeError> {
    let active = *ID_SCHEME.get_or_init(|| scheme);
    if active != scheme {
        return Err(IdSchemeError {
            active,
            requested: scheme,
        });
    }
    Ok(())
}

/// Returns the active scheme, fixing the default on first use.
pub fn id_scheme() -> IdScheme {
    *ID_SCHEME.get_or_init(IdScheme::default)
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Issues a fresh identifier for the given record family.
pub fn next_id(prefix: IdPrefix) -> String {
    format_id(prefix, id_scheme())
}

/// Fills an unset identifier slot and returns the (possibly existing) value.
pub fn ensure_id(slot: &mut Option<String>, prefix: IdPrefix) -> &str {
    slot.get_or_insert_with(|| next_id(prefix)).as_str()
}

/// Fills an unset creation timestamp with the current time.
pub fn ensure_created_at(slot: &mut Option<i64>) {
    if slot.is_none() {
        *slot = Some(now_epoch_ms());
    }
}

/// Returns the identifier of a record that must already be persisted.
pub fn require_id<'a>(
    slot: &'a Option<String>,
    entity: &'static str,
) -> Result<&'a str, ModelError> {
    slot.as_deref().ok_or(ModelError::MissingId { entity })
}

fn format_id(prefix: IdPrefix, scheme: IdScheme) -> String {
    match scheme {
        IdScheme::Millis => format!("{}-{}", prefix.as_str(), next_monotonic_millis()),
        IdScheme::Uuid => format!("{}-{}", prefix.as_str(), Uuid::new_v4().simple()),
    }
}

fn next_monotonic_millis() -> i64 {
    let now = now_epoch_ms();
    let mut last = LAST_ISSUED_MILLIS.load(Ordering::Acquire);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ISSUED_MILLIS.compare_exchange_weak(
            last,
            candidate,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}
