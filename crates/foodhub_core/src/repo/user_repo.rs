//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness is enforced by storage and surfaced as
//!   `RepoError::DuplicateEmail`, never pre-checked.
//! - `id` and `created_at` are written once on insert and never updated.
//! - Deleting a user cascades to its orders and their lines.

use crate::model::identity::require_id;
use crate::model::order::OrderId;
use crate::model::user::{User, UserId, UserType};
use crate::repo::support::{ensure_connection_ready, is_primary_key_violation, is_unique_violation};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password,
    phone,
    user_type,
    created_at
FROM users";

/// Repository interface for user records.
pub trait UserRepository {
    fn create_user(&self, user: &mut User) -> RepoResult<UserId>;
    fn update_user(&self, user: &mut User) -> RepoResult<()>;
    fn get_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// Exact-match lookup used by sign-in flows.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: &str) -> RepoResult<()>;
    /// Fills `user.orders` with the ids of orders the user owns.
    fn load_user_orders(&self, user: &mut User) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users", "orders"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &mut User) -> RepoResult<UserId> {
        user.prepare_for_insert();
        let id = require_id(&user.id, "user")?.to_string();

        self.conn
            .execute(
                "INSERT INTO users (
                    id,
                    name,
                    email,
                    password,
                    phone,
                    user_type,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.as_str(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.password.as_str(),
                    user.phone.as_deref(),
                    user.user_type.as_str(),
                    user.created_at,
                ],
            )
            .map_err(|err| map_user_write_error(err, &id, &user.email))?;

        Ok(id)
    }

    fn update_user(&self, user: &mut User) -> RepoResult<()> {
        user.prepare_for_update()?;
        let id = require_id(&user.id, "user")?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    name = ?2,
                    email = ?3,
                    password = ?4,
                    phone = ?5,
                    user_type = ?6
                 WHERE id = ?1;",
                params![
                    id,
                    user.name.as_str(),
                    user.email.as_str(),
                    user.password.as_str(),
                    user.phone.as_deref(),
                    user.user_type.as_str(),
                ],
            )
            .map_err(|err| map_user_write_error(err, id, &user.email))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        load_user(self.conn, id)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn delete_user(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        debug!("event=user_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn load_user_orders(&self, user: &mut User) -> RepoResult<()> {
        let id = require_id(&user.id, "user")?;
        let mut stmt = self.conn.prepare(
            "SELECT id
             FROM orders
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let order_ids = stmt
            .query_map([id], |row| row.get::<_, OrderId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        user.orders = order_ids;
        Ok(())
    }
}

/// Loads one user by id; shared with repositories that resolve order owners.
pub(crate) fn load_user(conn: &Connection, id: &str) -> RepoResult<Option<User>> {
    let row = conn
        .query_row(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
            Ok(parse_user_row(row))
        })
        .optional()?;
    row.transpose()
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user_type_text: String = row.get("user_type")?;
    let user_type = UserType::parse(&user_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid user type `{user_type_text}` in users.user_type"
        ))
    })?;

    Ok(User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        phone: row.get("phone")?,
        user_type,
        created_at: row.get("created_at")?,
        orders: Vec::new(),
    })
}

fn map_user_write_error(err: rusqlite::Error, id: &str, email: &str) -> RepoError {
    if is_unique_violation(&err, "users.email") {
        return RepoError::DuplicateEmail(email.to_string());
    }
    if is_primary_key_violation(&err, "users") {
        return RepoError::DuplicateId {
            entity: "user",
            id: id.to_string(),
        };
    }
    err.into()
}
