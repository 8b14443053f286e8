//! Ordering schema migrations.
//!
//! | version | name | adds |
//! |---|---|---|
//! | 1 | `init` | users, restaurants, menu_items, orders, order_items with cascading FKs |
//! | 2 | `lookup_indexes` | indexes on every owner column used by listings and cascades |
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Applied version is mirrored to `PRAGMA user_version`.
//! - Pending migrations run inside one transaction; a failure leaves the
//!   schema at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "lookup_indexes",
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Latest schema version this build can open.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded on `conn`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending(from_version) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        debug!(
            "event=db_migration_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

fn pending(from_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > from_version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, pending, MIGRATIONS};
    use rusqlite::Connection;

    #[test]
    fn versions_are_strictly_increasing_from_one() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|migration| migration.version).collect();
        let expected: Vec<u32> = (1..=latest_version()).collect();
        assert_eq!(versions, expected);
    }

    #[test]
    fn pending_skips_applied_versions() {
        let names: Vec<&str> = pending(1).map(|migration| migration.name).collect();
        assert_eq!(names, vec!["lookup_indexes"]);
        assert_eq!(pending(latest_version()).count(), 0);
    }

    #[test]
    fn owner_foreign_keys_cascade_on_delete() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        for (table, parent) in [
            ("menu_items", "restaurants"),
            ("orders", "users"),
            ("orders", "restaurants"),
            ("order_items", "orders"),
            ("order_items", "menu_items"),
        ] {
            let on_delete: String = conn
                .query_row(
                    &format!(
                        "SELECT on_delete FROM pragma_foreign_key_list('{table}') WHERE \"table\" = ?1;"
                    ),
                    [parent],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(on_delete, "CASCADE", "{table} -> {parent}");
        }
    }
}
