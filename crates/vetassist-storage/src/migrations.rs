//! Database schema migrations.
//!
//! Creates the `kv_store` table and the `schema_migrations` bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use vetassist_core::error::VetAssistError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), VetAssistError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| VetAssistError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version = current_version(conn)?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: kv_store");
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64, VetAssistError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| VetAssistError::Storage(format!("Failed to query migration version: {}", e)))
}

/// Version 1: key-value table.
fn apply_v1(conn: &Connection) -> Result<(), VetAssistError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'kv_store');
        ",
    )
    .map_err(|e| VetAssistError::Storage(format!("Migration v1 failed: {}", e)))
}
