//! Directory store: users, doctors, appointments and auth tokens.
//!
//! Appointments carry denormalized `user_data` / `doc_data` JSON snapshots
//! taken at booking time, so listings render without joining back to the
//! live profiles. The roster and dashboard views are built entirely from
//! this store.

use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use super::StoreError;

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/directory_migrations/001_initial.sql"),
)];

/// Open (or create) the directory store at `path` and bring the schema
/// up to date.
pub fn open_directory_store(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    run_migrations(&conn)?;
    info!(path = %path.display(), "directory store ready");
    Ok(conn)
}

/// In-memory directory store for tests.
pub fn open_memory_directory_store() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "journal_mode", "DELETE")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        [],
    )?;

    let current: i64 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i64>>(0)
        })?
        .unwrap_or(0);

    for (version, sql) in MIGRATIONS {
        if *version > current {
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            info!(version, "applied directory migration");
        }
    }

    Ok(())
}
