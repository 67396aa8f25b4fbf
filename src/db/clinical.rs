//! Clinical store: patients, medical records, prescriptions, vital signs
//! and lab results.
//!
//! This is the relational half of the system. Every row here hangs off a
//! `patients` row, which in turn is keyed to the directory store through
//! `external_user_id`. The store is plain SQLite with foreign keys on and
//! a versioned migration chain.

use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use super::StoreError;

/// Ordered migration chain. Each entry runs inside its own transaction
/// and bumps `schema_version` as its final statement.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/clinical_migrations/001_initial.sql"),
)];

/// Open (or create) the clinical store at `path` and bring the schema
/// up to date.
pub fn open_clinical_store(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    run_migrations(&conn)?;
    info!(path = %path.display(), "clinical store ready");
    Ok(conn)
}

/// In-memory clinical store for tests.
pub fn open_memory_clinical_store() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    configure_connection(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "journal_mode", "DELETE")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    // Identity-bridge races resolve by retry, so concurrent writers need
    // to wait on the lock instead of failing fast.
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
            info!(version, "applied clinical migration");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_create_all_tables() {
        let conn = open_memory_clinical_store().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('patients', 'medical_records', 'prescriptions',
                              'vital_signs', 'lab_results')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = open_memory_clinical_store().unwrap();
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = open_memory_clinical_store().unwrap();

        let result = conn.execute(
            "INSERT INTO medical_records (patient_id, doctor_id, visit_date, diagnosis, treatment)
             VALUES (999, 'doc-1', '2025-01-01T10:00:00Z', 'x', 'y')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn external_user_id_is_unique() {
        let conn = open_memory_clinical_store().unwrap();

        conn.execute(
            "INSERT INTO patients (external_user_id, medical_record_number) VALUES ('u1', 'MR1')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO patients (external_user_id, medical_record_number) VALUES ('u1', 'MR2')",
            [],
        );
        assert!(dup.is_err());
    }
}
