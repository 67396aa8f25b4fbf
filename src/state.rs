//! Shared application state.
//!
//! `AppState` owns one connection per store and is wrapped in `Arc` at
//! startup so every handler sees the same instance. Handlers receive it
//! through the router rather than reaching for globals, which is what
//! lets the API tests run against in-memory stores.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::{self, AdminCredentials};
use crate::db::clinical::{open_clinical_store, open_memory_clinical_store};
use crate::db::directory::{open_directory_store, open_memory_directory_store};
use crate::db::StoreError;

/// Transport-agnostic application state.
///
/// The two stores are deliberately separate fields with separate locks;
/// no operation holds both at once except the identity bridge, which
/// always takes directory first.
pub struct AppState {
    /// Directory store: users, doctors, appointments, tokens.
    directory: Mutex<Connection>,
    /// Clinical store: patients, records, prescriptions, vitals, labs.
    clinical: Mutex<Connection>,
    /// Admin sign-in credentials. `None` disables admin login.
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    /// Open both stores at their configured on-disk paths.
    pub fn open() -> Result<Self, StateError> {
        std::fs::create_dir_all(config::app_data_dir())
            .map_err(|e| StateError::DataDir(e.to_string()))?;
        Ok(Self {
            directory: Mutex::new(open_directory_store(&config::directory_db_path())?),
            clinical: Mutex::new(open_clinical_store(&config::clinical_db_path())?),
            admin: config::admin_credentials(),
        })
    }

    /// Fresh in-memory stores with fixed admin credentials, for tests.
    pub fn open_in_memory() -> Result<Self, StateError> {
        Ok(Self {
            directory: Mutex::new(open_memory_directory_store()?),
            clinical: Mutex::new(open_memory_clinical_store()?),
            admin: Some(AdminCredentials {
                email: "admin@example.com".to_string(),
                password: "admin-secret".to_string(),
            }),
        })
    }

    /// Lock the directory store connection.
    pub fn directory(&self) -> Result<MutexGuard<'_, Connection>, StateError> {
        self.directory.lock().map_err(|_| StateError::LockPoisoned)
    }

    /// Lock the clinical store connection.
    pub fn clinical(&self) -> Result<MutexGuard<'_, Connection>, StateError> {
        self.clinical.lock().map_err(|_| StateError::LockPoisoned)
    }
}

/// Errors from state construction and lock access.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Cannot create data directory: {0}")]
    DataDir(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_opens_both_stores() {
        let state = AppState::open_in_memory().unwrap();

        let users: i64 = state
            .directory()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        let patients: i64 = state
            .clinical()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .unwrap();

        assert_eq!(users, 0);
        assert_eq!(patients, 0);
    }

    #[test]
    fn in_memory_state_has_admin_credentials() {
        let state = AppState::open_in_memory().unwrap();
        let admin = state.admin.as_ref().unwrap();
        assert_eq!(admin.email, "admin@example.com");
    }

    #[test]
    fn stores_are_independent() {
        let state = AppState::open_in_memory().unwrap();

        // A directory table must not exist in the clinical store.
        let result: Result<i64, _> = state
            .clinical()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0));
        assert!(result.is_err());
    }

    #[test]
    fn concurrent_locks_do_not_deadlock() {
        use std::sync::Arc;
        use std::thread;

        let state = Arc::new(AppState::open_in_memory().unwrap());
        let mut handles = vec![];

        for _ in 0..8 {
            let state = Arc::clone(&state);
            handles.push(thread::spawn(move || {
                let guard = state.directory().unwrap();
                let count: i64 = guard
                    .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                    .unwrap();
                assert_eq!(count, 0);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
