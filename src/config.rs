use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CareDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API port, overridable via `PORT`.
pub const DEFAULT_PORT: u16 = 4000;

/// Get the application data directory
/// ~/CareDesk/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("CareDesk")
}

/// Path of the clinical store (patients, records, prescriptions, vitals, labs)
pub fn clinical_db_path() -> PathBuf {
    app_data_dir().join("clinical.db")
}

/// Path of the directory store (users, doctors, appointments, tokens)
pub fn directory_db_path() -> PathBuf {
    app_data_dir().join("directory.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "caredesk=info,tower_http=warn".to_string()
}

/// Port the API listens on.
pub fn port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Admin sign-in credentials.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Read admin credentials from `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
///
/// Returns `None` when either variable is unset; admin login is then
/// disabled rather than falling back to a built-in password.
pub fn admin_credentials() -> Option<AdminCredentials> {
    let email = std::env::var("ADMIN_EMAIL").ok()?;
    let password = std::env::var("ADMIN_PASSWORD").ok()?;
    Some(AdminCredentials { email, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("CareDesk"));
    }

    #[test]
    fn store_paths_under_app_data() {
        assert!(clinical_db_path().starts_with(app_data_dir()));
        assert!(clinical_db_path().ends_with("clinical.db"));
        assert!(directory_db_path().ends_with("directory.db"));
    }

    #[test]
    fn app_name_is_caredesk() {
        assert_eq!(APP_NAME, "CareDesk");
    }

    #[test]
    fn log_filter_scopes_to_the_crate() {
        assert!(default_log_filter().contains("caredesk="));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
