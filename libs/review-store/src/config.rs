//! Store configuration.

use std::path::PathBuf;

/// Environment variable naming the database file.
pub const DB_PATH_VAR: &str = "REVIEW_DB_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
}

impl StoreConfig {
    /// Read configuration from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        match std::env::var_os(DB_PATH_VAR) {
            Some(path) if !path.is_empty() => Self {
                database_path: PathBuf::from(path),
            },
            _ => Self::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        // Use app data directory for production, fallback to current dir
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spaced-review")
            .join("progress.db");
        Self { database_path }
    }
}
