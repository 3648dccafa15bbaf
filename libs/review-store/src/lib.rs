//! SQLite-backed card source, progress store and settings repository.

pub mod config;
pub mod error;
pub mod repository;
pub mod schema;

pub use config::StoreConfig;
pub use error::DbError;
pub use repository::{CardRepository, SettingsRepository, SqliteRepository};
