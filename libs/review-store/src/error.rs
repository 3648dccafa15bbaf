//! Database error types.

use review_core::CardId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("card not found: {0}")]
    CardNotFound(CardId),

    #[error("concurrent update detected for card {0}")]
    Conflict(CardId),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
