//! Error types for review-core.

use crate::types::CardId;
use thiserror::Error;

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors raised by the scheduling primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("quality {0} is outside 0..=5")]
    QualityOutOfRange(u8),

    #[error("rating {0} is outside 1..=4")]
    RatingOutOfRange(u8),
}

/// Contract violations detected by the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session has not been started")]
    NotStarted,

    #[error("session has already been started")]
    AlreadyStarted,

    #[error("session is already completed")]
    Completed,

    #[error("no cards are due")]
    EmptyDueSet,

    #[error("card {got} answered out of order, expected {expected}")]
    OutOfOrder { expected: CardId, got: CardId },

    #[error("session time limit expired")]
    TimeExpired,
}

/// Errors from the in-memory progress store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown card: {0}")]
    UnknownCard(CardId),

    #[error("concurrent update detected for card {0}")]
    Conflict(CardId),
}

/// Failure while opening a session from a store.
#[derive(Debug, Error)]
pub enum OpenError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load review data: {0}")]
    Store(#[source] E),

    #[error(transparent)]
    Session(#[from] SessionError),
}
