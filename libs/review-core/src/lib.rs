//! Spaced-repetition review core.
//!
//! Provides:
//! - Quality mapping from swipe and four-point ratings onto the SM-2 scale
//! - The SM-2 review scheduler
//! - Due-set selection and study queue ordering
//! - The review session controller and the progress store boundary
//! - Shared types (Card, CardReviewState, settings, stats)

pub mod due;
pub mod error;
pub mod quality;
pub mod session;
pub mod sm2;
pub mod stats;
pub mod store;
pub mod types;

pub use due::{build_queue, select_due};
pub use error::{OpenError, Result, ReviewError, SessionError, StoreError};
pub use quality::{map_swipe_to_quality, Quality, Rating};
pub use session::{
    AnswerOutcome, FlushFailure, FlushReport, ReviewRecord, ReviewSession, SessionPhase,
    SessionProgress, SessionSummary,
};
pub use sm2::{schedule, Sm2, SwipePreview};
pub use stats::compute_stats;
pub use store::{CardSource, InMemoryStore, ProgressStore};
pub use types::{
    Card, CardId, CardReviewState, CourseId, CourseSettings, DueOrder, EffectiveSettings,
    GlobalSettings, LearnerId, MasteryPolicy, ReviewStats,
};
