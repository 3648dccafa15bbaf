//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the progress database.
pub const SCHEMA: &str = r#"
-- Cards (cached from the card source)
CREATE TABLE IF NOT EXISTS cards (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL,
    front TEXT NOT NULL,
    back TEXT NOT NULL
);

-- Review state per learner and card
CREATE TABLE IF NOT EXISTS card_progress (
    learner_id TEXT NOT NULL,
    card_id TEXT NOT NULL REFERENCES cards(id),
    ease_factor REAL NOT NULL,
    interval INTEGER NOT NULL,
    repetitions INTEGER NOT NULL,
    next_review_at TEXT NOT NULL,
    last_reviewed_at TEXT NOT NULL,
    PRIMARY KEY (learner_id, card_id)
);

-- Global settings
CREATE TABLE IF NOT EXISTS global_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    due_order TEXT NOT NULL DEFAULT 'overdue_first',
    new_cards_per_session INTEGER NOT NULL DEFAULT 20,
    reviews_per_session INTEGER NOT NULL DEFAULT 200,
    mastery_min_repetitions INTEGER NOT NULL DEFAULT 5,
    mastery_min_interval_days INTEGER NOT NULL DEFAULT 21,
    session_time_limit_secs INTEGER
);

-- Course settings overrides
CREATE TABLE IF NOT EXISTS course_settings (
    course_id TEXT PRIMARY KEY,
    due_order TEXT,
    new_cards_per_session INTEGER,
    reviews_per_session INTEGER,
    session_time_limit_secs INTEGER
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_cards_course ON cards(course_id);
CREATE INDEX IF NOT EXISTS idx_card_progress_due ON card_progress(learner_id, next_review_at);
"#;

/// Initialize global settings if not exists.
pub const INIT_GLOBAL_SETTINGS: &str = r#"
INSERT OR IGNORE INTO global_settings (id) VALUES (1);
"#;
