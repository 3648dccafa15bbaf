//! Repository pattern for database access.

use crate::config::StoreConfig;
use crate::error::DbError;
use chrono::{DateTime, Utc};
use review_core::{
    compute_stats, Card, CardId, CardReviewState, CardSource, CourseId, CourseSettings, DueOrder,
    EffectiveSettings, GlobalSettings, LearnerId, MasteryPolicy, ProgressStore, ReviewStats,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for card operations.
pub trait CardRepository {
    fn get_card(&self, id: CardId) -> Result<Option<Card>>;
    fn upsert_cards(&self, cards: &[Card]) -> Result<()>;
}

/// Repository for settings operations.
pub trait SettingsRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings>;
    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()>;
    fn get_course_settings(&self, course_id: CourseId) -> Result<Option<CourseSettings>>;
    fn save_course_settings(&self, settings: &CourseSettings) -> Result<()>;
    fn delete_course_settings(&self, course_id: CourseId) -> Result<()>;
    fn get_effective_settings(&self, course_id: Option<CourseId>) -> Result<EffectiveSettings>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open the database named by the config, creating its directory.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let repo = Self::open(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "opened progress database");
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_GLOBAL_SETTINGS)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![super::schema::SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Learner-facing counts for a course, using the stored mastery policy.
    pub fn course_stats(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<ReviewStats> {
        let cards = self.cards_for_course(course_id)?;
        let states = self.get(learner_id, course_id)?;
        let policy = self.get_global_settings()?.mastery;
        Ok(compute_stats(&cards, &states, &policy, now))
    }

    fn row_to_card(row: &Row) -> rusqlite::Result<Card> {
        Ok(Card {
            id: uuid_column(row, 0)?,
            course_id: uuid_column(row, 1)?,
            front: row.get(2)?,
            back: row.get(3)?,
        })
    }

    fn row_to_state(row: &Row) -> rusqlite::Result<(CardId, CardReviewState)> {
        Ok((
            uuid_column(row, 0)?,
            CardReviewState {
                ease_factor: row.get(1)?,
                interval_days: row.get(2)?,
                repetitions: row.get(3)?,
                next_review_at: time_column(row, 4)?,
                last_reviewed_at: time_column(row, 5)?,
            },
        ))
    }
}

fn uuid_column(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_due_order(value: &str) -> Result<DueOrder> {
    DueOrder::from_str(value)
        .ok_or_else(|| DbError::InvalidData(format!("unknown due order: {value}")))
}

impl CardRepository for SqliteRepository {
    fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        self.conn
            .query_row(
                "SELECT id, course_id, front, back FROM cards WHERE id = ?1",
                params![id.to_string()],
                Self::row_to_card,
            )
            .optional()
            .map_err(Into::into)
    }

    fn upsert_cards(&self, cards: &[Card]) -> Result<()> {
        for card in cards {
            self.conn.execute(
                "INSERT INTO cards (id, course_id, front, back) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET course_id = excluded.course_id, front = excluded.front, back = excluded.back",
                params![card.id.to_string(), card.course_id.to_string(), card.front, card.back],
            )?;
        }
        Ok(())
    }
}

impl CardSource for SqliteRepository {
    type Error = DbError;

    fn cards_for_course(&self, course_id: CourseId) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, course_id, front, back FROM cards WHERE course_id = ?1 ORDER BY rowid",
        )?;
        let cards = stmt.query_map(params![course_id.to_string()], Self::row_to_card)?;
        cards.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}

impl ProgressStore for SqliteRepository {
    type Error = DbError;

    fn get(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<HashMap<CardId, CardReviewState>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.card_id, p.ease_factor, p.interval, p.repetitions, p.next_review_at, p.last_reviewed_at
             FROM card_progress p
             JOIN cards c ON c.id = p.card_id
             WHERE p.learner_id = ?1 AND c.course_id = ?2",
        )?;
        let rows = stmt.query_map(
            params![learner_id.to_string(), course_id.to_string()],
            Self::row_to_state,
        )?;
        rows.collect::<std::result::Result<HashMap<_, _>, _>>()
            .map_err(Into::into)
    }

    fn upsert(
        &mut self,
        learner_id: LearnerId,
        card_id: CardId,
        state: &CardReviewState,
        expected_last_review: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let learner = learner_id.to_string();
        let card = card_id.to_string();
        let tx = self.conn.transaction()?;

        let known: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM cards WHERE id = ?1)",
            params![card],
            |row| row.get(0),
        )?;
        if !known {
            return Err(DbError::CardNotFound(card_id));
        }

        let stored = tx
            .query_row(
                "SELECT last_reviewed_at FROM card_progress WHERE learner_id = ?1 AND card_id = ?2",
                params![learner, card],
                |row| time_column(row, 0),
            )
            .optional()?;
        if stored != expected_last_review {
            tracing::warn!(%learner_id, %card_id, "rejected stale progress update");
            return Err(DbError::Conflict(card_id));
        }

        tx.execute(
            "INSERT OR REPLACE INTO card_progress (learner_id, card_id, ease_factor, interval, repetitions, next_review_at, last_reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                learner,
                card,
                state.ease_factor,
                state.interval_days,
                state.repetitions,
                state.next_review_at.to_rfc3339(),
                state.last_reviewed_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl SettingsRepository for SqliteRepository {
    fn get_global_settings(&self) -> Result<GlobalSettings> {
        let (order, mut settings) = self.conn.query_row(
            "SELECT due_order, new_cards_per_session, reviews_per_session, mastery_min_repetitions, mastery_min_interval_days, session_time_limit_secs
             FROM global_settings WHERE id = 1",
            [],
            |row| {
                let order: String = row.get(0)?;
                Ok((
                    order,
                    GlobalSettings {
                        due_order: DueOrder::default(),
                        new_cards_per_session: row.get(1)?,
                        reviews_per_session: row.get(2)?,
                        mastery: MasteryPolicy {
                            min_repetitions: row.get(3)?,
                            min_interval_days: row.get(4)?,
                        },
                        session_time_limit_secs: row.get(5)?,
                    },
                ))
            },
        )?;
        settings.due_order = parse_due_order(&order)?;
        Ok(settings)
    }

    fn save_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        self.conn.execute(
            "UPDATE global_settings SET due_order = ?1, new_cards_per_session = ?2, reviews_per_session = ?3,
             mastery_min_repetitions = ?4, mastery_min_interval_days = ?5, session_time_limit_secs = ?6
             WHERE id = 1",
            params![
                settings.due_order.as_str(),
                settings.new_cards_per_session,
                settings.reviews_per_session,
                settings.mastery.min_repetitions,
                settings.mastery.min_interval_days,
                settings.session_time_limit_secs,
            ],
        )?;
        Ok(())
    }

    fn get_course_settings(&self, course_id: CourseId) -> Result<Option<CourseSettings>> {
        let row = self
            .conn
            .query_row(
                "SELECT due_order, new_cards_per_session, reviews_per_session, session_time_limit_secs
                 FROM course_settings WHERE course_id = ?1",
                params![course_id.to_string()],
                |row| {
                    let order: Option<String> = row.get(0)?;
                    Ok((
                        order,
                        CourseSettings {
                            course_id,
                            due_order: None,
                            new_cards_per_session: row.get(1)?,
                            reviews_per_session: row.get(2)?,
                            session_time_limit_secs: row.get(3)?,
                        },
                    ))
                },
            )
            .optional()?;

        let Some((order, mut settings)) = row else {
            return Ok(None);
        };
        settings.due_order = order.as_deref().map(parse_due_order).transpose()?;
        Ok(Some(settings))
    }

    fn save_course_settings(&self, settings: &CourseSettings) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO course_settings (course_id, due_order, new_cards_per_session, reviews_per_session, session_time_limit_secs)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                settings.course_id.to_string(),
                settings.due_order.map(|o| o.as_str()),
                settings.new_cards_per_session,
                settings.reviews_per_session,
                settings.session_time_limit_secs,
            ],
        )?;
        Ok(())
    }

    fn delete_course_settings(&self, course_id: CourseId) -> Result<()> {
        self.conn.execute(
            "DELETE FROM course_settings WHERE course_id = ?1",
            params![course_id.to_string()],
        )?;
        Ok(())
    }

    fn get_effective_settings(&self, course_id: Option<CourseId>) -> Result<EffectiveSettings> {
        let global = self.get_global_settings()?;
        let course = match course_id {
            Some(id) => self.get_course_settings(id)?,
            None => None,
        };
        Ok(EffectiveSettings::merge(&global, course.as_ref()))
    }
}
