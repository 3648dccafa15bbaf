//! Core types for the review scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LearnerId = Uuid;
pub type CourseId = Uuid;
pub type CardId = Uuid;

/// Flashcard as supplied by the card source. Content is opaque to scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub course_id: CourseId,
    pub front: String,
    pub back: String,
}

/// Per learner × card review state.
///
/// Field names follow the persistence boundary (`easeFactor`, `interval`,
/// `repetitions`, `nextReviewAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewState {
    pub ease_factor: f64,
    pub repetitions: u32,
    #[serde(rename = "interval")]
    pub interval_days: u32,
    #[serde(alias = "next_review_at")]
    pub next_review_at: DateTime<Utc>,
    #[serde(alias = "last_reviewed_at")]
    pub last_reviewed_at: DateTime<Utc>,
}

impl CardReviewState {
    /// Whether the card should resurface at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// Order in which due cards are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueOrder {
    AsGiven,
    OverdueFirst,
}

impl Default for DueOrder {
    fn default() -> Self {
        Self::OverdueFirst
    }
}

impl DueOrder {
    /// Get the order name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsGiven => "as_given",
            Self::OverdueFirst => "overdue_first",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "as_given" => Some(Self::AsGiven),
            "overdue_first" => Some(Self::OverdueFirst),
            _ => None,
        }
    }
}

/// Threshold at which a card counts as mastered.
///
/// A card is mastered once either bound is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryPolicy {
    pub min_repetitions: u32,
    pub min_interval_days: u32,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            min_repetitions: 5,
            min_interval_days: 21,
        }
    }
}

impl MasteryPolicy {
    pub fn is_mastered(&self, state: &CardReviewState) -> bool {
        state.repetitions >= self.min_repetitions || state.interval_days >= self.min_interval_days
    }
}

/// Global settings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub due_order: DueOrder,
    pub new_cards_per_session: u32,
    pub reviews_per_session: u32,
    pub mastery: MasteryPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_time_limit_secs: Option<u32>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            due_order: DueOrder::default(),
            new_cards_per_session: 20,
            reviews_per_session: 200,
            mastery: MasteryPolicy::default(),
            session_time_limit_secs: None,
        }
    }
}

/// Per-course settings (all fields optional for overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSettings {
    pub course_id: CourseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_order: Option<DueOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_cards_per_session: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_per_session: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_time_limit_secs: Option<u32>,
}

impl CourseSettings {
    /// Create new course settings with only the course set.
    pub fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            due_order: None,
            new_cards_per_session: None,
            reviews_per_session: None,
            session_time_limit_secs: None,
        }
    }
}

/// Effective settings (global merged with course overrides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub due_order: DueOrder,
    pub new_cards_per_session: u32,
    pub reviews_per_session: u32,
    pub mastery: MasteryPolicy,
    pub session_time_limit_secs: Option<u32>,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self::merge(&GlobalSettings::default(), None)
    }
}

impl EffectiveSettings {
    /// Merge global settings with optional course settings.
    ///
    /// The mastery policy is learner-wide and never overridden per course.
    pub fn merge(global: &GlobalSettings, course: Option<&CourseSettings>) -> Self {
        match course {
            Some(c) => Self {
                due_order: c.due_order.unwrap_or(global.due_order),
                new_cards_per_session: c
                    .new_cards_per_session
                    .unwrap_or(global.new_cards_per_session),
                reviews_per_session: c.reviews_per_session.unwrap_or(global.reviews_per_session),
                mastery: global.mastery,
                session_time_limit_secs: c
                    .session_time_limit_secs
                    .or(global.session_time_limit_secs),
            },
            None => Self {
                due_order: global.due_order,
                new_cards_per_session: global.new_cards_per_session,
                reviews_per_session: global.reviews_per_session,
                mastery: global.mastery,
                session_time_limit_secs: global.session_time_limit_secs,
            },
        }
    }
}

/// Learner-facing counts for a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: usize,
    pub reviewed: usize,
    pub mastered: usize,
    pub due: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn state(repetitions: u32, interval_days: u32) -> CardReviewState {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        CardReviewState {
            ease_factor: 2.5,
            repetitions,
            interval_days,
            next_review_at: at,
            last_reviewed_at: at,
        }
    }

    #[test]
    fn serializes_with_boundary_field_names() {
        let json = serde_json::to_value(state(2, 6)).unwrap();
        assert_eq!(json["easeFactor"], 2.5);
        assert_eq!(json["interval"], 6);
        assert_eq!(json["repetitions"], 2);
        assert_eq!(json["nextReviewAt"], "2024-03-01T09:00:00Z");
    }

    #[test]
    fn accepts_snake_case_next_review_at() {
        let json = r#"{
            "easeFactor": 2.36,
            "interval": 1,
            "repetitions": 0,
            "next_review_at": "2024-03-02T09:00:00Z",
            "lastReviewedAt": "2024-03-01T09:00:00Z"
        }"#;
        let parsed: CardReviewState = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.interval_days, 1);
        assert_eq!(
            parsed.next_review_at,
            Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn mastery_either_bound() {
        let policy = MasteryPolicy::default();
        assert!(!policy.is_mastered(&state(4, 20)));
        assert!(policy.is_mastered(&state(5, 1)));
        assert!(policy.is_mastered(&state(1, 21)));
    }

    #[test]
    fn course_overrides_win() {
        let global = GlobalSettings {
            session_time_limit_secs: Some(600),
            ..Default::default()
        };
        let mut course = CourseSettings::new(Uuid::from_u128(7));
        course.new_cards_per_session = Some(5);
        course.due_order = Some(DueOrder::AsGiven);

        let merged = EffectiveSettings::merge(&global, Some(&course));
        assert_eq!(merged.new_cards_per_session, 5);
        assert_eq!(merged.reviews_per_session, 200);
        assert_eq!(merged.due_order, DueOrder::AsGiven);
        assert_eq!(merged.session_time_limit_secs, Some(600));
    }

    #[test]
    fn due_order_string_roundtrip() {
        for order in [DueOrder::AsGiven, DueOrder::OverdueFirst] {
            assert_eq!(DueOrder::from_str(order.as_str()), Some(order));
        }
        assert_eq!(DueOrder::from_str("random"), None);
    }
}
