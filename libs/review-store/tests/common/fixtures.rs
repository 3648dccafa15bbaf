//! Test fixtures.

use chrono::{DateTime, TimeZone, Utc};
use review_core::{Card, CourseId, LearnerId};
use uuid::Uuid;

pub fn learner() -> LearnerId {
    Uuid::from_u128(0xA11CE)
}

pub fn other_learner() -> LearnerId {
    Uuid::from_u128(0xB0B)
}

pub fn course() -> CourseId {
    Uuid::from_u128(0xC0FFEE)
}

pub fn start_of_term() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
}

pub fn card(n: u128) -> Card {
    Card {
        id: Uuid::from_u128(n),
        course_id: course(),
        front: format!("Question {n}"),
        back: format!("Answer {n}"),
    }
}

/// Cards 1..=count of the fixture course.
pub fn course_cards(count: u128) -> Vec<Card> {
    (1..=count).map(card).collect()
}
