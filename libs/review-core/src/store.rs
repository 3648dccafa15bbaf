//! Boundary traits for the card source and the progress store.

use crate::error::StoreError;
use crate::types::{Card, CardId, CardReviewState, CourseId, LearnerId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Supplies the cards of a course.
pub trait CardSource {
    type Error: std::error::Error + 'static;

    fn cards_for_course(&self, course_id: CourseId) -> Result<Vec<Card>, Self::Error>;
}

/// Persists review state keyed by learner and card.
pub trait ProgressStore {
    type Error: std::error::Error + 'static;

    /// Stored state for every reviewed card of the course.
    fn get(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<HashMap<CardId, CardReviewState>, Self::Error>;

    /// Write `state` atomically for the pair.
    ///
    /// `expected_last_review` is the `last_reviewed_at` the writer based its
    /// update on (`None` for a card it saw as never reviewed). A mismatch with
    /// the stored row must be rejected as a conflict.
    fn upsert(
        &mut self,
        learner_id: LearnerId,
        card_id: CardId,
        state: &CardReviewState,
        expected_last_review: Option<DateTime<Utc>>,
    ) -> Result<(), Self::Error>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cards: Vec<Card>,
    progress: HashMap<(LearnerId, CardId), CardReviewState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            progress: HashMap::new(),
        }
    }

    pub fn insert_card(&mut self, card: Card) {
        self.cards.retain(|c| c.id != card.id);
        self.cards.push(card);
    }

    /// Read one stored state.
    pub fn state(&self, learner_id: LearnerId, card_id: CardId) -> Option<&CardReviewState> {
        self.progress.get(&(learner_id, card_id))
    }
}

impl CardSource for InMemoryStore {
    type Error = StoreError;

    fn cards_for_course(&self, course_id: CourseId) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .cards
            .iter()
            .filter(|c| c.course_id == course_id)
            .cloned()
            .collect())
    }
}

impl ProgressStore for InMemoryStore {
    type Error = StoreError;

    fn get(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<HashMap<CardId, CardReviewState>, StoreError> {
        Ok(self
            .cards
            .iter()
            .filter(|c| c.course_id == course_id)
            .filter_map(|c| {
                self.progress
                    .get(&(learner_id, c.id))
                    .map(|s| (c.id, s.clone()))
            })
            .collect())
    }

    fn upsert(
        &mut self,
        learner_id: LearnerId,
        card_id: CardId,
        state: &CardReviewState,
        expected_last_review: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        if !self.cards.iter().any(|c| c.id == card_id) {
            return Err(StoreError::UnknownCard(card_id));
        }
        let key = (learner_id, card_id);
        let stored = self.progress.get(&key).map(|s| s.last_reviewed_at);
        if stored != expected_last_review {
            return Err(StoreError::Conflict(card_id));
        }
        self.progress.insert(key, state.clone());
        Ok(())
    }
}
