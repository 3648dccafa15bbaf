//! Review session controller.
//!
//! A session moves `Idle → InProgress → Completed`. It snapshots the due
//! cards at start, accepts answers strictly in snapshot order, schedules each
//! answered card exactly once and buffers the new state until it is flushed
//! to a [`ProgressStore`].

use crate::due::{build_queue, select_due};
use crate::error::{OpenError, SessionError};
use crate::quality::{map_swipe_to_quality, Quality, Rating};
use crate::sm2::Sm2;
use crate::store::{CardSource, ProgressStore};
use crate::types::{
    Card, CardId, CardReviewState, CourseId, EffectiveSettings, LearnerId, MasteryPolicy,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    InProgress,
    Completed,
}

/// One answered card and the state computed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub card_id: CardId,
    pub quality: Quality,
    pub previous: Option<CardReviewState>,
    pub next: CardReviewState,
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub reviewed: usize,
    pub correct: usize,
    pub mastered: usize,
    /// Reviews whose state has not reached the progress store yet.
    pub unpersisted: usize,
    /// Cards left unanswered when the session ended early.
    pub skipped: usize,
    pub timed_out: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionProgress {
    Next { card_id: CardId, remaining: usize },
    Completed(SessionSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub record: ReviewRecord,
    pub progress: SessionProgress,
}

#[derive(Debug)]
pub struct FlushFailure<E> {
    pub card_id: CardId,
    pub error: E,
}

/// Per-card result of a flush.
#[derive(Debug)]
pub struct FlushReport<E> {
    pub persisted: Vec<CardId>,
    pub failed: Vec<FlushFailure<E>>,
}

impl<E> Default for FlushReport<E> {
    fn default() -> Self {
        Self {
            persisted: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<E> FlushReport<E> {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// State machine for one review pass of one learner.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    learner_id: LearnerId,
    scheduler: Sm2,
    mastery: MasteryPolicy,
    time_limit: Option<Duration>,
    phase: SessionPhase,
    cards: Vec<Card>,
    states: HashMap<CardId, CardReviewState>,
    cursor: usize,
    records: Vec<ReviewRecord>,
    deadline: Option<DateTime<Utc>>,
    timed_out: bool,
}

impl ReviewSession {
    pub fn new(learner_id: LearnerId, settings: &EffectiveSettings) -> Self {
        Self {
            learner_id,
            scheduler: Sm2::default(),
            mastery: settings.mastery,
            time_limit: settings
                .session_time_limit_secs
                .map(|secs| Duration::seconds(i64::from(secs))),
            phase: SessionPhase::Idle,
            cards: Vec::new(),
            states: HashMap::new(),
            cursor: 0,
            records: Vec::new(),
            deadline: None,
            timed_out: false,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Sm2) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Load a course, select what is due at `now` and start reviewing it.
    pub fn open<S, E>(
        store: &S,
        learner_id: LearnerId,
        course_id: CourseId,
        settings: &EffectiveSettings,
        now: DateTime<Utc>,
    ) -> std::result::Result<Self, OpenError<E>>
    where
        S: CardSource<Error = E> + ProgressStore<Error = E>,
        E: std::error::Error + 'static,
    {
        let cards = store.cards_for_course(course_id).map_err(OpenError::Store)?;
        let states = store.get(learner_id, course_id).map_err(OpenError::Store)?;

        let due = select_due(&cards, &states, now);
        let queue = build_queue(&due, &states, settings);

        let mut session = Self::new(learner_id, settings);
        session.start(queue, states, now)?;
        Ok(session)
    }

    /// Snapshot the due cards and begin. Repeated card ids keep their first position.
    pub fn start(
        &mut self,
        due: Vec<Card>,
        mut states: HashMap<CardId, CardReviewState>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        let mut seen = HashSet::new();
        let cards: Vec<Card> = due.into_iter().filter(|c| seen.insert(c.id)).collect();
        if cards.is_empty() {
            return Err(SessionError::EmptyDueSet);
        }
        states.retain(|id, _| seen.contains(id));

        tracing::info!(learner_id = %self.learner_id, cards = cards.len(), "review session started");

        self.cards = cards;
        self.states = states;
        self.cursor = 0;
        self.deadline = self.time_limit.map(|limit| now + limit);
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    /// Card awaiting an answer.
    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            SessionPhase::InProgress => self.cards.get(self.cursor),
            _ => None,
        }
    }

    /// Stored state of a snapshot card as read at start.
    pub fn known_state(&self, card_id: CardId) -> Option<&CardReviewState> {
        self.states.get(&card_id)
    }

    /// (answered, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.cards.len())
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn pending(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.records.iter().filter(|r| !r.persisted)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Submit the binary review signal for the current card.
    pub fn submit_answer(
        &mut self,
        card_id: CardId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        self.submit_quality(card_id, map_swipe_to_quality(correct), now)
    }

    /// Submit a four-point rating for the current card.
    pub fn submit_rating(
        &mut self,
        card_id: CardId,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        self.submit_quality(card_id, rating.to_quality(), now)
    }

    fn submit_quality(
        &mut self,
        card_id: CardId,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        match self.phase {
            SessionPhase::Idle => return Err(SessionError::NotStarted),
            SessionPhase::Completed => return Err(SessionError::Completed),
            SessionPhase::InProgress => {}
        }
        if self.deadline_passed(now) {
            self.finish(true);
            return Err(SessionError::TimeExpired);
        }

        let expected = self
            .cards
            .get(self.cursor)
            .map(|c| c.id)
            .ok_or(SessionError::Completed)?;
        if expected != card_id {
            return Err(SessionError::OutOfOrder {
                expected,
                got: card_id,
            });
        }

        let previous = self.states.get(&card_id).cloned();
        let next = self.scheduler.schedule(previous.as_ref(), quality, now);
        let record = ReviewRecord {
            card_id,
            quality,
            previous,
            next,
            persisted: false,
        };
        self.records.push(record.clone());
        self.cursor += 1;

        let progress = match self.cards.get(self.cursor) {
            Some(card) => SessionProgress::Next {
                card_id: card.id,
                remaining: self.cards.len() - self.cursor,
            },
            None => {
                self.finish(false);
                SessionProgress::Completed(self.build_summary())
            }
        };

        Ok(AnswerOutcome { record, progress })
    }

    /// External clock tick. Ends a timed session once its deadline has passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> SessionPhase {
        if self.phase == SessionPhase::InProgress && self.deadline_passed(now) {
            self.finish(true);
        }
        self.phase
    }

    /// Summary of a completed session.
    pub fn summary(&self) -> Option<SessionSummary> {
        match self.phase {
            SessionPhase::Completed => Some(self.build_summary()),
            _ => None,
        }
    }

    /// Push every unpersisted review to the store.
    ///
    /// Failed cards stay pending with their computed state, so calling this
    /// again retries them without rescheduling.
    pub fn flush<S: ProgressStore>(&mut self, store: &mut S) -> FlushReport<S::Error> {
        let mut report = FlushReport::default();

        for record in self.records.iter_mut().filter(|r| !r.persisted) {
            let expected = record.previous.as_ref().map(|s| s.last_reviewed_at);
            match store.upsert(self.learner_id, record.card_id, &record.next, expected) {
                Ok(()) => {
                    record.persisted = true;
                    report.persisted.push(record.card_id);
                }
                Err(error) => {
                    tracing::warn!(card_id = %record.card_id, %error, "failed to persist review");
                    report.failed.push(FlushFailure {
                        card_id: record.card_id,
                        error,
                    });
                }
            }
        }

        report
    }

    fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    fn finish(&mut self, timed_out: bool) {
        self.phase = SessionPhase::Completed;
        self.timed_out = timed_out;
        let summary = self.build_summary();
        tracing::info!(
            learner_id = %self.learner_id,
            reviewed = summary.reviewed,
            mastered = summary.mastered,
            skipped = summary.skipped,
            timed_out,
            "review session completed"
        );
    }

    fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            reviewed: self.records.len(),
            correct: self.records.iter().filter(|r| r.quality.is_success()).count(),
            mastered: self
                .records
                .iter()
                .filter(|r| self.mastery.is_mastered(&r.next))
                .count(),
            unpersisted: self.records.iter().filter(|r| !r.persisted).count(),
            skipped: self.cards.len() - self.cursor,
            timed_out: self.timed_out,
        }
    }
}
