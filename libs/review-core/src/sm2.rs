//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2:
//! - A failed recall (quality < 3) resets the streak and schedules the card for tomorrow
//! - Successful recalls grow the interval 1 day → 6 days → previous interval × ease factor
//! - The ease factor is nudged after every review and never drops below its floor

use crate::quality::{map_swipe_to_quality, Quality};
use crate::types::CardReviewState;
use chrono::{DateTime, Duration, Utc};

/// SM-2 algorithm constants.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub first_interval: u32,
    pub second_interval: u32,
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
            maximum_interval: 36500,
        }
    }
}

/// States each swipe direction would produce.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipePreview {
    pub correct: CardReviewState,
    pub incorrect: CardReviewState,
}

impl Sm2 {
    /// Calculate the next review state. `None` is a card that was never reviewed.
    pub fn schedule(
        &self,
        state: Option<&CardReviewState>,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> CardReviewState {
        let (ease, repetitions, interval) = match state {
            Some(s) => (s.ease_factor, s.repetitions, s.interval_days),
            None => (self.initial_ease, 0, 0),
        };

        let (new_repetitions, new_interval) = if quality.is_success() {
            let next = match repetitions {
                0 => self.first_interval,
                1 => self.second_interval,
                // Multiplies by the ease held before this review's adjustment.
                _ => (f64::from(interval) * ease).round() as u32,
            };
            (repetitions.saturating_add(1), next.min(self.maximum_interval))
        } else {
            (0, self.first_interval)
        };

        let new_ease = self.next_ease(ease, quality);
        let next_review_at = now
            .checked_add_signed(Duration::days(i64::from(new_interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        tracing::debug!(
            quality = quality.value(),
            repetitions = new_repetitions,
            interval_days = new_interval,
            ease_factor = new_ease,
            "scheduled review"
        );

        CardReviewState {
            ease_factor: new_ease,
            repetitions: new_repetitions,
            interval_days: new_interval,
            next_review_at,
            last_reviewed_at: now,
        }
    }

    /// Preview the outcome of both swipe directions without committing either.
    pub fn preview(&self, state: Option<&CardReviewState>, now: DateTime<Utc>) -> SwipePreview {
        SwipePreview {
            correct: self.schedule(state, map_swipe_to_quality(true), now),
            incorrect: self.schedule(state, map_swipe_to_quality(false), now),
        }
    }

    // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    fn next_ease(&self, ease: f64, quality: Quality) -> f64 {
        let distance = f64::from(Quality::MAX - quality.value());
        let adjusted = ease + (0.1 - distance * (0.08 + distance * 0.02));
        adjusted.max(self.minimum_ease)
    }
}

/// Schedule with the standard SM-2 constants.
pub fn schedule(
    state: Option<&CardReviewState>,
    quality: Quality,
    now: DateTime<Utc>,
) -> CardReviewState {
    Sm2::default().schedule(state, quality, now)
}
