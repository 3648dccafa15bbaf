//! Learner-facing review statistics.

use crate::types::{Card, CardId, CardReviewState, MasteryPolicy, ReviewStats};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Count total, reviewed, mastered and due cards for one course.
pub fn compute_stats(
    cards: &[Card],
    states: &HashMap<CardId, CardReviewState>,
    policy: &MasteryPolicy,
    now: DateTime<Utc>,
) -> ReviewStats {
    cards
        .iter()
        .fold(ReviewStats::default(), |mut stats, card| {
            stats.total += 1;
            match states.get(&card.id) {
                Some(state) => {
                    stats.reviewed += 1;
                    if policy.is_mastered(state) {
                        stats.mastered += 1;
                    }
                    if state.is_due(now) {
                        stats.due += 1;
                    }
                }
                None => stats.due += 1,
            }
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn counts_each_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 7, 0, 0).unwrap();
        let cards: Vec<Card> = (1..=4)
            .map(|n| Card {
                id: Uuid::from_u128(n),
                course_id: Uuid::from_u128(99),
                front: String::new(),
                back: String::new(),
            })
            .collect();
        let state = |repetitions, interval_days, next_review_at| CardReviewState {
            ease_factor: 2.5,
            repetitions,
            interval_days,
            next_review_at,
            last_reviewed_at: now - Duration::days(1),
        };
        let states = HashMap::from([
            (cards[1].id, state(6, 40, now + Duration::days(40))),
            (cards[2].id, state(1, 1, now - Duration::hours(2))),
            (cards[3].id, state(2, 6, now + Duration::days(5))),
        ]);

        let stats = compute_stats(&cards, &states, &MasteryPolicy::default(), now);
        assert_eq!(
            stats,
            ReviewStats {
                total: 4,
                reviewed: 3,
                mastered: 1,
                due: 2,
            }
        );
    }
}
