//! Due-set selection and study queue ordering.

use crate::types::{Card, CardId, CardReviewState, DueOrder, EffectiveSettings};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Cards due at `now`, in input order. Cards without stored state are always due.
pub fn select_due<'a>(
    cards: &'a [Card],
    states: &HashMap<CardId, CardReviewState>,
    now: DateTime<Utc>,
) -> Vec<&'a Card> {
    cards
        .iter()
        .filter(|card| states.get(&card.id).map_or(true, |s| s.is_due(now)))
        .collect()
}

/// Order the due set and apply per-session limits.
///
/// Never-reviewed cards are capped by `new_cards_per_session`, previously
/// reviewed cards by `reviews_per_session`.
pub fn build_queue(
    due: &[&Card],
    states: &HashMap<CardId, CardReviewState>,
    settings: &EffectiveSettings,
) -> Vec<Card> {
    let mut ordered: Vec<&Card> = due.to_vec();

    if settings.due_order == DueOrder::OverdueFirst {
        // Stable sort keeps input order among ties and among new cards.
        ordered.sort_by_key(|card| match states.get(&card.id) {
            Some(state) => (0, Some(state.next_review_at)),
            None => (1, None),
        });
    }

    let mut new_left = settings.new_cards_per_session as usize;
    let mut reviews_left = settings.reviews_per_session as usize;

    ordered
        .into_iter()
        .filter(|card| {
            let budget = if states.contains_key(&card.id) {
                &mut reviews_left
            } else {
                &mut new_left
            };
            if *budget == 0 {
                return false;
            }
            *budget -= 1;
            true
        })
        .cloned()
        .collect()
}
