//! Review sessions persisted through the SQLite store.

mod common;

use chrono::Duration;
use pretty_assertions::assert_eq;
use review_core::{
    OpenError, ProgressStore, ReviewSession, ReviewStats, SessionError, SessionProgress,
};
use review_store::{DbError, SettingsRepository, SqliteRepository, StoreConfig};

use common::fixtures::{self, card, course, learner, other_learner, start_of_term};

fn open(repo: &SqliteRepository, at: chrono::DateTime<chrono::Utc>) -> ReviewSession {
    let settings = repo.get_effective_settings(Some(course())).unwrap();
    ReviewSession::open(repo, learner(), course(), &settings, at).unwrap()
}

/// A full pass over a new course reviews every card and persists it.
#[test]
fn first_session_reviews_every_new_card() {
    let mut repo = common::seeded_repository();
    let now = start_of_term();
    let mut session = open(&repo, now);

    let mut answered = Vec::new();
    while let Some(current) = session.current_card().map(|c| c.id) {
        let correct = current != card(3).id;
        session.submit_answer(current, correct, now).unwrap();
        answered.push(current);
    }
    assert_eq!(answered, fixtures::course_cards(4).iter().map(|c| c.id).collect::<Vec<_>>());

    let summary = session.summary().unwrap();
    assert_eq!(summary.reviewed, 4);
    assert_eq!(summary.correct, 3);
    assert_eq!(summary.unpersisted, 4);

    let report = session.flush(&mut repo);
    assert!(report.is_clean());
    assert_eq!(report.persisted.len(), 4);

    let stored = repo.get(learner(), course()).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[&card(3).id].repetitions, 0);
    assert_eq!(stored[&card(1).id].next_review_at, now + Duration::days(1));
}

/// Only cards whose review date has arrived come back the next day.
#[test]
fn next_day_session_contains_only_due_cards() {
    let mut repo = common::seeded_repository();
    let now = start_of_term();
    let mut session = open(&repo, now);
    for id in fixtures::course_cards(4).iter().map(|c| c.id) {
        session.submit_answer(id, true, now).unwrap();
    }
    assert!(session.flush(&mut repo).is_clean());

    let too_early = ReviewSession::open(
        &repo,
        learner(),
        course(),
        &repo.get_effective_settings(Some(course())).unwrap(),
        now + Duration::hours(12),
    )
    .unwrap_err();
    assert!(matches!(too_early, OpenError::Session(SessionError::EmptyDueSet)));

    let tomorrow = open(&repo, now + Duration::days(1));
    assert_eq!(tomorrow.progress(), (0, 4));
}

/// Progress is tracked per learner.
#[test]
fn learners_do_not_share_progress() {
    let mut repo = common::seeded_repository();
    let now = start_of_term();
    let mut session = open(&repo, now);
    session.submit_answer(card(1).id, true, now).unwrap();
    assert!(session.flush(&mut repo).is_clean());

    assert_eq!(repo.get(learner(), course()).unwrap().len(), 1);
    assert!(repo.get(other_learner(), course()).unwrap().is_empty());
}

/// Two devices reviewing the same card: the second write is surfaced, not lost silently.
#[test]
fn concurrent_devices_conflict() {
    let mut repo = common::seeded_repository();
    let now = start_of_term();
    let mut phone = open(&repo, now);
    let mut laptop = open(&repo, now);

    phone.submit_answer(card(1).id, true, now).unwrap();
    laptop
        .submit_answer(card(1).id, false, now + Duration::minutes(2))
        .unwrap();

    assert!(phone.flush(&mut repo).is_clean());
    let report = laptop.flush(&mut repo);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, DbError::Conflict(id) if id == card(1).id));
    assert_eq!(laptop.pending().count(), 1);

    let stored = repo.get(learner(), course()).unwrap();
    assert_eq!(stored[&card(1).id].repetitions, 1);
}

/// Course overrides cap the number of new cards in a session.
#[test]
fn course_limits_shape_the_queue() {
    let repo = common::seeded_repository();
    let mut overrides = review_core::CourseSettings::new(course());
    overrides.new_cards_per_session = Some(2);
    repo.save_course_settings(&overrides).unwrap();

    let session = open(&repo, start_of_term());
    assert_eq!(session.progress(), (0, 2));
}

/// Statistics read the raw per-card state.
#[test]
fn course_stats_after_a_session() {
    let mut repo = common::seeded_repository();
    let now = start_of_term();
    let mut session = open(&repo, now);
    session.submit_answer(card(1).id, true, now).unwrap();
    let outcome = session.submit_answer(card(2).id, false, now).unwrap();
    assert!(matches!(outcome.progress, SessionProgress::Next { remaining: 2, .. }));
    assert!(session.flush(&mut repo).is_clean());

    let stats = repo.course_stats(learner(), course(), now + Duration::hours(1)).unwrap();
    assert_eq!(
        stats,
        ReviewStats {
            total: 4,
            reviewed: 2,
            mastered: 0,
            due: 2,
        }
    );
}

/// The database file is created under the configured directory.
#[test]
fn opens_database_from_config() {
    common::init_tracing();
    let dir = std::env::temp_dir().join(format!("review-store-{}", uuid::Uuid::new_v4()));
    let config = StoreConfig {
        database_path: dir.join("nested").join("progress.db"),
    };

    let repo = SqliteRepository::open_with_config(&config).unwrap();
    drop(repo);
    assert!(config.database_path.exists());

    std::fs::remove_dir_all(&dir).ok();
}
