//! Common test utilities and fixtures for integration tests.

pub mod fixtures;

use review_store::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring RUST_LOG. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory repository seeded with the fixture course.
pub fn seeded_repository() -> SqliteRepository {
    use review_store::CardRepository;

    init_tracing();
    let repo = SqliteRepository::open_in_memory().expect("open in-memory database");
    repo.upsert_cards(&fixtures::course_cards(4))
        .expect("seed cards");
    repo
}
