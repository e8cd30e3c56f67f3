//! Lexis — spaced repetition review core for a vocabulary learning backend
//!
//! The surrounding application (HTTP routes, auth, article generation)
//! is thin glue around this crate: it calls [`ReviewService`] with the
//! learner's feedback or a session request and persists nothing itself.
//! Everything with algorithmic content lives here: SM-2 interval and
//! ease evolution, due-date derivation, and due-set selection.
//!
//! Every operation takes an explicit `now: DateTime<Utc>`, so schedules
//! are deterministic under test without touching the system clock.

pub mod review;

pub use review::{
    due_date_from_interval, next_interval, record_review, select_due, FileStateStore,
    ReviewService, ReviewState, ReviewStats, ScheduleError, ServiceError, StateStore, StoreError,
    Versioned, DEFAULT_REVIEW_LIMIT, INITIAL_EASE, MAX_INTERVAL, MIN_EASE,
};
