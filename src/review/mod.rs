//! Spaced repetition review core
//!
//! This module provides:
//! - SM-2 interval and ease scheduling (`algorithm`)
//! - Due-set selection for review sessions (`selector`)
//! - Review state models (`models`)
//! - The persistence collaborator contract and a JSON file store (`store`)
//! - The service surface called by the surrounding backend (`service`)

pub mod algorithm;
pub mod models;
pub mod selector;
pub mod service;
pub mod store;

pub use algorithm::{due_date_from_interval, next_interval, record_review, ScheduleError};
pub use models::{
    ReviewState, ReviewStats, DEFAULT_REVIEW_LIMIT, INITIAL_EASE, MAX_INTERVAL, MIN_EASE,
};
pub use selector::select_due;
pub use service::{ReviewService, ServiceError};
pub use store::{FileStateStore, StateStore, StoreError, Versioned};
