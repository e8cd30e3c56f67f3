//! Data models for the review scheduler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor assigned to a newly introduced word
pub const INITIAL_EASE: f64 = 2.5;

/// Minimum ease factor allowed
pub const MIN_EASE: f64 = 1.3;

/// Cap on the scheduling interval, in days (100 years). Keeps runaway
/// ease growth from pushing a due date outside chrono's representable
/// range.
pub const MAX_INTERVAL: u32 = 36_500;

/// Default cap on the number of words returned for a review session
pub const DEFAULT_REVIEW_LIMIT: usize = 10;

/// Spaced repetition state for one learner-word pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Opaque identifier of the vocabulary word
    pub word_id: String,
    /// Opaque identifier of the learner who owns this state
    pub owner_id: String,
    /// Current interval in days
    pub interval: u32,
    /// SM-2 ease factor (starts at 2.5, never below 1.3)
    pub ease: f64,
    /// When the word becomes eligible for review
    pub due_at: DateTime<Utc>,
    /// Total number of reviews recorded
    #[serde(default)]
    pub review_count: u32,
    /// When the word was first introduced
    pub created_at: DateTime<Utc>,
}

impl ReviewState {
    /// Initial state for a word introduced at `created_at`:
    /// due immediately, default ease, no reviews yet.
    pub fn new(
        owner_id: impl Into<String>,
        word_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            word_id: word_id.into(),
            owner_id: owner_id.into(),
            interval: 0,
            ease: INITIAL_EASE,
            due_at: created_at,
            review_count: 0,
            created_at,
        }
    }

    /// Check if the word is eligible for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// Review workload summary for one learner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_words: usize,
    /// Words currently eligible for review
    pub due_words: usize,
    /// Words introduced but never reviewed
    pub new_words: usize,
}
