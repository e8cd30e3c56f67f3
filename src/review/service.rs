//! Review service — the surface the surrounding backend calls
//!
//! The route layer hands feedback and session requests to [`ReviewService`]
//! and owns everything else (auth, transport, retry on contention). The
//! store is injected, never a module-level global, so its lifecycle belongs
//! to process startup.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::algorithm::{record_review, ScheduleError};
use super::models::{ReviewState, ReviewStats, DEFAULT_REVIEW_LIMIT};
use super::selector::select_due;
use super::store::{StateStore, StoreError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Quality recorded when a learner re-marks a word they already have:
/// the tap means "still unfamiliar", graded as a failed review
const REMARK_QUALITY: u8 = 2;

/// Review scheduling service for one injected state store
pub struct ReviewService<S: StateStore> {
    store: S,
}

impl<S: StateStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Introduce a word to a learner: due immediately, default ease
    ///
    /// Introducing a word the learner already has is an
    /// [`StoreError::AlreadyExists`] error; use [`Self::mark_unfamiliar`]
    /// for repeat encounters.
    pub fn introduce(
        &self,
        owner_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let stored = self.store.insert(ReviewState::new(owner_id, word_id, now))?;
        log::info!("introduced word '{}' for owner '{}'", word_id, owner_id);
        Ok(stored.record)
    }

    /// Record a learner's feedback (quality 0-5) for one word
    ///
    /// Fetches the current state, computes the next schedule, and writes it
    /// back with a single compare-and-swap. A [`StoreError::Conflict`] means
    /// another submission won the race; the caller retries against the
    /// freshly stored state. No retry happens here.
    pub fn submit_feedback(
        &self,
        owner_id: &str,
        word_id: &str,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let current = self
            .store
            .get(owner_id, word_id)?
            .ok_or_else(|| StoreError::NotFound {
                owner_id: owner_id.to_string(),
                word_id: word_id.to_string(),
            })?;

        let updated = record_review(&current.record, quality, now)?;
        let stored = self.store.compare_and_swap(updated, current.version)?;

        log::debug!(
            "review recorded for word '{}' of owner '{}': quality {}, next interval {} day(s)",
            word_id,
            owner_id,
            quality,
            stored.record.interval
        );
        Ok(stored.record)
    }

    /// Re-marking an already-introduced word counts as a failed review,
    /// pulling it back to tomorrow's schedule
    pub fn mark_unfamiliar(
        &self,
        owner_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        self.submit_feedback(owner_id, word_id, REMARK_QUALITY, now)
    }

    /// Words eligible for review at `now`, earliest-overdue first,
    /// capped at `limit` (default 10)
    pub fn words_to_review(
        &self,
        owner_id: &str,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<ReviewState>> {
        let due = self.store.due_before(owner_id, now)?;
        Ok(select_due(&due, now, limit.unwrap_or(DEFAULT_REVIEW_LIMIT)))
    }

    /// Workload summary for a learner
    pub fn review_stats(&self, owner_id: &str, now: DateTime<Utc>) -> Result<ReviewStats> {
        let states = self.store.list_owner(owner_id)?;

        let mut stats = ReviewStats {
            total_words: states.len(),
            ..ReviewStats::default()
        };
        for state in &states {
            if state.review_count == 0 {
                stats.new_words += 1;
            }
            if state.is_due(now) {
                stats.due_words += 1;
            }
        }

        Ok(stats)
    }
}
