//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! optimal review intervals based on learner performance.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing the answer, remembered
//! - 2: Incorrect, but the answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! All functions take an explicit `now` so schedules are reproducible
//! under test without patching the system clock.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::models::{ReviewState, MAX_INTERVAL, MIN_EASE};

/// Invalid scheduling input. Bad inputs are rejected rather than clamped,
/// so bugs in quality-signal capture upstream surface instead of silently
/// corrupting a learner's schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(u8),

    #[error("ease factor must be positive and finite, got {0}")]
    InvalidEase(f64),
}

/// Calculate the next review interval and ease factor using SM-2
///
/// # Arguments
/// * `prior_interval` - Interval in days as last computed (0 for a new word)
/// * `quality` - Quality rating (0-5)
/// * `prior_ease` - Current ease factor
///
/// # Returns
/// `(new_interval, new_ease)` with `new_ease >= 1.3` and
/// `new_interval <= MAX_INTERVAL`
pub fn next_interval(
    prior_interval: u32,
    quality: u8,
    prior_ease: f64,
) -> Result<(u32, f64), ScheduleError> {
    if quality > 5 {
        return Err(ScheduleError::InvalidQuality(quality));
    }
    if !prior_ease.is_finite() || prior_ease <= 0.0 {
        return Err(ScheduleError::InvalidEase(prior_ease));
    }

    let new_interval = if quality < 3 {
        // Failed recall always resets the schedule to tomorrow, no matter
        // how long the prior interval was
        1
    } else {
        match prior_interval {
            // First successful review: 1 day
            0 => 1,
            // Second successful review: fixed jump to 6 days; multiplying a
            // 1-day interval by any reasonable ease would under-space it
            1 => 6,
            // Subsequent reviews: multiply by ease, truncated toward
            // zero and capped at MAX_INTERVAL
            n => ((n as f64 * prior_ease) as u32).min(MAX_INTERVAL),
        }
    };

    // Update ease factor based on quality, on every branch:
    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let q = quality as f64;
    let mut new_ease = prior_ease + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));

    // A perfect grade on a word still in its graduation phase is a weak
    // signal; cap the ease growth at a small fixed bump
    if quality == 5 && prior_interval < 6 {
        new_ease = prior_ease + 0.05;
    }

    // Ease factor never falls below the floor
    if new_ease < MIN_EASE {
        new_ease = MIN_EASE;
    }

    Ok((new_interval, new_ease))
}

/// Due date for a word reviewed at `now` with the given interval.
/// An interval of 0 means the word is due immediately.
pub fn due_date_from_interval(interval: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(i64::from(interval))
}

/// Record one review of a word and return its updated state
///
/// This is the primary entry point for feedback: it computes the next
/// interval and ease, derives the due date from `now`, and bumps the
/// review count. Pure; persisting the result is the caller's concern.
pub fn record_review(
    state: &ReviewState,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<ReviewState, ScheduleError> {
    let (interval, ease) = next_interval(state.interval, quality, state.ease)?;

    Ok(ReviewState {
        interval,
        ease,
        due_at: due_date_from_interval(interval, now),
        review_count: state.review_count + 1,
        ..state.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_successful_review_graduates_to_one_day() {
        // quality 4 from a fresh state: interval 1, ease delta is exactly 0
        let (interval, ease) = next_interval(0, 4, 2.5).unwrap();
        assert_eq!(interval, 1);
        assert!(approx_eq(ease, 2.5));
    }

    #[test]
    fn test_second_successful_review_jumps_to_six_days() {
        let (interval, ease) = next_interval(1, 5, 2.5).unwrap();
        assert_eq!(interval, 6);
        // early-graduation damping: +0.05 instead of the formula's +0.1
        assert!(approx_eq(ease, 2.55));
    }

    #[test]
    fn test_failed_recall_resets_interval() {
        let (interval, ease) = next_interval(10, 2, 2.0).unwrap();
        assert_eq!(interval, 1);
        // 0.1 - 3 * (0.08 + 3 * 0.02) = -0.32
        assert!(approx_eq(ease, 1.68));

        for quality in 0..3 {
            for prior in [0, 1, 6, 365] {
                let (interval, _) = next_interval(prior, quality, 2.5).unwrap();
                assert_eq!(interval, 1);
            }
        }
    }

    #[test]
    fn test_exponential_growth_truncates() {
        let (interval, _) = next_interval(10, 4, 2.5).unwrap();
        assert_eq!(interval, 25);

        // 6 * 1.3 = 7.8 truncates to 7, not 8
        let (interval, _) = next_interval(6, 3, 1.3).unwrap();
        assert_eq!(interval, 7);
    }

    #[test]
    fn test_interval_capped_at_maximum() {
        let (interval, _) = next_interval(u32::MAX, 4, 2.5).unwrap();
        assert_eq!(interval, MAX_INTERVAL);

        // a capped interval still yields a representable due date
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(due_date_from_interval(interval, now) > now);
    }

    #[test]
    fn test_ease_floor_holds_for_all_qualities() {
        for quality in 0..=5 {
            for prior_ease in [1.3, 1.31, 2.5] {
                let (_, ease) = next_interval(10, quality, prior_ease).unwrap();
                assert!(ease >= MIN_EASE, "quality {} ease {}", quality, ease);
            }
        }
    }

    #[test]
    fn test_early_damping_only_in_graduation_phase() {
        // interval 5 is still early: damped
        let (_, ease) = next_interval(5, 5, 2.0).unwrap();
        assert!(approx_eq(ease, 2.05));

        // interval 6 is past graduation: full +0.1 from the formula
        let (_, ease) = next_interval(6, 5, 2.0).unwrap();
        assert!(approx_eq(ease, 2.1));

        // damping never bypasses the floor
        let (_, ease) = next_interval(2, 5, 1.0000001).unwrap();
        assert!(ease >= MIN_EASE);
    }

    #[test]
    fn test_quality_three_lowers_ease() {
        // 0.1 - 2 * (0.08 + 2 * 0.02) = -0.14
        let (_, ease) = next_interval(10, 3, 2.5).unwrap();
        assert!(approx_eq(ease, 2.36));
    }

    #[test]
    fn test_invalid_quality_rejected() {
        assert_eq!(
            next_interval(0, 6, 2.5),
            Err(ScheduleError::InvalidQuality(6))
        );
        assert_eq!(
            next_interval(3, 255, 2.5),
            Err(ScheduleError::InvalidQuality(255))
        );
    }

    #[test]
    fn test_invalid_ease_rejected() {
        assert!(matches!(
            next_interval(0, 4, 0.0),
            Err(ScheduleError::InvalidEase(_))
        ));
        assert!(matches!(
            next_interval(0, 4, -1.3),
            Err(ScheduleError::InvalidEase(_))
        ));
        assert!(matches!(
            next_interval(0, 4, f64::NAN),
            Err(ScheduleError::InvalidEase(_))
        ));
    }

    #[test]
    fn test_due_date_from_interval() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(due_date_from_interval(0, now), now);
        assert_eq!(
            due_date_from_interval(1, now),
            Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap()
        );
        assert_eq!(
            due_date_from_interval(30, now),
            Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_record_review_updates_state() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let state = ReviewState::new("owner", "perfunctory", t0);

        let t1 = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let updated = record_review(&state, 4, t1).unwrap();

        assert_eq!(updated.interval, 1);
        assert_eq!(updated.due_at, Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap());
        assert_eq!(updated.review_count, 1);
        assert_eq!(updated.created_at, t0);
        assert_eq!(updated.word_id, "perfunctory");
        assert_eq!(updated.owner_id, "owner");
    }

    #[test]
    fn test_record_review_invalid_quality_leaves_no_trace() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let state = ReviewState::new("owner", "gregarious", t);

        assert!(record_review(&state, 9, t).is_err());
    }

    #[test]
    fn test_graduation_sequence_end_to_end() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut state = ReviewState::new("owner", "loquacious", t0);

        // 0 -> 1 -> 6 -> floor(6 * ease)
        state = record_review(&state, 4, t0).unwrap();
        assert_eq!(state.interval, 1);

        let t1 = state.due_at;
        state = record_review(&state, 4, t1).unwrap();
        assert_eq!(state.interval, 6);

        let t2 = state.due_at;
        state = record_review(&state, 4, t2).unwrap();
        assert_eq!(state.interval, (6.0 * 2.5) as u32);
        assert_eq!(state.review_count, 3);
    }
}
