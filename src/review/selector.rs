//! Due-set selection for review sessions

use chrono::{DateTime, Utc};

use super::models::ReviewState;

/// Select up to `limit` words eligible for review at `now`
///
/// Eligible means `due_at <= now`. The result is ordered earliest-overdue
/// first; ties keep the input order (stable sort), since SM-2 gives no
/// signal to prefer one equally-due word over another. An empty result is
/// a normal outcome, not an error.
pub fn select_due(states: &[ReviewState], now: DateTime<Utc>, limit: usize) -> Vec<ReviewState> {
    let mut due: Vec<ReviewState> = states
        .iter()
        .filter(|state| state.is_due(now))
        .cloned()
        .collect();

    due.sort_by(|a, b| a.due_at.cmp(&b.due_at));
    due.truncate(limit);
    due
}
