//! Persistence collaborator for review state
//!
//! Directory structure:
//! ```text
//! {base}/owners/{owner-id}/{word-id}.json
//! ```
//! Owner and word identifiers are opaque strings (the backend uses the
//! word itself and the learner's auth subject), so both path components
//! are percent-encoded.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::ReviewState;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no review state for word '{word_id}' of owner '{owner_id}'")]
    NotFound { owner_id: String, word_id: String },

    #[error("review state for word '{word_id}' of owner '{owner_id}' already exists")]
    AlreadyExists { owner_id: String, word_id: String },

    #[error(
        "concurrent update to word '{word_id}' of owner '{owner_id}': \
         expected version {expected}, found {found}"
    )]
    Conflict {
        owner_id: String,
        word_id: String,
        expected: u64,
        found: u64,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A stored record together with its optimistic-concurrency version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    #[serde(flatten)]
    pub record: T,
}

/// Storage contract for review state, keyed by (owner, word)
///
/// Updates go through compare-and-swap on a per-record version. That is
/// the serialization contract for concurrent feedback on the same word:
/// two submissions that both read version N cannot both write, so a
/// review is never double-counted or silently overwritten. After a
/// [`StoreError::Conflict`] the caller retries with a freshly fetched
/// state. Updates to different words are independent.
pub trait StateStore {
    /// Fetch a state with its current version, or `None` if the word was
    /// never introduced to this owner.
    fn get(&self, owner_id: &str, word_id: &str) -> Result<Option<Versioned<ReviewState>>>;

    /// Persist the initial state for a newly introduced word at version 0
    fn insert(&self, state: ReviewState) -> Result<Versioned<ReviewState>>;

    /// Overwrite a state only if the stored version still equals
    /// `expected_version`; the stored version is incremented on success
    fn compare_and_swap(
        &self,
        state: ReviewState,
        expected_version: u64,
    ) -> Result<Versioned<ReviewState>>;

    /// All of the owner's states with `due_at <= cutoff`, ascending by due date
    fn due_before(&self, owner_id: &str, cutoff: DateTime<Utc>) -> Result<Vec<ReviewState>>;

    /// All of the owner's states, in no particular order
    fn list_owner(&self, owner_id: &str) -> Result<Vec<ReviewState>>;
}

/// JSON-file-backed [`StateStore`]
///
/// Mutations are serialized by an internal mutex, so the
/// compare-and-swap contract holds across every handle that shares this
/// store. A given base path must be owned by one store instance per
/// process.
pub struct FileStateStore {
    /// Base path for review data (e.g. {data_dir}/review)
    base_path: PathBuf,
    /// Held across every read-check-write sequence
    write_lock: Mutex<()>,
}

impl FileStateStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            write_lock: Mutex::new(()),
        }
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.base_path
            .join("owners")
            .join(urlencoding::encode(owner_id).into_owned())
    }

    fn state_path(&self, owner_id: &str, word_id: &str) -> PathBuf {
        self.owner_dir(owner_id)
            .join(format!("{}.json", urlencoding::encode(word_id)))
    }

    fn read_state(path: &Path) -> Result<Versioned<ReviewState>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_state(path: &Path, versioned: &Versioned<ReviewState>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(versioned)?)?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, owner_id: &str, word_id: &str) -> Result<Option<Versioned<ReviewState>>> {
        let path = self.state_path(owner_id, word_id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_state(&path).map(Some)
    }

    fn insert(&self, state: ReviewState) -> Result<Versioned<ReviewState>> {
        let _guard = self.write_lock.lock().unwrap();

        let path = self.state_path(&state.owner_id, &state.word_id);
        if path.exists() {
            return Err(StoreError::AlreadyExists {
                owner_id: state.owner_id,
                word_id: state.word_id,
            });
        }

        fs::create_dir_all(self.owner_dir(&state.owner_id))?;

        let versioned = Versioned {
            version: 0,
            record: state,
        };
        Self::write_state(&path, &versioned)?;
        Ok(versioned)
    }

    fn compare_and_swap(
        &self,
        state: ReviewState,
        expected_version: u64,
    ) -> Result<Versioned<ReviewState>> {
        let _guard = self.write_lock.lock().unwrap();

        let path = self.state_path(&state.owner_id, &state.word_id);
        if !path.exists() {
            return Err(StoreError::NotFound {
                owner_id: state.owner_id,
                word_id: state.word_id,
            });
        }

        let current = Self::read_state(&path)?;
        if current.version != expected_version {
            log::warn!(
                "stale update for word '{}' of owner '{}' (expected version {}, found {})",
                state.word_id,
                state.owner_id,
                expected_version,
                current.version
            );
            return Err(StoreError::Conflict {
                owner_id: state.owner_id,
                word_id: state.word_id,
                expected: expected_version,
                found: current.version,
            });
        }

        let versioned = Versioned {
            version: expected_version + 1,
            record: state,
        };
        Self::write_state(&path, &versioned)?;
        Ok(versioned)
    }

    fn due_before(&self, owner_id: &str, cutoff: DateTime<Utc>) -> Result<Vec<ReviewState>> {
        let mut due: Vec<ReviewState> = self
            .list_owner(owner_id)?
            .into_iter()
            .filter(|state| state.due_at <= cutoff)
            .collect();

        due.sort_by(|a, b| a.due_at.cmp(&b.due_at));
        Ok(due)
    }

    fn list_owner(&self, owner_id: &str) -> Result<Vec<ReviewState>> {
        let dir = self.owner_dir(owner_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut states = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let versioned = Self::read_state(&path)?;
                states.push(versioned.record);
            }
        }

        Ok(states)
    }
}
