//! Persisted run state
//!
//! After each run the reconciler records which candidate transactions it
//! could not fold into a committed group. The next run compares its fresh
//! candidate set against this record and skips the oracle entirely when
//! nothing changed. On disk the state is a bare JSON array of integer IDs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ReimburseError;
use crate::models::TransactionId;

use super::file_io::{read_json, write_json_atomic};

/// The set of transactions left unprocessed by a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    unprocessed: BTreeSet<TransactionId>,
}

impl RunState {
    pub fn new(unprocessed: impl IntoIterator<Item = TransactionId>) -> Self {
        Self {
            unprocessed: unprocessed.into_iter().collect(),
        }
    }

    pub fn unprocessed(&self) -> &BTreeSet<TransactionId> {
        &self.unprocessed
    }

    pub fn is_empty(&self) -> bool {
        self.unprocessed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.unprocessed.len()
    }

    /// Set equality against a fresh candidate set; order is irrelevant
    pub fn matches(&self, candidates: &BTreeSet<TransactionId>) -> bool {
        &self.unprocessed == candidates
    }
}

/// Reads and writes [`RunState`] at a fixed path
pub struct RunStateStore {
    path: PathBuf,
}

impl RunStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last run's state; a missing file is an empty set
    pub fn load(&self) -> Result<RunState, ReimburseError> {
        let ids: Vec<TransactionId> = read_json(&self.path)?;
        Ok(RunState::new(ids))
    }

    /// Overwrite the stored state atomically
    pub fn save(&self, state: &RunState) -> Result<(), ReimburseError> {
        let ids: Vec<TransactionId> = state.unprocessed.iter().copied().collect();
        write_json_atomic(&self.path, &ids)
    }

    /// Remove the stored state; returns whether a file was deleted
    pub fn reset(&self) -> Result<bool, ReimburseError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ReimburseError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
