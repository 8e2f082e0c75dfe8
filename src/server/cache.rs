//! Run status cache - in-memory map from run id to its latest status
//!
//! Readers never block each other; writes take the lock exclusively. Each run
//! has a single writer (the task driving it), so writes to one id do not race
//! in normal operation.

use crate::state::RunStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when finalizing a run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("run {id} already finished as {status}")]
    AlreadyTerminal { id: Uuid, status: RunStatus },
}

/// The stored state of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub status: RunStatus,
    pub last_updated: DateTime<Utc>,
}

/// Storage for run status records
pub trait RunCache: Send + Sync {
    /// Looks up a run; `None` for unknown ids
    fn get(&self, id: Uuid) -> Option<RunRecord>;

    /// Creates or updates a run record
    ///
    /// Writing the status a run already has changes nothing, including its
    /// timestamp. Any other status overwrites the record and stamps it with
    /// the current time.
    fn upsert(&self, id: Uuid, status: RunStatus);

    /// Writes a status only if the lifecycle allows it
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The record was written (or already held `status`)
    /// * `Err(CacheError::AlreadyTerminal)` - The run already finished with another status
    fn finalize(&self, id: Uuid, status: RunStatus) -> Result<(), CacheError>;
}

/// [`RunCache`] backed by a reader/writer-locked hash map
#[derive(Debug, Default)]
pub struct RunStatusCache {
    runs: RwLock<HashMap<Uuid, RunRecord>>,
}

impl RunStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of runs tracked
    pub fn len(&self) -> usize {
        self.runs.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_record(runs: &mut HashMap<Uuid, RunRecord>, id: Uuid, status: RunStatus) {
        if let Some(record) = runs.get(&id) {
            if record.status == status {
                return;
            }
        }

        runs.insert(
            id,
            RunRecord {
                id,
                status,
                last_updated: Utc::now(),
            },
        );
    }
}

impl RunCache for RunStatusCache {
    fn get(&self, id: Uuid) -> Option<RunRecord> {
        let runs = self.runs.read().unwrap_or_else(|e| e.into_inner());
        runs.get(&id).cloned()
    }

    fn upsert(&self, id: Uuid, status: RunStatus) {
        let mut runs = self.runs.write().unwrap_or_else(|e| e.into_inner());
        Self::write_record(&mut runs, id, status);
    }

    fn finalize(&self, id: Uuid, status: RunStatus) -> Result<(), CacheError> {
        let mut runs = self.runs.write().unwrap_or_else(|e| e.into_inner());

        if let Some(record) = runs.get(&id) {
            if !record.status.can_transition_to(status) {
                return Err(CacheError::AlreadyTerminal {
                    id,
                    status: record.status,
                });
            }
        }

        Self::write_record(&mut runs, id, status);
        Ok(())
    }
}
