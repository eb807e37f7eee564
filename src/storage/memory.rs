//! In-memory job store
//!
//! Jobs live for the lifetime of the process only. Memory is bounded by the
//! retention sweep the server runs in the background.

use crate::state::{JobId, JobRecord, JobState};
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Job store backed by a `HashMap` behind a read/write lock
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: every write leaves the map consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, id: &JobId, now: DateTime<Utc>) -> StorageResult<()> {
        let mut jobs = self.write();
        if jobs.contains_key(id) {
            return Err(StorageError::DuplicateJob(id.clone()));
        }
        jobs.insert(id.clone(), JobRecord::pending(now));
        Ok(())
    }

    fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.read().get(id).cloned()
    }

    fn set(&self, id: &JobId, state: JobState, now: DateTime<Utc>) -> StorageResult<()> {
        if !state.is_terminal() {
            return Err(StorageError::NotTerminal(id.clone()));
        }

        let mut jobs = self.write();
        let record = jobs
            .get_mut(id)
            .ok_or_else(|| StorageError::JobNotFound(id.clone()))?;

        if record.state.is_terminal() {
            return Err(StorageError::AlreadyCompleted {
                id: id.clone(),
                status: record.status(),
            });
        }

        record.state = state;
        record.finished_at = Some(now);
        Ok(())
    }

    fn sweep_expired(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let mut jobs = self.write();
        let before = jobs.len();
        jobs.retain(|_, record| match record.finished_at {
            Some(finished) => now - finished <= max_age,
            None => true,
        });
        before - jobs.len()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
