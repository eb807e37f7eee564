//! Storage traits and error types
//!
//! This module defines the trait interface for job store backends and
//! associated error types.

use crate::state::{JobId, JobRecord, JobState, JobStatus};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Errors that can occur during job store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Job already exists: {0}")]
    DuplicateJob(JobId),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Job {id} already completed with status {status}")]
    AlreadyCompleted { id: JobId, status: JobStatus },

    #[error("Job {0} can only be completed with a terminal state")]
    NotTerminal(JobId),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// Stores are shared between the gateway and the worker loop, so every
/// operation takes `&self` and implementations must be safe to call from
/// several tasks at once.
pub trait JobStore: Send + Sync {
    /// Inserts a new `Pending` job
    ///
    /// Fails with `DuplicateJob` if the identifier is already present.
    fn create(&self, id: &JobId, now: DateTime<Utc>) -> StorageResult<()>;

    /// Returns the current record for a job, if it exists
    fn get(&self, id: &JobId) -> Option<JobRecord>;

    /// Moves a pending job to its terminal state
    ///
    /// Fails with `JobNotFound` for unknown identifiers, `AlreadyCompleted`
    /// if the job already left `Pending`, and `NotTerminal` if `state` is
    /// itself `Pending`.
    fn set(&self, id: &JobId, state: JobState, now: DateTime<Utc>) -> StorageResult<()>;

    /// Removes terminal jobs that finished more than `max_age` before `now`
    ///
    /// Pending jobs are never removed. Returns the number of jobs removed.
    fn sweep_expired(&self, now: DateTime<Utc>, max_age: Duration) -> usize;

    /// Number of jobs currently held
    fn len(&self) -> usize;

    /// Returns true if the store holds no jobs
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
