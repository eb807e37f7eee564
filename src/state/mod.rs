//! State module for tracking job progress
//!
//! # Components
//!
//! - `JobId`: Opaque, unguessable job identifier
//! - `JobStatus` / `JobState`: Lifecycle of a job (`Pending -> Done | Error`)
//! - `JobRecord`: A job as stored, with its timestamps

mod job_id;
mod job_state;

// Re-export main types
pub use job_id::JobId;
pub use job_state::{JobRecord, JobState, JobStatus};
