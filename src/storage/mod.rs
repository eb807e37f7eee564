//! Storage module for job records
//!
//! This module holds the job table shared by the gateway and the worker:
//! - Creating pending jobs at submission time
//! - Recording each job's single terminal outcome
//! - Sweeping expired jobs to bound memory

mod memory;
mod traits;

pub use memory::MemoryJobStore;
pub use traits::{JobStore, StorageError, StorageResult};
