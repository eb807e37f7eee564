//! Job pipeline: page fetching and the single-worker scheduler
//!
//! This module contains the asynchronous processing path, including:
//! - HTTP fetching with a hard timeout
//! - The FIFO job queue and its worker loop
//! - The clock used for job timestamps
//! - The background retention sweep for finished jobs

mod clock;
mod fetcher;
mod retention;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use retention::{spawn_retention_sweeper, sweep_once};
pub use scheduler::{QueueEntry, Scheduler};
