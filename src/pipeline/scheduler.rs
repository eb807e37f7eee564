//! Job scheduler: FIFO queue drained by a single worker
//!
//! This module handles:
//! - Accepting `(job id, url)` work items without blocking the caller
//! - Draining them strictly one at a time through fetcher + analyzer
//! - Writing exactly one terminal outcome per job to the job store
//! - Sharing the single-fetch guard with synchronous analysis requests

use crate::analysis::{AnalysisResult, Analyzer};
use crate::pipeline::clock::{Clock, SystemClock};
use crate::pipeline::fetcher::PageFetcher;
use crate::state::{JobId, JobState};
use crate::storage::JobStore;
use crate::ProbeError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A unit of queued work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub job_id: JobId,
    pub url: String,
}

/// Scheduler owns the work queue and the single worker that drains it
///
/// Cloning a scheduler yields another handle to the same queue.
///
/// The worker is started on demand by `submit` and exits once the queue is
/// empty. At most one drain runs at a time, and every fetch (queued or
/// synchronous) holds `fetch_gate`, so at most one outbound request is in
/// flight for the whole scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    /// Pending work in submission order
    queue: Mutex<VecDeque<QueueEntry>>,

    /// Set while a drain task is alive
    running: AtomicBool,

    /// Held for the duration of each fetch + analyze
    fetch_gate: tokio::sync::Mutex<()>,

    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Arc<Analyzer>,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    /// Creates a new scheduler using the wall clock
    ///
    /// # Arguments
    ///
    /// * `store` - Where job outcomes are written
    /// * `fetcher` - Retrieves target pages
    /// * `analyzer` - Runs GTM detection over fetched pages
    pub fn new(
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn PageFetcher>,
        analyzer: Arc<Analyzer>,
    ) -> Self {
        Self::with_clock(store, fetcher, analyzer, Arc::new(SystemClock))
    }

    /// Creates a new scheduler with an explicit clock
    pub fn with_clock(
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn PageFetcher>,
        analyzer: Arc<Analyzer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::new()),
                running: AtomicBool::new(false),
                fetch_gate: tokio::sync::Mutex::new(()),
                store,
                fetcher,
                analyzer,
                clock,
            }),
        }
    }

    /// Queues a job and makes sure the worker is running
    ///
    /// Returns immediately; the job must already exist in the store as
    /// `Pending`. Must be called from within a Tokio runtime.
    pub fn submit(&self, job_id: JobId, url: impl Into<String>) {
        let entry = QueueEntry {
            job_id,
            url: url.into(),
        };
        tracing::debug!(job_id = %entry.job_id, url = %entry.url, "Job queued");

        self.inner.lock_queue().push_back(entry);

        // A drain already in progress will pick the entry up
        if !self.inner.running.swap(true, Ordering::AcqRel) {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(Inner::drain(inner));
        }
    }

    /// Fetches and analyzes `url` directly, bypassing the queue
    ///
    /// Waits for the same guard the worker holds, so it never overlaps with
    /// a queued job's fetch.
    pub async fn analyze_now(&self, url: &str) -> Result<AnalysisResult, ProbeError> {
        self.inner.run(url).await
    }

    /// Number of jobs waiting in the queue (excluding the one in progress)
    pub fn queue_len(&self) -> usize {
        self.inner.lock_queue().len()
    }

    /// True while a worker is draining the queue
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// The store this scheduler writes outcomes to
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.inner.store
    }
}

impl Inner {
    // Poisoning is ignored: no queue operation panics mid-update.
    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<QueueEntry>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pop(&self) -> Option<QueueEntry> {
        self.lock_queue().pop_front()
    }

    /// Worker loop: runs until the queue is observed empty
    async fn drain(inner: Arc<Inner>) {
        tracing::debug!("Worker started");

        loop {
            while let Some(entry) = inner.pop() {
                Inner::process(&inner, entry).await;
            }

            inner.running.store(false, Ordering::Release);

            // An entry pushed between the last pop and the store above saw
            // `running == true` and did not spawn a worker; reclaim it here
            // unless another submit already started one.
            if inner.lock_queue().is_empty() || inner.running.swap(true, Ordering::AcqRel) {
                break;
            }
        }

        tracing::debug!("Worker idle");
    }

    /// Runs one entry and records its outcome
    async fn process(inner: &Arc<Inner>, entry: QueueEntry) {
        let QueueEntry { job_id, url } = entry;
        tracing::info!(job_id = %job_id, url = %url, "Processing job");

        // Run in a child task so a panic fails this job instead of the worker
        let task_inner = Arc::clone(inner);
        let task_url = url.clone();
        let outcome = tokio::spawn(async move { task_inner.run(&task_url).await }).await;

        let state = match outcome {
            Ok(Ok(result)) => {
                tracing::info!(
                    job_id = %job_id,
                    gtm_found = result.is_gtm_found,
                    proxified = result.is_proxified,
                    "Job done"
                );
                JobState::Done { result }
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id = %job_id, url = %url, "Job failed: {}", e);
                JobState::failed(e)
            }
            Err(join_error) => {
                tracing::error!(job_id = %job_id, url = %url, "Job aborted: {}", join_error);
                JobState::failed(format!("Analysis aborted: {}", join_error))
            }
        };

        if let Err(e) = inner.store.set(&job_id, state, inner.clock.now()) {
            tracing::error!(job_id = %job_id, "Failed to record job outcome: {}", e);
        }
    }

    /// Fetch + analyze under the single-fetch guard
    async fn run(&self, url: &str) -> Result<AnalysisResult, ProbeError> {
        let _gate = self.fetch_gate.lock().await;
        let html = self.fetcher.fetch(url).await?;
        let result = self.analyzer.analyze(&html, url)?;
        Ok(result)
    }
}
