/// Job state definitions for tracking analysis progress
///
/// A job starts `Pending` and is moved exactly once to `Done` or `Error`.
use crate::analysis::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Coarse status of a job, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Accepted and waiting for (or undergoing) processing
    Pending,

    /// Analysis completed and a result is available
    Done,

    /// Fetch or analysis failed; an error message is available
    Error,
}

impl JobStatus {
    /// Returns true if no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Wire representation used in result responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Parses the wire representation
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a job together with its outcome
///
/// Serializes to `{"status":"pending"}`, `{"status":"done","result":{..}}`
/// or `{"status":"error","error":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Done { result: AnalysisResult },
    Error { error: String },
}

impl JobState {
    /// Builds a terminal error state from any displayable failure
    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Error {
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            Self::Pending => JobStatus::Pending,
            Self::Done { .. } => JobStatus::Done,
            Self::Error { .. } => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// The analysis result, present iff the job is `Done`
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Done { result } => Some(result),
            _ => None,
        }
    }

    /// The error message, present iff the job is `Error`
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// A job as held by the job store
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub state: JobState,

    #[serde(skip)]
    pub created_at: DateTime<Utc>,

    #[serde(skip)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Creates a freshly submitted job
    pub fn pending(now: DateTime<Utc>) -> Self {
        Self {
            state: JobState::Pending,
            created_at: now,
            finished_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }
}
