//! Conversion job types and per-job error kinds.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vmatforge_vmt::VmtError;

/// Lifecycle of a single job: `pending -> running -> {done, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

/// One descriptor file discovered at scan time.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Absolute path of the source descriptor.
    pub source: PathBuf,
    /// Path relative to the material root, used for backup mirroring and
    /// material-relative output paths.
    pub relative: PathBuf,
    /// Current lifecycle state.
    pub status: JobStatus,
}

impl ConversionJob {
    /// Creates a pending job.
    pub fn new(source: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            relative: relative.into(),
            status: JobStatus::Pending,
        }
    }
}

/// Severity of a per-job diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One diagnostic line recorded while processing a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// What a successful job produced.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    /// Files written (descriptor, derived textures, re-exports).
    pub outputs: Vec<PathBuf>,
    /// Diagnostics collected along the way (missing textures etc.).
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock processing time.
    pub duration: Duration,
}

/// Errors that fail a job.
///
/// A missing prerequisite texture is deliberately NOT an error: the
/// dependent output fields are omitted and a warning diagnostic is recorded,
/// but the job still succeeds.
#[derive(Debug, Error)]
pub enum JobError {
    /// Unreadable or malformed descriptor. Terminal; never requeued.
    #[error(transparent)]
    Parse(#[from] VmtError),

    /// A transfer source stayed locked through every retry.
    #[error("file locked after {attempts} attempts: {path}")]
    Locked { path: PathBuf, attempts: u32 },

    /// An output descriptor or derived texture could not be written.
    #[error("write failure on {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl JobError {
    /// Whether this failure is eligible for the second scheduling pass.
    pub fn retryable(&self) -> bool {
        match self {
            JobError::Parse(_) => false,
            JobError::Locked { .. } | JobError::Write { .. } => true,
        }
    }
}

/// Terminal record for one job after the pool is done with it.
#[derive(Debug)]
pub struct JobRecord {
    pub job: ConversionJob,
    pub result: Result<JobReport, JobError>,
}
