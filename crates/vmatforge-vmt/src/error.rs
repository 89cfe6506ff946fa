//! Error types for descriptor parsing and VMAT serialization.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for VMT operations.
#[derive(Debug, Error)]
pub enum VmtError {
    /// The descriptor file could not be opened or read. Callers treat this
    /// as terminal for the affected job: it is logged and never retried.
    #[error("unable to open or parse {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing a VMAT document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
