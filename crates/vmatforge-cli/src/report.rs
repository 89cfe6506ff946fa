//! Machine-readable run summary.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::job::Severity;
use crate::scheduler::RunOutcome;

/// One permanently failed job in the summary.
#[derive(Debug, Serialize)]
pub struct FailureSummary {
    pub path: PathBuf,
    pub error: String,
}

/// JSON-serializable summary of one conversion run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub source_root: PathBuf,
    pub discovered: usize,
    pub processed: usize,
    pub failed: usize,
    pub retried: usize,
    pub cancelled: bool,
    pub unclaimed: usize,
    pub warnings: usize,
    pub outputs_written: usize,
    pub elapsed_ms: u128,
    pub failures: Vec<FailureSummary>,
}

impl RunSummary {
    /// Builds the summary from a finished run.
    pub fn from_outcome(source_root: &Path, outcome: &RunOutcome) -> Self {
        let warnings = outcome
            .done
            .iter()
            .filter_map(|record| record.result.as_ref().ok())
            .flat_map(|report| &report.diagnostics)
            .filter(|diag| diag.severity == Severity::Warning)
            .count();
        let outputs_written = outcome
            .done
            .iter()
            .filter_map(|record| record.result.as_ref().ok())
            .map(|report| report.outputs.len())
            .sum();

        Self {
            source_root: source_root.to_path_buf(),
            discovered: outcome.discovered,
            processed: outcome.processed,
            failed: outcome.failed.len(),
            retried: outcome.retried,
            cancelled: outcome.cancelled,
            unclaimed: outcome.unclaimed,
            warnings,
            outputs_written,
            elapsed_ms: outcome.elapsed.as_millis(),
            failures: outcome
                .failed
                .iter()
                .map(|record| FailureSummary {
                    path: record.job.source.clone(),
                    error: record
                        .result
                        .as_ref()
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }

    /// Writes the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::job::{ConversionJob, Diagnostic, JobError, JobRecord, JobReport};

    fn outcome() -> RunOutcome {
        let done = vec![JobRecord {
            job: ConversionJob::new("/m/a.vmt", "a.vmt"),
            result: Ok(JobReport {
                outputs: vec!["/m/a.vmat".into(), "/m/a_roughness.png".into()],
                diagnostics: vec![Diagnostic::warning("texture file for 'x' not found")],
                duration: Duration::from_millis(3),
            }),
        }];
        let failed = vec![JobRecord {
            job: ConversionJob::new("/m/b.vmt", "b.vmt"),
            result: Err(JobError::Write {
                path: "/m/b.vmat".into(),
                message: "disk full".into(),
            }),
        }];
        RunOutcome {
            discovered: 3,
            processed: 1,
            done,
            failed,
            retried: 1,
            cancelled: false,
            unclaimed: 1,
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_outcome(Path::new("/m"), &outcome());
        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.outputs_written, 2);
        assert_eq!(summary.failures[0].path, PathBuf::from("/m/b.vmt"));
        assert!(summary.failures[0].error.contains("disk full"));
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary::from_outcome(Path::new("/m"), &outcome());
        summary.write_json(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["discovered"], 3);
        assert_eq!(parsed["cancelled"], false);
    }
}
