//! Append-only conversion log shared by all workers.
//!
//! One textual entry per processed descriptor: found attributes, missing
//! parameter warnings, errors. Lines are flushed as they are written so a
//! crash mid-run leaves a usable log behind.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the run log, created in the source root.
pub const LOG_FILE_NAME: &str = "conversion_log.txt";

/// Thread-safe line-oriented log writer.
pub struct ConversionLog {
    path: PathBuf,
    writer: Mutex<BufWriter<std::fs::File>>,
}

impl ConversionLog {
    /// Creates (truncating) the log file and writes the header.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        let log = Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        };
        log.line("Conversion Log");
        log.line("====================");
        Ok(log)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line and flushes. Log I/O failures are swallowed: the log
    /// must never take a conversion job down with it.
    pub fn line(&self, text: impl AsRef<str>) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text.as_ref());
            let _ = writer.flush();
        }
    }

    /// Appends a warning line.
    pub fn warning(&self, text: impl AsRef<str>) {
        self.line(format!("+ WARNING: {}", text.as_ref()));
    }

    /// Appends an error line.
    pub fn error(&self, text: impl AsRef<str>) {
        self.line(format!("ERROR: {}", text.as_ref()));
    }

    /// Appends a multi-line entry atomically with respect to other workers.
    pub fn entry(&self, lines: &[String]) {
        if let Ok(mut writer) = self.writer.lock() {
            for line in lines {
                let _ = writeln!(writer, "{}", line);
            }
            let _ = writer.flush();
        }
    }
}
