//! Retrying copy/move with busy-file detection.
//!
//! Used by the job runner for backing up originals and re-exporting
//! textures. Copies probe the source for an external-process lock first;
//! a locked source is retried after a fixed delay up to [`RETRY_LIMIT`]
//! attempts, with a warning per retry and an error on exhaustion. Moves
//! follow the same bounded-retry discipline without the probe.

use std::path::Path;
use std::time::Duration;

use fs2::FileExt;
use thiserror::Error;

use crate::log::ConversionLog;

/// Maximum attempts per transfer operation.
pub const RETRY_LIMIT: u32 = 5;

/// Errors from transfer operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The source stayed locked by another process through every attempt.
    #[error("{path} still locked after {attempts} attempts")]
    Locked { path: std::path::PathBuf, attempts: u32 },

    /// The operation itself failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Probes whether another process holds a lock on the file.
fn is_locked(path: &Path) -> std::io::Result<bool> {
    let file = std::fs::File::open(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = file.unlock();
            Ok(false)
        }
        Err(err) if err.kind() == fs2::lock_contended_error().kind() => Ok(true),
        Err(err) => Err(err),
    }
}

/// Copies `src` to `dst`, retrying while the source is locked.
///
/// The parent directory of `dst` is created if needed. Returns the number
/// of bytes copied.
pub fn copy_with_retry(
    src: &Path,
    dst: &Path,
    delay: Duration,
    log: &ConversionLog,
) -> Result<u64, TransferError> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    for attempt in 1..=RETRY_LIMIT {
        if is_locked(src)? {
            log.warning(format!(
                "{} is locked by another process (attempt {}/{})",
                src.display(),
                attempt,
                RETRY_LIMIT
            ));
            std::thread::sleep(delay);
            continue;
        }
        return Ok(std::fs::copy(src, dst)?);
    }

    log.error(format!(
        "{} still locked after {} attempts, giving up",
        src.display(),
        RETRY_LIMIT
    ));
    Err(TransferError::Locked {
        path: src.to_path_buf(),
        attempts: RETRY_LIMIT,
    })
}

/// Moves `src` to `dst` with bounded retries and no lock probe.
///
/// Falls back to copy-and-remove when a direct rename fails (e.g. across
/// filesystems).
pub fn move_with_retry(
    src: &Path,
    dst: &Path,
    delay: Duration,
    log: &ConversionLog,
) -> Result<(), TransferError> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut last_err: Option<std::io::Error> = None;
    for attempt in 1..=RETRY_LIMIT {
        match std::fs::rename(src, dst) {
            Ok(()) => return Ok(()),
            Err(rename_err) => {
                if std::fs::copy(src, dst)
                    .and_then(|_| std::fs::remove_file(src))
                    .is_ok()
                {
                    return Ok(());
                }
                log.warning(format!(
                    "failed to move {} (attempt {}/{}): {}",
                    src.display(),
                    attempt,
                    RETRY_LIMIT,
                    rename_err
                ));
                last_err = Some(rename_err);
                std::thread::sleep(delay);
            }
        }
    }

    log.error(format!(
        "failed to move {} after {} attempts, giving up",
        src.display(),
        RETRY_LIMIT
    ));
    Err(TransferError::Io(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "move failed")
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::ConversionLog;

    fn test_log(dir: &Path) -> ConversionLog {
        ConversionLog::create(&dir.join("log.txt")).unwrap()
    }

    #[test]
    fn test_copy_creates_destination_tree() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(dir.path());
        let src = dir.path().join("wall.vmt");
        std::fs::write(&src, "\"LightmappedGeneric\"\n").unwrap();

        let dst = dir.path().join("backup/brick/wall.vmt");
        let bytes = copy_with_retry(&src, &dst, Duration::from_millis(1), &log).unwrap();
        assert!(bytes > 0);
        assert!(dst.exists());
        // Original untouched.
        assert!(src.exists());
    }

    #[test]
    fn test_copy_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(dir.path());
        let err = copy_with_retry(
            &dir.path().join("missing.vmt"),
            &dir.path().join("out.vmt"),
            Duration::from_millis(1),
            &log,
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::Io(_)));
    }

    #[test]
    fn test_move_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(dir.path());
        let src = dir.path().join("old.vmt");
        std::fs::write(&src, "x").unwrap();

        let dst = dir.path().join("moved/old.vmt");
        move_with_retry(&src, &dst, Duration::from_millis(1), &log).unwrap();
        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[test]
    fn test_locked_source_exhausts_retries() {
        let dir = tempfile::tempdir().unwrap();
        let log = test_log(dir.path());
        let src = dir.path().join("held.png");
        std::fs::write(&src, "pixels").unwrap();

        // Hold an exclusive lock for the whole call.
        let holder = std::fs::File::open(&src).unwrap();
        holder.lock_exclusive().unwrap();

        let result = copy_with_retry(
            &src,
            &dir.path().join("out.png"),
            Duration::from_millis(1),
            &log,
        );
        holder.unlock().unwrap();

        match result {
            Err(TransferError::Locked { attempts, .. }) => assert_eq!(attempts, RETRY_LIMIT),
            other => panic!("expected Locked, got {:?}", other.map(|_| ())),
        }

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("+ WARNING:"));
        assert!(text.contains("ERROR:"));
    }
}
