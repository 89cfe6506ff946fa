//! Job execution: parse, plan, back up, derive textures, write the VMAT.
//!
//! One runner instance is shared by every worker. Each job touches only its
//! own descriptor and texture files, so no cross-job synchronization is
//! needed beyond the shared log.

use std::path::{Path, PathBuf};
use std::time::Instant;

use vmatforge_texture::io::{load_rgb, write_gray, write_rgb, TextureIoError};
use vmatforge_texture::roughness::{apply_shiny_floor, roughness_from_albedo};
use vmatforge_texture::ssbump::{ssbump_to_height, ssbump_to_normal};
use vmatforge_vmt::parse_file;

use crate::config::ConvertConfig;
use crate::job::{ConversionJob, JobError, JobReport, Severity};
use crate::log::ConversionLog;
use crate::mapper::{plan_job, Derivation};
use crate::scheduler::JobRunner;
use crate::transfer::{copy_with_retry, TransferError};

/// Executes conversion jobs against the filesystem.
pub struct ConversionRunner<'a> {
    config: &'a ConvertConfig,
    log: &'a ConversionLog,
}

impl<'a> ConversionRunner<'a> {
    pub fn new(config: &'a ConvertConfig, log: &'a ConversionLog) -> Self {
        Self { config, log }
    }

    fn execute(&self, job: &ConversionJob) -> Result<JobReport, JobError> {
        let start = Instant::now();
        let descriptor = parse_file(&job.source)?;
        let plan = plan_job(&descriptor, self.config);
        let mut outputs = Vec::new();

        // Mirror the original before any output is written, so a failed run
        // never leaves the tree without its pristine descriptor.
        if let Some(backup_root) = &self.config.backup_root {
            let backup = backup_root.join(&job.relative);
            copy_with_retry(&job.source, &backup, self.config.retry_delay, self.log)
                .map_err(|err| transfer_error(&job.source, err))?;
        }

        for derivation in &plan.derivations {
            self.derive(derivation, &mut outputs)?;
        }

        let vmat_path = job.source.with_extension("vmat");
        plan.vmat
            .write_to(&vmat_path)
            .map_err(|err| write_error(&vmat_path, err))?;
        outputs.push(vmat_path);

        // Safe to drop the original now: the backup (if any) and all outputs
        // are on disk.
        if self.config.remove_originals {
            std::fs::remove_file(&job.source).map_err(|err| write_error(&job.source, err))?;
        }

        let mut lines = vec![format!("Processing VMT file: {}", job.source.display())];
        for diag in &plan.diagnostics {
            lines.push(match diag.severity {
                Severity::Info => format!("  {}", diag.message),
                Severity::Warning => format!("+ WARNING: {}", diag.message),
                Severity::Error => format!("ERROR: {}", diag.message),
            });
        }
        self.log.entry(&lines);

        Ok(JobReport {
            outputs,
            diagnostics: plan.diagnostics,
            duration: start.elapsed(),
        })
    }

    fn derive(&self, derivation: &Derivation, outputs: &mut Vec<PathBuf>) -> Result<(), JobError> {
        let format = self.config.output_format;
        match derivation {
            Derivation::Roughness { source, output } => {
                let albedo = load_rgb(source).map_err(|err| texture_error(source, err))?;
                let mut map = roughness_from_albedo(&albedo, self.config.darkness);
                if self.config.shiny_boost {
                    apply_shiny_floor(&mut map);
                }
                write_gray(&map, output, format).map_err(|err| texture_error(output, err))?;
                outputs.push(output.clone());
            }
            Derivation::SsbumpMaps {
                source,
                normal,
                height,
            } => {
                let ssbump = load_rgb(source).map_err(|err| texture_error(source, err))?;
                write_rgb(&ssbump_to_normal(&ssbump), normal, format)
                    .map_err(|err| texture_error(normal, err))?;
                outputs.push(normal.clone());
                if let Some(height) = height {
                    write_gray(&ssbump_to_height(&ssbump), height, format)
                        .map_err(|err| texture_error(height, err))?;
                    outputs.push(height.clone());
                }
            }
            Derivation::Reexport { source, output } => {
                let texture = load_rgb(source).map_err(|err| texture_error(source, err))?;
                write_rgb(&texture, output, format).map_err(|err| texture_error(output, err))?;
                outputs.push(output.clone());
            }
        }
        Ok(())
    }
}

impl JobRunner for ConversionRunner<'_> {
    fn run(&self, job: &ConversionJob) -> Result<JobReport, JobError> {
        self.execute(job).inspect_err(|err| {
            self.log
                .error(format!("{}: {}", job.source.display(), err));
        })
    }
}

fn transfer_error(source: &Path, err: TransferError) -> JobError {
    match err {
        TransferError::Locked { path, attempts } => JobError::Locked { path, attempts },
        TransferError::Io(io) => JobError::Write {
            path: source.to_path_buf(),
            message: io.to_string(),
        },
    }
}

fn texture_error(path: &Path, err: TextureIoError) -> JobError {
    JobError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> JobError {
    JobError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
