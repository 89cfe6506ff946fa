//! Batch conversion command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use colored::Colorize;

use crate::config::ConvertConfig;
use crate::log::{ConversionLog, LOG_FILE_NAME};
use crate::report::RunSummary;
use crate::runner::ConversionRunner;
use crate::scan::scan_descriptors;
use crate::scheduler::Scheduler;

/// Runs a full batch conversion over the configured material tree.
pub fn run(config: ConvertConfig, summary_out: Option<&Path>, json: bool) -> Result<ExitCode> {
    ensure!(
        config.source_root.is_dir(),
        "source root {} is not a directory",
        config.source_root.display()
    );

    let jobs = scan_descriptors(&config.source_root);
    if jobs.is_empty() {
        if !json {
            println!(
                "No material descriptors found under {}",
                config.source_root.display()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !json {
        println!(
            "{} {} descriptor(s) under {} with {} worker(s)",
            "Converting".cyan().bold(),
            jobs.len(),
            config.source_root.display(),
            config.workers
        );
    }

    let log_path = config.source_root.join(LOG_FILE_NAME);
    let log = ConversionLog::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let runner = ConversionRunner::new(&config, &log);
    let scheduler = Scheduler::new(runner, config.workers);
    let outcome = scheduler.run(jobs);

    let summary = RunSummary::from_outcome(&config.source_root, &outcome);
    if let Some(path) = summary_out {
        summary
            .write_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &log_path);
    }

    if summary.failed > 0 || summary.cancelled {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_summary(summary: &RunSummary, log_path: &Path) {
    println!();
    println!(
        "  {} {}/{} converted, {} output file(s), {} warning(s) in {:.1}s",
        "✓".green().bold(),
        summary.processed,
        summary.discovered,
        summary.outputs_written,
        summary.warnings,
        summary.elapsed_ms as f64 / 1000.0
    );
    if summary.retried > 0 {
        println!("  {} {} job(s) needed a retry pass", "•".dimmed(), summary.retried);
    }
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            "✗".red().bold(),
            failure.path.display(),
            failure.error
        );
    }
    if summary.cancelled {
        println!(
            "  {} cancelled with {} job(s) unclaimed",
            "!".yellow().bold(),
            summary.unclaimed
        );
    }
    println!("  Log: {}", log_path.display().to_string().dimmed());
}
