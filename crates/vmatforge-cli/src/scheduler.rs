//! Bounded worker pool with pause, cancellation, and a retry pass.
//!
//! All shared scheduler state lives in one [`PipelineContext`] handed to
//! every worker: the job queue, the progress counter, the pause gate, the
//! cancellation flag, and the retry list, each behind its own
//! synchronization primitive. The unit of interruption is one job: pause
//! and cancellation are observed at job boundaries only, so a claimed job
//! is never lost or forcibly aborted.
//!
//! Failures are collected during the first pass; retryable ones get exactly
//! one more chance in a second pass over the same pool shape. Jobs failing
//! twice stay failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::job::{ConversionJob, JobError, JobRecord, JobReport, JobStatus};

/// Locks a mutex, recovering the guard if a panicking worker poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Processes one claimed job. Implementations must be callable from
/// multiple workers at once.
pub trait JobRunner: Sync {
    fn run(&self, job: &ConversionJob) -> Result<JobReport, JobError>;
}

/// Shared progress counters, read by the coordinator for ETA reporting.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Jobs completed successfully so far (across both passes).
    pub processed: usize,
    /// Jobs discovered at scan time.
    pub total: usize,
    /// When the run started.
    pub started: Instant,
}

impl Progress {
    /// Elapsed-rate estimate of the remaining wall-clock time.
    pub fn eta(&self) -> Option<Duration> {
        if self.processed == 0 || self.total <= self.processed {
            return None;
        }
        let remaining = (self.total - self.processed) as f64;
        Some(
            self.started
                .elapsed()
                .mul_f64(remaining / self.processed as f64),
        )
    }
}

/// All shared mutable state of one run. One primitive per structure; no
/// field is touched without holding its lock.
struct PipelineContext {
    queue: Mutex<Vec<ConversionJob>>,
    retry: Mutex<Vec<ConversionJob>>,
    progress: Mutex<Progress>,
    paused: Mutex<bool>,
    resumed: Condvar,
    cancel: AtomicBool,
}

impl PipelineContext {
    fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
            retry: Mutex::new(Vec::new()),
            progress: Mutex::new(Progress {
                processed: 0,
                total: 0,
                started: Instant::now(),
            }),
            paused: Mutex::new(false),
            resumed: Condvar::new(),
            cancel: AtomicBool::new(false),
        }
    }

    /// Blocks while the pause flag is set. Workers call this before
    /// claiming their next job; the controller signals on resume or cancel.
    fn wait_while_paused(&self) {
        let mut paused = lock(&self.paused);
        while *paused {
            paused = self
                .resumed
                .wait(paused)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

/// Controller-side handle for a running (or about to run) scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    ctx: Arc<PipelineContext>,
}

impl SchedulerHandle {
    /// Suspends dequeuing. Jobs already claimed by a worker finish.
    pub fn pause(&self) {
        *lock(&self.ctx.paused) = true;
    }

    /// Lifts a pause and wakes every waiting worker.
    pub fn resume(&self) {
        *lock(&self.ctx.paused) = false;
        self.ctx.resumed.notify_all();
    }

    /// Stops further dequeuing. In-flight jobs run to completion; pending
    /// jobs are left unclaimed and reported as incomplete. Also lifts any
    /// active pause so blocked workers can observe the flag and exit.
    pub fn cancel(&self) {
        self.ctx.cancel.store(true, Ordering::SeqCst);
        self.resume();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.ctx.cancel.load(Ordering::SeqCst)
    }

    /// Snapshot of the progress counters.
    pub fn progress(&self) -> Progress {
        lock(&self.ctx.progress).clone()
    }
}

/// Aggregated result of a two-pass run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Descriptors discovered at scan time.
    pub discovered: usize,
    /// Jobs that completed successfully across both passes.
    pub processed: usize,
    /// Successful job records.
    pub done: Vec<JobRecord>,
    /// Permanently failed job records (non-retryable, or failed twice).
    pub failed: Vec<JobRecord>,
    /// Jobs that entered the retry pass.
    pub retried: usize,
    /// Whether the run was cancelled before draining.
    pub cancelled: bool,
    /// Jobs never claimed because of cancellation.
    pub unclaimed: usize,
    /// Total wall-clock time.
    pub elapsed: Duration,
}

/// Bounded worker pool driving [`ConversionJob`]s through a [`JobRunner`].
pub struct Scheduler<R> {
    runner: R,
    workers: usize,
    ctx: Arc<PipelineContext>,
}

impl<R: JobRunner> Scheduler<R> {
    /// Creates a scheduler with the given pool size (clamped to >= 1).
    pub fn new(runner: R, workers: usize) -> Self {
        Self {
            runner,
            workers: workers.max(1),
            ctx: Arc::new(PipelineContext::new()),
        }
    }

    /// Returns a handle for pausing, cancelling, and progress polling.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Runs the full two-pass schedule over the given jobs.
    pub fn run(&self, jobs: Vec<ConversionJob>) -> RunOutcome {
        let discovered = jobs.len();
        let started = Instant::now();
        {
            let mut progress = lock(&self.ctx.progress);
            progress.processed = 0;
            progress.total = discovered;
            progress.started = started;
        }

        let mut done = Vec::new();
        let mut failed = Vec::new();
        let mut retryable = Vec::new();

        // First pass: retryable failures are held back, not finalized.
        for record in self.run_pass(jobs, true) {
            match &record.result {
                Ok(_) => done.push(record),
                Err(err) if err.retryable() => retryable.push(record),
                Err(_) => failed.push(record),
            }
        }
        let retried = retryable.len();

        // Second pass: consumes exactly the retry list, collecting nothing.
        // If cancellation suppresses it, the first-pass failures are final;
        // every job must still land in exactly one terminal bucket.
        let retry_jobs: Vec<ConversionJob> = lock(&self.ctx.retry).drain(..).collect();
        if !retry_jobs.is_empty() && !self.ctx.cancel.load(Ordering::SeqCst) {
            for record in self.run_pass(retry_jobs, false) {
                match &record.result {
                    Ok(_) => done.push(record),
                    Err(_) => failed.push(record),
                }
            }
        } else {
            failed.extend(retryable);
        }

        let cancelled = self.ctx.cancel.load(Ordering::SeqCst);
        let unclaimed = lock(&self.ctx.queue).len();
        let processed = lock(&self.ctx.progress).processed;

        RunOutcome {
            discovered,
            processed,
            done,
            failed,
            retried,
            cancelled,
            unclaimed,
            elapsed: started.elapsed(),
        }
    }

    /// Runs one pass: fills the queue and drains it with the worker pool.
    /// Emptiness of the queue is the sole termination signal.
    fn run_pass(&self, jobs: Vec<ConversionJob>, collect_retries: bool) -> Vec<JobRecord> {
        *lock(&self.ctx.queue) = jobs;
        let records: Mutex<Vec<JobRecord>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..self.workers {
                scope.spawn(|| self.worker_loop(collect_retries, &records));
            }
        });

        records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn worker_loop(&self, collect_retries: bool, records: &Mutex<Vec<JobRecord>>) {
        loop {
            // Both flags are observed once per job boundary.
            if self.ctx.cancel.load(Ordering::SeqCst) {
                return;
            }
            self.ctx.wait_while_paused();
            if self.ctx.cancel.load(Ordering::SeqCst) {
                return;
            }

            let mut job = match lock(&self.ctx.queue).pop() {
                Some(job) => job,
                None => return,
            };
            job.status = JobStatus::Running;

            match self.runner.run(&job) {
                Ok(report) => {
                    job.status = JobStatus::Done;
                    lock(&self.ctx.progress).processed += 1;
                    lock(records).push(JobRecord {
                        job,
                        result: Ok(report),
                    });
                }
                Err(err) => {
                    job.status = JobStatus::Failed;
                    if collect_retries && err.retryable() {
                        let mut requeued = job.clone();
                        requeued.status = JobStatus::Pending;
                        lock(&self.ctx.retry).push(requeued);
                    }
                    lock(records).push(JobRecord {
                        job,
                        result: Err(err),
                    });
                }
            }
        }
    }
}
