//! Concurrent file copying.
//!
//! A batch of `(src, dest)` pairs is drained by a bounded worker pool.
//! Completion order is arbitrary; the call returns once every job ran. A
//! failed copy is logged and recorded, and the workers carry on, so the
//! batch itself only fails when the caller asks for strict semantics.

use std::io;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{ShootError, ShootResult};

/// One file to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Source file.
    pub src: PathBuf,
    /// Destination file, overwritten if present.
    pub dest: PathBuf,
}

impl CopyJob {
    /// Creates a job copying `src` to `dest`.
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// Outcome of a batch copy.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// Jobs that succeeded.
    pub copied: usize,
    /// One message per failed job.
    pub failures: Vec<String>,
}

impl CopyReport {
    /// True if every job succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns failures into an error when `strict`, otherwise keeps the report.
    pub fn into_result(self, strict: bool) -> ShootResult<Self> {
        if strict && !self.is_clean() {
            Err(ShootError::Copy(self.failures))
        } else {
            Ok(self)
        }
    }
}

/// Copies every job using at most `workers` threads.
pub fn copy_batch(jobs: &[CopyJob], workers: usize) -> ShootResult<CopyReport> {
    trace!(jobs = jobs.len(), workers, "copy_batch");
    if jobs.is_empty() {
        return Ok(CopyReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.clamp(1, jobs.len()))
        .build()
        .map_err(io::Error::other)?;

    let results: Vec<Result<(), String>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                std::fs::copy(&job.src, &job.dest).map(|_| ()).map_err(|e| {
                    let msg = format!("{} -> {}: {}", job.src.display(), job.dest.display(), e);
                    warn!("copy failed: {}", msg);
                    msg
                })
            })
            .collect()
    });

    let mut report = CopyReport::default();
    for result in results {
        match result {
            Ok(()) => report.copied += 1,
            Err(msg) => report.failures.push(msg),
        }
    }

    debug!(copied = report.copied, failed = report.failures.len(), "copy batch done");
    Ok(report)
}
