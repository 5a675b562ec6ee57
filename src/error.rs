//! Typed failures at the per-recording boundary.
//!
//! Low-level readers and DSP helpers return `anyhow::Result`; the stages the
//! driver has to branch on report one of the enums below instead.
use std::path::PathBuf;
use thiserror::Error;

use crate::normalize::Stage;

/// Materialising samples failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The sample matrix does not fit in the configured budget or the
    /// allocator refused it.  Recoverable through the splitter.
    #[error("sample matrix of {needed} bytes cannot be materialised: {reason}")]
    Capacity { needed: usize, reason: String },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// A normalisation stage could not be completed.
///
/// The recording being normalised is consumed; no partially processed
/// recording escapes.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("channel {0} has no position in the standard 10-20 layout")]
    UnknownChannel(String),

    #[error("{stage} failed: {reason}")]
    Transform { stage: Stage, reason: String },
}

/// Seizure markers that cannot be turned into a usable interval sequence.
#[derive(Debug, Error)]
pub enum IntervalError {
    #[error("seizure at {next_onset:.3} s starts before the previous one ends at {prev_end:.3} s")]
    Overlapping { prev_end: f64, next_onset: f64 },
}

/// Balancing found fewer majority-class rows than minority-class rows.
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("need {needed} non-seizure epochs, only {available} available")]
    InsufficientMajority { needed: usize, available: usize },
}

/// Everything that can make one recording fail.  Never aborts a batch.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("cannot open {path}: {source}")]
    Open { path: PathBuf, source: anyhow::Error },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Intervals(#[from] IntervalError),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("epoching failed: {0}")]
    Epoch(anyhow::Error),

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: anyhow::Error },
}
