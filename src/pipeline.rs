//! Per-recording driver and sequential batch runner.
//!
//! ```text
//! open_raw ─ extract_seizures ─┬─ load ─ normalize ─ epoch ─ label ─ reshape ─ balance ─┬─ write
//!                              └─ (capacity) split_recording ───────────────────────────┘
//! ```
//!
//! Every intermediate (raw matrix, per-sample table, unbalanced epoch
//! table) is dropped before the output file is written.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::balance::balance;
use crate::config::PipelineConfig;
use crate::edf::open_raw;
use crate::epoch::epoch_samples;
use crate::error::{LoadError, RecordingError};
use crate::io::{output_path, write_epoch_table};
use crate::label::{label_samples, reshape};
use crate::normalize::normalize;
use crate::recording::Recording;
use crate::seizure::{extract_seizures, SeizureIntervals};
use crate::split::split_recording;
use crate::table::{EpochTable, SEIZURE};

/// How a written table was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Whole recording loaded at once.
    Full,
    /// Oversized recording rebuilt from cropped intervals.
    Split,
}

/// Why a recording produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// No annotation carries the seizure marker.
    NoSeizureAnnotations,
    /// Seizures are annotated but none covers a full epoch.
    NoSeizureEpochs,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Exclusion::NoSeizureAnnotations => "no seizure annotations",
            Exclusion::NoSeizureEpochs => "no seizure epochs",
        })
    }
}

/// Result of processing one recording that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Written {
        output: PathBuf,
        route: Route,
        /// Seizure epochs in the file; non-seizure epochs match it.
        seizure_epochs: usize,
    },
    Excluded {
        reason: Exclusion,
    },
    /// Output existed and `skip_existing` was set.
    AlreadyPresent {
        output: PathBuf,
    },
}

impl Outcome {
    /// The recording carried at least one seizure annotation.
    pub fn has_seizures(&self) -> bool {
        matches!(
            self,
            Outcome::Written { .. } | Outcome::Excluded { reason: Exclusion::NoSeizureEpochs }
        )
    }
}

/// Epoch, label and balance a fully loaded recording.
fn full_table(
    rec: Recording,
    seizures: &SeizureIntervals,
    cfg: &PipelineConfig,
) -> Result<Option<EpochTable>, RecordingError> {
    let rec = normalize(rec, cfg)?;
    let samples = epoch_samples(&rec, cfg).map_err(RecordingError::Epoch)?;
    drop(rec);
    let table = reshape(label_samples(samples, seizures)).map_err(RecordingError::Epoch)?;
    log::debug!(
        "{}: {} epochs, {} seizure",
        table.subject,
        table.n_epochs(),
        table.count(SEIZURE)
    );
    Ok(balance(&table, cfg.seed)?)
}

/// Process one recording into `out_dir`.
///
/// Exclusions are reported as [`Outcome::Excluded`]; only genuine failures
/// are errors.  Nothing is written unless the whole recording succeeds.
pub fn process_recording(
    path: &Path,
    out_dir: &Path,
    cfg: &PipelineConfig,
) -> Result<Outcome, RecordingError> {
    let output = output_path(path, out_dir, &cfg.output_suffix);
    if cfg.skip_existing && output.exists() {
        log::info!("{}: {} exists, skipped", path.display(), output.display());
        return Ok(Outcome::AlreadyPresent { output });
    }

    let raw = open_raw(path, &cfg.channels).map_err(|source| RecordingError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let seizures = extract_seizures(raw.annotations(), &cfg.seizure_marker)?;
    if seizures.is_empty() {
        log::info!("{}: no {} annotations, excluded", raw.subject, cfg.seizure_marker);
        return Ok(Outcome::Excluded { reason: Exclusion::NoSeizureAnnotations });
    }
    log::info!(
        "{}: {} channels @ {} Hz, {:.0} s, {} seizures",
        raw.subject,
        raw.ch_names.len(),
        raw.sfreq,
        raw.duration_secs(),
        seizures.len()
    );

    let (balanced, route) = match raw.load(cfg.max_load_bytes) {
        Ok(rec) => (full_table(rec, &seizures, cfg)?, Route::Full),
        Err(LoadError::Capacity { needed, reason }) => {
            log::warn!(
                "{}: {needed} byte sample matrix does not fit ({reason}); splitting",
                raw.subject
            );
            (split_recording(&raw, &seizures, cfg)?, Route::Split)
        }
        Err(e) => return Err(e.into()),
    };
    drop(raw);

    let Some(balanced) = balanced else {
        log::info!("{}: no seizure epochs, excluded", path.display());
        return Ok(Outcome::Excluded { reason: Exclusion::NoSeizureEpochs });
    };
    write_epoch_table(&balanced, &output).map_err(|source| RecordingError::Write {
        path: output.clone(),
        source,
    })?;
    let seizure_epochs = balanced.count(SEIZURE);
    log::info!(
        "{}: wrote {} epochs ({seizure_epochs} seizure) to {}",
        balanced.subject,
        balanced.n_epochs(),
        output.display()
    );
    Ok(Outcome::Written { output, route, seizure_epochs })
}

/// Aggregate of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Every recording that did not fail, in processing order.
    pub outcomes: Vec<(PathBuf, Outcome)>,
    pub failed: Vec<(PathBuf, RecordingError)>,
    /// Subjects with at least one seizure annotation.
    pub seizure_subjects: Vec<String>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Written { .. }))
            .count()
    }

    pub fn excluded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Excluded { .. }))
            .count()
    }
}

/// Process `paths` one after another.  A failing recording is logged and
/// recorded in the report; the batch always runs to the end.
pub fn run_batch(paths: &[PathBuf], out_dir: &Path, cfg: &PipelineConfig) -> BatchReport {
    let mut report = BatchReport::default();
    for (i, path) in paths.iter().enumerate() {
        log::info!("[{}/{}] {}", i + 1, paths.len(), path.display());
        match process_recording(path, out_dir, cfg) {
            Ok(outcome) => {
                if outcome.has_seizures() {
                    if let Some(stem) = path.file_stem() {
                        report.seizure_subjects.push(stem.to_string_lossy().into_owned());
                    }
                }
                report.outcomes.push((path.clone(), outcome));
            }
            Err(e) => {
                log::error!("{}: {e}", path.display());
                report.failed.push((path.clone(), e));
            }
        }
    }
    report
}

/// Expand `inputs` into recording paths: files are kept as given,
/// directories contribute their `*.edf` files in name order.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("listing {}", input.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension().is_some_and(|x| x.eq_ignore_ascii_case("edf"))
                })
                .collect();
            found.sort();
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}
