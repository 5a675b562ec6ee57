//! Epochs for recordings too large to load whole.
//!
//! Instead of materialising the full sample matrix, the splitter loads
//! only the seizure intervals plus windows taken from a random subset of
//! the interictal gaps between them.  Each piece is cropped, loaded,
//! normalised and epoched on its own, so peak memory is bounded by the
//! load budget rather than by the recording.
//!
//! # Algorithm
//! 1. Interictal gaps = complement of the seizure intervals over the file.
//! 2. Pick `max(1, round(fraction · gaps))` gaps with a seeded generator.
//! 3. Inside every picked gap place one window, at a seeded offset, so
//!    that the windows add up to about the total seizure duration (whole
//!    epochs, at least one per gap).
//! 4. Seizure intervals and windows longer than the load budget are cut
//!    into budget-sized pieces on epoch boundaries.
//! 5. Every piece: crop → load → normalise → epoch.  Pieces shorter than
//!    one epoch, or failing any step, are skipped with a warning.
//! 6. Seizure epochs are labelled by the as-of join, interictal epochs
//!    are labelled non-seizure outright.
//! 7. Concatenate, then balance.
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::balance::balance;
use crate::config::PipelineConfig;
use crate::edf::RawEdf;
use crate::epoch::{epoch_samples, SampleTable};
use crate::error::RecordingError;
use crate::label::{force_label, label_samples, reshape, LabeledSamples};
use crate::normalize::normalize;
use crate::seizure::{SeizureInterval, SeizureIntervals};
use crate::table::{EpochTable, NON_SEIZURE};

/// How many of `n` gaps to load for `fraction`.
pub fn interictal_count(n: usize, fraction: f64) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64 * fraction).round() as usize).clamp(1, n)
}

/// Randomly pick `interictal_count` of `gaps`, returned in onset order.
pub fn pick_interictal<R: Rng>(gaps: &[SeizureInterval], fraction: f64, rng: &mut R) -> Vec<SeizureInterval> {
    let k = interictal_count(gaps.len(), fraction);
    let mut picked = index::sample(rng, gaps.len(), k).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| gaps[i]).collect()
}

/// One window per picked gap, together about `target` seconds long.
///
/// Each gap gets an equal share rounded up to whole epochs of `epoch_dur`
/// seconds, shortened to the gap when the gap is smaller.  Window starts
/// fall on the `sfreq` sample grid so every crop holds a whole number of
/// epochs.
pub fn interictal_windows<R: Rng>(
    picked: &[SeizureInterval],
    target: f64,
    epoch_dur: f64,
    sfreq: f64,
    rng: &mut R,
) -> Vec<SeizureInterval> {
    if picked.is_empty() || epoch_dur <= 0.0 {
        return vec![];
    }
    let share = (target / picked.len() as f64 / epoch_dur).ceil().max(1.0) * epoch_dur;
    picked
        .iter()
        .map(|gap| {
            let first = (gap.onset * sfreq).ceil();
            let last = (gap.end * sfreq).floor();
            let avail = (last - first).max(0.0);
            let len = (share * sfreq).round().min(avail);
            let slack = (avail - len) as u64;
            let offset = if slack > 0 { rng.gen_range(0..=slack) } else { 0 };
            let start = (first + offset as f64) / sfreq;
            SeizureInterval::new(start, len / sfreq)
        })
        .collect()
}

/// Cut `interval` into consecutive pieces of at most `max_secs` seconds,
/// each a whole number of `epoch_dur` epochs except the last.
///
/// An interval that fits, or a budget below one epoch, comes back whole.
pub fn budget_pieces(interval: &SeizureInterval, max_secs: Option<f64>, epoch_dur: f64) -> Vec<SeizureInterval> {
    let Some(max_secs) = max_secs else {
        return vec![*interval];
    };
    let piece = (max_secs / epoch_dur).floor() * epoch_dur;
    if interval.duration <= max_secs || piece < epoch_dur {
        return vec![*interval];
    }
    let mut out = Vec::new();
    let mut onset = interval.onset;
    while onset < interval.end {
        let len = piece.min(interval.end - onset);
        out.push(SeizureInterval::new(onset, len));
        onset += piece;
    }
    out
}

/// Crop `interval` out of `raw` and run it through load, normalise and
/// epoch.  `None` when the interval yields no complete epoch or any step
/// fails; the reason is logged.
fn interval_samples(raw: &RawEdf, interval: &SeizureInterval, cfg: &PipelineConfig) -> Option<SampleTable> {
    let seg = raw.crop(interval.onset, interval.end);
    let span = format!("{}: [{:.1}, {:.1}] s", raw.subject, interval.onset, interval.end);
    if seg.duration_secs() < cfg.epoch_dur as f64 {
        log::warn!("{span} is shorter than one {} s epoch, skipped", cfg.epoch_dur);
        return None;
    }
    let rec = match seg.load(cfg.max_load_bytes) {
        Ok(rec) => rec,
        Err(e) => {
            log::warn!("{span} could not be loaded, skipped: {e}");
            return None;
        }
    };
    let rec = match normalize(rec, cfg) {
        Ok(rec) => rec,
        Err(e) => {
            log::warn!("{span} could not be normalised, skipped: {e}");
            return None;
        }
    };
    match epoch_samples(&rec, cfg) {
        Ok(t) if t.is_empty() => {
            log::warn!("{span} yields no complete epoch, skipped");
            None
        }
        Ok(t) => {
            log::debug!("{span} → {} epochs", t.n_epochs());
            Some(t)
        }
        Err(e) => {
            log::warn!("{span} could not be epoched, skipped: {e:#}");
            None
        }
    }
}

fn append(
    table: &mut Option<EpochTable>,
    samples: LabeledSamples,
) -> Result<(), RecordingError> {
    let part = reshape(samples).map_err(RecordingError::Epoch)?;
    match table {
        Some(t) => t.append(part).map_err(RecordingError::Epoch),
        None => {
            *table = Some(part);
            Ok(())
        }
    }
}

/// Interictal windows [`split_recording`] loads for `raw`.
pub fn plan_interictal(raw: &RawEdf, seizures: &SeizureIntervals, cfg: &PipelineConfig) -> Vec<SeizureInterval> {
    let start = raw.first_time();
    let gaps = seizures.interictal(start, start + raw.duration_secs());
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let picked = pick_interictal(&gaps, cfg.interictal_fraction, &mut rng);
    let windows = interictal_windows(
        &picked,
        seizures.total_duration(),
        cfg.epoch_dur as f64,
        raw.sfreq,
        &mut rng,
    );
    log::info!(
        "{}: splitting into {} seizure intervals and {} windows from {} of {} gaps ({:.0} s seizure, {:.0} s interictal)",
        raw.subject,
        seizures.len(),
        windows.len(),
        picked.len(),
        gaps.len(),
        seizures.total_duration(),
        windows.iter().map(|w| w.duration).sum::<f64>(),
    );
    windows
}

/// Build the balanced epoch table of `raw` from its seizure intervals and
/// windows taken from a sample of its interictal gaps.
///
/// `Ok(None)` when no seizure interval produced an epoch.
pub fn split_recording(
    raw: &RawEdf,
    seizures: &SeizureIntervals,
    cfg: &PipelineConfig,
) -> Result<Option<EpochTable>, RecordingError> {
    let epoch_dur = cfg.epoch_dur as f64;
    let windows = plan_interictal(raw, seizures, cfg);

    let max_secs = cfg.max_load_bytes.map(|b| raw.max_load_secs(b));
    let mut table: Option<EpochTable> = None;
    for interval in seizures {
        for piece in budget_pieces(interval, max_secs, epoch_dur) {
            if let Some(samples) = interval_samples(raw, &piece, cfg) {
                append(&mut table, label_samples(samples, seizures))?;
            }
        }
    }
    for window in &windows {
        for piece in budget_pieces(window, max_secs, epoch_dur) {
            if let Some(samples) = interval_samples(raw, &piece, cfg) {
                append(&mut table, force_label(samples, NON_SEIZURE))?;
            }
        }
    }

    let Some(table) = table else {
        return Ok(None);
    };
    Ok(balance(&table, cfg.seed)?)
}
