//! Channel normaliser: bring one recording onto the common channel footing.
//!
//! Stages, in order:
//!   1. tag every channel as EEG (source headers are unreliable)
//!   2. assign standard 10-20 electrode positions
//!   3. notch out mains interference (`cfg.notch_freqs`)
//!   4. band-pass `cfg.l_freq`–`cfg.h_freq`
//!   5. average reference
//!   6. resample to `cfg.target_sfreq`
//!
//! The recording is taken by value.  On failure it is dropped and the
//! failing stage is reported, so callers never see a half-normalised
//! recording.
use std::fmt;

use crate::config::PipelineConfig;
use crate::error::NormalizeError;
use crate::filter::{apply_fir_zero_phase, design_bandpass, design_bandstop};
use crate::montage::standard_1020;
use crate::recording::{ChannelKind, Recording};
use crate::reference::average_reference_inplace;
use crate::resample::resample;

/// A step of the normaliser, used to report where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Notch,
    Bandpass,
    Resample,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Notch => "notch filter",
            Stage::Bandpass => "band-pass filter",
            Stage::Resample => "resampling",
        })
    }
}

fn failed(stage: Stage) -> impl Fn(anyhow::Error) -> NormalizeError {
    move |e| NormalizeError::Transform { stage, reason: format!("{e:#}") }
}

/// Run every normalisation stage on `rec`.
pub fn normalize(mut rec: Recording, cfg: &PipelineConfig) -> Result<Recording, NormalizeError> {
    rec.ch_kinds = vec![ChannelKind::Eeg; rec.n_channels()];
    rec.positions = Some(standard_1020(&rec.ch_names).map_err(NormalizeError::UnknownChannel)?);

    for &freq in &cfg.notch_freqs {
        let h = design_bandstop(freq, rec.sfreq).map_err(failed(Stage::Notch))?;
        apply_fir_zero_phase(&mut rec.data, &h).map_err(failed(Stage::Notch))?;
    }

    let h = design_bandpass(cfg.l_freq, cfg.h_freq, rec.sfreq).map_err(failed(Stage::Bandpass))?;
    apply_fir_zero_phase(&mut rec.data, &h).map_err(failed(Stage::Bandpass))?;

    average_reference_inplace(&mut rec.data);

    if (rec.sfreq - cfg.target_sfreq).abs() > 1e-3 {
        rec.data = resample(&rec.data, rec.sfreq, cfg.target_sfreq).map_err(failed(Stage::Resample))?;
        log::info!(
            "{}: resampled {} Hz → {} Hz",
            rec.subject, rec.sfreq, cfg.target_sfreq
        );
        rec.sfreq = cfg.target_sfreq;
    }
    Ok(rec)
}
