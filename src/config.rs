//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every constant the data-preparation pipeline
//! depends on.  All fields have defaults matching the values used to build
//! the seizure / non-seizure training set.

use anyhow::{bail, Result};

/// The 19 standard 10-20 electrodes, in output column order.
///
/// Temporal electrodes use the older `T3`/`T4`/`T5`/`T6` nomenclature found
/// in the clinical recordings.
pub const STANDARD_CHANNELS: [&str; 19] = [
    "Fp1", "Fp2", "F3", "F4", "C3", "C4", "P3", "P4", "O1", "O2",
    "F7", "F8", "T3", "T4", "T5", "T6", "Fz", "Cz", "Pz",
];

/// Configuration for the full data-preparation pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use seizure_prep::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     epoch_dur: 5.0,                 // 5 s epochs instead of 10
///     interictal_fraction: 0.5,       // pull more non-seizure data when splitting
///     ..PipelineConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// EEG channels kept from every recording, in output column order.
    ///
    /// Channels absent from a recording are synthesised as the per-sample
    /// mean of the channels that are present.
    ///
    /// Default: [`STANDARD_CHANNELS`].
    pub channels: Vec<String>,

    /// Reference electrode every output table must contain.
    ///
    /// Default: `"Pz"`.
    pub canonical_channel: String,

    /// Annotation description that marks a seizure event.
    ///
    /// Matching is exact; every other description is non-seizure.
    ///
    /// Default: `"AANVAL"`.
    pub seizure_marker: String,

    /// Target sampling rate in Hz after resampling.
    ///
    /// The resampler is skipped entirely when the source rate already equals
    /// this value (within 1 mHz).
    ///
    /// Default: `256.0` Hz.
    pub target_sfreq: f32,

    /// Duration of each output epoch in seconds.
    ///
    /// At the default 10 s / 256 Hz each epoch has **2 560 samples**.
    /// Trailing samples that do not fill a complete window are discarded.
    ///
    /// Default: `10.0` s.
    pub epoch_dur: f32,

    /// Overlap between consecutive epochs in seconds.
    ///
    /// Default: `0.0` s (non-overlapping windows).
    pub epoch_overlap: f32,

    /// Mains-interference frequencies removed by the notch stage.
    ///
    /// Default: `[50.0, 100.0]` Hz.
    pub notch_freqs: Vec<f32>,

    /// Lower edge of the band-pass filter in Hz.
    ///
    /// Default: `0.1` Hz.
    pub l_freq: f32,

    /// Upper edge of the band-pass filter in Hz.
    ///
    /// Default: `70.0` Hz.
    pub h_freq: f32,

    /// Fraction of interictal intervals sampled when an oversized recording
    /// is split instead of loaded.
    ///
    /// Default: `0.30`.
    pub interictal_fraction: f64,

    /// Seed for interictal-interval sampling and class balancing.
    ///
    /// Default: `42`.
    pub seed: u64,

    /// Decimal places kept in epoch sample values.
    ///
    /// Default: `2`.
    pub decimals: u32,

    /// Upper bound, in bytes, on a fully materialised sample matrix.
    ///
    /// Recordings above the budget are routed through the splitter.
    /// `None` means only the allocator decides.
    ///
    /// Default: `None`.
    pub max_load_bytes: Option<usize>,

    /// Skip recordings whose output file already exists.
    ///
    /// Default: `false`.
    pub skip_existing: bool,

    /// Replaces the input file extension to form the output file name.
    ///
    /// Default: `"_epochs.safetensors"`.
    pub output_suffix: String,
}

impl Default for PipelineConfig {
    /// Returns the training configuration:
    /// 19 channels · 256 Hz · 50/100 Hz notch · 0.1–70 Hz · 10 s epochs · seed 42.
    fn default() -> Self {
        Self {
            channels: STANDARD_CHANNELS.iter().map(|s| s.to_string()).collect(),
            canonical_channel: "Pz".into(),
            seizure_marker: "AANVAL".into(),
            target_sfreq: 256.0,
            epoch_dur: 10.0,
            epoch_overlap: 0.0,
            notch_freqs: vec![50.0, 100.0],
            l_freq: 0.1,
            h_freq: 70.0,
            interictal_fraction: 0.30,
            seed: 42,
            decimals: 2,
            max_load_bytes: None,
            skip_existing: false,
            output_suffix: "_epochs.safetensors".into(),
        }
    }
}

impl PipelineConfig {
    /// Number of samples per epoch at the target sampling rate.
    ///
    /// ```
    /// use seizure_prep::PipelineConfig;
    /// assert_eq!(PipelineConfig::default().epoch_samples(), 2560);
    /// ```
    pub fn epoch_samples(&self) -> usize {
        (self.epoch_dur * self.target_sfreq).round() as usize
    }

    /// Distance in samples between the starts of consecutive epochs.
    pub fn epoch_step(&self) -> usize {
        let overlap = (self.epoch_overlap * self.target_sfreq).round() as usize;
        self.epoch_samples().saturating_sub(overlap).max(1)
    }

    /// Reject parameter combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            bail!("channel list is empty");
        }
        if !self.channels.iter().any(|c| c == &self.canonical_channel) {
            bail!("canonical channel {} is not in the channel list", self.canonical_channel);
        }
        if self.target_sfreq <= 0.0 {
            bail!("target_sfreq must be positive, got {}", self.target_sfreq);
        }
        if self.epoch_dur <= 0.0 || self.epoch_samples() == 0 {
            bail!("epoch_dur must cover at least one sample, got {} s", self.epoch_dur);
        }
        if self.epoch_overlap < 0.0 || self.epoch_overlap >= self.epoch_dur {
            bail!(
                "epoch_overlap must lie in [0, epoch_dur), got {} s for {} s epochs",
                self.epoch_overlap, self.epoch_dur
            );
        }
        if !(self.l_freq > 0.0 && self.l_freq < self.h_freq) {
            bail!("band-pass edges must satisfy 0 < l_freq < h_freq ({} / {})", self.l_freq, self.h_freq);
        }
        if !(self.interictal_fraction > 0.0 && self.interictal_fraction <= 1.0) {
            bail!("interictal_fraction must lie in (0, 1], got {}", self.interictal_fraction);
        }
        if self.seizure_marker.is_empty() {
            bail!("seizure marker is empty");
        }
        Ok(())
    }
}
