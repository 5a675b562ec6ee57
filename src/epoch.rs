//! Fixed-length epoching into a per-sample ("tidy") table.
//!
//! Splits a normalised [C, T] recording into windows of
//! `cfg.epoch_samples()` samples spaced `cfg.epoch_step()` apart, dropping
//! any trailing incomplete window.  Every retained sample keeps its epoch
//! index and its absolute time in the source file, which is what the
//! labelling join keys on.
use anyhow::{bail, Context, Result};
use ndarray::{s, Array2, Axis};

use crate::config::PipelineConfig;
use crate::recording::Recording;

/// One entry per retained sample, channels as rows.
///
/// Column `j` of `data` belongs to epoch `epoch[j]` and was recorded at
/// `time[j]` seconds from the start of the source file.
#[derive(Debug, Clone)]
pub struct SampleTable {
    pub subject: String,
    /// Row order of `data`: the configured channel list.
    pub ch_names: Vec<String>,
    pub sfreq: f32,
    /// Samples per epoch.
    pub epoch_len: usize,
    pub epoch: Vec<u32>,
    pub time: Vec<f64>,
    /// `[C, N]` rounded sample values.
    pub data: Array2<f32>,
}

impl SampleTable {
    /// Number of samples (columns).
    #[inline]
    pub fn len(&self) -> usize {
        self.epoch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epoch.is_empty()
    }

    pub fn n_epochs(&self) -> usize {
        self.len() / self.epoch_len.max(1)
    }
}

/// Number of complete windows of `len` samples, `step` apart, in `n_t` samples.
pub fn n_windows(n_t: usize, len: usize, step: usize) -> usize {
    if len == 0 || n_t < len {
        0
    } else {
        (n_t - len) / step.max(1) + 1
    }
}

/// Round `v` to `decimals` places.
#[inline]
pub fn round_to(v: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (v * scale).round() / scale
}

/// Epoch `rec` into a [`SampleTable`] laid out in `cfg.channels` order.
///
/// Channels of `cfg.channels` that the recording lacks are synthesised as
/// the per-sample mean of the channels it has, before rounding.  A
/// recording shorter than one epoch gives an empty table.
pub fn epoch_samples(rec: &Recording, cfg: &PipelineConfig) -> Result<SampleTable> {
    let sfreq = rec.sfreq;
    let len = (cfg.epoch_dur * sfreq).round() as usize;
    let overlap = (cfg.epoch_overlap * sfreq).round() as usize;
    let step = len.saturating_sub(overlap).max(1);
    if len == 0 {
        bail!("{} s epochs hold no samples at {sfreq} Hz", cfg.epoch_dur);
    }

    let rows: Vec<Option<usize>> = cfg.channels.iter().map(|c| rec.channel_index(c)).collect();
    let present: Vec<usize> = rows.iter().flatten().copied().collect();
    if present.is_empty() {
        bail!("{}: none of the configured channels are present", rec.subject);
    }
    let missing: Vec<&str> = cfg
        .channels
        .iter()
        .zip(&rows)
        .filter(|(_, r)| r.is_none())
        .map(|(c, _)| c.as_str())
        .collect();
    if !missing.is_empty() {
        log::info!("{}: synthesising {} from the channel mean", rec.subject, missing.join(", "));
    }

    let n_epochs = n_windows(rec.n_times(), len, step);
    let n = n_epochs * len;
    let mut data = Array2::<f32>::zeros((cfg.channels.len(), n));
    let mut epoch = Vec::with_capacity(n);
    let mut time = Vec::with_capacity(n);

    let mean = if missing.is_empty() {
        None
    } else {
        let present_mean = rec.data.select(Axis(0), &present).mean_axis(Axis(0));
        Some(present_mean.context("channel mean of an empty selection")?)
    };

    for e in 0..n_epochs {
        let start = e * step;
        let cols = e * len..(e + 1) * len;
        for (out_row, src) in rows.iter().enumerate() {
            let mut dst = data.slice_mut(s![out_row, cols.clone()]);
            match (src, &mean) {
                (Some(r), _) => dst.assign(&rec.data.slice(s![*r, start..start + len])),
                (None, Some(m)) => dst.assign(&m.slice(s![start..start + len])),
                (None, None) => {}
            }
        }
        epoch.extend(std::iter::repeat(e as u32).take(len));
        time.extend((start..start + len).map(|k| rec.first_time + k as f64 / sfreq as f64));
    }
    data.mapv_inplace(|v| round_to(v, cfg.decimals));

    Ok(SampleTable {
        subject: rec.subject.clone(),
        ch_names: cfg.channels.clone(),
        sfreq,
        epoch_len: len,
        epoch,
        time,
        data,
    })
}
