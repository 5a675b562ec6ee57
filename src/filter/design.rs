//! FIR filter design matching MNE / `scipy.signal.firwin`.
//!
//! Every kernel is built from Hamming-windowed sinc lowpasses:
//!   • band-pass  = lowpass(h + tb_h/2) − lowpass(l − tb_l/2)
//!   • band-stop  = lowpass(f − w/2 − tb/2) + δ − lowpass(f + w/2 + tb/2)
//!
//! Filter length follows MNE's `filter_length='auto'`:
//! `ceil(3.3 / min(trans_bw) * sfreq)`, rounded up to odd.
use anyhow::{bail, Result};
use std::f64::consts::PI;

/// Transition bandwidth MNE picks for the lower edge of a band-pass.
///
/// Rule: `min(max(0.25 * l_freq, 2.0), l_freq)`
pub fn auto_trans_bandwidth(l_freq: f32) -> f32 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// Transition bandwidth MNE picks for the upper edge of a band-pass.
///
/// Rule: `min(max(0.25 * h_freq, 2.0), sfreq / 2 - h_freq)`
pub fn auto_trans_bandwidth_high(h_freq: f32, sfreq: f32) -> f32 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Number of taps for a given transition bandwidth, always odd.
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f32, sfreq: f32) -> usize {
    let n_raw = (3.3 / trans_bw as f64 * sfreq as f64).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

/// Zero-phase band-pass keeping `[l_freq, h_freq]`.
///
/// Matches `mne.filter.create_filter(data, sfreq, l_freq, h_freq,
///   fir_window='hamming', fir_design='firwin', phase='zero')`.
pub fn design_bandpass(l_freq: f32, h_freq: f32, sfreq: f32) -> Result<Vec<f32>> {
    let nyq = sfreq / 2.0;
    if !(l_freq > 0.0 && l_freq < h_freq) {
        bail!("invalid band-pass edges {l_freq}–{h_freq} Hz");
    }
    if h_freq >= nyq {
        bail!("band-pass upper edge {h_freq} Hz must be below Nyquist ({nyq} Hz)");
    }
    let l_tb = auto_trans_bandwidth(l_freq);
    let h_tb = auto_trans_bandwidth_high(h_freq, sfreq);
    let n = auto_filter_length(l_tb.min(h_tb), sfreq);

    let upper = firwin(n, h_freq + h_tb / 2.0, sfreq, true);
    let lower = firwin(n, l_freq - l_tb / 2.0, sfreq, true);
    Ok(upper.iter().zip(&lower).map(|(u, l)| (u - l) as f32).collect())
}

/// Zero-phase band-stop centred on `freq`.
///
/// Uses MNE's `notch_filter` defaults: stop-band width `freq / 200`,
/// 1 Hz total transition bandwidth split evenly over both edges.
pub fn design_bandstop(freq: f32, sfreq: f32) -> Result<Vec<f32>> {
    let nyq = sfreq / 2.0;
    let half_width = freq / 200.0 / 2.0;
    let tb = 0.5_f32;
    let lo = freq - half_width - tb / 2.0;
    let hi = freq + half_width + tb / 2.0;
    if lo <= 0.0 {
        bail!("notch at {freq} Hz leaves no pass band below it");
    }
    if hi >= nyq {
        bail!("notch at {freq} Hz must be below Nyquist ({nyq} Hz)");
    }
    let n = auto_filter_length(tb, sfreq);

    let below = firwin(n, lo, sfreq, true);
    let above = firwin(n, hi, sfreq, false);
    Ok(below.iter().zip(&above).map(|(b, a)| (b + a) as f32).collect())
}

/// Design a lowpass (or, with `pass_zero = false`, highpass) FIR filter
/// using a Hamming-windowed sinc.
///
/// `cutoff_hz` is the -6 dB point.
pub fn firwin(n: usize, cutoff_hz: f32, sfreq: f32, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let fc = cutoff_hz as f64 / (sfreq as f64 / 2.0);

    let win = hamming(n);
    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Unit DC gain.
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    if !pass_zero {
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }
    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}
