//! FFT-based rational resampler matching MNE's `resample(..., method='fft')`.
//!
//! Algorithm (from `mne/cuda.py _fft_resample`):
//!   1. Pad to the next power of two with reflect-limited samples.
//!   2. rfft(padded).
//!   3. Downsampling doubles the Nyquist bin of the kept spectrum,
//!      upsampling halves it.
//!   4. Scale every bin by `new_len_padded / old_len_padded`.
//!   5. irfft to `new_len_padded` (truncating or zero-extending the spectrum).
//!   6. Strip the resampled padding.
use anyhow::{bail, Result};
use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::filter::pad::reflect_limited_pad;

/// Padding MNE's `npad='auto'` chooses for `n` samples.
///
/// ```text
/// min_add = min(n // 8, 100) * 2
/// total   = 2^ceil(log2(n + min_add)) - n
/// npads   = [total // 2, total - total // 2]
/// ```
pub fn auto_npad(n: usize) -> (usize, usize) {
    let min_add = (n / 8).min(100) * 2;
    let next_pow2 = (n + min_add).next_power_of_two();
    let total = next_pow2 - n;
    (total / 2, total - total / 2)
}

/// Output length for `n_in` samples resampled by `ratio`.
pub fn resampled_len(n_in: usize, ratio: f64) -> usize {
    (ratio * n_in as f64).round() as usize
}

/// Resample `data` ([C, T]) from `src_sfreq` to `dst_sfreq`.
pub fn resample(data: &Array2<f32>, src_sfreq: f32, dst_sfreq: f32) -> Result<Array2<f32>> {
    if src_sfreq <= 0.0 || dst_sfreq <= 0.0 {
        bail!("sampling rates must be positive ({src_sfreq} → {dst_sfreq} Hz)");
    }
    if (src_sfreq - dst_sfreq).abs() < 1e-6 {
        return Ok(data.clone());
    }
    let n_in = data.ncols();
    if n_in == 0 {
        bail!("cannot resample an empty recording");
    }
    let ratio = dst_sfreq as f64 / src_sfreq as f64;
    let (npad_l, npad_r) = auto_npad(n_in);

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let mut out = Array2::<f32>::zeros((data.nrows(), resampled_len(n_in, ratio)));
    for (src, mut dst) in data.rows().into_iter().zip(out.rows_mut()) {
        let row = src.to_vec();
        let y = resample_1d(&mut planner, &row, ratio, npad_l, npad_r);
        dst.assign(&ndarray::ArrayView1::from(&y));
    }
    Ok(out)
}

/// Resample one channel with explicit (possibly asymmetric) padding.
pub fn resample_1d(
    planner: &mut FftPlanner<f64>,
    x: &[f32],
    ratio: f64,
    npad_l: usize,
    npad_r: usize,
) -> Vec<f32> {
    let final_len = resampled_len(x.len(), ratio);
    if x.is_empty() {
        return vec![];
    }

    let x_ext = reflect_limited_pad(x, npad_l, npad_r);
    let old_len = x_ext.len();
    let new_len = resampled_len(old_len, ratio);
    let shorter = new_len < old_len;
    let use_len = if shorter { new_len } else { old_len };

    let mut buf: Vec<Complex<f64>> = x_ext
        .iter()
        .map(|&v| Complex { re: v as f64, im: 0.0 })
        .collect();
    planner.plan_fft_forward(old_len).process(&mut buf);
    let mut half: Vec<Complex<f64>> = buf[..old_len / 2 + 1].to_vec();

    if use_len % 2 == 0 {
        let nyq = use_len / 2;
        if nyq < half.len() {
            half[nyq] *= if shorter { 2.0 } else { 0.5 };
        }
    }

    let scale = new_len as f64 / old_len as f64;
    half.iter_mut().for_each(|v| *v *= scale);

    // Rebuild a Hermitian spectrum of length `new_len`.
    let new_half = new_len / 2 + 1;
    let mut spec = vec![Complex::<f64>::default(); new_len];
    let n_copy = half.len().min(new_half);
    spec[..n_copy].copy_from_slice(&half[..n_copy]);
    for i in 1..new_half {
        let mirror = new_len - i;
        if mirror >= new_half {
            spec[mirror] = spec[i].conj();
        }
    }
    planner.plan_fft_inverse(new_len).process(&mut spec);
    let inv_scale = 1.0 / new_len as f64;

    let strip_l = resampled_len(npad_l, ratio);
    let mut y: Vec<f32> = spec
        .iter()
        .skip(strip_l)
        .take(final_len)
        .map(|c| (c.re * inv_scale) as f32)
        .collect();
    y.resize(final_len, 0.0);
    y
}
