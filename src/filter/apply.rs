//! Overlap-add zero-phase FIR convolution.
//!
//! Matches MNE's `_overlap_add_filter` + `_1d_overlap_filter`.
//!
//! Zero-phase is achieved by shifting the output left by `(N-1)/2` samples,
//! NOT by running filtfilt. The edge transient is suppressed by
//! reflect-limited padding of `N-1` samples on each side.
use anyhow::{bail, Result};
use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

use super::pad::reflect_limited_pad;

/// Apply a zero-phase FIR filter to each channel of `data` ([C, T]) in-place.
///
/// `h` must have odd length (guaranteed by the `design_*` functions).
pub fn apply_fir_zero_phase(data: &mut Array2<f32>, h: &[f32]) -> Result<()> {
    if h.len() % 2 == 0 {
        bail!("zero-phase FIR needs an odd number of taps, got {}", h.len());
    }
    let mut planner: FftPlanner<f32> = FftPlanner::new();
    for mut row in data.rows_mut() {
        let x: Vec<f32> = row.to_vec();
        let y = filter_1d_with(&mut planner, &x, h);
        row.assign(&ndarray::ArrayView1::from(&y));
    }
    Ok(())
}

/// Filter a single 1-D signal with the overlap-add algorithm.
///
/// Returns a vector of the same length as `x`.
pub fn filter_1d(x: &[f32], h: &[f32]) -> Result<Vec<f32>> {
    if h.len() % 2 == 0 {
        bail!("zero-phase FIR needs an odd number of taps, got {}", h.len());
    }
    Ok(filter_1d_with(&mut FftPlanner::new(), x, h))
}

fn filter_1d_with(planner: &mut FftPlanner<f32>, x: &[f32], h: &[f32]) -> Vec<f32> {
    let n_x = x.len();
    let n_h = h.len();
    if n_x == 0 {
        return vec![];
    }

    let shift = (n_h - 1) / 2;
    let n_edge = n_h - 1;

    let x_ext = reflect_limited_pad(x, n_edge, n_edge);
    let n_ext = x_ext.len();

    let n_fft = choose_fft_len(n_h, n_ext);
    let fft_fwd = planner.plan_fft_forward(n_fft);
    let fft_inv = planner.plan_fft_inverse(n_fft);

    let mut h_fft: Vec<Complex<f32>> = to_complex_padded(h, n_fft);
    fft_fwd.process(&mut h_fft);

    let n_seg = n_fft - n_h + 1;
    let inv_scale = 1.0 / n_fft as f32;
    let mut x_filtered = vec![0.0_f32; n_ext];

    for start in (0..n_ext).step_by(n_seg) {
        let stop = (start + n_seg).min(n_ext);
        let mut buf = to_complex_padded(&x_ext[start..stop], n_fft);

        fft_fwd.process(&mut buf);
        for (b, &hf) in buf.iter_mut().zip(&h_fft) {
            *b *= hf;
        }
        fft_inv.process(&mut buf);

        // Accumulate, shifted left by the group delay.
        let out_start = start.saturating_sub(shift);
        let out_end = (out_start + n_fft).min(n_ext);
        let prod_start = shift.saturating_sub(start);
        for (o, p) in (out_start..out_end).zip(prod_start..n_fft) {
            x_filtered[o] += buf[p].re * inv_scale;
        }
    }

    x_filtered[n_edge..n_edge + n_x].to_vec()
}

fn to_complex_padded(x: &[f32], n_fft: usize) -> Vec<Complex<f32>> {
    x.iter()
        .map(|&v| Complex { re: v, im: 0.0 })
        .chain(std::iter::repeat(Complex::default()))
        .take(n_fft)
        .collect()
}

/// Choose the FFT block size (power of 2 minimising operation count).
///
/// Matches MNE's cost function:
///   `cost = ceil(n_x / (N - n_h + 1)) * N * (log2(N) + 1) + 4e-5 * N * n_x`
fn choose_fft_len(n_h: usize, n_x: usize) -> usize {
    let min_fft = 2 * n_h - 1;
    let max_pow = (n_x as f64).log2().ceil() as u32 + 1;
    let min_pow = (min_fft as f64).log2().ceil() as u32;

    let mut best_n = 1_usize << max_pow.max(min_pow);
    let mut best_cost = f64::INFINITY;
    for pow in min_pow..=max_pow {
        let n = 1_usize << pow;
        let n_seg = (n - n_h + 1) as f64;
        let cost = (n_x as f64 / n_seg).ceil() * n as f64 * (pow as f64 + 1.0)
            + 4e-5 * n as f64 * n_x as f64;
        if cost < best_cost {
            best_cost = cost;
            best_n = n;
        }
    }
    best_n
}
