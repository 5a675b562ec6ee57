//! Average reference: subtract the instantaneous mean of all channels.
//!
//! Matches `raw.set_eeg_reference('average', projection=False)`.
//!
//! `data`: [C, T]  →  `data[c, t] -= mean(data[:, t])`
use ndarray::{Array2, Axis};

/// Re-reference in place.  A recording with no channels is left untouched.
pub fn average_reference_inplace(data: &mut Array2<f32>) {
    let Some(means) = data.mean_axis(Axis(0)) else {
        return;
    };
    for mut row in data.rows_mut() {
        row -= &means;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sum_is_zero_after_reference() {
        let mut data = Array2::from_shape_fn((19, 512), |(c, t)| ((c * 7 + t * 3) as f32).sin() * 40.0);
        average_reference_inplace(&mut data);
        for &s in data.sum_axis(Axis(0)).iter() {
            approx::assert_abs_diff_eq!(s, 0.0, epsilon = 1e-3_f32);
        }
    }

    #[test]
    fn common_mode_is_removed() {
        // Every channel carries the same 50 µV offset plus its own signal.
        let mut data = Array2::from_shape_fn((3, 64), |(c, t)| 50.0 + (c as f32 - 1.0) * t as f32);
        average_reference_inplace(&mut data);
        for t in 0..64 {
            approx::assert_abs_diff_eq!(data[[1, t]], 0.0, epsilon = 1e-4);
            approx::assert_abs_diff_eq!(data[[0, t]] - data[[2, t]], -2.0 * t as f32, epsilon = 1e-3);
        }
    }

    #[test]
    fn empty_channel_set_is_noop() {
        let mut data = Array2::<f32>::zeros((0, 10));
        average_reference_inplace(&mut data);
        assert_eq!(data.dim(), (0, 10));
    }
}
