//! Reflect-limited edge padding (MNE's `_smart_pad`).
//!
//! Left:  `pad[i] = 2*x[0]  - x[i]`       for i in 1..=n_l
//! Right: `pad[i] = 2*x[-1] - x[-(i+1)]`  for i in 1..=n_r
//!
//! Requests longer than `len(x) - 1` are filled with zeros on the far side,
//! so the output length is always `n_l + len(x) + n_r`.

pub fn reflect_limited_pad(x: &[f32], n_l: usize, n_r: usize) -> Vec<f32> {
    let n = x.len();
    let mut out = Vec::with_capacity(n_l + n + n_r);
    if n == 0 {
        out.resize(n_l + n_r, 0.0);
        return out;
    }
    let reflect_l = n_l.min(n - 1);
    let reflect_r = n_r.min(n - 1);

    out.resize(n_l - reflect_l, 0.0);
    for i in (1..=reflect_l).rev() {
        out.push(2.0 * x[0] - x[i]);
    }

    out.extend_from_slice(x);

    let last = x[n - 1];
    for i in 1..=reflect_r {
        out.push(2.0 * last - x[n - 1 - i]);
    }
    out.resize(n_l + n + n_r, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_pad_is_odd_reflection() {
        let x = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
        let padded = reflect_limited_pad(&x, 3, 0);
        assert_eq!(&padded[..3], &[-2.0_f32, -1.0, 0.0]);
        assert_eq!(&padded[3..], &x[..]);
    }

    #[test]
    fn right_pad_is_odd_reflection() {
        let x = [1.0_f32, 2.0, 4.0];
        let padded = reflect_limited_pad(&x, 0, 2);
        assert_eq!(padded, vec![1.0, 2.0, 4.0, 6.0, 7.0]);
    }

    #[test]
    fn oversized_request_is_zero_extended() {
        let x = [1.0_f32, 3.0];
        let padded = reflect_limited_pad(&x, 4, 3);
        assert_eq!(padded.len(), 9);
        assert_eq!(&padded[..4], &[0.0, 0.0, 0.0, -1.0]);
        assert_eq!(&padded[4..6], &x[..]);
        assert_eq!(&padded[6..], &[5.0, 0.0, 0.0]);
    }
}
