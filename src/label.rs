//! Per-sample labelling against seizure intervals, and the reshape from
//! one-column-per-sample to one-row-per-epoch.
use anyhow::{bail, Result};
use ndarray::{s, Array2, Array3};

use crate::epoch::SampleTable;
use crate::seizure::SeizureIntervals;
use crate::table::{EpochTable, NON_SEIZURE, SEIZURE};

/// Per-sample table after labelling.  The time column used for the join is
/// gone; only channel values, epoch index and label remain.
#[derive(Debug, Clone)]
pub struct LabeledSamples {
    pub subject: String,
    pub ch_names: Vec<String>,
    pub sfreq: f32,
    pub epoch_len: usize,
    pub epoch: Vec<u32>,
    /// `[C, N]`
    pub data: Array2<f32>,
    pub label: Vec<u8>,
}

/// Label every sample by as-of join on its absolute time.
///
/// Each sample is matched to the seizure with the latest onset at or before
/// it and labelled [`SEIZURE`] when it also lies at or before that
/// seizure's end.
pub fn label_samples(table: SampleTable, seizures: &SeizureIntervals) -> LabeledSamples {
    let label = table
        .time
        .iter()
        .map(|&t| match seizures.as_of(t) {
            Some(s) if t <= s.end => SEIZURE,
            _ => NON_SEIZURE,
        })
        .collect();
    finish(table, label)
}

/// Label every sample `label` without consulting any interval.
pub fn force_label(table: SampleTable, label: u8) -> LabeledSamples {
    let label = vec![label; table.len()];
    finish(table, label)
}

fn finish(table: SampleTable, label: Vec<u8>) -> LabeledSamples {
    LabeledSamples {
        subject: table.subject,
        ch_names: table.ch_names,
        sfreq: table.sfreq,
        epoch_len: table.epoch_len,
        epoch: table.epoch,
        data: table.data,
        label,
    }
}

/// Most frequent value of `labels`; among equally frequent values the one
/// occurring first wins.  `0` for an empty slice.
pub fn first_mode(labels: &[u8]) -> u8 {
    let mut counts = [0usize; 256];
    for &l in labels {
        counts[l as usize] += 1;
    }
    let best = counts.iter().copied().max().unwrap_or(0);
    labels
        .iter()
        .copied()
        .find(|&l| counts[l as usize] == best)
        .unwrap_or(NON_SEIZURE)
}

/// Group samples by epoch index into an [`EpochTable`].
///
/// Each channel's samples of one epoch become that row's `[T]` array; the
/// row label is the [`first_mode`] of the epoch's sample labels.  Epoch
/// rows follow the order in which epoch indices first appear.
pub fn reshape(samples: LabeledSamples) -> Result<EpochTable> {
    let len = samples.epoch_len;
    let n_ch = samples.ch_names.len();
    if len == 0 {
        bail!("epoch length is zero");
    }
    if samples.epoch.len() % len != 0 {
        bail!("{} samples do not form whole {len}-sample epochs", samples.epoch.len());
    }
    let n_epochs = samples.epoch.len() / len;

    let mut data = Array3::<f32>::zeros((n_epochs, n_ch, len));
    let mut labels = Vec::with_capacity(n_epochs);
    for (e, ids) in samples.epoch.chunks(len).enumerate() {
        if ids.iter().any(|&id| id != ids[0]) {
            bail!("epoch {} is not contiguous in the sample table", ids[0]);
        }
        let cols = e * len..(e + 1) * len;
        data.slice_mut(s![e, .., ..])
            .assign(&samples.data.slice(s![.., cols.clone()]));
        labels.push(first_mode(&samples.label[cols]));
    }

    Ok(EpochTable {
        subject: samples.subject,
        ch_names: samples.ch_names,
        sfreq: samples.sfreq,
        data,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seizure::SeizureInterval;

    /// One channel at 1 Hz, `n_epochs` epochs of 10 samples from t = 0.
    fn table(n_epochs: usize) -> SampleTable {
        let n = n_epochs * 10;
        SampleTable {
            subject: "s".into(),
            ch_names: vec!["Pz".into()],
            sfreq: 1.0,
            epoch_len: 10,
            epoch: (0..n).map(|j| (j / 10) as u32).collect(),
            time: (0..n).map(|j| j as f64).collect(),
            data: Array2::from_shape_fn((1, n), |(_, j)| j as f32),
        }
    }

    fn one(onset: f64, duration: f64) -> SeizureIntervals {
        SeizureIntervals::new(vec![SeizureInterval::new(onset, duration)]).unwrap()
    }

    #[test]
    fn majority_inside_is_seizure() {
        let t = reshape(label_samples(table(1), &one(4.0, 20.0))).unwrap();
        assert_eq!(t.labels, vec![1]);
    }

    #[test]
    fn minority_inside_is_not_seizure() {
        let t = reshape(label_samples(table(1), &one(6.0, 20.0))).unwrap();
        assert_eq!(t.labels, vec![0]);
    }

    #[test]
    fn tie_goes_to_first_sample() {
        // samples 0..=4 inside, 5..=9 outside
        let t = reshape(label_samples(table(1), &one(0.0, 4.0))).unwrap();
        assert_eq!(t.labels, vec![1]);
        // samples 0..=4 outside, 5..=9 inside
        let t = reshape(label_samples(table(1), &one(5.0, 20.0))).unwrap();
        assert_eq!(t.labels, vec![0]);
    }

    #[test]
    fn end_is_inclusive() {
        let l = label_samples(table(1), &one(2.0, 3.0));
        assert_eq!(l.label, vec![0, 0, 1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn sample_after_earlier_seizure_is_clear() {
        let seizures = SeizureIntervals::new(vec![
            SeizureInterval::new(1.0, 1.0),
            SeizureInterval::new(15.0, 2.0),
        ])
        .unwrap();
        let l = label_samples(table(2), &seizures);
        assert_eq!(l.label.iter().filter(|&&v| v == 1).count(), 5);
        assert_eq!(l.label[5], 0);
        assert_eq!(l.label[16], 1);
    }

    #[test]
    fn forced_labels() {
        let t = reshape(force_label(table(3), NON_SEIZURE)).unwrap();
        assert_eq!(t.labels, vec![0, 0, 0]);
    }

    #[test]
    fn reshape_keeps_sample_order() {
        let t = reshape(force_label(table(2), 0)).unwrap();
        assert_eq!(t.data.dim(), (2, 1, 10));
        assert_eq!(t.data[[1, 0, 0]], 10.0);
        assert_eq!(t.data[[1, 0, 9]], 19.0);
    }

    #[test]
    fn first_mode_cases() {
        assert_eq!(first_mode(&[0, 1, 1]), 1);
        assert_eq!(first_mode(&[1, 0, 0, 1]), 1);
        assert_eq!(first_mode(&[0, 1, 1, 0]), 0);
        assert_eq!(first_mode(&[]), 0);
    }

    #[test]
    fn forty_second_scenario() {
        let n = 40 * 256;
        let samples = SampleTable {
            subject: "s".into(),
            ch_names: vec!["Pz".into()],
            sfreq: 256.0,
            epoch_len: 2560,
            epoch: (0..n).map(|j| (j / 2560) as u32).collect(),
            time: (0..n).map(|j| j as f64 / 256.0).collect(),
            data: Array2::zeros((1, n)),
        };
        let t = reshape(label_samples(samples, &one(12.0, 10.0))).unwrap();
        assert_eq!(t.labels, vec![0, 1, 0, 0]);
    }
}
