//! One-row-per-epoch table: the unit written to disk.
use anyhow::{bail, Result};
use ndarray::{s, Array3, ArrayView2, Axis};

/// Seizure class of an epoch.
pub const SEIZURE: u8 = 1;
/// Non-seizure class of an epoch.
pub const NON_SEIZURE: u8 = 0;

/// Labelled epochs of one recording.
///
/// Row `e` is `data[e, .., ..]` (one `[T]` array per channel) plus
/// `labels[e]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochTable {
    pub subject: String,
    /// Column order of the channel axis.
    pub ch_names: Vec<String>,
    pub sfreq: f32,
    /// `[E, C, T]`
    pub data: Array3<f32>,
    pub labels: Vec<u8>,
}

impl EpochTable {
    /// A table with no rows.
    pub fn empty(subject: &str, ch_names: Vec<String>, sfreq: f32, epoch_len: usize) -> Self {
        let n_ch = ch_names.len();
        Self {
            subject: subject.to_string(),
            ch_names,
            sfreq,
            data: Array3::zeros((0, n_ch, epoch_len)),
            labels: vec![],
        }
    }

    #[inline]
    pub fn n_epochs(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn epoch_len(&self) -> usize {
        self.data.dim().2
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of rows carrying `label`.
    pub fn count(&self, label: u8) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// `[E, T]` view of channel `c`: the array-valued column.
    pub fn column(&self, c: usize) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., c, ..])
    }

    /// Rows at `rows`, in that order.
    pub fn select(&self, rows: &[usize]) -> EpochTable {
        EpochTable {
            subject: self.subject.clone(),
            ch_names: self.ch_names.clone(),
            sfreq: self.sfreq,
            data: self.data.select(Axis(0), rows),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }

    /// Append the rows of `other`.  Channel layout and epoch length must match.
    pub fn append(&mut self, other: EpochTable) -> Result<()> {
        if other.ch_names != self.ch_names {
            bail!("cannot append epochs with a different channel layout");
        }
        if other.epoch_len() != self.epoch_len() {
            bail!(
                "cannot append {}-sample epochs to {}-sample epochs",
                other.epoch_len(),
                self.epoch_len()
            );
        }
        self.data.append(Axis(0), other.data.view())?;
        self.labels.extend(other.labels);
        Ok(())
    }
}
