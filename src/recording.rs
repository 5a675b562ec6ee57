//! In-memory recording: the materialised form of one EEG capture.
use ndarray::Array2;

/// Declared modality of a channel.
///
/// Source headers are unreliable, so the normaliser overwrites every kind
/// with [`ChannelKind::Eeg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    Eeg,
    /// Whatever the source header claimed (transducer text, may be empty).
    Unspecified(String),
}

/// One annotated event, times in seconds from the start of the source file.
///
/// Annotations stay with the lazy reader; a loaded [`Recording`] carries
/// samples only and labelling works from the extracted seizure intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub onset: f64,
    /// `0.0` when the source left the duration empty.
    pub duration: f64,
    pub description: String,
}

impl Annotation {
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}

/// A fully loaded recording (or a loaded crop of one).
#[derive(Debug, Clone)]
pub struct Recording {
    /// Identifier written next to every epoch (source file stem).
    pub subject: String,
    pub ch_names: Vec<String>,
    pub ch_kinds: Vec<ChannelKind>,
    /// `[C, 3]` electrode positions in metres, set by the montage stage.
    pub positions: Option<Array2<f32>>,
    /// Sampling rate of `data` in Hz.
    pub sfreq: f32,
    /// Time of sample 0 relative to the start of the source file, seconds.
    pub first_time: f64,
    /// `[C, T]` samples in µV.
    pub data: Array2<f32>,
}

impl Recording {
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn n_times(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.n_times() as f64 / self.sfreq as f64
    }

    /// Row index of channel `name`, compared case-insensitively.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.ch_names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec() -> Recording {
        Recording {
            subject: "s".into(),
            ch_names: vec!["Fp1".into(), "Pz".into()],
            ch_kinds: vec![ChannelKind::Unspecified(String::new()); 2],
            positions: None,
            sfreq: 256.0,
            first_time: 0.0,
            data: Array2::zeros((2, 1024)),
        }
    }

    #[test]
    fn duration_from_shape() {
        approx::assert_abs_diff_eq!(rec().duration_secs(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn channel_lookup_ignores_case() {
        assert_eq!(rec().channel_index("PZ"), Some(1));
        assert_eq!(rec().channel_index("Cz"), None);
    }
}
