//! Seizure intervals derived from annotation markers, and their complement.
use crate::error::IntervalError;
use crate::recording::Annotation;

/// A closed time range `[onset, end]` in seconds from the file start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeizureInterval {
    pub onset: f64,
    pub duration: f64,
    pub end: f64,
}

impl SeizureInterval {
    pub fn new(onset: f64, duration: f64) -> Self {
        Self { onset, duration, end: onset + duration }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.onset && t <= self.end
    }
}

/// Seizure intervals sorted by onset, each strictly positive in length and
/// none overlapping the next.
///
/// The only way to build one is [`SeizureIntervals::new`] (or
/// [`extract_seizures`]), which checks those properties; labelling relies
/// on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeizureIntervals(Vec<SeizureInterval>);

impl SeizureIntervals {
    pub fn new(mut intervals: Vec<SeizureInterval>) -> Result<Self, IntervalError> {
        intervals.sort_by(|a, b| a.onset.total_cmp(&b.onset));
        for pair in intervals.windows(2) {
            if pair[1].onset < pair[0].end {
                return Err(IntervalError::Overlapping {
                    prev_end: pair[0].end,
                    next_onset: pair[1].onset,
                });
            }
        }
        Ok(Self(intervals))
    }

    pub fn as_slice(&self) -> &[SeizureInterval] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeizureInterval> {
        self.0.iter()
    }

    /// Total seizure time in seconds.
    pub fn total_duration(&self) -> f64 {
        self.0.iter().map(|s| s.duration).sum()
    }

    /// The interval with the latest onset `<= t` (as-of match).
    pub fn as_of(&self, t: f64) -> Option<&SeizureInterval> {
        let n = self.0.partition_point(|s| s.onset <= t);
        n.checked_sub(1).map(|i| &self.0[i])
    }

    /// Gaps between seizures: before the first, between consecutive ones,
    /// and after the last up to `recording_end`.  Empty gaps are omitted.
    pub fn interictal(&self, recording_start: f64, recording_end: f64) -> Vec<SeizureInterval> {
        let mut gaps = Vec::with_capacity(self.0.len() + 1);
        let mut cursor = recording_start;
        for s in &self.0 {
            if s.onset > cursor {
                gaps.push(SeizureInterval::new(cursor, s.onset - cursor));
            }
            cursor = cursor.max(s.end);
        }
        if recording_end > cursor {
            gaps.push(SeizureInterval::new(cursor, recording_end - cursor));
        }
        gaps
    }
}

impl<'a> IntoIterator for &'a SeizureIntervals {
    type Item = &'a SeizureInterval;
    type IntoIter = std::slice::Iter<'a, SeizureInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build the seizure intervals from every annotation whose description is
/// exactly `marker`.
///
/// Markers without a positive duration cannot cover any sample span and are
/// dropped with a warning.  Annotations are not modified.
pub fn extract_seizures(annotations: &[Annotation], marker: &str) -> Result<SeizureIntervals, IntervalError> {
    let intervals = annotations
        .iter()
        .filter(|a| a.description == marker)
        .filter(|a| {
            let keep = a.duration > 0.0;
            if !keep {
                log::warn!("ignoring {marker} marker at {:.3} s without duration", a.onset);
            }
            keep
        })
        .map(|a| SeizureInterval::new(a.onset, a.duration))
        .collect();
    SeizureIntervals::new(intervals)
}
