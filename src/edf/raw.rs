//! Lazy EDF+ recording: the reader the pipeline talks to.
//!
//! # Algorithm
//! 1. `EdfReader::open` parses the header and the annotation signal without
//!    touching any EEG samples; the requested signals are picked by label.
//! 2. A half-open sample window `[start, stop)` describes the part of the
//!    file a [`RawEdf`] stands for; cropping narrows it.
//! 3. `load()` seeks every picked signal to `start`, reads exactly
//!    `stop - start` physical samples and converts them to µV.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use edfplus::{EdfReader, EDFLIB_TIME_DIMENSION};
use ndarray::Array2;

use crate::error::LoadError;
use crate::recording::{Annotation, ChannelKind, Recording};

/// Reduce an EDF signal label to a bare electrode name.
///
/// `"EEG Fp1-REF"` → `"fp1"`, `" Cz "` → `"cz"`.
pub fn electrode_name(label: &str) -> String {
    let mut s = label.trim();
    if s.len() > 4 && s.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("eeg ")) {
        s = s[4..].trim_start();
    }
    if let Some(i) = s.find('-') {
        s = &s[..i];
    }
    s.replace(' ', "").to_lowercase()
}

/// Factor from a signal's physical dimension to µV.
pub fn microvolt_scale(dimension: &str) -> f64 {
    match dimension.trim() {
        "V" => 1e6,
        "mV" => 1e3,
        "nV" => 1e-3,
        _ => 1.0,
    }
}

/// Seconds from an `edfplus` time value (100 ns ticks).
fn ticks_to_secs(ticks: i64) -> f64 {
    ticks as f64 / EDFLIB_TIME_DIMENSION as f64
}

/// A picked EEG signal.
#[derive(Debug, Clone)]
struct Pick {
    /// Signal index as understood by [`EdfReader`].
    signal: usize,
    to_uv: f64,
    transducer: String,
}

/// A recording opened without materialising samples.
///
/// Crops share the underlying [`EdfReader`]; each keeps its own window.
#[derive(Clone)]
pub struct RawEdf {
    pub path: PathBuf,
    /// Subject identifier (file stem).
    pub subject: String,
    /// Names of the picked channels, spelled as requested.
    pub ch_names: Vec<String>,
    pub sfreq: f64,
    picks: Vec<Pick>,
    /// First sample of the window (inclusive), in file samples.
    start: usize,
    /// End of the window (exclusive), in file samples.
    stop: usize,
    /// Annotations overlapping the window, seconds from the file start.
    annotations: Vec<Annotation>,
    reader: Arc<Mutex<EdfReader>>,
}

impl std::fmt::Debug for RawEdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawEdf")
            .field("path", &self.path)
            .field("ch_names", &self.ch_names)
            .field("sfreq", &self.sfreq)
            .field("window", &(self.start..self.stop))
            .field("annotations", &self.annotations.len())
            .finish()
    }
}

impl RawEdf {
    /// Number of samples in the current window.
    #[inline]
    pub fn n_times(&self) -> usize {
        self.stop - self.start
    }

    /// Window start in seconds from the file start.
    #[inline]
    pub fn first_time(&self) -> f64 {
        self.start as f64 / self.sfreq
    }

    /// Window duration in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.n_times() as f64 / self.sfreq
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Bytes a full `load()` of the window would allocate.
    pub fn load_bytes(&self) -> usize {
        self.ch_names
            .len()
            .saturating_mul(self.n_times())
            .saturating_mul(std::mem::size_of::<f32>())
    }

    /// Longest window, in seconds, whose `load()` fits in `budget` bytes.
    pub fn max_load_secs(&self, budget: usize) -> f64 {
        let per_second = (self.ch_names.len() * std::mem::size_of::<f32>()) as f64 * self.sfreq;
        budget as f64 / per_second
    }

    /// Independent sub-recording covering `[tmin, tmax)` seconds of the
    /// source file, clamped to the current window.
    pub fn crop(&self, tmin: f64, tmax: f64) -> RawEdf {
        let to_sample = |t: f64| ((t * self.sfreq).round().max(0.0) as usize).clamp(self.start, self.stop);
        let start = to_sample(tmin);
        let stop = to_sample(tmax).max(start);
        let (t0, t1) = (start as f64 / self.sfreq, stop as f64 / self.sfreq);
        let annotations = self
            .annotations
            .iter()
            .filter(|a| a.onset < t1 && a.end() >= t0)
            .cloned()
            .collect();
        RawEdf { start, stop, annotations, ..self.clone() }
    }

    /// Materialise the window into a [`Recording`].
    ///
    /// Fails with [`LoadError::Capacity`] when the matrix exceeds `budget`
    /// bytes or the allocator refuses it.
    pub fn load(&self, budget: Option<usize>) -> Result<Recording, LoadError> {
        let n_ch = self.ch_names.len();
        let n_t = self.n_times();
        let needed = self.load_bytes();
        if let Some(budget) = budget {
            if needed > budget {
                return Err(LoadError::Capacity {
                    needed,
                    reason: format!("budget is {budget} bytes"),
                });
            }
        }

        let mut buf: Vec<f32> = Vec::new();
        buf.try_reserve_exact(n_ch * n_t).map_err(|e| LoadError::Capacity {
            needed,
            reason: e.to_string(),
        })?;
        buf.resize(n_ch * n_t, 0.0);
        self.read_window_into(&mut buf)?;
        let data = Array2::from_shape_vec((n_ch, n_t), buf).map_err(anyhow::Error::from)?;

        Ok(Recording {
            subject: self.subject.clone(),
            ch_names: self.ch_names.clone(),
            ch_kinds: self
                .picks
                .iter()
                .map(|p| ChannelKind::Unspecified(p.transducer.clone()))
                .collect(),
            positions: None,
            sfreq: self.sfreq as f32,
            first_time: self.first_time(),
            data,
        })
    }

    /// Fill `out` (row-major `[C, T]`) with the window's samples in µV.
    fn read_window_into(&self, out: &mut [f32]) -> Result<()> {
        let n_t = self.n_times();
        if n_t == 0 {
            return Ok(());
        }
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| anyhow!("reader of {} poisoned by an earlier panic", self.path.display()))?;
        for (row, pick) in out.chunks_exact_mut(n_t).zip(&self.picks) {
            reader
                .seek(pick.signal, self.start as i64)
                .with_context(|| format!("seek signal {} of {}", pick.signal, self.path.display()))?;
            let samples = reader
                .read_physical_samples(pick.signal, n_t)
                .with_context(|| format!("read signal {} of {}", pick.signal, self.path.display()))?;
            if samples.len() != n_t {
                bail!(
                    "{}: signal {} ends after {} of {n_t} samples",
                    self.path.display(),
                    pick.signal,
                    samples.len()
                );
            }
            for (dst, v) in row.iter_mut().zip(samples) {
                *dst = (v * pick.to_uv) as f32;
            }
        }
        Ok(())
    }
}

/// Open `path` lazily, keeping only the signals named in `include`.
///
/// Names in `include` are matched against [`electrode_name`] of every
/// signal label; channels not present in the file are simply absent from
/// [`RawEdf::ch_names`].  Mirrors
/// `mne.io.read_raw_edf(path, include=…, preload=False)`.
pub fn open_raw<P: AsRef<Path>>(path: P, include: &[String]) -> Result<RawEdf> {
    let path = path.as_ref();
    let reader = EdfReader::open(path).with_context(|| format!("open EDF+ file {}", path.display()))?;
    let header = reader.header();

    let mut picks = Vec::new();
    let mut ch_names = Vec::new();
    for name in include {
        let wanted = electrode_name(name);
        if let Some(i) = header.signals.iter().position(|s| electrode_name(&s.label) == wanted) {
            let s = &header.signals[i];
            picks.push(Pick {
                signal: i,
                to_uv: microvolt_scale(&s.physical_dimension),
                transducer: s.transducer.clone(),
            });
            ch_names.push(name.clone());
        }
    }
    let Some(first) = picks.first() else {
        bail!("{} contains none of the requested channels", path.display());
    };

    let spr = header.signals[first.signal].samples_per_record;
    if let Some(odd) = picks.iter().find(|p| header.signals[p.signal].samples_per_record != spr) {
        let s = &header.signals[odd.signal];
        bail!(
            "mixed sampling rates: {} has {} samples per record, expected {spr}",
            s.label,
            s.samples_per_record
        );
    }
    let record_secs = ticks_to_secs(header.datarecord_duration);
    if spr <= 0 || record_secs <= 0.0 {
        bail!("{}: {spr} samples per {record_secs} s record", path.display());
    }
    let sfreq = spr as f64 / record_secs;
    let stop = spr as usize * header.datarecords_in_file.max(0) as usize;

    let annotations = reader
        .annotations()
        .iter()
        .map(|a| Annotation {
            onset: ticks_to_secs(a.onset),
            duration: ticks_to_secs(a.duration.max(0)),
            description: a.description.clone(),
        })
        .collect();

    let subject = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(RawEdf {
        path: path.to_path_buf(),
        subject,
        ch_names,
        sfreq,
        picks,
        start: 0,
        stop,
        annotations,
        reader: Arc::new(Mutex::new(reader)),
    })
}
