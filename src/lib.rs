//! # seizure-prep — seizure / non-seizure epochs from clinical EEG
//!
//! `seizure-prep` turns annotated EDF+ recordings into balanced, labelled,
//! fixed-length epochs ready for seizure-detection training.  Every DSP step
//! follows [MNE-Python](https://mne.tools) defaults; everything runs in pure
//! Rust with [RustFFT](https://crates.io/crates/rustfft) for the heavy lifting.
//!
//! ## Pipeline overview
//!
//! ```text
//! patient01.edf
//!   │
//!   ├─ edf::open_raw()          lazy EDF+ reader, 19 channels picked
//!   ├─ seizure                  "AANVAL" markers → sorted seizure intervals
//!   ├─ RawEdf::load()           [C, T] µV  (capacity failure → split)
//!   ├─ normalize                EEG kinds · 10-20 montage · notch 50/100 Hz
//!   │                           · band-pass 0.1–70 Hz · average ref · 256 Hz
//!   ├─ epoch                    10 s windows, absolute sample times, 2 dp
//!   ├─ label                    as-of join per sample → first-mode per epoch
//!   ├─ balance                  non-seizure epochs downsampled, seed 42
//!   └─ io::write_epoch_table    patient01_epochs.safetensors
//! ```
//!
//! Recordings too large to load are rebuilt by [`split::split_recording`]
//! from their seizure intervals plus windows cut from a 30 % sample of the
//! gaps between them, about as long in total as the seizures.
//!
//! ## Quick start
//!
//! ```no_run
//! use seizure_prep::{run_batch, PipelineConfig};
//! use std::path::{Path, PathBuf};
//!
//! let cfg = PipelineConfig::default();
//! let inputs = vec![PathBuf::from("data/patient01.edf")];
//! let report = run_batch(&inputs, Path::new("out"), &cfg);
//! println!("{} written, {} excluded, {} failed",
//!     report.written(), report.excluded(), report.failed.len());
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use seizure_prep::{edf::open_raw, PipelineConfig};
//! use seizure_prep::{balance, epoch_samples, extract_seizures, label_samples, normalize, reshape};
//!
//! let cfg = PipelineConfig::default();
//! let raw = open_raw("data/patient01.edf", &cfg.channels).unwrap();
//! let seizures = extract_seizures(raw.annotations(), &cfg.seizure_marker).unwrap();
//! let rec = normalize(raw.load(None).unwrap(), &cfg).unwrap();
//! let samples = epoch_samples(&rec, &cfg).unwrap();
//! let table = reshape(label_samples(samples, &seizures)).unwrap();
//! let balanced = balance(&table, cfg.seed).unwrap();
//! ```

pub mod balance;
pub mod config;
pub mod edf;
pub mod epoch;
pub mod error;
pub mod filter;
pub mod io;
pub mod label;
pub mod montage;
pub mod normalize;
pub mod pipeline;
pub mod recording;
pub mod reference;
pub mod resample;
pub mod seizure;
pub mod split;
pub mod table;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{PipelineConfig, STANDARD_CHANNELS};

// errors
pub use error::{BalanceError, IntervalError, LoadError, NormalizeError, RecordingError};

// data model
pub use recording::{Annotation, ChannelKind, Recording};
pub use table::{EpochTable, NON_SEIZURE, SEIZURE};

// stages
pub use balance::balance;
pub use epoch::{epoch_samples, SampleTable};
pub use label::{first_mode, force_label, label_samples, reshape, LabeledSamples};
pub use normalize::{normalize, Stage};
pub use seizure::{extract_seizures, SeizureInterval, SeizureIntervals};
pub use split::{plan_interictal, split_recording};

// filter — design helpers + convolution
pub use filter::{apply_fir_zero_phase, design_bandpass, design_bandstop, filter_1d, firwin, hamming};

// io — safetensors helpers
pub use io::{output_path, read_epoch_table, write_epoch_table, StWriter};

// reference / resample
pub use reference::average_reference_inplace;
pub use resample::resample;

// driver
pub use pipeline::{discover_inputs, process_recording, run_batch, BatchReport, Exclusion, Outcome, Route};
