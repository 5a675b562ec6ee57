//! EDF+ recording reader.
//!
//! Implements the recording-reader collaborator of the pipeline on top of
//! the `edfplus` crate: lazy open with channel selection, annotation
//! access, cropping and fallible full materialisation.
//!
//! # Quick start
//! ```no_run
//! use seizure_prep::edf::open_raw;
//! use seizure_prep::PipelineConfig;
//!
//! let cfg = PipelineConfig::default();
//! let raw = open_raw("data/patient01.edf", &cfg.channels).unwrap();
//! println!("{} channels @ {} Hz, {} annotations",
//!     raw.ch_names.len(), raw.sfreq, raw.annotations().len());
//! let first_minute = raw.crop(0.0, 60.0).load(None).unwrap();  // [C, 60·sfreq] µV
//! ```
pub mod raw;

pub use raw::{electrode_name, microvolt_scale, open_raw, RawEdf};
