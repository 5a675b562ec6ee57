/// Shared helpers: synthetic EDF+ recordings written to temp directories.
use edfplus::{EdfWriter, SignalParam};
use ndarray::Array2;
use seizure_prep::Annotation;
use std::path::{Path, PathBuf};

#[allow(unused)]
/// `[C, T]` µV test signal: a distinct alpha/theta tone per channel on top
/// of 50 Hz mains and a DC offset.
pub fn synthetic_data(n_ch: usize, sfreq: f32, secs: usize) -> Array2<f32> {
    let n_t = sfreq as usize * secs;
    Array2::from_shape_fn((n_ch, n_t), |(c, t)| {
        let t = t as f32 / sfreq;
        let tone = 4.0 + 0.5 * c as f32;
        25.0 * (2.0 * std::f32::consts::PI * tone * t).sin()
            + 8.0 * (2.0 * std::f32::consts::PI * 50.0 * t).sin()
            + 40.0
    })
}

#[allow(unused)]
pub fn seizure(onset: f64, duration: f64) -> Annotation {
    Annotation { onset, duration, description: "AANVAL".into() }
}

fn eeg_signal(label: String, spr: i32) -> SignalParam {
    SignalParam {
        label,
        samples_in_file: 0,
        physical_max: 200.0,
        physical_min: -200.0,
        digital_max: 32767,
        digital_min: -32768,
        samples_per_record: spr,
        physical_dimension: "uV".into(),
        prefilter: "HP:0.1Hz".into(),
        transducer: "AgAgCl electrode".into(),
    }
}

#[allow(unused)]
/// Write `<dir>/<name>.edf` with `channels` labelled `EEG <name>-REF`,
/// one-second data records.
pub fn write_recording(
    dir: &Path,
    name: &str,
    channels: &[&str],
    sfreq: f32,
    secs: usize,
    annotations: &[Annotation],
) -> PathBuf {
    let path = dir.join(format!("{name}.edf"));
    let spr = sfreq as usize;
    let data = synthetic_data(channels.len(), sfreq, secs);

    let mut w = EdfWriter::create(&path).unwrap();
    w.set_patient_info("P001", "X", "X", name).unwrap();
    for c in channels {
        w.add_signal(eeg_signal(format!("EEG {c}-REF"), spr as i32)).unwrap();
    }
    // annotations are placed into records as they are written
    for a in annotations {
        w.add_annotation(a.onset, Some(a.duration), &a.description).unwrap();
    }
    for rec in 0..secs {
        let record: Vec<Vec<f64>> = data
            .rows()
            .into_iter()
            .map(|row| row.iter().skip(rec * spr).take(spr).map(|&v| v as f64).collect())
            .collect();
        w.write_samples(&record).unwrap();
    }
    w.finalize().unwrap();
    path
}

#[allow(unused)]
pub const ALL_19: [&str; 19] = seizure_prep::STANDARD_CHANNELS;

#[allow(unused)]
pub const FOUR: [&str; 4] = ["Fp1", "Cz", "Pz", "O1"];
