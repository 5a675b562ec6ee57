mod common;
use common::{seizure, synthetic_data, write_recording, FOUR};
use seizure_prep::edf::open_raw;
use seizure_prep::{Annotation, LoadError};

fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn open_picks_requested_channels_in_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 20, &[]);
    let raw = open_raw(&path, &names(&["Pz", "T3", "fp1"])).unwrap();
    assert_eq!(raw.ch_names, names(&["Pz", "fp1"]));
    approx::assert_abs_diff_eq!(raw.sfreq, 256.0);
    assert_eq!(raw.n_times(), 20 * 256);
    assert_eq!(raw.subject, "r");
}

#[test]
fn open_without_any_requested_channel_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 5, &[]);
    assert!(open_raw(&path, &names(&["T5", "T6"])).is_err());
}

#[test]
fn annotations_survive_the_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let anns = [
        seizure(3.5, 12.25),
        Annotation { onset: 17.0, duration: 0.0, description: "slaap".into() },
    ];
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 30, &anns);
    let raw = open_raw(&path, &names(&FOUR)).unwrap();
    assert_eq!(raw.annotations(), &anns);
}

#[test]
fn load_returns_microvolts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 10, &[]);
    let rec = open_raw(&path, &names(&FOUR)).unwrap().load(None).unwrap();
    let expected = synthetic_data(4, 256.0, 10);
    assert_eq!(rec.data.dim(), expected.dim());
    for (a, b) in rec.data.iter().zip(expected.iter()) {
        approx::assert_abs_diff_eq!(a, b, epsilon = 0.01);
    }
}

#[test]
fn crop_is_an_independent_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 30, &[seizure(2.0, 3.0), seizure(12.0, 4.0)]);
    let raw = open_raw(&path, &names(&FOUR)).unwrap();
    let seg = raw.crop(10.5, 20.0);
    assert_eq!(seg.n_times(), 2432);
    approx::assert_abs_diff_eq!(seg.first_time(), 10.5);
    assert_eq!(seg.annotations().len(), 1);
    // parent untouched
    assert_eq!(raw.n_times(), 30 * 256);

    let rec = seg.load(None).unwrap();
    let full = raw.load(None).unwrap();
    approx::assert_abs_diff_eq!(rec.first_time, 10.5);
    for c in 0..4 {
        for t in [0, 1000, 2431] {
            approx::assert_abs_diff_eq!(rec.data[[c, t]], full.data[[c, 2688 + t]]);
        }
    }
}

#[test]
fn crop_is_clamped_to_the_recording() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 10, &[]);
    let raw = open_raw(&path, &names(&FOUR)).unwrap();
    assert_eq!(raw.crop(-5.0, 100.0).n_times(), 2560);
    assert_eq!(raw.crop(8.0, 4.0).n_times(), 0);
}

#[test]
fn load_over_budget_is_capacity_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 10, &[]);
    let raw = open_raw(&path, &names(&FOUR)).unwrap();
    assert_eq!(raw.load_bytes(), 4 * 2560 * 4);
    match raw.load(Some(1024)) {
        Err(LoadError::Capacity { needed, .. }) => assert_eq!(needed, 40960),
        other => panic!("expected capacity failure, got {other:?}"),
    }
    assert!(raw.crop(0.0, 0.25).load(Some(1024)).is_ok());
}

#[test]
fn budget_converts_to_window_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 10, &[]);
    let raw = open_raw(&path, &names(&FOUR)).unwrap();
    // 4 channels × 4 bytes × 256 Hz = 4096 bytes per second
    approx::assert_abs_diff_eq!(raw.max_load_secs(40_960), 10.0);
    let secs = raw.max_load_secs(20_480);
    assert!(raw.crop(0.0, secs).load(Some(20_480)).is_ok());
}

#[test]
fn open_rejects_a_file_that_is_not_edf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.edf");
    std::fs::write(&path, b"not an edf file").unwrap();
    assert!(open_raw(&path, &names(&FOUR)).is_err());
}

#[test]
fn open_rejects_a_flat_digital_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "r", &FOUR, 256.0, 5, &[]);
    let mut bytes = std::fs::read(&path).unwrap();
    // four EEG signals plus the annotation signal
    let ns = 5;
    let dig_min = 256 + ns * 120;
    let dig_max = 256 + ns * 128;
    let min_field = bytes[dig_min..dig_min + 8].to_vec();
    bytes[dig_max..dig_max + 8].copy_from_slice(&min_field);
    std::fs::write(&path, &bytes).unwrap();
    assert!(open_raw(&path, &names(&FOUR)).is_err());
}
