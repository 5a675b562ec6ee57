mod common;
use common::{seizure, write_recording, ALL_19, FOUR};
use seizure_prep::edf::open_raw;
use seizure_prep::{
    epoch_samples, process_recording, read_epoch_table, run_batch, Annotation, Exclusion, Outcome,
    PipelineConfig, Route, NON_SEIZURE, SEIZURE,
};

#[test]
fn forty_second_recording_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "p01", &ALL_19, 256.0, 40, &[seizure(12.0, 10.0)]);

    let outcome = process_recording(&path, dir.path(), &PipelineConfig::default()).unwrap();
    let (output, route, seizure_epochs) = match outcome {
        Outcome::Written { output, route, seizure_epochs } => (output, route, seizure_epochs),
        other => panic!("expected a written table, got {other:?}"),
    };
    assert_eq!(route, Route::Full);
    assert_eq!(seizure_epochs, 1);
    assert_eq!(output, dir.path().join("p01_epochs.safetensors"));

    let table = read_epoch_table(&output).unwrap();
    assert_eq!(table.subject, "p01");
    assert_eq!(table.labels, vec![SEIZURE, NON_SEIZURE]);
    assert_eq!(table.data.dim(), (2, 19, 2560));
    assert_eq!(table.ch_names, PipelineConfig::default().channels);
    approx::assert_abs_diff_eq!(table.sfreq, 256.0);
}

#[test]
fn every_label_is_binary_and_classes_balance() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(
        dir.path(),
        "p02",
        &FOUR,
        256.0,
        120,
        &[seizure(20.0, 15.0), seizure(70.0, 25.0)],
    );
    let out = match process_recording(&path, dir.path(), &PipelineConfig::default()).unwrap() {
        Outcome::Written { output, .. } => output,
        other => panic!("unexpected {other:?}"),
    };
    let table = read_epoch_table(&out).unwrap();
    assert!(table.labels.iter().all(|&l| l == SEIZURE || l == NON_SEIZURE));
    assert_eq!(table.count(SEIZURE), table.count(NON_SEIZURE));
    // seizure rows come first
    let n = table.count(SEIZURE);
    assert!(table.labels[..n].iter().all(|&l| l == SEIZURE));
}

fn five_channel_cfg() -> PipelineConfig {
    PipelineConfig {
        channels: vec!["Fp1".into(), "Fp2".into(), "Cz".into(), "O1".into(), "Pz".into()],
        ..PipelineConfig::default()
    }
}

#[test]
fn missing_pz_is_mean_of_loaded_channels_before_referencing() {
    let dir = tempfile::tempdir().unwrap();
    let channels = ["Fp1", "Fp2", "Cz", "O1"];
    let path = write_recording(dir.path(), "nopz", &channels, 256.0, 20, &[]);
    let cfg = five_channel_cfg();
    let rec = open_raw(&path, &cfg.channels).unwrap().load(None).unwrap();
    assert_eq!(rec.n_channels(), 4);

    let table = epoch_samples(&rec, &cfg).unwrap();
    assert_eq!(table.ch_names[4], "Pz");
    for j in (0..table.len()).step_by(97) {
        let mean = rec.data.column(j).sum() / 4.0;
        // the fixture carries a 40 µV offset, so the mean is far from zero
        assert!(mean.abs() > 1.0);
        approx::assert_abs_diff_eq!(table.data[[4, j]], mean, epsilon = 0.006);
        for c in 0..4 {
            approx::assert_abs_diff_eq!(table.data[[c, j]], rec.data[[c, j]], epsilon = 0.006);
        }
    }
}

#[test]
fn missing_pz_after_average_reference_is_flat() {
    let dir = tempfile::tempdir().unwrap();
    let channels = ["Fp1", "Fp2", "Cz", "O1"];
    let path = write_recording(dir.path(), "nopz", &channels, 256.0, 40, &[seizure(10.0, 10.0)]);
    let out = match process_recording(&path, dir.path(), &five_channel_cfg()).unwrap() {
        Outcome::Written { output, .. } => output,
        other => panic!("unexpected {other:?}"),
    };
    let table = read_epoch_table(&out).unwrap();
    // the present channels still carry signal
    let peak = (0..4)
        .map(|c| table.column(c).iter().fold(0f32, |m, v| m.max(v.abs())))
        .fold(f32::INFINITY, f32::min);
    assert!(peak > 1.0, "present channel peak {peak}");
    // their mean is zero after the average reference, and so is Pz
    let pz = table.column(4);
    for e in 0..table.n_epochs() {
        for t in 0..table.epoch_len() {
            let mean = (0..4).map(|c| table.data[[e, c, t]]).sum::<f32>() / 4.0;
            approx::assert_abs_diff_eq!(pz[[e, t]], mean, epsilon = 0.011);
            approx::assert_abs_diff_eq!(pz[[e, t]], 0.0, epsilon = 0.011);
        }
    }
}

#[test]
fn short_only_seizure_excludes_recording() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "short", &FOUR, 256.0, 60, &[seizure(31.0, 3.0)]);
    let outcome = process_recording(&path, dir.path(), &PipelineConfig::default()).unwrap();
    assert_eq!(outcome, Outcome::Excluded { reason: Exclusion::NoSeizureEpochs });
    assert!(!dir.path().join("short_epochs.safetensors").exists());
}

#[test]
fn recording_without_marker_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let other = Annotation { onset: 5.0, duration: 10.0, description: "slaap".into() };
    let path = write_recording(dir.path(), "calm", &FOUR, 256.0, 30, &[other]);
    let outcome = process_recording(&path, dir.path(), &PipelineConfig::default()).unwrap();
    assert_eq!(outcome, Outcome::Excluded { reason: Exclusion::NoSeizureAnnotations });
}

#[test]
fn higher_source_rate_is_resampled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "fast", &FOUR, 512.0, 40, &[seizure(10.0, 10.0)]);
    let out = match process_recording(&path, dir.path(), &PipelineConfig::default()).unwrap() {
        Outcome::Written { output, .. } => output,
        other => panic!("unexpected {other:?}"),
    };
    let table = read_epoch_table(&out).unwrap();
    assert_eq!(table.epoch_len(), 2560);
    assert_eq!(table.labels, vec![SEIZURE, NON_SEIZURE]);
}

#[test]
fn batch_isolates_failures_and_collects_seizure_subjects() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_recording(dir.path(), "good", &FOUR, 256.0, 40, &[seizure(10.0, 10.0)]);
    let calm = write_recording(dir.path(), "calm", &FOUR, 256.0, 20, &[]);
    let broken = dir.path().join("broken.edf");
    std::fs::write(&broken, b"not an edf file").unwrap();

    let paths = vec![broken.clone(), good, calm];
    let report = run_batch(&paths, dir.path(), &PipelineConfig::default());
    assert_eq!(report.written(), 1);
    assert_eq!(report.excluded(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, broken);
    assert_eq!(report.seizure_subjects, vec!["good".to_string()]);
}

#[test]
fn rerun_with_skip_existing_leaves_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_recording(dir.path(), "p03", &FOUR, 256.0, 40, &[seizure(10.0, 10.0)]);
    let cfg = PipelineConfig { skip_existing: true, ..PipelineConfig::default() };
    let first = process_recording(&path, dir.path(), &cfg).unwrap();
    assert!(matches!(first, Outcome::Written { .. }));
    let second = process_recording(&path, dir.path(), &cfg).unwrap();
    assert!(matches!(second, Outcome::AlreadyPresent { .. }));
}
