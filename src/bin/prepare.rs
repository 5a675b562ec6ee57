use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use seizure_prep::{discover_inputs, run_batch, PipelineConfig};

#[derive(Parser)]
#[command(name = "prepare", about = "Balanced seizure / non-seizure epochs from EDF+ recordings")]
struct Args {
    /// EDF files, or directories whose *.edf files are all processed
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving one <stem>_epochs.safetensors per recording
    #[arg(long, short)]
    output_dir: PathBuf,

    /// Leave recordings whose output file already exists untouched
    #[arg(long)]
    skip_existing: bool,

    /// Memory budget for one fully loaded recording, in MiB; larger
    /// recordings go through the splitter
    #[arg(long)]
    max_load_mib: Option<usize>,

    /// Epoch duration in seconds (default: 10)
    #[arg(long, default_value_t = 10.0)]
    epoch_dur: f32,

    /// Fraction of interictal gaps loaded when splitting (default: 0.3)
    #[arg(long, default_value_t = 0.30)]
    interictal_fraction: f64,

    /// Seed for interval sampling and balancing (default: 42)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Annotation text marking a seizure (default: AANVAL)
    #[arg(long, default_value = "AANVAL")]
    marker: String,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let cfg = PipelineConfig {
        seizure_marker: args.marker,
        epoch_dur: args.epoch_dur,
        interictal_fraction: args.interictal_fraction,
        seed: args.seed,
        max_load_bytes: args.max_load_mib.map(|m| m.saturating_mul(1 << 20)),
        skip_existing: args.skip_existing,
        ..PipelineConfig::default()
    };
    cfg.validate()?;

    let inputs = discover_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("no EDF recordings found");
    }
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("create {}", args.output_dir.display()))?;

    let report = run_batch(&inputs, &args.output_dir, &cfg);
    println!(
        "{} recordings: {} written, {} excluded, {} failed",
        inputs.len(),
        report.written(),
        report.excluded(),
        report.failed.len()
    );
    println!("Seizure subjects: {}", report.seizure_subjects.join(", "));
    for (path, err) in &report.failed {
        println!("  FAILED {}: {err}", path.display());
    }
    Ok(())
}
