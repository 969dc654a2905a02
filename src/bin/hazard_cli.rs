use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hazard_classifier::config::AppConfig;
use hazard_classifier::dataset::{
    load_signal, normalize_peak, read_tracks, read_waveform, save_signal, ArrayFile,
    SpectrogramExtractor,
};
use hazard_classifier::evaluation::{compare, render_table, EvaluationReport};
use hazard_classifier::model::{Model, PooledLogisticModel};
use hazard_classifier::signal::{Signal, SignalLayout};
use hazard_classifier::windowing::{
    sliding_windows, AboveThreshold, Alternating, FirstHalfPositive, LabelPolicy, LabelTimeline,
    Orientation, SampleBatch,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "hazard_cli",
    about = "Preprocessing, windowing and evaluation harness for hazard classifiers"
)]
struct Cli {
    /// JSON configuration file (defaults to config/hazard.json, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Peak-normalize a waveform and write its log spectrogram
    Spectrogram {
        #[arg(long)]
        waveform: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Peak-normalize a waveform and write it as a series
    NormalizeWaveform {
        #[arg(long)]
        waveform: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Filter a cyclone track table and write (lat, lon) features
    PreprocessCyclone {
        #[arg(long)]
        tracks: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Write 0/1 labels (wind above the configured threshold)
        #[arg(long)]
        labels: Option<PathBuf>,
        /// Write the raw wind speeds
        #[arg(long)]
        winds: Option<PathBuf>,
    },
    /// Cut labelled windows and report batch and split sizes
    Windows {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Score one or more models on the seeded test split
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,
        /// Model artifact (repeat to compare several)
        #[arg(long = "model", required = true)]
        models: Vec<PathBuf>,
        /// Print the reports as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    #[arg(long)]
    signal: PathBuf,
    #[arg(long, value_enum)]
    layout: LayoutArg,
    #[arg(long, value_enum, default_value_t = LabelArg::FirstHalf)]
    labels: LabelArg,
    /// Reference series for `--labels threshold`
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Threshold for `--labels threshold` (defaults to the configured label threshold)
    #[arg(long)]
    threshold: Option<f32>,
    #[arg(long)]
    window_size: Option<usize>,
    #[arg(long)]
    test_ratio: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Series,
    FrequencyMajor,
    TimeMajor,
}

impl From<LayoutArg> for SignalLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Series => SignalLayout::Series,
            LayoutArg::FrequencyMajor => SignalLayout::FrequencyMajor,
            LayoutArg::TimeMajor => SignalLayout::TimeMajor,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LabelArg {
    FirstHalf,
    Alternating,
    Threshold,
}

fn main() -> ExitCode {
    hazard_classifier::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Spectrogram { waveform, output } => run_spectrogram(&config, &waveform, &output),
        Commands::NormalizeWaveform { waveform, output } => run_normalize(&waveform, &output),
        Commands::PreprocessCyclone {
            tracks,
            output,
            labels,
            winds,
        } => run_cyclone(&config, &tracks, &output, labels, winds),
        Commands::Windows { source } => run_windows(&config, &source),
        Commands::Evaluate {
            source,
            models,
            json,
        } => run_evaluate(&config, &source, &models, json),
    }
}

fn run_spectrogram(config: &AppConfig, waveform: &Path, output: &Path) -> Result<ExitCode> {
    let samples = read_waveform(waveform)
        .with_context(|| format!("reading waveform {}", waveform.display()))?;
    let extractor = SpectrogramExtractor::new(&config.spectrogram)?;
    let spectrogram = extractor
        .compute(&normalize_peak(&samples))
        .with_context(|| format!("computing spectrogram of {}", waveform.display()))?;
    save_signal(output, &spectrogram)?;

    emit_summary(&SignalSummary::new(output, &spectrogram))?;
    Ok(ExitCode::SUCCESS)
}

fn run_normalize(waveform: &Path, output: &Path) -> Result<ExitCode> {
    let samples = read_waveform(waveform)
        .with_context(|| format!("reading waveform {}", waveform.display()))?;
    let normalized = Signal::Series(normalize_peak(&samples));
    save_signal(output, &normalized)?;

    emit_summary(&SignalSummary::new(output, &normalized))?;
    Ok(ExitCode::SUCCESS)
}

fn run_cyclone(
    config: &AppConfig,
    tracks_path: &Path,
    output: &Path,
    labels_path: Option<PathBuf>,
    winds_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let tracks = read_tracks(tracks_path)
        .with_context(|| format!("reading tracks {}", tracks_path.display()))?;
    if tracks.is_empty() {
        bail!("no valid observations in {}", tracks_path.display());
    }
    let features = tracks.features()?;
    save_signal(output, &features)?;

    if let Some(path) = labels_path {
        let labels = tracks.labels(config.windowing.label_threshold);
        let values: Vec<f32> = labels
            .as_slice()
            .iter()
            .map(|&positive| if positive { 1.0 } else { 0.0 })
            .collect();
        ArrayFile::from_series(&values).save(&path)?;
    }
    if let Some(path) = winds_path {
        ArrayFile::from_series(&tracks.winds()).save(&path)?;
    }

    let summary = serde_json::json!({
        "output": output.display().to_string(),
        "observations": tracks.len(),
        "dropped": tracks.dropped(),
        "positives": tracks.labels(config.windowing.label_threshold).positives(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

fn run_windows(config: &AppConfig, source: &SourceArgs) -> Result<ExitCode> {
    let prepared = prepare_batch(config, source)?;
    let split = prepared
        .batch
        .split(prepared.test_ratio, prepared.seed);
    let window_shape = prepared
        .batch
        .windows()
        .first()
        .map(|w| w.render(Orientation::Native).shape().to_vec())
        .unwrap_or_default();

    let summary = WindowSummary {
        signal: source.signal.display().to_string(),
        time_len: prepared.time_len,
        window_size: prepared.window_size,
        window_shape,
        windows: prepared.batch.len(),
        positives: prepared.batch.positives(),
        train: split.train.len(),
        test: split.test.len(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

fn run_evaluate(
    config: &AppConfig,
    source: &SourceArgs,
    model_paths: &[PathBuf],
    json: bool,
) -> Result<ExitCode> {
    let prepared = prepare_batch(config, source)?;
    let split = prepared
        .batch
        .split(prepared.test_ratio, prepared.seed);

    let mut models = Vec::with_capacity(model_paths.len());
    for path in model_paths {
        let model = PooledLogisticModel::load(path)
            .with_context(|| format!("loading model {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        models.push((name, model));
    }

    let reports: Vec<EvaluationReport> = compare(
        models
            .iter()
            .map(|(name, model)| (name.as_str(), model as &dyn Model)),
        &split.test,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!(
            "test windows: {} ({} positive)",
            split.test.len(),
            split.test.positives()
        );
        print!("{}", render_table(&reports));
    }
    Ok(ExitCode::SUCCESS)
}

struct PreparedBatch {
    batch: SampleBatch,
    time_len: usize,
    window_size: usize,
    test_ratio: f64,
    seed: u64,
}

fn prepare_batch(config: &AppConfig, source: &SourceArgs) -> Result<PreparedBatch> {
    let signal = load_signal(&source.signal, source.layout.into())
        .with_context(|| format!("loading signal {}", source.signal.display()))?;
    let time_len = signal.time_len();

    let policy: Box<dyn LabelPolicy> = match source.labels {
        LabelArg::FirstHalf => Box::new(FirstHalfPositive),
        LabelArg::Alternating => Box::new(Alternating),
        LabelArg::Threshold => {
            let Some(reference) = &source.reference else {
                bail!("--labels threshold needs --reference <json>");
            };
            let values = ArrayFile::load(reference)
                .with_context(|| format!("loading reference {}", reference.display()))?
                .data;
            let threshold = source
                .threshold
                .unwrap_or(config.windowing.label_threshold);
            Box::new(AboveThreshold::new(values, threshold))
        }
    };
    let labels = LabelTimeline::from_policy(policy.as_ref(), time_len);

    let window_size = source.window_size.unwrap_or(config.windowing.window_size);
    let batch = sliding_windows(&signal, &labels, window_size).collect_batch();
    if batch.is_empty() {
        eprintln!(
            "Warning: signal of length {} yields no windows of size {}",
            time_len, window_size
        );
    }

    Ok(PreparedBatch {
        batch,
        time_len,
        window_size,
        test_ratio: source.test_ratio.unwrap_or(config.windowing.test_ratio),
        seed: source.seed.unwrap_or(config.windowing.seed),
    })
}

#[derive(Serialize)]
struct SignalSummary {
    output: String,
    layout: SignalLayout,
    time_len: usize,
    feature_len: usize,
}

impl SignalSummary {
    fn new(output: &Path, signal: &Signal) -> Self {
        Self {
            output: output.display().to_string(),
            layout: signal.layout(),
            time_len: signal.time_len(),
            feature_len: signal.feature_len(),
        }
    }
}

fn emit_summary(summary: &SignalSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[derive(Serialize)]
struct WindowSummary {
    signal: String,
    time_len: usize,
    window_size: usize,
    window_shape: Vec<usize>,
    windows: usize,
    positives: usize,
    train: usize,
    test: usize,
}
