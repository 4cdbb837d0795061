use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thump_features::analysis::{FeatureCategory, FEATURE_SLOTS};
use thump_features::config::{AnalysisConfig, CANONICAL_SAMPLE_RATE};
use thump_features::service::{analyze_clip, analyze_source};
use thump_features::source::{
    write_wav, AudioClip, SyntheticPattern, SyntheticSource, SyntheticSpec, WavFileSource,
    WaveformSource,
};
use thump_features::{init_logging, FeatureExtractor, FeatureVector};

#[derive(Parser, Debug)]
#[command(
    name = "thump_cli",
    about = "Offline acoustic feature extraction for short impact recordings"
)]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the feature vector of a WAV file
    Extract {
        #[arg(long)]
        input: PathBuf,
        /// JSON analysis configuration (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Overrides `service.timeout_ms` from the configuration
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Generate a deterministic waveform and extract its features
    Synth {
        #[arg(long, value_enum)]
        pattern: SyntheticPattern,
        #[arg(long, default_value_t = 220.0)]
        frequency_hz: f32,
        #[arg(long, default_value_t = 0.8)]
        amplitude: f32,
        #[arg(long, default_value_t = 1_000)]
        duration_ms: u32,
        #[arg(long, default_value_t = CANONICAL_SAMPLE_RATE)]
        sample_rate: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Also write the generated waveform to this WAV file
        #[arg(long)]
        wav_out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List the feature slots in vector order
    Names {
        #[arg(long)]
        json: bool,
    },
    /// Print the default analysis configuration as JSON
    DefaultConfig,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Table,
}

fn main() -> ExitCode {
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
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            config,
            format,
            output,
            timeout_ms,
        } => run_extract(&input, config, format, output, timeout_ms),
        Commands::Synth {
            pattern,
            frequency_hz,
            amplitude,
            duration_ms,
            sample_rate,
            seed,
            wav_out,
            format,
        } => {
            let spec = SyntheticSpec {
                frequency_hz,
                amplitude,
                duration_ms,
                sample_rate,
                seed,
                ..SyntheticSpec::new(pattern)
            };
            run_synth(spec, wav_out, format)
        }
        Commands::Names { json } => run_names(json),
        Commands::DefaultConfig => run_default_config(),
    }
}

fn run_extract(
    input: &Path,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
    timeout_ms: Option<u64>,
) -> Result<ExitCode> {
    let config = match config_path {
        Some(path) => AnalysisConfig::from_json_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let timeout = timeout_ms
        .or(config.service.timeout_ms)
        .map(Duration::from_millis);

    let source = WavFileSource::new(input);
    let clip = source
        .read_clip()
        .with_context(|| format!("reading {}", input.display()))?;
    if clip.sample_rate != CANONICAL_SAMPLE_RATE {
        log::warn!(
            "{} is {} Hz; analyzing at the native rate (canonical rate is {} Hz)",
            input.display(),
            clip.sample_rate,
            CANONICAL_SAMPLE_RATE
        );
    }

    let extractor = Arc::new(
        FeatureExtractor::with_config(clip.sample_rate, config)
            .context("building feature extractor")?,
    );
    let runtime = build_runtime()?;
    let features = runtime
        .block_on(analyze_clip(extractor, clip.clone(), timeout))
        .with_context(|| format!("analyzing {}", input.display()))?;

    emit_report(&source.describe(), &clip, &features, format, output)?;
    Ok(ExitCode::from(0))
}

fn run_synth(
    spec: SyntheticSpec,
    wav_out: Option<PathBuf>,
    format: OutputFormat,
) -> Result<ExitCode> {
    spec.validate().context("invalid synthetic waveform")?;
    let extractor = Arc::new(FeatureExtractor::new(spec.sample_rate));
    let source = SyntheticSource::new(spec);
    let description = source.describe();

    let runtime = build_runtime()?;
    let (clip, features) = runtime
        .block_on(analyze_source(extractor, Arc::new(source), None))
        .with_context(|| format!("analyzing {}", description))?;

    if let Some(path) = wav_out {
        write_wav(&path, &clip).with_context(|| format!("writing {}", path.display()))?;
    }

    emit_report(&description, &clip, &features, format, None)?;
    Ok(ExitCode::from(0))
}

fn run_names(json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(&FEATURE_SLOTS[..])?);
        return Ok(ExitCode::from(0));
    }

    for (index, slot) in FEATURE_SLOTS.iter().enumerate() {
        let marker = if slot.implemented { "" } else { " (placeholder)" };
        println!(
            "{:>2}  {:<26} {}{}",
            index,
            slot.name,
            slot.category.label(),
            marker
        );
    }
    Ok(ExitCode::from(0))
}

fn run_default_config() -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
    Ok(ExitCode::from(0))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")
}

fn emit_report(
    source: &str,
    clip: &AudioClip,
    features: &FeatureVector,
    format: OutputFormat,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => {
            let report = FeatureReportPayload {
                source,
                sample_rate: clip.sample_rate,
                duration_ms: clip.duration_ms(),
                feature_count: features.len(),
                values: features.as_slice(),
                features: features
                    .named()
                    .map(|(slot, value)| NamedFeature {
                        name: slot.name,
                        category: slot.category,
                        implemented: slot.implemented,
                        value,
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&report)?
        }
        OutputFormat::Table => render_table(source, clip, features),
    };

    if let Some(path) = output_path {
        fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{rendered}");
    }

    Ok(())
}

fn render_table(source: &str, clip: &AudioClip, features: &FeatureVector) -> String {
    let mut lines = vec![format!(
        "{} ({} Hz, {:.1} ms)",
        source,
        clip.sample_rate,
        clip.duration_ms()
    )];
    let mut current: Option<FeatureCategory> = None;
    for (slot, value) in features.named() {
        if current != Some(slot.category) {
            lines.push(format!("[{}]", slot.category.label()));
            current = Some(slot.category);
        }
        lines.push(format!("  {:<26} {:>14.6}", slot.name, value));
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct FeatureReportPayload<'a> {
    source: &'a str,
    sample_rate: u32,
    duration_ms: f64,
    feature_count: usize,
    values: &'a [f32],
    features: Vec<NamedFeature>,
}

#[derive(Serialize)]
struct NamedFeature {
    name: &'static str,
    category: FeatureCategory,
    implemented: bool,
    value: f32,
}
