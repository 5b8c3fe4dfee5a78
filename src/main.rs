use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sgpeaks::output::{OutputFormat, PeakRecord, PeakSummary, create_formatter};
use sgpeaks::peak::sort_by_intensity;
use sgpeaks::{
    Chromatogram, ChromatogramData, PeakResolver, ResolverConfig, SavitzkyGolayResolver,
    resolve_all,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SortOrder {
    /// Ascending start scan
    Time,
    /// Descending apex height
    Height,
}

#[derive(Parser, Debug)]
#[command(name = "sgpeaks")]
#[command(about = "Resolve chromatographic peaks with a Savitzky-Golay second derivative", long_about = None)]
struct Args {
    /// JSON chromatogram files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML resolver configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Peak ordering within each chromatogram
    #[arg(long, value_enum, default_value = "time")]
    sort: SortOrder,

    /// Minimum apex intensity (overrides config)
    #[arg(long)]
    min_height: Option<f64>,

    /// Minimum retention time span (overrides config)
    #[arg(long)]
    min_duration: Option<f64>,

    /// Noise threshold quantile in [0, 1] (overrides config)
    #[arg(short = 'q', long)]
    threshold_level: Option<f64>,

    /// Derivative kernel half-width in scans (overrides config)
    #[arg(long)]
    half_width: Option<usize>,

    /// Reconstruct peak shapes with the Gaussian model
    #[arg(long)]
    fill: bool,

    /// Peak filling excess level (implies --fill)
    #[arg(long)]
    excess_level: Option<f64>,

    /// Peak filling resolution (implies --fill)
    #[arg(long)]
    resolution: Option<f64>,

    /// Worker threads
    #[arg(short = 'j', long, default_value_t = 4)]
    jobs: usize,

    /// Print peak statistics to stderr
    #[arg(long)]
    summary: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> Result<ResolverConfig> {
    let mut config = match &args.config {
        Some(path) => ResolverConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    if let Some(height) = args.min_height {
        config.min_peak_height = height;
    }
    if let Some(duration) = args.min_duration {
        config.min_peak_duration = duration;
    }
    if let Some(level) = args.threshold_level {
        config.derivative_threshold_level = level;
    }
    if let Some(half_width) = args.half_width {
        config.derivative_half_width = half_width;
    }

    if args.fill || args.excess_level.is_some() || args.resolution.is_some() {
        let mut filling = config.filling.unwrap_or_default();
        if let Some(excess) = args.excess_level {
            filling.excess_level = excess;
        }
        if let Some(resolution) = args.resolution {
            filling.resolution = resolution;
        }
        config.filling = Some(filling);
    }

    config.validate().context("Invalid resolver configuration")?;
    Ok(config)
}

fn load_chromatogram(path: &Path) -> Result<Chromatogram> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: ChromatogramData = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let chromatogram = data
        .into_chromatogram()
        .with_context(|| format!("Invalid chromatogram in {}", path.display()))?;

    Ok(match chromatogram.source() {
        Some(_) => chromatogram,
        None => chromatogram.with_source(path.display().to_string()),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    log::info!("resolver configuration: {:?}", config);

    let mut failures = 0;
    let mut chromatograms = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match load_chromatogram(path) {
            Ok(chromatogram) => chromatograms.push(chromatogram),
            Err(e) => {
                eprintln!("{:#}", e);
                failures += 1;
            }
        }
    }

    let resolver: Arc<dyn PeakResolver> = Arc::new(SavitzkyGolayResolver::new(config)?);
    let total = chromatograms.len();
    let events = resolve_all(resolver, chromatograms, args.jobs.max(1))?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut all_peaks = Vec::new();
    for event in events {
        let source = event.source.unwrap_or_else(|| format!("job {}", event.job_id));
        let mut peaks = match event.result {
            Ok(peaks) => peaks,
            Err(e) => {
                eprintln!("{}: {}", source, e);
                failures += 1;
                continue;
            }
        };
        if args.sort == SortOrder::Height {
            sort_by_intensity(&mut peaks);
        }
        for (rank, peak) in peaks.iter().enumerate() {
            let record = PeakRecord {
                source: &source,
                rank: rank + 1,
                peak,
            };
            println!("{}", formatter.format(&record));
        }
        all_peaks.extend(peaks);
    }

    if args.summary {
        print_summary(&PeakSummary::from_peaks(&all_peaks), total);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, args.files.len());
    }
    Ok(())
}

fn print_summary(summary: &PeakSummary, chromatograms: usize) {
    eprintln!();
    eprintln!(
        "{} peaks in {} chromatograms ({} filled)",
        summary.peak_count, chromatograms, summary.filled_count
    );
    let rows = [
        ("Height", &summary.height),
        ("Duration", &summary.duration),
        ("Area", &summary.area),
    ];
    for (label, stats) in rows {
        if let Some(stats) = stats {
            eprintln!(
                "  {:<8} mean {:>12.4} std {:>12.4} min {:>12.4} max {:>12.4}",
                label, stats.mean, stats.std_dev, stats.min, stats.max
            );
        }
    }
}
