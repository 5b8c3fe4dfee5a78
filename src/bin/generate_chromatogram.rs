use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use sgpeaks::ChromatogramData;
use sgpeaks::simulation::{
    AdditiveNoiseConfig, DropoutConfig, NoiseConfig, SignalConfig, SpikeNoiseConfig,
    generate_chromatogram,
};

#[derive(Parser, Debug)]
#[command(name = "generate_chromatogram")]
#[command(about = "Generate synthetic chromatograms with configurable noise as JSON")]
struct Args {
    /// TOML signal and noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Peaks as comma-separated "rt:height:sigma" triples (overrides config)
    #[arg(short, long)]
    peaks: Option<String>,

    /// Number of noisy trials to write
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of scans (overrides config)
    #[arg(long)]
    scans: Option<usize>,

    /// Retention time between scans (overrides config)
    #[arg(long)]
    scan_interval: Option<f64>,

    /// Gaussian noise standard deviation (overrides config)
    #[arg(long)]
    noise: Option<f64>,

    /// Probability of a scan without data point (overrides config)
    #[arg(long)]
    dropout: Option<f64>,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    signal: Option<SignalConfig>,
    noise: Option<NoiseSection>,
}

#[derive(Debug, Deserialize, Default)]
struct NoiseSection {
    std_dev: Option<f64>,
    spike_probability: Option<f64>,
    spike_amplitude: Option<f64>,
    dropout: Option<f64>,
}

fn parse_peaks(s: &str) -> Result<Vec<(f64, f64, f64)>> {
    s.split(',')
        .map(|triple| {
            let parts: Vec<&str> = triple.trim().split(':').collect();
            if parts.len() != 3 {
                anyhow::bail!("Invalid peak '{}'. Use 'rt:height:sigma'", triple);
            }
            let rt: f64 = parts[0].parse().context("Invalid retention time")?;
            let height: f64 = parts[1].parse().context("Invalid height")?;
            let sigma: f64 = parts[2].parse().context("Invalid sigma")?;
            Ok((rt, height, sigma))
        })
        .collect()
}

fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_signal_config(toml: &TomlConfig, args: &Args) -> Result<SignalConfig> {
    let mut config = toml.signal.clone().unwrap_or_default();
    if let Some(ref peaks) = args.peaks {
        config.components.clear();
        for (rt, height, sigma) in parse_peaks(peaks)? {
            config = config.with_component(rt, height, sigma);
        }
    }
    if let Some(scans) = args.scans {
        config.scan_count = scans;
    }
    if let Some(interval) = args.scan_interval {
        config.scan_interval = interval;
    }
    if config.components.is_empty() {
        anyhow::bail!("No peaks configured; use --peaks or a [signal] section");
    }
    Ok(config)
}

fn build_noise_config(toml: &TomlConfig, args: &Args, seed: u64) -> NoiseConfig {
    let section = toml.noise.as_ref();
    let mut config = NoiseConfig::default().with_seed(seed);

    if let Some(std_dev) = args.noise.or_else(|| section.and_then(|n| n.std_dev)) {
        config.additive = Some(AdditiveNoiseConfig { std_dev });
    }

    if let Some(n) = section
        && let Some(probability) = n.spike_probability
    {
        config.spikes = Some(SpikeNoiseConfig {
            probability,
            amplitude: n.spike_amplitude.unwrap_or(1000.0),
        });
    }

    if let Some(probability) = args.dropout.or_else(|| section.and_then(|n| n.dropout)) {
        config.dropout = Some(DropoutConfig { probability });
    }

    config
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => TomlConfig::default(),
    };

    let signal = build_signal_config(&toml_config, &args)?;
    let base_seed = args.seed.unwrap_or(0);

    for trial in 0..args.trials {
        let seed = base_seed + trial as u64;
        let noise = build_noise_config(&toml_config, &args, seed);

        let filename = format!("{}_t{:03}.json", args.prefix, trial);
        let chromatogram = generate_chromatogram(&signal, &noise)
            .context("Failed to generate chromatogram")?
            .with_source(filename.clone());

        let json = serde_json::to_string(&ChromatogramData::from(&chromatogram))?;
        let filepath = args.output_dir.join(&filename);
        fs::write(&filepath, json)
            .with_context(|| format!("Failed to write {}", filepath.display()))?;

        eprint!("\rGenerating: {}/{}", trial + 1, args.trials);
    }
    eprintln!();

    eprintln!(
        "Generated {} chromatograms in {}",
        args.trials,
        args.output_dir.display()
    );

    Ok(())
}
