mod noise;
mod signal;

pub use noise::{AdditiveNoiseConfig, DropoutConfig, NoiseConfig, SpikeNoiseConfig, apply_noise};
pub use signal::{GaussianComponent, SignalConfig, generate_clean_signal};

use crate::chromatogram::Chromatogram;
use crate::error::Result;

/// Build a synthetic chromatogram from its components and noise settings
pub fn generate_chromatogram(signal: &SignalConfig, noise: &NoiseConfig) -> Result<Chromatogram> {
    let clean = generate_clean_signal(signal);
    let intensities = apply_noise(&clean, noise);
    Chromatogram::with_gaps(
        &signal.scan_numbers(),
        &signal.retention_times(),
        &intensities,
    )
}
