//! Synthetic chromatograms shared by the integration tests

use sgpeaks::Chromatogram;
use sgpeaks::simulation::{NoiseConfig, SignalConfig, generate_chromatogram};

/// 400 scans, 0.01 apart, starting at retention time 0
pub fn signal(baseline: f64) -> SignalConfig {
    SignalConfig {
        start_rt: 0.0,
        scan_interval: 0.01,
        scan_count: 400,
        first_scan: 1,
        ..Default::default()
    }
    .with_baseline(baseline)
}

/// One tall Gaussian at RT 2.0 with a sigma of ten scans
pub fn single_peak(noise: &NoiseConfig) -> Chromatogram {
    let signal = signal(50.0).with_component(2.0, 10000.0, 0.1);
    generate_chromatogram(&signal, noise).unwrap()
}

/// Three separated Gaussians of decreasing height at RT 1, 2 and 3
pub fn three_peaks(noise: &NoiseConfig) -> Chromatogram {
    let signal = signal(20.0)
        .with_component(1.0, 8000.0, 0.05)
        .with_component(2.0, 5000.0, 0.05)
        .with_component(3.0, 3000.0, 0.05);
    generate_chromatogram(&signal, noise).unwrap()
}

/// Two Gaussians whose flanks merge into a shoulder
pub fn shoulder(noise: &NoiseConfig) -> Chromatogram {
    let signal = signal(10.0)
        .with_component(1.8, 6000.0, 0.06)
        .with_component(2.05, 3000.0, 0.06);
    generate_chromatogram(&signal, noise).unwrap()
}
