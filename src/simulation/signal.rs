use serde::Deserialize;

/// One Gaussian elution profile
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GaussianComponent {
    /// Retention time of the apex
    pub retention_time: f64,
    pub height: f64,
    /// Standard deviation in retention time units
    pub sigma: f64,
}

impl GaussianComponent {
    pub fn new(retention_time: f64, height: f64, sigma: f64) -> Self {
        Self {
            retention_time,
            height,
            sigma,
        }
    }

    pub fn intensity_at(&self, rt: f64) -> f64 {
        let dt = rt - self.retention_time;
        self.height * (-(dt * dt) / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// Scan grid and components of a synthetic chromatogram
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub start_rt: f64,
    /// Retention time between consecutive scans
    pub scan_interval: f64,
    pub scan_count: usize,
    pub first_scan: u32,
    /// Constant offset added to every scan
    pub baseline: f64,
    pub components: Vec<GaussianComponent>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            start_rt: 0.0,
            scan_interval: 0.01,
            scan_count: 1000,
            first_scan: 1,
            baseline: 0.0,
            components: Vec::new(),
        }
    }
}

impl SignalConfig {
    pub fn with_component(mut self, retention_time: f64, height: f64, sigma: f64) -> Self {
        self.components
            .push(GaussianComponent::new(retention_time, height, sigma));
        self
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn scan_numbers(&self) -> Vec<u32> {
        (0..self.scan_count as u32)
            .map(|i| self.first_scan + i)
            .collect()
    }

    pub fn retention_times(&self) -> Vec<f64> {
        (0..self.scan_count)
            .map(|i| self.start_rt + i as f64 * self.scan_interval)
            .collect()
    }
}

/// Noise-free intensities: baseline plus the sum of all components
pub fn generate_clean_signal(config: &SignalConfig) -> Vec<f64> {
    config
        .retention_times()
        .iter()
        .map(|&rt| {
            config.baseline
                + config
                    .components
                    .iter()
                    .map(|c| c.intensity_at(rt))
                    .sum::<f64>()
        })
        .collect()
}
