//! Configuration for the Savitzky-Golay peak resolver.
//!
//! ## Loading from TOML
//!
//! Every field is optional in a configuration file; missing fields fall back
//! to `ResolverConfig::default()`:
//!
//! ```toml
//! min_peak_height = 500.0
//! min_peak_duration = 0.1
//! derivative_threshold_level = 0.6
//!
//! [filling]
//! excess_level = 0.05
//! resolution = 100.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DERIVATIVE_HALF_WIDTH;
use crate::error::{PeakError, Result};

/// Peak resolver configuration
///
/// Contains the acceptance thresholds, the noise threshold quantile and the
/// optional peak-filling model parameters. Use `ResolverConfig::default()`
/// for sensible defaults.
///
/// # Example
/// ```
/// use sgpeaks::config::ResolverConfig;
///
/// let mut config = ResolverConfig::default();
/// config.min_peak_height = 1000.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Peaks whose height is below this value are rejected (intensity units)
    pub min_peak_height: f64,
    /// Peaks whose retention time span is shorter than this are rejected
    pub min_peak_duration: f64,
    /// Quantile of the absolute second derivative used as noise threshold (0-1)
    pub derivative_threshold_level: f64,
    /// Half-width of the Savitzky-Golay derivative kernel in scans
    pub derivative_half_width: usize,
    /// Peak-shape reconstruction; disabled when `None`
    pub filling: Option<PeakFillingConfig>,
}

/// Peak-filling model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakFillingConfig {
    /// Fraction of the apex height below which the model is truncated (0-1)
    pub excess_level: f64,
    /// Chromatographic resolving power, `rt / fwhm`; used when the width
    /// cannot be measured from the data
    pub resolution: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_peak_height: 100.0,
            min_peak_duration: 0.05,
            derivative_threshold_level: 0.5,
            derivative_half_width: DEFAULT_DERIVATIVE_HALF_WIDTH,
            filling: None,
        }
    }
}

impl Default for PeakFillingConfig {
    fn default() -> Self {
        Self {
            excess_level: 0.05,
            resolution: 100.0,
        }
    }
}

impl ResolverConfig {
    /// Create a configuration from the three thresholds of the resolve contract
    pub fn new(
        min_peak_height: f64,
        min_peak_duration: f64,
        derivative_threshold_level: f64,
    ) -> Self {
        Self {
            min_peak_height,
            min_peak_duration,
            derivative_threshold_level,
            ..Self::default()
        }
    }

    /// Enable peak filling with the given model parameters
    pub fn with_filling(mut self, filling: PeakFillingConfig) -> Self {
        self.filling = Some(filling);
        self
    }

    /// Whether peak-shape reconstruction is enabled
    pub fn filling_peaks(&self) -> bool {
        self.filling.is_some()
    }

    /// Check every parameter range
    pub fn validate(&self) -> Result<()> {
        if !self.min_peak_height.is_finite() || self.min_peak_height <= 0.0 {
            return Err(PeakError::InvalidParameter(format!(
                "minimum peak height must be positive, got {}",
                self.min_peak_height
            )));
        }
        if !self.min_peak_duration.is_finite() || self.min_peak_duration <= 0.0 {
            return Err(PeakError::InvalidParameter(format!(
                "minimum peak duration must be positive, got {}",
                self.min_peak_duration
            )));
        }
        validate_quantile(self.derivative_threshold_level)?;
        if self.derivative_half_width == 0 {
            return Err(PeakError::InvalidParameter(
                "derivative half-width must be at least 1".to_string(),
            ));
        }
        if let Some(filling) = &self.filling {
            filling.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| PeakError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PeakError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}

impl PeakFillingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.excess_level > 0.0 && self.excess_level < 1.0) {
            return Err(PeakError::InvalidParameter(format!(
                "excess level must be in (0, 1), got {}",
                self.excess_level
            )));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(PeakError::InvalidParameter(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

/// Reject quantile levels outside `[0, 1]`
pub(crate) fn validate_quantile(level: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&level) {
        return Err(PeakError::InvalidParameter(format!(
            "quantile level must be in [0, 1], got {}",
            level
        )));
    }
    Ok(())
}
