pub mod filter;
pub mod peak_model;
pub mod scanner;

pub use filter::{PeakFilter, filter};
pub use peak_model::{GaussianPeakModel, PeakModel};
pub use scanner::{BoundaryScanner, CandidatePeak, ScanState};

use crate::chromatogram::Chromatogram;
use crate::config::ResolverConfig;
use crate::constants::BACKGROUND_MEAN_TO_MAX_RATIO;
use crate::error::{PeakError, Result};
use crate::peak::ResolvedPeak;
use crate::signal_processing::{derivative, derivative_threshold};

/// Turns a chromatogram into its list of elution peaks
pub trait PeakResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolve the peaks of one chromatogram, ordered by ascending start index
    fn resolve(&self, chromatogram: &Chromatogram) -> Result<Vec<ResolvedPeak>>;
}

/// Peak resolver based on the Savitzky-Golay second derivative
///
/// Rejects flat background chromatograms, differentiates the intensities,
/// derives a noise threshold from the derivative magnitudes, scans the
/// derivative for peak boundaries and filters (optionally fills) the
/// resulting candidates. The caller's chromatogram is never modified.
pub struct SavitzkyGolayResolver {
    config: ResolverConfig,
    model: Box<dyn PeakModel>,
}

impl SavitzkyGolayResolver {
    /// Create a resolver; the configuration is validated up front
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model: Box::new(GaussianPeakModel::new()),
        })
    }

    /// Replace the peak-filling model
    pub fn with_model(mut self, model: Box<dyn PeakModel>) -> Self {
        self.model = model;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether the chromatogram looks like flat background
    pub fn is_background(chromatogram: &Chromatogram) -> bool {
        let (mean, max) = chromatogram.intensity_summary();
        mean > max * BACKGROUND_MEAN_TO_MAX_RATIO
    }

    /// Second derivative of the chromatogram, gaps read as zero
    pub fn second_derivative(&self, chromatogram: &Chromatogram) -> Result<Vec<f64>> {
        let intensities = chromatogram.dense_intensities();
        let second = derivative(&intensities, true, self.config.derivative_half_width);
        if let Some(index) = second.iter().position(|v| !v.is_finite()) {
            return Err(PeakError::Computation(format!(
                "second derivative is not finite at index {}",
                index
            )));
        }
        Ok(second)
    }
}

impl PeakResolver for SavitzkyGolayResolver {
    fn name(&self) -> &'static str {
        "savitzky-golay"
    }

    fn resolve(&self, chromatogram: &Chromatogram) -> Result<Vec<ResolvedPeak>> {
        let (mean, max) = chromatogram.intensity_summary();
        if !mean.is_finite() {
            return Err(PeakError::Computation(
                "mean intensity overflowed".to_string(),
            ));
        }
        if mean > max * BACKGROUND_MEAN_TO_MAX_RATIO {
            log::debug!(
                "{}: background chromatogram (mean {:.1}, max {:.1})",
                chromatogram.source().unwrap_or("chromatogram"),
                mean,
                max
            );
            return Ok(Vec::new());
        }

        let second = self.second_derivative(chromatogram)?;
        let threshold = derivative_threshold(&second, self.config.derivative_threshold_level)?;
        if !threshold.is_finite() {
            return Err(PeakError::Computation(
                "noise threshold is not finite".to_string(),
            ));
        }

        let candidates = BoundaryScanner::scan(&second, threshold, |i| chromatogram.intensity(i));
        let filling = self.config.filling;
        let peaks: Vec<ResolvedPeak> = candidates
            .iter()
            .filter_map(|candidate| {
                let apex_hint = filling.and(candidate.derivative_apex);
                ResolvedPeak::from_indices(chromatogram, &candidate.indices, apex_hint)
            })
            .collect();

        let mut peak_filter = PeakFilter::new(&self.config, chromatogram);
        if let Some(params) = filling {
            peak_filter = peak_filter.with_filling(params, self.model.as_ref());
        }
        let mut accepted = peak_filter.apply(chromatogram, peaks);
        accepted.sort_by_key(|peak| peak.start_index);

        log::debug!(
            "{}: threshold {:.4}, {} candidates, {} accepted",
            chromatogram.source().unwrap_or("chromatogram"),
            threshold,
            candidates.len(),
            accepted.len()
        );
        Ok(accepted)
    }
}

/// Resolve a chromatogram with the given thresholds and default kernel
///
/// # Arguments
/// * `chromatogram` - Signal to resolve
/// * `min_peak_height` - Minimum apex intensity of an accepted peak
/// * `min_peak_duration` - Minimum retention time span of an accepted peak
/// * `derivative_threshold_quantile` - Quantile of the derivative magnitudes
///   used as noise threshold
pub fn resolve(
    chromatogram: &Chromatogram,
    min_peak_height: f64,
    min_peak_duration: f64,
    derivative_threshold_quantile: f64,
) -> Result<Vec<ResolvedPeak>> {
    let config = ResolverConfig::new(
        min_peak_height,
        min_peak_duration,
        derivative_threshold_quantile,
    );
    SavitzkyGolayResolver::new(config)?.resolve(chromatogram)
}
