use crate::chromatogram::Chromatogram;
use crate::config::PeakFillingConfig;
use crate::constants::{FWHM_TO_SIGMA, INTERPOLATION_EPSILON};
use crate::peak::{PeakDataPoint, ResolvedPeak};

/// Idealized peak shape used to reconstruct overlapped or clipped peaks
pub trait PeakModel: Send + Sync {
    /// Model name for logging
    fn name(&self) -> &'static str;

    /// Reconstruct `peak` from the residual signal
    ///
    /// # Arguments
    /// * `peak` - Detected peak; its apex anchors the model
    /// * `chromatogram` - Source chromatogram (retention times, gaps)
    /// * `residual` - Working intensities, already reduced by earlier filled peaks
    /// * `bounds` - Inclusive index range the reconstruction may cover
    /// * `params` - Excess level and resolution
    ///
    /// Returns `None` when the model cannot be fitted.
    fn fill(
        &self,
        peak: &ResolvedPeak,
        chromatogram: &Chromatogram,
        residual: &[f64],
        bounds: (usize, usize),
        params: &PeakFillingConfig,
    ) -> Option<ResolvedPeak>;
}

/// Gaussian peak model
///
/// The apex height is read from the residual signal and the width from the
/// half-height crossings around the apex. When neither crossing lies inside
/// the detected peak, the width falls back to `rt_apex / resolution`. The
/// reconstruction covers the contiguous scans around the apex where the
/// model stays at or above `excess_level * height`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianPeakModel;

impl GaussianPeakModel {
    pub fn new() -> Self {
        Self
    }

    /// Full width at half maximum measured on the residual signal
    fn measure_fwhm(
        peak: &ResolvedPeak,
        chromatogram: &Chromatogram,
        residual: &[f64],
        height: f64,
        rt_apex: f64,
    ) -> Option<f64> {
        let half = height / 2.0;
        let apex = peak.apex_index;

        let left = half_height_crossing(
            (peak.start_index..apex).rev(),
            apex,
            chromatogram,
            residual,
            half,
        );
        let right = half_height_crossing(
            (apex + 1)..=peak.end_index,
            apex,
            chromatogram,
            residual,
            half,
        );

        match (left, right) {
            (Some(l), Some(r)) => Some(r - l),
            (Some(l), None) => Some(2.0 * (rt_apex - l)),
            (None, Some(r)) => Some(2.0 * (r - rt_apex)),
            (None, None) => None,
        }
    }
}

/// Walk away from the apex and interpolate the first drop below `half`
fn half_height_crossing<I>(
    walk: I,
    apex: usize,
    chromatogram: &Chromatogram,
    residual: &[f64],
    half: f64,
) -> Option<f64>
where
    I: Iterator<Item = usize>,
{
    let mut inner = apex;
    for index in walk {
        if !chromatogram.has_data(index) {
            continue;
        }
        let value = residual[index];
        if value < half {
            let inner_value = residual[inner];
            let inner_rt = chromatogram.retention_time(inner);
            let outer_rt = chromatogram.retention_time(index);
            let denominator = inner_value - value;
            if denominator.abs() < INTERPOLATION_EPSILON {
                return Some(outer_rt);
            }
            let fraction = (inner_value - half) / denominator;
            return Some(inner_rt + (outer_rt - inner_rt) * fraction);
        }
        inner = index;
    }
    None
}

impl PeakModel for GaussianPeakModel {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn fill(
        &self,
        peak: &ResolvedPeak,
        chromatogram: &Chromatogram,
        residual: &[f64],
        bounds: (usize, usize),
        params: &PeakFillingConfig,
    ) -> Option<ResolvedPeak> {
        let apex = peak.apex_index;
        let (lower, upper) = bounds;
        if apex < lower || apex > upper || !chromatogram.has_data(apex) {
            return None;
        }

        let height = residual[apex];
        if height <= 0.0 {
            return None;
        }
        let rt_apex = chromatogram.retention_time(apex);

        let fwhm = Self::measure_fwhm(peak, chromatogram, residual, height, rt_apex)
            .or_else(|| (rt_apex > 0.0).then(|| rt_apex / params.resolution))?;
        if !fwhm.is_finite() || fwhm <= 0.0 {
            return None;
        }

        let sigma = fwhm / FWHM_TO_SIGMA;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let cutoff = params.excess_level * height;
        let model = |index: usize| {
            let dt = chromatogram.retention_time(index) - rt_apex;
            height * (-(dt * dt) / two_sigma_sq).exp()
        };

        let mut start = apex;
        while start > lower && model(start - 1) >= cutoff {
            start -= 1;
        }
        let mut end = apex;
        while end < upper && model(end + 1) >= cutoff {
            end += 1;
        }

        let data_points: Vec<PeakDataPoint> = (start..=end)
            .map(|index| PeakDataPoint {
                index,
                retention_time: chromatogram.retention_time(index),
                intensity: if index == apex { height } else { model(index) },
            })
            .collect();

        Some(ResolvedPeak::from_data_points(
            data_points,
            apex,
            height,
            rt_apex,
            true,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian_chromatogram(n: usize, apex: f64, sigma: f64, height: f64) -> Chromatogram {
        let scans: Vec<u32> = (0..n as u32).collect();
        let rts: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let intensities: Vec<f64> = (0..n)
            .map(|i| height * (-((i as f64 - apex).powi(2)) / (2.0 * sigma * sigma)).exp())
            .collect();
        Chromatogram::new(&scans, &rts, &intensities).unwrap()
    }

    #[test]
    fn test_gaussian_fill_recovers_shape() {
        let chromatogram = gaussian_chromatogram(41, 20.0, 3.0, 1000.0);
        let residual = chromatogram.dense_intensities();
        let detected = ResolvedPeak::from_indices(&chromatogram, &(14..=26).collect::<Vec<_>>(), None)
            .unwrap();
        let params = PeakFillingConfig {
            excess_level: 0.01,
            resolution: 100.0,
        };

        let filled = GaussianPeakModel::new()
            .fill(&detected, &chromatogram, &residual, (0, 40), &params)
            .unwrap();

        assert!(filled.filled);
        assert_eq!(filled.apex_index, 20);
        assert!((filled.height - 1000.0).abs() < 1e-9);
        // 1% of the apex is reached at 3.03 sigma, i.e. 9 scans either side
        assert_eq!(filled.start_index, 11);
        assert_eq!(filled.end_index, 29);
        for point in &filled.data_points {
            let expected = residual[point.index];
            assert!(
                (point.intensity - expected).abs() < 0.02 * 1000.0,
                "index {}: {} vs {}",
                point.index,
                point.intensity,
                expected
            );
        }
    }

    #[test]
    fn test_fill_respects_bounds() {
        let chromatogram = gaussian_chromatogram(41, 20.0, 3.0, 1000.0);
        let residual = chromatogram.dense_intensities();
        let detected = ResolvedPeak::from_indices(&chromatogram, &(16..=24).collect::<Vec<_>>(), None)
            .unwrap();
        let params = PeakFillingConfig {
            excess_level: 0.01,
            resolution: 100.0,
        };

        let filled = GaussianPeakModel::new()
            .fill(&detected, &chromatogram, &residual, (18, 23), &params)
            .unwrap();

        assert_eq!(filled.start_index, 18);
        assert_eq!(filled.end_index, 23);
    }

    #[test]
    fn test_fill_falls_back_to_resolution() {
        // Plateau: no half-height crossing inside the detected range
        let scans: Vec<u32> = (0..5).collect();
        let rts = [10.0, 10.1, 10.2, 10.3, 10.4];
        let intensities = [900.0, 950.0, 1000.0, 950.0, 900.0];
        let chromatogram = Chromatogram::new(&scans, &rts, &intensities).unwrap();
        let residual = chromatogram.dense_intensities();
        let detected = ResolvedPeak::from_indices(&chromatogram, &[0, 1, 2, 3, 4], None).unwrap();
        let params = PeakFillingConfig {
            excess_level: 0.5,
            // fwhm = 10.2 / 50 = 0.204
            resolution: 50.0,
        };

        let filled = GaussianPeakModel::new()
            .fill(&detected, &chromatogram, &residual, (0, 4), &params)
            .unwrap();

        // Half height is reached 0.102 either side of the apex
        assert_eq!(filled.start_index, 1);
        assert_eq!(filled.end_index, 3);
        let flank = filled.data_points[0].intensity;
        assert!(flank > 500.0 && flank < 530.0, "flank {}", flank);
    }

    #[test]
    fn test_fill_fails_on_empty_residual() {
        let chromatogram = gaussian_chromatogram(41, 20.0, 3.0, 1000.0);
        let residual = vec![0.0; 41];
        let detected = ResolvedPeak::from_indices(&chromatogram, &(14..=26).collect::<Vec<_>>(), None)
            .unwrap();

        let filled = GaussianPeakModel::new().fill(
            &detected,
            &chromatogram,
            &residual,
            (0, 40),
            &PeakFillingConfig::default(),
        );
        assert!(filled.is_none());
    }
}
