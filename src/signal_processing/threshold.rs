use crate::config::validate_quantile;
use crate::error::{PeakError, Result};

/// Value at quantile `level` of `values`
///
/// Order statistics are interpolated linearly: the rank is
/// `level * (n - 1)` and a fractional rank blends its two neighbours.
///
/// # Errors
/// `InvalidParameter` when `level` is outside `[0, 1]` or `values` is empty,
/// `Computation` when `values` contains NaN.
pub fn quantile(values: &[f64], level: f64) -> Result<f64> {
    validate_quantile(level)?;
    if values.is_empty() {
        return Err(PeakError::InvalidParameter(
            "cannot take a quantile of an empty sequence".to_string(),
        ));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(PeakError::Computation(
            "quantile input contains NaN".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = level * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Noise threshold from a derivative series
///
/// Takes the absolute value of every derivative sample and returns the value
/// at the requested quantile of that distribution.
pub fn derivative_threshold(derivative: &[f64], level: f64) -> Result<f64> {
    let magnitudes: Vec<f64> = derivative.iter().map(|d| d.abs()).collect();
    quantile(&magnitudes, level)
}
