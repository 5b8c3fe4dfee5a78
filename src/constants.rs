//! Numeric constants for the peak resolver
//!
//! These constants fix the derivative kernel, the background rejection rule
//! and the epsilon values used to keep the numeric pipeline stable.

/// Half-width of the Savitzky-Golay kernel used for the second derivative.
/// The kernel spans `2 * 12 + 1 = 25` scans.
pub const DEFAULT_DERIVATIVE_HALF_WIDTH: usize = 12;

/// A chromatogram whose mean intensity exceeds this fraction of its maximum
/// intensity is treated as flat background and yields no peaks.
pub const BACKGROUND_MEAN_TO_MAX_RATIO: f64 = 0.5;

/// Ratio between full width at half maximum and the standard deviation of a
/// Gaussian peak (2 * sqrt(2 * ln 2)).
pub const FWHM_TO_SIGMA: f64 = 2.354_820_045;

/// Epsilon for preventing division by zero when interpolating half-height
/// crossings between two scans.
pub const INTERPOLATION_EPSILON: f64 = 1e-12;
