/// Derivative estimated by the Savitzky-Golay engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    First,
    Second,
}

/// Savitzky-Golay derivative kernel for a window of `2 * half_width + 1` scans
///
/// Coefficients come from a least-squares quadratic fit on unit-spaced
/// abscissae, so the first derivative is per scan and the second derivative
/// is per scan squared. Index 0 of the returned vector is the leftmost tap.
/// A half-width of 0 yields the single tap `[0.0]`.
pub fn savitzky_golay_kernel(half_width: usize, order: DerivativeOrder) -> Vec<f64> {
    if half_width == 0 {
        return vec![0.0];
    }
    let m = half_width as i64;
    let norm = normalization(half_width, order);
    (-m..=m)
        .map(|i| tap_weight(half_width, order, i) as f64 * norm)
        .collect()
}

/// Integer weight of tap `i` (relative to the window centre)
fn tap_weight(half_width: usize, order: DerivativeOrder, i: i64) -> i64 {
    let m = half_width as i64;
    match order {
        DerivativeOrder::First => i,
        DerivativeOrder::Second => 3 * i * i - m * (m + 1),
    }
}

/// Common factor turning integer weights into kernel coefficients
fn normalization(half_width: usize, order: DerivativeOrder) -> f64 {
    let m = half_width as f64;
    match order {
        // c[i] = 3i / (m(m+1)(2m+1))
        DerivativeOrder::First => 3.0 / (m * (m + 1.0) * (2.0 * m + 1.0)),
        // c[i] = 30(3i^2 - m(m+1)) / (m(m+1)(2m+1)(2m-1)(2m+3))
        DerivativeOrder::Second => {
            30.0 / (m * (m + 1.0) * (2.0 * m + 1.0) * (2.0 * m - 1.0) * (2.0 * m + 3.0))
        }
    }
}

/// Smoothed derivative of an intensity sequence
///
/// Convolves the signal with a Savitzky-Golay kernel of half-width
/// `half_width`. Near either boundary the window shrinks symmetrically to
/// `min(half_width, k, n - 1 - k)` so it never leaves the signal; the first
/// and last scans therefore always read 0.
///
/// Each tap is applied to the difference from the centre scan. The kernel
/// taps sum to zero, so this is the same convolution, but a constant run
/// differentiates to exactly 0.0.
///
/// # Arguments
/// * `intensities` - Signal to differentiate
/// * `second_derivative` - `true` for the second derivative, `false` for the first
/// * `half_width` - Kernel half-width in scans
pub fn derivative(intensities: &[f64], second_derivative: bool, half_width: usize) -> Vec<f64> {
    let order = if second_derivative {
        DerivativeOrder::Second
    } else {
        DerivativeOrder::First
    };
    let n = intensities.len();
    let mut output = vec![0.0; n];

    // One kernel per effective half-width; no window is wider than the signal
    let widest = half_width.min(n.saturating_sub(1) / 2);
    let kernels: Vec<Vec<f64>> = (0..=widest)
        .map(|m| savitzky_golay_kernel(m, order))
        .collect();

    for (k, value) in output.iter_mut().enumerate() {
        let m = half_width.min(k).min(n - 1 - k);
        if m == 0 {
            continue;
        }
        let centre = intensities[k];
        let window = &intensities[k - m..=k + m];
        *value = kernels[m]
            .iter()
            .zip(window)
            .fold(0.0, |acc, (c, y)| acc + c * (y - centre));
    }

    output
}
