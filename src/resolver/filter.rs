use crate::chromatogram::Chromatogram;
use crate::config::{PeakFillingConfig, ResolverConfig};
use crate::peak::ResolvedPeak;
use crate::resolver::peak_model::PeakModel;

/// Keep the candidates lasting at least `min_duration` and reaching `min_height`
pub fn filter(candidates: Vec<ResolvedPeak>, min_duration: f64, min_height: f64) -> Vec<ResolvedPeak> {
    candidates
        .into_iter()
        .filter(|peak| passes(peak, min_duration, min_height))
        .collect()
}

fn passes(peak: &ResolvedPeak, min_duration: f64, min_height: f64) -> bool {
    peak.duration() >= min_duration && peak.height >= min_height
}

/// Acceptance filter and peak-shape post-processor
///
/// Owns a private working copy of the chromatogram intensities. When peak
/// filling is enabled, every accepted peak is handed to the peak model in
/// ascending order; a successful reconstruction that still passes the filter
/// is subtracted from the working copy (clamped at zero), so later peaks are
/// reconstructed from the residual.
pub struct PeakFilter<'a> {
    min_duration: f64,
    min_height: f64,
    filling: Option<(PeakFillingConfig, &'a dyn PeakModel)>,
    residual: Vec<f64>,
}

impl<'a> PeakFilter<'a> {
    /// Create a filter without peak filling
    pub fn new(config: &ResolverConfig, chromatogram: &Chromatogram) -> Self {
        Self {
            min_duration: config.min_peak_duration,
            min_height: config.min_peak_height,
            filling: None,
            residual: chromatogram.dense_intensities(),
        }
    }

    /// Enable peak filling with the given model
    pub fn with_filling(mut self, params: PeakFillingConfig, model: &'a dyn PeakModel) -> Self {
        self.filling = Some((params, model));
        self
    }

    pub fn accepts(&self, peak: &ResolvedPeak) -> bool {
        passes(peak, self.min_duration, self.min_height)
    }

    /// Working intensities after all subtractions so far
    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    /// Filter candidates (ascending, non-overlapping) and optionally fill them
    pub fn apply(
        &mut self,
        chromatogram: &Chromatogram,
        candidates: Vec<ResolvedPeak>,
    ) -> Vec<ResolvedPeak> {
        let accepted = filter(candidates, self.min_duration, self.min_height);
        let Some((params, model)) = self.filling else {
            return accepted;
        };

        let last_index = chromatogram.len() - 1;
        let mut output: Vec<ResolvedPeak> = Vec::with_capacity(accepted.len());
        for (i, peak) in accepted.iter().enumerate() {
            let lower = output.last().map_or(0, |p| p.end_index + 1);
            let upper = accepted
                .get(i + 1)
                .map_or(last_index, |next| next.start_index.saturating_sub(1));

            let filled = model
                .fill(peak, chromatogram, &self.residual, (lower, upper), &params)
                .filter(|filled| self.accepts(filled));

            match filled {
                Some(filled) => {
                    log::debug!(
                        "{} model filled peak at index {}: {}..={}",
                        model.name(),
                        filled.apex_index,
                        filled.start_index,
                        filled.end_index
                    );
                    self.subtract(&filled);
                    output.push(filled);
                }
                None => output.push(peak.clone()),
            }
        }
        output
    }

    fn subtract(&mut self, filled: &ResolvedPeak) {
        for point in &filled.data_points {
            let value = &mut self.residual[point.index];
            *value = (*value - point.intensity).max(0.0);
        }
    }
}
