use serde::{Deserialize, Serialize};

use crate::error::{PeakError, Result};

/// One scan of a reconstructed ion chromatogram
///
/// `intensity` is `None` when the scan carries no data point for the ion
/// (a gap in the extracted trace).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub scan_number: u32,
    pub retention_time: f64,
    pub intensity: Option<f64>,
}

/// Intensity signal of a single ion across retention time
///
/// Samples are kept in acquisition order; the position of a sample in the
/// chromatogram is its index. Construction validates the arrays so every
/// downstream stage may assume strictly increasing retention times and
/// finite, non-negative intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromatogram {
    source: Option<String>,
    samples: Vec<Sample>,
}

impl Chromatogram {
    /// Build a chromatogram from equal-length arrays without gaps
    pub fn new(scan_numbers: &[u32], retention_times: &[f64], intensities: &[f64]) -> Result<Self> {
        let intensities: Vec<Option<f64>> = intensities.iter().copied().map(Some).collect();
        Self::with_gaps(scan_numbers, retention_times, &intensities)
    }

    /// Build a chromatogram where some scans may have no data point
    pub fn with_gaps(
        scan_numbers: &[u32],
        retention_times: &[f64],
        intensities: &[Option<f64>],
    ) -> Result<Self> {
        if scan_numbers.len() != retention_times.len() || scan_numbers.len() != intensities.len() {
            return Err(PeakError::MalformedInput(format!(
                "array lengths differ: {} scans, {} retention times, {} intensities",
                scan_numbers.len(),
                retention_times.len(),
                intensities.len()
            )));
        }
        if scan_numbers.is_empty() {
            return Err(PeakError::MalformedInput("chromatogram is empty".to_string()));
        }

        let mut samples = Vec::with_capacity(scan_numbers.len());
        let mut previous_rt = f64::NEG_INFINITY;
        for (i, ((&scan_number, &retention_time), &intensity)) in scan_numbers
            .iter()
            .zip(retention_times)
            .zip(intensities)
            .enumerate()
        {
            if !retention_time.is_finite() {
                return Err(PeakError::MalformedInput(format!(
                    "retention time at index {} is not finite",
                    i
                )));
            }
            if retention_time <= previous_rt {
                return Err(PeakError::MalformedInput(format!(
                    "retention times must be strictly increasing (index {}: {} after {})",
                    i, retention_time, previous_rt
                )));
            }
            if let Some(value) = intensity {
                if !value.is_finite() || value < 0.0 {
                    return Err(PeakError::MalformedInput(format!(
                        "intensity at index {} must be finite and non-negative, got {}",
                        i, value
                    )));
                }
            }
            previous_rt = retention_time;
            samples.push(Sample {
                scan_number,
                retention_time,
                intensity,
            });
        }

        Ok(Self {
            source: None,
            samples,
        })
    }

    /// Attach an opaque handle identifying where this trace came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn retention_time(&self, index: usize) -> f64 {
        self.samples[index].retention_time
    }

    pub fn intensity(&self, index: usize) -> Option<f64> {
        self.samples[index].intensity
    }

    /// Whether the scan at `index` carries a data point
    pub fn has_data(&self, index: usize) -> bool {
        self.samples[index].intensity.is_some()
    }

    /// Intensities with gaps read as zero
    pub fn dense_intensities(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.intensity.unwrap_or(0.0))
            .collect()
    }

    /// Mean and maximum of the dense intensities
    pub fn intensity_summary(&self) -> (f64, f64) {
        let mut sum = 0.0;
        let mut max = 0.0f64;
        for sample in &self.samples {
            let value = sample.intensity.unwrap_or(0.0);
            sum += value;
            max = max.max(value);
        }
        (sum / self.samples.len() as f64, max)
    }
}

/// Serialized form of a chromatogram, as read from and written to JSON
///
/// `null` entries in `intensities` denote scans without a data point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChromatogramData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub scans: Vec<u32>,
    pub retention_times: Vec<f64>,
    pub intensities: Vec<Option<f64>>,
}

impl ChromatogramData {
    pub fn into_chromatogram(self) -> Result<Chromatogram> {
        let chromatogram =
            Chromatogram::with_gaps(&self.scans, &self.retention_times, &self.intensities)?;
        Ok(match self.source {
            Some(source) => chromatogram.with_source(source),
            None => chromatogram,
        })
    }
}

impl From<&Chromatogram> for ChromatogramData {
    fn from(chromatogram: &Chromatogram) -> Self {
        Self {
            source: chromatogram.source.clone(),
            scans: chromatogram.samples.iter().map(|s| s.scan_number).collect(),
            retention_times: chromatogram
                .samples
                .iter()
                .map(|s| s.retention_time)
                .collect(),
            intensities: chromatogram.samples.iter().map(|s| s.intensity).collect(),
        }
    }
}
