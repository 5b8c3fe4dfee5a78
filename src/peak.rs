use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::chromatogram::Chromatogram;

/// Closed retention time interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RtRange {
    pub min: f64,
    pub max: f64,
}

impl RtRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the interval
    pub fn size(&self) -> f64 {
        self.max - self.min
    }
}

/// Identification attached to a peak by a downstream identification stage
///
/// The resolver never creates or inspects identities; it only carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakIdentity {
    /// Description of the identification method, e.g. the searched database
    pub identification_method: String,
    /// Compound ID within that method
    pub id: String,
    pub name: String,
    pub formula: String,
}

impl PeakIdentity {
    pub fn new(
        identification_method: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            identification_method: identification_method.into(),
            id: id.into(),
            name: name.into(),
            formula: formula.into(),
        }
    }
}

impl fmt::Display for PeakIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.formula.is_empty() {
            write!(f, " ({})", self.formula)?;
        }
        write!(f, " [{}:{}]", self.identification_method, self.id)
    }
}

/// One scan of a resolved peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakDataPoint {
    pub index: usize,
    pub retention_time: f64,
    pub intensity: f64,
}

/// A contiguous chromatographic elution event
///
/// Indices refer to positions in the source chromatogram and always satisfy
/// `start_index <= apex_index <= end_index`. For an unfilled peak `height`
/// is the chromatogram intensity at `apex_index`; a filled peak reports the
/// reconstructed model values instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPeak {
    pub start_index: usize,
    pub end_index: usize,
    pub apex_index: usize,
    pub height: f64,
    /// Retention time of the apex scan
    pub retention_time: f64,
    pub rt_range: RtRange,
    /// Trapezoidal area over retention time
    pub area: f64,
    /// True when the peak shape was reconstructed by a peak model
    pub filled: bool,
    #[serde(skip)]
    pub data_points: Vec<PeakDataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<PeakIdentity>,
}

impl ResolvedPeak {
    /// Build a peak from buffered chromatogram indices
    ///
    /// Indices without a data point are skipped. The apex is `apex_hint`
    /// when it lies on a data point inside the buffered range, otherwise the
    /// most intense data point (leftmost on ties). Returns `None` when no
    /// buffered index carries data.
    pub fn from_indices(
        chromatogram: &Chromatogram,
        indices: &[usize],
        apex_hint: Option<usize>,
    ) -> Option<Self> {
        let data_points: Vec<PeakDataPoint> = indices
            .iter()
            .filter_map(|&index| {
                chromatogram.intensity(index).map(|intensity| PeakDataPoint {
                    index,
                    retention_time: chromatogram.retention_time(index),
                    intensity,
                })
            })
            .collect();

        let first = data_points.first()?.index;
        let last = data_points.last()?.index;

        let hinted = apex_hint.filter(|&apex| {
            apex >= first && apex <= last && chromatogram.has_data(apex)
        });
        let apex_index = match hinted {
            Some(apex) => apex,
            None => {
                let mut best = data_points[0];
                for point in &data_points[1..] {
                    if point.intensity > best.intensity {
                        best = *point;
                    }
                }
                best.index
            }
        };

        Some(Self::from_data_points(
            data_points,
            apex_index,
            chromatogram.intensity(apex_index).unwrap_or(0.0),
            chromatogram.retention_time(apex_index),
            false,
        ))
    }

    /// Assemble a peak from already computed data points
    pub(crate) fn from_data_points(
        data_points: Vec<PeakDataPoint>,
        apex_index: usize,
        height: f64,
        retention_time: f64,
        filled: bool,
    ) -> Self {
        let (start_index, end_index) = match (data_points.first(), data_points.last()) {
            (Some(first), Some(last)) => (first.index, last.index),
            _ => (apex_index, apex_index),
        };
        let rt_range = match (data_points.first(), data_points.last()) {
            (Some(first), Some(last)) => RtRange::new(first.retention_time, last.retention_time),
            _ => RtRange::new(retention_time, retention_time),
        };

        Self {
            start_index,
            end_index,
            apex_index,
            height,
            retention_time,
            rt_range,
            area: trapezoid_area(&data_points),
            filled,
            data_points,
            identity: None,
        }
    }

    /// Attach an identification result
    pub fn with_identity(mut self, identity: PeakIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Retention time span of the peak
    pub fn duration(&self) -> f64 {
        self.rt_range.size()
    }

    /// Number of scans spanned by the peak
    pub fn scan_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Whether the index ranges of two peaks share a scan
    pub fn overlaps(&self, other: &ResolvedPeak) -> bool {
        self.start_index <= other.end_index && other.start_index <= self.end_index
    }
}

fn trapezoid_area(points: &[PeakDataPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].retention_time - w[0].retention_time) * (w[0].intensity + w[1].intensity) / 2.0)
        .sum()
}

/// Order peaks by descending height; equal heights keep their relative order
pub fn compare_by_intensity(a: &ResolvedPeak, b: &ResolvedPeak) -> Ordering {
    b.height.total_cmp(&a.height)
}

/// Sort peaks so the most intense comes first
pub fn sort_by_intensity(peaks: &mut [ResolvedPeak]) {
    peaks.sort_by(compare_by_intensity);
}
