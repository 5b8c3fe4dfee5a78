use rolling_stats::Stats;
use serde::Serialize;

use crate::peak::ResolvedPeak;

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Distribution of peak properties over one or more peak lists
#[derive(Debug, Clone, Serialize)]
pub struct PeakSummary {
    pub peak_count: usize,
    pub filled_count: usize,
    pub height: Option<StatsSummary>,
    pub duration: Option<StatsSummary>,
    pub area: Option<StatsSummary>,
}

impl PeakSummary {
    pub fn from_peaks<'a>(peaks: impl IntoIterator<Item = &'a ResolvedPeak>) -> Self {
        let mut height: Stats<f64> = Stats::new();
        let mut duration: Stats<f64> = Stats::new();
        let mut area: Stats<f64> = Stats::new();
        let mut filled_count = 0;

        for peak in peaks {
            height.update(peak.height);
            duration.update(peak.duration());
            area.update(peak.area);
            if peak.filled {
                filled_count += 1;
            }
        }

        Self {
            peak_count: height.count,
            filled_count,
            height: StatsSummary::from_stats(&height),
            duration: StatsSummary::from_stats(&duration),
            area: StatsSummary::from_stats(&area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_peaks::peak;

    #[test]
    fn test_empty_summary() {
        let summary = PeakSummary::from_peaks(&Vec::<ResolvedPeak>::new());
        assert_eq!(summary.peak_count, 0);
        assert!(summary.height.is_none());
    }

    #[test]
    fn test_summary_of_peaks() {
        let low = peak();
        let mut high = peak();
        high.height = 750.5;
        let summary = PeakSummary::from_peaks([&low, &high]);

        assert_eq!(summary.peak_count, 2);
        assert_eq!(summary.filled_count, 0);
        let height = summary.height.unwrap();
        assert!((height.mean - 500.5).abs() < 1e-9);
        assert!((height.min - 250.5).abs() < 1e-9);
        assert!((height.max - 750.5).abs() < 1e-9);
        let duration = summary.duration.unwrap();
        assert!((duration.mean - 0.3).abs() < 1e-9);
    }
}
