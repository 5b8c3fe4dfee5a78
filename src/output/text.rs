use super::{Formatter, PeakRecord};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &PeakRecord<'_>) -> String {
        let peak = record.peak;
        let mut line = if self.verbose {
            format!(
                "{} #{}: RT {:>8.3} [{:.3}-{:.3}] height {:>12.1} area {:>12.2} scans {}..={} ({}){}",
                record.source,
                record.rank,
                peak.retention_time,
                peak.rt_range.min,
                peak.rt_range.max,
                peak.height,
                peak.area,
                peak.start_index,
                peak.end_index,
                peak.scan_count(),
                if peak.filled { " filled" } else { "" }
            )
        } else {
            format!(
                "{} #{}: RT {:>8.3} height {:>12.1}",
                record.source, record.rank, peak.retention_time, peak.height
            )
        };
        if let Some(identity) = &peak.identity {
            line.push_str(&format!(" {}", identity));
        }
        line
    }
}
