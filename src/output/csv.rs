use super::{Formatter, PeakRecord};

/// Comma-separated rows; free-text fields are quoted when needed
pub struct CsvFormatter;

impl CsvFormatter {
    fn fields(record: &PeakRecord<'_>) -> Vec<String> {
        let peak = record.peak;
        let (name, formula) = peak
            .identity
            .as_ref()
            .map_or((String::new(), String::new()), |id| {
                (id.name.clone(), id.formula.clone())
            });
        vec![
            record.source.to_string(),
            record.rank.to_string(),
            peak.start_index.to_string(),
            peak.apex_index.to_string(),
            peak.end_index.to_string(),
            format!("{:.4}", peak.retention_time),
            format!("{:.4}", peak.rt_range.min),
            format!("{:.4}", peak.rt_range.max),
            format!("{:.3}", peak.height),
            format!("{:.3}", peak.area),
            peak.filled.to_string(),
            name,
            formula,
        ]
    }

    fn write_row(fields: &[String]) -> csv::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(fields)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).trim_end_matches('\n').to_string())
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, record: &PeakRecord<'_>) -> String {
        Self::write_row(&Self::fields(record)).unwrap_or_else(|e| {
            log::warn!("cannot write CSV row for {}: {}", record.source, e);
            String::new()
        })
    }

    fn header(&self) -> Option<&'static str> {
        Some("source,rank,start,apex,end,rt,rt_min,rt_max,height,area,filled,name,formula")
    }
}
