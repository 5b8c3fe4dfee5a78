use super::{Formatter, PeakRecord};

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &PeakRecord<'_>) -> String {
        serde_json::to_string(record)
            .unwrap_or_else(|e| format!(r#"{{"source":"{}","error":"{}"}}"#, record.source, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_peaks::peak;

    #[test]
    fn test_json_format() {
        let peak = peak();
        let record = PeakRecord {
            source: "sample.json",
            rank: 2,
            peak: &peak,
        };

        let line = JsonFormatter.format(&record);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["source"], "sample.json");
        assert_eq!(value["rank"], 2);
        assert_eq!(value["apex_index"], 1);
        assert_eq!(value["filled"], false);
        assert!(value.get("data_points").is_none());
        assert!(value.get("identity").is_none());
    }
}
