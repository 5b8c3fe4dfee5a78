mod csv;
mod json;
mod summary;
mod text;

use serde::Serialize;

use crate::peak::ResolvedPeak;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::summary::{PeakSummary, StatsSummary};
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One reported peak together with the chromatogram it came from
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PeakRecord<'a> {
    pub source: &'a str,
    /// Position of the peak in the reported list
    pub rank: usize,
    #[serde(flatten)]
    pub peak: &'a ResolvedPeak,
}

pub trait Formatter: Send {
    fn format(&self, record: &PeakRecord<'_>) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}
