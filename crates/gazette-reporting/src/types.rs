use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use gazette_core::SummaryRecord;

/// Output format for a summary batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Newsletter-style plain text: title, summary and source URL per act.
    #[default]
    Text,
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Text => "text",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// One act as it appears in an exported report.
#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    pub title: &'a str,
    pub filename: &'a str,
    pub url: &'a str,
    pub summary: &'a str,
}

impl<'a> From<&'a SummaryRecord> for ReportEntry<'a> {
    fn from(record: &'a SummaryRecord) -> Self {
        Self {
            title: &record.title,
            filename: &record.filename,
            url: &record.url,
            summary: &record.summary,
        }
    }
}

/// A whole batch, in discovery order.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub date: &'a str,
    pub count: usize,
    pub acts: Vec<ReportEntry<'a>>,
}

impl<'a> Report<'a> {
    pub fn new(date: &'a str, records: &'a [SummaryRecord]) -> Self {
        Self {
            date,
            count: records.len(),
            acts: records.iter().map(ReportEntry::from).collect(),
        }
    }
}
