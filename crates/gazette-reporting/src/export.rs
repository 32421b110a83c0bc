//! Rendering summary batches and writing them out.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use gazette_core::{SinkError, SummaryRecord, SummarySink};

use crate::types::{ExportFormat, Report};

/// Render `records` in `format`; `date` is the run's `YYYYMMDD` stamp.
pub fn render(records: &[SummaryRecord], format: ExportFormat, date: &str) -> Result<String, SinkError> {
    match format {
        ExportFormat::Text => Ok(render_text(records)),
        ExportFormat::Markdown => Ok(render_markdown(records, date)),
        ExportFormat::Json => export_json(records, date),
    }
}

pub fn export_json(records: &[SummaryRecord], date: &str) -> Result<String, SinkError> {
    Ok(serde_json::to_string_pretty(&Report::new(date, records))?)
}

/// Opening of the plain-text newsletter body.
pub const TEXT_GREETING: &str = "Dzień dobry,\n\nOto dzisiejsze podsumowanie ustaw:\n\n";

fn render_text(records: &[SummaryRecord]) -> String {
    let mut out = String::from(TEXT_GREETING);
    if records.is_empty() {
        out.push_str("Brak nowych ustaw.\n");
        return out;
    }

    for r in records {
        let _ = writeln!(out, "{}\n{}\n{}\n", r.title, r.summary, r.url);
    }
    out
}

fn render_markdown(records: &[SummaryRecord], date: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Newly published acts ({})", date);

    if records.is_empty() {
        out.push_str("\n_No new acts today._\n");
        return out;
    }

    for r in records {
        let _ = writeln!(out, "\n## {}\n", r.title);
        let _ = writeln!(out, "{}\n", r.summary);
        let _ = writeln!(out, "Source: <{}> (saved as `{}`)", r.url, r.filename);
    }
    out
}

/// Writes the rendered report to a file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: ExportFormat,
    date: String,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat, date: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format,
            date: date.into(),
        }
    }
}

impl SummarySink for FileSink {
    fn emit(&mut self, records: &[SummaryRecord]) -> Result<(), SinkError> {
        let content = render(records, self.format, &self.date)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        log::info!("wrote {} report to {}", self.format, self.path.display());
        Ok(())
    }
}

/// Writes the rendered report to any writer (stdout, a socket, a buffer).
pub struct WriterSink<W> {
    writer: W,
    format: ExportFormat,
    date: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: ExportFormat, date: impl Into<String>) -> Self {
        Self {
            writer,
            format,
            date: date.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SummarySink for WriterSink<W> {
    fn emit(&mut self, records: &[SummaryRecord]) -> Result<(), SinkError> {
        let content = render(records, self.format, &self.date)?;
        self.writer.write_all(content.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
