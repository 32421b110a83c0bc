pub mod export;
pub mod types;

pub use export::{FileSink, TEXT_GREETING, WriterSink, export_json, render};
pub use types::{ExportFormat, Report, ReportEntry};
