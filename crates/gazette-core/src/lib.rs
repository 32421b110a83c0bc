use std::fmt;
use std::path::PathBuf;

pub mod config;
pub mod fetch;
pub mod naming;
pub mod openai;
pub mod pipeline;
pub mod rate_limit;
pub mod seen;
pub mod sink;
pub mod summarize;

// Re-export for convenience
pub use config::{Config, ConfigError};
pub use fetch::{DocumentFetcher, FetchError};
pub use gazette_pdf::{MupdfExtractor, TextExtractor};
pub use naming::{date_stamp, unique_path};
pub use openai::OpenAiGenerator;
pub use pipeline::{AcquisitionPipeline, PipelineError};
pub use seen::{SeenStore, SeenStoreError};
pub use sink::{MemorySink, SinkError, SummarySink};
pub use summarize::{GenerationError, GenerationRequest, SummaryRequester, TextGenerator};

/// A PDF link discovered on a listing page. Lives for one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateLink {
    pub url: String,
}

/// A downloaded document before it is persisted.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub bytes: Vec<u8>,
    pub title: String,
}

/// A destination path unique within its directory at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub path: PathBuf,
    pub filename: String,
}

/// One summarized document, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub filename: String,
    pub title: String,
    pub url: String,
    pub summary: String,
}

/// Why a candidate did not produce a [`SummaryRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Download failed (transport error or non-success status).
    Network(String),
    /// The document could not be written or re-read.
    Filesystem(String),
    /// The text-generation service failed or returned nothing.
    Generation(String),
    /// No text could be extracted from the PDF.
    NoText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Network(msg) => write!(f, "network: {}", msg),
            SkipReason::Filesystem(msg) => write!(f, "filesystem: {}", msg),
            SkipReason::Generation(msg) => write!(f, "generation: {}", msg),
            SkipReason::NoText => write!(f, "no extractable text"),
        }
    }
}

/// A candidate that was skipped, with whatever was known about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub url: String,
    pub title: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub date_stamp: String,
    pub candidates_found: usize,
    pub records: Vec<SummaryRecord>,
    pub skipped: Vec<SkippedDocument>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True when the listing had no new candidates.
    pub fn nothing_new(&self) -> bool {
        self.candidates_found == 0
    }
}

/// Pipeline stages, in the order a run moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Listing,
    Downloading,
    Extracting,
    Titling,
    Naming,
    Summarizing,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Listing => "listing",
            Stage::Downloading => "downloading",
            Stage::Extracting => "extracting",
            Stage::Titling => "titling",
            Stage::Naming => "naming",
            Stage::Summarizing => "summarizing",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Listed {
        candidates: usize,
    },
    Stage {
        index: usize,
        total: usize,
        stage: Stage,
    },
    Summarized {
        index: usize,
        total: usize,
        filename: String,
    },
    Skipped {
        index: usize,
        total: usize,
        url: String,
        reason: SkipReason,
    },
}
