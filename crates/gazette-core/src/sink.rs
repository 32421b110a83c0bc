//! The consumer of a run's summaries.

use thiserror::Error;

use crate::SummaryRecord;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Receives the ordered batch of summaries, exactly once per run.
///
/// The batch may be empty; whether an empty report is worth emitting is the
/// sink's decision.
pub trait SummarySink {
    fn emit(&mut self, records: &[SummaryRecord]) -> Result<(), SinkError>;
}

/// Keeps every emitted batch in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<Vec<SummaryRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent batch, if any was emitted.
    pub fn last(&self) -> Option<&[SummaryRecord]> {
        self.batches.last().map(Vec::as_slice)
    }
}

impl SummarySink for MemorySink {
    fn emit(&mut self, records: &[SummaryRecord]) -> Result<(), SinkError> {
        self.batches.push(records.to_vec());
        Ok(())
    }
}

impl<S: SummarySink + ?Sized> SummarySink for &mut S {
    fn emit(&mut self, records: &[SummaryRecord]) -> Result<(), SinkError> {
        (**self).emit(records)
    }
}
