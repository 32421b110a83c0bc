use std::path::Path;
use thiserror::Error;

#[cfg(feature = "pdf")]
mod extract;
mod title;

#[cfg(feature = "pdf")]
pub use extract::{MupdfExtractor, extract_pages, extract_text};
pub use title::{MAX_SLUG_BYTES, MAX_SLUG_LEN, UNKNOWN_TITLE, resolve_title, sanitize};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns raw PDF bytes into plain text.
///
/// Implementations are best-effort: a document or page with no recoverable
/// text yields an empty string, never an error.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> String;

    /// Read a persisted PDF and extract its text.
    ///
    /// Only an unreadable file is an error.
    fn extract_from_path(&self, path: &Path) -> Result<String, PdfError> {
        let bytes = std::fs::read(path)?;
        Ok(self.extract(&bytes))
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
