//! MuPDF-backed text extraction.
//!
//! Legal gazettes regularly contain scanned pages with no text layer, so every
//! failure below the document level degrades to an empty page.

use mupdf::{Document, TextPageFlags};

use crate::TextExtractor;

/// Extract the text of every page in document order.
///
/// Pages are joined with a newline. A page that cannot be loaded or has no
/// text contributes an empty string; a document MuPDF cannot open yields `""`.
pub fn extract_text(bytes: &[u8]) -> String {
    extract_pages(bytes).join("\n").trim().to_string()
}

/// Text of each page, one entry per page in document order.
///
/// Empty when the document cannot be opened.
pub fn extract_pages(bytes: &[u8]) -> Vec<String> {
    let doc = match Document::from_bytes(bytes, "application/pdf") {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("could not open PDF ({} bytes): {}", bytes.len(), e);
            return Vec::new();
        }
    };

    let page_count = match doc.page_count() {
        Ok(n) => n,
        Err(e) => {
            log::warn!("could not count PDF pages: {}", e);
            return Vec::new();
        }
    };

    (0..page_count)
        .map(|index| {
            doc.load_page(index)
                .and_then(|page| page.to_text_page(TextPageFlags::empty()))
                .and_then(|text_page| text_page.to_text())
                .unwrap_or_else(|e| {
                    log::debug!("page {} has no extractable text: {}", index + 1, e);
                    String::new()
                })
        })
        .collect()
}

/// The default [`TextExtractor`], delegating to MuPDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfExtractor;

impl TextExtractor for MupdfExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        extract_text(bytes)
    }
}
