//! Act title resolution and filesystem-safe slugs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::collapse_whitespace;

/// Title used when a document has no non-blank line at all.
pub const UNKNOWN_TITLE: &str = "unknown act";

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 100;

/// Maximum slug length in UTF-8 bytes. Leaves room under the usual 255-byte
/// file name limit for the date stamp, collision suffix and extension.
pub const MAX_SLUG_BYTES: usize = 200;

/// A legal-document keyword followed somewhere on the same line by a date marker.
static ACT_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:ustaw[ay]|rozporządzeni[ae]|obwieszczeni[ae]|uchwał[ay]|zarządzeni[ae]|postanowieni[ae]|act|law|regulation|decree)\b.*\b(?:z\s+dnia|dated|of)\s+\d{1,2}\b",
    )
    .unwrap()
});

static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Derive a human-readable title from extracted text.
///
/// Fallback chain:
/// 1. the first line that reads like an act heading ("USTAWA z dnia 1 stycznia 2025")
/// 2. the first non-blank line
/// 3. [`UNKNOWN_TITLE`]
///
/// The chosen line is whitespace-collapsed.
pub fn resolve_title(text: &str) -> String {
    if let Some(heading) = text.lines().find(|line| ACT_HEADING_RE.is_match(line)) {
        return collapse_whitespace(heading);
    }

    text.lines()
        .map(collapse_whitespace)
        .find(|line| !line.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Reduce a title to word characters, hyphens and underscores.
///
/// Whitespace runs become a single `_` and the result is capped at
/// [`MAX_SLUG_LEN`] characters and [`MAX_SLUG_BYTES`] bytes, cut on a
/// character boundary. A title with nothing usable maps to the slug of
/// [`UNKNOWN_TITLE`].
pub fn sanitize(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        slugify(UNKNOWN_TITLE)
    } else {
        slug
    }
}

fn slugify(title: &str) -> String {
    let stripped = NON_SLUG_RE.replace_all(title, "");
    let joined = WHITESPACE_RE.replace_all(stripped.trim(), "_");
    let mut slug = String::new();
    for c in joined.chars().take(MAX_SLUG_LEN) {
        if slug.len() + c.len_utf8() > MAX_SLUG_BYTES {
            break;
        }
        slug.push(c);
    }
    slug
}
