//! Collision-free destination filenames.
//!
//! Probing is sequential and deterministic for a given directory snapshot.
//! Two runs writing into the same directory at once are not supported.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::NamedFile;

/// `YYYYMMDD` for the given day.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// First unused `"{slug} {date_stamp}[_{n}].pdf"` in `directory`.
///
/// The bare name is tried first, then `_1`, `_2`, ... with no gaps.
pub fn unique_path(directory: &Path, slug: &str, date_stamp: &str) -> NamedFile {
    let stem = format!("{} {}", slug, date_stamp);
    let mut filename = format!("{}.pdf", stem);
    let mut counter = 1u32;

    while directory.join(&filename).exists() {
        filename = format!("{}_{}.pdf", stem, counter);
        counter += 1;
    }

    NamedFile {
        path: directory.join(&filename),
        filename,
    }
}

/// Write `bytes` to a path that must not exist yet.
///
/// Uses `create_new` so an existing document is never overwritten.
pub fn persist(named: &NamedFile, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&named.path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
