//! ISBNs from an Amazon wishlist export.
//!
//! Not part of the feed pipeline.  It helps move an Amazon wishlist over to
//! LibraryThing: feed it the JSON produced by an Amazon wishlist scraper and
//! paste the ISBNs into LibraryThing's import.
//!
//! Each exported item carries a `link` such as
//! `http://www.amazon.com/dp/0316212377/ref=...`; the segment after `dp` is
//! the ISBN-10 for books and an ASIN (e.g. `B00ABC1234`) for everything else.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// Position of the ISBN/ASIN in `link.split('/')`.
const ID_SEGMENT: usize = 4;

#[derive(Deserialize)]
struct ExportItem {
    #[serde(default)]
    link: Option<String>,
}

/// ISBN-10 shape: digits, with an optional trailing `X`.
///
/// The uppercase `X` check character is accepted on purpose: it is a valid
/// ISBN-10 check digit, and non-book ASINs start with a letter.
fn looks_like_isbn(id: &str) -> bool {
    let Some((check, body)) = id.as_bytes().split_last() else {
        return false;
    };
    body.iter().all(u8::is_ascii_digit) && (check.is_ascii_digit() || *check == b'X')
}

/// ISBNs from an export already in memory, in export order.
///
/// Items without a link, with a short link, or whose id is an ASIN are
/// skipped.
pub fn isbns_from_json(json: &str) -> Result<Vec<String>> {
    let items: Vec<ExportItem> = serde_json::from_str(json).context("decode wishlist export")?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.link)
        .filter_map(|link| link.split('/').nth(ID_SEGMENT).map(str::to_string))
        .filter(|id| looks_like_isbn(id))
        .collect())
}

/// ISBNs from an export file.
pub fn isbns_from_export(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    isbns_from_json(&json)
}
