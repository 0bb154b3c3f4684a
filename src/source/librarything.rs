//! LibraryThing wishlist source.
//!
//! Talks to the LibraryThing JSON books API
//! (`api_getdata.php?...&showCollections=1&responseType=json`).  The response
//! looks like:
//!
//! ```text
//! {"settings": {...}, "books": {"<book id>": {"ISBN": ..., "title": ...,
//!   "author_fl": ..., "collections": {"4": "Wishlist"}}, ...}}
//! ```
//!
//! Decoding lives in [`parse_wishlist`], a pure function, so tests can
//! exercise it without the network.

use anyhow::{Context as _, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{BookRecord, WishlistSource};
use crate::config::WishlistConfig;

#[derive(Deserialize)]
struct Payload {
    books: serde_json::Map<String, serde_json::Value>,
}

/// Decode an API payload and keep only books in `collection_id`.
///
/// Books come back in payload order.  A malformed payload or a malformed
/// book fails the whole decode.
pub fn parse_wishlist(body: &str, collection_id: &str) -> Result<Vec<BookRecord>> {
    let payload: Payload = serde_json::from_str(body).context("decode wishlist payload")?;

    let mut books = Vec::new();
    for (key, value) in payload.books {
        let book: BookRecord =
            serde_json::from_value(value).with_context(|| format!("decode book {key}"))?;
        if book.in_collection(collection_id) {
            books.push(book);
        }
    }
    Ok(books)
}

/// A LibraryThing account's wishlist.
pub struct LibraryThingSource {
    client: Client,
    config: WishlistConfig,
}

impl LibraryThingSource {
    /// Create a source for the account named in `config`.
    ///
    /// The client is shared with the catalog lookups so both reuse one
    /// connection pool.
    pub fn new(client: Client, config: WishlistConfig) -> Self {
        Self { client, config }
    }
}

impl WishlistSource for LibraryThingSource {
    fn name(&self) -> &str {
        "LibraryThing"
    }

    fn fetch(&self) -> Result<Vec<BookRecord>> {
        let max = self.config.max.to_string();
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("userid", self.config.user_id.as_str()),
                ("key", self.config.key.as_str()),
                ("showCollections", "1"),
                ("responseType", "json"),
                ("max", max.as_str()),
            ])
            .send()
            .with_context(|| format!("request {}", self.config.api_url))?
            .error_for_status()?;

        let body = response.text().context("read wishlist body")?;
        let books = parse_wishlist(&body, &self.config.collection_id)?;
        tracing::info!(source = self.name(), count = books.len(), "fetched wishlist");
        Ok(books)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
