//! The book record shared by every part of the pipeline.
//!
//! `BookRecord` mirrors one entry of the LibraryThing JSON books API.  Only
//! the fields the feed needs are decoded; everything else in the payload is
//! ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A single book from the wishlist provider.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct BookRecord {
    /// ISBN as recorded by the provider (ISBN-10 or ISBN-13, no hyphens).
    #[serde(rename = "ISBN", default)]
    pub isbn: String,

    pub title: String,

    /// Author display name in "First Last" order.
    #[serde(default)]
    pub author_fl: String,

    /// Collection id → collection name.
    ///
    /// LibraryThing sends this only when `showCollections=1` is requested.
    #[serde(default)]
    pub collections: BTreeMap<String, String>,
}

impl BookRecord {
    /// Whether the book is a member of the collection with the given id.
    pub fn in_collection(&self, collection_id: &str) -> bool {
        self.collections.contains_key(collection_id)
    }

    /// `"{title} by {author}"`, used for both entry title and description.
    pub fn byline(&self) -> String {
        format!("{} by {}", self.title, self.author_fl)
    }
}
