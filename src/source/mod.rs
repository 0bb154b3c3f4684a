//! Wishlist source abstraction layer.
//!
//! This module defines the [`WishlistSource`] trait and the common
//! [`BookRecord`] type.  The concrete LibraryThing implementation lives in
//! [`librarything`].
//!
//! ## For contributors — adding a new wishlist provider
//!
//! 1. Create a new file in this directory (e.g. `goodreads.rs`).
//! 2. Define a struct holding the provider's settings and implement
//!    [`WishlistSource`] for it.
//! 3. Add `mod goodreads;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`LibraryThingSource`].
//!
//! Catalog lookup and feed assembly only ever see [`BookRecord`]s, so nothing
//! else has to change.

mod book;
mod librarything;

pub use book::BookRecord;
pub use librarything::{parse_wishlist, LibraryThingSource};

use anyhow::Result;

/// Trait that every wishlist provider must implement.
pub trait WishlistSource {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch the wishlisted books.
    ///
    /// Implementations perform their own HTTP work and return only the
    /// records that belong to the wishlist.  Any failure is fatal to the
    /// run: without a wishlist there is nothing to look up.
    fn fetch(&self) -> Result<Vec<BookRecord>>;
}
