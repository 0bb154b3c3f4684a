//! wishlist-to-library: which of my wishlist books can I borrow right now?
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ BookRecord ┌──────────┐  ISBN   ┌──────────┐  Html  ┌──────────────┐
//! │ source/  │ ─────────► │  feed/   │ ──────► │ catalog  │ ─────► │ availability │
//! │ (wishlist)│           │(assemble)│ ◄────── │ (resolve)│        │  (scrape)    │
//! └──────────┘            └──────────┘ entries └──────────┘        └──────────────┘
//!                              │
//!                              ▼ RSS XML → file or stdout
//! ```
//!
//! * **`source/`** — the `WishlistSource` trait and the LibraryThing client.
//! * **`catalog`** — finds the Koha detail page for an ISBN.
//! * **`availability`** — reads branch/status rows off a detail page.
//! * **`feed/`** — builds one entry per available book and the RSS document.
//! * **`config`**, **`cli`**, **`logging`** — environment, arguments, tracing.
//! * **`amazon`** — standalone helper pulling ISBNs out of an Amazon export.

pub mod amazon;
pub mod availability;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod feed;
mod html;
pub mod logging;
pub mod source;

use std::fs;
use std::io::{self, Write as _};
use std::path::Path;

use anyhow::{Context as _, Result};

use catalog::KohaCatalog;
use config::Config;
use feed::{EntryLinks, FeedAssembler, FeedDocument, FeedItemBuilder, SystemClock};
use source::{LibraryThingSource, WishlistSource};

/// Fetch the wishlist and build the feed.
pub fn run(config: &Config) -> Result<FeedDocument> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")?;

    let wishlist = LibraryThingSource::new(client.clone(), config.wishlist.clone());
    let books = wishlist.fetch().context("fetch wishlist")?;

    let catalog = KohaCatalog::new(client, config.catalog.clone());
    let links = EntryLinks {
        catalog_label: config.catalog.label.clone(),
        wishlist_entry_url: config.wishlist.entry_url.clone(),
    };
    let builder = FeedItemBuilder::new(&catalog, &SystemClock, &links);

    FeedAssembler::new(builder, config.feed.clone()).assemble(&books)
}

/// Write the serialized feed to `output`, or stdout when there is none.
pub fn write_feed(xml: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, xml).with_context(|| format!("write feed to {}", path.display()))?;
            tracing::info!(path = %path.display(), "feed written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .and_then(|()| stdout.flush())
                .context("write feed to stdout")?;
        }
    }
    Ok(())
}
