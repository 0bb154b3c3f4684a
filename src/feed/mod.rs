//! Feed assembly and serialization.
//!
//! [`FeedAssembler`] walks the wishlist in order, asks [`FeedItemBuilder`]
//! for an entry per book and collects the non-empty ones into a
//! [`FeedDocument`], which serializes to pretty-printed RSS 2.0.
//!
//! Error policy per book:
//!
//! * not in the catalog, or nothing available: skipped silently;
//! * detail page with an unexpected layout: logged at `warn`, skipped;
//! * catalog network failure: aborts the whole run.

mod item;

pub use item::{Clock, EntryLink, EntryLinks, FeedEntry, FeedItemBuilder, SystemClock};

use std::collections::BTreeMap;

use anyhow::{Context as _, Result};

use crate::catalog::{CatalogResolver, LookupError};
use crate::config::FeedMetadata;
use crate::source::BookRecord;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Feed-level metadata plus entries in wishlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub metadata: FeedMetadata,
    pub entries: Vec<FeedEntry>,
}

impl FeedDocument {
    /// An empty feed; entries are pushed by [`FeedAssembler`].
    pub fn new(metadata: FeedMetadata) -> Self {
        Self {
            metadata,
            entries: Vec::new(),
        }
    }

    /// The RSS channel for this feed.
    ///
    /// `self_link` is both the channel `<link>` and its `atom:link
    /// rel="self"`.  The feed author goes into `dc:creator` as
    /// `"name <uri>"`, the feed id into `dc:identifier`.
    pub fn to_channel(&self) -> rss::Channel {
        let meta = &self.metadata;

        let mut self_link = rss::extension::atom::Link::default();
        self_link.set_href(meta.self_link.clone());
        self_link.set_rel("self");
        let mut atom = rss::extension::atom::AtomExtension::default();
        atom.set_links(vec![self_link]);

        let mut creator = rss::extension::dublincore::DublinCoreExtension::default();
        creator.set_creators(vec![format!("{} <{}>", meta.author_name, meta.author_uri)]);
        creator.set_identifiers(vec![meta.id.clone()]);

        let mut channel = rss::Channel::default();
        channel.set_title(meta.title.clone());
        channel.set_link(meta.self_link.clone());
        channel.set_description(meta.description.clone());
        channel.set_generator(meta.author_name.clone());
        channel.set_dublin_core_ext(creator);
        channel.set_atom_ext(atom);
        channel.set_namespaces(BTreeMap::from([
            ("content".to_string(), CONTENT_NAMESPACE.to_string()),
            ("atom".to_string(), ATOM_NAMESPACE.to_string()),
        ]));
        channel.set_items(
            self.entries
                .iter()
                .cloned()
                .map(rss::Item::from)
                .collect::<Vec<_>>(),
        );
        channel
    }

    /// Pretty-printed RSS XML, newline-terminated.
    pub fn to_xml(&self) -> Result<String> {
        let buf = self
            .to_channel()
            .pretty_write_to(Vec::new(), b' ', 2)
            .context("serialize feed")?;
        let mut xml = String::from_utf8(buf).context("feed is not UTF-8")?;
        xml.push('\n');
        Ok(xml)
    }
}

/// Builds the whole feed from a wishlist.
pub struct FeedAssembler<'a, R, C> {
    builder: FeedItemBuilder<'a, R, C>,
    metadata: FeedMetadata,
}

impl<'a, R: CatalogResolver, C: Clock> FeedAssembler<'a, R, C> {
    pub fn new(builder: FeedItemBuilder<'a, R, C>, metadata: FeedMetadata) -> Self {
        Self { builder, metadata }
    }

    pub fn assemble(&self, books: &[BookRecord]) -> Result<FeedDocument> {
        let mut doc = FeedDocument::new(self.metadata.clone());

        for book in books {
            tracing::debug!(isbn = %book.isbn, title = %book.title, "looking up");
            match self.builder.build(book) {
                Ok(Some(entry)) => {
                    tracing::info!(title = %book.title, "available");
                    doc.entries.push(entry);
                }
                Ok(None) => {}
                Err(err @ LookupError::Layout { .. }) => {
                    tracing::warn!(isbn = %book.isbn, title = %book.title, error = %err, "skipping book");
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("look up {} ({})", book.title, book.isbn));
                }
            }
        }

        tracing::info!(books = books.len(), entries = doc.entries.len(), "feed assembled");
        Ok(doc)
    }
}
