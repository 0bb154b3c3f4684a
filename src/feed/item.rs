//! One feed entry per available wishlist book.
//!
//! An entry exists only when the catalog resolves the ISBN *and* at least one
//! branch lists the book as available.  Entry ids are the catalog URL plus
//! the generation timestamp, so every run produces ids the feed reader has
//! not seen and the book shows up as unread again.

use chrono::{DateTime, Utc};

use crate::availability::filter_available;
use crate::catalog::{CatalogResolver, LookupError};
use crate::html::escape;
use crate::source::BookRecord;

/// Source of "now" for entry ids.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLink {
    pub href: String,
    pub rel: String,
}

/// A feed entry before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub id: String,
    pub link: EntryLink,
    /// HTML body.
    pub content: String,
}

impl From<FeedEntry> for rss::Item {
    fn from(entry: FeedEntry) -> Self {
        let mut guid = rss::Guid::default();
        guid.set_value(entry.id);
        guid.set_permalink(false);

        let mut item = rss::Item::default();
        item.set_title(entry.title);
        item.set_description(entry.description);
        item.set_link(entry.link.href);
        item.set_guid(guid);
        item.set_content(entry.content);
        item
    }
}

/// Links and labels that go into each entry's content.
#[derive(Debug, Clone)]
pub struct EntryLinks {
    /// Short library name, rendered as "{label} link".
    pub catalog_label: String,
    /// Prefix joined with the ISBN to link back to the wishlist entry.
    pub wishlist_entry_url: String,
}

/// Seconds since the epoch with microsecond precision, e.g. `1760870400.123456`.
fn timestamp(now: DateTime<Utc>) -> String {
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

fn render_content(book: &BookRecord, url: &str, branches: &[String], links: &EntryLinks) -> String {
    let rows = branches
        .iter()
        .map(|b| format!("<li>{}</li>", escape(b)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<p><i>{title}</i> by {author} is available from:</p>\n\
         <ul>{rows}</ul>\n\n\
         <a href=\"{url}\">{label} link</a> and\n\
         <a href=\"{wishlist}{isbn}\">LibraryThing link</a>\n",
        title = escape(&book.title),
        author = escape(&book.author_fl),
        label = escape(&links.catalog_label),
        wishlist = links.wishlist_entry_url,
        isbn = book.isbn,
    )
}

/// Turns wishlist books into feed entries.
pub struct FeedItemBuilder<'a, R, C> {
    resolver: &'a R,
    clock: &'a C,
    links: &'a EntryLinks,
}

impl<'a, R: CatalogResolver, C: Clock> FeedItemBuilder<'a, R, C> {
    pub fn new(resolver: &'a R, clock: &'a C, links: &'a EntryLinks) -> Self {
        Self {
            resolver,
            clock,
            links,
        }
    }

    /// `Ok(None)` when the book is not in the catalog or no branch has it.
    pub fn build(&self, book: &BookRecord) -> Result<Option<FeedEntry>, LookupError> {
        let Some(matched) = self.resolver.resolve(&book.isbn)? else {
            return Ok(None);
        };

        let branches = filter_available(&matched.holdings()?);
        if branches.is_empty() {
            tracing::debug!(isbn = %book.isbn, "no branch has it available");
            return Ok(None);
        }

        let byline = book.byline();
        Ok(Some(FeedEntry {
            content: render_content(book, &matched.url, &branches, self.links),
            title: byline.clone(),
            description: byline,
            id: format!("{}?{}", matched.url, timestamp(self.clock.now())),
            link: EntryLink {
                href: matched.url,
                rel: "alternate".to_string(),
            },
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    use chrono::TimeZone;

    use crate::availability::AvailabilityRow;
    use crate::catalog::CatalogMatch;

    pub const CATALOG_URL: &str = "https://www.linkcat.info/cgi-bin/koha/opac-detail.pl?biblionumber=42";

    /// Resolver backed by a fixed ISBN → rows table.
    pub struct FakeCatalog {
        pub pages: HashMap<String, Vec<AvailabilityRow>>,
    }

    impl FakeCatalog {
        pub fn with(isbn: &str, rows: &[(&str, &str)]) -> Self {
            let rows = rows
                .iter()
                .map(|(branch, status)| AvailabilityRow::new(*branch, *status))
                .collect();
            Self {
                pages: HashMap::from([(isbn.to_string(), rows)]),
            }
        }
    }

    impl CatalogResolver for FakeCatalog {
        type Page = Vec<AvailabilityRow>;

        fn resolve(&self, isbn: &str) -> Result<Option<CatalogMatch<Self::Page>>, LookupError> {
            Ok(self.pages.get(isbn).map(|rows| CatalogMatch {
                url: CATALOG_URL.to_string(),
                page: rows.clone(),
            }))
        }
    }

    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    pub fn clock() -> FixedClock {
        FixedClock(Utc.timestamp_opt(1_760_870_400, 123_456_000).unwrap())
    }

    pub fn links() -> EntryLinks {
        EntryLinks {
            catalog_label: "MPL".to_string(),
            wishlist_entry_url: "http://www.librarything.com/isbn/".to_string(),
        }
    }

    pub fn book(isbn: &str, title: &str, author: &str) -> BookRecord {
        BookRecord {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author_fl: author.to_string(),
            collections: BTreeMap::from([("4".to_string(), "Wishlist".to_string())]),
        }
    }

    #[test]
    fn builds_entry_for_available_book() {
        let catalog = FakeCatalog::with("0316212377", &[("Main", "Available"), ("East", "Checked out")]);
        let (clock, links) = (clock(), links());
        let builder = FeedItemBuilder::new(&catalog, &clock, &links);

        let entry = builder
            .build(&book("0316212377", "X", "Y Z"))
            .unwrap()
            .expect("entry");

        assert_eq!(entry.title, "X by Y Z");
        assert_eq!(entry.description, "X by Y Z");
        assert_eq!(entry.link.href, CATALOG_URL);
        assert_eq!(entry.link.rel, "alternate");
        assert_eq!(entry.id, format!("{CATALOG_URL}?1760870400.123456"));
        assert!(entry.content.contains("<p><i>X</i> by Y Z is available from:</p>"));
        assert!(entry.content.contains("<ul><li>Main</li></ul>"));
        assert!(!entry.content.contains("East"));
        assert!(entry.content.contains(&format!("<a href=\"{CATALOG_URL}\">MPL link</a>")));
        assert!(entry
            .content
            .contains("<a href=\"http://www.librarything.com/isbn/0316212377\">LibraryThing link</a>"));
    }

    #[test]
    fn markup_in_book_fields_is_escaped() {
        let catalog = FakeCatalog::with("1", &[("Burnham & Elm <Annex>", "Available")]);
        let (clock, links) = (clock(), links());
        let builder = FeedItemBuilder::new(&catalog, &clock, &links);

        let entry = builder.build(&book("1", "A & B <i>", "O'Brien")).unwrap().unwrap();

        assert!(entry
            .content
            .contains("<p><i>A &amp; B &lt;i&gt;</i> by O&#39;Brien is available from:</p>"));
        assert!(entry.content.contains("<li>Burnham &amp; Elm &lt;Annex&gt;</li>"));
        assert!(entry.content.contains(&format!("<a href=\"{CATALOG_URL}\">MPL link</a>")));
        // Title and description are plain text; the RSS writer escapes them.
        assert_eq!(entry.title, "A & B <i> by O'Brien");
    }

    #[test]
    fn lists_every_available_branch_in_order() {
        let catalog = FakeCatalog::with(
            "1",
            &[("North", "Available"), ("East", "Lost"), ("Main", "Available")],
        );
        let (clock, links) = (clock(), links());
        let builder = FeedItemBuilder::new(&catalog, &clock, &links);

        let entry = builder.build(&book("1", "T", "A")).unwrap().unwrap();

        assert!(entry.content.contains("<ul><li>North</li>\n<li>Main</li></ul>"));
    }

    #[test]
    fn not_in_catalog_yields_nothing() {
        let catalog = FakeCatalog::with("other", &[("Main", "Available")]);
        let (clock, links) = (clock(), links());
        let builder = FeedItemBuilder::new(&catalog, &clock, &links);

        assert_eq!(builder.build(&book("0316212377", "X", "Y Z")).unwrap(), None);
    }

    #[test]
    fn nothing_available_yields_nothing() {
        let catalog = FakeCatalog::with("0316212377", &[("Main", "Checked out"), ("East", "In transit")]);
        let (clock, links) = (clock(), links());
        let builder = FeedItemBuilder::new(&catalog, &clock, &links);

        assert_eq!(builder.build(&book("0316212377", "X", "Y Z")).unwrap(), None);
    }

    #[test]
    fn id_changes_between_generations() {
        let catalog = FakeCatalog::with("1", &[("Main", "Available")]);
        let links = links();
        let earlier = FixedClock(Utc.timestamp_opt(1_760_870_400, 0).unwrap());
        let later = FixedClock(Utc.timestamp_opt(1_760_870_401, 500_000_000).unwrap());
        let book = book("1", "T", "A");

        let first = FeedItemBuilder::new(&catalog, &earlier, &links)
            .build(&book)
            .unwrap()
            .unwrap();
        let second = FeedItemBuilder::new(&catalog, &later, &links)
            .build(&book)
            .unwrap()
            .unwrap();

        assert_eq!(first.link, second.link);
        assert_ne!(first.id, second.id);
        assert_eq!(first.id, format!("{CATALOG_URL}?1760870400.000000"));
        assert_eq!(second.id, format!("{CATALOG_URL}?1760870401.500000"));
    }

    #[test]
    fn entry_becomes_rss_item() {
        let entry = FeedEntry {
            title: "X by Y Z".into(),
            description: "X by Y Z".into(),
            id: "https://lib.example/opac-detail.pl?1.000000".into(),
            link: EntryLink {
                href: "https://lib.example/opac-detail.pl".into(),
                rel: "alternate".into(),
            },
            content: "<p>hi</p>".into(),
        };

        let item: rss::Item = entry.into();

        assert_eq!(item.title(), Some("X by Y Z"));
        assert_eq!(item.description(), Some("X by Y Z"));
        assert_eq!(item.link(), Some("https://lib.example/opac-detail.pl"));
        assert_eq!(item.content(), Some("<p>hi</p>"));
        let guid = item.guid().unwrap();
        assert_eq!(guid.value(), "https://lib.example/opac-detail.pl?1.000000");
        assert!(!guid.is_permalink());
    }
}
