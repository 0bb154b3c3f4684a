//! Runtime configuration.
//!
//! Everything that identifies the user, the wishlist provider and the
//! library catalog is read from the environment (a `.env` file is loaded
//! first by `main`).  Tests build a [`Config`] through
//! [`Config::from_lookup`] with a closure instead of touching the process
//! environment.

use thiserror::Error;

pub const DEFAULT_WISHLIST_API_URL: &str = "https://www.librarything.com/api_getdata.php";
pub const DEFAULT_WISHLIST_COLLECTION: &str = "4";
pub const DEFAULT_WISHLIST_MAX: u32 = 250;
pub const DEFAULT_WISHLIST_ENTRY_URL: &str = "http://www.librarything.com/isbn/";
pub const DEFAULT_CATALOG_SEARCH_URL: &str = "https://www.linkcat.info/cgi-bin/koha/opac-search.pl";
pub const DEFAULT_DETAIL_MARKER: &str = "opac-detail";
pub const DEFAULT_CATALOG_LABEL: &str = "MPL";
pub const DEFAULT_SELF_LINK: &str = "http://foo.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Where and how to fetch the wishlist.
#[derive(Debug, Clone)]
pub struct WishlistConfig {
    pub api_url: String,
    pub user_id: String,
    pub key: String,
    /// Only books in this collection are kept.
    pub collection_id: String,
    pub max: u32,
    /// Prefix joined with an ISBN to link back to the wishlist entry.
    pub entry_url: String,
}

/// Where and how to look books up in the library catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub search_url: String,
    /// Substring that identifies a detail-page URL.
    pub detail_marker: String,
    /// Short library name shown in entry content ("MPL link").
    pub label: String,
}

/// Fixed top-level metadata of the generated feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    pub id: String,
    pub title: String,
    pub author_name: String,
    pub author_uri: String,
    pub self_link: String,
    pub description: String,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        Self {
            id: "something that can act as an ID, I guess".into(),
            title: "Wishlist books available from my public library".into(),
            author_name: "wishlist-to-library".into(),
            author_uri: "https://github.com/dandrake/wishlist_to_library".into(),
            self_link: DEFAULT_SELF_LINK.into(),
            description: "My wishlist items (from LibraryThing) currently available from my public library system".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub wishlist: WishlistConfig,
    pub catalog: CatalogConfig,
    pub feed: FeedMetadata,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let max = match get("WISHLIST_MAX") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                var: "WISHLIST_MAX",
                value: raw,
            })?,
            None => DEFAULT_WISHLIST_MAX,
        };

        let wishlist = WishlistConfig {
            api_url: or_default("WISHLIST_API_URL", DEFAULT_WISHLIST_API_URL),
            user_id: required("WISHLIST_USER_ID")?,
            key: required("WISHLIST_KEY")?,
            collection_id: or_default("WISHLIST_COLLECTION", DEFAULT_WISHLIST_COLLECTION),
            max,
            entry_url: or_default("WISHLIST_ENTRY_URL", DEFAULT_WISHLIST_ENTRY_URL),
        };

        let catalog = CatalogConfig {
            search_url: or_default("CATALOG_SEARCH_URL", DEFAULT_CATALOG_SEARCH_URL),
            detail_marker: or_default("CATALOG_DETAIL_MARKER", DEFAULT_DETAIL_MARKER),
            label: or_default("CATALOG_LABEL", DEFAULT_CATALOG_LABEL),
        };

        let feed = FeedMetadata {
            self_link: or_default("FEED_SELF_LINK", DEFAULT_SELF_LINK),
            ..FeedMetadata::default()
        };

        Ok(Self {
            wishlist,
            catalog,
            feed,
        })
    }
}
