//! ISBN lookup against the library catalog.
//!
//! A Koha OPAC search for an ISBN either redirects straight to the book's
//! detail page (single hit) or returns a results listing.  For a listing the
//! first link pointing at a detail page wins; there is no relevance ranking
//! and the resolved page is not checked against the ISBN, so a search that
//! lists the wrong edition first attaches that edition's holdings.

use reqwest::blocking::{Client, Response};
use scraper::Html;
use thiserror::Error;
use url::Url;

use crate::availability::{AvailabilityRow, HoldingsTable, LayoutError};
use crate::config::CatalogConfig;
use crate::html::selector;

/// A resolved detail page.
#[derive(Debug)]
pub struct CatalogMatch<P> {
    pub url: String,
    pub page: P,
}

impl<P: HoldingsTable> CatalogMatch<P> {
    /// Holdings rows of the matched page, with the page URL attached to any
    /// layout error.
    pub fn holdings(&self) -> Result<Vec<AvailabilityRow>, LookupError> {
        self.page.holdings().map_err(|source| LookupError::Layout {
            url: self.url.clone(),
            source,
        })
    }
}

/// Why a single book could not be looked up.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("catalog request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected detail page layout at {url}: {source}")]
    Layout {
        url: String,
        #[source]
        source: LayoutError,
    },
}

/// Maps an ISBN to its catalog detail page.
pub trait CatalogResolver {
    type Page: HoldingsTable;

    /// `Ok(None)` means the catalog has no detail page for this ISBN.
    fn resolve(&self, isbn: &str) -> Result<Option<CatalogMatch<Self::Page>>, LookupError>;
}

/// First `<a href>` in document order whose target contains `marker`,
/// resolved against `base`.
pub fn first_detail_link(doc: &Html, base: &Url, marker: &str) -> Option<Url> {
    doc.select(&selector("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(marker))
        .and_then(|href| base.join(href).ok())
}

/// A Koha OPAC catalog reached over HTTP.
pub struct KohaCatalog {
    client: Client,
    config: CatalogConfig,
}

impl KohaCatalog {
    /// Create a catalog client.
    ///
    /// `config.search_url` is the OPAC search endpoint (e.g.
    /// `https://www.linkcat.info/cgi-bin/koha/opac-search.pl`); the ISBN is
    /// sent as `?idx=isbn&q=<isbn>`.
    pub fn new(client: Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<(Url, String), LookupError> {
        let network = |source| LookupError::Network {
            url: url.to_string(),
            source,
        };

        let response: Response = self
            .client
            .get(url)
            .query(query)
            .send()
            .and_then(Response::error_for_status)
            .map_err(network)?;
        // Final URL after redirects.
        let final_url = response.url().clone();
        let body = response.text().map_err(network)?;
        Ok((final_url, body))
    }
}

impl CatalogResolver for KohaCatalog {
    type Page = Html;

    fn resolve(&self, isbn: &str) -> Result<Option<CatalogMatch<Html>>, LookupError> {
        let marker = self.config.detail_marker.as_str();
        let (url, body) = self.get(&self.config.search_url, &[("idx", "isbn"), ("q", isbn)])?;
        let doc = Html::parse_document(&body);

        if url.as_str().contains(marker) {
            tracing::debug!(isbn, %url, "direct hit");
            return Ok(Some(CatalogMatch {
                url: url.into(),
                page: doc,
            }));
        }

        let Some(detail) = first_detail_link(&doc, &url, marker) else {
            tracing::debug!(isbn, "not in catalog");
            return Ok(None);
        };

        tracing::debug!(isbn, url = %detail, "following first search result");
        let (url, body) = self.get(detail.as_str(), &[])?;
        Ok(Some(CatalogMatch {
            url: url.into(),
            page: Html::parse_document(&body),
        }))
    }
}
