//! Small HTML helpers shared by the scraper and the entry renderer.

use scraper::Selector;

/// Compile a CSS selector literal.
///
/// Only ever called with string literals, so a parse failure is a bug in
/// this crate rather than bad input.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err:?}"))
}

/// Escape text for use inside an HTML element or attribute value.
pub(crate) fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
