//! HTML link extraction
//!
//! This module defines the [`LinkExtractor`] contract and an HTML
//! implementation that collects the `href` attribute of every element that
//! has one: anchors, `<link>` (canonical, stylesheet, ...), `<area>` and so on.
//!
//! Only absolute `http://` and `https://` links are kept. Relative links are
//! dropped rather than resolved, as are `javascript:`, `mailto:`, `tel:`,
//! `data:` and fragment-only hrefs.

use scraper::{Html, Selector};
use url::Url;

/// Extracts outbound links from page content
///
/// Implementations are pure: no side effects, and an empty result when
/// nothing matches.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Vec<String>;
}

/// Link extractor backed by an HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, content: &str) -> Vec<String> {
        extract_links(content)
    }
}

/// Extracts all absolute http(s) links from an HTML document
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::extract_links;
///
/// let html = r#"<a href="https://a.com">A</a><a href="/about">About</a>"#;
/// assert_eq!(extract_links(html), vec!["https://a.com".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(href_selector) = Selector::parse("[href]") {
        for element in document.select(&href_selector) {
            if let Some(link) = element.value().attr("href").and_then(absolute_http_link) {
                links.push(link);
            }
        }
    }

    links
}

/// Returns the href unchanged if it is an absolute http(s) URL
fn absolute_http_link(href: &str) -> Option<String> {
    let href = href.trim();

    // Url::parse rejects relative references outright
    let parsed = Url::parse(href).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return None;
    }

    Some(href.to_string())
}
