//! HTML parser for extracting typed links from listing pages
//!
//! Only anchors inside the configured container element are considered, so
//! navigation bars and footers never feed the crawl.

use crate::storage::Link;
use crate::url::LinkFilter;
use crate::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Extracts links of interest from listing pages
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    container: Selector,
    anchor: Selector,
    filter: LinkFilter,
}

impl LinkExtractor {
    /// Creates an extractor for the given container selector and filter
    pub fn new(container_selector: &str, filter: LinkFilter) -> Result<Self, ConfigError> {
        let container = Selector::parse(container_selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("'{}': {:?}", container_selector, e))
        })?;
        let anchor = Selector::parse("a[href]")
            .map_err(|e| ConfigError::InvalidSelector(format!("'a[href]': {:?}", e)))?;

        Ok(Self {
            container,
            anchor,
            filter,
        })
    }

    pub fn filter(&self) -> &LinkFilter {
        &self.filter
    }

    /// Extracts the typed links of a page, in document order
    ///
    /// Each `href` inside the first element matching the container selector
    /// is resolved against `page_url`, then kept only if it lies under the
    /// base prefix and ends in one of the requested extensions. A page
    /// without the container yields nothing. Duplicates are not removed here.
    ///
    /// # Example
    ///
    /// ```
    /// use regdoc::crawler::LinkExtractor;
    /// use regdoc::url::LinkFilter;
    /// use url::Url;
    ///
    /// let filter = LinkFilter::new(vec!["pdf".to_string()], "https://example.gov/Normativa/");
    /// let extractor = LinkExtractor::new("div.containerblanco", filter).unwrap();
    /// let html = r#"<div class="containerblanco"><a href="r1.pdf">R1</a></div>"#;
    /// let page = Url::parse("https://example.gov/Normativa/").unwrap();
    ///
    /// let links = extractor.extract(html, &page);
    /// assert_eq!(links[0].url, "https://example.gov/Normativa/r1.pdf");
    /// assert_eq!(links[0].link_type, "pdf");
    /// ```
    pub fn extract(&self, html: &str, page_url: &Url) -> Vec<Link> {
        let document = Html::parse_document(html);

        let Some(container) = document.select(&self.container).next() else {
            tracing::debug!("No container element on {}", page_url);
            return Vec::new();
        };

        let mut links = Vec::new();
        for element in container.select(&self.anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(absolute) = resolve_link(href, page_url) else {
                continue;
            };

            match self.filter.classify(&absolute) {
                Some(link_type) => {
                    tracing::debug!("Found link {} [{}]", absolute, link_type);
                    let link_type = link_type.to_string();
                    links.push(Link::new(absolute, link_type));
                }
                None => tracing::trace!("Ignoring link {}", absolute),
            }
        }

        links
    }
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
