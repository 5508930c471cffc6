//! URL handling module for regdoc
//!
//! This module provides seed URL validation, extension-based link
//! classification, base-prefix filtering, and derivation of safe file names
//! for downloaded documents.

mod filename;
mod matcher;
mod normalize;

// Re-export main functions
pub use filename::{file_name_from_url, sanitize_file_name};
pub use matcher::{classify_extension, matches_extension, within_prefix};
pub use normalize::{default_base_prefix, normalize_extensions, parse_seed_url};

/// Decides whether a resolved absolute URL is a link of interest, and of what type
///
/// A URL is accepted when it starts with the base prefix and ends in one of
/// the extensions; the type is the first matching extension.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    extensions: Vec<String>,
    base_prefix: String,
}

impl LinkFilter {
    /// Creates a filter from normalized extension tokens and a base prefix
    pub fn new(extensions: Vec<String>, base_prefix: impl Into<String>) -> Self {
        Self {
            extensions,
            base_prefix: base_prefix.into(),
        }
    }

    /// Returns the link type for an absolute URL, or None when it is not of interest
    ///
    /// # Examples
    ///
    /// ```
    /// use regdoc::url::LinkFilter;
    ///
    /// let filter = LinkFilter::new(
    ///     vec!["pdf".to_string(), "aspx".to_string()],
    ///     "https://example.gov/Normativa/",
    /// );
    /// assert_eq!(filter.classify("https://example.gov/Normativa/r1.PDF"), Some("pdf"));
    /// assert_eq!(filter.classify("https://other.gov/Normativa/r1.pdf"), None);
    /// assert_eq!(filter.classify("https://example.gov/Normativa/r1.doc"), None);
    /// ```
    pub fn classify(&self, url: &str) -> Option<&str> {
        if !within_prefix(url, &self.base_prefix) {
            return None;
        }
        classify_extension(url, &self.extensions)
    }

    /// True when the URL lies under the base prefix
    pub fn in_scope(&self, url: &str) -> bool {
        within_prefix(url, &self.base_prefix)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn base_prefix(&self) -> &str {
        &self.base_prefix
    }
}
