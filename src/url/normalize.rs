use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a seed URL and checks that it is an absolute http(s) URL
///
/// # Examples
///
/// ```
/// use regdoc::url::parse_seed_url;
///
/// let url = parse_seed_url("https://example.gov/Normativa/").unwrap();
/// assert_eq!(url.host_str(), Some("example.gov"));
/// assert!(parse_seed_url("/Normativa/").is_err());
/// ```
pub fn parse_seed_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Base prefix derived from a seed: everything up to and including the last '/'
///
/// `https://example.gov/Normativa/Paginas/index.aspx` becomes
/// `https://example.gov/Normativa/Paginas/`.
pub fn default_base_prefix(seed: &Url) -> String {
    let mut without_query = seed.clone();
    without_query.set_query(None);
    without_query.set_fragment(None);

    let s = without_query.as_str();
    match s.rfind('/') {
        Some(idx) => s[..=idx].to_string(),
        None => s.to_string(),
    }
}

/// Normalizes extension tokens: trimmed, lowercased, leading dot removed
///
/// Duplicates are dropped while keeping the first occurrence, so the order
/// used for classification is preserved.
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> UrlResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());

    for raw in extensions {
        let token = raw.as_ref().trim().trim_start_matches('.').to_lowercase();

        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UrlError::InvalidExtension(raw.as_ref().to_string()));
        }

        if !normalized.contains(&token) {
            normalized.push(token);
        }
    }

    Ok(normalized)
}
