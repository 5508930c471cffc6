/// Checks whether a URL ends in `.{extension}`, ignoring case
///
/// The extension token is expected without the leading dot. The test runs
/// against the full URL string, so a query string after the file name
/// prevents a match.
///
/// # Examples
///
/// ```
/// use regdoc::url::matches_extension;
///
/// assert!(matches_extension("https://example.gov/docs/Res-1.PDF", "pdf"));
/// assert!(!matches_extension("https://example.gov/docs/Res-1.pdf?v=2", "pdf"));
/// assert!(!matches_extension("https://example.gov/docs/shapdf", "pdf"));
/// ```
pub fn matches_extension(url: &str, extension: &str) -> bool {
    if extension.is_empty() || url.len() <= extension.len() {
        return false;
    }

    let split = url.len() - extension.len() - 1;
    match (url.get(split..split + 1), url.get(split + 1..)) {
        (Some("."), Some(tail)) => tail.eq_ignore_ascii_case(extension),
        _ => false,
    }
}

/// Returns the first extension in `extensions` that the URL ends with
///
/// Order matters: the caller's order decides which type a link gets when
/// several extensions would match.
pub fn classify_extension<'a>(url: &str, extensions: &'a [String]) -> Option<&'a str> {
    extensions
        .iter()
        .find(|ext| matches_extension(url, ext))
        .map(String::as_str)
}

/// Exact, case-sensitive string prefix test
pub fn within_prefix(url: &str, prefix: &str) -> bool {
    url.starts_with(prefix)
}
