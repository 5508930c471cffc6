/// Derives a filesystem-safe file name for a downloaded document
///
/// The last path segment of the URL is used (query and fragment removed,
/// percent-escapes decoded), the `.{extension}` suffix is forced, and the
/// result is sanitized. When nothing usable remains the synthetic name
/// `archivo_{position}.{extension}` is returned.
///
/// # Examples
///
/// ```
/// use regdoc::url::file_name_from_url;
///
/// assert_eq!(
///     file_name_from_url("https://example.gov/docs/Resoluci%C3%B3n%20123.pdf?v=1", "pdf", 1),
///     "Resolucion_123.pdf"
/// );
/// assert_eq!(file_name_from_url("https://example.gov/docs/", "pdf", 7), "archivo_7.pdf");
/// ```
pub fn file_name_from_url(url: &str, extension: &str, position: usize) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or("");
    let last_segment = without_query.rsplit('/').next().unwrap_or("");

    let decoded = urlencoding::decode(last_segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| last_segment.to_string());

    let suffix = format!(".{}", extension);
    let mut name = decoded;
    if !name.to_lowercase().ends_with(&suffix) {
        name.push_str(&suffix);
    }

    let sanitized = sanitize_file_name(&name);
    if sanitized.is_empty() || sanitized == extension || sanitized == suffix {
        format!("archivo_{}{}", position, suffix)
    } else {
        sanitized
    }
}

/// Reduces a file name to ASCII letters, digits, '_', '.' and '-'
///
/// Path separators and whitespace runs become a single '_', accented Latin
/// letters are folded to their base letter, everything else is dropped, and
/// leading/trailing '.' and '_' are trimmed.
pub fn sanitize_file_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .map(fold_latin)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = folded.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

fn fold_latin(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}
