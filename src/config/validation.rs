use crate::config::types::{
    Config, CrawlerConfig, DownloadConfig, IngestConfig, SearchConfig, StorageConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_download_config(&config.download)?;
    validate_ingest_config(&config.ingest)?;
    validate_search_config(&config.search)?;

    if config.user_agent.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("seed-url", &config.seed_url)?;

    if let Some(prefix) = &config.base_prefix {
        validate_http_url("base-prefix", prefix)?;
    }

    validate_extensions("listing-extensions", &config.listing_extensions)?;
    validate_extensions("document-extensions", &config.document_extensions)?;

    for ext in &config.listing_extensions {
        if config
            .document_extensions
            .iter()
            .any(|doc| doc.eq_ignore_ascii_case(ext))
        {
            return Err(ConfigError::Validation(format!(
                "extension '{}' cannot be both a listing and a document extension",
                ext
            )));
        }
    }

    Selector::parse(&config.container_selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("'{}': {:?}", config.container_selector, e))
    })?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.link_store_path.is_empty() {
        return Err(ConfigError::Validation(
            "link-store-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.destination_dir.is_empty() {
        return Err(ConfigError::Validation(
            "destination-dir cannot be empty".to_string(),
        ));
    }

    validate_extension_token("document-type", &config.document_type)?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "download timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    if config.min_text_length > config.ocr_threshold {
        return Err(ConfigError::Validation(format!(
            "min-text-length ({}) cannot exceed ocr-threshold ({})",
            config.min_text_length, config.ocr_threshold
        )));
    }

    if config.ocr_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ocr-language cannot be empty".to_string(),
        ));
    }

    validate_extensions("archive-extensions", &config.archive_extensions)
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_http_url("search url", &config.url)?;

    if config.index.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search index cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "search timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.bulk_chunk_size < 1 || config.bulk_chunk_size > 10_000 {
        return Err(ConfigError::Validation(format!(
            "bulk-chunk-size must be between 1 and 10000, got {}",
            config.bulk_chunk_size
        )));
    }

    if config.username.is_some() != config.password.is_some() {
        return Err(ConfigError::Validation(
            "search username and password must be given together".to_string(),
        ));
    }

    Ok(())
}

/// Validates an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

fn validate_extensions(field: &str, extensions: &[String]) -> Result<(), ConfigError> {
    if extensions.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} must contain at least one extension",
            field
        )));
    }

    for ext in extensions {
        validate_extension_token(field, ext)?;
    }

    Ok(())
}

/// Extension tokens are written without the leading dot
fn validate_extension_token(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() || ext.starts_with('.') || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "{}: invalid extension '{}' (expected e.g. \"pdf\")",
            field, ext
        )));
    }
    Ok(())
}
