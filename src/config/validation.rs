use crate::config::types::{Config, ExtractionConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(page_url) = &config.page.url {
        validate_page_url(page_url)?;
    }
    validate_extraction_config(&config.extraction)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates a target page URL
///
/// The page must be an absolute http(s) URL; anything looser cannot yield the
/// directory prefix relative track links are resolved against.
pub fn validate_page_url(page_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(page_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid page URL '{}': {}", page_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Page URL '{}' must use the http or https scheme",
            page_url
        )));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.title_class.is_empty() {
        return Err(ConfigError::Validation(
            "title-class cannot be empty".to_string(),
        ));
    }

    if config.title_class.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "title-class must be a single class name, got '{}'",
            config.title_class
        )));
    }

    if config.link_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "link-suffix cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let extension = &config.file_extension;

    if extension.is_empty() {
        return Err(ConfigError::Validation(
            "file-extension cannot be empty".to_string(),
        ));
    }

    if extension.contains(['.', '/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "file-extension must not contain '.' or path separators, got '{}'",
            extension
        )));
    }

    Ok(())
}
