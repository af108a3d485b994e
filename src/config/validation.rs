use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, DiscoveryConfig, ExtractionConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_discovery_config(&config.discovery)?;
    validate_extraction_config(&config.extraction)?;

    if config.output.knowledge_dir.is_empty() {
        return Err(ConfigError::Validation(
            "knowledge-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl budgets and pacing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the rendering service endpoint and retry policy
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::Validation(format!("Invalid browser endpoint '{}': {}", config.endpoint, e))
    })?;

    if url.scheme() != "ws" && url.scheme() != "wss" {
        return Err(ConfigError::Validation(format!(
            "Browser endpoint must use ws:// or wss://, got '{}'",
            config.endpoint
        )));
    }

    if config.connect_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-retries must be >= 1, got {}",
            config.connect_retries
        )));
    }

    if config.viewport_width < 1 || config.viewport_height < 1 {
        return Err(ConfigError::Validation(
            "viewport dimensions must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the discovery service endpoint and per-query limits
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    validate_http_endpoint("discovery", &config.endpoint)?;

    if config.results_per_query < 1 || config.results_per_query > 100 {
        return Err(ConfigError::Validation(format!(
            "results-per-query must be between 1 and 100, got {}",
            config.results_per_query
        )));
    }

    if config.language.is_empty() {
        return Err(ConfigError::Validation(
            "discovery language cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the extraction service endpoint and model settings
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    validate_http_endpoint("extraction", &config.endpoint)?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation(
            "extraction model cannot be empty".to_string(),
        ));
    }

    if config.max_output_tokens < 256 {
        return Err(ConfigError::Validation(format!(
            "max-output-tokens must be >= 256, got {}",
            config.max_output_tokens
        )));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    Ok(())
}

fn validate_http_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| {
        ConfigError::Validation(format!("Invalid {} endpoint '{}': {}", name, endpoint, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} endpoint must use http:// or https://, got '{}'",
            name, endpoint
        )));
    }

    Ok(())
}
