use crate::config::types::{Config, CrawlerConfig, ServerConfig, TargetConfig};
use crate::url::UrlFilter;
use crate::ConfigError;
use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_crawler_config(&config.crawler)?;
    validate_targets(&config.targets)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_addr.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "bind-addr must be a socket address, got '{}': {}",
            config.bind_addr, e
        ))
    })?;

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run-timeout-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 64, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates target overrides
fn validate_targets(targets: &[TargetConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in targets {
        if !entry.kind.is_known() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an unknown kind",
                entry.target.source_name
            )));
        }

        if !seen.insert(entry.kind) {
            return Err(ConfigError::Validation(format!(
                "target kind '{}' is configured more than once",
                entry.kind
            )));
        }

        let target = &entry.target;
        if target.source_name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' must have a source-name",
                entry.kind
            )));
        }

        validate_http_url("base-url", &target.base_url)?;
        validate_http_url("product-base-url", &target.product_base_url)?;
        UrlFilter::new(&target.allow)?;

        if !target.product_path_prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "product-path-prefix must start with '/', got '{}'",
                target.product_path_prefix
            )));
        }
    }

    Ok(())
}

/// Validates that a URL parses and uses http or https
fn validate_http_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, raw
        )));
    }

    Ok(())
}
