use crate::config::types::{Config, FetcherConfig, JobsConfig, ServerConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use std::net::IpAddr;

/// Upper bound for the fetch timeout (seconds)
const MAX_TIMEOUT_SECS: u64 = 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_jobs_config(&config.jobs)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .bind_address
        .parse::<IpAddr>()
        .map_err(|e| ConfigError::InvalidAddress(format!("{}: {}", config.bind_address, e)))?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    validate_header("user_agent", &config.user_agent)?;
    validate_header("accept", &config.accept)?;
    validate_header("accept_language", &config.accept_language)?;

    Ok(())
}

/// Validates job retention configuration
fn validate_jobs_config(config: &JobsConfig) -> Result<(), ConfigError> {
    if config.retention_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "retention_secs must be >= 1, got {}",
            config.retention_secs
        )));
    }

    if config.sweep_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "sweep_interval_secs must be >= 1, got {}",
            config.sweep_interval_secs
        )));
    }

    Ok(())
}

/// A header value must be non-empty and encodable in an HTTP header
fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!(
            "{} contains characters not allowed in an HTTP header: {:?}",
            name, value
        ))
    })?;

    Ok(())
}
