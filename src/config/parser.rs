use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gtm_probe::config::load_config;
///
/// let config = load_config(Path::new("gtm-probe.toml")).unwrap();
/// println!("Fetch timeout: {}s", config.fetcher.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so operators can tell which configuration a running
/// process was started with.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies the `PORT` override to `config`
///
/// `port` is the raw variable value, if set. An unparsable value is a
/// validation error rather than being silently ignored.
pub fn apply_port_override(config: &mut Config, port: Option<&str>) -> Result<(), ConfigError> {
    if let Some(raw) = port {
        let parsed = raw.trim().parse::<u16>().map_err(|e| {
            ConfigError::Validation(format!(
                "{} must be a port number, got '{}': {}",
                PORT_ENV, raw, e
            ))
        })?;
        config.server.port = parsed;
    }
    Ok(())
}
