use serde::Deserialize;

/// Main configuration structure for GTM-Probe
///
/// Every section is optional; missing values take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub fetcher: FetcherConfig,
    pub jobs: JobsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to listen on
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// TCP port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Hard limit for a whole request, body included (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    pub accept: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 7,
            user_agent: "Mozilla/5.0 (compatible; gtm-probe)".to_string(),
            accept: "text/html".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Job retention configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// How long finished jobs stay readable (seconds)
    #[serde(rename = "retention-secs")]
    pub retention_secs: u64,

    /// How often expired jobs are swept (seconds)
    #[serde(rename = "sweep-interval-secs")]
    pub sweep_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}
