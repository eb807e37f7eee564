//! Configuration module for GTM-Probe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gtm_probe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gtm-probe.toml")).unwrap();
//! println!("Listening on port {}", config.server.port);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, JobsConfig, ServerConfig};

// Re-export parser functions
pub use parser::{
    apply_port_override, compute_config_hash, load_config, load_config_with_hash, parse_config,
    PORT_ENV,
};
