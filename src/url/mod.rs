//! URL handling module for GTM-Probe
//!
//! This module provides hostname extraction, public-suffix aware main domain
//! resolution, and the URL normalization the analyzer and gateway rely on.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_hostname, main_domain};
pub use normalize::{normalize_script_src, parse_target_url};

/// Returns true if `host` is `main_domain` itself or a subdomain of it
///
/// This is a plain suffix test on the strings, so `notexample.com` also
/// counts as ending with `example.com`.
pub fn ends_with_domain(host: &str, main_domain: &str) -> bool {
    !main_domain.is_empty() && host.ends_with(main_domain)
}
