//! GTM analysis module
//!
//! This module turns a fetched page into an `AnalysisResult`:
//! - Script extraction from the HTML, in document order
//! - An ordered list of `Detector` strategies, first hit wins
//! - Main domain resolution for the "proxified" decision

mod detectors;
mod scripts;

pub use detectors::{
    default_detectors, ContainerTagDetector, ConversionTagDetector, Detection, Detector,
    SiteContext,
};
pub use scripts::{extract_scripts, ScriptTag};

use crate::url::{extract_hostname, main_domain};
use crate::AnalysisError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Outcome of analyzing one page
///
/// `gtm_domain` and `is_proxified` only carry meaning when `is_gtm_found`
/// is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,

    #[serde(rename = "gtmDomain")]
    pub gtm_domain: String,

    #[serde(rename = "isProxified")]
    pub is_proxified: bool,

    #[serde(rename = "isGTMFound")]
    pub is_gtm_found: bool,
}

impl AnalysisResult {
    /// Result for a page without any GTM signature
    pub fn not_found(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            gtm_domain: String::new(),
            is_proxified: false,
            is_gtm_found: false,
        }
    }

    fn found(url: impl Into<String>, detection: Detection) -> Self {
        Self {
            url: url.into(),
            gtm_domain: detection.gtm_domain,
            is_proxified: detection.is_proxified,
            is_gtm_found: true,
        }
    }
}

/// Runs the GTM detection heuristic over fetched pages
///
/// The analyzer holds no per-page state, so one instance can be shared by
/// every job.
pub struct Analyzer {
    detectors: Vec<Box<dyn Detector>>,
}

impl Analyzer {
    /// Creates an analyzer with the default detectors
    pub fn new() -> Self {
        Self::with_detectors(default_detectors())
    }

    /// Creates an analyzer running `detectors` in the given priority order
    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Names of the configured detectors, in priority order
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Analyzes `html` fetched from `url`
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `url` - The URL the page was requested from
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisResult)` - Detection outcome (possibly "not found")
    /// * `Err(AnalysisError)` - `url` has no usable hostname
    ///
    /// # Example
    ///
    /// ```
    /// use gtm_probe::analysis::Analyzer;
    ///
    /// let html = r#"<script src="//gtm.example.com/gtm.js?id=GTM-ABC123"></script>"#;
    /// let result = Analyzer::new().analyze(html, "https://www.example.com/").unwrap();
    /// assert!(result.is_gtm_found);
    /// assert!(result.is_proxified);
    /// assert_eq!(result.gtm_domain, "gtm.example.com");
    /// ```
    pub fn analyze(&self, html: &str, url: &str) -> Result<AnalysisResult, AnalysisError> {
        let parsed = Url::parse(url).map_err(|source| AnalysisError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let hostname =
            extract_hostname(&parsed).ok_or_else(|| AnalysisError::MissingHost(url.to_string()))?;

        let resolved = main_domain(&hostname);
        let main_domain = if resolved.is_empty() {
            hostname.clone()
        } else {
            resolved
        };

        let site = SiteContext::new(hostname, main_domain);
        let scripts = extract_scripts(html);

        tracing::debug!(
            url,
            scripts = scripts.len(),
            main_domain = %site.main_domain,
            "Analyzing page"
        );

        for detector in &self.detectors {
            if let Some(detection) = detector.detect(&scripts, &site) {
                tracing::debug!(
                    url,
                    detector = detector.name(),
                    gtm_domain = %detection.gtm_domain,
                    proxified = detection.is_proxified,
                    "GTM signature found"
                );
                return Ok(AnalysisResult::found(url, detection));
            }
        }

        Ok(AnalysisResult::not_found(url))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
