//! GTM detection strategies
//!
//! Each detector inspects the page's scripts in document order and reports
//! the first script that matches its signature. The analyzer runs detectors
//! in priority order and keeps the first hit; signals from different scripts
//! or detectors are never merged.

use crate::analysis::scripts::ScriptTag;
use crate::url::{ends_with_domain, normalize_script_src};
use regex::Regex;
use std::sync::LazyLock;

/// Container id as it appears in inline snippets
static CONTAINER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GTM-[A-Z0-9]+").expect("static pattern is valid"));

/// Query marker of an explicit container load
const CONTAINER_SRC_MARKER: &str = "?id=GTM-";

/// Query marker of a Google Ads conversion tag
const CONVERSION_MARKER: &str = "?aw=";

/// Substring identifying Google-owned hosts
const GOOGLE_MARKER: &str = "google";

/// The page being analyzed
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Hostname of the page URL
    pub hostname: String,

    /// Registrable domain of `hostname`
    pub main_domain: String,

    domain_mention: Option<Regex>,
}

impl SiteContext {
    pub fn new(hostname: impl Into<String>, main_domain: impl Into<String>) -> Self {
        let hostname = hostname.into();
        let main_domain = main_domain.into();

        let domain_mention = if main_domain.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)(?-u:\b){}", regex::escape(&main_domain));
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Cannot build mention pattern for {}: {}", main_domain, e);
                    None
                }
            }
        };

        Self {
            hostname,
            main_domain,
            domain_mention,
        }
    }

    /// True if `text` mentions the main domain starting at a word boundary,
    /// ignoring case
    pub fn mentions_main_domain(&self, text: &str) -> bool {
        self.domain_mention
            .as_ref()
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    }

    /// Detection attributed to the page's own hostname, or an unproxified
    /// detection with no domain
    fn first_party_if(&self, proxified: bool) -> Detection {
        if proxified {
            Detection {
                gtm_domain: self.hostname.clone(),
                is_proxified: true,
            }
        } else {
            Detection::default()
        }
    }
}

/// What a detector found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Host the container is attributed to; empty when unknown
    pub gtm_domain: String,

    /// Whether the container appears to be served first-party
    pub is_proxified: bool,
}

/// A GTM detection strategy
pub trait Detector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Scans `scripts` in order and returns the first match, if any
    fn detect(&self, scripts: &[ScriptTag], site: &SiteContext) -> Option<Detection>;
}

/// Explicit container tags
///
/// For each script in order:
/// - a `src` containing `?id=GTM-` matches; the container host is the `src`
///   host, proxified when it is not a Google host and ends with the main
///   domain. A `src` that cannot be parsed is skipped.
/// - otherwise inline text containing a container id matches; it is
///   proxified (attributed to the page hostname) when the text mentions the
///   main domain.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerTagDetector;

impl ContainerTagDetector {
    fn detect_src(src: &str, site: &SiteContext) -> Option<Detection> {
        let url = normalize_script_src(src)?;
        let host = url.host_str()?.to_lowercase();

        let is_proxified =
            !host.contains(GOOGLE_MARKER) && ends_with_domain(&host, &site.main_domain);

        Some(Detection {
            gtm_domain: host,
            is_proxified,
        })
    }
}

impl Detector for ContainerTagDetector {
    fn name(&self) -> &'static str {
        "container-tag"
    }

    fn detect(&self, scripts: &[ScriptTag], site: &SiteContext) -> Option<Detection> {
        for (index, script) in scripts.iter().enumerate() {
            let src = script.src_or_empty();

            if src.contains(CONTAINER_SRC_MARKER) {
                match Self::detect_src(src, site) {
                    Some(detection) => return Some(detection),
                    None => {
                        tracing::debug!("Script #{} has an unusable container src: {}", index, src);
                        continue;
                    }
                }
            }

            if CONTAINER_ID.is_match(&script.inline) {
                return Some(site.first_party_if(site.mentions_main_domain(&script.inline)));
            }
        }

        None
    }
}

/// Conversion tag fallback
///
/// Matches the first script whose `src` plus inline text contains `?aw=`;
/// proxified when that text contains the main domain anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionTagDetector;

impl Detector for ConversionTagDetector {
    fn name(&self) -> &'static str {
        "conversion-tag"
    }

    fn detect(&self, scripts: &[ScriptTag], site: &SiteContext) -> Option<Detection> {
        scripts.iter().find_map(|script| {
            let content = script.combined();
            if !content.contains(CONVERSION_MARKER) {
                return None;
            }

            let proxified = !site.main_domain.is_empty() && content.contains(&site.main_domain);
            Some(site.first_party_if(proxified))
        })
    }
}

/// Detectors in priority order
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![Box::new(ContainerTagDetector), Box::new(ConversionTagDetector)]
}
