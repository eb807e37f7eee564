use std::sync::OnceLock;
use tldextract::{TldExtractor, TldOption};
use url::{Host, Url};

/// Extracts the hostname from a URL
///
/// The `url` crate already lowercases registered domain names, so the result
/// is suitable for suffix comparisons. IPv6 literals keep their brackets.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use gtm_probe::url::extract_hostname;
///
/// let url = Url::parse("https://Blog.Example.com:8443/post").unwrap();
/// assert_eq!(extract_hostname(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_hostname(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

fn extractor() -> &'static TldExtractor {
    static EXTRACTOR: OnceLock<TldExtractor> = OnceLock::new();
    // Private suffixes (github.io, blogspot.com) separate unrelated tenants
    EXTRACTOR.get_or_init(|| {
        TldExtractor::new(TldOption::default().private_domains(true))
    })
}

/// Resolves the registrable "main domain" of a hostname
///
/// Uses the public suffix list bundled with `tldextract`, private section
/// included, so `a.b.example.co.uk` resolves to `example.co.uk` and
/// `blog.a.github.io` to `a.github.io`. Falls back to the hostname itself for IP literals, empty input, or hosts the list cannot
/// split into a label plus a known suffix.
///
/// # Examples
///
/// ```
/// use gtm_probe::url::main_domain;
///
/// assert_eq!(main_domain("sub.example.co.uk"), "example.co.uk");
/// assert_eq!(main_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn main_domain(hostname: &str) -> String {
    let hostname = hostname.trim_end_matches('.').to_lowercase();
    if hostname.is_empty() {
        return hostname;
    }

    // IP addresses do not have registrable domains
    match Host::parse(&hostname) {
        Ok(Host::Domain(_)) => {}
        _ => return hostname,
    }

    let probe = format!("http://{}/", hostname);
    match extractor().extract(&probe) {
        Ok(parts) => match (parts.domain, parts.suffix) {
            (Some(domain), Some(suffix)) if !domain.is_empty() && !suffix.is_empty() => {
                format!("{}.{}", domain, suffix)
            }
            _ => hostname,
        },
        Err(e) => {
            tracing::debug!("Public suffix lookup failed for {}: {}", hostname, e);
            hostname
        }
    }
}
