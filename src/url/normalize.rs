use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a submitted target URL
///
/// The URL must be absolute and carry a host. Leading and trailing whitespace
/// is ignored. The scheme is not restricted here: an unsupported scheme is
/// reported by the fetcher when the job runs.
///
/// # Examples
///
/// ```
/// use gtm_probe::url::parse_target_url;
///
/// assert!(parse_target_url("https://example.com/").is_ok());
/// assert!(parse_target_url("/relative/path").is_err());
/// assert!(parse_target_url("").is_err());
/// ```
pub fn parse_target_url(input: &str) -> UrlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Missing);
    }

    let url = Url::parse(trimmed)?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Turns a `<script src>` value into an absolute URL
///
/// Protocol-relative sources (`//cdn.example.com/x.js`) are given an
/// `https:` scheme. Anything else must already be absolute; relative paths
/// and malformed values yield `None`.
pub fn normalize_script_src(src: &str) -> Option<Url> {
    let src = src.trim();
    let full = if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    };

    match Url::parse(&full) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::trace!("Ignoring unparsable script src {:?}: {}", src, e);
            None
        }
    }
}
