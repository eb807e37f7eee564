//! HTML script extraction
//!
//! Collects every `<script>` element of a page in document order, keeping
//! its `src` attribute and inline text as-is.

use scraper::{Html, Selector};
use std::sync::LazyLock;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("static selector is valid"));

/// A `<script>` element found on the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTag {
    /// Value of the `src` attribute, if present
    pub src: Option<String>,

    /// Raw inline text of the element
    pub inline: String,
}

impl ScriptTag {
    /// The `src` attribute, or an empty string when absent
    pub fn src_or_empty(&self) -> &str {
        self.src.as_deref().unwrap_or("")
    }

    /// `src` followed by the inline text
    pub fn combined(&self) -> String {
        let mut content = String::with_capacity(self.src_or_empty().len() + self.inline.len());
        content.push_str(self.src_or_empty());
        content.push_str(&self.inline);
        content
    }
}

/// Parses HTML and returns its script elements in document order
///
/// Parsing is lenient: malformed markup is recovered the way a browser
/// would, so this never fails.
///
/// # Example
///
/// ```
/// use gtm_probe::analysis::extract_scripts;
///
/// let html = r#"<script src="/a.js"></script><script>var x = 1;</script>"#;
/// let scripts = extract_scripts(html);
/// assert_eq!(scripts.len(), 2);
/// assert_eq!(scripts[0].src.as_deref(), Some("/a.js"));
/// assert_eq!(scripts[1].inline, "var x = 1;");
/// ```
pub fn extract_scripts(html: &str) -> Vec<ScriptTag> {
    let document = Html::parse_document(html);

    document
        .select(&SCRIPT_SELECTOR)
        .map(|element| ScriptTag {
            src: element.value().attr("src").map(str::to_string),
            inline: element.text().collect::<String>(),
        })
        .collect()
}
