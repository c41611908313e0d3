//! Part 2 URL extraction from HTML redirect pages.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::log::{Diagnostic, ExtractionLog};
use crate::types::ExtractResult;

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a\s+[^>]*href=["']([^"']+)["']"#).expect("anchor regex is valid")
    })
}

fn meta_refresh_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)content=["'][^"']*url=([^"';]+)"#).expect("meta refresh regex is valid")
    })
}

/// Find the redirect target in HTML text: first anchor `href`, else the
/// `url=` of a meta refresh.
pub fn find_redirect_url(content: &str) -> Option<String> {
    first_capture(anchor_re(), content).or_else(|| first_capture(meta_refresh_re(), content))
}

fn first_capture(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Read an HTML file and extract its redirect URL.
///
/// Read failures are logged and reported as "no URL"; only a failure to
/// write the log itself is returned as an error.
pub fn extract_url_from_html(
    path: &Path,
    log: &mut ExtractionLog,
) -> ExtractResult<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(find_redirect_url(&String::from_utf8_lossy(&bytes))),
        Err(e) => {
            log.record(Diagnostic::HtmlReadFailed {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
            Ok(None)
        }
    }
}
