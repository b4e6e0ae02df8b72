//! Navigation: session history and page sources.
//!
//! [§ 7.4 Navigation and session history](https://html.spec.whatwg.org/multipage/browsing-the-web.html)
//!
//! Pages come from three places: the network (`http`/`https`), built-in
//! `wind://` pages, and inline error pages for everything else. Only network
//! fetches can fail.

use std::time::Duration;

use chimera_common::net::fetch_text;
use chimera_common::url::{is_http_url, scheme, truncate_for_log};
use log::debug;

use crate::LoadError;

/// Scheme of built-in pages.
pub const INTERNAL_SCHEME: &str = "wind";
/// Built-in page about the browser.
pub const ABOUT_URL: &str = "wind://about";
/// Built-in page listing experimental features.
pub const FLAGS_URL: &str = "wind://flags";

const BUG_TRACKER_URL: &str = "https://github.com/myuser/chimera/issues";

/// Crates shown on the about page.
const COMPONENTS: &[&str] = &[
    "reqwest (Networking)",
    "fontdue (Text)",
    "image (Raster images)",
    "resvg (SVG)",
    "serde (Configuration)",
    "log (Diagnostics)",
];

/// Back and forward stacks.
///
/// The back stack always holds at least the start URL; its last entry is
/// the current page.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    back: Vec<String>,
    forward: Vec<String>,
}

impl HistoryManager {
    /// Start a history at `start_url`.
    #[must_use]
    pub fn new(start_url: &str) -> Self {
        Self {
            back: vec![start_url.to_string()],
            forward: Vec::new(),
        }
    }

    /// The current URL.
    #[must_use]
    pub fn current_url(&self) -> &str {
        self.back.last().map_or("", String::as_str)
    }

    /// Whether there is a page to go back to.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.back.len() > 1
    }

    /// Whether there is a page to go forward to.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Record a navigation to `url`.
    ///
    /// Navigating to the current URL changes nothing; anything else clears
    /// the forward stack.
    pub fn navigate_to(&mut self, url: &str) {
        if url == self.current_url() {
            return;
        }
        self.back.push(url.to_string());
        self.forward.clear();
    }

    /// Step back. Returns the new current URL.
    pub fn go_back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        let left = self.back.pop()?;
        self.forward.push(left);
        Some(self.current_url())
    }

    /// Step forward. Returns the new current URL.
    pub fn go_forward(&mut self) -> Option<&str> {
        let next = self.forward.pop()?;
        self.back.push(next);
        Some(self.current_url())
    }
}

/// HTML source of the page at `url`.
///
/// # Errors
///
/// Returns [`LoadError::Network`] if an `http`/`https` fetch fails. Other
/// URLs always produce a page, possibly an error page.
pub fn fetch_page(url: &str, timeout: Duration) -> Result<String, LoadError> {
    if is_http_url(url) {
        return Ok(fetch_text(url, timeout)?);
    }
    if scheme(url).is_some_and(|s| s.eq_ignore_ascii_case(INTERNAL_SCHEME)) {
        return Ok(internal_page(url).unwrap_or_else(|| {
            error_page("wind:// error", &format!("Internal page not found: {url}"))
        }));
    }
    debug!("blocked navigation to {url}");
    Ok(error_page(
        "URL error",
        &format!(
            "Blocked unsupported scheme: {}",
            truncate_for_log(url, 20)
        ),
    ))
}

/// A built-in `wind://` page, if `url` names one.
#[must_use]
pub fn internal_page(url: &str) -> Option<String> {
    match url {
        ABOUT_URL => Some(about_page()),
        FLAGS_URL => Some(flags_page()),
        _ => None,
    }
}

fn about_page() -> String {
    let version = crate::VERSION;
    let components: String = COMPONENTS
        .iter()
        .map(|c| format!("<li>{c}</li>"))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>About Chimera</title></head>
<body>
    <h1>Project Chimera v{version}</h1>
    <p>A small browser with its own layout engine.</p>
    <h2>Components</h2>
    <ul>{components}</ul>
    <p>Report a bug: <a href="{BUG_TRACKER_URL}">{BUG_TRACKER_URL}</a></p>
</body>
</html>
"#
    )
}

fn flags_page() -> String {
    let version = crate::VERSION;
    format!(
        r"<!DOCTYPE html>
<html>
<head><title>Experimental Features</title></head>
<body>
    <h1>Chimera experimental features</h1>
    <p>Features that are not ready for release yet.</p>
    <ul>
        <li>CSS box model (disabled): full margin and padding support.</li>
        <li>WebP support (disabled): decode WebP images.</li>
    </ul>
    <p>Current version: v{version}</p>
</body>
</html>
"
    )
}

/// An inline page reporting a problem.
#[must_use]
pub fn error_page(heading: &str, message: &str) -> String {
    format!(
        "<body><h1>{}</h1><p>{}</p></body>",
        escape_html(heading),
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }
}
