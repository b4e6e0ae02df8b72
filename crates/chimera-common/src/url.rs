//! URL helpers: scheme checks, relative resolution and log-safe truncation.
//!
//! [URL Standard](https://url.spec.whatwg.org/)

/// Return the scheme of `url` (the part before the first `:`), if it has one.
///
/// A scheme starts with an ASCII letter and continues with letters, digits,
/// `+`, `-` or `.`.
#[must_use]
pub fn scheme(url: &str) -> Option<&str> {
    let (candidate, _) = url.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Whether `url` is an absolute `http://` or `https://` URL.
///
/// The scheme comparison is ASCII case-insensitive; the `//` authority
/// marker is required.
#[must_use]
pub fn is_http_url(url: &str) -> bool {
    let Some(scheme) = scheme(url) else {
        return false;
    };
    let http = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
    http && url[scheme.len() + 1..].starts_with("//")
}

/// Truncate `text` to at most `max_chars` characters, appending `...` when
/// something was cut. Safe on multi-byte input.
#[must_use]
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Resolve a potentially relative URL against a base URL.
///
/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// NOTE: Simplified. Dot segments, queries and fragments on the base are not
/// normalized.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    // STEP 1: Anything with a scheme is already absolute, whatever the scheme.
    if scheme(href).is_some() {
        return href.to_string();
    }

    // STEP 2: Resolve relative URL against base.
    let Some(base) = base_url else {
        return href.to_string();
    };
    let Some(scheme_end) = base.find("://") else {
        return href.to_string();
    };

    if href.starts_with("//") {
        // Protocol-relative: keep the base scheme.
        format!("{}:{href}", &base[..scheme_end])
    } else if href.starts_with('/') {
        // Absolute path: join with the base origin.
        let after_scheme = &base[scheme_end + 3..];
        after_scheme.find('/').map_or_else(
            || format!("{base}{href}"),
            |path_start| format!("{}{href}", &base[..scheme_end + 3 + path_start]),
        )
    } else {
        // Relative path: join with the base directory.
        let after_scheme = &base[scheme_end + 3..];
        if after_scheme.contains('/') {
            let base_dir = base.rsplit_once('/').map_or(base, |(dir, _)| dir);
            format!("{base_dir}/{href}")
        } else {
            format!("{base}/{href}")
        }
    }
}
