//! Deduplicated browser warnings.
//!
//! Warnings go through the `log` facade at `warn` level, once per unique
//! message until [`clear_warnings`] is called (typically on navigation).
//! Used by the layout engine and the image pipeline to report unsupported
//! input without flooding the log on every repaint.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (logged once per unique message).
///
/// Returns `true` if the warning was emitted, `false` if it was a duplicate.
///
/// # Example
/// ```ignore
/// warn_once("layout", "nested <table> is laid out as flow content");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let fresh = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if fresh {
        log::warn!(target: "chimera", "[{component}] {message}");
    }
    fresh
}

/// Clear all recorded warnings (call when loading a new page).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
