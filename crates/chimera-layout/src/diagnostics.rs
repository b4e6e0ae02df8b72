//! Bounded diagnostics log.
//!
//! Holds the last few messages a layout pass (or the browser shell) wanted
//! the user to see. The draw step prints them in a panel at the bottom of the
//! surface; they are never render commands.

use std::collections::VecDeque;

/// Messages containing this marker came from the script sandbox.
pub const DEFAULT_SANDBOX_MARKER: &str = "Js2Py";

/// Prefix added to sandbox messages.
pub const SANDBOX_PREFIX: &str = "[JS Sandbox] ";

/// A FIFO of at most `capacity` messages.
#[derive(Debug, Clone)]
pub struct DiagnosticsLog {
    entries: VecDeque<String>,
    capacity: usize,
    sandbox_marker: String,
}

impl DiagnosticsLog {
    /// Create an empty log keeping at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            sandbox_marker: DEFAULT_SANDBOX_MARKER.to_string(),
        }
    }

    /// Use a different marker to recognize sandbox messages.
    #[must_use]
    pub fn with_sandbox_marker(mut self, marker: &str) -> Self {
        self.sandbox_marker = marker.to_string();
        self
    }

    /// Append a message, evicting the oldest entries past capacity.
    pub fn append(&mut self, message: &str) {
        let entry = if !self.sandbox_marker.is_empty() && message.contains(&self.sandbox_marker) {
            format!("{SANDBOX_PREFIX}{message}")
        } else {
            message.to_string()
        };
        self.entries.push_back(entry);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let _ = self.entries.pop_front();
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries as an owned vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting the oldest entries if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_prefix() {
        let mut log = DiagnosticsLog::new(4);
        log.append("Js2Py: eval blocked");
        log.append("plain");
        assert_eq!(log.to_vec(), vec!["[JS Sandbox] Js2Py: eval blocked", "plain"]);
    }

    #[test]
    fn test_shrinking_capacity_evicts_oldest() {
        let mut log = DiagnosticsLog::new(3);
        for m in ["a", "b", "c"] {
            log.append(m);
        }
        log.set_capacity(1);
        assert_eq!(log.to_vec(), vec!["c"]);
    }
}
