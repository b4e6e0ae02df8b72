//! Page metadata derived from the DOM.

use chimera_dom::{DomTree, NodeId};
use serde::Serialize;

/// Title used when a document has no `title` element.
pub const DEFAULT_TITLE: &str = "No Title";

/// Title and link targets of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// The trimmed text of the first `title` element, or [`DEFAULT_TITLE`]
    /// when there is none.
    pub title: String,
    /// `href` values of `a` elements, in document order.
    pub links: Vec<String>,
}

impl PageMetadata {
    /// Extract metadata from a whole document.
    ///
    /// The first `title` anywhere in document order wins, even when it is
    /// nested inside other elements.
    #[must_use]
    pub fn extract(dom: &DomTree) -> Self {
        Self {
            title: title_of(dom),
            links: links_of(dom),
        }
    }
}

/// The trimmed text of the first `title`, or [`DEFAULT_TITLE`] if there is
/// none. A blank `title` yields an empty string.
#[must_use]
pub fn title_of(dom: &DomTree) -> String {
    dom.find_first(NodeId::ROOT, "title")
        .map_or_else(
            || DEFAULT_TITLE.to_string(),
            |id| dom.text_content(id).trim().to_string(),
        )
}

fn links_of(dom: &DomTree) -> Vec<String> {
    dom.descendants(NodeId::ROOT)
        .filter(|&id| dom.as_element(id).is_some_and(|e| e.is("a")))
        .filter_map(|id| dom.attribute(id, "href"))
        .map(str::to_string)
        .collect()
}
