//! DOM tree implementation for the Chimera browser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Layout
//! only reads the tree; the HTML parser and tests build it through
//! [`DomTree::create_element`], [`DomTree::create_text`] and
//! [`DomTree::append_child`].

use std::collections::HashMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document root.
    Document,
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// "Text nodes are known as text."
    Text(String),
    /// "Comment nodes are known as comments."
    Comment(String),
}

/// Element-specific data: local name and attribute list.
///
/// Tag and attribute names are stored ASCII-lowercased, matching what the
/// HTML parser produces for HTML documents.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with a lowercased tag name and no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: AttributesMap::new(),
        }
    }

    /// Builder-style attribute setter (name is lowercased).
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Whether this element has the given (lowercase) local name.
    #[must_use]
    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    /// Value of an attribute, if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(NodeType::Element(data))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeType::Text(text.to_string()))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`. Ids that are not in
    /// this tree are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Append text to `parent`, merging with a trailing text node if there
    /// is one (adjacent character tokens form one text node).
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.children(parent).last().copied();
        if let Some(last) = last
            && let Some(NodeType::Text(existing)) =
                self.nodes.get_mut(last.0).map(|n| &mut n.node_type)
        {
            existing.push_str(text);
            return;
        }
        let id = self.create_text(text);
        self.append_child(parent, id);
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over the descendants of `id` in document order (preorder),
    /// excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            tree: self,
            stack,
            budget: self.nodes.len(),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Value of attribute `name` on element `id`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attr(name))
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node node is the concatenation of
    /// the data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// First element named `tag_name` among the descendants of `from`, in
    /// document order.
    #[must_use]
    pub fn find_first(&self, from: NodeId, tag_name: &str) -> Option<NodeId> {
        self.descendants(from)
            .find(|&d| self.as_element(d).is_some_and(|e| e.is(tag_name)))
    }

    /// The first element whose local name is `html` and whose parent is the
    /// document.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.as_element(id).is_some())
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// The first `body` element in document order. Trees handed to layout
    /// are not guaranteed to have the parser's `html > body` shape, so this
    /// searches the whole tree rather than only the document element's
    /// children.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.find_first(NodeId::ROOT, "body")
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Preorder iterator over descendants, driven by an explicit stack.
///
/// Ids that do not resolve to a node are skipped; see the layout engine for
/// a walk that reports them instead. The walk never yields more nodes than
/// the arena holds, so a malformed tree with a cycle still terminates.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
    budget: usize,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.budget == 0 {
                return None;
            }
            let id = self.stack.pop()?;
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            self.budget -= 1;
            self.stack.extend(node.children.iter().rev());
            return Some(id);
        }
    }
}

/// Print a DOM subtree, one node per line, indented by depth.
///
/// Intended for debugging output in the CLI.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    format_node(tree, id, 0, &mut out);
    out
}

fn format_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let indent = "  ".repeat(depth);
    let line = match &node.node_type {
        NodeType::Document => "#document".to_string(),
        NodeType::Element(data) => {
            let mut attrs: Vec<_> = data.attrs.iter().collect();
            attrs.sort();
            let attrs: String = attrs
                .into_iter()
                .map(|(k, v)| format!(" {k}=\"{v}\""))
                .collect();
            format!("<{}{attrs}>", data.tag_name)
        }
        NodeType::Text(text) => format!("\"{}\"", text.trim()),
        NodeType::Comment(text) => format!("<!-- {text} -->"),
    };
    out.push_str(&indent);
    out.push_str(&line);
    out.push('\n');
    for &child in &node.children {
        format_node(tree, child, depth + 1, out);
    }
}
