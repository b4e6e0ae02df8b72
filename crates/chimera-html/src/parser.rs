//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A reduced tree builder. It keeps the parts of the insertion-mode machinery
//! that decide *where* nodes go (implied `html`, `head` and `body`, the stack
//! of open elements, implied end tags) and drops error recovery that the
//! layout engine never observes.

use chimera_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::tokenizer::{Attribute, Token};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements."
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that belong in `head` when they appear before `body` content.
const HEAD_ELEMENTS: &[&str] = &["base", "link", "meta", "script", "style", "title"];

/// Start tags that close an open `p` element.
///
/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
/// "If the stack of open elements has a p element in button scope, then
/// close a p element."
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// A recoverable problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human-readable description.
    pub message: String,
}

/// HTML tree builder.
pub struct HTMLParser {
    tokens: Vec<Token>,
    tree: DomTree,
    /// "The stack of open elements"
    open_elements: Vec<NodeId>,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
    issues: Vec<ParseIssue>,
}

impl HTMLParser {
    /// Create a parser over a token stream from
    /// [`HTMLTokenizer`](crate::HTMLTokenizer).
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: DomTree::new(),
            open_elements: Vec::new(),
            html: None,
            head: None,
            body: None,
            issues: Vec::new(),
        }
    }

    /// Build the tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Build the tree and return the issues found along the way.
    ///
    /// The resulting document always has `html` and `body` elements.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            match token {
                Token::Doctype { .. } => {}
                Token::Comment { data } => {
                    let parent = self.current_node();
                    let id = self.tree.alloc(NodeType::Comment(data));
                    self.tree.append_child(parent, id);
                }
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => self.handle_start_tag(&name, self_closing, attributes),
                Token::EndTag { name } => self.handle_end_tag(&name),
                Token::Character { data } => self.handle_text(&data),
                Token::EndOfFile => break,
            }
        }
        let _ = self.ensure_body();
        (self.tree, self.issues)
    }

    fn issue(&mut self, message: String) {
        self.issues.push(ParseIssue { message });
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn tag_of(&self, id: NodeId) -> &str {
        self.tree
            .as_element(id)
            .map_or("", |e| e.tag_name.as_str())
    }

    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.tree.create_element(ElementData::new("html"));
        self.tree.append_child(NodeId::ROOT, html);
        self.open_elements.insert(0, html);
        self.html = Some(html);
        html
    }

    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.tree.create_element(ElementData::new("head"));
        self.tree.append_child(html, head);
        self.open_elements.push(head);
        self.head = Some(head);
        head
    }

    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        let html = self.ensure_html();
        // "Pop the current node (which will be the head element) off the stack
        // of open elements."
        if let Some(head) = self.head {
            self.pop_through(head);
        }
        let body = self.tree.create_element(ElementData::new("body"));
        self.tree.append_child(html, body);
        self.open_elements.push(body);
        self.body = Some(body);
        body
    }

    /// Pop elements until `target` has been popped. No-op if it is not open.
    fn pop_through(&mut self, target: NodeId) {
        if let Some(pos) = self.open_elements.iter().rposition(|&id| id == target) {
            self.open_elements.truncate(pos);
        }
    }

    /// Find the nearest open element named one of `names`, without crossing
    /// any element named in `boundaries`.
    fn find_open(&self, names: &[&str], boundaries: &[&str]) -> Option<NodeId> {
        for &id in self.open_elements.iter().rev() {
            let tag = self.tag_of(id);
            if names.contains(&tag) {
                return Some(id);
            }
            if boundaries.contains(&tag) || tag == "body" || tag == "html" {
                return None;
            }
        }
        None
    }

    fn handle_start_tag(&mut self, name: &str, self_closing: bool, attributes: Vec<Attribute>) {
        match name {
            "html" => {
                let _ = self.ensure_html();
                return;
            }
            "head" => {
                if self.body.is_none() {
                    let _ = self.ensure_head();
                } else {
                    self.issue("<head> after <body> ignored".to_string());
                }
                return;
            }
            "body" => {
                if self.body.is_some() {
                    self.issue("duplicate <body> ignored".to_string());
                }
                let _ = self.ensure_body();
                return;
            }
            _ => {}
        }

        let parent = if self.body.is_none() && HEAD_ELEMENTS.contains(&name) {
            let head = self.ensure_head();
            if !self.open_elements.contains(&head) {
                self.open_elements.push(head);
            }
            head
        } else {
            let _ = self.ensure_body();
            self.close_implied(name);
            self.current_node()
        };

        let mut data = ElementData::new(name);
        for attribute in attributes {
            data = data.with_attr(&attribute.name, &attribute.value);
        }
        let id = self.tree.create_element(data);
        self.tree.append_child(parent, id);

        if self_closing && !VOID_ELEMENTS.contains(&name) {
            self.issue(format!("self-closing flag on non-void <{name}> ignored"));
        }
        if !VOID_ELEMENTS.contains(&name) {
            self.open_elements.push(id);
        }
    }

    /// Implied end tags for the handful of elements whose end tag is optional.
    fn close_implied(&mut self, name: &str) {
        let closed = match name {
            "li" => self.find_open(&["li"], &["ul", "ol", "table", "td"]),
            "td" | "th" => self.find_open(&["td", "th"], &["tr", "table"]),
            "tr" => self.find_open(&["tr"], &["table"]),
            _ if CLOSES_P.contains(&name) => self.find_open(&["p"], &["table", "td", "th", "li"]),
            _ => None,
        };
        if let Some(id) = closed {
            self.pop_through(id);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        match name {
            // Keep body open so trailing content still lands in it.
            "html" | "body" => {}
            "head" => {
                if let Some(head) = self.head {
                    self.pop_through(head);
                }
            }
            _ => {
                let target = self
                    .open_elements
                    .iter()
                    .rev()
                    .copied()
                    .find(|&id| self.tag_of(id) == name);
                match target {
                    Some(id) if Some(id) != self.html && Some(id) != self.body => {
                        self.pop_through(id);
                    }
                    _ => self.issue(format!("unexpected end tag </{name}>")),
                }
            }
        }
    }

    fn handle_text(&mut self, data: &str) {
        let current = self.current_node();
        let in_document_head = current == NodeId::ROOT
            || Some(current) == self.html
            || Some(current) == self.head;

        if self.body.is_none() && in_document_head {
            // Inter-element whitespace before body content is dropped.
            if data.trim().is_empty() {
                return;
            }
            let body = self.ensure_body();
            self.tree.append_text(body, data);
            return;
        }
        self.tree.append_text(current, data);
    }
}
