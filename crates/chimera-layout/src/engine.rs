//! Flow layout.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! This is the only formatting context: every block element that has text
//! becomes one line at the cursor, and the cursor moves down by its height.
//! Tables and images are dispatched from the same walk.

use chimera_common::BrowserConfig;
use chimera_common::url::{is_http_url, resolve_url, truncate_for_log};
use chimera_dom::{DomTree, Node, NodeId, NodeType};
use log::{debug, warn};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::command::{ImageCommand, ImageRef, RenderCommand, TextCommand};
use crate::diagnostics::DiagnosticsLog;
use crate::error::LayoutError;
use crate::geometry::Rect;
use crate::metadata::{DEFAULT_TITLE, title_of};
use crate::metrics::TextMeasurer;
use crate::resolver::ImageResolver;
use crate::style;

/// Fixed width of every table cell.
pub const CELL_WIDTH: f32 = 150.0;

/// Vertical space given to a standalone image that failed to resolve.
pub const IMAGE_FALLBACK_HEIGHT: f32 = 20.0;

/// Element tags laid out as a single line of styled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BlockTag {
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<p>`
    P,
    /// `<article>`
    Article,
    /// `<section>`
    Section,
    /// `<a>`
    A,
    /// `<li>`
    Li,
}

impl BlockTag {
    /// Parse a lowercase tag name.
    #[must_use]
    pub fn from_tag(tag_name: &str) -> Option<Self> {
        tag_name.parse().ok()
    }

    /// Text placed before the element's content.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Li => "\u{2022} ",
            _ => "",
        }
    }
}

/// What the walker does with an element.
enum ElementKind {
    Block(BlockTag),
    Table,
    Image,
    Other,
}

impl ElementKind {
    fn classify(tag_name: &str) -> Self {
        match tag_name {
            "table" => Self::Table,
            "img" => Self::Image,
            _ => BlockTag::from_tag(tag_name).map_or(Self::Other, Self::Block),
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// Render commands, ordered by non-decreasing `y`.
    pub commands: Vec<RenderCommand>,
    /// Document title, or [`DEFAULT_TITLE`].
    pub title: String,
    /// Snapshot of the engine's diagnostics log after the pass.
    pub diagnostics: Vec<String>,
    /// Errors contained during this pass, in the order they happened.
    #[serde(skip)]
    pub errors: Vec<LayoutError>,
    /// Distance from the viewport top to the final cursor position.
    pub content_height: f32,
}

impl PageLayout {
    fn empty(log: &DiagnosticsLog) -> Self {
        Self {
            commands: Vec::new(),
            title: DEFAULT_TITLE.to_string(),
            diagnostics: log.to_vec(),
            errors: Vec::new(),
            content_height: 0.0,
        }
    }
}

/// The layout engine.
///
/// Holds the settings and the diagnostics log that persist between passes.
/// Everything else (cursor, commands) belongs to a single pass.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    margin: f32,
    log: DiagnosticsLog,
    base_url: Option<String>,
}

impl LayoutEngine {
    /// Create an engine using the margin and log capacity from `config`.
    #[must_use]
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            margin: config.margin(),
            log: DiagnosticsLog::new(config.log_lines_to_show),
            base_url: None,
        }
    }

    /// The spacing unit.
    #[must_use]
    pub const fn margin(&self) -> f32 {
        self.margin
    }

    /// The diagnostics log.
    #[must_use]
    pub const fn log(&self) -> &DiagnosticsLog {
        &self.log
    }

    /// The diagnostics log, for callers that add their own messages.
    pub const fn log_mut(&mut self) -> &mut DiagnosticsLog {
        &mut self.log
    }

    /// Set the URL that relative image sources resolve against.
    pub fn set_base_url(&mut self, base_url: Option<&str>) {
        self.base_url = base_url.map(str::to_string);
    }

    /// Lay out `dom` inside `viewport`.
    ///
    /// Never fails: per-element problems are logged and skipped, and a broken
    /// tree stops the pass with whatever was emitted before the break.
    pub fn layout(
        &mut self,
        dom: &DomTree,
        viewport: Rect,
        measurer: &dyn TextMeasurer,
        resolver: &mut dyn ImageResolver,
    ) -> PageLayout {
        let Some(body) = dom.body() else {
            debug!(target: "layout", "document has no <body>; nothing to lay out");
            return PageLayout::empty(&self.log);
        };

        let mut title = title_of(dom);
        let mut pass = LayoutPass {
            margin: self.margin,
            base_url: self.base_url.as_deref(),
            measurer,
            resolver,
            cursor_x: viewport.x + self.margin,
            cursor_y: viewport.y + self.margin,
            commands: Vec::new(),
            errors: Vec::new(),
        };

        if let Err(err) = pass.walk(dom, body) {
            pass.record(err);
            title = DEFAULT_TITLE.to_string();
        }

        let content_height = pass.cursor_y - viewport.y;
        let LayoutPass {
            commands, errors, ..
        } = pass;

        for err in &errors {
            self.log.append(&err.to_string());
        }
        debug!(
            target: "layout",
            "laid out {} commands, {} errors, title {title:?}",
            commands.len(),
            errors.len()
        );

        PageLayout {
            commands,
            title,
            diagnostics: self.log.to_vec(),
            errors,
            content_height,
        }
    }
}

/// State owned by one layout pass.
pub(crate) struct LayoutPass<'a, 'r> {
    pub(crate) margin: f32,
    base_url: Option<&'a str>,
    pub(crate) measurer: &'a dyn TextMeasurer,
    resolver: &'a mut (dyn ImageResolver + 'r),
    pub(crate) cursor_x: f32,
    pub(crate) cursor_y: f32,
    pub(crate) commands: Vec<RenderCommand>,
    errors: Vec<LayoutError>,
}

impl LayoutPass<'_, '_> {
    /// Contain an error: log it and keep it for the diagnostics log.
    pub(crate) fn record(&mut self, err: LayoutError) {
        warn!(target: "layout", "{err}");
        self.errors.push(err);
    }

    /// Preorder walk of the descendants of `body`.
    ///
    /// Uses an explicit stack so deep documents cannot overflow the call
    /// stack. Visiting more nodes than the tree holds means there is a cycle.
    fn walk(&mut self, dom: &DomTree, body: NodeId) -> Result<(), LayoutError> {
        let mut stack: Vec<NodeId> = dom.children(body).iter().rev().copied().collect();
        let mut visited = 0_usize;

        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > dom.len() {
                return Err(LayoutError::DomTraversalFailure {
                    reason: format!("visited more than {} nodes; the tree has a cycle", dom.len()),
                });
            }
            let node = checked_node(dom, id)?;
            let NodeType::Element(element) = &node.node_type else {
                continue;
            };

            match ElementKind::classify(&element.tag_name) {
                ElementKind::Block(tag) => self.layout_block(dom, id, tag),
                // Elements inside cells are still visited, after the grid.
                ElementKind::Table => self.layout_table(dom, id)?,
                ElementKind::Image => self.layout_image(dom, id),
                ElementKind::Other => {}
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }

    fn layout_block(&mut self, dom: &DomTree, id: NodeId, tag: BlockTag) {
        let content = dom.text_content(id);
        let content = content.trim();
        if content.is_empty() {
            return;
        }

        let style = style::lookup(tag.as_ref());
        let line_height = match self.measurer.line_height(&style.font) {
            Ok(height) => height,
            Err(source) => {
                self.record(LayoutError::MeasurementFailure {
                    tag: tag.to_string(),
                    source,
                });
                return;
            }
        };
        let height = line_height + 2.0 * self.margin;

        self.commands.push(RenderCommand::Text(TextCommand {
            tag: tag.to_string(),
            x: self.cursor_x,
            y: self.cursor_y,
            height,
            text: format!("{}{content}", tag.prefix()),
            font: style.font,
            color: style.color,
            align: style.align,
            background: style.background,
        }));
        self.cursor_y += height;
    }

    fn layout_image(&mut self, dom: &DomTree, id: NodeId) {
        let Some(src) = dom
            .attribute(id, "src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
        else {
            debug!(target: "layout", "<img> without src skipped");
            return;
        };

        match self.resolve_image(src) {
            Ok(image) => {
                let height = image.height as f32 + self.margin;
                self.commands.push(RenderCommand::Image(ImageCommand {
                    tag: "img".to_string(),
                    x: self.cursor_x,
                    y: self.cursor_y,
                    height,
                    image,
                }));
                self.cursor_y += height;
            }
            Err(err) => {
                self.record(err);
                self.cursor_y += IMAGE_FALLBACK_HEIGHT;
            }
        }
    }

    /// Resolve an image source. Only `http`/`https` URLs reach the resolver.
    pub(crate) fn resolve_image(&mut self, src: &str) -> Result<ImageRef, LayoutError> {
        let url = resolve_url(src, self.base_url);
        if !is_http_url(&url) {
            return Err(LayoutError::InsecureSchemeRejected {
                url_prefix: truncate_for_log(&url, 15),
            });
        }
        let image = self
            .resolver
            .resolve(&url)
            .map_err(|err| LayoutError::ImageResolutionFailure {
                url: truncate_for_log(&url, 40),
                detail: truncate_for_log(&err.to_string(), 60),
            })?;
        Ok(ImageRef {
            handle: image.handle,
            width: image.width,
            height: image.height,
        })
    }
}

/// Look up a node, turning a dangling id into a traversal failure.
pub(crate) fn checked_node(dom: &DomTree, id: NodeId) -> Result<&Node, LayoutError> {
    dom.get(id).ok_or_else(|| LayoutError::DomTraversalFailure {
        reason: format!("dangling node id {}", id.0),
    })
}
