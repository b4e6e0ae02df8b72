//! Render commands.
//!
//! The output of a layout pass: absolute, fully resolved drawing primitives in
//! document order. A draw step iterates them once per repaint and never
//! re-derives layout, with one exception: centered text needs the measured
//! glyph width, which [`TextCommand::draw_x`] applies at draw time.

use chimera_common::ImageHandle;
use serde::Serialize;

use crate::color::Color;
use crate::geometry::Rect;
use crate::style::{FontSpec, TextAlign};

/// A single drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderCommand {
    /// A block of styled text.
    Text(TextCommand),
    /// A standalone image.
    Image(ImageCommand),
    /// One cell of a table row.
    TableCell(TableCellCommand),
}

impl RenderCommand {
    /// Left edge of the command's box.
    #[must_use]
    pub fn x(&self) -> f32 {
        match self {
            Self::Text(c) => c.x,
            Self::Image(c) => c.x,
            Self::TableCell(c) => c.x,
        }
    }

    /// Top edge of the command's box.
    #[must_use]
    pub fn y(&self) -> f32 {
        match self {
            Self::Text(c) => c.y,
            Self::Image(c) => c.y,
            Self::TableCell(c) => c.y,
        }
    }

    /// Vertical space the command occupies.
    #[must_use]
    pub fn height(&self) -> f32 {
        match self {
            Self::Text(c) => c.height,
            Self::Image(c) => c.height,
            Self::TableCell(c) => c.height,
        }
    }

    /// Tag of the element that produced the command.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Text(c) => &c.tag,
            Self::Image(c) => &c.tag,
            Self::TableCell(c) => &c.tag,
        }
    }

    /// Text carried by the command, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(c) => Some(&c.text),
            Self::Image(_) => None,
            Self::TableCell(c) => Some(&c.text),
        }
    }
}

/// Text of a block element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextCommand {
    /// Source tag.
    pub tag: String,
    /// Left edge for left-aligned text.
    pub x: f32,
    /// Top of the block.
    pub y: f32,
    /// Line height plus top and bottom margin.
    pub height: f32,
    /// Trimmed text (with the bullet prefix for `li`).
    pub text: String,
    /// Font to draw with.
    pub font: FontSpec,
    /// Glyph color.
    pub color: Color,
    /// Alignment intent, applied by [`TextCommand::draw_x`].
    pub align: TextAlign,
    /// Full-width background fill, painted before the glyphs.
    pub background: Option<Color>,
}

impl TextCommand {
    /// X coordinate at which to start drawing glyphs.
    ///
    /// Left-aligned text starts at [`TextCommand::x`]. Centered text is
    /// centered against the whole viewport using the width the draw step
    /// measured, and never starts left of the viewport.
    #[must_use]
    pub fn draw_x(&self, viewport: &Rect, measured_width: f32) -> f32 {
        match self.align {
            TextAlign::Left => self.x,
            TextAlign::Center => {
                (viewport.x + (viewport.width - measured_width) / 2.0).max(viewport.x)
            }
        }
    }

    /// The background rectangle: the full viewport width at this block's
    /// vertical extent.
    #[must_use]
    pub const fn background_rect(&self, viewport: &Rect) -> Rect {
        Rect::new(viewport.x, self.y, viewport.width, self.height)
    }

    /// Baseline for the glyphs.
    #[must_use]
    pub fn baseline_y(&self, margin: f32) -> f32 {
        self.y + self.font.size + margin
    }
}

/// Reference to a resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Handle into the resolver's image store.
    pub handle: ImageHandle,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

/// A standalone image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCommand {
    /// Always `img`.
    pub tag: String,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Image height plus one margin.
    pub height: f32,
    /// The resolved image.
    pub image: ImageRef,
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCellCommand {
    /// Always `td`.
    pub tag: String,
    /// Left edge: row origin plus column times [`CELL_WIDTH`](crate::CELL_WIDTH).
    pub x: f32,
    /// Top edge: row top plus one margin.
    pub y: f32,
    /// Always [`CELL_WIDTH`](crate::CELL_WIDTH).
    pub width: f32,
    /// Content height plus top and bottom margin.
    pub height: f32,
    /// Trimmed cell text, possibly empty.
    pub text: String,
    /// Font for the cell text.
    pub font: FontSpec,
    /// Color for the cell text.
    pub color: Color,
    /// Image of the first `img` in the cell, if it resolved.
    pub image: Option<ImageRef>,
    /// Whether to draw the cell border. Cells always have one.
    pub border: bool,
}

impl TableCellCommand {
    /// The border rectangle, which starts one margin above the cell origin.
    #[must_use]
    pub fn border_rect(&self, margin: f32) -> Rect {
        Rect::new(self.x, self.y - margin, self.width, self.height)
    }
}
