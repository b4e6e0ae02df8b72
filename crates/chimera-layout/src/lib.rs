//! Layout engine for the Chimera browser.
//!
//! # Scope
//!
//! This crate turns a DOM tree into an ordered list of [`RenderCommand`]s:
//! - **Style table** - fixed per-tag presentation ([`style::lookup`])
//! - **Flow layout** - block elements stacked top to bottom
//! - **Table layout** - fixed-width grid of `td` cells ([`CELL_WIDTH`])
//! - **Images** - standalone and in-cell images via an [`ImageResolver`]
//! - **Page metadata** - the document title and link targets
//! - **Diagnostics** - a bounded log of what a pass skipped and why
//!
//! # Pipeline
//!
//! ```text
//! DomTree ──► LayoutEngine::layout ──► PageLayout { commands, title, diagnostics }
//!               │        │                    │
//!     TextMeasurer  ImageResolver        draw step (external)
//! ```
//!
//! Layout and drawing share one contract: commands are absolute, ordered by
//! non-decreasing `y`, and carry everything the draw step needs except the
//! final centering of centered text, which needs the measured glyph width
//! (see [`TextCommand::draw_x`]).
//!
//! # Not Implemented
//!
//! - CSS cascade and specificity
//! - Line wrapping inside a block
//! - Nested tables
//! - Per-side margins, borders and padding
//! - Incremental relayout

pub mod color;
pub mod command;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod metadata;
pub mod metrics;
pub mod resolver;
pub mod style;
mod table;

pub use color::Color;
pub use command::{ImageCommand, ImageRef, RenderCommand, TableCellCommand, TextCommand};
pub use diagnostics::DiagnosticsLog;
pub use engine::{BlockTag, CELL_WIDTH, IMAGE_FALLBACK_HEIGHT, LayoutEngine, PageLayout};
pub use error::LayoutError;
pub use geometry::Rect;
pub use metadata::{DEFAULT_TITLE, PageMetadata};
pub use metrics::{ApproximateTextMeasurer, MeasureError, TextMeasurer, TextMetrics};
pub use resolver::{ImageError, ImageResolver, OfflineImageResolver, ResolvedImage};
pub use style::{FontFamily, FontSpec, FontWeight, StyleEntry, TextAlign};
