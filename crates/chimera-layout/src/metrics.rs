//! Text measurement.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Layout asks a [`TextMeasurer`] for line heights; the draw step asks it for
//! widths when centering. Real glyph metrics live in the browser crate
//! (fontdue); [`ApproximateTextMeasurer`] is enough for tests and for
//! headless runs without system fonts.

use serde::Serialize;

use crate::style::FontSpec;

/// Measured extent of a string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextMetrics {
    /// Total advance width.
    pub width: f32,
    /// Height of one line in this font.
    pub line_height: f32,
}

/// Failure to measure text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    /// No face is available for the requested font.
    #[error("no font available for {0}")]
    NoFont(String),
    /// The measurer rejected the request.
    #[error("{0}")]
    Failed(String),
}

/// Text measurement service.
///
/// Implementations must be deterministic within a session: the same font and
/// text always give the same answer.
pub trait TextMeasurer {
    /// Measure the total advance width and line height of `text`.
    ///
    /// # Errors
    ///
    /// Returns a [`MeasureError`] if the font cannot be used.
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics, MeasureError>;

    /// Height of one line of text in `font`.
    ///
    /// # Errors
    ///
    /// Returns a [`MeasureError`] if the font cannot be used.
    fn line_height(&self, font: &FontSpec) -> Result<f32, MeasureError>;
}

/// Approximate font metrics using fixed ratios.
///
/// Without access to actual font data, we use fixed ratio approximations.
/// The average advance width of Latin glyphs in a proportional font is
/// approximately 0.6× the font size, and a "normal" line height is 1.2×.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasurer;

impl ApproximateTextMeasurer {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_RATIO: f32 = 1.2;
}

impl TextMeasurer for ApproximateTextMeasurer {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics, MeasureError> {
        Ok(TextMetrics {
            width: text.chars().count() as f32 * font.size * Self::CHAR_WIDTH_RATIO,
            line_height: self.line_height(font)?,
        })
    }

    fn line_height(&self, font: &FontSpec) -> Result<f32, MeasureError> {
        Ok(font.size * Self::LINE_HEIGHT_RATIO)
    }
}
