//! Text measurement backed by fontdue.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use chimera_layout::{FontSpec, MeasureError, TextMeasurer, TextMetrics};

use crate::fonts::FontSet;

/// Measures text with fontdue's per-glyph metrics.
///
/// Uses `Font::metrics()` rather than `Font::rasterize()`, so no bitmaps are
/// generated when only measurements are needed.
#[derive(Debug, Clone)]
pub struct FontdueTextMeasurer {
    fonts: FontSet,
}

impl FontdueTextMeasurer {
    /// Wrap a font set.
    #[must_use]
    pub const fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// The underlying fonts.
    #[must_use]
    pub const fn fonts(&self) -> &FontSet {
        &self.fonts
    }
}

impl TextMeasurer for FontdueTextMeasurer {
    fn measure(&self, font: &FontSpec, text: &str) -> Result<TextMetrics, MeasureError> {
        let face = self
            .fonts
            .select(font)
            .ok_or_else(|| MeasureError::NoFont(font.family.to_string()))?;
        // Sum per-character advance widths, matching the cursor advancement
        // in the renderer's glyph loop.
        let width = text
            .chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| face.metrics(ch, font.size).advance_width)
            .sum();
        Ok(TextMetrics {
            width,
            line_height: self.line_height(font)?,
        })
    }

    fn line_height(&self, font: &FontSpec) -> Result<f32, MeasureError> {
        let face = self
            .fonts
            .select(font)
            .ok_or_else(|| MeasureError::NoFont(font.family.to_string()))?;
        // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
        //
        // Prefer the face's own line gap; 1.2× is the usual 'normal' value.
        Ok(face
            .horizontal_line_metrics(font.size)
            .map_or(font.size * 1.2, |m| m.new_line_size))
    }
}
