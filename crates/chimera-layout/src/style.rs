//! The per-tag style table.
//!
//! There is no cascade: every element takes its presentation from a fixed
//! table keyed by tag name, and tags the table does not list use the `p`
//! entry.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::color::Color;

/// Font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FontFamily {
    /// Proportional sans-serif, used for page content.
    Helvetica,
    /// Monospace, used for the diagnostics panel.
    Courier,
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    Normal,
    /// Bold weight.
    Bold,
}

/// Horizontal text alignment intent.
///
/// Layout stores the intent only. Centering needs the measured width of the
/// glyphs and the final surface width, so it happens in the draw step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Start at the cursor's x origin.
    Left,
    /// Centered against the full viewport width.
    Center,
}

/// Everything a measurer or renderer needs to pick a face and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontSpec {
    /// Family.
    pub family: FontFamily,
    /// Weight.
    pub weight: FontWeight,
    /// Size in points; the draw surface maps one point to one pixel.
    pub size: f32,
}

impl FontSpec {
    /// Create a font spec.
    #[must_use]
    pub const fn new(family: FontFamily, weight: FontWeight, size: f32) -> Self {
        Self {
            family,
            weight,
            size,
        }
    }

    /// Whether this is a bold face.
    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Presentation attributes for one tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleEntry {
    /// Font face and size.
    pub font: FontSpec,
    /// Foreground (text) color.
    pub color: Color,
    /// Full-width background fill, if any.
    pub background: Option<Color>,
    /// Alignment intent.
    pub align: TextAlign,
}

const fn entry(
    weight: FontWeight,
    size: f32,
    color: Color,
    background: Option<Color>,
    align: TextAlign,
) -> StyleEntry {
    StyleEntry {
        font: FontSpec::new(FontFamily::Helvetica, weight, size),
        color,
        background,
        align,
    }
}

const P_STYLE: StyleEntry = entry(
    FontWeight::Normal,
    14.0,
    Color::BLACK,
    Some(Color::YELLOW),
    TextAlign::Left,
);

/// The style table, in lookup order.
const STYLE_TABLE: &[(&str, StyleEntry)] = &[
    (
        "h1",
        entry(FontWeight::Bold, 24.0, Color::RED, None, TextAlign::Center),
    ),
    (
        "h2",
        entry(FontWeight::Bold, 18.0, Color::DARK_BLUE, None, TextAlign::Left),
    ),
    ("p", P_STYLE),
    (
        "article",
        entry(FontWeight::Normal, 14.0, Color::DARK_BLUE, None, TextAlign::Left),
    ),
    (
        "section",
        entry(
            FontWeight::Normal,
            16.0,
            Color::DARK_GREEN,
            Some(Color::LIGHT_CYAN),
            TextAlign::Center,
        ),
    ),
    (
        "td",
        entry(FontWeight::Normal, 12.0, Color::DARK_GREEN, None, TextAlign::Left),
    ),
    (
        "a",
        entry(FontWeight::Normal, 14.0, Color::BLUE, None, TextAlign::Left),
    ),
    (
        "li",
        entry(FontWeight::Normal, 14.0, Color::BLACK, None, TextAlign::Left),
    ),
    (
        "ul",
        entry(FontWeight::Normal, 14.0, Color::BLACK, None, TextAlign::Left),
    ),
];

/// Look up the style for `tag_name` (ASCII case-insensitive).
///
/// Total: tags without an entry resolve to the `p` entry.
#[must_use]
pub fn lookup(tag_name: &str) -> &'static StyleEntry {
    STYLE_TABLE
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(tag_name))
        .map_or(&P_STYLE, |(_, style)| style)
}

/// Whether `tag_name` has its own entry (as opposed to the `p` fallback).
#[must_use]
pub fn has_entry(tag_name: &str) -> bool {
    STYLE_TABLE
        .iter()
        .any(|(tag, _)| tag.eq_ignore_ascii_case(tag_name))
}

/// Iterate over the table's `(tag, style)` pairs.
pub fn entries() -> impl Iterator<Item = (&'static str, &'static StyleEntry)> {
    STYLE_TABLE.iter().map(|(tag, style)| (*tag, style))
}
