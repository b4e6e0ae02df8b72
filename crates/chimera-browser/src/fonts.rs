//! System font discovery.
//!
//! Fonts are looked up from a fixed list of well-known paths per platform.
//! Both the text measurer and the renderer use the same [`FontSet`], so the
//! widths used for centering match the glyphs that get drawn.

use chimera_layout::{FontFamily, FontSpec};
use fontdue::{Font, FontSettings};
use log::{debug, warn};

/// Common system font paths to search for a default (regular) font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// System font paths for bold variants.
const FONT_BOLD_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// System font paths for the monospace face used by the log panel.
const FONT_MONO_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Courier.ttc",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    // Windows
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Regular, bold and monospace faces. Any of them may be missing.
#[derive(Clone, Default)]
pub struct FontSet {
    regular: Option<Font>,
    bold: Option<Font>,
    mono: Option<Font>,
}

impl FontSet {
    /// Search the well-known system paths.
    #[must_use]
    pub fn load_system() -> Self {
        let fonts = Self {
            regular: load_font_from_paths(FONT_SEARCH_PATHS, "regular"),
            bold: load_font_from_paths(FONT_BOLD_SEARCH_PATHS, "bold"),
            mono: load_font_from_paths(FONT_MONO_SEARCH_PATHS, "monospace"),
        };
        if fonts.regular.is_none() {
            warn!("no system font found; text will not be rendered");
            for path in FONT_SEARCH_PATHS {
                debug!("  searched {path}");
            }
        }
        fonts
    }

    /// Build a set from an in-memory regular face.
    ///
    /// # Errors
    ///
    /// Returns the fontdue error message if the bytes are not a usable font.
    pub fn from_bytes(regular: Vec<u8>) -> Result<Self, String> {
        let font = Font::from_bytes(regular, FontSettings::default()).map_err(str::to_string)?;
        Ok(Self {
            regular: Some(font),
            bold: None,
            mono: None,
        })
    }

    /// Whether any face is available.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.regular.is_none()
    }

    /// The best available face for `spec`: exact match, then regular.
    #[must_use]
    pub fn select(&self, spec: &FontSpec) -> Option<&Font> {
        let preferred = match spec.family {
            FontFamily::Courier => self.mono.as_ref(),
            FontFamily::Helvetica if spec.is_bold() => self.bold.as_ref(),
            FontFamily::Helvetica => None,
        };
        preferred.or(self.regular.as_ref())
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .field("mono", &self.mono.is_some())
            .finish()
    }
}

/// Try to load a font from a list of filesystem paths.
fn load_font_from_paths(paths: &[&str], label: &str) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            debug!("loaded {label} font: {path}");
            return Some(font);
        }
    }
    None
}
