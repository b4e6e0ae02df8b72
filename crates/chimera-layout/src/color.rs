//! Colors used by the style table and the draw step.

use serde::Serialize;

/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
    /// Alpha channel (0-255, 255 = fully opaque)
    pub a: u8,
}

impl Color {
    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Red (#ff0000)
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Blue (#0000ff)
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Dark blue (#000080)
    pub const DARK_BLUE: Self = Self::rgb(0, 0, 128);
    /// Dark green (#008000)
    pub const DARK_GREEN: Self = Self::rgb(0, 128, 0);
    /// Dark red (#800000)
    pub const DARK_RED: Self = Self::rgb(128, 0, 0);
    /// Yellow (#ffff00)
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Light cyan (#e0ffff)
    pub const LIGHT_CYAN: Self = Self::rgb(224, 255, 255);
    /// Light grey (#c0c0c0)
    pub const LIGHT_GREY: Self = Self::rgb(192, 192, 192);

    /// Components as `[r, g, b, a]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
