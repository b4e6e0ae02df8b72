//! Image data types shared across browser components.
//!
//! Layout never touches pixels: it only stores an [`ImageHandle`] that the
//! image service hands out. The service keeps the decoded [`LoadedImage`]
//! and the draw step looks it up again by handle.

use serde::Serialize;

/// Opaque reference to a decoded image owned by the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageHandle(pub u64);

/// Decoded image data for a loaded image resource.
///
/// Contains the decoded RGBA pixel data and intrinsic dimensions.
#[derive(Clone)]
pub struct LoadedImage {
    width: u32,
    height: u32,
    /// Raw RGBA pixel data (width * height * 4 bytes).
    rgba_data: Vec<u8>,
}

impl LoadedImage {
    /// Create a new `LoadedImage` from decoded RGBA pixel data.
    ///
    /// Returns `None` if `rgba_data` is not exactly `width * height * 4`
    /// bytes long.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba_data.len() == expected).then_some(Self {
            width,
            height,
            rgba_data,
        })
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)` as `[r, g, b, a]`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba_data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Raw RGBA pixel data.
    #[must_use]
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
