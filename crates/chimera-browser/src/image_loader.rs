//! Image loading pipeline: fetch, detect format, decode, shrink, store.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! 1. **Fetch**: [`HttpImageResolver`] downloads bytes with the configured
//!    timeout. The layout engine has already rejected non-`http(s)` URLs.
//! 2. **Detect**: [`detect_format()`] decides between SVG and raster from the
//!    extension and by sniffing the bytes.
//! 3. **Decode**: an [`ImageDecoder`] turns bytes into RGBA pixels.
//! 4. **Shrink**: [`fit_within()`] scales the image down to fit a table cell.
//! 5. **Store**: the pixels go into an [`ImageStore`]; layout only sees the
//!    [`ImageHandle`] and the final dimensions.

use std::collections::HashMap;
use std::time::Duration;

use chimera_common::image::{ImageHandle, LoadedImage};
use chimera_common::net::fetch_bytes;
use chimera_common::warning::warn_once;
use chimera_layout::{CELL_WIDTH, ImageError, ImageResolver, ResolvedImage};
use image::RgbaImage;
use image::imageops::FilterType;
use log::debug;

/// Detected image format.
///
/// Only two variants are needed: the `image` crate handles raster sub-format
/// detection (PNG/JPEG/GIF/WebP/…) internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG vector image (decoded via usvg + resvg).
    Svg,
    /// Raster image (decoded via the `image` crate).
    Raster,
}

/// Strip query string (`?…`) and fragment identifier (`#…`) from a URL so
/// that the remaining path can be checked for a file extension.
///
/// [URL Standard § 4.1](https://url.spec.whatwg.org/#concept-url-path)
#[must_use]
pub fn strip_url_decorations(url: &str) -> &str {
    let without_fragment = url.split_once('#').map_or(url, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Warn once about URL parts the loader ignores.
fn warn_url_decorations(url: &str) {
    if let Some((_, fragment)) = url.split_once('#') {
        let _ = warn_once(
            "image",
            &format!("ignoring fragment identifier '#{fragment}' in '{url}'"),
        );
    }
}

/// Detect whether `bytes` represent an SVG or a raster image.
///
/// 1. **Extension check**: `.svg` in `path_for_ext`.
/// 2. **Magic-byte sniffing**: after leading whitespace, the first 256 bytes
///    start with `<?xml` or `<svg`.
/// 3. **Default**: [`ImageFormat::Raster`].
#[must_use]
pub fn detect_format(path_for_ext: &str, bytes: &[u8]) -> ImageFormat {
    if std::path::Path::new(path_for_ext)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return ImageFormat::Svg;
    }

    let trimmed: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(256)
        .copied()
        .collect();

    if trimmed.starts_with(b"<?xml") || trimmed.starts_with(b"<svg") {
        return ImageFormat::Svg;
    }
    ImageFormat::Raster
}

/// A decoder that can turn raw bytes into a [`LoadedImage`].
pub trait ImageDecoder {
    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str;

    /// Whether this decoder handles the given format.
    fn supports(&self, format: ImageFormat) -> bool;

    /// Attempt to decode `bytes` into a [`LoadedImage`].
    ///
    /// # Errors
    ///
    /// Returns an error string if the bytes cannot be decoded by this decoder.
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String>;
}

/// Decodes SVG images via usvg → resvg rasterization.
pub struct SvgDecoder;

impl ImageDecoder for SvgDecoder {
    fn name(&self) -> &'static str {
        "SVG (resvg)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Svg
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String> {
        let opts = usvg::Options::default();
        let tree =
            usvg::Tree::from_data(bytes, &opts).map_err(|e| format!("failed to parse SVG: {e}"))?;

        let size = tree.size();
        let (w, h) = (size.width().ceil() as u32, size.height().ceil() as u32);
        if w == 0 || h == 0 {
            return Err("SVG has zero-size dimensions".to_string());
        }

        let mut pixmap = tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| "failed to allocate pixmap for SVG".to_string())?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; the store holds straight RGBA.
        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        LoadedImage::new(w, h, rgba).ok_or_else(|| "SVG pixel buffer size mismatch".to_string())
    }
}

/// Decodes raster images (PNG, JPEG, GIF, WebP, …) via the `image` crate.
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "Raster (image crate)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Raster
    }

    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| format!("could not decode image ({e})"))?
            .to_rgba8();
        let (w, h) = rgba.dimensions();
        LoadedImage::new(w, h, rgba.into_raw())
            .ok_or_else(|| "raster pixel buffer size mismatch".to_string())
    }
}

/// Image loading pipeline that detects format and dispatches to the
/// appropriate decoder.
pub struct ImageLoaderPipeline {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl ImageLoaderPipeline {
    /// Create a pipeline with the default decoders (SVG + raster).
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![Box::new(SvgDecoder), Box::new(RasterDecoder)],
        }
    }

    /// Detect the image format and decode `bytes` into a [`LoadedImage`].
    ///
    /// `path_for_ext` is the URL stripped of query and fragment.
    ///
    /// # Errors
    ///
    /// Returns an error string if no decoder supports the detected format or
    /// if decoding fails.
    pub fn decode(&self, bytes: &[u8], path_for_ext: &str) -> Result<LoadedImage, String> {
        let format = detect_format(path_for_ext, bytes);
        let decoder = self
            .decoders
            .iter()
            .find(|d| d.supports(format))
            .ok_or_else(|| format!("no decoder available for format {format:?}"))?;
        debug!("decoding {path_for_ext} with {}", decoder.name());
        decoder.decode(bytes)
    }
}

impl Default for ImageLoaderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Shrink `image` to fit a `max_side` square, keeping its aspect ratio.
///
/// Images that already fit are returned unchanged; images are never
/// enlarged.
#[must_use]
pub fn fit_within(image: LoadedImage, max_side: u32) -> LoadedImage {
    let (w, h) = (image.width(), image.height());
    if max_side == 0 || (w <= max_side && h <= max_side) {
        return image;
    }
    let Some(buffer) = RgbaImage::from_raw(w, h, image.rgba_data().to_vec()) else {
        return image;
    };
    let resized = image::DynamicImage::ImageRgba8(buffer)
        .resize(max_side, max_side, FilterType::Lanczos3)
        .to_rgba8();
    let (rw, rh) = resized.dimensions();
    LoadedImage::new(rw, rh, resized.into_raw()).unwrap_or(image)
}

/// Decoded images keyed by [`ImageHandle`].
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<ImageHandle, LoadedImage>,
    next_handle: u64,
}

impl ImageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image and hand out a fresh handle for it.
    pub fn insert(&mut self, image: LoadedImage) -> ImageHandle {
        let handle = ImageHandle(self.next_handle);
        self.next_handle += 1;
        let _ = self.images.insert(handle, image);
        handle
    }

    /// Look up an image.
    #[must_use]
    pub fn get(&self, handle: ImageHandle) -> Option<&LoadedImage> {
        self.images.get(&handle)
    }

    /// Number of stored images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drop every image. Handles are not reused.
    pub fn clear(&mut self) {
        self.images.clear();
    }
}

/// Resolves `http(s)` image URLs by downloading and decoding them.
pub struct HttpImageResolver {
    pipeline: ImageLoaderPipeline,
    store: ImageStore,
    timeout: Duration,
    max_side: u32,
}

impl HttpImageResolver {
    /// Create a resolver. Images are shrunk to fit a table cell with
    /// `margin` padding on both sides.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(timeout: Duration, margin: f32) -> Self {
        Self {
            pipeline: ImageLoaderPipeline::new(),
            store: ImageStore::new(),
            timeout,
            max_side: (CELL_WIDTH - 2.0 * margin).max(1.0) as u32,
        }
    }

    /// Largest width or height a stored image can have.
    #[must_use]
    pub const fn max_side(&self) -> u32 {
        self.max_side
    }

    /// The decoded images.
    #[must_use]
    pub const fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Drop all decoded images (on navigation).
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Decode already-fetched bytes and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Decode`] if the bytes are not a supported image.
    pub fn load_bytes(&mut self, url: &str, bytes: &[u8]) -> Result<ResolvedImage, ImageError> {
        let image = self
            .pipeline
            .decode(bytes, strip_url_decorations(url))
            .map_err(ImageError::Decode)?;
        let image = fit_within(image, self.max_side);
        let (width, height) = (image.width(), image.height());
        let handle = self.store.insert(image);
        Ok(ResolvedImage {
            width,
            height,
            handle,
        })
    }
}

impl ImageResolver for HttpImageResolver {
    fn resolve(&mut self, url: &str) -> Result<ResolvedImage, ImageError> {
        warn_url_decorations(url);
        let bytes = fetch_bytes(url, self.timeout).map_err(|e| ImageError::Fetch(e.to_string()))?;
        self.load_bytes(url, &bytes)
    }
}
