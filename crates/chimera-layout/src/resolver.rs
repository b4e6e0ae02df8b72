//! Image resolution.
//!
//! The layout engine never fetches or decodes bytes. It hands a URL to an
//! [`ImageResolver`] and keeps the returned dimensions and handle. Scheme
//! filtering happens in the engine, before the resolver is called.

use chimera_common::ImageHandle;
use serde::Serialize;

/// A successfully resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedImage {
    /// Width in pixels, after any downscaling the resolver applies.
    pub width: u32,
    /// Height in pixels, after any downscaling the resolver applies.
    pub height: u32,
    /// Handle the draw step uses to find the pixels again.
    pub handle: ImageHandle,
}

/// Why an image could not be resolved.
///
/// The engine treats every variant the same way; the distinction only shows
/// up in the diagnostics text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// Network or file access failed (including timeouts).
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The bytes could not be decoded as an image.
    #[error("decode failed: {0}")]
    Decode(String),
    /// Image loading is turned off for this session.
    #[error("image loading disabled")]
    Disabled,
}

/// Image resolution service.
///
/// Calls are blocking from the engine's point of view: layout of the current
/// element waits for the answer. Any timeout is the resolver's own.
pub trait ImageResolver {
    /// Resolve `url` (always an absolute `http`/`https` URL) to an image.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] if the image cannot be fetched or decoded.
    fn resolve(&mut self, url: &str) -> Result<ResolvedImage, ImageError>;
}

/// A resolver that never loads anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineImageResolver;

impl ImageResolver for OfflineImageResolver {
    fn resolve(&mut self, _url: &str) -> Result<ResolvedImage, ImageError> {
        Err(ImageError::Disabled)
    }
}
