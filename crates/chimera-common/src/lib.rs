//! Common utilities for the Chimera browser.
//!
//! This crate provides shared infrastructure used by all browser components:
//! - **Configuration** - the [`BrowserConfig`] options read by layout and fetch
//! - **Warning System** - deduplicated warnings routed through the `log` facade
//! - **URLs** - scheme checks and relative URL resolution
//! - **Networking** - blocking HTTP GET with a configurable timeout
//! - **Images** - decoded pixel data and the opaque handles layout refers to

pub mod config;
pub mod image;
pub mod net;
pub mod url;
pub mod warning;

pub use config::{BrowserConfig, ConfigError};
pub use image::{ImageHandle, LoadedImage};
