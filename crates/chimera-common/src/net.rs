//! HTTP fetch utilities for the Chimera browser.
//!
//! Simple blocking HTTP GET wrappers used by navigation and the image
//! resolver. The timeout comes from [`BrowserConfig`](crate::BrowserConfig);
//! layout itself never waits on the network except through the resolver.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("Chimera/", env!("CARGO_PKG_VERSION"));

/// Error fetching a resource over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(StatusCode),
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

fn get(url: &str, timeout: Duration) -> Result<Response, FetchError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(FetchError::Client)?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(FetchError::Request)?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    Ok(response)
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be decoded.
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String, FetchError> {
    log::debug!("GET {url} (text)");
    get(url, timeout)?.text().map_err(FetchError::Body)
}

/// Fetch a URL and return its body as raw bytes.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be read.
pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    log::debug!("GET {url} (bytes)");
    get(url, timeout)?
        .bytes()
        .map(|b| b.to_vec())
        .map_err(FetchError::Body)
}
