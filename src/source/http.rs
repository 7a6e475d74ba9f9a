//! HTTP client for fetching a goroutine dump from a running process.
//!
//! Typically pointed at `http://host:port/debug/pprof/goroutine?debug=2`.

use crate::utils::config::DEFAULT_FETCH_TIMEOUT;
use crate::utils::error::SourceError;
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use std::time::Duration;

/// Blocking client that streams a dump body
pub struct DumpClient {
    client: Client,
}

impl DumpClient {
    /// Create a new client with the default timeout
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::RequestFailed)?;

        Ok(Self { client })
    }

    /// GET the dump at `url`
    ///
    /// The returned response implements `Read`; the body is streamed as the
    /// parser consumes it rather than buffered up front.
    pub fn fetch(&self, url: &str) -> Result<Response, SourceError> {
        info!("Fetching stack dump from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(SourceError::RequestFailed)?;

        let status = response.status();
        debug!("HTTP {} from {}", status, url);

        if !status.is_success() {
            return Err(SourceError::BadStatus {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(response)
    }
}
