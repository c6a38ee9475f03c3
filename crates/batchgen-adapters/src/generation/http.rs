//! Shared blocking HTTP helpers for the backends.

use std::time::Duration;

use batchgen_core::GenerationError;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

pub(super) fn build_client(timeout: Duration) -> Result<Client, GenerationError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Connection(format!("Failed to build HTTP client: {e}")))
}

/// Maps a transport failure: unreachable or slow services are connection
/// errors, anything else is a generation error.
pub(super) fn transport_error(service: &str, e: &reqwest::Error) -> GenerationError {
    if e.is_connect() || e.is_timeout() {
        GenerationError::Connection(format!("{service} unreachable: {e}"))
    } else {
        GenerationError::Generation(format!("{service} request failed: {e}"))
    }
}

/// Returns the response unchanged on a 2xx status.
pub(super) fn ensure_success(service: &str, response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(GenerationError::Generation(format!(
        "{service} returned {}: {}",
        status.as_u16(),
        body.trim()
    )))
}

/// Parses a successful JSON response body.
pub(super) fn parse_response<T: DeserializeOwned>(
    service: &str,
    response: Response,
) -> Result<T, GenerationError> {
    let response = ensure_success(service, response)?;
    response
        .json::<T>()
        .map_err(|e| GenerationError::Generation(format!("{service} sent a malformed response: {e}")))
}
