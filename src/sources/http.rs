//! Blocking JSON-over-HTTP client shared by all upstream sources

use crate::types::{CountryError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Why a single upstream request produced no data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, timeout or other transport failure (message sanitized)
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("JSON parse error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Thin wrapper over `reqwest::blocking::Client` with a mandatory timeout.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(CountryError::Config("request timeout must be > 0".into()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("countrypop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CountryError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }

    /// GET `url` and decode the JSON body
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, FetchError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(sanitize_network_error(&e)))?;
        Self::decode(response)
    }

    /// POST `body` as JSON to `url` and decode the JSON body
    pub fn post_json<B, T>(&self, url: &str, body: &B) -> std::result::Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| FetchError::Transport(sanitize_network_error(&e)))?;
        Self::decode(response)
    }

    fn decode<T: DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> std::result::Result<T, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut body = response
            .bytes()
            .map_err(|e| FetchError::Transport(sanitize_network_error(&e)))?
            .to_vec();

        simd_json::from_slice(&mut body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Reduce a reqwest error to a short, URL-free description.
fn sanitize_network_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "connection timed out".to_string()
    } else if error.is_connect() {
        "connection refused or unreachable".to_string()
    } else if error.is_decode() {
        "response decode error".to_string()
    } else if error.is_body() {
        "response body error".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_request() {
        "request failed".to_string()
    } else {
        "network error".to_string()
    }
}
