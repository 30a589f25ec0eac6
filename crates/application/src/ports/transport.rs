//! HTTP transport port

use std::collections::BTreeMap;

use async_trait::async_trait;
use gatehouse_domain::HttpMethod;
use serde_json::Value;

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    /// Headers to send.
    pub headers: BTreeMap<String, String>,
    /// Query parameters.
    pub query: BTreeMap<String, String>,
    /// JSON body.
    pub body: Option<Value>,
    /// Timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Whatever came back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures where no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Host could not be reached.
    #[error("connection failed: {0}")]
    Unreachable(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Anything else below HTTP.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the raw response.
    ///
    /// Non-2xx statuses are returned as `Ok`; only failures without a
    /// response are `Err`.
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}
