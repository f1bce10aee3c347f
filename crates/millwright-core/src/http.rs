//! HTTP client abstraction
//!
//! TigerStyle: network transport behind a trait so it can be swapped.
//!
//! The remote MCP client and the LLM client both speak HTTP. They depend on
//! this trait rather than a concrete client so tests can substitute a fake
//! transport (recording requests, injecting failures) without touching the
//! network. The production implementation wraps reqwest and lives in
//! `millwright-tools`.
//!
//! Error variants are split so callers can classify failures: a
//! [`HttpError::ConnectionFailed`] or [`HttpError::Timeout`] is a
//! connection-level fault (potentially retriable by a caller), anything
//! else is a request/protocol fault.

use crate::constants::HTTP_TIMEOUT_MS_DEFAULT;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// HTTP request method
///
/// Only the verbs this workspace actually issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// An outgoing HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: HttpMethod,
    /// Target URL
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpRequest {
    /// Build a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Build a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: Duration::from_millis(HTTP_TIMEOUT_MS_DEFAULT),
        }
    }

    /// Attach a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a JSON body and the matching content type
    pub fn with_json_body(mut self, json: &Value) -> Self {
        self.body = Some(json.to_string());
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response headers (lowercased keys)
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Create a response (primarily for tests and fakes)
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Attach a header (lowercases the key)
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// HTTP transport errors
#[derive(Error, Debug, Clone)]
pub enum HttpError {
    /// The request did not complete within its timeout
    #[error("HTTP request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A connection could not be established
    #[error("HTTP connection failed: {reason}")]
    ConnectionFailed { reason: String },

    /// The request failed for a non-connection reason
    #[error("HTTP request failed: {reason}")]
    RequestFailed { reason: String },

    /// The response body exceeded the accepted size
    #[error("HTTP response too large: {size} bytes (max: {max} bytes)")]
    ResponseTooLarge { size: u64, max: u64 },
}

impl HttpError {
    /// Whether this is a connection-level fault (vs. request/protocol)
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            HttpError::Timeout { .. } | HttpError::ConnectionFailed { .. }
        )
    }
}

/// Result type for HTTP operations
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// Abstract HTTP client
///
/// Implementations must enforce the workspace response-size bound on
/// bodies.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a request
    async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse>;
}
