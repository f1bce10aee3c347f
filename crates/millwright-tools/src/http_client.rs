//! Production HTTP client
//!
//! Wraps reqwest behind the `HttpClient` trait from `millwright-core`.
//! Error mapping preserves the connection/timeout/request split the remote
//! client relies on for failure classification.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use millwright_core::http::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResult,
};
use millwright_core::HTTP_RESPONSE_BYTES_MAX;

/// HTTP client backed by reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new client
    ///
    /// Per-request timeouts come from each [`HttpRequest`]; the builder
    /// itself carries no global timeout.
    pub fn new() -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder = builder.timeout(request.timeout);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout {
                    timeout_ms: request.timeout.as_millis() as u64,
                }
            } else if e.is_connect() {
                HttpError::ConnectionFailed {
                    reason: e.to_string(),
                }
            } else {
                HttpError::RequestFailed {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_ascii_lowercase(), v.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| HttpError::RequestFailed {
                reason: e.to_string(),
            })?;

        if body.len() as u64 > HTTP_RESPONSE_BYTES_MAX {
            return Err(HttpError::ResponseTooLarge {
                size: body.len() as u64,
                max: HTTP_RESPONSE_BYTES_MAX,
            });
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Create the default HTTP client for production wiring
pub fn default_http_client() -> HttpResult<Arc<dyn HttpClient>> {
    Ok(Arc::new(ReqwestClient::new()?))
}
