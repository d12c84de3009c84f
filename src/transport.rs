//! HTTP transport abstraction.
//!
//! The adapter talks to providers through an injectable transport so tests
//! (and callers with their own HTTP stack) can observe the final URL,
//! headers and body, or return a synthetic response without going through
//! `reqwest`. The body stays an opaque byte payload at this level; the
//! codec layer interprets it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// Transport-level request data for JSON POST requests.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// One outbound HTTP call under a deadline.
///
/// Implementations must return within `timeout` or surface
/// [`TransportError::Timeout`]; the adapter additionally enforces the
/// deadline from the outside, so a transport that ignores it is still
/// bounded.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Default transport backed by a shared `reqwest::Client` (connection
/// pooling comes with the client).
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(timeout)
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}
