//! HTTP transport to the verification gateway.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Parameters of one verification call.
#[derive(Debug, Clone, Copy)]
pub struct VerificationQuery<'a> {
    /// Provider model code.
    pub model_code: &'a str,
    /// Cleaned 15-digit IMEI.
    pub imei: &'a str,
    /// Customer session token, if the caller has one.
    pub session_token: Option<&'a str>,
    /// Customer phone number, if supplied.
    pub phone_number: Option<&'a str>,
}

impl VerificationQuery<'_> {
    /// Query-string pairs in the order the gateway documents them.
    #[must_use]
    pub fn params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("model_code", self.model_code), ("imei", self.imei)];
        if let Some(token) = self.session_token {
            params.push(("session_token", token));
        }
        if let Some(phone) = self.phone_number {
            params.push(("phone", phone));
        }
        params
    }
}

/// Raw gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, undecoded.
    pub body: String,
}

impl GatewayResponse {
    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out")]
    Timeout,
    /// Connection refused, DNS failure, TLS failure, or body read failure.
    #[error("request failed: {0}")]
    Request(String),
}

/// Sends verification queries.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Issue one call. No retries.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, query: &VerificationQuery<'_>) -> Result<GatewayResponse, TransportError>;
}

/// `reqwest`-backed GET transport.
#[derive(Debug, Clone)]
pub struct HttpGatewayTransport {
    client: Client,
    url: String,
}

impl HttpGatewayTransport {
    /// Create a transport for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tradein-gate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::Error::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl GatewayTransport for HttpGatewayTransport {
    async fn send(&self, query: &VerificationQuery<'_>) -> Result<GatewayResponse, TransportError> {
        debug!("Calling verification gateway for model {}", query.model_code);

        let response = self
            .client
            .get(&self.url)
            .query(&query.params())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(GatewayResponse { status, body })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}
