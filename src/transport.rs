//! The HTTP transport capability the client consumes.
//!
//! The client never talks to the network itself: it builds a
//! [`TransportRequest`] and hands it to a [`Transport`]. [`ReqwestTransport`]
//! is the default implementation; tests and embedders can supply their own.

use crate::config::Credentials;
use crate::metadata::Verb;
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use std::time::Duration;
use url::Url;

/// A fully-prepared request, ready to be sent.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// `GET` puts `params` in the query string, `POST` in a form body.
    pub verb: Verb,
    /// The method URL, without query string.
    pub url: Url,
    /// Sent as HTTP basic auth.
    pub credentials: Credentials,
    /// Encoded parameters, output format included.
    pub params: Vec<(String, String)>,
}

/// The status, headers and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// A failure inside the transport (connection refused, TLS, timeout...).
///
/// The underlying error is kept as the source and its message is shown
/// unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
    timeout: bool,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
            timeout: false,
        }
    }

    /// Marks the failure as a timeout.
    pub fn timed_out(mut self) -> Self {
        self.timeout = true;
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout
    }

    /// Returns the underlying error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let timeout = error.is_timeout();
        let err = TransportError::new(error);
        if timeout {
            err.timed_out()
        } else {
            err
        }
    }
}

/// Sends prepared requests over HTTP.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request. Non-2xx statuses are returned as responses, not
    /// errors; the client classifies them.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// The default transport, backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http_client))
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            timeout: None,
        }
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.verb.to_method(), request.url)
            .basic_auth(
                request.credentials.api_key(),
                Some(request.credentials.api_secret()),
            );

        builder = match request.verb {
            Verb::Get => builder.query(&request.params),
            Verb::Post => builder.form(&request.params),
        };

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
