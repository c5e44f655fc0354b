//! HTTP transport.
//!
//! The adapter only ever needs three things from a response: the status, the
//! `Link` header and the body. [`Transport`] exposes exactly that so the
//! resolution logic can be driven by something other than a real HTTP client.

use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, LINK};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Media type of a transport file.
pub const SDP_MEDIA_TYPE: &str = "application/sdp";

/// HTTP methods the adapter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Patch => "PATCH",
        })
    }
}

/// A fully-addressed outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Overrides the default `Accept` header.
    pub accept: Option<String>,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            accept: None,
            body: None,
        }
    }

    #[must_use]
    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            url: url.into(),
            accept: None,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// The parts of an HTTP response the adapter consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// All `Link` header values, comma-joined.
    pub link: Option<String>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into [`AdapterError::Remote`].
    pub fn error_for_status(self) -> AdapterResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(AdapterError::Remote {
            status: self.status,
            message: remote_message(self.status, &self.body),
        })
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> AdapterResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Composes an error message from an NMOS error document
/// (`{"code": ..., "error": ..., "debug": ...}`), falling back to the status
/// and raw body.
fn remote_message(status: u16, body: &str) -> String {
    let doc = serde_json::from_str::<Value>(body).ok();
    match doc.as_ref().and_then(Value::as_object) {
        Some(obj) if obj.contains_key("error") => {
            let part = |key: &str| match obj.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "null".to_string(),
            };
            format!("{} - {} - ({})", part("error"), part("code"), part("debug"))
        }
        _ => {
            let body = body.trim();
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            }
        }
    }
}

/// Sends requests on behalf of the adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, returning whatever status the server answered with.
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse>;
}

/// Sends `request` and fails on non-2xx.
pub(crate) async fn fetch(
    transport: &dyn Transport,
    request: &HttpRequest,
) -> AdapterResult<HttpResponse> {
    debug!("{} {}", request.method, request.url);
    transport.send(request).await?.error_for_status()
}

/// GETs `url` and parses the body as JSON.
pub(crate) async fn fetch_json(transport: &dyn Transport, url: &str) -> AdapterResult<Value> {
    fetch(transport, &HttpRequest::get(url)).await?.json()
}

/// GETs `url` as text with the given `Accept` header.
pub(crate) async fn fetch_text(
    transport: &dyn Transport,
    url: &str,
    accept: &str,
) -> AdapterResult<String> {
    let request = HttpRequest::get(url).with_accept(accept);
    Ok(fetch(transport, &request).await?.body)
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout. Unset means requests wait until the caller
    /// drops them.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("nmos-browser/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    pub fn new(config: TransportConfig) -> AdapterResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AdapterError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Patch => self.client.patch(&request.url),
        };
        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            AdapterError::Network(format!("{} {} failed: {e}", request.method, request.url))
        })?;

        let status = response.status().as_u16();
        let links: Vec<&str> = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        let link = (!links.is_empty()).then(|| links.join(", "));

        let body = response.text().await.map_err(|e| {
            AdapterError::Network(format!("failed to read body of {}: {e}", request.url))
        })?;

        Ok(HttpResponse { status, link, body })
    }
}
