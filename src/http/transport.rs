//! Transport seam
//!
//! The request unit talks to the network only through [`Transport`], which
//! performs one GET and hands back an [`Envelope`]: status, headers and the
//! decoded JSON body. Status codes are not interpreted here.

use super::rate_limit::RateLimit;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LINK};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// One raw response
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded body (`Null` when empty, a JSON string when not JSON)
    pub body: Value,
}

impl Envelope {
    /// Create an envelope without headers
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Add a header, ignoring names or values that are not valid HTTP
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Rate limit snapshot carried by this response
    pub fn rate_limit(&self) -> Option<RateLimit> {
        RateLimit::from_headers(&self.headers)
    }

    /// Raw `Link` header
    pub fn link_header(&self) -> Option<&str> {
        self.headers.get(LINK).and_then(|v| v.to_str().ok())
    }

    /// Consume the envelope, keeping only the body
    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Performs a single GET
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request. Errors are transport failures only; any HTTP
    /// status is returned as an envelope.
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<Envelope>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<Envelope> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await?;

        Ok(Envelope {
            status,
            headers,
            body: decode_body(&text),
        })
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
