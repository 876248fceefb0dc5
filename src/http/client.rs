//! Rate-limited request unit
//!
//! [`ApiClient`] issues one logical request for one page:
//! - status 200 resolves with the envelope
//! - status 403 with an exhausted quota backs off and re-issues the same
//!   request, forever, with the wait capped by the [`BackoffPolicy`]
//! - any other status is a terminal [`Error::HttpStatus`]
//! - transport failures are returned immediately
//!
//! Every response carrying rate limit headers is published on the client's
//! [`RateLimitFeed`], whatever the outcome.

use super::backoff::{BackoffPolicy, Timer, TokioTimer};
use super::rate_limit::{RateLimitFeed, Throttle, ThrottleConfig};
use super::transport::{Envelope, ReqwestTransport, Transport};
use crate::error::{Error, Result};
use crate::types::{TokenPlacement, DEFAULT_ENDPOINT, DEFAULT_PER_PAGE};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.github.com`
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Page size used for list endpoints
    pub per_page: u32,
    /// Backoff applied while the quota is exhausted
    pub backoff: BackoffPolicy,
    /// Access token, if any
    pub access_token: Option<String>,
    /// Where the access token goes
    pub token_placement: TokenPlacement,
    /// Optional client-side pacing
    pub throttle: Option<ThrottleConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            per_page: DEFAULT_PER_PAGE,
            backoff: BackoffPolicy::default(),
            access_token: None,
            token_placement: TokenPlacement::default(),
            throttle: None,
            user_agent: format!("starfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for the client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API root
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the page size
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.config.per_page = per_page;
        self
    }

    /// Set the backoff policy
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.config.backoff = policy;
        self
    }

    /// Set the access token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Set where the access token goes
    pub fn token_placement(mut self, placement: TokenPlacement) -> Self {
        self.config.token_placement = placement;
        self
    }

    /// Enable client-side pacing
    pub fn throttle(mut self, config: ThrottleConfig) -> Self {
        self.config.throttle = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// A request for one page of one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    handler: String,
    params: Vec<(String, String)>,
}

impl EndpointRequest {
    /// Create a request for `handler`, e.g. `users/alice/starred`
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            params: Vec::new(),
        }
    }

    /// Set a query parameter, replacing an earlier value for the same key
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Set `per_page` and `page`
    #[must_use]
    pub fn page(self, page: u32, per_page: u32) -> Self {
        self.param("per_page", per_page).param("page", page)
    }

    /// Handler path
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Query parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Rate-limit-aware client for single-page requests
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    timer: Arc<dyn Timer>,
    config: ClientConfig,
    rate_limits: RateLimitFeed,
    throttle: Option<Throttle>,
}

impl ApiClient {
    /// Create a client using reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let throttle = config.throttle.as_ref().map(Throttle::new);
        Self {
            transport,
            timer: Arc::new(TokioTimer),
            config,
            rate_limits: RateLimitFeed::new(),
            throttle,
        }
    }

    /// Replace the timer used for backoff sleeps
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Feed of rate limit snapshots seen by this client
    pub fn rate_limits(&self) -> &RateLimitFeed {
        &self.rate_limits
    }

    /// Check if client-side pacing is enabled
    pub fn has_throttle(&self) -> bool {
        self.throttle.is_some()
    }

    /// Issue `request`, backing off while the quota is exhausted
    pub async fn request(&self, request: &EndpointRequest) -> Result<Envelope> {
        let url = self.build_url(request)?;
        let headers = self.request_headers()?;
        let mut backoff = self.config.backoff.start();

        loop {
            if let Some(ref throttle) = self.throttle {
                throttle.wait().await;
            }

            let envelope = self.transport.get(&url, &headers).await?;

            let rate_limit = envelope.rate_limit();
            if let Some(snapshot) = rate_limit {
                self.rate_limits.publish(snapshot);
            }

            match envelope.status {
                200 => {
                    debug!("Request succeeded: GET {}", request.handler());
                    return Ok(envelope);
                }
                403 if rate_limit.is_some_and(|r| r.is_exhausted()) => {
                    let wait = backoff.next_wait();
                    warn!(
                        "Rate limit exhausted for {}, retry {} in {}s",
                        request.handler(),
                        backoff.attempt(),
                        wait.as_secs()
                    );
                    self.timer.sleep(wait).await;
                }
                status => {
                    debug!("Request failed with {}: GET {}", status, request.handler());
                    return Err(Error::http_status(status, envelope.body));
                }
            }
        }
    }

    /// Build the full URL for a request
    pub fn build_url(&self, request: &EndpointRequest) -> Result<Url> {
        let handler = request.handler().trim_matches('/');
        if handler.is_empty() {
            return Err(Error::invalid_request("handler must not be empty"));
        }

        let base = self.config.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{handler}"))?;

        let token = match self.config.token_placement {
            TokenPlacement::Query => self.config.access_token.as_deref(),
            TokenPlacement::Header => None,
        };

        if !request.params().is_empty() || token.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.params() {
                pairs.append_pair(key, value);
            }
            if let Some(token) = token {
                pairs.append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let (TokenPlacement::Header, Some(token)) =
            (self.config.token_placement, &self.config.access_token)
        {
            let value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|_| Error::invalid_value("access_token", "not a valid header value"))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.config.endpoint)
            .field("per_page", &self.config.per_page)
            .field("has_token", &self.config.access_token.is_some())
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}
