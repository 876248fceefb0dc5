//! Rate limit tracking
//!
//! [`RateLimit`] is the quota snapshot parsed from every response,
//! [`RateLimitFeed`] broadcasts the latest snapshot to subscribers, and
//! [`Throttle`] is an optional governor token bucket for pacing requests
//! before the remote quota is ever hit.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::watch;

/// Header carrying the request quota for the current window
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Header carrying the requests left in the current window
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Quota snapshot taken from a single response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per window
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
}

impl RateLimit {
    /// Create a snapshot
    pub fn new(limit: u64, remaining: u64) -> Self {
        Self { limit, remaining }
    }

    /// Parse the snapshot from response headers.
    ///
    /// Returns `None` when neither header is present. A missing or
    /// unparsable value on its own counts as zero.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = headers.get(LIMIT_HEADER);
        let remaining = headers.get(REMAINING_HEADER);
        if limit.is_none() && remaining.is_none() {
            return None;
        }

        Some(Self {
            limit: parse_count(limit),
            remaining: parse_count(remaining),
        })
    }

    /// No requests left in this window
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl std::fmt::Display for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remaining, self.limit)
    }
}

fn parse_count(value: Option<&HeaderValue>) -> u64 {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Latest-value broadcast of rate limit snapshots
///
/// Publishing never blocks and never fails; subscribers only ever see the
/// most recent snapshot.
#[derive(Debug, Clone)]
pub struct RateLimitFeed {
    sender: Arc<watch::Sender<Option<RateLimit>>>,
}

impl RateLimitFeed {
    /// Create a feed with no snapshot yet
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the current snapshot and wake subscribers
    pub fn publish(&self, snapshot: RateLimit) {
        self.sender.send_replace(Some(snapshot));
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Option<RateLimit>> {
        self.sender.subscribe()
    }

    /// Most recent snapshot, if any response carried one
    pub fn latest(&self) -> Option<RateLimit> {
        *self.sender.borrow()
    }
}

impl Default for RateLimitFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for proactive request pacing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl ThrottleConfig {
    /// Create a new throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Pace at `requests_per_second` with an equal burst
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second)
    }
}

/// Token bucket shared by every request of one client
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Create a throttle with the given config
    pub fn new(config: &ThrottleConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request may be sent
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to take a permit without waiting
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish()
    }
}
