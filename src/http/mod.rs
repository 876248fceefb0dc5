//! HTTP module
//!
//! The rate-limited request unit and the collaborators it is built on.
//!
//! # Features
//!
//! - **Backoff on quota exhaustion**: 403 with no remaining quota is retried
//!   with a doubling wait capped at 30 minutes
//! - **Rate limit feed**: every response's quota snapshot is broadcast
//! - **Pluggable transport and timer**: reqwest and tokio in production
//! - **Optional pacing**: governor token bucket, off by default

mod backoff;
mod client;
mod rate_limit;
mod transport;

pub use backoff::{Backoff, BackoffPolicy, Timer, TokioTimer};
pub use client::{ApiClient, ClientConfig, ClientConfigBuilder, EndpointRequest};
pub use rate_limit::{
    RateLimit, RateLimitFeed, Throttle, ThrottleConfig, LIMIT_HEADER, REMAINING_HEADER,
};
pub use transport::{Envelope, ReqwestTransport, Transport};

#[cfg(test)]
mod tests;
