// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # starfetch
//!
//! Complete collections from the paginated, rate-limited GitHub v3 API.
//!
//! ## Features
//!
//! - **Whole collections**: page 1 announces the last page, the rest are
//!   fetched concurrently and merged
//! - **Rate limit backoff**: quota exhaustion is absorbed with a doubling
//!   wait capped at 30 minutes
//! - **Progress reporting**: every page produces a report; the caller can
//!   stop after the first one
//! - **Caching**: completed collections are stored and served back without
//!   network calls
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starfetch::{ApiClient, CachePolicy, ClientConfig, Control, StarsClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> starfetch::Result<()> {
//!     let api = Arc::new(ApiClient::new(ClientConfig::default())?);
//!     let client = StarsClient::new(api, CachePolicy::disabled());
//!
//!     let stargazers = client
//!         .stargazers("rust-lang/rust", None)
//!         .on_progress(|report| {
//!             println!("{} more records", report.len());
//!             Control::Continue
//!         })
//!         .await?;
//!
//!     println!("{} stargazers", stargazers.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StarsClient                              │
//! │     stargazers(repo)      starred_projects(user)                │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──────┬───────────────┬───────────┐
//! │    Cache     │     PageFetcher      │   Progress    │ Projection│
//! ├──────────────┼──────────────────────┼───────────────┼───────────┤
//! │ Memory       │ Link header          │ Reporter      │ Field set │
//! │ File         │ Fan-out              │ Download      │           │
//! │ Policy       │ Page order           │ Control       │           │
//! └──────────────┴──────────┬───────────┴───────────────┴───────────┘
//!                           │
//! ┌─────────────────────────┴───────────────────────────────────────┐
//! │  ApiClient: Transport │ Backoff │ RateLimitFeed │ Throttle       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for starfetch
#[allow(missing_docs)]
pub mod error;

/// Common types and type aliases
pub mod types;

/// Rate-limited request unit
pub mod http;

/// Link-header pagination
pub mod pagination;

/// Record projection
pub mod projection;

/// Progress-reporting downloads
pub mod progress;

/// Collection caches
pub mod cache;

/// Persisted preferences
pub mod prefs;

/// Stargazer and starred-project downloads
pub mod collections;

/// YAML settings
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use cache::{CacheKey, CachePolicy, CollectionCache, FileCache, MemoryCache, NoCache};
pub use collections::StarsClient;
pub use config::Settings;
pub use http::{ApiClient, BackoffPolicy, ClientConfig, EndpointRequest, RateLimit, RateLimitFeed};
pub use pagination::{FetchOptions, PageFetcher};
pub use prefs::{PreferenceStore, Preferences};
pub use progress::{Control, Download, Event, ProgressReport};
pub use projection::FieldProjection;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
