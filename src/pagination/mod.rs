//! Pagination module
//!
//! Link-header pagination for list endpoints.
//!
//! # Overview
//!
//! - `LinkTable` - parsed RFC 5988 `Link` header
//! - `relation` - page number of a named relation
//! - `PageMetadata` - `next` and `last` pages of a response
//! - `PageFetcher` - downloads page 1, then every remaining page concurrently

mod fetcher;
mod links;
mod types;

pub use fetcher::{page_records, PageFetcher};
pub use links::relation;
pub use types::{FetchOptions, Link, LinkTable, PageMetadata};
