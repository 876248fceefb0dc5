//! Cache module
//!
//! Completed collections are cached per repository or user and served back
//! without touching the network.
//!
//! # Overview
//!
//! - `CollectionCache` - storage trait
//! - `MemoryCache` / `FileCache` / `NoCache` - implementations
//! - `CachePolicy` - caching on/off switch selected at startup

mod file;
mod memory;
mod policy;
mod types;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use policy::CachePolicy;
pub use types::{CacheKey, CachedCollection, CollectionCache, NoCache};
