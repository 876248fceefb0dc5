//! Cache types and the cache trait

use crate::error::Result;
use crate::types::{Record, Records};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a cached collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "subject", rename_all = "snake_case")]
pub enum CacheKey {
    /// Stargazers of `owner/repo`
    Stargazers(String),
    /// Projects starred by a user
    Starred(String),
}

impl CacheKey {
    /// Collection kind, e.g. `stargazers`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stargazers(_) => "stargazers",
            Self::Starred(_) => "starred",
        }
    }

    /// Repository or user the collection belongs to
    pub fn subject(&self) -> &str {
        match self {
            Self::Stargazers(subject) | Self::Starred(subject) => subject,
        }
    }

    /// File name safe for any subject, e.g. `stargazers-owner%2Frepo.json`
    pub fn file_name(&self) -> String {
        let subject: String = url::form_urlencoded::byte_serialize(self.subject().as_bytes()).collect();
        format!("{}-{}.json", self.kind(), subject)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.subject())
    }
}

/// A stored collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCollection {
    /// Which collection this is
    pub key: CacheKey,
    /// When it was stored
    pub saved_at: DateTime<Utc>,
    /// The records
    pub records: Records,
}

impl CachedCollection {
    /// Snapshot `records` under `key`, stamped now
    pub fn new(key: CacheKey, records: &[Record]) -> Self {
        Self {
            key,
            saved_at: Utc::now(),
            records: records.to_vec(),
        }
    }
}

/// Storage for completed collections
#[async_trait]
pub trait CollectionCache: Send + Sync + fmt::Debug {
    /// Check if this cache can be used at all
    fn is_supported(&self) -> bool;

    /// Load a collection; `Ok(None)` on a miss
    async fn load(&self, key: &CacheKey) -> Result<Option<Records>>;

    /// Store a collection, replacing any earlier one
    async fn store(&self, key: &CacheKey, records: &[Record]) -> Result<()>;
}

/// Cache that is never supported
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl CollectionCache for NoCache {
    fn is_supported(&self) -> bool {
        false
    }

    async fn load(&self, _key: &CacheKey) -> Result<Option<Records>> {
        Ok(None)
    }

    async fn store(&self, _key: &CacheKey, _records: &[Record]) -> Result<()> {
        Ok(())
    }
}
