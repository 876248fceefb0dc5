//! In-memory cache

use super::types::{CacheKey, CachedCollection, CollectionCache};
use crate::error::Result;
use crate::types::{Record, Records};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local cache; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<CacheKey, CachedCollection>>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored collections
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Stored entry for `key`, with its timestamp
    pub async fn entry(&self, key: &CacheKey) -> Option<CachedCollection> {
        self.entries.read().await.get(key).cloned()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl CollectionCache for MemoryCache {
    fn is_supported(&self) -> bool {
        true
    }

    async fn load(&self, key: &CacheKey) -> Result<Option<Records>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.records.clone()))
    }

    async fn store(&self, key: &CacheKey, records: &[Record]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.clone(), CachedCollection::new(key.clone(), records));
        Ok(())
    }
}
