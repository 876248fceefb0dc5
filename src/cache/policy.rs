//! Caching policy
//!
//! Decided once at startup: caching is on when the cache is supported and
//! the user has not turned it off. Cache failures never fail a download; a
//! load error is a miss and a store error is only logged.

use super::types::{CacheKey, CollectionCache, NoCache};
use crate::prefs::Preferences;
use crate::types::{Record, Records};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache plus the on/off switch in front of it
#[derive(Debug, Clone)]
pub struct CachePolicy {
    cache: Arc<dyn CollectionCache>,
    enabled: Arc<AtomicBool>,
}

impl CachePolicy {
    /// Select the policy for `cache` given the stored preferences
    pub fn select(cache: Arc<dyn CollectionCache>, preferences: &Preferences) -> Self {
        let supported = cache.is_supported();
        let enabled = supported && preferences.cache_enabled();
        debug!(
            "Caching {} (supported: {}, preference: {:?})",
            if enabled { "enabled" } else { "disabled" },
            supported,
            preferences.cache_enabled
        );
        Self {
            cache,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Policy with no cache at all
    pub fn disabled() -> Self {
        Self {
            cache: Arc::new(NoCache),
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if lookups and stores go to the cache
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Check if the underlying cache is usable
    pub fn is_supported(&self) -> bool {
        self.cache.is_supported()
    }

    /// Turn caching on or off; returns the resulting state.
    ///
    /// Turning it on has no effect when the cache is not supported.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let enabled = enabled && self.is_supported();
        self.enabled.store(enabled, Ordering::SeqCst);
        enabled
    }

    /// Cached collection for `key`, if caching is on and one is stored
    pub async fn lookup(&self, key: &CacheKey) -> Option<Records> {
        if !self.is_enabled() {
            return None;
        }

        match self.cache.load(key).await {
            Ok(Some(records)) => {
                info!("Cache hit for {}: {} records", key, records.len());
                Some(records)
            }
            Ok(None) => {
                debug!("Cache miss for {}", key);
                None
            }
            Err(e) => {
                warn!("Failed to load cached {}: {}", key, e);
                None
            }
        }
    }

    /// Store a completed collection, if caching is on
    pub async fn save(&self, key: &CacheKey, records: &[Record]) {
        if !self.is_enabled() {
            return;
        }

        if let Err(e) = self.cache.store(key, records).await {
            warn!("Failed to cache {}: {}", key, e);
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
