//! Collection fetch operations
//!
//! [`StarsClient`] downloads the two supported collections, stargazers of a
//! repository and projects starred by a user, and keeps them in the cache.
//!
//! A cache hit is delivered as a single `(0, 0, N)` progress report followed
//! by the records. On a miss the paginated download runs and every report is
//! relayed to the caller, including the caller's answer to the page-1 report.

use crate::cache::{CacheKey, CachePolicy};
use crate::error::Result;
use crate::http::{ApiClient, RateLimitFeed};
use crate::pagination::{FetchOptions, PageFetcher};
use crate::prefs::PreferenceStore;
use crate::progress::{self, Download, Event, ProgressReport, Reporter};
use crate::projection::FieldProjection;
use crate::types::Records;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the stargazer and starred-project collections
#[derive(Debug, Clone)]
pub struct StarsClient {
    fetcher: PageFetcher,
    cache: CachePolicy,
    preferences: Option<PreferenceStore>,
}

impl StarsClient {
    /// Create a client over `api` with the given caching policy
    pub fn new(api: Arc<ApiClient>, cache: CachePolicy) -> Self {
        Self {
            fetcher: PageFetcher::new(api),
            cache,
            preferences: None,
        }
    }

    /// Persist caching changes to `store`
    #[must_use]
    pub fn with_preferences(mut self, store: PreferenceStore) -> Self {
        self.preferences = Some(store);
        self
    }

    /// Replace the download options
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.fetcher = self.fetcher.with_options(options);
        self
    }

    /// Every stargazer of `repo` (`owner/name`)
    pub fn stargazers(
        &self,
        repo: impl Into<String>,
        projection: Option<FieldProjection>,
    ) -> Download<Records> {
        let repo = repo.into();
        let handler = format!("repos/{repo}/stargazers");
        self.fetch(CacheKey::Stargazers(repo), handler, projection)
    }

    /// Every project starred by `user`
    pub fn starred_projects(
        &self,
        user: impl Into<String>,
        projection: Option<FieldProjection>,
    ) -> Download<Records> {
        let user = user.into();
        let handler = format!("users/{user}/starred");
        self.fetch(CacheKey::Starred(user), handler, projection)
    }

    /// Check if results are currently cached
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Check if the cache can be used at all
    pub fn cache_supported(&self) -> bool {
        self.cache.is_supported()
    }

    /// Turn caching on or off and persist the preference.
    ///
    /// Returns the resulting state, which stays off when the cache is not
    /// supported.
    pub async fn set_caching(&self, enabled: bool) -> Result<bool> {
        let enabled = self.cache.set_enabled(enabled);
        if let Some(ref store) = self.preferences {
            store.set_cache_enabled(enabled).await?;
        }
        info!("Caching {}", if enabled { "enabled" } else { "disabled" });
        Ok(enabled)
    }

    /// Rate limit snapshots observed by the underlying client
    pub fn rate_limits(&self) -> &RateLimitFeed {
        self.fetcher.client().rate_limits()
    }

    fn fetch(
        &self,
        key: CacheKey,
        handler: String,
        projection: Option<FieldProjection>,
    ) -> Download<Records> {
        let (reporter, download) = progress::channel();
        let client = self.clone();

        tokio::spawn(async move {
            if let Some(records) = client.cache.lookup(&key).await {
                reporter.notify(ProgressReport::cached(&records));
                tokio::task::yield_now().await;
                reporter.resolve(records);
                return;
            }

            let upstream = client.fetcher.fetch_all(handler, projection);
            match relay(upstream, &reporter).await {
                Ok(records) => {
                    client.cache.save(&key, &records).await;
                    debug!("Download of {} complete: {} records", key, records.len());
                    reporter.resolve(records);
                }
                Err(e) => reporter.fail(e),
            }
        });

        download
    }
}

/// Forward every report of `upstream` to `reporter`, passing answers back
async fn relay(mut upstream: Download<Records>, reporter: &Reporter<Records>) -> Result<Records> {
    while let Some(event) = upstream.next().await {
        match event {
            Event::Progress(progress) if progress.wants_reply() => {
                let control = reporter.report(progress.report().clone()).await;
                progress.respond(control);
            }
            Event::Progress(progress) => reporter.notify(progress.into_report()),
            Event::Finished(result) => return result,
        }
    }
    Err(crate::error::Error::Abandoned)
}
