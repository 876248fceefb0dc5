//! CLI runner - executes commands

use super::commands::{CacheAction, Cli, Commands, FetchArgs, TokenAction};
use super::output::{mask_token, render};
use crate::cache::{CachePolicy, CollectionCache, FileCache};
use crate::collections::StarsClient;
use crate::config::Settings;
use crate::error::Result;
use crate::http::{ApiClient, RateLimitFeed};
use crate::pagination::FetchOptions;
use crate::prefs::PreferenceStore;
use crate::progress::{Control, Download, ProgressReport};
use crate::types::{OptionStringExt, Records};
use anyhow::Context as _;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Environment variable holding a fallback access token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let settings = self.load_settings()?;
        let prefs = PreferenceStore::from_file(self.preferences_path(&settings)?).await?;

        match &self.cli.command {
            Commands::Stargazers { repo, fetch } => {
                let client = self.stars_client(&settings, &prefs, fetch).await?;
                let download = client.stargazers(repo.as_str(), fetch.fields.clone());
                self.download(&client, download, fetch).await
            }
            Commands::Starred { user, fetch } => {
                let client = self.stars_client(&settings, &prefs, fetch).await?;
                let download = client.starred_projects(user.as_str(), fetch.fields.clone());
                self.download(&client, download, fetch).await
            }
            Commands::Cache { action } => self.cache(&settings, &prefs, *action).await,
            Commands::Token { action } => self.token(&prefs, action).await,
        }
    }

    /// Load settings from `--config`, or defaults
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match self.cli.config {
            Some(ref path) => Settings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(ref dir) = self.cli.cache_dir {
            settings.cache_dir = Some(dir.clone());
        }
        Ok(settings)
    }

    fn preferences_path(&self, settings: &Settings) -> Result<PathBuf> {
        match self.cli.prefs {
            Some(ref path) => Ok(path.clone()),
            None => settings.preferences_path(),
        }
    }

    /// `--token`, else `GITHUB_TOKEN`, else the stored token
    async fn access_token(&self, prefs: &PreferenceStore) -> Option<String> {
        if let Some(token) = self.cli.token.clone().none_if_empty() {
            return Some(token);
        }
        if let Some(token) = std::env::var(TOKEN_ENV).ok().none_if_empty() {
            debug!("Using token from {}", TOKEN_ENV);
            return Some(token);
        }
        prefs.access_token().await
    }

    async fn stars_client(
        &self,
        settings: &Settings,
        prefs: &PreferenceStore,
        fetch: &FetchArgs,
    ) -> Result<StarsClient> {
        let token = self.access_token(prefs).await;
        let api = ApiClient::new(settings.client_config(token))?;

        let cache: Arc<dyn CollectionCache> = Arc::new(FileCache::new(settings.cache_dir()?));
        let policy = CachePolicy::select(cache, &prefs.get().await);

        let order = fetch.page_order.map_or(settings.page_order, Into::into);
        let options = FetchOptions::default()
            .per_page(settings.per_page)
            .order(order);

        Ok(StarsClient::new(Arc::new(api), policy)
            .with_preferences(prefs.clone())
            .with_options(options))
    }

    async fn download(
        &self,
        client: &StarsClient,
        download: Download<Records>,
        fetch: &FetchArgs,
    ) -> Result<()> {
        let watcher = watch_rate_limits(client.rate_limits());
        let max_pages = fetch.max_pages;
        let mut loaded = 0;

        let result = download
            .on_progress(|report| {
                loaded += report.len();
                info!("{}", progress_line(loaded, report));

                match (max_pages, report.total_pages) {
                    (Some(max), Some(total)) if total > max => {
                        warn!("Collection spans {} pages, limit is {}", total, max);
                        Control::Stop
                    }
                    _ => Control::Continue,
                }
            })
            .await;
        watcher.abort();

        let records = result?;
        println!("{}", render(&records, self.cli.format)?);
        Ok(())
    }

    async fn cache(
        &self,
        settings: &Settings,
        prefs: &PreferenceStore,
        action: CacheAction,
    ) -> Result<()> {
        let client = self
            .stars_client(settings, prefs, &FetchArgs::default())
            .await?;

        let enabled = match action {
            CacheAction::Status => client.cache_enabled(),
            CacheAction::Enable => client.set_caching(true).await?,
            CacheAction::Disable => client.set_caching(false).await?,
        };

        let status = json!({
            "supported": client.cache_supported(),
            "enabled": enabled,
            "dir": settings.cache_dir()?,
        });
        println!("{}", render(&status, self.cli.format)?);
        Ok(())
    }

    async fn token(&self, prefs: &PreferenceStore, action: &TokenAction) -> Result<()> {
        match action {
            TokenAction::Set { value } => {
                prefs.set_access_token(Some(value.clone())).await?;
                info!("Token saved to {}", prefs.path().display());
            }
            TokenAction::Clear => {
                prefs.set_access_token(None).await?;
                info!("Token removed from {}", prefs.path().display());
            }
            TokenAction::Show => {
                let token = prefs.access_token().await.map(|t| mask_token(&t));
                println!("{}", render(&json!({ "token": token }), self.cli.format)?);
            }
        }
        Ok(())
    }
}

/// Log every rate limit change until aborted
fn watch_rate_limits(feed: &RateLimitFeed) -> JoinHandle<()> {
    let mut rx = feed.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = *rx.borrow_and_update();
            match snapshot {
                Some(limit) if limit.is_exhausted() => {
                    warn!("Rate limit exhausted ({}), backing off", limit);
                }
                Some(limit) => debug!("Rate limit: {}", limit),
                None => {}
            }
        }
    })
}

fn progress_line(loaded: usize, report: &ProgressReport) -> String {
    match (report.next_page, report.total_pages) {
        (Some(0), Some(0)) => format!("{loaded} records loaded (from cache)"),
        (Some(page), Some(total)) => format!("{loaded} records loaded (page {page} of {total})"),
        _ => format!("{loaded} records loaded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(next: Option<u32>, total: Option<u32>) -> ProgressReport {
        ProgressReport {
            next_page: next,
            total_pages: total,
            per_page: 100,
            data: vec![json!({})],
        }
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(200, &report(Some(2), Some(3))),
            "200 records loaded (page 2 of 3)"
        );
        assert_eq!(
            progress_line(5, &report(Some(0), Some(0))),
            "5 records loaded (from cache)"
        );
        assert_eq!(progress_line(7, &report(None, None)), "7 records loaded");
    }
}
