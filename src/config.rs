//! Settings loaded from YAML
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! endpoint: https://api.github.com
//! per_page: 100
//! timeout_secs: 30
//! backoff:
//!   seed_secs: 5
//!   multiplier: 2
//!   ceiling_secs: 1800
//! token_placement: query
//! page_order: completion
//! requests_per_second: 10
//! cache_dir: /var/cache/starfetch
//! ```

use crate::error::{Error, Result};
use crate::http::{BackoffPolicy, ClientConfig, ThrottleConfig};
use crate::types::{PageOrder, TokenPlacement, DEFAULT_ENDPOINT, DEFAULT_PER_PAGE};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "STARFETCH_HOME";

// ============================================================================
// Settings
// ============================================================================

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API root
    pub endpoint: String,

    /// Page size, 1 to 100
    pub per_page: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent override
    pub user_agent: Option<String>,

    /// Backoff while the quota is exhausted
    pub backoff: BackoffSettings,

    /// Where the access token goes
    pub token_placement: TokenPlacement,

    /// Order of downloaded collections
    pub page_order: PageOrder,

    /// Client-side pacing; off when unset
    pub requests_per_second: Option<u32>,

    /// Cache directory; defaults under the data directory
    pub cache_dir: Option<PathBuf>,

    /// Preference file; defaults under the data directory
    pub preferences_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout_secs: 30,
            user_agent: None,
            backoff: BackoffSettings::default(),
            token_placement: TokenPlacement::default(),
            page_order: PageOrder::default(),
            requests_per_second: None,
            cache_dir: None,
            preferences_path: None,
        }
    }
}

/// Backoff settings in whole seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    /// Initial wait; the first retry waits twice this
    pub seed_secs: u64,
    /// Growth factor per retry
    pub multiplier: u32,
    /// Upper bound on a single wait
    pub ceiling_secs: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        let policy = BackoffPolicy::default();
        Self {
            seed_secs: policy.seed.as_secs(),
            multiplier: policy.multiplier,
            ceiling_secs: policy.ceiling.as_secs(),
        }
    }
}

impl BackoffSettings {
    /// Convert into a backoff policy
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_secs(self.seed_secs),
            Duration::from_secs(self.ceiling_secs),
        )
        .with_multiplier(self.multiplier)
    }
}

impl Settings {
    /// Parse and validate settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = if yaml.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read settings file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", endpoint.scheme()),
            ));
        }

        if !(1..=DEFAULT_PER_PAGE).contains(&self.per_page) {
            return Err(Error::invalid_value(
                "per_page",
                format!("must be between 1 and {DEFAULT_PER_PAGE}"),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be positive"));
        }

        if self.backoff.seed_secs == 0 {
            return Err(Error::invalid_value("backoff.seed_secs", "must be positive"));
        }

        if self.backoff.multiplier < 2 {
            return Err(Error::invalid_value("backoff.multiplier", "must be at least 2"));
        }

        if self.backoff.ceiling_secs < self.backoff.seed_secs {
            return Err(Error::invalid_value(
                "backoff.ceiling_secs",
                "must not be below seed_secs",
            ));
        }

        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be positive",
            ));
        }

        Ok(())
    }

    /// Client configuration for these settings and an optional token
    pub fn client_config(&self, access_token: Option<String>) -> ClientConfig {
        let mut builder = ClientConfig::builder()
            .endpoint(&self.endpoint)
            .per_page(self.per_page)
            .timeout(Duration::from_secs(self.timeout_secs))
            .backoff(self.backoff.policy())
            .token_placement(self.token_placement);

        if let Some(token) = access_token {
            builder = builder.access_token(token);
        }
        if let Some(rps) = self.requests_per_second {
            builder = builder.throttle(ThrottleConfig::per_second(rps));
        }
        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }

    /// Cache directory, explicit or under the data directory
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match self.cache_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("cache")),
        }
    }

    /// Preference file, explicit or under the data directory
    pub fn preferences_path(&self) -> Result<PathBuf> {
        match self.preferences_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("preferences.json")),
        }
    }
}

/// `$STARFETCH_HOME`, else `starfetch` under the platform data directory
pub fn data_dir() -> Result<PathBuf> {
    resolve_data_dir(std::env::var_os(HOME_ENV), dirs::data_dir())
}

fn resolve_data_dir(home: Option<OsString>, platform: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = home.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    platform
        .map(|dir| dir.join("starfetch"))
        .ok_or_else(|| Error::config(format!("No data directory found; set {HOME_ENV}")))
}
