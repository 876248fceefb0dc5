//! Preference store implementation
//!
//! Provides file-based preference persistence with atomic writes.

use super::types::Preferences;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store for persisting and loading preferences
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    /// Path to the preference file
    path: PathBuf,
    /// Current preferences (cached)
    prefs: Arc<RwLock<Preferences>>,
}

impl PreferenceStore {
    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self::in_memory_with(Preferences::default())
    }

    /// Create an in-memory store holding `prefs`
    pub fn in_memory_with(prefs: Preferences) -> Self {
        Self {
            path: PathBuf::new(),
            prefs: Arc::new(RwLock::new(prefs)),
        }
    }

    /// Create a store from a file, loading existing preferences if present
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let prefs = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::preferences(format!("Failed to parse preference file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                return Err(Error::preferences(format!("Failed to read preference file: {e}")))
            }
        };

        Ok(Self {
            path,
            prefs: Arc::new(RwLock::new(prefs)),
        })
    }

    /// Save current preferences to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let prefs = self.prefs.read().await;
        let contents = serde_json::to_string_pretty(&*prefs)
            .map_err(|e| Error::preferences(format!("Failed to serialize preferences: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::preferences(format!("Failed to create preference directory: {e}"))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::preferences(format!("Failed to write preference file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::preferences(format!("Failed to rename preference file: {e}")))?;

        Ok(())
    }

    /// Snapshot of the current preferences
    pub async fn get(&self) -> Preferences {
        self.prefs.read().await.clone()
    }

    /// Stored access token
    pub async fn access_token(&self) -> Option<String> {
        self.prefs.read().await.token().map(ToString::to_string)
    }

    /// Set or clear the access token and save
    pub async fn set_access_token(&self, token: Option<String>) -> Result<()> {
        self.prefs.write().await.set_token(token);
        self.save().await
    }

    /// Set the caching preference and save
    pub async fn set_cache_enabled(&self, enabled: bool) -> Result<()> {
        self.prefs.write().await.cache_enabled = Some(enabled);
        self.save().await
    }

    /// Get the preference file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}
