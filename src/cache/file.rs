//! File-backed cache
//!
//! One pretty-printed JSON file per collection, written to a temp file and
//! renamed into place.

use super::types::{CacheKey, CachedCollection, CollectionCache};
use crate::error::{Error, Result};
use crate::types::{Record, Records};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache storing collections under a directory
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `dir`; the directory is created on demand
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Stored entry for `key`, with its timestamp
    pub async fn entry(&self, key: &CacheKey) -> Result<Option<CachedCollection>> {
        let path = self.path_for(key);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::cache(format!("Failed to read {}: {e}", path.display())))
            }
        };
        let entry: CachedCollection = serde_json::from_str(&contents)
            .map_err(|e| Error::cache(format!("Failed to parse {}: {e}", path.display())))?;

        Ok(Some(entry))
    }

    /// Remove the stored collection for `key`, if any
    pub async fn remove(&self, key: &CacheKey) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::cache(format!("Failed to remove {}: {e}", path.display()))),
        }
    }
}

#[async_trait]
impl CollectionCache for FileCache {
    /// The directory itself is only created by `store`; the nearest existing
    /// ancestor must be a directory.
    fn is_supported(&self) -> bool {
        self.dir
            .ancestors()
            .find_map(|dir| std::fs::metadata(dir).ok())
            .map_or(true, |meta| meta.is_dir())
    }

    async fn load(&self, key: &CacheKey) -> Result<Option<Records>> {
        Ok(self.entry(key).await?.map(|entry| entry.records))
    }

    async fn store(&self, key: &CacheKey, records: &[Record]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::cache(format!("Failed to create cache directory: {e}")))?;

        let entry = CachedCollection::new(key.clone(), records);
        let contents = serde_json::to_string_pretty(&entry)
            .map_err(|e| Error::cache(format!("Failed to serialize {key}: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::cache(format!("Failed to write {}: {e}", temp_path.display())))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::cache(format!("Failed to rename {}: {e}", path.display())))?;

        debug!("Cached {} records for {} at {}", records.len(), key, path.display());
        Ok(())
    }
}
