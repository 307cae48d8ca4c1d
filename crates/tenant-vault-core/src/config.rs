//! Vault configuration.
//!
//! Deserializable from TOML (or any serde format):
//!
//! ```toml
//! cache_dir = "/var/cache/tenant-vault"
//!
//! [storage]
//! bucket = "tenant-dbs"
//! root = "/srv/objects"
//!
//! [sync]
//! interval_seconds = 300
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Default auto-sync period.
pub const DEFAULT_SYNC_INTERVAL_SECONDS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Directory holding plaintext tenant databases while loaded.
    pub cache_dir: PathBuf,
    pub storage: StorageSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    pub bucket: String,
    /// Root directory for the local object store backend.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    pub interval_seconds: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECONDS,
        }
    }
}

impl VaultConfig {
    pub fn new(cache_dir: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            storage: StorageSection {
                bucket: bucket.into(),
                root: None,
            },
            sync: SyncSection::default(),
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_seconds)
    }

    /// Check required settings.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` for an empty bucket, an empty cache
    /// directory, or a zero sync interval.
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(VaultError::Validation(
                "Storage bucket name is required".to_string(),
            ));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(VaultError::Validation(
                "Cache directory is required".to_string(),
            ));
        }
        if self.sync.interval_seconds == 0 {
            return Err(VaultError::Validation(
                "Sync interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = VaultConfig::new("/tmp/cache", "bucket");
        assert!(config.validate().is_ok());
        assert_eq!(config.sync_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_missing_bucket_is_validation_error() {
        let config = VaultConfig::new("/tmp/cache", "");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_empty_cache_dir_rejected() {
        let config = VaultConfig::new("", "bucket");
        assert!(matches!(
            config.validate(),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = VaultConfig::new("/tmp/cache", "bucket");
        config.sync.interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: VaultConfig = serde_json::from_str(
            r#"{"cache_dir": "/c", "storage": {"bucket": "b", "root": "/objects"}}"#,
        )
        .unwrap();
        assert_eq!(config.storage.root, Some(PathBuf::from("/objects")));
        assert_eq!(config.sync.interval_seconds, DEFAULT_SYNC_INTERVAL_SECONDS);
    }
}
