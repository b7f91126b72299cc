//! Configuration management for the backup pipeline.
//!
//! Loads configuration from a TOML file; every field has a default so a
//! partial file (or none at all) still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Content store API base URL
    #[serde(default = "default_store_url")]
    pub base_url: String,

    /// Bearer token for the content store API
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Object storage gateway base URL
    #[serde(default = "default_storage_url")]
    pub base_url: String,

    /// Bucket holding customer media
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Bearer token for the storage gateway
    #[serde(default)]
    pub token: String,

    /// Host fragment a URL must contain to count as storage-hosted media
    #[serde(default = "default_media_host_fragment")]
    pub media_host_fragment: String,

    /// Path fragment a URL must contain to count as storage-hosted media
    #[serde(default = "default_media_path_fragment")]
    pub media_path_fragment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Prefix for the per-import destination namespace
    #[serde(default = "default_restored_prefix")]
    pub restored_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_store_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_storage_url() -> String {
    "http://localhost:5000/storage/v1".to_string()
}

fn default_bucket() -> String {
    "media".to_string()
}

fn default_media_host_fragment() -> String {
    "supabase".to_string()
}

fn default_media_path_fragment() -> String {
    "/object/public/".to_string()
}

fn default_restored_prefix() -> String {
    "restored".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            base_url: default_store_url(),
            token: String::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            base_url: default_storage_url(),
            bucket: default_bucket(),
            token: String::new(),
            media_host_fragment: default_media_host_fragment(),
            media_path_fragment: default_media_path_fragment(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            restored_prefix: default_restored_prefix(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            base_url = "https://api.example.com"
            token = "secret"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.base_url, "https://api.example.com");
        assert_eq!(config.storage.bucket, "media");
        assert_eq!(config.backup.restored_prefix, "restored");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store.base_url, "http://localhost:4000");
        assert_eq!(config.storage.media_path_fragment, "/object/public/");
        assert_eq!(config.log.level, "info");
    }
}
