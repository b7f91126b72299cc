use site_backup::config::{BackupConfig, StorageConfig, StoreConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub max_archive_mb: usize,
    pub store: StoreConfig,
    pub storage: StorageConfig,
    pub backup: BackupConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4500),
            max_archive_mb: std::env::var("MAX_ARCHIVE_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(512),
            store: StoreConfig {
                base_url: std::env::var("STORE_URL")
                    .unwrap_or_else(|_| "http://localhost:4000".into()),
                token: std::env::var("STORE_TOKEN").unwrap_or_default(),
            },
            storage: StorageConfig {
                base_url: std::env::var("STORAGE_URL")
                    .unwrap_or_else(|_| "http://localhost:5000/storage/v1".into()),
                bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "media".into()),
                token: std::env::var("STORAGE_TOKEN").unwrap_or_default(),
                media_host_fragment: std::env::var("MEDIA_HOST_FRAGMENT")
                    .unwrap_or_else(|_| "supabase".into()),
                media_path_fragment: std::env::var("MEDIA_PATH_FRAGMENT")
                    .unwrap_or_else(|_| "/object/public/".into()),
            },
            backup: BackupConfig {
                restored_prefix: std::env::var("RESTORED_PREFIX")
                    .unwrap_or_else(|_| "restored".into()),
            },
        }
    }
}
