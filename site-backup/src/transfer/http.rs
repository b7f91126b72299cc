//! HTTP client for the object storage gateway.

use crate::config::StorageConfig;
use crate::error::{BackupError, Result};
use crate::transfer::MediaStorage;
use bytes::Bytes;
use tracing::debug;

/// Production storage gateway client.
///
/// Downloads go straight to the asset's public URL; uploads go through the
/// gateway's object API with upsert disabled, so an existing object at the
/// same path fails that single upload.
pub struct HttpMediaStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    token: String,
}

impl HttpMediaStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        }
    }

    /// Publicly addressable URL for an object in the media bucket.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait::async_trait]
impl MediaStorage for HttpMediaStorage {
    async fn download(&self, url: &str) -> Result<Bytes> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(BackupError::Transfer(format!(
                "Download of {} failed with status {}",
                url,
                resp.status()
            )));
        }

        Ok(resp.bytes().await?)
    }

    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, path);
        debug!(path = %path, bytes = data.len(), "Uploading media object");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BackupError::Storage(format!(
                "Upload of {} failed with status {}",
                path,
                resp.status()
            )));
        }

        Ok(self.public_url(path))
    }
}
