//! HTTP client for the content store API.

use crate::config::StoreConfig;
use crate::error::{BackupError, Result};
use crate::store::ContentStore;
use serde_json::Value;
use tracing::debug;

/// Production content store client.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpContentStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn content_url(&self, customer_id: &str) -> String {
        format!("{}/customers/{}/content", self.base_url, customer_id)
    }
}

#[async_trait::async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch_content(&self, customer_id: &str) -> Result<Value> {
        let url = self.content_url(customer_id);
        debug!(customer_id = %customer_id, "Fetching content tree");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BackupError::ContentStore(format!(
                "Content fetch for {} failed with status {}",
                customer_id,
                resp.status()
            )));
        }

        Ok(resp.json::<Value>().await?)
    }

    async fn save_content(&self, customer_id: &str, tree: &Value) -> Result<()> {
        let url = self.content_url(customer_id);
        debug!(customer_id = %customer_id, "Saving content tree");

        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(tree)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BackupError::ContentStore(format!(
                "Content save for {} failed with status {}",
                customer_id,
                resp.status()
            )));
        }

        Ok(())
    }
}
