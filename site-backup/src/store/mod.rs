//! Content store collaborator.

pub mod http;

use crate::error::Result;
use serde_json::Value;

pub use http::HttpContentStore;

/// Access to the content store that owns each customer's site document.
///
/// One JSON-like document per customer; the pipeline only ever reads a deep
/// copy or replaces the whole document.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the customer's full content tree
    async fn fetch_content(&self, customer_id: &str) -> Result<Value>;

    /// Replace the customer's content tree
    async fn save_content(&self, customer_id: &str, tree: &Value) -> Result<()>;
}
