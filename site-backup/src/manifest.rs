//! Manifest types for backup archives.
//!
//! A manifest is written once per export as `manifest.json` at the top of the
//! archive and round-trips unchanged through import. Field names are a fixed
//! interchange contract (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Archive format version written into every manifest.
pub const MANIFEST_VERSION: &str = "1.0";

/// Backup manifest — serialized as `manifest.json` in each archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    pub backup_id: Uuid,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub stats: BackupStats,
}

/// Aggregate counts derived from the content tree plus the downloaded media
/// set. `media_file_count`/`media_size_bytes` reflect what actually made it
/// into the archive, which may be less than the tree references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupStats {
    pub page_count: usize,
    pub block_count: usize,
    pub media_file_count: usize,
    pub media_size_bytes: u64,
    pub has_theme: bool,
    pub has_navigation: bool,
}

impl BackupManifest {
    /// Build a fresh manifest for an export run
    pub fn new(
        customer_id: &str,
        domain: Option<String>,
        description: Option<String>,
        stats: BackupStats,
    ) -> Self {
        Self {
            backup_id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            domain,
            created_at: Utc::now(),
            version: MANIFEST_VERSION.to_string(),
            description,
            stats,
        }
    }
}

/// Derive backup stats from a content tree and the media that was actually
/// downloaded.
pub fn derive_stats(tree: &Value, media_file_count: usize, media_size_bytes: u64) -> BackupStats {
    let pages = tree.get("pages").and_then(|v| v.as_array());

    let page_count = pages.map(|p| p.len()).unwrap_or(0);
    let block_count = pages
        .map(|p| {
            p.iter()
                .filter_map(|page| page.get("blocks").and_then(|b| b.as_array()))
                .map(|blocks| blocks.len())
                .sum()
        })
        .unwrap_or(0);

    BackupStats {
        page_count,
        block_count,
        media_file_count,
        media_size_bytes,
        has_theme: tree.get("theme").is_some_and(|v| !v.is_null()),
        has_navigation: tree.get("navigation").is_some_and(|v| !v.is_null()),
    }
}

/// The customer's domain as recorded at the top of the content tree, if any.
pub fn domain_of(tree: &Value) -> Option<String> {
    tree.get("domain")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_stats_counts_pages_and_blocks() {
        let tree = json!({
            "domain": "example.com",
            "theme": { "primaryColor": "#336699" },
            "pages": [
                { "title": "Home", "blocks": [{}, {}] },
                { "title": "About", "blocks": [{}, {}] },
                { "title": "Contact", "blocks": [{}, {}] },
            ],
        });

        let stats = derive_stats(&tree, 4, 1024);
        assert_eq!(stats.page_count, 3);
        assert_eq!(stats.block_count, 6);
        assert_eq!(stats.media_file_count, 4);
        assert_eq!(stats.media_size_bytes, 1024);
        assert!(stats.has_theme);
        assert!(!stats.has_navigation);
    }

    #[test]
    fn test_derive_stats_empty_tree() {
        let stats = derive_stats(&json!({}), 0, 0);
        assert_eq!(stats.page_count, 0);
        assert_eq!(stats.block_count, 0);
        assert!(!stats.has_theme);
        assert!(!stats.has_navigation);
    }

    #[test]
    fn test_manifest_wire_names() {
        let manifest = BackupManifest::new(
            "cust-1",
            Some("example.com".into()),
            None,
            BackupStats::default(),
        );
        let json = serde_json::to_value(&manifest).unwrap();

        assert!(json.get("backupId").is_some());
        assert_eq!(json["customerId"], "cust-1");
        assert_eq!(json["version"], MANIFEST_VERSION);
        assert!(json.get("createdAt").is_some());
        assert!(json["stats"].get("mediaFileCount").is_some());
        // Unset optionals are omitted entirely
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_minimal_manifest_parses() {
        let minimal = json!({
            "backupId": "3e0c53f2-7f54-4a0e-9f19-4b1b86b2e0aa",
            "customerId": "cust-1",
            "version": "1.0",
        });

        let manifest: BackupManifest = serde_json::from_value(minimal).unwrap();
        assert_eq!(manifest.customer_id, "cust-1");
        assert!(manifest.domain.is_none());
        assert_eq!(manifest.stats.page_count, 0);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            domain_of(&json!({ "domain": "example.com" })).as_deref(),
            Some("example.com")
        );
        assert!(domain_of(&json!({ "domain": 42 })).is_none());
        assert!(domain_of(&json!({})).is_none());
    }
}
