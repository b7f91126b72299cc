//! End-to-end pipeline scenarios against in-memory collaborators.

use bytes::Bytes;
use serde_json::{json, Value};
use site_backup::content::MediaUrlMatcher;
use site_backup::error::{BackupError, Result};
use site_backup::executor::{BackupPipeline, ExportRequest};
use site_backup::progress::{NoProgress, Stage, TransferProgress};
use site_backup::store::ContentStore;
use site_backup::transfer::MediaStorage;
use site_backup::validate_backup;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

struct InMemoryStore {
    trees: Mutex<HashMap<String, Value>>,
}

impl InMemoryStore {
    fn with_tree(customer_id: &str, tree: Value) -> Arc<Self> {
        let mut trees = HashMap::new();
        trees.insert(customer_id.to_string(), tree);
        Arc::new(Self {
            trees: Mutex::new(trees),
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            trees: Mutex::new(HashMap::new()),
        })
    }

    fn tree(&self, customer_id: &str) -> Option<Value> {
        self.trees.lock().unwrap().get(customer_id).cloned()
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryStore {
    async fn fetch_content(&self, customer_id: &str) -> Result<Value> {
        self.trees
            .lock()
            .unwrap()
            .get(customer_id)
            .cloned()
            .ok_or_else(|| BackupError::ContentStore(format!("No content for {}", customer_id)))
    }

    async fn save_content(&self, customer_id: &str, tree: &Value) -> Result<()> {
        self.trees
            .lock()
            .unwrap()
            .insert(customer_id.to_string(), tree.clone());
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryMedia {
    /// Downloadable assets keyed by public URL
    assets: HashMap<String, Bytes>,
    /// URLs whose download is forced to fail
    failing: HashSet<String>,
    /// Objects written during import, keyed by destination path
    uploaded: Mutex<HashMap<String, Bytes>>,
}

#[async_trait::async_trait]
impl MediaStorage for InMemoryMedia {
    async fn download(&self, url: &str) -> Result<Bytes> {
        if self.failing.contains(url) {
            return Err(BackupError::Transfer(format!(
                "Download of {} failed with status 404",
                url
            )));
        }
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| BackupError::Transfer(format!("Unknown asset {}", url)))
    }

    async fn upload(&self, path: &str, data: Bytes, _content_type: &str) -> Result<String> {
        let mut uploaded = self.uploaded.lock().unwrap();
        if uploaded.contains_key(path) {
            return Err(BackupError::Storage(format!("Object {} already exists", path)));
        }
        uploaded.insert(path.to_string(), data);
        Ok(format!(
            "https://cdn.supabase.test/storage/v1/object/public/media/{}",
            path
        ))
    }
}

fn matcher() -> MediaUrlMatcher {
    MediaUrlMatcher::new("supabase", "/object/public/")
}

fn media_url(name: &str) -> String {
    format!("https://abc.supabase.co/storage/v1/object/public/media/{name}")
}

fn pipeline(store: Arc<InMemoryStore>, media: Arc<InMemoryMedia>) -> BackupPipeline {
    BackupPipeline::new(store, media, matcher(), "restored")
}

fn sample_tree() -> Value {
    json!({
        "domain": "example.com",
        "theme": { "logo": media_url("logo.svg") },
        "pages": [
            { "title": "Home", "blocks": [
                { "type": "hero", "backgroundImage": media_url("hero.png") },
                { "type": "text", "body": "welcome" },
            ]},
            { "title": "About", "blocks": [{}, {}] },
            { "title": "Contact", "blocks": [
                { "image": media_url("hero.png") },
                {},
            ]},
        ],
    })
}

#[tokio::test]
async fn export_then_import_round_trips_tree_and_media() {
    let tree = sample_tree();
    let store = InMemoryStore::with_tree("cust-1", tree.clone());
    let mut media = InMemoryMedia::default();
    media
        .assets
        .insert(media_url("hero.png"), Bytes::from_static(b"hero-bytes"));
    media
        .assets
        .insert(media_url("logo.svg"), Bytes::from_static(b"<svg/>"));
    let media = Arc::new(media);

    let export = pipeline(store, media.clone())
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: Some("round trip".into()),
            },
            &NoProgress,
        )
        .await
        .unwrap();

    // hero.png is referenced twice but extracted once
    assert_eq!(export.manifest.stats.media_file_count, 2);
    assert_eq!(export.manifest.stats.page_count, 3);
    assert_eq!(export.manifest.stats.block_count, 6);
    assert_eq!(export.manifest.domain.as_deref(), Some("example.com"));
    assert!(export.filename.starts_with("backup-cust-1-"));
    assert!(export.filename.ends_with(".tar.zst"));

    // Restore into a different, empty customer
    let target_store = InMemoryStore::empty();
    let import = pipeline(target_store.clone(), media)
        .import(&export.archive, "cust-2", &NoProgress)
        .await
        .unwrap();

    assert_eq!(import.media_files_restored, 2);
    assert_eq!(import.manifest.backup_id, export.manifest.backup_id);
    // Cross-customer import is permitted but flagged
    assert!(import.warnings.iter().any(|w| w.contains("cust-1")));

    // Committed tree is structurally identical, original URLs included
    assert_eq!(target_store.tree("cust-2").unwrap(), tree);
}

#[tokio::test]
async fn export_skips_failed_downloads() {
    let store = InMemoryStore::with_tree("cust-1", sample_tree());
    let mut media = InMemoryMedia::default();
    media
        .assets
        .insert(media_url("logo.svg"), Bytes::from_static(b"<svg/>"));
    media.failing.insert(media_url("hero.png"));
    let media = Arc::new(media);

    let export = pipeline(store, media)
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: None,
            },
            &NoProgress,
        )
        .await
        .unwrap();

    // The 404 is absorbed; only the surviving asset is archived
    assert_eq!(export.manifest.stats.media_file_count, 1);

    let validation = validate_backup(&export.archive, "cust-1");
    assert!(validation.is_valid);
}

#[tokio::test]
async fn export_fails_without_content() {
    let result = pipeline(InMemoryStore::empty(), Arc::new(InMemoryMedia::default()))
        .export(
            ExportRequest {
                customer_id: "nobody".into(),
                description: None,
            },
            &NoProgress,
        )
        .await;

    assert!(matches!(result, Err(BackupError::ContentStore(_))));
}

#[tokio::test]
async fn import_of_zero_media_archive_still_commits() {
    let tree = json!({ "pages": [{ "title": "Home", "blocks": [] }] });
    let store = InMemoryStore::with_tree("cust-1", tree.clone());
    let media = Arc::new(InMemoryMedia::default());

    let export = pipeline(store, media.clone())
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: None,
            },
            &NoProgress,
        )
        .await
        .unwrap();
    assert_eq!(export.manifest.stats.media_file_count, 0);

    let target_store = InMemoryStore::empty();
    let import = pipeline(target_store.clone(), media)
        .import(&export.archive, "cust-1", &NoProgress)
        .await
        .unwrap();

    assert_eq!(import.media_files_restored, 0);
    assert_eq!(target_store.tree("cust-1").unwrap(), tree);
}

#[tokio::test]
async fn import_rejects_invalid_archive() {
    let result = pipeline(InMemoryStore::empty(), Arc::new(InMemoryMedia::default()))
        .import(b"not an archive", "cust-1", &NoProgress)
        .await;

    match result {
        Err(BackupError::InvalidArchive(_)) => {}
        other => panic!("Expected InvalidArchive, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn progress_stages_through_import() {
    let store = InMemoryStore::with_tree("cust-1", sample_tree());
    let mut media = InMemoryMedia::default();
    media
        .assets
        .insert(media_url("hero.png"), Bytes::from_static(b"hero"));
    media
        .assets
        .insert(media_url("logo.svg"), Bytes::from_static(b"logo"));
    let media = Arc::new(media);

    let export = pipeline(store, media.clone())
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: None,
            },
            &NoProgress,
        )
        .await
        .unwrap();

    let events: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink = move |p: TransferProgress| {
        sink_events.lock().unwrap().push(p);
    };

    pipeline(InMemoryStore::empty(), media)
        .import(&export.archive, "cust-1", &sink)
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first().unwrap().stage, Stage::Validating);
    assert_eq!(events.first().unwrap().percent, 0);
    // The unpack band ends at 20% with the tree extracted from the archive
    assert!(events
        .iter()
        .any(|e| e.stage == Stage::Extracting && e.percent == 20));
    assert!(events.iter().any(|e| e.stage == Stage::Restoring));
    assert!(events.iter().any(|e| e.stage == Stage::Committing));
    assert_eq!(events.last().unwrap().stage, Stage::Complete);
    assert_eq!(events.last().unwrap().percent, 100);
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
}

#[tokio::test]
async fn archive_survives_a_trip_through_disk() {
    let store = InMemoryStore::with_tree("cust-1", sample_tree());
    let mut media = InMemoryMedia::default();
    media
        .assets
        .insert(media_url("hero.png"), Bytes::from_static(b"hero"));
    media
        .assets
        .insert(media_url("logo.svg"), Bytes::from_static(b"logo"));
    let media = Arc::new(media);

    let export = pipeline(store, media.clone())
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: None,
            },
            &NoProgress,
        )
        .await
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(&export.filename);
    std::fs::write(&path, &export.archive).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let validation = validate_backup(&bytes, "cust-1");
    assert!(validation.is_valid);

    let target_store = InMemoryStore::empty();
    let import = pipeline(target_store, media)
        .import(&bytes, "cust-1", &NoProgress)
        .await
        .unwrap();
    assert_eq!(import.media_files_restored, 2);
}

#[tokio::test]
async fn progress_percent_is_monotone_through_export() {
    let store = InMemoryStore::with_tree("cust-1", sample_tree());
    let mut media = InMemoryMedia::default();
    media
        .assets
        .insert(media_url("hero.png"), Bytes::from_static(b"hero"));
    media
        .assets
        .insert(media_url("logo.svg"), Bytes::from_static(b"logo"));
    let media = Arc::new(media);

    let events: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink = move |p: TransferProgress| {
        sink_events.lock().unwrap().push(p);
    };

    pipeline(store, media)
        .export(
            ExportRequest {
                customer_id: "cust-1".into(),
                description: None,
            },
            &sink,
        )
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert!(events.len() >= 4);
    assert_eq!(events.first().unwrap().percent, 0);
    assert_eq!(events.last().unwrap().percent, 100);
    assert_eq!(events.last().unwrap().stage, Stage::Complete);
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
}
