//! Backup orchestration.
//!
//! `BackupPipeline` ties the pieces together: content store, reference
//! extraction, media transfer, archive packing/unpacking, and progress
//! reporting. One invocation is one logical thread of control; media moves
//! one item at a time so failure isolation and progress stay trivial to
//! reason about.

pub mod export;
pub mod import;

use crate::config::Config;
use crate::content::MediaUrlMatcher;
use crate::store::{ContentStore, HttpContentStore};
use crate::transfer::{HttpMediaStorage, MediaStorage};
use std::sync::Arc;

pub use export::{BackupExport, ExportRequest};
pub use import::BackupImport;

pub struct BackupPipeline {
    store: Arc<dyn ContentStore>,
    media: Arc<dyn MediaStorage>,
    matcher: MediaUrlMatcher,
    restored_prefix: String,
}

impl BackupPipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        media: Arc<dyn MediaStorage>,
        matcher: MediaUrlMatcher,
        restored_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            media,
            matcher,
            restored_prefix: restored_prefix.into(),
        }
    }

    /// Build a pipeline with the production HTTP collaborators.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpContentStore::new(&config.store)),
            Arc::new(HttpMediaStorage::new(&config.storage)),
            MediaUrlMatcher::new(
                config.storage.media_host_fragment.clone(),
                config.storage.media_path_fragment.clone(),
            ),
            config.backup.restored_prefix.clone(),
        )
    }
}
