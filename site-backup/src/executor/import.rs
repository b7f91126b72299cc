//! Import orchestration: archive -> tree/blobs -> store.

use crate::archive::read_archive;
use crate::error::{BackupError, Result};
use crate::executor::BackupPipeline;
use crate::manifest::BackupManifest;
use crate::progress::{band_percent, ProgressSink, Stage, TransferProgress};
use crate::transfer::{content_type_for, restored_object_path};
use crate::validate::validate_contents;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Successful import outcome.
pub struct BackupImport {
    pub manifest: BackupManifest,
    pub media_files_restored: usize,
    /// Validator warnings carried forward for display
    pub warnings: Vec<String>,
}

impl BackupPipeline {
    /// Restore a backup archive into the given customer's content store.
    ///
    /// Media files are re-uploaded to a fresh per-import namespace; a failed
    /// upload is logged and skipped. The content tree is committed exactly as
    /// archived.
    pub async fn import(
        &self,
        archive: &[u8],
        customer_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<BackupImport> {
        info!(customer_id = %customer_id, "Starting backup import");

        sink.report(TransferProgress::at(
            Stage::Validating,
            0,
            "Validating archive",
        ));
        // Decompression is CPU-bound; keep it off the async threads
        let archive_bytes = archive.to_vec();
        let contents = tokio::task::spawn_blocking(move || read_archive(&archive_bytes))
            .await
            .map_err(|e| BackupError::Archive(format!("Unpack task failed: {}", e)))?
            .map_err(|e| BackupError::InvalidArchive(e.to_string()))?;
        let validation = validate_contents(&contents, customer_id);
        if !validation.is_valid {
            return Err(BackupError::InvalidArchive(validation.errors.join("; ")));
        }
        let manifest = validation
            .manifest
            .ok_or_else(|| BackupError::InvalidArchive("Manifest missing after validation".into()))?;
        sink.report(TransferProgress::at(Stage::Validating, 10, "Archive valid"));

        let content_raw = contents
            .content
            .as_deref()
            .ok_or_else(|| BackupError::InvalidArchive("Content document missing".into()))?;
        let tree: Value = serde_json::from_str(content_raw)?;
        sink.report(TransferProgress::at(
            Stage::Extracting,
            20,
            "Content tree unpacked",
        ));

        let namespace = format!(
            "{}/{}-{}",
            customer_id,
            self.restored_prefix,
            Utc::now().format("%Y%m%d%H%M%S"),
        );

        let total = contents.media.len();
        let mut restored: BTreeMap<String, String> = BTreeMap::new();

        for (idx, (file_name, data)) in contents.media.iter().enumerate() {
            sink.report(
                TransferProgress::at(
                    Stage::Restoring,
                    band_percent(20, 80, idx, total),
                    "Restoring media",
                )
                .with_items(Some(file_name.clone()), idx, total),
            );

            let path = restored_object_path(&namespace, file_name, Utc::now());
            match self
                .media
                .upload(&path, data.clone(), content_type_for(file_name))
                .await
            {
                Ok(url) => {
                    debug!(file = %file_name, url = %url, "Media file restored");
                    restored.insert(file_name.clone(), url);
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Media upload failed, skipping");
                }
            }
        }

        sink.report(TransferProgress::at(
            Stage::Committing,
            80,
            "Committing content tree",
        ));

        // TODO: rewrite the tree's embedded media URLs from `restored` once
        // requirements confirm; today the tree is committed with its original
        // URLs and the restored uploads sit unreferenced in the namespace.
        self.store.save_content(customer_id, &tree).await?;

        info!(
            customer_id = %customer_id,
            backup_id = %manifest.backup_id,
            media_files_restored = restored.len(),
            "Backup import complete"
        );
        sink.report(TransferProgress::at(Stage::Complete, 100, "Import complete"));

        Ok(BackupImport {
            manifest,
            media_files_restored: restored.len(),
            warnings: validation.warnings,
        })
    }
}
