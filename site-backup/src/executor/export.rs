//! Export orchestration: store -> tree -> urls -> blobs -> archive.

use crate::archive::write_archive;
use crate::content::extract_media_references;
use crate::error::{BackupError, Result};
use crate::executor::BackupPipeline;
use crate::manifest::{derive_stats, domain_of, BackupManifest};
use crate::progress::{band_percent, ProgressSink, Stage, TransferProgress};
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Parameters for one export run.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub customer_id: String,
    pub description: Option<String>,
}

/// Successful export: the packed archive plus its suggested filename.
pub struct BackupExport {
    pub archive: Vec<u8>,
    pub filename: String,
    pub manifest: BackupManifest,
}

impl BackupPipeline {
    /// Export a customer's content tree and referenced media as one archive.
    ///
    /// A failed media download is logged and skipped; the asset is simply
    /// absent from the archive. Only a content-store failure or a packing
    /// failure aborts the run.
    pub async fn export(
        &self,
        request: ExportRequest,
        sink: &dyn ProgressSink,
    ) -> Result<BackupExport> {
        let customer_id = request.customer_id;
        info!(customer_id = %customer_id, "Starting backup export");

        sink.report(TransferProgress::at(
            Stage::Preparing,
            0,
            "Fetching content tree",
        ));
        let tree = self.store.fetch_content(&customer_id).await?;
        sink.report(TransferProgress::at(
            Stage::Preparing,
            10,
            "Content tree fetched",
        ));

        sink.report(TransferProgress::at(
            Stage::Extracting,
            10,
            "Scanning for media references",
        ));
        let refs = extract_media_references(&tree, &self.matcher);
        let total = refs.len();
        sink.report(TransferProgress::at(
            Stage::Extracting,
            20,
            format!("{} media references found", total),
        ));

        let mut media: BTreeMap<String, Bytes> = BTreeMap::new();
        let mut media_size = 0u64;

        for (idx, url) in refs.iter().enumerate() {
            sink.report(
                TransferProgress::at(
                    Stage::Downloading,
                    band_percent(20, 80, idx, total),
                    "Downloading media",
                )
                .with_items(Some(url.clone()), idx, total),
            );

            match self.media.download(url).await {
                Ok(blob) => {
                    media_size += blob.len() as u64;
                    media.insert(url.clone(), blob);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Media download failed, skipping");
                }
            }
        }

        sink.report(
            TransferProgress::at(Stage::Packing, 80, "Packing archive").with_items(
                None,
                media.len(),
                total,
            ),
        );

        let stats = derive_stats(&tree, media.len(), media_size);
        let manifest = BackupManifest::new(
            &customer_id,
            domain_of(&tree),
            request.description,
            stats,
        );

        let filename = format!(
            "backup-{}-{}.tar.zst",
            customer_id,
            manifest.created_at.format("%Y-%m-%d"),
        );

        // Compression is CPU-bound; keep it off the async threads
        let pack_manifest = manifest.clone();
        let archive = tokio::task::spawn_blocking(move || {
            write_archive(&pack_manifest, &tree, &media)
        })
        .await
        .map_err(|e| BackupError::Archive(format!("Packing task failed: {}", e)))??;

        info!(
            customer_id = %customer_id,
            backup_id = %manifest.backup_id,
            media_files = manifest.stats.media_file_count,
            archive_bytes = archive.len(),
            "Backup export complete"
        );
        sink.report(TransferProgress::at(Stage::Complete, 100, "Export complete"));

        Ok(BackupExport {
            archive,
            filename,
            manifest,
        })
    }
}
