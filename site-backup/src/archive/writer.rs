//! Archive assembly.

use crate::archive::{COMPRESSION_LEVEL, CONTENT_ENTRY, MANIFEST_ENTRY, MEDIA_DIR};
use crate::error::{BackupError, Result};
use crate::manifest::BackupManifest;
use crate::transfer::file_name_from_url;
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::warn;

/// Pack a manifest, content tree, and downloaded media blobs into a single
/// tar.zst archive.
///
/// Media entries are named by the basename of their source URL. Two distinct
/// URLs sharing a basename overwrite one another inside the archive (last
/// write wins); `media` is keyed by full URL so nothing is lost before this
/// point.
pub fn write_archive(
    manifest: &BackupManifest,
    content_tree: &Value,
    media: &BTreeMap<String, Bytes>,
) -> Result<Vec<u8>> {
    let encoder = zstd::stream::Encoder::new(Vec::new(), COMPRESSION_LEVEL)
        .map_err(|e| BackupError::Archive(format!("Zstd encoder creation failed: {}", e)))?;
    let mut archive = tar::Builder::new(encoder);

    let manifest_json = serde_json::to_string_pretty(manifest)?;
    append_bytes(&mut archive, MANIFEST_ENTRY, manifest_json.as_bytes())?;

    let content_json = serde_json::to_string(content_tree)?;
    append_bytes(&mut archive, CONTENT_ENTRY, content_json.as_bytes())?;

    for (url, blob) in media {
        match file_name_from_url(url) {
            Some(name) => {
                let entry_name = format!("{}/{}", MEDIA_DIR, name);
                append_bytes(&mut archive, &entry_name, blob)?;
            }
            None => {
                warn!(url = %url, "No usable basename for media URL, leaving out of archive");
            }
        }
    }

    let encoder = archive
        .into_inner()
        .map_err(|e| BackupError::Archive(format!("Archive finalization failed: {}", e)))?;
    let bytes = encoder
        .finish()
        .map_err(|e| BackupError::Archive(format!("Zstd finalization failed: {}", e)))?;

    Ok(bytes)
}

/// Append an in-memory blob to a tar archive under the given entry name.
fn append_bytes<W: Write>(archive: &mut tar::Builder<W>, name: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header
        .set_path(name)
        .map_err(|e| BackupError::Archive(format!("Entry path error: {}", e)))?;
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    );
    header.set_cksum();

    archive
        .append(&header, data)
        .map_err(|e| BackupError::Archive(format!("Archive append failed: {}", e)))?;

    Ok(())
}
