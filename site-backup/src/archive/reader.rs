//! Archive unpacking.

use crate::archive::{ArchiveContents, CONTENT_ENTRY, MANIFEST_ENTRY, MEDIA_DIR};
use crate::error::{BackupError, Result};
use bytes::Bytes;
use std::io::Read;

/// Unpack a tar.zst backup archive into its raw members.
///
/// Performs no validation beyond being able to walk the container; missing
/// documents come back as `None` and are judged by the validator. Entries
/// outside the three known members are ignored.
pub fn read_archive(bytes: &[u8]) -> Result<ArchiveContents> {
    let decoder = zstd::stream::Decoder::new(bytes)
        .map_err(|e| BackupError::Archive(format!("Zstd decoder creation failed: {}", e)))?;
    let mut archive = tar::Archive::new(decoder);

    let mut contents = ArchiveContents::default();
    let media_prefix = format!("{}/", MEDIA_DIR);

    for entry_result in archive
        .entries()
        .map_err(|e| BackupError::Archive(format!("Cannot read archive entries: {}", e)))?
    {
        let mut entry =
            entry_result.map_err(|e| BackupError::Archive(format!("Entry read failed: {}", e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .map_err(|e| BackupError::Archive(format!("Entry path error: {}", e)))?
            .to_string_lossy()
            .to_string();

        if name == MANIFEST_ENTRY {
            contents.manifest = Some(read_string(&mut entry)?);
        } else if name == CONTENT_ENTRY {
            contents.content = Some(read_string(&mut entry)?);
        } else if let Some(file_name) = name.strip_prefix(&media_prefix) {
            if file_name.is_empty() || file_name.contains('/') {
                continue;
            }
            // The declared entry size is untrusted input; cap the
            // pre-allocation and let the vector grow with actual bytes read
            let mut data = Vec::with_capacity(entry.size().min(64 * 1024) as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| BackupError::Archive(format!("Media entry read failed: {}", e)))?;
            contents.media.insert(file_name.to_string(), Bytes::from(data));
        }
    }

    Ok(contents)
}

fn read_string<R: Read>(entry: &mut R) -> Result<String> {
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| BackupError::Archive(format!("Document entry read failed: {}", e)))?;
    Ok(content)
}
