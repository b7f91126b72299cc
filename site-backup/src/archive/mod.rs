//! Backup archive format.
//!
//! A backup is a zstd-compressed tar with exactly three logical members:
//! - `manifest.json`: the backup manifest
//! - `content.json`: the serialized content tree
//! - `media/`: a flat directory of media files named by their source basename
//!
//! An archive is well-formed iff both JSON documents are present and parse;
//! the media directory may be empty.

pub mod reader;
pub mod writer;

use bytes::Bytes;
use std::collections::BTreeMap;

pub use reader::read_archive;
pub use writer::write_archive;

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const CONTENT_ENTRY: &str = "content.json";
pub const MEDIA_DIR: &str = "media";

/// Zstd compression level; moderate trade-off of packing time vs size.
pub const COMPRESSION_LEVEL: i32 = 3;

/// Raw members of an unpacked archive, before any validation.
#[derive(Debug, Default)]
pub struct ArchiveContents {
    /// Raw manifest document, if the entry exists
    pub manifest: Option<String>,

    /// Raw content-tree document, if the entry exists
    pub content: Option<String>,

    /// Media files keyed by basename
    pub media: BTreeMap<String, Bytes>,
}
