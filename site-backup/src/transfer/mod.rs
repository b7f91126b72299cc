//! Media transfer: fetching referenced assets and pushing restored copies.

pub mod http;

use crate::error::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use http::HttpMediaStorage;

/// Access to the object storage holding customer media.
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Fetch a media asset by its public URL
    async fn download(&self, url: &str) -> Result<Bytes>;

    /// Store a blob at `path` and return its new public URL.
    /// Never overwrites an existing object; a path collision fails the call.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String>;
}

/// Final path segment of a URL with any query string or fragment stripped.
/// Returns None for URLs that end in a slash or have no path.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    let rest = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let (_, path) = rest.split_once('/')?;

    let name = path.rsplit('/').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Collision-resistant destination path for a restored media file.
pub fn restored_object_path(namespace: &str, file_name: &str, at: DateTime<Utc>) -> String {
    format!("{}/{}-{}", namespace, at.timestamp_millis(), file_name)
}

/// MIME type for a media file name, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
