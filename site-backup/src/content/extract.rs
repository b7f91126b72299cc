//! Media reference extraction.
//!
//! The content tree has no fixed schema, so media discovery is a recursive
//! walk with heuristic field-name matching rather than a typed schema pass.
//! The allow-list below is deliberately incomplete: a URL stored under an
//! unconventional field name is missed, which costs a media file in the
//! archive but never breaks the export.

use serde_json::Value;
use std::collections::BTreeSet;

/// Field names conventionally used by editors for media-bearing values.
/// Compared case-insensitively against lowercased field names.
pub const MEDIA_FIELD_NAMES: &[&str] = &[
    "url",
    "image",
    "backgroundimage",
    "src",
    "logo",
    "icon",
    "thumbnail",
    "cover",
    "banner",
    "avatar",
    "photo",
    "poster",
    "video",
    "favicon",
    "imageurl",
    "videourl",
];

/// Structural matcher for storage-hosted media URLs: http(s), host contains
/// the storage host fragment, path contains the public-object prefix.
#[derive(Debug, Clone)]
pub struct MediaUrlMatcher {
    host_fragment: String,
    path_fragment: String,
}

impl MediaUrlMatcher {
    pub fn new(host_fragment: impl Into<String>, path_fragment: impl Into<String>) -> Self {
        Self {
            host_fragment: host_fragment.into(),
            path_fragment: path_fragment.into(),
        }
    }

    /// Whether a string value looks like a storage-hosted media URL.
    /// Malformed URLs simply fail to match; they are never errors.
    pub fn matches(&self, candidate: &str) -> bool {
        let rest = match candidate
            .strip_prefix("https://")
            .or_else(|| candidate.strip_prefix("http://"))
        {
            Some(rest) => rest,
            None => return false,
        };

        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host, path),
            None => return false,
        };

        host.contains(&self.host_fragment) && path.contains(&self.path_fragment)
    }
}

/// Walk a content tree and collect every storage-hosted media URL it
/// references. Pure, no I/O; the same URL referenced twice yields one entry.
pub fn extract_media_references(tree: &Value, matcher: &MediaUrlMatcher) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    walk(tree, matcher, &mut refs);
    refs
}

fn walk(node: &Value, matcher: &MediaUrlMatcher, refs: &mut BTreeSet<String>) {
    match node {
        Value::Array(items) => {
            for item in items {
                walk(item, matcher, refs);
            }
        }
        Value::Object(fields) => {
            for (name, value) in fields {
                match value {
                    Value::String(candidate) => {
                        // Only allow-listed field names count at this level
                        if MEDIA_FIELD_NAMES.contains(&name.to_ascii_lowercase().as_str())
                            && matcher.matches(candidate)
                        {
                            refs.insert(candidate.clone());
                        }
                    }
                    // URLs can hide at any depth under any field name
                    _ => walk(value, matcher, refs),
                }
            }
        }
        _ => {}
    }
}
