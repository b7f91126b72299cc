//! Content tree handling.
//!
//! A content tree is a schema-free nested JSON document (pages, blocks,
//! theme, navigation) owned by the content store. The pipeline works on an
//! owned deep copy and never writes through to the live document.

pub mod extract;

pub use extract::{extract_media_references, MediaUrlMatcher, MEDIA_FIELD_NAMES};
