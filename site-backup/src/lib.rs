//! Site Backup Library
//!
//! Export/validate/import pipeline for a multi-tenant content store: packs a
//! customer's content tree plus every referenced media asset into a portable
//! tar.zst archive and restores such archives later.

pub mod archive;
pub mod config;
pub mod content;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod progress;
pub mod store;
pub mod transfer;
pub mod validate;

// Re-export commonly used types
pub use config::Config;
pub use error::BackupError;
pub use error::Result;
pub use executor::BackupPipeline;
pub use manifest::{BackupManifest, BackupStats};
pub use validate::{validate_backup, ValidationResult};
