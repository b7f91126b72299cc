//! Pre-import archive validation.
//!
//! Checks run in a fixed order and the first fatal error aborts the rest;
//! warnings accumulate and never block an import on their own.

use crate::archive::{read_archive, ArchiveContents};
use crate::manifest::BackupManifest;
use serde::Serialize;
use serde_json::Value;

/// Outcome of validating one archive against one target customer.
/// Produced fresh per call, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<BackupManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id_matches: Option<bool>,
}

impl ValidationResult {
    fn fatal(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
            manifest: None,
            customer_id_matches: None,
        }
    }
}

/// Validate a backup archive before import.
pub fn validate_backup(archive: &[u8], expected_customer_id: &str) -> ValidationResult {
    let contents = match read_archive(archive) {
        Ok(contents) => contents,
        Err(e) => {
            return ValidationResult::fatal(vec![format!("Archive is not readable: {}", e)]);
        }
    };

    validate_contents(&contents, expected_customer_id)
}

/// Validate already-unpacked archive contents.
///
/// Split out so import can unpack once and reuse the members afterwards.
pub fn validate_contents(
    contents: &ArchiveContents,
    expected_customer_id: &str,
) -> ValidationResult {
    // Both documents must exist before anything else is worth checking
    let mut missing = Vec::new();
    if contents.manifest.is_none() {
        missing.push("Archive is missing manifest.json".to_string());
    }
    if contents.content.is_none() {
        missing.push("Archive is missing content.json".to_string());
    }
    if !missing.is_empty() {
        return ValidationResult::fatal(missing);
    }

    let manifest_raw = contents.manifest.as_deref().unwrap_or_default();
    let manifest_value: Value = match serde_json::from_str(manifest_raw) {
        Ok(value) => value,
        Err(e) => {
            return ValidationResult::fatal(vec![format!("Manifest does not parse: {}", e)]);
        }
    };

    let missing_fields: Vec<&str> = ["backupId", "customerId", "version"]
        .into_iter()
        .filter(|field| {
            manifest_value
                .get(field)
                .map(|v| v.is_null())
                .unwrap_or(true)
        })
        .collect();
    if !missing_fields.is_empty() {
        return ValidationResult::fatal(vec![format!(
            "Manifest is missing required fields: {}",
            missing_fields.join(", ")
        )]);
    }

    let manifest: BackupManifest = match serde_json::from_value(manifest_value) {
        Ok(manifest) => manifest,
        Err(e) => {
            return ValidationResult::fatal(vec![format!("Manifest does not parse: {}", e)]);
        }
    };

    let mut warnings = Vec::new();
    let matches = manifest.customer_id == expected_customer_id;
    if !matches {
        warnings.push(format!(
            "Backup belongs to customer {} but the target is {}",
            manifest.customer_id, expected_customer_id
        ));
    }

    let content_raw = contents.content.as_deref().unwrap_or_default();
    let content: Value = match serde_json::from_str(content_raw) {
        Ok(value) => value,
        Err(e) => {
            let mut result =
                ValidationResult::fatal(vec![format!("Content document does not parse: {}", e)]);
            result.warnings = warnings;
            result.manifest = Some(manifest);
            result.customer_id_matches = Some(matches);
            return result;
        }
    };

    let has_pages = content
        .get("pages")
        .and_then(|v| v.as_array())
        .map(|pages| !pages.is_empty())
        .unwrap_or(false);
    if !has_pages {
        warnings.push("No pages found in content document".to_string());
    }

    ValidationResult {
        is_valid: true,
        errors: Vec::new(),
        warnings,
        manifest: Some(manifest),
        customer_id_matches: Some(matches),
    }
}
