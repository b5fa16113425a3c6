use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::storage_types::ProviderKind;

/// A single file handed to the upload subsystem.
///
/// Multipart parsing is the HTTP layer's job; by the time a request reaches
/// this subsystem it is already a buffer plus declared metadata. The request
/// is owned by the call stack and discarded when the call returns.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
}

impl UploadRequest {
    pub fn new(
        data: Vec<u8>,
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        UploadRequest {
            data,
            original_filename: original_filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// Per-call upload options. `None` fields fall back to configured defaults.
#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    /// Target provider; `None` selects the process-wide default.
    pub provider: Option<ProviderKind>,
    /// Logical namespace for the upload ("profile", "resume", ...), used as
    /// the key prefix.
    pub upload_type: Option<String>,
    /// Override the configured image-optimization toggle.
    pub optimize: Option<bool>,
    /// Override the configured thumbnail toggle.
    pub thumbnail: Option<bool>,
    /// Arbitrary caller context (e.g. associated entity id), logged with the
    /// upload but never persisted by this subsystem.
    pub metadata: HashMap<String, String>,
}

/// Successful upload record returned to the caller.
///
/// Not persisted here: callers store the returned URL against their own
/// entities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResult {
    /// Generated collision-resistant filename the artifact was stored under.
    pub file_name: String,
    pub original_filename: String,
    /// Content type as stored (optimization may re-encode).
    pub content_type: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Hex digest of the original input bytes, for duplicate detection.
    pub content_hash: String,
    /// Provider-native identifier (path / object key / public id).
    pub storage_key: String,
    pub provider: ProviderKind,
    pub uploaded_at: DateTime<Utc>,
}

/// One file's failure inside a batch or named upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadFailure {
    pub original_filename: String,
    /// Named-upload field this file was submitted under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub error: String,
}

/// Per-file sub-result of a batch or named upload.
///
/// One file's failure never aborts its siblings; failed entries carry the
/// original filename and error message instead of raising.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Success(UploadResult),
    Failure(UploadFailure),
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success(_))
    }

    pub fn as_success(&self) -> Option<&UploadResult> {
        match self {
            FileOutcome::Success(result) => Some(result),
            FileOutcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&UploadFailure> {
        match self {
            FileOutcome::Success(_) => None,
            FileOutcome::Failure(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let failure = FileOutcome::Failure(UploadFailure {
            original_filename: "a.pdf".to_string(),
            field: Some("resume".to_string()),
            error: "too large".to_string(),
        });
        assert!(!failure.is_success());
        assert!(failure.as_success().is_none());
        assert_eq!(failure.as_failure().unwrap().original_filename, "a.pdf");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let failure = FileOutcome::Failure(UploadFailure {
            original_filename: "a.pdf".to_string(),
            field: None,
            error: "too large".to_string(),
        });
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["status"], "failure");
        assert!(json.get("field").is_none());
    }
}
