use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_types::ProviderKind;

/// Resolved metadata for a stored artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileInfo {
    pub storage_key: String,
    pub size_bytes: u64,
    /// Inferred from the stored extension on backends without a metadata
    /// store.
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub url: String,
    pub provider: ProviderKind,
}

/// Operation a signed URL grants access for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignedOperation {
    Read,
    Write,
}
