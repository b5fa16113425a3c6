//! File-type categories and named-field upload contracts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Coarse file-type category derived from a declared content type.
///
/// Classification follows fixed precedence: image, video, audio, document,
/// archive, text, other. The category (not the raw MIME string) is what
/// named-field restrictions check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Text,
    Other,
}

const DOCUMENT_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/rtf",
];

const ARCHIVE_CONTENT_TYPES: &[&str] = &[
    "application/zip",
    "application/x-tar",
    "application/gzip",
    "application/x-7z-compressed",
    "application/vnd.rar",
    "application/x-rar-compressed",
];

impl FileCategory {
    pub fn classify(content_type: &str) -> Self {
        let mime = content_type.trim().to_lowercase();
        if mime.starts_with("image/") {
            FileCategory::Image
        } else if mime.starts_with("video/") {
            FileCategory::Video
        } else if mime.starts_with("audio/") {
            FileCategory::Audio
        } else if DOCUMENT_CONTENT_TYPES.contains(&mime.as_str()) {
            FileCategory::Document
        } else if ARCHIVE_CONTENT_TYPES.contains(&mime.as_str()) {
            FileCategory::Archive
        } else if mime.starts_with("text/") {
            FileCategory::Text
        } else {
            FileCategory::Other
        }
    }
}

impl Display for FileCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Document => "document",
            FileCategory::Archive => "archive",
            FileCategory::Text => "text",
            FileCategory::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Count and type constraints for one logical upload field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldContract {
    pub max_count: usize,
    pub allowed: Vec<FileCategory>,
}

impl FieldContract {
    pub fn new(max_count: usize, allowed: Vec<FileCategory>) -> Self {
        FieldContract { max_count, allowed }
    }

    pub fn allows(&self, category: FileCategory) -> bool {
        self.allowed.contains(&category)
    }
}

/// Default named-field contracts for the LMS upload surface.
pub fn default_field_contracts() -> BTreeMap<String, FieldContract> {
    let mut contracts = BTreeMap::new();
    contracts.insert(
        "profile".to_string(),
        FieldContract::new(1, vec![FileCategory::Image]),
    );
    contracts.insert(
        "resume".to_string(),
        FieldContract::new(1, vec![FileCategory::Document]),
    );
    contracts.insert(
        "certificate".to_string(),
        FieldContract::new(5, vec![FileCategory::Image, FileCategory::Document]),
    );
    contracts.insert(
        "course".to_string(),
        FieldContract::new(
            10,
            vec![
                FileCategory::Image,
                FileCategory::Video,
                FileCategory::Audio,
                FileCategory::Document,
                FileCategory::Archive,
                FileCategory::Text,
            ],
        ),
    );
    contracts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(FileCategory::classify("image/png"), FileCategory::Image);
        assert_eq!(FileCategory::classify("video/mp4"), FileCategory::Video);
        assert_eq!(FileCategory::classify("audio/mpeg"), FileCategory::Audio);
        assert_eq!(
            FileCategory::classify("application/pdf"),
            FileCategory::Document
        );
        assert_eq!(
            FileCategory::classify("application/zip"),
            FileCategory::Archive
        );
        assert_eq!(FileCategory::classify("text/plain"), FileCategory::Text);
        assert_eq!(
            FileCategory::classify("application/octet-stream"),
            FileCategory::Other
        );
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(FileCategory::classify("IMAGE/JPEG"), FileCategory::Image);
        assert_eq!(
            FileCategory::classify("Application/PDF"),
            FileCategory::Document
        );
    }

    #[test]
    fn test_csv_classifies_as_text() {
        // text/* comes after the document table in the precedence order
        assert_eq!(FileCategory::classify("text/csv"), FileCategory::Text);
    }

    #[test]
    fn test_field_contract_allows() {
        let contract = FieldContract::new(1, vec![FileCategory::Image]);
        assert!(contract.allows(FileCategory::Image));
        assert!(!contract.allows(FileCategory::Document));
    }

    #[test]
    fn test_default_contracts() {
        let contracts = default_field_contracts();
        assert_eq!(contracts["profile"].max_count, 1);
        assert!(contracts["resume"].allows(FileCategory::Document));
        assert!(!contracts["resume"].allows(FileCategory::Image));
        assert_eq!(contracts["course"].max_count, 10);
    }
}
