//! Tutoria Core Library
//!
//! This crate provides the shared domain models, configuration, and provider
//! types used across the tutoria upload subsystem.

pub mod config;
pub mod contracts;
pub mod mime;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    CdnConfig, ImagePolicy, LocalConfig, ProviderLimits, S3Config, ThumbnailPolicy, UploadConfig,
    MIN_FILE_SIZE_BYTES,
};
pub use contracts::{default_field_contracts, FieldContract, FileCategory};
pub use models::{
    FileInfo, FileOutcome, SignedOperation, UploadFailure, UploadOptions, UploadRequest,
    UploadResult,
};
pub use storage_types::ProviderKind;
