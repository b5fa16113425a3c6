//! Storage provider abstraction
//!
//! This module defines the StorageProvider trait that all storage backends
//! must implement.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use tutoria_core::models::{FileInfo, SignedOperation};
use tutoria_core::{ProviderKind, ProviderLimits};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage provider abstraction
///
/// All storage backends (local filesystem, S3-compatible object storage,
/// CDN image service) implement this trait. The upload pipeline works with
/// any backend without coupling to implementation details; backend SDK error
/// types never cross this boundary.
///
/// **Key format:** keys are upload-type scoped: `{upload_type}/{filename}`.
/// See the crate root documentation.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Provider kind, used for registry lookup and result records.
    fn kind(&self) -> ProviderKind;

    /// Size ceiling and allowed content types enforced before any I/O.
    fn limits(&self) -> &ProviderLimits;

    /// Pure presence check of required credentials/paths. Used at startup
    /// and before per-request provider selection.
    fn validate_config(&self) -> bool;

    /// Persist bytes under `storage_key` and return the public URL.
    async fn put_object(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete the object at `storage_key`.
    ///
    /// Delete-of-missing semantics are provider-documented: the local and
    /// CDN backends treat it as success, the S3 backend returns
    /// [`StorageError::NotFound`].
    async fn delete_object(&self, storage_key: &str) -> StorageResult<()>;

    /// Resolve size, content type, timestamps, and canonical URL for a
    /// stored object. Returns [`StorageError::NotFound`] if absent.
    async fn object_info(&self, storage_key: &str) -> StorageResult<FileInfo>;

    /// Generate a time-limited access URL.
    ///
    /// Backends without native signing for the requested operation return
    /// the direct URL (local) or a configuration error (CDN write URLs);
    /// when the direct URL is returned, expiry is not enforced.
    async fn signed_url(
        &self,
        storage_key: &str,
        operation: SignedOperation,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Whether an object exists. Never errors: any resolution failure is
    /// reported as `false`.
    async fn exists(&self, storage_key: &str) -> bool;

    /// Public URL for a storage key.
    fn public_url(&self, storage_key: &str) -> String;

    /// Reverse-map a previously issued URL to the native storage key, or
    /// pass a native key through unchanged.
    ///
    /// Malformed or foreign inputs are tolerated by treating the whole
    /// string as an opaque key.
    fn resolve_key(&self, identifier: &str) -> String;

    /// Whether `url` matches this provider's URL shape. Each provider owns
    /// its own pattern so new backends never touch shared dispatch logic.
    fn matches_url(&self, url: &str) -> bool;
}
