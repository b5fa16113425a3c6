use thiserror::Error;
use tutoria_processing::ValidationError;
use tutoria_storage::StorageError;

/// Upload orchestration errors
///
/// Validation and contract errors are raised before any provider I/O and are
/// never retried. Backend failures arrive wrapped as [`StorageError`]; SDK
/// error shapes never reach callers.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Storage provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Too many files: {count} submitted (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Field '{field}' accepts at most {max} files ({count} submitted)")]
    FieldCountExceeded {
        field: String,
        count: usize,
        max: usize,
    },
}
