//! Domain models shared across the upload subsystem.

pub mod file_info;
pub mod upload;

pub use file_info::{FileInfo, SignedOperation};
pub use upload::{FileOutcome, UploadFailure, UploadOptions, UploadRequest, UploadResult};
