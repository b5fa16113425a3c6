//! Tutoria Upload Library
//!
//! The upload orchestrator for the tutoria subsystem. [`UploadService`]
//! selects a storage provider by name, applies configured defaults, fans out
//! single/multiple/named-field uploads with per-file failure isolation, and
//! resolves identifiers or previously issued URLs back to provider-native
//! keys for delete, info, signed-URL, and existence checks.

pub mod error;
mod pipeline;
pub mod service;

// Re-export commonly used types
pub use error::UploadError;
pub use service::UploadService;
