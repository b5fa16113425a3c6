//! Tutoria Storage Library
//!
//! Storage provider abstraction and backends for the upload subsystem:
//! local filesystem, S3-compatible object storage, and the CDN image
//! service. Every backend implements the [`StorageProvider`] trait so the
//! upload pipeline stays oblivious to backend details.
//!
//! # Storage key format
//!
//! Keys are upload-type scoped: `{upload_type}/{filename}`. A thumbnail
//! lives next to its primary artifact as `{upload_type}/thumb_{filename}`;
//! this sibling naming is how delete and info predict a thumbnail's
//! existence without a separate index. Keys must not contain `..` or a
//! leading `/`. Key construction is centralized in the `keys` module.

pub mod cdn;
pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cdn::CdnProvider;
pub use factory::create_provider;
pub use local::LocalProvider;
pub use s3::S3Provider;
pub use traits::{StorageError, StorageProvider, StorageResult};
pub use tutoria_core::ProviderKind;
