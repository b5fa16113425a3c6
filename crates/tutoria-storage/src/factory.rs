//! Provider construction from validated configuration.

use crate::{CdnProvider, LocalProvider, S3Provider, StorageProvider, StorageResult};
use std::sync::Arc;
use tutoria_core::{ProviderKind, UploadConfig};

/// Create a storage provider of the given kind from configuration.
///
/// Returns a `ConfigError` when the kind's required settings are missing so
/// callers can decide between failing startup and skipping registration.
pub async fn create_provider(
    config: &UploadConfig,
    kind: ProviderKind,
) -> StorageResult<Arc<dyn StorageProvider>> {
    match kind {
        ProviderKind::Local => {
            let provider = LocalProvider::new(&config.local).await?;
            Ok(Arc::new(provider))
        }
        ProviderKind::S3 => {
            let provider = S3Provider::new(&config.s3).await?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Cdn => {
            let provider = CdnProvider::new(&config.cdn)?;
            Ok(Arc::new(provider))
        }
    }
}
