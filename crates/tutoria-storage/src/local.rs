use crate::traits::{StorageError, StorageProvider, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tutoria_core::models::{FileInfo, SignedOperation};
use tutoria_core::{LocalConfig, ProviderKind, ProviderLimits};

/// Local filesystem storage provider
///
/// Always constructible, which is why it doubles as the fallback when the
/// configured default provider is unusable. It has no native URL signing:
/// `signed_url` returns the direct URL with no expiry enforcement.
#[derive(Clone)]
pub struct LocalProvider {
    base_path: PathBuf,
    base_url: String,
    limits: ProviderLimits,
}

impl LocalProvider {
    /// Create a new LocalProvider, creating the base directory if needed.
    pub async fn new(config: &LocalConfig) -> StorageResult<Self> {
        let base_path = PathBuf::from(&config.base_path);

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalProvider {
            base_path,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limits: config.limits.clone(),
        })
    }

    /// Convert a storage key to a filesystem path with security validation.
    ///
    /// Keys containing traversal sequences or absolute components are
    /// rejected so no key can escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key must be a relative path".to_string(),
            ));
        }

        let relative = Path::new(storage_key);
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(StorageError::InvalidKey(
                        "Storage key resolves outside storage directory".to_string(),
                    ));
                }
            }
        }

        Ok(self.base_path.join(relative))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn limits(&self) -> &ProviderLimits {
        &self.limits
    }

    fn validate_config(&self) -> bool {
        !self.base_url.is_empty() && !self.base_path.as_os_str().is_empty()
    }

    async fn put_object(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn delete_object(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        // Delete of a missing file is success for this backend.
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn object_info(&self, storage_key: &str) -> StorageResult<FileInfo> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let meta = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let last_modified = meta
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(FileInfo {
            storage_key: storage_key.to_string(),
            size_bytes: meta.len(),
            content_type: tutoria_core::mime::content_type_for_path(storage_key),
            last_modified,
            url: self.public_url(storage_key),
            provider: ProviderKind::Local,
        })
    }

    async fn signed_url(
        &self,
        storage_key: &str,
        _operation: SignedOperation,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // No native signing capability: the direct URL is returned and the
        // expiry is not enforced.
        self.key_to_path(storage_key)?;
        Ok(self.public_url(storage_key))
    }

    async fn exists(&self, storage_key: &str) -> bool {
        match self.key_to_path(storage_key) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url, storage_key)
    }

    fn resolve_key(&self, identifier: &str) -> String {
        let prefix = format!("{}/", self.base_url);
        match identifier.strip_prefix(&prefix) {
            Some(key) => key.to_string(),
            None => identifier.to_string(),
        }
    }

    fn matches_url(&self, url: &str) -> bool {
        !self.base_url.is_empty() && url.starts_with(&format!("{}/", self.base_url))
    }
}
