use crate::traits::{StorageError, StorageProvider, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;
use tutoria_core::models::{FileInfo, SignedOperation};
use tutoria_core::{ProviderKind, ProviderLimits, S3Config};

/// S3-compatible object storage provider
///
/// Delete-of-missing surfaces [`StorageError::NotFound`] for this backend
/// (the object is head-checked before the delete is issued).
#[derive(Clone)]
pub struct S3Provider {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    limits: ProviderLimits,
}

impl S3Provider {
    /// Create a new S3Provider from configuration.
    ///
    /// Credentials are picked up from the environment by the underlying
    /// builder; bucket and region come from [`S3Config`]. A custom
    /// `endpoint` supports S3-compatible providers (MinIO, Spaces, ...).
    pub async fn new(config: &S3Config) -> StorageResult<Self> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
        let region = config.region.clone().ok_or_else(|| {
            StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
        })?;

        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = config.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Provider {
            store,
            bucket,
            region,
            endpoint_url: config.endpoint.clone(),
            limits: config.limits.clone(),
        })
    }

    /// URL prefix shared by every object in this bucket.
    ///
    /// AWS buckets use the virtual-hosted style
    /// `https://{bucket}.s3.{region}.amazonaws.com`; S3-compatible providers
    /// use path style `{endpoint}/{bucket}` for compatibility.
    fn url_prefix(&self) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
        }
    }
}

#[async_trait]
impl StorageProvider for S3Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::S3
    }

    fn limits(&self) -> &ProviderLimits {
        &self.limits
    }

    fn validate_config(&self) -> bool {
        !self.bucket.is_empty() && !self.region.is_empty()
    }

    async fn put_object(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(storage_key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn delete_object(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        // Head first so delete-of-missing is reported as NotFound for this
        // backend instead of being silently absorbed.
        match self.store.head(&location).await {
            Ok(_) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        }

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn object_info(&self, storage_key: &str) -> StorageResult<FileInfo> {
        let location = Path::from(storage_key.to_string());

        let meta = match self.store.head(&location).await {
            Ok(meta) => meta,
            Err(ObjectStoreError::NotFound { .. }) => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        };

        Ok(FileInfo {
            storage_key: storage_key.to_string(),
            size_bytes: meta.size,
            content_type: tutoria_core::mime::content_type_for_path(storage_key),
            last_modified: Some(meta.last_modified),
            url: self.public_url(storage_key),
            provider: ProviderKind::S3,
        })
    }

    async fn signed_url(
        &self,
        storage_key: &str,
        operation: SignedOperation,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let method = match operation {
            SignedOperation::Read => Method::GET,
            SignedOperation::Write => Method::PUT,
        };

        let url_result: ObjectResult<_> = self.store.signed_url(method, &location, expires_in).await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> bool {
        let location = Path::from(storage_key.to_string());
        self.store.head(&location).await.is_ok()
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.url_prefix(), storage_key)
    }

    fn resolve_key(&self, identifier: &str) -> String {
        let prefix = format!("{}/", self.url_prefix());
        match identifier.strip_prefix(&prefix) {
            Some(key) => key.to_string(),
            None => identifier.to_string(),
        }
    }

    fn matches_url(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/", self.url_prefix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_provider(endpoint: Option<&str>) -> S3Provider {
        S3Provider::new(&S3Config {
            bucket: Some("tutoria-media".to_string()),
            region: Some("us-east-1".to_string()),
            endpoint: endpoint.map(String::from),
            limits: ProviderLimits {
                max_file_size: 1024 * 1024,
                allowed_content_types: vec!["image/png".to_string()],
            },
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_aws_url_shape() {
        let provider = test_provider(None).await;
        assert_eq!(
            provider.public_url("profile/a.png"),
            "https://tutoria-media.s3.us-east-1.amazonaws.com/profile/a.png"
        );
        assert!(provider
            .matches_url("https://tutoria-media.s3.us-east-1.amazonaws.com/profile/a.png"));
        assert!(!provider.matches_url("http://localhost:4000/uploads/profile/a.png"));
    }

    #[tokio::test]
    async fn test_endpoint_url_shape() {
        let provider = test_provider(Some("http://localhost:9000")).await;
        assert_eq!(
            provider.public_url("profile/a.png"),
            "http://localhost:9000/tutoria-media/profile/a.png"
        );
    }

    #[tokio::test]
    async fn test_resolve_key() {
        let provider = test_provider(None).await;
        assert_eq!(
            provider.resolve_key(
                "https://tutoria-media.s3.us-east-1.amazonaws.com/course/notes.pdf"
            ),
            "course/notes.pdf"
        );
        assert_eq!(provider.resolve_key("course/notes.pdf"), "course/notes.pdf");
    }

    #[tokio::test]
    async fn test_missing_config_rejected() {
        let result = S3Provider::new(&S3Config {
            bucket: None,
            region: Some("us-east-1".to_string()),
            endpoint: None,
            limits: ProviderLimits {
                max_file_size: 1024,
                allowed_content_types: vec![],
            },
        })
        .await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
