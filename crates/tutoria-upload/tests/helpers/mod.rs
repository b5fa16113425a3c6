//! Shared fixtures for upload service integration tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tutoria_core::config::{
    CdnConfig, ImagePolicy, LocalConfig, ProviderLimits, S3Config, ThumbnailPolicy, UploadConfig,
};
use tutoria_core::contracts::default_field_contracts;
use tutoria_core::models::{FileInfo, SignedOperation};
use tutoria_core::ProviderKind;
use tutoria_storage::{StorageProvider, StorageResult};
use tutoria_upload::UploadService;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn limits() -> ProviderLimits {
    ProviderLimits {
        max_file_size: 1024 * 1024, // 1MB
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "application/pdf".to_string(),
            "text/plain".to_string(),
        ],
    }
}

pub fn test_config(base_path: &Path) -> UploadConfig {
    UploadConfig {
        default_provider: ProviderKind::Local,
        local: LocalConfig {
            base_path: base_path.to_string_lossy().to_string(),
            base_url: "http://localhost:4000/uploads".to_string(),
            limits: limits(),
        },
        s3: S3Config {
            bucket: None,
            region: None,
            endpoint: None,
            limits: limits(),
        },
        cdn: CdnConfig {
            api_base: None,
            delivery_url: None,
            zone: None,
            api_key: None,
            api_secret: None,
            limits: limits(),
        },
        image: ImagePolicy {
            enabled: true,
            quality: 80,
            max_width: 1920,
            max_height: 1080,
            format: None,
        },
        thumbnail: ThumbnailPolicy {
            enabled: true,
            width: 32,
            height: 32,
            quality: 70,
        },
        max_files_per_batch: 10,
        default_upload_type: "general".to_string(),
        field_contracts: default_field_contracts(),
    }
}

pub async fn local_service(base_path: &Path) -> UploadService {
    UploadService::from_config(Arc::new(test_config(base_path)))
        .await
        .unwrap()
}

/// A PNG with enough entropy to clear the global minimum file size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([
            ((x * 31 + y * 17) % 256) as u8,
            ((x * 7 + y * 43) % 256) as u8,
            ((x * 13 + y * 5) % 256) as u8,
            255,
        ])
    });
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    assert!(buffer.len() >= 1024, "fixture must clear the size floor");
    buffer
}

pub fn text_bytes(len: usize) -> Vec<u8> {
    vec![b'x'; len]
}

/// Spy provider recording call counts; used to assert that validation
/// failures never reach a backend.
pub struct SpyProvider {
    limits: ProviderLimits,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl SpyProvider {
    pub fn new() -> Self {
        SpyProvider {
            limits: limits(),
            put_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StorageProvider for SpyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn limits(&self) -> &ProviderLimits {
        &self.limits
    }

    fn validate_config(&self) -> bool {
        true
    }

    async fn put_object(
        &self,
        storage_key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("spy://{}", storage_key))
    }

    async fn delete_object(&self, _storage_key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn object_info(&self, storage_key: &str) -> StorageResult<FileInfo> {
        Ok(FileInfo {
            storage_key: storage_key.to_string(),
            size_bytes: 0,
            content_type: None,
            last_modified: None,
            url: format!("spy://{}", storage_key),
            provider: ProviderKind::Local,
        })
    }

    async fn signed_url(
        &self,
        storage_key: &str,
        _operation: SignedOperation,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!("spy://{}", storage_key))
    }

    async fn exists(&self, _storage_key: &str) -> bool {
        false
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("spy://{}", storage_key)
    }

    fn resolve_key(&self, identifier: &str) -> String {
        identifier
            .strip_prefix("spy://")
            .unwrap_or(identifier)
            .to_string()
    }

    fn matches_url(&self, url: &str) -> bool {
        url.starts_with("spy://")
    }
}

pub fn spy_service(base_path: &Path) -> (UploadService, Arc<SpyProvider>) {
    let spy = Arc::new(SpyProvider::new());
    let mut providers: HashMap<ProviderKind, Arc<dyn StorageProvider>> = HashMap::new();
    providers.insert(ProviderKind::Local, spy.clone());
    let service = UploadService::new(
        providers,
        ProviderKind::Local,
        Arc::new(test_config(base_path)),
    );
    (service, spy)
}
