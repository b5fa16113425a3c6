//! Configuration module
//!
//! Process-wide upload configuration, read once from the environment at
//! startup and immutable afterwards: provider credentials and limits, the
//! default provider, image optimization and thumbnail policy, and the
//! named-field upload contracts.

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use crate::contracts::{default_field_contracts, FieldContract};
use crate::storage_types::ProviderKind;

/// Global minimum accepted file size. Anything below this is rejected before
/// any provider is contacted.
pub const MIN_FILE_SIZE_BYTES: usize = 1024;

// Defaults
const MAX_FILE_SIZE_MB: usize = 10;
const S3_MAX_FILE_SIZE_MB: usize = 100;
const CDN_MAX_FILE_SIZE_MB: usize = 25;
const IMAGE_QUALITY: u8 = 80;
const IMAGE_MAX_WIDTH: u32 = 1920;
const IMAGE_MAX_HEIGHT: u32 = 1080;
const THUMBNAIL_WIDTH: u32 = 300;
const THUMBNAIL_HEIGHT: u32 = 300;
const THUMBNAIL_QUALITY: u8 = 70;
const MAX_FILES_PER_BATCH: usize = 10;

const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp,\
application/pdf,application/msword,\
application/vnd.openxmlformats-officedocument.wordprocessingml.document,\
application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,\
application/vnd.openxmlformats-officedocument.presentationml.presentation,\
text/plain,text/csv,application/zip,video/mp4,audio/mpeg";

// The CDN backend is an image service; it only accepts images.
const CDN_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

/// Per-provider validation limits, enforced before any I/O.
#[derive(Clone, Debug)]
pub struct ProviderLimits {
    pub max_file_size: usize,
    pub allowed_content_types: Vec<String>,
}

/// Local filesystem provider settings.
#[derive(Clone, Debug)]
pub struct LocalConfig {
    pub base_path: String,
    pub base_url: String,
    pub limits: ProviderLimits,
}

/// Object storage provider settings.
#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: Option<String>,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub endpoint: Option<String>,
    pub limits: ProviderLimits,
}

/// CDN image service settings.
#[derive(Clone, Debug)]
pub struct CdnConfig {
    /// API endpoint, e.g. "https://api.cdn.example.com".
    pub api_base: Option<String>,
    /// Delivery host for public asset URLs, e.g. "https://media.cdn.example.com".
    pub delivery_url: Option<String>,
    /// Account/zone identifier embedded in API and delivery URLs.
    pub zone: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub limits: ProviderLimits,
}

/// Image optimization policy.
#[derive(Clone, Debug)]
pub struct ImagePolicy {
    pub enabled: bool,
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
    /// Output format ("jpeg", "png", "webp"); `None` keeps the source format.
    pub format: Option<String>,
}

/// Thumbnail derivation policy.
#[derive(Clone, Debug)]
pub struct ThumbnailPolicy {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Process-wide upload configuration.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub default_provider: ProviderKind,
    pub local: LocalConfig,
    pub s3: S3Config,
    pub cdn: CdnConfig,
    pub image: ImagePolicy,
    pub thumbnail: ThumbnailPolicy,
    pub max_files_per_batch: usize,
    pub default_upload_type: String,
    pub field_contracts: BTreeMap<String, FieldContract>,
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u8(name: &str, default: u8) -> u8 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let default_provider = match env::var("UPLOAD_DEFAULT_PROVIDER") {
            Ok(value) => ProviderKind::from_str(&value)?,
            Err(_) => ProviderKind::Local,
        };

        let local = LocalConfig {
            base_path: env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string()),
            base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/uploads".to_string()),
            limits: ProviderLimits {
                max_file_size: env_usize("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * 1024 * 1024,
                allowed_content_types: env_list(
                    "ALLOWED_CONTENT_TYPES",
                    DEFAULT_ALLOWED_CONTENT_TYPES,
                ),
            },
        };

        let s3 = S3Config {
            bucket: env::var("S3_BUCKET").ok(),
            region: env::var("S3_REGION").ok().or_else(|| env::var("AWS_REGION").ok()),
            endpoint: env::var("S3_ENDPOINT").ok(),
            limits: ProviderLimits {
                max_file_size: env_usize("S3_MAX_FILE_SIZE_MB", S3_MAX_FILE_SIZE_MB) * 1024 * 1024,
                allowed_content_types: env_list(
                    "S3_ALLOWED_CONTENT_TYPES",
                    DEFAULT_ALLOWED_CONTENT_TYPES,
                ),
            },
        };

        let cdn = CdnConfig {
            api_base: env::var("CDN_API_BASE").ok(),
            delivery_url: env::var("CDN_DELIVERY_URL").ok(),
            zone: env::var("CDN_ZONE").ok(),
            api_key: env::var("CDN_API_KEY").ok(),
            api_secret: env::var("CDN_API_SECRET").ok(),
            limits: ProviderLimits {
                max_file_size: env_usize("CDN_MAX_FILE_SIZE_MB", CDN_MAX_FILE_SIZE_MB)
                    * 1024
                    * 1024,
                allowed_content_types: env_list(
                    "CDN_ALLOWED_CONTENT_TYPES",
                    CDN_ALLOWED_CONTENT_TYPES,
                ),
            },
        };

        let image = ImagePolicy {
            enabled: env_bool("IMAGE_OPTIMIZATION_ENABLED", true),
            quality: env_u8("IMAGE_QUALITY", IMAGE_QUALITY),
            max_width: env_u32("IMAGE_MAX_WIDTH", IMAGE_MAX_WIDTH),
            max_height: env_u32("IMAGE_MAX_HEIGHT", IMAGE_MAX_HEIGHT),
            format: env::var("IMAGE_OUTPUT_FORMAT").ok(),
        };

        let thumbnail = ThumbnailPolicy {
            enabled: env_bool("THUMBNAIL_ENABLED", true),
            width: env_u32("THUMBNAIL_WIDTH", THUMBNAIL_WIDTH),
            height: env_u32("THUMBNAIL_HEIGHT", THUMBNAIL_HEIGHT),
            quality: env_u8("THUMBNAIL_QUALITY", THUMBNAIL_QUALITY),
        };

        let config = UploadConfig {
            default_provider,
            local,
            s3,
            cdn,
            image,
            thumbnail,
            max_files_per_batch: env_usize("UPLOAD_MAX_FILES", MAX_FILES_PER_BATCH),
            default_upload_type: env::var("UPLOAD_DEFAULT_TYPE")
                .unwrap_or_else(|_| "general".to_string()),
            field_contracts: default_field_contracts(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.local.base_path.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH cannot be empty"));
        }
        if self.local.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_BASE_URL cannot be empty"));
        }
        if self.image.quality == 0 || self.image.quality > 100 {
            return Err(anyhow::anyhow!(
                "IMAGE_QUALITY must be between 1 and 100 (got {})",
                self.image.quality
            ));
        }
        if self.thumbnail.quality == 0 || self.thumbnail.quality > 100 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_QUALITY must be between 1 and 100 (got {})",
                self.thumbnail.quality
            ));
        }
        if self.image.max_width == 0 || self.image.max_height == 0 {
            return Err(anyhow::anyhow!("image max dimensions must be non-zero"));
        }
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(anyhow::anyhow!("thumbnail dimensions must be non-zero"));
        }
        if self.max_files_per_batch == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_FILES must be at least 1"));
        }
        if self.s3.bucket.is_some() && self.s3.region.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION required when S3_BUCKET is set"
            ));
        }
        for (field, contract) in &self.field_contracts {
            if contract.max_count == 0 {
                return Err(anyhow::anyhow!(
                    "field contract '{}' must allow at least one file",
                    field
                ));
            }
        }
        Ok(())
    }

    /// Whether the given provider has everything it needs to be constructed.
    /// A pure presence check; no I/O.
    pub fn is_provider_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Local => {
                !self.local.base_path.trim().is_empty() && !self.local.base_url.trim().is_empty()
            }
            ProviderKind::S3 => self.s3.bucket.is_some() && self.s3.region.is_some(),
            ProviderKind::Cdn => {
                self.cdn.api_base.is_some()
                    && self.cdn.delivery_url.is_some()
                    && self.cdn.zone.is_some()
                    && self.cdn.api_key.is_some()
                    && self.cdn.api_secret.is_some()
            }
        }
    }

    pub fn limits(&self, kind: ProviderKind) -> &ProviderLimits {
        match kind {
            ProviderKind::Local => &self.local.limits,
            ProviderKind::S3 => &self.s3.limits,
            ProviderKind::Cdn => &self.cdn.limits,
        }
    }
}
