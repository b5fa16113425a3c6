//! Upload pipeline: validate → transform → store.
//!
//! The canonical per-file flow behind every upload operation. Validation
//! runs first and rejects before any provider I/O; the content hash covers
//! the original input bytes so duplicate detection is stable across
//! optimization settings; the thumbnail is persisted alongside the primary
//! artifact and its failures are never fatal.

use chrono::Utc;

use tutoria_core::models::{UploadRequest, UploadResult};
use tutoria_core::{mime, FileCategory, UploadConfig};
use tutoria_processing::image::{generate_thumbnail, optimize, ImageOutputFormat};
use tutoria_processing::{content_hash, generate_unique_name, FileValidator};
use tutoria_storage::{keys, StorageProvider};

use crate::error::UploadError;

/// Upload options after configured defaults have been applied.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedOptions {
    pub upload_type: String,
    pub optimize: bool,
    pub thumbnail: bool,
}

pub(crate) async fn run_upload(
    provider: &dyn StorageProvider,
    config: &UploadConfig,
    request: UploadRequest,
    opts: &ResolvedOptions,
) -> Result<UploadResult, UploadError> {
    let validator = FileValidator::new(provider.limits());
    validator.validate_all(
        &request.original_filename,
        &request.content_type,
        request.data.len(),
    )?;

    let original = request.data;
    let content_hash = content_hash(&original);
    let category = FileCategory::classify(&request.content_type);
    let is_image = category == FileCategory::Image;

    let mut extension = std::path::Path::new(&request.original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .or_else(|| mime::extension_for_content_type(&request.content_type).map(String::from))
        .unwrap_or_default();

    let optimized = if is_image && opts.optimize {
        Some(optimize(&original, &request.content_type, &config.image))
    } else {
        None
    };

    let (stored_content_type, reencoded) = match &optimized {
        Some(outcome) => (outcome.content_type.clone(), outcome.reencoded),
        None => (request.content_type.clone(), false),
    };

    if reencoded {
        if let Some(ext) = mime::extension_for_content_type(&stored_content_type) {
            extension = ext.to_string();
        }
    }

    // Thumbnail is derived from the source bytes, not the optimized image,
    // and encoded to match the stored primary's format.
    let thumbnail_bytes = if is_image && opts.thumbnail {
        generate_thumbnail(
            &original,
            &config.thumbnail,
            ImageOutputFormat::from_content_type(&stored_content_type),
        )
    } else {
        None
    };

    let stored = match optimized {
        Some(outcome) => outcome.data,
        None => original,
    };

    let file_name = generate_unique_name(&request.original_filename, &extension);
    let storage_key = keys::object_key(&opts.upload_type, &file_name);
    let size_bytes = stored.len() as u64;

    let url = provider
        .put_object(&storage_key, stored, &stored_content_type)
        .await?;

    let mut thumbnail_url = None;
    if let Some(bytes) = thumbnail_bytes {
        let thumb_key = keys::thumbnail_key(&storage_key);
        match provider
            .put_object(&thumb_key, bytes, &stored_content_type)
            .await
        {
            Ok(thumb_url) => thumbnail_url = Some(thumb_url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %thumb_key,
                    "Thumbnail upload failed, keeping primary artifact"
                );
            }
        }
    }

    Ok(UploadResult {
        file_name,
        original_filename: request.original_filename,
        content_type: stored_content_type,
        size_bytes,
        url,
        thumbnail_url,
        content_hash,
        storage_key,
        provider: provider.kind(),
        uploaded_at: Utc::now(),
    })
}
