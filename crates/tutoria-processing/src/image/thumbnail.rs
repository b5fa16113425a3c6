//! Thumbnail derivation.

use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;
use tutoria_core::ThumbnailPolicy;

use super::optimizer::{encode, ImageOutputFormat};

/// Produce a fixed-size, cover-fit, centered thumbnail in the given output
/// format.
///
/// The thumbnail is derived from the source bytes independently of the
/// optimized main image. Returns `None` when thumbnails are disabled or when
/// generation fails; callers must treat `None` as "no thumbnail produced",
/// never as a fatal condition.
pub fn generate_thumbnail(
    data: &[u8],
    policy: &ThumbnailPolicy,
    format: ImageOutputFormat,
) -> Option<Vec<u8>> {
    if !policy.enabled {
        return None;
    }

    match try_thumbnail(data, policy, format) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(
                error = %e,
                width = policy.width,
                height = policy.height,
                "Thumbnail generation failed"
            );
            None
        }
    }
}

fn try_thumbnail(
    data: &[u8],
    policy: &ThumbnailPolicy,
    format: ImageOutputFormat,
) -> Result<Vec<u8>, anyhow::Error> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    // Cover fit: fill the target box completely, cropping overflow around
    // the center.
    let thumb = img.resize_to_fill(policy.width, policy.height, FilterType::Lanczos3);

    let mut buffer = Vec::new();
    encode(&thumb, format, policy.quality, &mut buffer)?;
    Ok(buffer)
}
