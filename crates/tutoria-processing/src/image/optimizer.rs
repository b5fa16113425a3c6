//! Best-effort image optimization.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use tutoria_core::ImagePolicy;

/// Output format for re-encoded images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageOutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageOutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageOutputFormat::Jpeg),
            "png" => Some(ImageOutputFormat::Png),
            "webp" => Some(ImageOutputFormat::WebP),
            _ => None,
        }
    }

    /// Detect the output format matching a source content type.
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type.to_lowercase().as_str() {
            "image/png" => ImageOutputFormat::Png,
            "image/webp" => ImageOutputFormat::WebP,
            _ => ImageOutputFormat::Jpeg,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageOutputFormat::Jpeg => "image/jpeg",
            ImageOutputFormat::Png => "image/png",
            ImageOutputFormat::WebP => "image/webp",
        }
    }

    fn to_image_format(self) -> ImageFormat {
        match self {
            ImageOutputFormat::Jpeg => ImageFormat::Jpeg,
            ImageOutputFormat::Png => ImageFormat::Png,
            ImageOutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// Result of an optimization attempt.
#[derive(Clone, Debug)]
pub struct OptimizeOutcome {
    pub data: Vec<u8>,
    /// Content type of `data`; differs from the input when re-encoded.
    pub content_type: String,
    pub reencoded: bool,
}

/// Downscale and re-encode an image according to policy.
///
/// Images already within the configured bounds are not upscaled, only
/// re-encoded. Failure is never fatal: any decode/encode error returns the
/// original bytes untouched.
pub fn optimize(data: &[u8], content_type: &str, policy: &ImagePolicy) -> OptimizeOutcome {
    if !policy.enabled {
        return passthrough(data, content_type);
    }

    match try_optimize(data, content_type, policy) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(
                error = %e,
                content_type = %content_type,
                "Image optimization failed, storing original"
            );
            passthrough(data, content_type)
        }
    }
}

fn passthrough(data: &[u8], content_type: &str) -> OptimizeOutcome {
    OptimizeOutcome {
        data: data.to_vec(),
        content_type: content_type.to_string(),
        reencoded: false,
    }
}

fn try_optimize(
    data: &[u8],
    content_type: &str,
    policy: &ImagePolicy,
) -> Result<OptimizeOutcome, anyhow::Error> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    let img = if width > policy.max_width || height > policy.max_height {
        tracing::debug!(
            width = width,
            height = height,
            max_width = policy.max_width,
            max_height = policy.max_height,
            "Downscaling image to configured bounds"
        );
        img.resize(policy.max_width, policy.max_height, FilterType::Lanczos3)
    } else {
        img
    };

    let format = policy
        .format
        .as_deref()
        .and_then(ImageOutputFormat::parse)
        .unwrap_or_else(|| ImageOutputFormat::from_content_type(content_type));

    let mut buffer = Vec::new();
    encode(&img, format, policy.quality, &mut buffer)?;

    Ok(OptimizeOutcome {
        data: buffer,
        content_type: format.content_type().to_string(),
        reencoded: true,
    })
}

/// Encode an image into `buffer` in the given format.
///
/// JPEG has no alpha channel, so sources are flattened to RGB first.
pub(crate) fn encode(
    img: &DynamicImage,
    format: ImageOutputFormat,
    quality: u8,
    buffer: &mut Vec<u8>,
) -> Result<(), anyhow::Error> {
    let mut cursor = Cursor::new(buffer);
    match format {
        ImageOutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageOutputFormat::Png | ImageOutputFormat::WebP => {
            img.write_to(&mut cursor, format.to_image_format())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn policy(max_width: u32, max_height: u32) -> ImagePolicy {
        ImagePolicy {
            enabled: true,
            quality: 80,
            max_width,
            max_height,
            format: None,
        }
    }

    fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
            .dimensions()
    }

    #[test]
    fn test_downscales_oversized_image() {
        let data = png_fixture(200, 100);
        let outcome = optimize(&data, "image/png", &policy(100, 100));
        assert!(outcome.reencoded);
        assert_eq!(outcome.content_type, "image/png");
        // Aspect ratio preserved: 200x100 fit into 100x100 is 100x50
        assert_eq!(decoded_dimensions(&outcome.data), (100, 50));
    }

    #[test]
    fn test_never_upscales() {
        let data = png_fixture(40, 30);
        let outcome = optimize(&data, "image/png", &policy(1920, 1080));
        assert!(outcome.reencoded);
        assert_eq!(decoded_dimensions(&outcome.data), (40, 30));
    }

    #[test]
    fn test_format_override() {
        let data = png_fixture(40, 30);
        let mut p = policy(1920, 1080);
        p.format = Some("jpeg".to_string());
        let outcome = optimize(&data, "image/png", &p);
        assert_eq!(outcome.content_type, "image/jpeg");
    }

    #[test]
    fn test_invalid_image_returns_original() {
        let data = b"definitely not an image".to_vec();
        let outcome = optimize(&data, "image/png", &policy(100, 100));
        assert!(!outcome.reencoded);
        assert_eq!(outcome.data, data);
        assert_eq!(outcome.content_type, "image/png");
    }

    #[test]
    fn test_disabled_policy_is_passthrough() {
        let data = png_fixture(200, 100);
        let mut p = policy(100, 100);
        p.enabled = false;
        let outcome = optimize(&data, "image/png", &p);
        assert!(!outcome.reencoded);
        assert_eq!(outcome.data, data);
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(
            ImageOutputFormat::parse("JPEG"),
            Some(ImageOutputFormat::Jpeg)
        );
        assert_eq!(ImageOutputFormat::parse("webp"), Some(ImageOutputFormat::WebP));
        assert_eq!(ImageOutputFormat::parse("avif"), None);
    }
}
