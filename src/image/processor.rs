use super::{ConversionRequest, ImageConverter};
use crate::models::OutputFormat;
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs;
use tracing::debug;

/// Encoder effort on a 0 (fastest) to 9 (smallest output) scale.
pub const DEFAULT_EFFORT: u8 = 6;

const MAX_EFFORT: u8 = 9;
const MAX_WEBP_METHOD: u8 = 6;

/// Production converter backed by the `image` and `webp` codecs.
pub struct CodecConverter {
    effort: u8,
}

impl CodecConverter {
    pub fn new() -> Self {
        Self {
            effort: DEFAULT_EFFORT,
        }
    }

    pub fn with_effort(mut self, effort: u8) -> Self {
        self.effort = effort.min(MAX_EFFORT);
        self
    }

    fn convert_sync(request: ConversionRequest, effort: u8) -> Result<u64> {
        let mut image = image::open(&request.source)?;

        if let Some(target_width) = request.width {
            image = shrink_to_width(image, target_width);
        }

        let quality = request.quality.clamp(1, 100);
        let encoded = match request.format {
            OutputFormat::WebP => encode_webp(&image, quality, effort)?,
            OutputFormat::Avif => encode_avif(&image, quality, effort)?,
        };

        fs::write(&request.output, &encoded)?;

        // Report what landed on disk, not the buffer length.
        Ok(fs::metadata(&request.output)?.len())
    }
}

impl Default for CodecConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageConverter for CodecConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<u64> {
        debug!(
            "Converting {} -> {} ({} q{}, width {:?})",
            request.source.display(),
            request.output.display(),
            request.format,
            request.quality,
            request.width
        );

        tokio::task::spawn_blocking({
            let request = request.clone();
            let effort = self.effort;
            move || Self::convert_sync(request, effort)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Image conversion task join error: {}", e)))?
    }
}

/// Dimensions after fitting `width` x `height` to `target_width`, keeping the
/// aspect ratio. Never enlarges: a target at or above the native width keeps
/// the native size.
pub fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if target_width == 0 || width == 0 || target_width >= width {
        return (width, height);
    }

    let scaled = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2)
        / u64::from(width);
    (target_width, scaled.max(1) as u32)
}

fn shrink_to_width(image: DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = scaled_dimensions(image.width(), image.height(), target_width);
    if width == image.width() && height == image.height() {
        return image;
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}

fn encode_webp(image: &DynamicImage, quality: u8, effort: u8) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());

    let mut config = webp::WebPConfig::new()
        .map_err(|_| Error::Encode("Failed to initialise WebP config".to_string()))?;
    config.quality = f32::from(quality);
    config.method = i32::from(effort.min(MAX_WEBP_METHOD));

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| Error::Encode(format!("WebP encoding failed: {:?}", e)))?;
    Ok(memory.to_vec())
}

fn encode_avif(image: &DynamicImage, quality: u8, effort: u8) -> Result<Vec<u8>> {
    // AVIF speed runs 1 (slowest) to 10 (fastest).
    let speed = 10 - effort.min(MAX_EFFORT);

    let mut bytes = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(&mut bytes, speed, quality);
    DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128, 255])
        });
        let path = dir.join(name);
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    fn request(
        source: &Path,
        output: &Path,
        format: OutputFormat,
        width: Option<u32>,
    ) -> ConversionRequest {
        ConversionRequest {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            format,
            quality: 80,
            width,
        }
    }

    #[test]
    fn test_scaled_dimensions_preserves_aspect_ratio() {
        assert_eq!(scaled_dimensions(1920, 1080, 480), (480, 270));
        assert_eq!(scaled_dimensions(1000, 333, 500), (500, 167));
        assert_eq!(scaled_dimensions(4000, 1, 10), (10, 1));
    }

    #[test]
    fn test_scaled_dimensions_never_enlarges() {
        assert_eq!(scaled_dimensions(300, 200, 480), (300, 200));
        assert_eq!(scaled_dimensions(480, 320, 480), (480, 320));
        assert_eq!(scaled_dimensions(300, 200, 0), (300, 200));
    }

    #[tokio::test]
    async fn test_webp_conversion_resizes_and_reports_disk_size() {
        let dir = TempDir::new().unwrap();
        let source = write_test_png(dir.path(), "bg.png", 64, 32);
        let output = dir.path().join("bg-16w.webp");

        let size = CodecConverter::new()
            .convert(&request(&source, &output, OutputFormat::WebP, Some(16)))
            .await
            .unwrap();

        assert_eq!(size, fs::metadata(&output).unwrap().len());
        let converted = image::open(&output).unwrap();
        assert_eq!(converted.width(), 16);
        assert_eq!(converted.height(), 8);
    }

    #[tokio::test]
    async fn test_webp_conversion_does_not_enlarge() {
        let dir = TempDir::new().unwrap();
        let source = write_test_png(dir.path(), "icon.png", 20, 10);
        let output = dir.path().join("icon-480w.webp");

        CodecConverter::new()
            .convert(&request(&source, &output, OutputFormat::WebP, Some(480)))
            .await
            .unwrap();

        let converted = image::open(&output).unwrap();
        assert_eq!(converted.width(), 20);
        assert_eq!(converted.height(), 10);
    }

    #[tokio::test]
    async fn test_avif_conversion_writes_file() {
        let dir = TempDir::new().unwrap();
        let source = write_test_png(dir.path(), "logo.png", 16, 16);
        let output = dir.path().join("logo.avif");

        let size = CodecConverter::new()
            .with_effort(MAX_EFFORT)
            .convert(&request(&source, &output, OutputFormat::Avif, None))
            .await
            .unwrap();

        assert!(size > 0);
        assert_eq!(size, fs::metadata(&output).unwrap().len());
    }

    #[tokio::test]
    async fn test_conversion_overwrites_existing_output() {
        let dir = TempDir::new().unwrap();
        let source = write_test_png(dir.path(), "logo.png", 16, 16);
        let output = dir.path().join("logo.webp");
        fs::write(&output, vec![0u8; 100_000]).unwrap();

        let size = CodecConverter::new()
            .convert(&request(&source, &output, OutputFormat::WebP, None))
            .await
            .unwrap();

        assert!(size < 100_000);
        assert_eq!(size, fs::metadata(&output).unwrap().len());
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing.webp");

        let result = CodecConverter::new()
            .convert(&request(
                &dir.path().join("missing.png"),
                &output,
                OutputFormat::WebP,
                None,
            ))
            .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_undecodable_source_fails() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.png");
        fs::write(&source, b"not an image").unwrap();

        let result = CodecConverter::new()
            .convert(&request(
                &source,
                &dir.path().join("broken.avif"),
                OutputFormat::Avif,
                None,
            ))
            .await;

        assert!(matches!(result, Err(Error::Image(_))));
    }
}
