use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
#[allow(deprecated)]
use image::codecs::webp::{WebPEncoder, WebPQuality};
use image::{DynamicImage, ImageEncoder, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(Option<ImageFormat>),

    #[error("encoder task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Maximum dimension in pixels for each compression level, applied only
/// when the caller asked for a resize.
fn max_dimension(level: u8) -> u32 {
    if level < 5 {
        800
    } else if level < 7 {
        600
    } else if level < 8 {
        400
    } else {
        200
    }
}

/// Encode quality for a level. Levels above 3 trade quality for size.
fn quality(level: u8) -> u8 {
    if level > 3 { 80 } else { 100 }
}

/// PNG has no quality knob; map the level onto the encoder's compression
/// effort instead.
fn png_compression(level: u8) -> CompressionType {
    if level < 4 {
        CompressionType::Fast
    } else if level < 8 {
        CompressionType::Default
    } else {
        CompressionType::Best
    }
}

/// Re-encode the image at `path` in place, optionally downscaling first.
///
/// The file is read fully, decoded, re-encoded in its own sniffed format
/// (PNG, JPEG or WebP only) and written back over the original. The rewrite
/// is not transactional: a concurrent reader can observe a partial file.
/// Decode and encode run on the blocking pool.
pub async fn compress_in_place(path: &Path, level: u8, resize: bool) -> Result<(), CompressionError> {
    let data = tokio::fs::read(path).await?;

    let encoded = tokio::task::spawn_blocking(move || reencode(&data, level, resize)).await??;

    tokio::fs::write(path, encoded).await?;
    Ok(())
}

fn reencode(data: &[u8], level: u8, resize: bool) -> Result<Vec<u8>, CompressionError> {
    let format = image::guess_format(data).ok();
    if !matches!(
        format,
        Some(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)
    ) {
        return Err(CompressionError::UnsupportedFormat(format));
    }

    let mut img = image::load_from_memory(data)?;
    if resize {
        let max = max_dimension(level);
        img = img.thumbnail(max, max);
    }

    let mut out = Vec::new();
    match format {
        Some(ImageFormat::Png) => {
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut out),
                png_compression(level),
                FilterType::Adaptive,
            );
            encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
        }
        Some(ImageFormat::Jpeg) => {
            // JPEG has no alpha channel.
            let img = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), quality(level));
            encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
        }
        Some(ImageFormat::WebP) => {
            // The lossy WebP encoder only accepts 8-bit RGB/RGBA.
            let img = to_8bit(img);
            #[allow(deprecated)]
            let encoder = WebPEncoder::new_with_quality(
                Cursor::new(&mut out),
                WebPQuality::lossy(quality(level)),
            );
            encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color())?;
        }
        _ => unreachable!(),
    }

    Ok(out)
}

fn to_8bit(img: DynamicImage) -> DynamicImage {
    match img.color() {
        image::ColorType::Rgba16 | image::ColorType::La16 | image::ColorType::Rgba32F => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        image::ColorType::Rgb16 | image::ColorType::L16 | image::ColorType::Rgb32F => {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
        image::ColorType::L8 | image::ColorType::La8 => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => img,
    }
}
