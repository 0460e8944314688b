//! Image re-encoding.
//!
//! Compression keeps the declared format: a JPEG comes back as a JPEG, a PNG
//! as a PNG. Decoding and re-encoding drops embedded metadata (EXIF, ICC,
//! text chunks).

use parcel_core::constants::COMPRESSIBLE_CONTENT_TYPES;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Unsupported content type for compression: {0}")]
    Unsupported(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Re-encodes image payloads. Implementations are CPU-bound and synchronous;
/// callers run them on the blocking pool.
pub trait ImageTranscoder: Send + Sync {
    /// Re-encode `data` (declared as `content_type`) at `quality` (1-100).
    /// The output has the same declared type as the input.
    fn transcode(
        &self,
        data: &[u8],
        content_type: &str,
        quality: u8,
    ) -> Result<Vec<u8>, TranscodeError>;
}

/// Whether the declared type is eligible for re-encoding.
pub fn is_compressible(content_type: &str) -> bool {
    COMPRESSIBLE_CONTENT_TYPES.contains(&content_type)
}

#[cfg(feature = "image")]
pub use codecs::ImageCompressor;

#[cfg(feature = "image")]
mod codecs {
    use super::{ImageTranscoder, TranscodeError};
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::{DynamicImage, GenericImageView, ImageFormat};

    /// Transcoder backed by mozjpeg (JPEG), `image` (PNG), and libwebp (WebP).
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ImageCompressor;

    impl ImageCompressor {
        pub fn new() -> Self {
            Self
        }

        fn decode(data: &[u8], format: ImageFormat) -> Result<DynamicImage, TranscodeError> {
            image::load_from_memory_with_format(data, format)
                .map_err(|e| TranscodeError::Decode(e.to_string()))
        }

        /// Compress to JPEG using mozjpeg with optimized Huffman tables
        fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TranscodeError> {
            let rgb_img = img.to_rgb8();
            let (width, height) = rgb_img.dimensions();

            // libjpeg reports fatal errors by unwinding
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                || -> std::io::Result<Vec<u8>> {
                    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
                    comp.set_size(width as usize, height as usize);
                    comp.set_quality(quality as f32);
                    comp.set_optimize_coding(true);

                    let mut comp = comp.start_compress(Vec::new())?;
                    comp.write_scanlines(&rgb_img)?;
                    comp.finish()
                },
            ));

            match result {
                Ok(Ok(jpeg_data)) => Ok(jpeg_data),
                Ok(Err(e)) => Err(TranscodeError::Encode(e.to_string())),
                Err(_) => Err(TranscodeError::Encode("mozjpeg aborted".to_string())),
            }
        }

        /// Lossless PNG at maximum compression effort
        fn compress_png(img: &DynamicImage) -> Result<Vec<u8>, TranscodeError> {
            let mut buffer = Vec::new();
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                FilterType::Adaptive,
            );
            img.write_with_encoder(encoder)
                .map_err(|e| TranscodeError::Encode(e.to_string()))?;
            Ok(buffer)
        }

        /// Lossy WebP at `quality`
        fn compress_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TranscodeError> {
            let (width, height) = img.dimensions();
            let rgba_img = img.to_rgba8();

            let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
            let webp_data = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| TranscodeError::Encode(format!("{:?}", e)))?;

            Ok(webp_data.to_vec())
        }
    }

    impl ImageTranscoder for ImageCompressor {
        fn transcode(
            &self,
            data: &[u8],
            content_type: &str,
            quality: u8,
        ) -> Result<Vec<u8>, TranscodeError> {
            let output = match content_type {
                "image/jpeg" => {
                    let img = Self::decode(data, ImageFormat::Jpeg)?;
                    Self::compress_jpeg(&img, quality)?
                }
                "image/png" => {
                    let img = Self::decode(data, ImageFormat::Png)?;
                    Self::compress_png(&img)?
                }
                "image/webp" => {
                    let img = Self::decode(data, ImageFormat::WebP)?;
                    Self::compress_webp(&img, quality)?
                }
                other => return Err(TranscodeError::Unsupported(other.to_string())),
            };

            if output.is_empty() {
                return Err(TranscodeError::Encode("encoder produced no output".to_string()));
            }

            tracing::debug!(
                content_type = %content_type,
                quality = quality,
                original_size = data.len(),
                compressed_size = output.len(),
                "Image re-encoded"
            );

            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressible_types() {
        assert!(is_compressible("image/jpeg"));
        assert!(is_compressible("image/png"));
        assert!(is_compressible("image/webp"));
        assert!(!is_compressible("image/gif"));
        assert!(!is_compressible("text/plain"));
        assert!(!is_compressible("IMAGE/PNG"));
    }

    #[cfg(feature = "image")]
    mod codecs {
        use crate::compression::{ImageCompressor, ImageTranscoder, TranscodeError};
        use image::{ImageFormat, RgbImage};
        use std::io::Cursor;

        fn gradient() -> image::DynamicImage {
            let img = RgbImage::from_fn(64, 48, |x, y| {
                image::Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
            });
            image::DynamicImage::ImageRgb8(img)
        }

        fn encoded(format: ImageFormat) -> Vec<u8> {
            let mut buffer = Cursor::new(Vec::new());
            gradient().write_to(&mut buffer, format).unwrap();
            buffer.into_inner()
        }

        #[test]
        fn test_jpeg_stays_jpeg() {
            let output = ImageCompressor::new()
                .transcode(&encoded(ImageFormat::Jpeg), "image/jpeg", 70)
                .unwrap();
            assert!(!output.is_empty());
            assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
        }

        #[test]
        fn test_png_stays_png_and_lossless() {
            let output = ImageCompressor::new()
                .transcode(&encoded(ImageFormat::Png), "image/png", 70)
                .unwrap();
            assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
            let decoded = image::load_from_memory(&output).unwrap().to_rgb8();
            assert_eq!(decoded, gradient().to_rgb8());
        }

        #[test]
        fn test_webp_stays_webp() {
            let source = gradient().to_rgba8();
            let input = webp::Encoder::from_rgba(&source, 64, 48).encode(90.0).to_vec();
            let output = ImageCompressor::new()
                .transcode(&input, "image/webp", 70)
                .unwrap();
            assert_eq!(&output[0..4], b"RIFF");
            assert_eq!(&output[8..12], b"WEBP");
        }

        #[test]
        fn test_corrupt_image_fails_to_decode() {
            let result = ImageCompressor::new().transcode(b"not an image", "image/png", 70);
            assert!(matches!(result, Err(TranscodeError::Decode(_))));
        }

        #[test]
        fn test_declared_type_mismatch_fails() {
            let result =
                ImageCompressor::new().transcode(&encoded(ImageFormat::Png), "image/jpeg", 70);
            assert!(matches!(result, Err(TranscodeError::Decode(_))));
        }

        #[test]
        fn test_unsupported_type() {
            let result = ImageCompressor::new().transcode(&[1, 2, 3], "image/gif", 70);
            assert!(matches!(result, Err(TranscodeError::Unsupported(_))));
        }
    }
}
