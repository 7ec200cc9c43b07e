//! Encoder
//!
//! Writes RGBA surfaces out as WebP, JPEG or PNG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, RgbaImage};
use sleek_dom::Encoding;

use crate::MediaError;

/// Lossy encoding for photographs.
///
/// The WebP encoder is lossless only, so photographs go out as JPEG even on
/// WebP-capable hosts.
pub fn raster_encoding() -> Encoding {
    Encoding::Jpeg
}

/// Lossless-preferred encoding for rasterized vector art
pub fn vector_encoding(supports_webp: bool) -> Encoding {
    if supports_webp { Encoding::WebP } else { Encoding::Png }
}

/// Encode an image; `quality` in `0.0..=1.0` applies to JPEG only
pub fn encode(image: &RgbaImage, encoding: Encoding, quality: f32) -> Result<Vec<u8>, MediaError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    let result = match encoding {
        Encoding::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, jpeg_quality(quality)))
        }
        Encoding::WebP => image.write_with_encoder(WebPEncoder::new_lossless(&mut cursor)),
        Encoding::Png => image.write_with_encoder(PngEncoder::new(&mut cursor)),
    };
    result.map_err(|e| MediaError::DecodeFailure(format!("{} encode failed: {e}", encoding.mime_type())))?;

    Ok(buffer)
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{self, ImageFormat};
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x * 7) as u8, (y * 5) as u8, 90, 255]))
    }

    #[test]
    fn test_encoding_choice() {
        assert_eq!(raster_encoding(), Encoding::Jpeg);
        assert_eq!(vector_encoding(true), Encoding::WebP);
        assert_eq!(vector_encoding(false), Encoding::Png);
    }

    #[test]
    fn test_encode_each_format() {
        let img = gradient(16, 8);
        for (encoding, format) in [
            (Encoding::Jpeg, ImageFormat::Jpeg),
            (Encoding::WebP, ImageFormat::WebP),
            (Encoding::Png, ImageFormat::Png),
        ] {
            let bytes = encode(&img, encoding, 0.7).unwrap();
            assert_eq!(ImageFormat::from_bytes(&bytes), format);
            assert_eq!(decoder::decode(&bytes).unwrap().dimensions(), (16, 8));
        }
    }

    #[test]
    fn test_lower_jpeg_quality_is_smaller() {
        let img = gradient(64, 64);
        let high = encode(&img, Encoding::Jpeg, 0.95).unwrap();
        let low = encode(&img, Encoding::Jpeg, 0.2).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(3.0), 100);
    }
}
