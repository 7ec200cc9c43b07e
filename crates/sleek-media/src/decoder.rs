//! Raster Decoder
//!
//! Sniffs and decodes PNG, JPEG, GIF and WebP payloads via the image crate.

use std::io::Cursor;

use image::RgbaImage;

use crate::MediaError;

/// Supported raster formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Self::Gif
        } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    fn to_image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::WebP => Some(image::ImageFormat::WebP),
            Self::Unknown => None,
        }
    }
}

/// Decode an encoded payload into straight-alpha RGBA
pub fn decode(data: &[u8]) -> Result<RgbaImage, MediaError> {
    let format = ImageFormat::from_bytes(data)
        .to_image_format()
        .ok_or_else(|| MediaError::DecodeFailure("unrecognized image format".into()))?;

    let img = image::load(Cursor::new(data), format)
        .map_err(|e| MediaError::DecodeFailure(e.to_string()))?;
    Ok(img.into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
        out
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_bytes(&png(1, 1)), ImageFormat::Png);
        assert_eq!(ImageFormat::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_bytes(b"GIF89a......"), ImageFormat::Gif);
        assert_eq!(ImageFormat::from_bytes(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_bytes(b"<svg"), ImageFormat::Unknown);
    }

    #[test]
    fn test_decode_png() {
        let img = decode(&png(3, 2)).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode(b"not an image"), Err(MediaError::DecodeFailure(_))));

        let mut truncated = png(8, 8);
        truncated.truncate(20);
        assert!(decode(&truncated).is_err());
    }
}
