//! Image decoding from raw page bytes
//!
//! Supports the page formats enabled on the `image` crate dependency:
//! JPEG, PNG, GIF and WebP.

use crate::utils::error::{CbzError, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decode page bytes into a bitmap
///
/// The MIME type reported by the worker is used as a format hint. When it is
/// missing from the `image` crate's mapping (e.g. the generic binary type),
/// the format is sniffed from the content instead.
///
/// # Returns
/// * `Ok(DynamicImage)` - Successfully decoded image
/// * `Err(CbzError::DecodeFailure)` - Empty, corrupt, or unsupported data
pub fn decode_image(data: &[u8], mime_type: &str) -> Result<DynamicImage> {
    if data.is_empty() {
        return Err(CbzError::DecodeFailure("Empty image data".to_string()));
    }

    let hinted = ImageFormat::from_mime_type(mime_type)
        .and_then(|format| ImageReader::with_format(Cursor::new(data), format).decode().ok());
    if let Some(image) = hinted {
        return Ok(image);
    }

    // Extension lied or was unknown: trust the content
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CbzError::DecodeFailure(format!("Format detection failed: {}", e)))?;

    reader
        .decode()
        .map_err(|e| CbzError::DecodeFailure(format!("Failed to decode image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let data = encode(ImageFormat::Png, 3, 2);
        let img = decode_image(&data, "image/png").unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_decode_with_generic_mime_sniffs_content() {
        let data = encode(ImageFormat::Png, 1, 1);
        let img = decode_image(&data, "application/octet-stream").unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn test_decode_with_wrong_mime_sniffs_content() {
        // A PNG stored under a .jpg name
        let data = encode(ImageFormat::Png, 4, 4);
        let img = decode_image(&data, "image/jpeg").unwrap();
        assert_eq!(img.width(), 4);
    }

    #[test]
    fn test_decode_empty_data() {
        let result = decode_image(&[], "image/png");
        assert!(matches!(result, Err(CbzError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_corrupt_data() {
        let corrupt = vec![0xFF, 0x00, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let result = decode_image(&corrupt, "image/jpeg");
        assert!(matches!(result, Err(CbzError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_wrong_format() {
        let not_image = b"This is not an image file content";
        assert!(decode_image(not_image, "image/webp").is_err());
    }
}
