//! Decoding wire pixel buffers back into `image` buffers.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use tracing::warn;

use crate::{CodecError, PixelBuffer, Result};

impl PixelBuffer {
    /// Reconstruct the image, or `None` if the buffer is invalid or its
    /// declared layout does not fit the data.
    pub fn to_image(&self) -> Option<DynamicImage> {
        if !self.is_valid() {
            return None;
        }
        match self.try_to_image() {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "Failed to decode pixel buffer");
                None
            }
        }
    }

    /// Like [`PixelBuffer::to_image`], reporting why decoding failed.
    pub fn try_to_image(&self) -> Result<DynamicImage> {
        let packed = self.packed_rows()?;
        let (width, height) = (self.width() as u32, self.height() as u32);
        let geometry = || CodecError::Geometry {
            width: self.width(),
            height: self.height(),
            rowstride: self.rowstride(),
        };

        let image = match self.channels() {
            1 => GrayImage::from_raw(width, height, packed).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, packed).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(width, height, packed).map(DynamicImage::ImageRgba8),
        };
        image.ok_or_else(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Luma, Rgb, Rgba};

    /// Build an image whose pixels all differ so swaps or shifts show up.
    fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, (x + y) as u8, 255 - x as u8])
        })
    }

    #[test]
    fn test_round_trip_rgba() {
        let original = DynamicImage::ImageRgba8(gradient_rgba(6, 4));
        let decoded = PixelBuffer::from_image(&original).to_image().unwrap();

        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(decoded.to_rgba8().as_raw(), original.to_rgba8().as_raw());
    }

    #[test]
    fn test_round_trip_rgb() {
        let original = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 2, |x, y| {
            Rgb([x as u8, y as u8, (x * y) as u8])
        }));
        let decoded = PixelBuffer::from_image(&original).to_image().unwrap();

        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
        assert_eq!(decoded.as_bytes(), original.as_bytes());
    }

    #[test]
    fn test_grayscale_decodes_to_luma() {
        let original = DynamicImage::ImageLuma8(GrayImage::from_fn(3, 3, |x, y| {
            Luma([(x * 3 + y) as u8])
        }));
        let decoded = PixelBuffer::from_image(&original).to_image().unwrap();

        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
        assert_eq!(decoded.as_bytes(), original.as_bytes());
    }

    #[test]
    fn test_decode_honors_rowstride() {
        let data = vec![
            255, 0, 0, 0xAA, //
            0, 255, 0, 0xAA,
        ];
        let buf = PixelBuffer::from_raw(1, 2, 4, false, 8, 3, data);
        let decoded = buf.to_image().unwrap().to_rgb8();

        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(decoded.get_pixel(0, 1), &Rgb([0, 255, 0]));
    }

    #[test]
    fn test_invalid_buffer_decodes_to_none() {
        assert!(PixelBuffer::default().to_image().is_none());
        let truncated = PixelBuffer::from_raw(4, 4, 16, true, 8, 4, vec![0; 8]);
        assert!(truncated.to_image().is_none());
        assert!(matches!(
            truncated.try_to_image(),
            Err(CodecError::Truncated { .. })
        ));
    }
}
