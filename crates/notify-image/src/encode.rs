//! Encoding `image` buffers into the notification wire layout.

use std::borrow::Cow;

use image::{ColorType, DynamicImage};
use tracing::debug;

use crate::PixelBuffer;

impl PixelBuffer {
    /// Encode an image for the `image-data` hint.
    ///
    /// `image` buffers already store components in R, G, B(, A) order, which
    /// is the wire order, so no channel swap is needed here (see
    /// [`PixelBuffer::from_argb32`] for B, G, R, A surfaces). 16-bit, float
    /// and gray-with-alpha images are converted to 8 bits per sample first.
    /// An empty image yields an invalid buffer.
    pub fn from_image(image: &DynamicImage) -> Self {
        if image.width() == 0 || image.height() == 0 {
            debug!("Empty image, producing invalid pixel buffer");
            return Self::default();
        }

        let normalized = normalize(image);
        let color = normalized.color();
        let channels = channel_count(color);
        let bits_per_sample = i32::from(color.bits_per_pixel()) / channels;
        let rowstride = normalized.width() * u32::from(color.bytes_per_pixel());

        debug!(
            width = normalized.width(),
            height = normalized.height(),
            channels,
            rowstride,
            "Encoding image into pixel buffer"
        );

        Self::from_raw(
            normalized.width() as i32,
            normalized.height() as i32,
            rowstride as i32,
            color.has_alpha(),
            bits_per_sample,
            channels,
            normalized.as_bytes().to_vec(),
        )
    }
}

/// Channel count of an 8-bit color type: 1 for gray, else 4 with alpha, else 3.
fn channel_count(color: ColorType) -> i32 {
    if !color.has_color() {
        1
    } else if color.has_alpha() {
        4
    } else {
        3
    }
}

/// Bring an image into one of the three layouts the wire format carries.
fn normalize(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            Cow::Borrowed(image)
        }
        DynamicImage::ImageLuma16(_) => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}
