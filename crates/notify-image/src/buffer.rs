//! The raw pixel-buffer structure carried by the `image-data` hint.

use crate::{BITS_PER_SAMPLE, CodecError, Result};

/// Raw image data in the notification wire layout.
///
/// Field order mirrors the D-Bus structure: width, height, rowstride,
/// has alpha, bits per sample, channels, data. Buffers are immutable once
/// built; `is_valid` is false for the default value and for buffers built
/// from an empty image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: i32,
    height: i32,
    rowstride: i32,
    has_alpha: bool,
    bits_per_sample: i32,
    channels: i32,
    data: Vec<u8>,
    is_valid: bool,
}

impl PixelBuffer {
    /// Build a buffer from wire fields (e.g. a hint read back from D-Bus).
    ///
    /// The buffer is marked valid when it has a non-zero area and carries
    /// data; whether the geometry actually fits the data is checked on decode.
    pub fn from_raw(
        width: i32,
        height: i32,
        rowstride: i32,
        has_alpha: bool,
        bits_per_sample: i32,
        channels: i32,
        data: Vec<u8>,
    ) -> Self {
        let is_valid = width > 0 && height > 0 && !data.is_empty();
        Self {
            width,
            height,
            rowstride,
            has_alpha,
            bits_per_sample,
            channels,
            data,
            is_valid,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rowstride(&self) -> i32 {
        self.rowstride
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn bits_per_sample(&self) -> i32 {
        self.bits_per_sample
    }

    pub fn channels(&self) -> i32 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Return the pixel rows with any rowstride padding removed.
    ///
    /// Fails when the buffer is invalid, uses a depth other than 8 bits per
    /// sample, or declares a geometry the data cannot satisfy.
    pub(crate) fn packed_rows(&self) -> Result<Vec<u8>> {
        if !self.is_valid {
            return Err(CodecError::Invalid);
        }
        if self.bits_per_sample != BITS_PER_SAMPLE {
            return Err(CodecError::UnsupportedDepth(self.bits_per_sample));
        }
        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(CodecError::UnsupportedChannels(self.channels));
        }

        let geometry = CodecError::Geometry {
            width: self.width,
            height: self.height,
            rowstride: self.rowstride,
        };
        let (Ok(width), Ok(height), Ok(rowstride)) = (
            usize::try_from(self.width),
            usize::try_from(self.height),
            usize::try_from(self.rowstride),
        ) else {
            return Err(geometry);
        };
        let row_bytes = width * self.channels as usize;
        if rowstride < row_bytes {
            return Err(geometry);
        }

        let expected = rowstride * (height - 1) + row_bytes;
        if self.data.len() < expected {
            return Err(CodecError::Truncated {
                expected,
                actual: self.data.len(),
            });
        }

        if rowstride == row_bytes {
            return Ok(self.data[..row_bytes * height].to_vec());
        }

        let mut packed = Vec::with_capacity(row_bytes * height);
        for row in self.data.chunks(rowstride).take(height) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Ok(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_invalid() {
        let buf = PixelBuffer::default();
        assert!(!buf.is_valid());
        assert!(matches!(buf.packed_rows(), Err(CodecError::Invalid)));
    }

    #[test]
    fn test_from_raw_validity() {
        assert!(PixelBuffer::from_raw(1, 1, 3, false, 8, 3, vec![1, 2, 3]).is_valid());
        assert!(!PixelBuffer::from_raw(0, 1, 3, false, 8, 3, vec![1, 2, 3]).is_valid());
        assert!(!PixelBuffer::from_raw(1, 1, 3, false, 8, 3, Vec::new()).is_valid());
    }

    #[test]
    fn test_packed_rows_strips_padding() {
        // 2x2 RGB with two padding bytes per row
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
            7, 8, 9, 10, 11, 12, 0xEE, 0xEE,
        ];
        let buf = PixelBuffer::from_raw(2, 2, 8, false, 8, 3, data);
        assert_eq!(
            buf.packed_rows().unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }

    #[test]
    fn test_packed_rows_accepts_short_last_row() {
        // Last row needs no trailing padding
        let data = vec![1, 2, 3, 0, 4, 5, 6];
        let buf = PixelBuffer::from_raw(1, 2, 4, false, 8, 3, data);
        assert_eq!(buf.packed_rows().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_packed_rows_rejects_truncated_data() {
        let buf = PixelBuffer::from_raw(2, 2, 6, false, 8, 3, vec![0; 10]);
        match buf.packed_rows() {
            Err(CodecError::Truncated { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_packed_rows_rejects_bad_layouts() {
        let narrow = PixelBuffer::from_raw(2, 1, 4, false, 8, 3, vec![0; 6]);
        assert!(matches!(
            narrow.packed_rows(),
            Err(CodecError::Geometry { .. })
        ));

        let two_channels = PixelBuffer::from_raw(1, 1, 2, true, 8, 2, vec![0; 2]);
        assert!(matches!(
            two_channels.packed_rows(),
            Err(CodecError::UnsupportedChannels(2))
        ));

        let deep = PixelBuffer::from_raw(1, 1, 6, false, 16, 3, vec![0; 6]);
        assert!(matches!(
            deep.packed_rows(),
            Err(CodecError::UnsupportedDepth(16))
        ));
    }
}
