//! Packed native-endian ARGB32 surfaces (cairo, Qt, Wayland `argb8888`).
//!
//! These store each pixel as a `u32` with alpha in the high byte, so on
//! little-endian hosts the bytes read B, G, R, A: red and blue are swapped
//! relative to the wire order.

use tracing::debug;

use crate::{BITS_PER_SAMPLE, CodecError, PixelBuffer, Result};

impl PixelBuffer {
    /// Encode a packed ARGB32 surface.
    ///
    /// Rows are read honoring `stride` (in bytes). With `has_alpha` false the
    /// high byte is ignored and a three-channel buffer is produced.
    pub fn from_argb32(
        width: u32,
        height: u32,
        stride: usize,
        data: &[u8],
        has_alpha: bool,
    ) -> Result<Self> {
        let geometry = CodecError::Geometry {
            width: width as i32,
            height: height as i32,
            rowstride: stride as i32,
        };
        if width == 0 || height == 0 {
            debug!("Empty ARGB32 surface, producing invalid pixel buffer");
            return Ok(Self::default());
        }
        let (w, h) = (width as usize, height as usize);
        if stride < w * 4 {
            return Err(geometry);
        }
        let expected = stride * (h - 1) + w * 4;
        if data.len() < expected {
            return Err(CodecError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let channels: usize = if has_alpha { 4 } else { 3 };
        let mut out = Vec::with_capacity(w * h * channels);
        for row in data.chunks(stride).take(h) {
            for px in row[..w * 4].chunks_exact(4) {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                let [a, r, g, b] = argb.to_be_bytes();
                out.extend_from_slice(&[r, g, b]);
                if has_alpha {
                    out.push(a);
                }
            }
        }

        Ok(Self::from_raw(
            width as i32,
            height as i32,
            (w * channels) as i32,
            has_alpha,
            BITS_PER_SAMPLE,
            channels as i32,
            out,
        ))
    }

    /// Decode into a packed ARGB32 surface with a stride of `width * 4`.
    ///
    /// Buffers without alpha get an opaque alpha byte. Grayscale buffers are
    /// expanded to gray RGB.
    pub fn to_argb32(&self) -> Result<Vec<u8>> {
        let packed = self.packed_rows()?;
        let channels = self.channels() as usize;

        let mut out = Vec::with_capacity(packed.len() / channels * 4);
        for px in packed.chunks_exact(channels) {
            let (r, g, b, a) = match *px {
                [v] => (v, v, v, 0xFF),
                [r, g, b] => (r, g, b, 0xFF),
                [r, g, b, a] => (r, g, b, a),
                _ => return Err(CodecError::UnsupportedChannels(self.channels())),
            };
            out.extend_from_slice(&u32::from_be_bytes([a, r, g, b]).to_ne_bytes());
        }
        Ok(out)
    }
}
