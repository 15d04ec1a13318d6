//! Raw pixel-buffer codec for the desktop notification `image-data` hint.
//!
//! Converts `image` buffers and packed native-endian ARGB32 surfaces into
//! the `(iiibiiay)` layout notification daemons expect, and back.

pub mod argb;
pub mod buffer;
pub mod decode;
pub mod encode;

// Re-exports for convenience
pub use buffer::PixelBuffer;

/// Bits per sample of every buffer produced by this crate.
pub const BITS_PER_SAMPLE: i32 = 8;

/// Errors raised when a pixel buffer cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Pixel buffer is not valid")]
    Invalid,

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(i32),

    #[error("Unsupported bits per sample: {0}")]
    UnsupportedDepth(i32),

    #[error("Invalid geometry: {width}x{height} with rowstride {rowstride}")]
    Geometry {
        width: i32,
        height: i32,
        rowstride: i32,
    },

    #[error("Pixel data truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
