use alloc::string::String;
use enough::StopReason;

/// Errors from HG-X decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HgxError {
    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    /// The RLE command stream, data stream, or a zlib stream is truncated
    /// or inconsistent with the declared lengths.
    #[error("corrupt stream: {0}")]
    CorruptStream(&'static str),

    /// Decoded data that is structurally valid but unusable, e.g. an
    /// intermediate buffer whose length is not a multiple of 4.
    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("image dimensions are zero: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// Depth must be 1–4 bytes per pixel.
    #[error("invalid depth: {0} bytes per pixel")]
    InvalidDepthBytes(u32),

    #[error("output buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for HgxError {
    fn from(r: StopReason) -> Self {
        HgxError::Cancelled(r)
    }
}
