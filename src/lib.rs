//! # hgxcodec
//!
//! Decoder for the HG-2/HG-3 ("HG-X") image files used by the CatSystem2
//! visual-novel engine.
//!
//! HG-X pixel data is stored as two independently zlib-compressed streams:
//! a byte stream of literal data and a bit-packed command stream of
//! Elias-gamma-coded run lengths. Decoding expands the runs into an
//! intermediate buffer, regroups four bit-plane sections into packed bytes,
//! and integrates a horizontal + vertical delta filter to recover BGR(A)
//! pixels.
//!
//! The format is reverse engineered and has no public specification, so all
//! input is treated as untrusted: truncated or corrupt streams yield typed
//! errors, never out-of-bounds access or panics.
//!
//! ## Layers
//!
//! - [`decode`] / [`HgxFile`] — whole-file decoding: parses the HG-2/HG-3
//!   container, walks frame records, and decodes a frame to pixels
//!   (requires the `zlib` feature, on by default).
//! - [`HgxInfo`] — header-only probe, no pixel decoding.
//! - [`decode_frame_raw`] and friends — the bare pixel pipeline on
//!   already-decompressed buffers, usable without `std`.
//!
//! ## Non-Goals
//!
//! - KIF archive handling (entry tables, Blowfish decryption) — this crate
//!   only understands the image files themselves
//! - The JPEG-compressed HG-3 frame variant (needs a JPEG codec; those
//!   frames are reported as [`HgxError::UnsupportedVariant`])
//! - Encoding
//!
//! ## Usage
//!
//! ```no_run
//! use hgxcodec::{HgxInfo, Unstoppable};
//!
//! let data: &[u8] = &[]; // your .hg2/.hg3 bytes
//!
//! // Probe without decoding
//! let info = HgxInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.format);
//!
//! // Decode the first frame
//! let frame = hgxcodec::decode(data, Unstoppable)?;
//! // frame.pixels is bottom-up BGR(A); frame.flip_vertical() for top-down
//! # Ok::<(), hgxcodec::HgxError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bits;
mod delta;
mod error;
mod frame;
mod info;
mod limits;
mod pixel;
mod rle;

pub mod hgx;

// Re-exports
pub use enough::{Stop, Unstoppable};
pub use error::HgxError;
pub use frame::{FrameGeometry, decode_frame_raw, decode_frame_raw_into};
#[cfg(feature = "zlib")]
pub use frame::{CompressedStream, decode_frame, decode_frame_into};
#[cfg(feature = "zlib")]
pub use hgx::{DecodedFrame, decode, decode_with_limits};
pub use hgx::{FrameInfo, FrameKind, HgxFile};
pub use info::{HgxFormat, HgxInfo};
pub use limits::{Limits, MAX_PIXEL_BYTES};
pub use pixel::PixelLayout;
