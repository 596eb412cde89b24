//! # webpchunk
//!
//! WebP container demuxing, animation frame extraction, and metadata chunk editing.
//!
//! The container layer walks RIFF chunks directly and never touches pixel
//! data except through a [`RasterCodec`]. The bundled [`LibWebp`] codec wraps
//! libwebp via FFI. It provides:
//! - Lazy RIFF chunk walking with bounds checks on every record
//! - Canvas, alpha, and metadata inspection without decoding
//! - Per-frame animation decoding with timing and placement
//! - EXIF, ICC profile, and XMP get/set/delete that preserve every other chunk
//! - Assembling animations from still encodings
//!
//! ## Quick Start
//!
//! ```rust
//! use webpchunk::MetadataKind;
//!
//! // 2x2 RGBA image (red, green, blue, white)
//! let rgba_data: Vec<u8> = vec![
//!     255, 0, 0, 255,    // red
//!     0, 255, 0, 255,    // green
//!     0, 0, 255, 255,    // blue
//!     255, 255, 255, 255 // white
//! ];
//! let webp_bytes = webpchunk::encode_lossless_rgba(&rgba_data, 2, 2, 8, false)?;
//!
//! let tagged = webpchunk::set_metadata(&webp_bytes, MetadataKind::Exif, b"Exif\0\0II*\0")?;
//! assert_eq!(webpchunk::get_exif(&tagged)?, b"Exif\0\0II*\0");
//!
//! let info = webpchunk::inspect(&tagged)?;
//! assert_eq!((info.width, info.height), (2, 2));
//! assert!(info.has_exif);
//! # Ok::<(), webpchunk::At<webpchunk::Error>>(())
//! ```
//!
//! ## Animation
//!
//! ```rust,no_run
//! let webp_data: &[u8] = &[0u8; 100]; // placeholder
//! if webpchunk::is_animated(webp_data) {
//!     for frame in webpchunk::decode_all_frames(webp_data)? {
//!         println!("{}x{} for {}ms", frame.width, frame.height, frame.duration_ms);
//!     }
//! }
//! # Ok::<(), webpchunk::At<webpchunk::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

whereat::define_at_crate_info!();

mod animation;
mod assemble;
mod chunk;
mod codec;
mod config;
mod convert;
mod decode;
mod encode;
mod error;
mod inspect;
mod mux;
mod types;
mod vp8x;

// Re-exports
pub use config::{EncoderConfig, Preset};
pub use error::{DecodingError, EncodingError, Error, FormatError, Result};
pub use types::{BitstreamFeatures, BitstreamFormat, PixelFormat};
pub use whereat::At;

pub use chunk::{chunks, parse, ChunkId, ChunkRecord, ChunkWalker, CHUNK_HEADER_SIZE, RIFF_HEADER_SIZE};
pub use vp8x::{Vp8x, Vp8xFlags};

pub use codec::{LibWebp, RasterCodec};
pub use decode::{
    decode_gray, decode_gray_to_size, decode_rgb, decode_rgb_to_size, decode_rgba,
    decode_rgba_to_size, decode_to_img, probe_features,
};
pub use encode::{
    encode_gray, encode_lossless_gray, encode_lossless_rgb, encode_lossless_rgba, encode_rgb,
    encode_rgba,
};

pub use inspect::{inspect, inspect_with, ContainerInfo};

pub use animation::{
    animation_info, animation_info_with, decode_all_frames, decode_all_frames_with,
    decode_first_frame, decode_first_frame_with, frames, is_animated, AnimationFrame,
    AnimationInfo, BlendMethod, DisposeMethod, Frame, Frames, ANMF_HEADER_SIZE,
};
pub use assemble::AnimationAssembler;
pub use convert::{convert_animated_to_static, convert_animated_to_static_with};

pub use mux::{
    delete_metadata, embed_exif, embed_icc, embed_xmp, get_exif, get_icc_profile, get_metadata,
    get_xmp, remove_exif, remove_icc, remove_xmp, set_metadata, set_metadata_with, MetadataKind,
};

/// libwebp decoder version as `(major, minor, patch)`.
pub fn version() -> (u32, u32, u32) {
    let v = unsafe { libwebp_sys::WebPGetDecoderVersion() } as u32;
    ((v >> 16) & 0xff, (v >> 8) & 0xff, v & 0xff)
}
