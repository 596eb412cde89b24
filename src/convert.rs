//! Flattening an animation to a still image.

use crate::animation::{decode_first_frame_with, decode_frame_sequence, is_animated};
use crate::chunk::{parse, ChunkId};
use crate::codec::{LibWebp, RasterCodec};
use crate::error::{Error, FormatError, Result};
use alloc::vec::Vec;
use whereat::*;

/// Re-encode the first frame of an animation (or the still image itself) as a
/// lossy still WebP at `quality`.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let still = webpchunk::convert_animated_to_static(webp_data, 80.0)?;
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn convert_animated_to_static(data: &[u8], quality: f32) -> Result<Vec<u8>> {
    convert_animated_to_static_with(data, quality, &LibWebp)
}

/// [`convert_animated_to_static`] with a caller-supplied codec.
pub fn convert_animated_to_static_with<C: RasterCodec + ?Sized>(
    data: &[u8],
    quality: f32,
    codec: &C,
) -> Result<Vec<u8>> {
    let single_frame = parse(data)?
        .iter()
        .filter(|r| r.id() == ChunkId::Anmf)
        .count()
        == 1;

    let (pixels, width, height) = if is_animated(data) {
        let frame = decode_first_frame_with(data, codec)?;
        (frame.pixels, frame.width, frame.height)
    } else if single_frame {
        let frame = decode_frame_sequence(data, codec, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| at!(Error::Format(FormatError::NoFramesDecoded)))?;
        (frame.pixels, frame.width, frame.height)
    } else {
        codec.decode_rgba(data)?
    };

    log::debug!("flattening to {}x{} still at quality {}", width, height, quality);
    codec.encode_rgba(&pixels, width, height, width * 4, quality)
}
