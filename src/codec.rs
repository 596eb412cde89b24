//! The seam between the container layer and the pixel codec.

use crate::error::Result;
use crate::types::BitstreamFeatures;
use alloc::vec::Vec;

/// Single-frame pixel codec used by the inspector, demuxer, and converter.
///
/// The container code never interprets bitstreams itself; it hands the bytes
/// of one image (a full file, or a `VP8 `/`VP8L` chunk optionally preceded by
/// `ALPH`) to an implementation of this trait. [`LibWebp`] is the default.
pub trait RasterCodec {
    /// Read dimensions and alpha without decoding pixels.
    fn probe_features(&self, data: &[u8]) -> Result<BitstreamFeatures>;

    /// Decode to tightly packed RGBA, returning `(pixels, width, height)`.
    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)>;

    /// Encode RGBA rows (`stride` bytes apart) to a still WebP file.
    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: u32,
        quality: f32,
    ) -> Result<Vec<u8>>;
}

/// [`RasterCodec`] backed by libwebp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibWebp;

impl RasterCodec for LibWebp {
    fn probe_features(&self, data: &[u8]) -> Result<BitstreamFeatures> {
        crate::decode::probe_features(data)
    }

    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        crate::decode::decode_rgba(data)
    }

    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: u32,
        quality: f32,
    ) -> Result<Vec<u8>> {
        crate::encode::encode_rgba(pixels, width, height, stride, quality)
    }
}

impl<C: RasterCodec + ?Sized> RasterCodec for &C {
    fn probe_features(&self, data: &[u8]) -> Result<BitstreamFeatures> {
        (**self).probe_features(data)
    }

    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        (**self).decode_rgba(data)
    }

    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: u32,
        quality: f32,
    ) -> Result<Vec<u8>> {
        (**self).encode_rgba(pixels, width, height, stride, quality)
    }
}
