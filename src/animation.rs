//! Animated WebP demultiplexing.
//!
//! Frames are decoded one by one against their own sub-rectangle; nothing is
//! composited onto the canvas. A frame whose bitstream the codec rejects is
//! skipped, while a structural problem in the container aborts the call.

use crate::chunk::{parse, read_u24_le, ChunkId, ChunkRecord, ChunkWalker};
use crate::codec::{LibWebp, RasterCodec};
use crate::error::{Error, FormatError, Result};
use crate::vp8x::Vp8x;
use alloc::vec::Vec;
use imgref::ImgRef;
use rgb::{FromSlice, RGBA8};
use whereat::*;

/// Size of the fixed `ANMF` header that precedes the frame's sub-chunks.
pub const ANMF_HEADER_SIZE: usize = 16;

/// Spacing of synthesized frame timestamps.
const TIMESTAMP_STEP_MS: u64 = 100;

/// How a frame is combined with the canvas beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMethod {
    /// Alpha-blend onto the previous canvas.
    #[default]
    AlphaBlend,
    /// Overwrite the covered rectangle.
    Overwrite,
}

/// What happens to the frame's rectangle after it has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposeMethod {
    /// Leave the canvas as is.
    #[default]
    None,
    /// Clear the rectangle to the background color.
    Background,
}

/// One undecoded `ANMF` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame<'a> {
    /// Position among the container's `ANMF` chunks.
    pub index: usize,
    /// Left edge on the canvas in pixels.
    pub x_offset: u32,
    /// Top edge on the canvas in pixels.
    pub y_offset: u32,
    /// Frame width as declared in the header.
    pub width: u32,
    /// Frame height as declared in the header.
    pub height: u32,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// Blending mode.
    pub blend: BlendMethod,
    /// Disposal mode.
    pub dispose: DisposeMethod,
    /// `ALPH`+`VP8 `, `VP8 `, or `VP8L` with chunk headers, if the frame carries one.
    pub image: Option<&'a [u8]>,
}

impl<'a> AnimationFrame<'a> {
    /// Parse an `ANMF` payload.
    pub fn parse(index: usize, payload: &'a [u8]) -> Result<Self> {
        if payload.len() < ANMF_HEADER_SIZE {
            return Err(at!(Error::Format(FormatError::Truncated)));
        }
        let flags = payload[15];
        Ok(Self {
            index,
            x_offset: read_u24_le(&payload[0..3]) * 2,
            y_offset: read_u24_le(&payload[3..6]) * 2,
            width: read_u24_le(&payload[6..9]) + 1,
            height: read_u24_le(&payload[9..12]) + 1,
            duration_ms: read_u24_le(&payload[12..15]),
            blend: if flags & 0b10 != 0 {
                BlendMethod::Overwrite
            } else {
                BlendMethod::AlphaBlend
            },
            dispose: if flags & 0b01 != 0 {
                DisposeMethod::Background
            } else {
                DisposeMethod::None
            },
            image: find_image(payload)?,
        })
    }
}

/// Locate the image bitstream among the sub-chunks of an `ANMF` payload.
fn find_image(payload: &[u8]) -> Result<Option<&[u8]>> {
    let mut alpha_start = None;
    for sub in ChunkWalker::nested(payload, ANMF_HEADER_SIZE, payload.len()) {
        let sub = sub?;
        match sub.id() {
            ChunkId::Alph => alpha_start = Some(sub.offset),
            ChunkId::Vp8 => {
                let start = alpha_start.unwrap_or(sub.offset);
                return Ok(Some(&payload[start..sub.offset + sub.unpadded().len()]));
            }
            ChunkId::Vp8l => return Ok(Some(sub.unpadded())),
            _ => {}
        }
    }
    Ok(None)
}

/// Image chunk type inside an `ANMF` record, ignoring malformed sub-chunks.
pub(crate) fn frame_image_id(record: &ChunkRecord<'_>) -> Option<ChunkId> {
    ChunkWalker::nested(record.payload, ANMF_HEADER_SIZE, record.payload.len())
        .map_while(|sub| sub.ok())
        .map(|sub| sub.id())
        .find(|id| id.is_image())
}

/// Lazy iterator over the `ANMF` records of a container.
///
/// Created by [`frames`]. Fused after the first error.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    walker: ChunkWalker<'a>,
    index: usize,
    done: bool,
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<AnimationFrame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for record in self.walker.by_ref() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if record.id() != ChunkId::Anmf {
                continue;
            }
            let frame = AnimationFrame::parse(self.index, record.payload);
            self.index += 1;
            if frame.is_err() {
                self.done = true;
            }
            return Some(frame);
        }
        None
    }
}

impl core::iter::FusedIterator for Frames<'_> {}

/// Iterate over the undecoded animation frames of a container.
pub fn frames(data: &[u8]) -> Result<Frames<'_>> {
    Ok(Frames {
        walker: ChunkWalker::new(data)?,
        index: 0,
        done: false,
    })
}

/// Animation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationInfo {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Number of `ANMF` chunks; 0 or 1 means not animated.
    pub frame_count: u32,
    /// Loop count (0 = infinite).
    pub loop_count: u32,
    /// Background color as stored in `ANIM`, read little-endian.
    pub bgcolor: u32,
}

/// A single decoded animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame pixel data (RGBA, `width * height * 4` bytes).
    pub pixels: Vec<u8>,
    /// Decoded frame width.
    pub width: u32,
    /// Decoded frame height.
    pub height: u32,
    /// Position in the returned sequence times 100.
    pub timestamp_ms: u64,
    /// Frame duration in milliseconds, as stored.
    pub duration_ms: u32,
    /// Left edge on the canvas in pixels.
    pub x_offset: u32,
    /// Top edge on the canvas in pixels.
    pub y_offset: u32,
    /// Blending mode.
    pub blend: BlendMethod,
    /// Disposal mode.
    pub dispose: DisposeMethod,
}

impl Frame {
    /// Typed view of the pixels.
    pub fn as_img(&self) -> ImgRef<'_, RGBA8> {
        ImgRef::new(
            self.pixels.as_rgba(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// Whether the container holds an `ANIM` chunk and more than one frame.
///
/// Malformed input is reported as not animated.
pub fn is_animated(data: &[u8]) -> bool {
    parse(data).is_ok_and(|records| has_animation(&records))
}

fn has_animation(records: &[ChunkRecord<'_>]) -> bool {
    let has_anim = records.iter().any(|r| r.id() == ChunkId::Anim);
    has_anim && records.iter().filter(|r| r.id() == ChunkId::Anmf).count() > 1
}

/// Canvas size, frame count, and loop settings.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let info = webpchunk::animation_info(webp_data)?;
/// println!("Animation: {}x{}, {} frames", info.width, info.height, info.frame_count);
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn animation_info(data: &[u8]) -> Result<AnimationInfo> {
    animation_info_with(data, &LibWebp)
}

/// [`animation_info`] with a caller-supplied codec for the canvas probe.
pub fn animation_info_with<C: RasterCodec + ?Sized>(
    data: &[u8],
    codec: &C,
) -> Result<AnimationInfo> {
    let records = parse(data)?;

    let (width, height) = match records.iter().find(|r| r.id() == ChunkId::Vp8x) {
        Some(record) => {
            let header = Vp8x::parse(record.payload)?;
            (header.canvas_width, header.canvas_height)
        }
        None => {
            let info = crate::inspect::inspect_records(&records, codec)?;
            (info.width, info.height)
        }
    };

    let (bgcolor, loop_count) = match records.iter().find(|r| r.id() == ChunkId::Anim) {
        Some(record) => {
            let p = record.payload;
            if p.len() < 6 {
                return Err(at!(Error::Format(FormatError::Truncated)));
            }
            (
                u32::from_le_bytes([p[0], p[1], p[2], p[3]]),
                u32::from(u16::from_le_bytes([p[4], p[5]])),
            )
        }
        None => (0, 0),
    };

    Ok(AnimationInfo {
        width,
        height,
        frame_count: records.iter().filter(|r| r.id() == ChunkId::Anmf).count() as u32,
        loop_count,
        bgcolor,
    })
}

/// Decode the first frame that decodes successfully.
///
/// Input that [`is_animated`] rejects fails with [`FormatError::NotAnimated`].
pub fn decode_first_frame(data: &[u8]) -> Result<Frame> {
    decode_first_frame_with(data, &LibWebp)
}

/// [`decode_first_frame`] with a caller-supplied codec.
pub fn decode_first_frame_with<C: RasterCodec + ?Sized>(data: &[u8], codec: &C) -> Result<Frame> {
    decode_frames(data, codec, Some(1))?
        .into_iter()
        .next()
        .ok_or_else(|| at!(Error::Format(FormatError::NoFramesDecoded)))
}

/// Decode every frame, in file order.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// for frame in webpchunk::decode_all_frames(webp_data)? {
///     println!("{}x{} at {}ms for {}ms", frame.width, frame.height, frame.timestamp_ms, frame.duration_ms);
/// }
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn decode_all_frames(data: &[u8]) -> Result<Vec<Frame>> {
    decode_all_frames_with(data, &LibWebp)
}

/// [`decode_all_frames`] with a caller-supplied codec.
pub fn decode_all_frames_with<C: RasterCodec + ?Sized>(
    data: &[u8],
    codec: &C,
) -> Result<Vec<Frame>> {
    decode_frames(data, codec, None)
}

fn decode_frames<C: RasterCodec + ?Sized>(
    data: &[u8],
    codec: &C,
    limit: Option<usize>,
) -> Result<Vec<Frame>> {
    if !has_animation(&parse(data)?) {
        return Err(at!(Error::Format(FormatError::NotAnimated)));
    }
    decode_frame_sequence(data, codec, limit)
}

/// Decode `ANMF` frames in file order without checking for `ANIM`.
///
/// Frames without an image or rejected by `codec` are skipped.
pub(crate) fn decode_frame_sequence<C: RasterCodec + ?Sized>(
    data: &[u8],
    codec: &C,
    limit: Option<usize>,
) -> Result<Vec<Frame>> {
    let mut decoded = Vec::new();

    for frame in frames(data)? {
        let frame = frame?;

        let Some(image) = frame.image else {
            log::warn!("skipping frame {}: no image data", frame.index);
            continue;
        };
        let (pixels, width, height) = match codec.decode_rgba(image) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("skipping frame {}: {:?}", frame.index, e);
                continue;
            }
        };

        decoded.push(Frame {
            pixels,
            width,
            height,
            timestamp_ms: decoded.len() as u64 * TIMESTAMP_STEP_MS,
            duration_ms: frame.duration_ms,
            x_offset: frame.x_offset,
            y_offset: frame.y_offset,
            blend: frame.blend,
            dispose: frame.dispose,
        });
        if limit.is_some_and(|limit| decoded.len() >= limit) {
            break;
        }
    }

    if decoded.is_empty() {
        return Err(at!(Error::Format(FormatError::NoFramesDecoded)));
    }
    log::debug!("decoded {} animation frames", decoded.len());
    Ok(decoded)
}
