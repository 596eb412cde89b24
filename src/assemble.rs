//! Building animated containers from still encodings.

use crate::animation::{BlendMethod, DisposeMethod};
use crate::chunk::{finish_riff, parse, put_u24_le, write_chunk, ChunkId};
use crate::codec::{LibWebp, RasterCodec};
use crate::error::{Error, FormatError, Result};
use crate::vp8x::{Vp8x, Vp8xFlags};
use alloc::vec::Vec;
use whereat::*;

/// Largest value the 24-bit `ANMF` duration field holds.
const MAX_DURATION_MS: u32 = (1 << 24) - 1;

/// Collects still WebP images into an animated container.
///
/// Each frame is an already encoded still image; its `ALPH`/`VP8 `/`VP8L`
/// chunks are moved into an `ANMF` record without re-encoding.
///
/// # Example
///
/// ```rust,no_run
/// use webpchunk::{AnimationAssembler, BlendMethod, DisposeMethod};
///
/// let rgba = vec![0u8; 64 * 64 * 4];
/// let still = webpchunk::encode_lossless_rgba(&rgba, 64, 64, 64 * 4, false)?;
///
/// let mut assembler = AnimationAssembler::new(64, 64)?.loop_count(0);
/// assembler.add_frame(&still, 0, 0, 100, BlendMethod::AlphaBlend, DisposeMethod::None)?;
/// assembler.add_frame(&still, 0, 0, 150, BlendMethod::Overwrite, DisposeMethod::None)?;
/// let animation = assembler.finish()?;
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct AnimationAssembler<C = LibWebp> {
    codec: C,
    canvas_width: u32,
    canvas_height: u32,
    loop_count: u16,
    background_color: [u8; 4],
    frames: Vec<u8>,
    frame_count: usize,
    has_alpha: bool,
}

impl AnimationAssembler<LibWebp> {
    /// Start an animation on a `width` x `height` canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_codec(width, height, LibWebp)
    }
}

impl<C: RasterCodec> AnimationAssembler<C> {
    /// Start an animation, probing frame dimensions with `codec`.
    pub fn with_codec(width: u32, height: u32, codec: C) -> Result<Self> {
        if width == 0 || height == 0 || width > Vp8x::MAX_CANVAS || height > Vp8x::MAX_CANVAS {
            return Err(at!(Error::InvalidArgument(alloc::format!(
                "canvas {}x{} out of range",
                width,
                height
            ))));
        }
        Ok(Self {
            codec,
            canvas_width: width,
            canvas_height: height,
            loop_count: 0,
            background_color: [0; 4],
            frames: Vec::new(),
            frame_count: 0,
            has_alpha: false,
        })
    }

    /// Number of times to play the animation (0 = forever).
    #[must_use]
    pub fn loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Background color in stored byte order (blue, green, red, alpha).
    #[must_use]
    pub fn background_color(mut self, bgra: [u8; 4]) -> Self {
        self.background_color = bgra;
        self
    }

    /// Number of frames added so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Append a frame taken from a still WebP file.
    ///
    /// Offsets must be even and the frame must lie inside the canvas.
    pub fn add_frame(
        &mut self,
        still: &[u8],
        x_offset: u32,
        y_offset: u32,
        duration_ms: u32,
        blend: BlendMethod,
        dispose: DisposeMethod,
    ) -> Result<()> {
        if x_offset % 2 != 0 || y_offset % 2 != 0 {
            return Err(at!(Error::InvalidArgument(alloc::format!(
                "frame offset ({}, {}) must be even",
                x_offset,
                y_offset
            ))));
        }
        if duration_ms > MAX_DURATION_MS {
            return Err(at!(Error::InvalidArgument(alloc::format!(
                "frame duration {}ms exceeds {}ms",
                duration_ms,
                MAX_DURATION_MS
            ))));
        }

        let records = parse(still)?;
        if records.iter().any(|r| r.id() == ChunkId::Anmf) {
            return Err(at!(Error::InvalidArgument(
                "frame source is already animated".into()
            )));
        }
        let image = records
            .iter()
            .position(|r| r.id().is_image())
            .ok_or_else(|| at!(Error::Format(FormatError::NoImageData)))?;
        let alpha = records[..image].iter().rfind(|r| r.id() == ChunkId::Alph);

        let features = self.codec.probe_features(still)?;
        let (width, height) = (features.width, features.height);
        if width == 0
            || height == 0
            || x_offset.saturating_add(width) > self.canvas_width
            || y_offset.saturating_add(height) > self.canvas_height
        {
            return Err(at!(Error::InvalidArgument(alloc::format!(
                "{}x{} frame at ({}, {}) outside {}x{} canvas",
                width,
                height,
                x_offset,
                y_offset,
                self.canvas_width,
                self.canvas_height
            ))));
        }

        let mut flags = 0u8;
        if dispose == DisposeMethod::Background {
            flags |= 0b01;
        }
        if blend == BlendMethod::Overwrite {
            flags |= 0b10;
        }

        let mut payload = Vec::with_capacity(16 + still.len());
        put_u24_le(&mut payload, x_offset / 2);
        put_u24_le(&mut payload, y_offset / 2);
        put_u24_le(&mut payload, width - 1);
        put_u24_le(&mut payload, height - 1);
        put_u24_le(&mut payload, duration_ms);
        payload.push(flags);
        if let Some(alpha) = alpha {
            payload.extend_from_slice(alpha.bytes());
        }
        payload.extend_from_slice(records[image].bytes());

        write_chunk(&mut self.frames, *b"ANMF", &payload)?;
        self.frame_count += 1;
        self.has_alpha |= features.has_alpha || alpha.is_some();
        Ok(())
    }

    /// Write `VP8X`, `ANIM`, and the collected frames.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.frame_count == 0 {
            return Err(at!(Error::InvalidArgument("animation has no frames".into())));
        }

        let mut flags = Vp8xFlags::ANIMATION;
        if self.has_alpha {
            flags |= Vp8xFlags::ALPHA;
        }
        let header = Vp8x {
            flags,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
        };

        let mut anim = Vec::with_capacity(6);
        anim.extend_from_slice(&self.background_color);
        anim.extend_from_slice(&self.loop_count.to_le_bytes());

        let mut body = Vec::with_capacity(40 + self.frames.len());
        write_chunk(&mut body, *b"VP8X", &header.to_bytes()?)?;
        write_chunk(&mut body, *b"ANIM", &anim)?;
        body.extend_from_slice(&self.frames);

        log::debug!(
            "assembled {} frames on {}x{} canvas",
            self.frame_count,
            self.canvas_width,
            self.canvas_height
        );
        finish_riff(&body)
    }
}
