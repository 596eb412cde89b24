//! Top-level image properties read from the chunk stream.

use crate::chunk::{parse, ChunkId, ChunkRecord};
use crate::codec::{LibWebp, RasterCodec};
use crate::error::{Error, FormatError, Result};
use crate::types::BitstreamFormat;
use crate::vp8x::{Vp8x, Vp8xFlags};
use whereat::*;

/// Largest canvas side reported by the inspector.
const MAX_DIMENSION: u32 = 16384;

/// Snapshot of what a container holds, computed without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Whether the image declares alpha.
    pub has_alpha: bool,
    /// Whether the image declares animation.
    pub has_animation: bool,
    /// Whether an `ICCP` chunk is present.
    pub has_icc: bool,
    /// Whether an `EXIF` chunk is present.
    pub has_exif: bool,
    /// Whether an `XMP ` chunk is present.
    pub has_xmp: bool,
    /// Number of `ANMF` chunks, or 1 for a still image.
    pub frame_count: u32,
    /// Bitstream type of the first image chunk; `Undefined` for animations
    /// that mix lossy and lossless frames.
    pub format: BitstreamFormat,
}

/// Inspect a container using libwebp for the simple-format probe.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let info = webpchunk::inspect(webp_data)?;
/// println!("{}x{} exif={}", info.width, info.height, info.has_exif);
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn inspect(data: &[u8]) -> Result<ContainerInfo> {
    inspect_with(data, &LibWebp)
}

/// Inspect a container, probing bare image chunks with `codec`.
pub fn inspect_with<C: RasterCodec + ?Sized>(data: &[u8], codec: &C) -> Result<ContainerInfo> {
    let records = parse(data)?;
    inspect_records(&records, codec)
}

pub(crate) fn inspect_records<C: RasterCodec + ?Sized>(
    records: &[ChunkRecord<'_>],
    codec: &C,
) -> Result<ContainerInfo> {
    let has = |id: ChunkId| records.iter().any(|r| r.id() == id);
    let anmf_count = records.iter().filter(|r| r.id() == ChunkId::Anmf).count() as u32;
    let format = detect_format(records);

    let vp8x = records.iter().find(|r| r.id() == ChunkId::Vp8x);
    let (width, height, has_alpha, has_animation) = match vp8x {
        Some(record) => {
            let header = Vp8x::parse(record.payload)?;
            if header.canvas_width > MAX_DIMENSION || header.canvas_height > MAX_DIMENSION {
                return Err(at!(Error::Format(FormatError::InvalidHeader)));
            }
            (
                header.canvas_width,
                header.canvas_height,
                header.flags.contains(Vp8xFlags::ALPHA),
                header.flags.contains(Vp8xFlags::ANIMATION),
            )
        }
        None => {
            let image = records
                .iter()
                .find(|r| r.id().is_image())
                .ok_or_else(|| at!(Error::Format(FormatError::NoImageData)))?;
            let features = codec.probe_features(image.unpadded())?;
            (
                features.width,
                features.height,
                features.has_alpha || has(ChunkId::Alph),
                false,
            )
        }
    };

    Ok(ContainerInfo {
        width,
        height,
        has_alpha,
        has_animation,
        has_icc: has(ChunkId::Iccp),
        has_exif: has(ChunkId::Exif),
        has_xmp: has(ChunkId::Xmp),
        frame_count: if anmf_count > 0 { anmf_count } else { 1 },
        format,
    })
}

/// Bitstream type from the top-level image chunk, or from the frame sub-chunks.
fn detect_format(records: &[ChunkRecord<'_>]) -> BitstreamFormat {
    let of = |id: ChunkId| match id {
        ChunkId::Vp8 => Some(BitstreamFormat::Lossy),
        ChunkId::Vp8l => Some(BitstreamFormat::Lossless),
        _ => None,
    };

    if let Some(format) = records.iter().find_map(|r| of(r.id())) {
        return format;
    }

    let mut seen = None;
    for frame in records.iter().filter(|r| r.id() == ChunkId::Anmf) {
        let Some(format) = crate::animation::frame_image_id(frame).and_then(of) else {
            continue;
        };
        match seen {
            None => seen = Some(format),
            Some(prev) if prev != format => return BitstreamFormat::Undefined,
            Some(_) => {}
        }
    }
    seen.unwrap_or_default()
}
