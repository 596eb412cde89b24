//! RIFF chunk walking and writing.
//!
//! A WebP file is a 12-byte `RIFF <size> WEBP` header followed by chunks laid
//! out as `fourcc | u32 LE size | payload | optional pad byte`. [`ChunkWalker`]
//! yields those records lazily; [`write_chunk`] and [`finish_riff`] produce them.
//!
//! # Example
//!
//! ```rust,no_run
//! let webp_data: &[u8] = &[0u8; 100]; // placeholder
//! for chunk in webpchunk::chunks(webp_data)? {
//!     let chunk = chunk?;
//!     println!("{:?} at {}: {} bytes", chunk.id(), chunk.offset, chunk.size);
//! }
//! # Ok::<(), webpchunk::At<webpchunk::Error>>(())
//! ```

use crate::error::{Error, FormatError, Result};
use alloc::vec::Vec;
use core::fmt;
use whereat::*;

/// Size of the `RIFF <size> WEBP` file header.
pub const RIFF_HEADER_SIZE: usize = 12;

/// Size of a chunk header (fourcc + length).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Largest payload a chunk can declare while keeping the padded size in a `u32`.
const MAX_CHUNK_PAYLOAD: usize = (u32::MAX - 1) as usize;

/// Chunk type, dispatched from the fourCC tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkId {
    /// `VP8X` extended-features header.
    Vp8x,
    /// `VP8 ` lossy bitstream.
    Vp8,
    /// `VP8L` lossless bitstream.
    Vp8l,
    /// `ALPH` alpha plane for a lossy bitstream.
    Alph,
    /// `ANIM` global animation parameters.
    Anim,
    /// `ANMF` animation frame.
    Anmf,
    /// `ICCP` color profile.
    Iccp,
    /// `EXIF` metadata.
    Exif,
    /// `XMP ` metadata.
    Xmp,
    /// Any other tag, carried through untouched.
    Unknown([u8; 4]),
}

impl ChunkId {
    /// Classify a fourCC tag.
    #[must_use]
    pub fn from_fourcc(fourcc: [u8; 4]) -> Self {
        match &fourcc {
            b"VP8X" => ChunkId::Vp8x,
            b"VP8 " => ChunkId::Vp8,
            b"VP8L" => ChunkId::Vp8l,
            b"ALPH" => ChunkId::Alph,
            b"ANIM" => ChunkId::Anim,
            b"ANMF" => ChunkId::Anmf,
            b"ICCP" => ChunkId::Iccp,
            b"EXIF" => ChunkId::Exif,
            b"XMP " => ChunkId::Xmp,
            _ => ChunkId::Unknown(fourcc),
        }
    }

    /// The fourCC tag for this chunk type.
    #[must_use]
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            ChunkId::Vp8x => *b"VP8X",
            ChunkId::Vp8 => *b"VP8 ",
            ChunkId::Vp8l => *b"VP8L",
            ChunkId::Alph => *b"ALPH",
            ChunkId::Anim => *b"ANIM",
            ChunkId::Anmf => *b"ANMF",
            ChunkId::Iccp => *b"ICCP",
            ChunkId::Exif => *b"EXIF",
            ChunkId::Xmp => *b"XMP ",
            ChunkId::Unknown(fourcc) => fourcc,
        }
    }

    /// Whether this is a compressed image bitstream (`VP8 ` or `VP8L`).
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, ChunkId::Vp8 | ChunkId::Vp8l)
    }

    /// Whether this tag is not one WebP defines.
    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(self, ChunkId::Unknown(_))
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fourcc = self.fourcc();
        match core::str::from_utf8(&fourcc) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:02x?}", fourcc),
        }
    }
}

/// One RIFF chunk borrowed from the walked buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRecord<'a> {
    /// The 4-byte tag.
    pub fourcc: [u8; 4],
    /// Offset of the chunk header in the walked buffer.
    pub offset: usize,
    /// Declared payload length (pad byte excluded).
    pub size: u32,
    /// Payload bytes (pad byte excluded).
    pub payload: &'a [u8],
    /// Header, payload, and pad byte.
    raw: &'a [u8],
}

impl<'a> ChunkRecord<'a> {
    /// Chunk type of this record.
    #[must_use]
    pub fn id(&self) -> ChunkId {
        ChunkId::from_fourcc(self.fourcc)
    }

    /// The whole chunk as stored: header, payload, and pad byte if any.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.raw
    }

    /// Header plus payload, without the pad byte.
    ///
    /// This is the form libwebp accepts for a bare `VP8 `/`VP8L`/`ALPH` bitstream.
    #[must_use]
    pub fn unpadded(&self) -> &'a [u8] {
        &self.raw[..CHUNK_HEADER_SIZE + self.payload.len()]
    }

    /// Number of bytes this chunk occupies, including header and padding.
    #[must_use]
    pub fn padded_len(&self) -> usize {
        self.raw.len()
    }
}

/// Lazy, forward-only iterator over the chunks of a RIFF span.
///
/// Yields `Err` once on the first structural problem and is fused afterwards.
/// Restart by creating a new walker over the same buffer.
#[derive(Debug, Clone)]
pub struct ChunkWalker<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
    done: bool,
}

impl<'a> ChunkWalker<'a> {
    /// Validate the RIFF/WEBP header and walk the top-level chunks.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let end = parse_riff_header(data)?;
        Ok(Self {
            data,
            pos: RIFF_HEADER_SIZE,
            end,
            done: false,
        })
    }

    /// Walk the chunks stored in `data[start..end]`, such as the sub-chunks of an `ANMF`.
    ///
    /// Offsets in the yielded records stay relative to `data`.
    pub fn nested(data: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(data.len());
        Self {
            data,
            pos: start.min(end),
            end,
            done: false,
        }
    }

    fn fail(&mut self, kind: FormatError) -> Option<Result<ChunkRecord<'a>>> {
        self.done = true;
        Some(Err(at!(Error::Format(kind))))
    }
}

impl<'a> Iterator for ChunkWalker<'a> {
    type Item = Result<ChunkRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.end {
            return None;
        }

        let start = self.pos;
        if self.end - start < CHUNK_HEADER_SIZE {
            return self.fail(FormatError::Truncated);
        }

        let header = &self.data[start..start + CHUNK_HEADER_SIZE];
        let fourcc = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let payload_start = start + CHUNK_HEADER_SIZE;
        let remaining = self.end - payload_start;
        if size as usize > remaining {
            return self.fail(FormatError::SizeOverflow);
        }

        let payload_end = payload_start + size as usize;
        let chunk_end = payload_end + (size as usize & 1);
        if chunk_end > self.end {
            return self.fail(FormatError::Truncated);
        }

        self.pos = chunk_end;
        Some(Ok(ChunkRecord {
            fourcc,
            offset: start,
            size,
            payload: &self.data[payload_start..payload_end],
            raw: &self.data[start..chunk_end],
        }))
    }
}

impl core::iter::FusedIterator for ChunkWalker<'_> {}

/// Validate the 12-byte file header and return the end of the RIFF span.
///
/// Bytes past the declared RIFF length are not part of the container.
pub(crate) fn parse_riff_header(data: &[u8]) -> Result<usize> {
    if data.len() < RIFF_HEADER_SIZE {
        return Err(at!(Error::Format(FormatError::Truncated)));
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(at!(Error::Format(FormatError::InvalidHeader)));
    }

    let riff_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    if riff_size < 4 {
        return Err(at!(Error::Format(FormatError::InvalidHeader)));
    }

    let end = 8 + riff_size;
    if end > data.len() {
        return Err(at!(Error::Format(FormatError::Truncated)));
    }
    Ok(end)
}

/// Start walking the top-level chunks of a WebP buffer.
pub fn chunks(data: &[u8]) -> Result<ChunkWalker<'_>> {
    ChunkWalker::new(data)
}

/// Walk every top-level chunk, failing on the first structural problem.
pub fn parse(data: &[u8]) -> Result<Vec<ChunkRecord<'_>>> {
    chunks(data)?.collect()
}

/// Append one chunk (header, payload, pad byte) to `out`.
pub(crate) fn write_chunk(out: &mut Vec<u8>, fourcc: [u8; 4], payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_CHUNK_PAYLOAD {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "chunk payload too large: {} bytes",
            payload.len()
        ))));
    }

    out.reserve(CHUNK_HEADER_SIZE + payload.len() + 1);
    out.extend_from_slice(&fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() & 1 == 1 {
        out.push(0);
    }
    Ok(())
}

/// Wrap a chunk sequence in a `RIFF <size> WEBP` header.
pub(crate) fn finish_riff(body: &[u8]) -> Result<Vec<u8>> {
    let riff_size = body.len() + 4;
    if riff_size > MAX_CHUNK_PAYLOAD {
        return Err(at!(Error::Format(FormatError::SizeOverflow)));
    }

    let mut out = Vec::with_capacity(RIFF_HEADER_SIZE + body.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(riff_size as u32).to_le_bytes());
    out.extend_from_slice(b"WEBP");
    out.extend_from_slice(body);
    Ok(out)
}

/// Read a 24-bit little-endian value from the first 3 bytes.
pub(crate) fn read_u24_le(bytes: &[u8]) -> u32 {
    u32::from(bytes[0]) | (u32::from(bytes[1]) << 8) | (u32::from(bytes[2]) << 16)
}

/// Write the low 24 bits of `value` little-endian.
pub(crate) fn put_u24_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes()[..3]);
}
