//! Metadata chunk editing (ICC, EXIF, XMP).
//!
//! Every edit rebuilds the container from the walked chunk list. Chunks that
//! are not being edited are copied byte-for-byte, pad bytes included, and the
//! RIFF length is recomputed.

use crate::chunk::{finish_riff, parse, write_chunk, ChunkId, ChunkRecord};
use crate::codec::{LibWebp, RasterCodec};
use crate::error::{Error, FormatError, Result};
use crate::vp8x::{Vp8x, Vp8xFlags};
use alloc::vec::Vec;
use core::str::FromStr;
use whereat::*;

/// Kind of metadata chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    /// `EXIF` chunk.
    Exif,
    /// `ICCP` color profile.
    Icc,
    /// `XMP ` chunk.
    Xmp,
}

impl MetadataKind {
    /// Chunk type that stores this kind.
    #[must_use]
    pub fn chunk_id(self) -> ChunkId {
        match self {
            MetadataKind::Exif => ChunkId::Exif,
            MetadataKind::Icc => ChunkId::Iccp,
            MetadataKind::Xmp => ChunkId::Xmp,
        }
    }

    /// The fourCC tag for this kind.
    #[must_use]
    pub fn fourcc(self) -> [u8; 4] {
        self.chunk_id().fourcc()
    }

    /// The `VP8X` bit announcing this kind.
    #[must_use]
    pub fn flag(self) -> Vp8xFlags {
        match self {
            MetadataKind::Exif => Vp8xFlags::EXIF,
            MetadataKind::Icc => Vp8xFlags::ICC,
            MetadataKind::Xmp => Vp8xFlags::XMP,
        }
    }
}

impl FromStr for MetadataKind {
    type Err = At<Error>;

    /// Accepts `EXIF`, `ICCP`, or `XMP`, ignoring ASCII case and trailing spaces.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim_end();
        if name.eq_ignore_ascii_case("EXIF") {
            Ok(MetadataKind::Exif)
        } else if name.eq_ignore_ascii_case("ICCP") {
            Ok(MetadataKind::Icc)
        } else if name.eq_ignore_ascii_case("XMP") {
            Ok(MetadataKind::Xmp)
        } else {
            Err(at!(Error::InvalidArgument(alloc::format!(
                "unknown metadata kind {:?}",
                s
            ))))
        }
    }
}

/// Payload of the first chunk of `kind`.
///
/// Fails with [`FormatError::NotFound`] when the container has none.
///
/// # Example
///
/// ```rust,no_run
/// use webpchunk::MetadataKind;
///
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let icc = webpchunk::get_metadata(webp_data, MetadataKind::Icc)?;
/// println!("Found ICC profile: {} bytes", icc.len());
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn get_metadata(data: &[u8], kind: MetadataKind) -> Result<Vec<u8>> {
    let records = parse(data)?;
    records
        .iter()
        .find(|r| r.id() == kind.chunk_id())
        .map(|r| r.payload.to_vec())
        .ok_or_else(|| at!(Error::Format(FormatError::NotFound)))
}

/// Insert or replace the chunk of `kind`, using libwebp if a `VP8X` header
/// must be synthesized.
pub fn set_metadata(data: &[u8], kind: MetadataKind, bytes: &[u8]) -> Result<Vec<u8>> {
    set_metadata_with(data, kind, bytes, &LibWebp)
}

/// Insert or replace the chunk of `kind`.
///
/// An existing chunk is replaced in place. Otherwise the new chunk goes just
/// before any trailing unknown chunks, except a new `ICCP`, which goes right
/// after `VP8X` so it stays ahead of the image data. The `VP8X` flag for
/// `kind` is set; a simple-format file gets a `VP8X` header sized by
/// `codec`'s probe.
pub fn set_metadata_with<C: RasterCodec + ?Sized>(
    data: &[u8],
    kind: MetadataKind,
    bytes: &[u8],
    codec: &C,
) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "empty {:?} payload",
            kind
        ))));
    }

    let records = parse(data)?;
    let mut chunk = Vec::new();
    write_chunk(&mut chunk, kind.fourcc(), bytes)?;

    let existing = records.iter().position(|r| r.id() == kind.chunk_id());
    let insert_at = existing.unwrap_or_else(|| match kind {
        // ICCP must precede ANIM and the image data
        MetadataKind::Icc => records
            .iter()
            .position(|r| r.id() == ChunkId::Vp8x)
            .map_or(0, |i| i + 1),
        _ => records.len() - records.iter().rev().take_while(|r| r.id().is_unknown()).count(),
    });

    let mut body = Vec::with_capacity(data.len() + chunk.len() + 18);
    if !records.iter().any(|r| r.id() == ChunkId::Vp8x) {
        let header = synthesize_vp8x(&records, kind.flag(), codec)?;
        write_chunk(&mut body, *b"VP8X", &header.to_bytes()?)?;
    }

    for (i, record) in records.iter().enumerate() {
        if i == insert_at {
            body.extend_from_slice(&chunk);
            if existing.is_some() {
                continue;
            }
        }
        push_record(&mut body, record, |flags| flags | kind.flag())?;
    }
    if insert_at == records.len() {
        body.extend_from_slice(&chunk);
    }

    log::debug!(
        "set {:?}: {} bytes -> {} bytes",
        kind,
        data.len(),
        body.len() + crate::chunk::RIFF_HEADER_SIZE
    );
    finish_riff(&body)
}

/// Remove every chunk of `kind` and clear its `VP8X` flag.
///
/// Fails with [`FormatError::NotFound`] when the container has none.
pub fn delete_metadata(data: &[u8], kind: MetadataKind) -> Result<Vec<u8>> {
    let records = parse(data)?;
    if !records.iter().any(|r| r.id() == kind.chunk_id()) {
        return Err(at!(Error::Format(FormatError::NotFound)));
    }

    let mut body = Vec::with_capacity(data.len());
    for record in records.iter().filter(|r| r.id() != kind.chunk_id()) {
        push_record(&mut body, record, |flags| flags - kind.flag())?;
    }

    log::debug!(
        "removed {:?}: {} bytes -> {} bytes",
        kind,
        data.len(),
        body.len() + crate::chunk::RIFF_HEADER_SIZE
    );
    finish_riff(&body)
}

/// Copy a record verbatim, rewriting the flag byte if it is the `VP8X` header.
fn push_record(
    body: &mut Vec<u8>,
    record: &ChunkRecord<'_>,
    update: impl Fn(Vp8xFlags) -> Vp8xFlags,
) -> Result<()> {
    if record.id() != ChunkId::Vp8x {
        body.extend_from_slice(record.bytes());
        return Ok(());
    }
    let header = Vp8x::parse(record.payload)?;
    let mut payload = record.payload.to_vec();
    payload[0] = update(header.flags).bits();
    write_chunk(body, *b"VP8X", &payload)
}

/// Build a `VP8X` header for a simple-format file.
fn synthesize_vp8x<C: RasterCodec + ?Sized>(
    records: &[ChunkRecord<'_>],
    flags: Vp8xFlags,
    codec: &C,
) -> Result<Vp8x> {
    let image = records
        .iter()
        .find(|r| r.id().is_image())
        .ok_or_else(|| at!(Error::Format(FormatError::NoImageData)))?;
    let features = codec.probe_features(image.unpadded())?;

    let mut flags = flags;
    if features.has_alpha || records.iter().any(|r| r.id() == ChunkId::Alph) {
        flags |= Vp8xFlags::ALPHA;
    }
    log::debug!(
        "synthesizing VP8X {}x{} flags={:?}",
        features.width,
        features.height,
        flags
    );
    Ok(Vp8x {
        flags,
        canvas_width: features.width,
        canvas_height: features.height,
    })
}

/// Extract the ICC profile.
pub fn get_icc_profile(data: &[u8]) -> Result<Vec<u8>> {
    get_metadata(data, MetadataKind::Icc)
}

/// Extract EXIF metadata.
pub fn get_exif(data: &[u8]) -> Result<Vec<u8>> {
    get_metadata(data, MetadataKind::Exif)
}

/// Extract XMP metadata.
pub fn get_xmp(data: &[u8]) -> Result<Vec<u8>> {
    get_metadata(data, MetadataKind::Xmp)
}

/// Embed an ICC profile, replacing any existing one.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let icc_profile: &[u8] = &[0u8; 100]; // placeholder
/// let with_icc = webpchunk::embed_icc(webp_data, icc_profile)?;
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn embed_icc(data: &[u8], icc_profile: &[u8]) -> Result<Vec<u8>> {
    set_metadata(data, MetadataKind::Icc, icc_profile)
}

/// Embed EXIF metadata, replacing any existing chunk.
pub fn embed_exif(data: &[u8], exif: &[u8]) -> Result<Vec<u8>> {
    set_metadata(data, MetadataKind::Exif, exif)
}

/// Embed XMP metadata, replacing any existing chunk.
pub fn embed_xmp(data: &[u8], xmp: &[u8]) -> Result<Vec<u8>> {
    set_metadata(data, MetadataKind::Xmp, xmp)
}

/// Remove the ICC profile.
pub fn remove_icc(data: &[u8]) -> Result<Vec<u8>> {
    delete_metadata(data, MetadataKind::Icc)
}

/// Remove EXIF metadata.
pub fn remove_exif(data: &[u8]) -> Result<Vec<u8>> {
    delete_metadata(data, MetadataKind::Exif)
}

/// Remove XMP metadata.
pub fn remove_xmp(data: &[u8]) -> Result<Vec<u8>> {
    delete_metadata(data, MetadataKind::Xmp)
}
