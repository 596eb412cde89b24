//! The `VP8X` extended-features header.

use crate::chunk::{put_u24_le, read_u24_le};
use crate::error::{Error, FormatError, Result};
use alloc::vec::Vec;
use whereat::*;

bitflags::bitflags! {
    /// Capability bits in the first byte of a `VP8X` payload.
    ///
    /// Reserved bits are retained as read so a rewritten header keeps them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Vp8xFlags: u8 {
        /// An `ICCP` chunk is present.
        const ICC = 0b0010_0000;
        /// Some image data carries alpha.
        const ALPHA = 0b0001_0000;
        /// An `EXIF` chunk is present.
        const EXIF = 0b0000_1000;
        /// An `XMP ` chunk is present.
        const XMP = 0b0000_0100;
        /// The file is an animation.
        const ANIMATION = 0b0000_0010;
    }
}

/// Parsed `VP8X` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vp8x {
    /// Capability flags.
    pub flags: Vp8xFlags,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
}

impl Vp8x {
    /// Payload size of a `VP8X` chunk.
    pub const SIZE: usize = 10;

    /// Largest canvas dimension the 24-bit fields can express.
    pub const MAX_CANVAS: u32 = 1 << 24;

    /// Parse a `VP8X` payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::SIZE {
            return Err(at!(Error::Format(FormatError::Truncated)));
        }
        Ok(Self {
            flags: Vp8xFlags::from_bits_retain(payload[0]),
            canvas_width: read_u24_le(&payload[4..7]) + 1,
            canvas_height: read_u24_le(&payload[7..10]) + 1,
        })
    }

    /// Serialize to a 10-byte payload (reserved bytes zeroed).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.canvas_width == 0
            || self.canvas_height == 0
            || self.canvas_width > Self::MAX_CANVAS
            || self.canvas_height > Self::MAX_CANVAS
        {
            return Err(at!(Error::InvalidArgument(alloc::format!(
                "canvas {}x{} out of range",
                self.canvas_width,
                self.canvas_height
            ))));
        }

        let mut out = Vec::with_capacity(Self::SIZE);
        out.push(self.flags.bits());
        out.extend_from_slice(&[0; 3]);
        put_u24_le(&mut out, self.canvas_width - 1);
        put_u24_le(&mut out, self.canvas_height - 1);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vp8x() {
        let payload = [0x2c, 0, 0, 0, 99, 0, 0, 49, 0, 0];
        let vp8x = Vp8x::parse(&payload).unwrap();
        assert!(vp8x.flags.contains(Vp8xFlags::ICC));
        assert!(vp8x.flags.contains(Vp8xFlags::EXIF | Vp8xFlags::XMP));
        assert!(!vp8x.flags.contains(Vp8xFlags::ANIMATION));
        assert_eq!((vp8x.canvas_width, vp8x.canvas_height), (100, 50));
        assert_eq!(vp8x.to_bytes().unwrap(), payload);
    }

    #[test]
    fn test_reserved_bits_survive() {
        let payload = [0x81, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let vp8x = Vp8x::parse(&payload).unwrap();
        assert_eq!(vp8x.flags.bits(), 0x81);
        assert_eq!(vp8x.to_bytes().unwrap()[0], 0x81);
    }

    #[test]
    fn test_short_payload() {
        let err = Vp8x::parse(&[0; 9]).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::Truncated));
    }

    #[test]
    fn test_canvas_range() {
        let vp8x = Vp8x {
            flags: Vp8xFlags::empty(),
            canvas_width: 0,
            canvas_height: 10,
        };
        assert!(vp8x.to_bytes().is_err());

        let vp8x = Vp8x {
            flags: Vp8xFlags::empty(),
            canvas_width: Vp8x::MAX_CANVAS,
            canvas_height: 1,
        };
        assert_eq!(&vp8x.to_bytes().unwrap()[4..7], &[0xff, 0xff, 0xff]);
    }
}
