//! Core types shared by the codec adapter and the container layer.

/// Bitstream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum BitstreamFormat {
    /// Format not determined (mixed animation frames, or no image chunk seen).
    #[default]
    Undefined,
    /// Lossy compression (VP8).
    Lossy,
    /// Lossless compression (VP8L).
    Lossless,
}

impl BitstreamFormat {
    pub(crate) fn from_libwebp(format: i32) -> Self {
        match format {
            1 => BitstreamFormat::Lossy,
            2 => BitstreamFormat::Lossless,
            _ => BitstreamFormat::Undefined,
        }
    }
}

/// Properties a codec reports for a bitstream without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamFeatures {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Whether the bitstream carries alpha.
    pub has_alpha: bool,
    /// Whether the data is an animation container.
    pub has_animation: bool,
    /// Lossy or lossless.
    pub format: BitstreamFormat,
}

/// Pixel layout for the byte-oriented codec entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 1 byte per pixel (luma).
    Gray,
    /// RGB - 3 bytes per pixel.
    Rgb,
    /// RGBA - 4 bytes per pixel.
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}
