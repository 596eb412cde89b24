//! Encoder configuration.

use crate::error::{Error, Result};
use crate::types::PixelFormat;
use alloc::vec::Vec;
use whereat::*;

/// Content-aware encoding presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Preset {
    /// Default preset, balanced for general use.
    #[default]
    Default = 0,
    /// Digital picture (portrait, indoor shot).
    Picture = 1,
    /// Outdoor photograph with natural lighting.
    Photo = 2,
    /// Hand or line drawing with high-contrast details.
    Drawing = 3,
    /// Small-sized colorful images like icons or sprites.
    Icon = 4,
    /// Text-heavy images.
    Text = 5,
}

impl Preset {
    pub(crate) fn to_libwebp(self) -> libwebp_sys::WebPPreset {
        match self {
            Preset::Default => libwebp_sys::WebPPreset::WEBP_PRESET_DEFAULT,
            Preset::Picture => libwebp_sys::WebPPreset::WEBP_PRESET_PICTURE,
            Preset::Photo => libwebp_sys::WebPPreset::WEBP_PRESET_PHOTO,
            Preset::Drawing => libwebp_sys::WebPPreset::WEBP_PRESET_DRAWING,
            Preset::Icon => libwebp_sys::WebPPreset::WEBP_PRESET_ICON,
            Preset::Text => libwebp_sys::WebPPreset::WEBP_PRESET_TEXT,
        }
    }
}

/// WebP encoder configuration. Dimension-independent, reusable across images.
///
/// # Example
///
/// ```rust
/// use webpchunk::EncoderConfig;
///
/// let config = EncoderConfig::new_lossless().exact(true);
/// let rgba = vec![0u8; 4 * 4 * 4]; // 4x4 RGBA, fully transparent
/// let webp = config.encode_rgba(&rgba, 4, 4, 16)?;
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub(crate) quality: f32,
    pub(crate) preset: Preset,
    pub(crate) lossless: bool,
    pub(crate) method: u8,
    pub(crate) alpha_quality: u8,
    pub(crate) exact: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            quality: 75.0,
            preset: Preset::Default,
            lossless: false,
            method: 4,
            alpha_quality: 100,
            exact: false,
        }
    }
}

impl EncoderConfig {
    /// Lossy encoding at quality 75, method 4.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lossless encoding. Quality then controls compression effort.
    #[must_use]
    pub fn new_lossless() -> Self {
        Self {
            lossless: true,
            ..Self::default()
        }
    }

    /// Set encoding quality (0.0 = smallest, 100.0 = best).
    #[must_use]
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality.clamp(0.0, 100.0);
        self
    }

    /// Set content-aware preset.
    #[must_use]
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Enable or disable lossless compression.
    #[must_use]
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    /// Set quality/speed tradeoff (0 = fast, 6 = slower but better).
    #[must_use]
    pub fn method(mut self, method: u8) -> Self {
        self.method = method.min(6);
        self
    }

    /// Set alpha plane quality (0-100, default 100).
    #[must_use]
    pub fn alpha_quality(mut self, quality: u8) -> Self {
        self.alpha_quality = quality.min(100);
        self
    }

    /// Preserve exact RGB values under fully transparent pixels.
    #[must_use]
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Get the quality setting.
    #[must_use]
    pub fn get_quality(&self) -> f32 {
        self.quality
    }

    /// Check if lossless mode is enabled.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.lossless
    }

    /// Check if exact mode is enabled.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Encode RGBA pixel data with a row stride in bytes.
    pub fn encode_rgba(&self, data: &[u8], width: u32, height: u32, stride: u32) -> Result<Vec<u8>> {
        crate::encode::encode_with_config(data, width, height, stride, PixelFormat::Rgba, self)
    }

    /// Encode RGB pixel data with a row stride in bytes.
    pub fn encode_rgb(&self, data: &[u8], width: u32, height: u32, stride: u32) -> Result<Vec<u8>> {
        crate::encode::encode_with_config(data, width, height, stride, PixelFormat::Rgb, self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let _ = self.to_libwebp()?;
        Ok(())
    }

    pub(crate) fn to_libwebp(&self) -> Result<libwebp_sys::WebPConfig> {
        let mut config =
            libwebp_sys::WebPConfig::new_with_preset(self.preset.to_libwebp(), self.quality)
                .map_err(|_| {
                    at!(Error::InvalidArgument(
                        "failed to initialize encoder config".into()
                    ))
                })?;

        config.lossless = self.lossless as i32;
        config.method = self.method as i32;
        config.alpha_quality = self.alpha_quality as i32;
        config.exact = self.exact as i32;

        if unsafe { libwebp_sys::WebPValidateConfig(&config) } == 0 {
            return Err(at!(Error::InvalidArgument(
                "encoder config validation failed".into()
            )));
        }

        Ok(config)
    }
}
