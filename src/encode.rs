//! Single-image encoding through libwebp.
//!
//! Every entry point takes a row stride in bytes so callers can hand over
//! sub-views of larger buffers.

use crate::config::EncoderConfig;
use crate::error::{EncodingError, Error, Result};
use crate::types::PixelFormat;
use alloc::vec::Vec;
use core::ptr;
use whereat::*;

type SimpleEncodeFn =
    unsafe extern "C" fn(*const u8, i32, i32, i32, f32, *mut *mut u8) -> usize;
type SimpleLosslessFn = unsafe extern "C" fn(*const u8, i32, i32, i32, *mut *mut u8) -> usize;

/// Encode RGBA pixels to lossy WebP.
///
/// # Arguments
///
/// * `data` - RGBA pixel data (4 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `stride` - Row stride in bytes (at least `width * 4`)
/// * `quality` - Quality factor (0.0 = smallest, 100.0 = best)
///
/// # Example
///
/// ```rust,no_run
/// let rgba: &[u8] = &[0u8; 640 * 480 * 4]; // placeholder
/// let webp = webpchunk::encode_rgba(rgba, 640, 480, 640 * 4, 85.0)?;
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn encode_rgba(data: &[u8], width: u32, height: u32, stride: u32, quality: f32) -> Result<Vec<u8>> {
    validate_quality(quality)?;
    validate_input(data, width, height, stride, PixelFormat::Rgba)?;
    encode_simple(libwebp_sys::WebPEncodeRGBA, data, width, height, stride, quality)
}

/// Encode RGB pixels to lossy WebP.
pub fn encode_rgb(data: &[u8], width: u32, height: u32, stride: u32, quality: f32) -> Result<Vec<u8>> {
    validate_quality(quality)?;
    validate_input(data, width, height, stride, PixelFormat::Rgb)?;
    encode_simple(libwebp_sys::WebPEncodeRGB, data, width, height, stride, quality)
}

/// Encode 8-bit grayscale pixels to lossy WebP.
///
/// libwebp has no luma-only input path, so rows are expanded to RGB first.
pub fn encode_gray(data: &[u8], width: u32, height: u32, stride: u32, quality: f32) -> Result<Vec<u8>> {
    validate_quality(quality)?;
    validate_input(data, width, height, stride, PixelFormat::Gray)?;
    let rgb = gray_to_rgb(data, width, height, stride);
    encode_simple(libwebp_sys::WebPEncodeRGB, &rgb, width, height, width * 3, quality)
}

/// Encode RGBA pixels to lossless WebP.
///
/// With `exact` set, RGB values under fully transparent pixels are kept
/// bit-exact instead of being rewritten for better compression.
pub fn encode_lossless_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    exact: bool,
) -> Result<Vec<u8>> {
    if exact {
        return EncoderConfig::new_lossless()
            .exact(true)
            .encode_rgba(data, width, height, stride);
    }
    validate_input(data, width, height, stride, PixelFormat::Rgba)?;
    encode_simple_lossless(libwebp_sys::WebPEncodeLosslessRGBA, data, width, height, stride)
}

/// Encode RGB pixels to lossless WebP.
pub fn encode_lossless_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Result<Vec<u8>> {
    validate_input(data, width, height, stride, PixelFormat::Rgb)?;
    encode_simple_lossless(libwebp_sys::WebPEncodeLosslessRGB, data, width, height, stride)
}

/// Encode 8-bit grayscale pixels to lossless WebP.
pub fn encode_lossless_gray(data: &[u8], width: u32, height: u32, stride: u32) -> Result<Vec<u8>> {
    validate_input(data, width, height, stride, PixelFormat::Gray)?;
    let rgb = gray_to_rgb(data, width, height, stride);
    encode_simple_lossless(libwebp_sys::WebPEncodeLosslessRGB, &rgb, width, height, width * 3)
}

fn encode_simple(
    encode: SimpleEncodeFn,
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    quality: f32,
) -> Result<Vec<u8>> {
    let mut output: *mut u8 = ptr::null_mut();
    let size = unsafe {
        encode(
            data.as_ptr(),
            width as i32,
            height as i32,
            stride as i32,
            quality,
            &mut output,
        )
    };
    take_output(output, size)
}

fn encode_simple_lossless(
    encode: SimpleLosslessFn,
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<Vec<u8>> {
    let mut output: *mut u8 = ptr::null_mut();
    let size = unsafe {
        encode(
            data.as_ptr(),
            width as i32,
            height as i32,
            stride as i32,
            &mut output,
        )
    };
    take_output(output, size)
}

/// Copy a libwebp-owned output buffer into a Vec and release it.
fn take_output(output: *mut u8, size: usize) -> Result<Vec<u8>> {
    if size == 0 || output.is_null() {
        if !output.is_null() {
            unsafe { libwebp_sys::WebPFree(output as *mut _) };
        }
        return Err(at!(Error::EncodeFailed(EncodingError::OutOfMemory)));
    }

    let result = unsafe {
        let slice = core::slice::from_raw_parts(output, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(output as *mut _);
        vec
    };
    Ok(result)
}

/// Encode through the advanced API with a full [`EncoderConfig`].
pub(crate) fn encode_with_config(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
    config: &EncoderConfig,
) -> Result<Vec<u8>> {
    validate_input(data, width, height, stride, format)?;

    let webp_config = config.to_libwebp()?;

    let mut picture = libwebp_sys::WebPPicture::new()
        .map_err(|_| at!(Error::InvalidArgument("failed to init picture".into())))?;

    picture.width = width as i32;
    picture.height = height as i32;
    picture.use_argb = 1;

    let import_ok = unsafe {
        match format {
            PixelFormat::Rgba => {
                libwebp_sys::WebPPictureImportRGBA(&mut picture, data.as_ptr(), stride as i32)
            }
            PixelFormat::Rgb => {
                libwebp_sys::WebPPictureImportRGB(&mut picture, data.as_ptr(), stride as i32)
            }
            PixelFormat::Gray => {
                let rgb = gray_to_rgb(data, width, height, stride);
                libwebp_sys::WebPPictureImportRGB(&mut picture, rgb.as_ptr(), (width * 3) as i32)
            }
        }
    };

    if import_ok == 0 {
        unsafe { libwebp_sys::WebPPictureFree(&mut picture) };
        return Err(at!(Error::EncodeFailed(EncodingError::OutOfMemory)));
    }

    let mut writer = core::mem::MaybeUninit::<libwebp_sys::WebPMemoryWriter>::uninit();
    unsafe { libwebp_sys::WebPMemoryWriterInit(writer.as_mut_ptr()) };
    let mut writer = unsafe { writer.assume_init() };

    picture.writer = Some(libwebp_sys::WebPMemoryWrite);
    picture.custom_ptr = &mut writer as *mut _ as *mut _;

    let ok = unsafe { libwebp_sys::WebPEncode(&webp_config, &mut picture) };

    let result = if ok == 0 {
        Err(at!(Error::EncodeFailed(EncodingError::from(
            picture.error_code as i32
        ))))
    } else {
        Ok(unsafe { core::slice::from_raw_parts(writer.mem, writer.size) }.to_vec())
    };

    unsafe {
        libwebp_sys::WebPPictureFree(&mut picture);
        libwebp_sys::WebPMemoryWriterClear(&mut writer);
    }

    result
}

fn gray_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let (w, h, stride) = (width as usize, height as usize, stride as usize);
    let mut rgb = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for &luma in &data[y * stride..y * stride + w] {
            rgb.extend_from_slice(&[luma, luma, luma]);
        }
    }
    rgb
}

fn validate_quality(quality: f32) -> Result<()> {
    if !(0.0..=100.0).contains(&quality) {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "quality {} outside 0..=100",
            quality
        ))));
    }
    Ok(())
}

fn validate_input(data: &[u8], width: u32, height: u32, stride: u32, format: PixelFormat) -> Result<()> {
    validate_dimensions(width, height)?;
    validate_buffer_size(data.len(), width, height, stride, format.bytes_per_pixel())
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    const MAX_DIMENSION: u32 = 16383;

    if width == 0 || height == 0 {
        return Err(at!(Error::InvalidArgument(
            "width and height must be non-zero".into(),
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "dimensions exceed maximum ({} x {})",
            MAX_DIMENSION,
            MAX_DIMENSION
        ))));
    }
    Ok(())
}

/// The last row only needs `width * bpp` bytes, not a full stride.
pub(crate) fn validate_buffer_size(
    size: usize,
    width: u32,
    height: u32,
    stride: u32,
    bpp: usize,
) -> Result<()> {
    let row = (width as usize).saturating_mul(bpp);
    if (stride as usize) < row {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "stride too small: got {}, minimum {}",
            stride,
            row
        ))));
    }

    let expected = (stride as usize)
        .saturating_mul(height as usize - 1)
        .saturating_add(row);
    if size < expected {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "buffer too small: got {}, expected {}",
            size,
            expected
        ))));
    }
    Ok(())
}
