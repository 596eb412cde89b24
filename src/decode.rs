//! Single-image decoding through libwebp.
//!
//! These accept a full WebP file or a bare `VP8 `/`VP8L` chunk (optionally
//! preceded by its `ALPH` chunk), which is how animation frames are handed over.

use crate::error::{DecodingError, Error, Result};
use crate::types::{BitstreamFeatures, BitstreamFormat, PixelFormat};
use alloc::vec::Vec;
use imgref::ImgVec;
use rgb::{FromSlice, RGBA8};
use whereat::*;

fn check_input(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(at!(Error::InvalidArgument("empty WebP data".into())));
    }
    Ok(())
}

/// Read dimensions and capabilities from a bitstream without decoding pixels.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let features = webpchunk::probe_features(webp_data)?;
/// println!("{}x{} alpha={}", features.width, features.height, features.has_alpha);
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn probe_features(data: &[u8]) -> Result<BitstreamFeatures> {
    check_input(data)?;

    let mut features = core::mem::MaybeUninit::<libwebp_sys::WebPBitstreamFeatures>::zeroed();
    let status =
        unsafe { libwebp_sys::WebPGetFeatures(data.as_ptr(), data.len(), features.as_mut_ptr()) };

    if status != libwebp_sys::VP8StatusCode::VP8_STATUS_OK {
        return Err(at!(Error::DecodeFailed(DecodingError::from(status as i32))));
    }
    let features = unsafe { features.assume_init() };

    Ok(BitstreamFeatures {
        width: features.width as u32,
        height: features.height as u32,
        has_alpha: features.has_alpha != 0,
        has_animation: features.has_animation != 0,
        format: BitstreamFormat::from_libwebp(features.format),
    })
}

/// Decode WebP data to RGBA pixels.
///
/// Returns the decoded pixels and dimensions.
pub fn decode_rgba(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    check_input(data)?;

    let mut width: i32 = 0;
    let mut height: i32 = 0;

    let ptr =
        unsafe { libwebp_sys::WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height) };

    if ptr.is_null() {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    let size = (width as usize) * (height as usize) * 4;
    let pixels = unsafe {
        let slice = core::slice::from_raw_parts(ptr, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(ptr as *mut _);
        vec
    };

    Ok((pixels, width as u32, height as u32))
}

/// Decode WebP data to RGB pixels (alpha dropped).
pub fn decode_rgb(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    check_input(data)?;

    let mut width: i32 = 0;
    let mut height: i32 = 0;

    let ptr =
        unsafe { libwebp_sys::WebPDecodeRGB(data.as_ptr(), data.len(), &mut width, &mut height) };

    if ptr.is_null() {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    let size = (width as usize) * (height as usize) * 3;
    let pixels = unsafe {
        let slice = core::slice::from_raw_parts(ptr, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(ptr as *mut _);
        vec
    };

    Ok((pixels, width as u32, height as u32))
}

/// Decode WebP data to 8-bit grayscale.
///
/// The luma plane of the YUV decode is returned with its row padding removed.
pub fn decode_gray(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    check_input(data)?;

    let mut width: i32 = 0;
    let mut height: i32 = 0;
    let mut u_ptr: *mut u8 = core::ptr::null_mut();
    let mut v_ptr: *mut u8 = core::ptr::null_mut();
    let mut y_stride: i32 = 0;
    let mut uv_stride: i32 = 0;

    let y_ptr = unsafe {
        libwebp_sys::WebPDecodeYUV(
            data.as_ptr(),
            data.len(),
            &mut width,
            &mut height,
            &mut u_ptr,
            &mut v_ptr,
            &mut y_stride,
            &mut uv_stride,
        )
    };

    if y_ptr.is_null() {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    let (w, h, stride) = (width as usize, height as usize, y_stride as usize);
    let mut pixels = Vec::with_capacity(w * h);
    unsafe {
        let plane = core::slice::from_raw_parts(y_ptr, stride * h);
        for row in plane.chunks_exact(stride) {
            pixels.extend_from_slice(&row[..w]);
        }
        // u and v live in the same allocation as y
        libwebp_sys::WebPFree(y_ptr as *mut _);
    }

    Ok((pixels, width as u32, height as u32))
}

/// Decode WebP data to RGBA pixels, scaled to `width` x `height`.
///
/// # Example
///
/// ```rust,no_run
/// let webp_data: &[u8] = &[0u8; 100]; // placeholder
/// let thumb = webpchunk::decode_rgba_to_size(webp_data, 64, 64)?;
/// assert_eq!(thumb.len(), 64 * 64 * 4);
/// # Ok::<(), webpchunk::At<webpchunk::Error>>(())
/// ```
pub fn decode_rgba_to_size(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    decode_scaled(data, width, height, PixelFormat::Rgba)
}

/// Decode WebP data to RGB pixels, scaled to `width` x `height`.
pub fn decode_rgb_to_size(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    decode_scaled(data, width, height, PixelFormat::Rgb)
}

/// Decode WebP data to 8-bit grayscale, scaled to `width` x `height`.
pub fn decode_gray_to_size(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    decode_scaled(data, width, height, PixelFormat::Gray)
}

/// Advanced decode with libwebp's rescaler. Gray reads the luma plane of a YUV decode.
fn decode_scaled(data: &[u8], width: u32, height: u32, format: PixelFormat) -> Result<Vec<u8>> {
    check_input(data)?;
    let (Ok(scaled_width), Ok(scaled_height)) = (i32::try_from(width), i32::try_from(height))
    else {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "target size {}x{} out of range",
            width,
            height
        ))));
    };
    if width == 0 || height == 0 {
        return Err(at!(Error::InvalidArgument(alloc::format!(
            "target size {}x{} is empty",
            width,
            height
        ))));
    }

    let mut dec_config = libwebp_sys::WebPDecoderConfig::new()
        .map_err(|_| at!(Error::DecodeFailed(DecodingError::InvalidParam)))?;
    dec_config.options.use_scaling = 1;
    dec_config.options.scaled_width = scaled_width;
    dec_config.options.scaled_height = scaled_height;
    dec_config.output.colorspace = match format {
        PixelFormat::Rgba => libwebp_sys::WEBP_CSP_MODE::MODE_RGBA,
        PixelFormat::Rgb => libwebp_sys::WEBP_CSP_MODE::MODE_RGB,
        PixelFormat::Gray => libwebp_sys::WEBP_CSP_MODE::MODE_YUV,
    };

    let status = unsafe { libwebp_sys::WebPDecode(data.as_ptr(), data.len(), &mut dec_config) };
    if status != libwebp_sys::VP8StatusCode::VP8_STATUS_OK {
        return Err(at!(Error::DecodeFailed(DecodingError::from(status as i32))));
    }

    let (w, h) = (width as usize, height as usize);
    let row_len = w * format.bytes_per_pixel();
    let (plane, stride) = unsafe {
        match format {
            PixelFormat::Gray => (
                dec_config.output.u.YUVA.y,
                dec_config.output.u.YUVA.y_stride as usize,
            ),
            _ => (
                dec_config.output.u.RGBA.rgba,
                dec_config.output.u.RGBA.stride as usize,
            ),
        }
    };
    if plane.is_null() || stride < row_len {
        unsafe { libwebp_sys::WebPFreeDecBuffer(&mut dec_config.output) };
        return Err(at!(Error::DecodeFailed(DecodingError::OutOfMemory)));
    }

    let mut pixels = Vec::with_capacity(row_len * h);
    unsafe {
        let rows = core::slice::from_raw_parts(plane, stride * (h - 1) + row_len);
        for y in 0..h {
            pixels.extend_from_slice(&rows[y * stride..y * stride + row_len]);
        }
        libwebp_sys::WebPFreeDecBuffer(&mut dec_config.output);
    }
    Ok(pixels)
}

/// Decode WebP data to an imgref image of [`RGBA8`] pixels.
pub fn decode_to_img(data: &[u8]) -> Result<ImgVec<RGBA8>> {
    let (pixels, width, height) = decode_rgba(data)?;
    Ok(ImgVec::new(
        pixels.as_rgba().to_vec(),
        width as usize,
        height as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_invalid_argument() {
        for result in [decode_rgba(&[]), decode_rgb(&[]), decode_gray(&[])] {
            assert!(matches!(
                result.unwrap_err().into_inner(),
                Error::InvalidArgument(_)
            ));
        }
        assert!(matches!(
            probe_features(&[]).unwrap_err().into_inner(),
            Error::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_sized_decode_rejects_bad_arguments() {
        let sized = [decode_rgba_to_size, decode_rgb_to_size, decode_gray_to_size];
        for decode in sized {
            let err = decode(&[], 4, 4).unwrap_err().into_inner();
            assert!(matches!(err, Error::InvalidArgument(_)));
            let err = decode(b"RIFF", 0, 4).unwrap_err().into_inner();
            assert!(matches!(err, Error::InvalidArgument(_)));
            let err = decode(b"RIFF", 4, u32::MAX).unwrap_err().into_inner();
            assert!(matches!(err, Error::InvalidArgument(_)));
            let err = decode(b"definitely not webp", 4, 4).unwrap_err().into_inner();
            assert!(err.is_codec_error());
        }
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let err = decode_rgba(b"definitely not webp").unwrap_err().into_inner();
        assert!(err.is_codec_error());
        let err = probe_features(b"definitely not webp").unwrap_err().into_inner();
        assert!(err.is_codec_error());
    }
}
