//! Integration tests for webpchunk crate.

use webpchunk::*;

/// Generate a solid color RGBA image.
fn generate_rgba(width: u32, height: u32, r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.extend_from_slice(&[r, g, b, a]);
    }
    data
}

/// Generate a gradient RGBA image.
fn generate_gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = (((x + y) * 127) / (width + height).max(1)) as u8;
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    data
}

fn lossless(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    encode_lossless_rgba(pixels, width, height, width * 4, false).expect("encode failed")
}

fn fourccs(data: &[u8]) -> Vec<[u8; 4]> {
    parse(data)
        .expect("parse failed")
        .iter()
        .map(|c| c.fourcc)
        .collect()
}

/// Two lossless frames on a 100x100 canvas, 100ms and 150ms.
fn two_frame_animation() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let first = generate_rgba(100, 100, 255, 0, 0, 255);
    let second = generate_rgba(50, 40, 0, 0, 255, 255);

    let mut assembler = AnimationAssembler::new(100, 100)
        .expect("canvas")
        .loop_count(3);
    assembler
        .add_frame(
            &lossless(100, 100, &first),
            0,
            0,
            100,
            BlendMethod::AlphaBlend,
            DisposeMethod::None,
        )
        .expect("frame 0");
    assembler
        .add_frame(
            &lossless(50, 40, &second),
            10,
            20,
            150,
            BlendMethod::Overwrite,
            DisposeMethod::Background,
        )
        .expect("frame 1");
    (assembler.finish().expect("finish"), first, second)
}

mod codec {
    use super::*;

    #[test]
    fn test_lossless_roundtrip() {
        let original = generate_rgba(64, 64, 128, 64, 192, 255);
        let webp = lossless(64, 64, &original);

        let features = probe_features(&webp).expect("probe failed");
        assert_eq!((features.width, features.height), (64, 64));
        assert_eq!(features.format, BitstreamFormat::Lossless);
        assert!(!features.has_animation);

        let (decoded, w, h) = decode_rgba(&webp).expect("decode failed");
        assert_eq!((w, h), (64, 64));
        assert_eq!(decoded, original, "lossless roundtrip should be exact");
    }

    #[test]
    fn test_lossy_dimensions() {
        let original = generate_gradient_rgba(100, 80);
        let webp = encode_rgba(&original, 100, 80, 400, 90.0).expect("encode failed");

        let features = probe_features(&webp).expect("probe failed");
        assert_eq!(features.format, BitstreamFormat::Lossy);

        let (decoded, w, h) = decode_rgb(&webp).expect("decode failed");
        assert_eq!((w, h), (100, 80));
        assert_eq!(decoded.len(), 100 * 80 * 3);

        let img = decode_to_img(&webp).expect("decode failed");
        assert_eq!((img.width(), img.height()), (100, 80));
    }

    #[test]
    fn test_padded_stride() {
        let (width, height, stride) = (10u32, 6u32, 48u32);
        let pixels = generate_rgba(width, height, 1, 2, 3, 255);
        let mut padded = Vec::new();
        for row in pixels.chunks_exact((width * 4) as usize) {
            padded.extend_from_slice(row);
            padded.extend_from_slice(&[0xee; 8]);
        }

        let webp =
            encode_lossless_rgba(&padded, width, height, stride, false).expect("encode failed");
        let (decoded, _, _) = decode_rgba(&webp).expect("decode failed");
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn test_gray_lossless() {
        let gray: Vec<u8> = (0..16 * 8).map(|i| (i * 2) as u8).collect();
        let webp = encode_lossless_gray(&gray, 16, 8, 16).expect("encode failed");
        let (rgb, w, h) = decode_rgb(&webp).expect("decode failed");
        assert_eq!((w, h), (16, 8));
        for (px, &luma) in rgb.chunks_exact(3).zip(&gray) {
            assert_eq!(px, [luma, luma, luma]);
        }

        let (luma, w, h) = decode_gray(&webp).expect("decode failed");
        assert_eq!((w, h), (16, 8));
        assert_eq!(luma.len(), 16 * 8);
    }

    #[test]
    fn test_exact_keeps_hidden_rgb() {
        let original = generate_rgba(8, 8, 10, 20, 30, 0);
        let webp = encode_lossless_rgba(&original, 8, 8, 32, true).expect("encode failed");
        let (decoded, _, _) = decode_rgba(&webp).expect("decode failed");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_codec_trait() {
        let original = generate_rgba(12, 12, 9, 9, 9, 255);
        let webp = LibWebp
            .encode_rgba(&original, 12, 12, 48, 80.0)
            .expect("encode failed");
        let (_, w, h) = LibWebp.decode_rgba(&webp).expect("decode failed");
        assert_eq!((w, h), (12, 12));
    }

    #[test]
    fn test_decode_to_size() {
        let webp = lossless(64, 48, &generate_gradient_rgba(64, 48));

        let rgba = decode_rgba_to_size(&webp, 32, 24).expect("decode failed");
        assert_eq!(rgba.len(), 32 * 24 * 4);
        let rgb = decode_rgb_to_size(&webp, 100, 10).expect("decode failed");
        assert_eq!(rgb.len(), 100 * 10 * 3);
        let gray = decode_gray_to_size(&webp, 17, 9).expect("decode failed");
        assert_eq!(gray.len(), 17 * 9);

        // a solid image stays solid after rescaling
        let solid = lossless(40, 40, &generate_rgba(40, 40, 200, 100, 50, 255));
        let scaled = decode_rgba_to_size(&solid, 10, 10).expect("decode failed");
        for px in scaled.chunks_exact(4) {
            for (got, want) in px.iter().zip([200u8, 100, 50, 255]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", px);
            }
        }

        let err = decode_rgba_to_size(&webp, 0, 24).unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_arguments() {
        let err = encode_rgba(&[0; 10], 4, 4, 16, 75.0).unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidArgument(_)));
        let err = encode_rgba(&[], 0, 0, 0, 75.0).unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidArgument(_)));
        let err = decode_rgba(&[]).unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidArgument(_)));
    }
}

mod container {
    use super::*;

    #[test]
    fn test_simple_lossless_layout() {
        let webp = lossless(16, 16, &generate_rgba(16, 16, 0, 0, 0, 255));
        let records = parse(&webp).expect("parse failed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), ChunkId::Vp8l);
        assert_eq!(records[0].offset, RIFF_HEADER_SIZE);
        assert_eq!(records[0].padded_len(), webp.len() - RIFF_HEADER_SIZE);
    }

    #[test]
    fn test_lossy_alpha_layout() {
        let rgba = generate_rgba(32, 32, 200, 100, 50, 128);
        let webp = encode_rgba(&rgba, 32, 32, 128, 80.0).expect("encode failed");
        assert_eq!(fourccs(&webp), [*b"VP8X", *b"ALPH", *b"VP8 "]);

        let info = inspect(&webp).expect("inspect failed");
        assert_eq!((info.width, info.height), (32, 32));
        assert!(info.has_alpha);
        assert!(!info.has_animation);
        assert_eq!(info.format, BitstreamFormat::Lossy);
        assert_eq!(info.frame_count, 1);
    }

    #[test]
    fn test_inspect_simple() {
        let rgba = generate_rgba(20, 10, 1, 2, 3, 255);
        let webp = encode_rgba(&rgba, 20, 10, 80, 80.0).expect("encode failed");
        let info = inspect(&webp).expect("inspect failed");
        assert_eq!((info.width, info.height), (20, 10));
        assert!(!info.has_alpha);
        assert!(!info.has_exif && !info.has_icc && !info.has_xmp);
    }

    #[test]
    fn test_truncated_file() {
        let webp = lossless(16, 16, &generate_gradient_rgba(16, 16));
        let err = parse(&webp[..webp.len() - 3]).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::Truncated));
        let err = inspect(&webp[..6]).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::Truncated));
    }

    #[test]
    fn test_garbage() {
        let err = inspect(b"GIF89a not a webp file").unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::InvalidHeader));
        assert!(!is_animated(b"GIF89a not a webp file"));
    }
}

mod metadata {
    use super::*;

    #[test]
    fn test_exif_on_simple_lossy() {
        let rgba = generate_gradient_rgba(30, 20);
        let webp = encode_rgba(&rgba, 30, 20, 120, 85.0).expect("encode failed");
        let exif = b"Exif\0\0II*\0\x08\0\0\0".to_vec();

        let tagged = embed_exif(&webp, &exif).expect("embed failed");
        assert_eq!(fourccs(&tagged), [*b"VP8X", *b"VP8 ", *b"EXIF"]);
        assert_eq!(get_exif(&tagged).expect("get failed"), exif);

        let info = inspect(&tagged).expect("inspect failed");
        assert_eq!((info.width, info.height), (30, 20));
        assert!(info.has_exif);
        assert!(!info.has_alpha);

        // libwebp still reads the rewritten container
        let (_, w, h) = decode_rgba(&tagged).expect("decode failed");
        assert_eq!((w, h), (30, 20));

        let stripped = remove_exif(&tagged).expect("remove failed");
        assert_eq!(fourccs(&stripped), [*b"VP8X", *b"VP8 "]);
        assert!(!inspect(&stripped).expect("inspect failed").has_exif);
        decode_rgba(&stripped).expect("decode failed");
    }

    #[test]
    fn test_icc_on_lossless_alpha() {
        let rgba = generate_rgba(16, 16, 10, 10, 10, 77);
        let webp = lossless(16, 16, &rgba);
        let icc = vec![0x42u8; 301];

        let tagged = embed_icc(&webp, &icc).expect("embed failed");
        assert_eq!(get_icc_profile(&tagged).expect("get failed"), icc);
        let info = inspect(&tagged).expect("inspect failed");
        assert!(info.has_icc);
        assert!(info.has_alpha);

        let (decoded, _, _) = decode_rgba(&tagged).expect("decode failed");
        assert_eq!(decoded, rgba);
    }

    #[test]
    fn test_set_replaces_and_delete_twice_fails() {
        let webp = lossless(8, 8, &generate_rgba(8, 8, 0, 0, 0, 255));
        let once = set_metadata(&webp, MetadataKind::Xmp, b"<x:xmpmeta>one</x:xmpmeta>").unwrap();
        let twice = set_metadata(&once, MetadataKind::Xmp, b"<x:xmpmeta>two</x:xmpmeta>").unwrap();

        let count = fourccs(&twice).iter().filter(|f| *f == b"XMP ").count();
        assert_eq!(count, 1);
        assert_eq!(get_xmp(&twice).unwrap(), b"<x:xmpmeta>two</x:xmpmeta>");

        let gone = delete_metadata(&twice, MetadataKind::Xmp).unwrap();
        let err = delete_metadata(&gone, MetadataKind::Xmp).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotFound));
    }

    #[test]
    fn test_missing_and_empty() {
        let webp = lossless(8, 8, &generate_rgba(8, 8, 0, 0, 0, 255));
        let err = get_icc_profile(&webp).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotFound));

        let err = embed_xmp(&webp, &[]).unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidArgument(_)));

        let err = remove_icc(&webp).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotFound));
    }

    #[test]
    fn test_icc_precedes_animation_frames() {
        let (anim, _, _) = two_frame_animation();
        let tagged = embed_icc(&anim, &[7u8; 64]).expect("embed failed");
        assert_eq!(
            fourccs(&tagged),
            [*b"VP8X", *b"ICCP", *b"ANIM", *b"ANMF", *b"ANMF"]
        );
        assert!(inspect(&tagged).expect("inspect failed").has_icc);
        assert_eq!(decode_all_frames(&tagged).expect("decode failed").len(), 2);
    }

    #[test]
    fn test_metadata_on_animation() {
        let (anim, _, _) = two_frame_animation();
        let tagged = embed_xmp(&anim, b"<xmp/>").expect("embed failed");
        assert_eq!(get_xmp(&tagged).unwrap(), b"<xmp/>");

        let frames = decode_all_frames(&tagged).expect("decode failed");
        assert_eq!(frames.len(), 2);
        let info = animation_info(&tagged).expect("info failed");
        assert_eq!(info.frame_count, 2);
    }
}

mod animation {
    use super::*;

    #[test]
    fn test_two_frames() {
        let (anim, first, second) = two_frame_animation();
        assert!(is_animated(&anim));

        let features = probe_features(&anim).expect("libwebp rejected the animation");
        assert!(features.has_animation);
        assert_eq!((features.width, features.height), (100, 100));

        let frames = decode_all_frames(&anim).expect("decode failed");
        assert_eq!(frames.len(), 2);

        assert_eq!((frames[0].width, frames[0].height), (100, 100));
        assert_eq!((frames[0].duration_ms, frames[0].timestamp_ms), (100, 0));
        assert_eq!(frames[0].pixels, first);

        assert_eq!((frames[1].width, frames[1].height), (50, 40));
        assert_eq!((frames[1].duration_ms, frames[1].timestamp_ms), (150, 100));
        assert_eq!((frames[1].x_offset, frames[1].y_offset), (10, 20));
        assert_eq!(frames[1].blend, BlendMethod::Overwrite);
        assert_eq!(frames[1].dispose, DisposeMethod::Background);
        assert_eq!(frames[1].pixels, second);
        assert_eq!(frames[1].as_img().buf()[0], rgb::RGBA8::new(0, 0, 255, 255));
    }

    #[test]
    fn test_info_and_first_frame() {
        let (anim, first, _) = two_frame_animation();
        let info = animation_info(&anim).expect("info failed");
        assert_eq!((info.width, info.height), (100, 100));
        assert_eq!(info.frame_count, 2);
        assert_eq!(info.loop_count, 3);

        let frame = decode_first_frame(&anim).expect("decode failed");
        assert_eq!(frame.pixels, first);
        assert_eq!(frame.timestamp_ms, 0);

        let container = inspect(&anim).expect("inspect failed");
        assert!(container.has_animation);
        assert_eq!(container.frame_count, 2);
        assert_eq!(container.format, BitstreamFormat::Lossless);
    }

    #[test]
    fn test_lossy_alpha_frame() {
        let rgba = generate_rgba(24, 24, 0, 255, 0, 128);
        let still = encode_rgba(&rgba, 24, 24, 96, 90.0).expect("encode failed");

        let mut assembler = AnimationAssembler::new(24, 24).expect("canvas");
        for duration in [40, 60] {
            assembler
                .add_frame(&still, 0, 0, duration, BlendMethod::AlphaBlend, DisposeMethod::None)
                .expect("frame");
        }
        let anim = assembler.finish().expect("finish");
        assert!(inspect(&anim).expect("inspect failed").has_alpha);

        let raw: Vec<_> = frames(&anim)
            .expect("walk failed")
            .collect::<Result<_>>()
            .expect("walk failed");
        assert_eq!(raw.len(), 2);
        assert!(raw[0].image.expect("image").starts_with(b"ALPH"));

        let decoded = decode_all_frames(&anim).expect("decode failed");
        assert_eq!(decoded.len(), 2);
        assert_eq!((decoded[1].duration_ms, decoded[1].timestamp_ms), (60, 100));
        assert_eq!(decoded[0].pixels[3], 128);
    }

    #[test]
    fn test_single_frame_animation_is_not_animated() {
        let rgba = generate_rgba(16, 16, 1, 2, 3, 255);
        let mut assembler = AnimationAssembler::new(16, 16).expect("canvas");
        assembler
            .add_frame(&lossless(16, 16, &rgba), 0, 0, 50, BlendMethod::AlphaBlend, DisposeMethod::None)
            .expect("frame");
        let anim = assembler.finish().expect("finish");

        assert!(!is_animated(&anim));
        let err = decode_first_frame(&anim).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotAnimated));
        assert_eq!(animation_info(&anim).expect("info failed").frame_count, 1);

        let still = convert_animated_to_static(&anim, 90.0).expect("convert failed");
        let (_, w, h) = decode_rgba(&still).expect("decode failed");
        assert_eq!((w, h), (16, 16));
    }

    #[test]
    fn test_still_is_not_animated() {
        let webp = lossless(8, 8, &generate_rgba(8, 8, 0, 0, 0, 255));
        assert!(!is_animated(&webp));
        let err = decode_all_frames(&webp).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotAnimated));
        let err = decode_first_frame(&webp).unwrap_err();
        assert_eq!(err.into_inner(), Error::Format(FormatError::NotAnimated));
    }
}

mod convert {
    use super::*;

    #[test]
    fn test_animation_to_still() {
        let (anim, _, _) = two_frame_animation();
        let still = convert_animated_to_static(&anim, 90.0).expect("convert failed");

        assert!(!is_animated(&still));
        let features = probe_features(&still).expect("probe failed");
        assert!(!features.has_animation);
        assert_eq!((features.width, features.height), (100, 100));
    }

    #[test]
    fn test_still_to_still() {
        let webp = lossless(30, 12, &generate_gradient_rgba(30, 12));
        let still = convert_animated_to_static(&webp, 50.0).expect("convert failed");
        let (_, w, h) = decode_rgba(&still).expect("decode failed");
        assert_eq!((w, h), (30, 12));
        assert_eq!(probe_features(&still).unwrap().format, BitstreamFormat::Lossy);
    }
}
