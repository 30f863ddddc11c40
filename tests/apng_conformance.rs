//! APNG conformance tests.
//!
//! Checks the byte layout of converted files chunk by chunk, and that an
//! independent PNG decoder reads them back at the expected size.

use apngify::apng::{self, constants::APNG_OVERHEAD};
use apngify::png::chunk::parse_chunks;
use apngify::{png, Converter, ImageFormat, Raster, DEFAULT_BUDGET};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Bit-at-a-time CRC-32, independent of the table-driven one in the crate.
fn reference_crc(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn noise_raster(width: u32, height: u32, seed: u64) -> Raster {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    rng.fill(pixels.as_mut_slice());
    Raster::new(width, height, pixels).unwrap()
}

fn gradient_raster(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    Raster::new(width, height, pixels).unwrap()
}

/// Walk the raw chunk framing by hand, returning (type, payload) pairs after
/// checking every CRC against the reference implementation.
fn walk_chunks(bytes: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    assert_eq!(
        &bytes[0..8],
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    );
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < bytes.len() {
        let len = be_u32(&bytes[pos..]) as usize;
        let chunk_type: [u8; 4] = bytes[pos + 4..pos + 8].try_into().unwrap();
        let data = &bytes[pos + 8..pos + 8 + len];
        let crc = be_u32(&bytes[pos + 8 + len..]);
        assert_eq!(
            crc,
            reference_crc(&bytes[pos + 4..pos + 8 + len]),
            "bad CRC on {}",
            String::from_utf8_lossy(&chunk_type)
        );
        chunks.push((chunk_type, data.to_vec()));
        pos += 12 + len;
    }
    assert_eq!(pos, bytes.len());
    chunks
}

fn assert_single_frame_apng(bytes: &[u8], width: u32, height: u32) {
    let chunks = walk_chunks(bytes);
    let types: Vec<&[u8; 4]> = chunks.iter().map(|(t, _)| t).collect();
    assert_eq!(types[0], b"IHDR");
    assert_eq!(types[1], b"acTL");
    assert_eq!(types[2], b"fcTL");
    assert_eq!(types[types.len() - 1], b"IEND");
    assert!(types[3..types.len() - 1].iter().all(|t| *t == b"IDAT"));
    assert!(types.len() >= 5);

    let ihdr = &chunks[0].1;
    assert_eq!((be_u32(&ihdr[0..]), be_u32(&ihdr[4..])), (width, height));

    let actl = &chunks[1].1;
    assert_eq!(actl.len(), 8);
    assert_eq!(be_u32(&actl[0..]), 1, "num_frames");
    assert_eq!(be_u32(&actl[4..]), 0, "num_plays");

    let fctl = &chunks[2].1;
    assert_eq!(fctl.len(), 26);
    assert_eq!(be_u32(&fctl[0..]), 0, "sequence_number");
    assert_eq!(be_u32(&fctl[4..]), width);
    assert_eq!(be_u32(&fctl[8..]), height);
    assert_eq!(be_u32(&fctl[12..]), 0, "x_offset");
    assert_eq!(be_u32(&fctl[16..]), 0, "y_offset");
    assert_eq!(&fctl[20..22], &[0, 1], "delay_num");
    assert_eq!(&fctl[22..24], &[0, 100], "delay_den");
    assert_eq!(fctl[24], 0, "dispose_op");
    assert_eq!(fctl[25], 0, "blend_op");
}

/// Test the layout of a converted file byte by byte.
#[test]
fn test_apng_layout() {
    let png = png::encode(&gradient_raster(100, 100)).unwrap();
    let apng = Converter::new()
        .convert(png.as_bytes(), ImageFormat::Png)
        .unwrap();

    assert_single_frame_apng(&apng, 100, 100);

    // acTL directly after IHDR: 8 (signature) + 25 (IHDR)
    assert_eq!(&apng[33..37], &[0, 0, 0, 8]);
    assert_eq!(&apng[37..41], b"acTL");
    assert_eq!(&apng[53..57], &[0, 0, 0, 26]);
    assert_eq!(&apng[57..61], b"fcTL");
}

/// Test that an image already under budget is only spliced.
#[test]
fn test_under_budget_is_spliced_unchanged() {
    let png = png::encode(&gradient_raster(100, 100)).unwrap();
    let input = png.as_bytes();
    assert!(input.len() < 16 * 1024);

    let conversion = Converter::new().run(input, ImageFormat::Png).unwrap();
    assert_eq!(conversion.steps, 0);
    assert!(conversion.apng.len() as u64 <= DEFAULT_BUDGET);

    let apng = &conversion.apng;
    assert_eq!(apng.len(), input.len() + APNG_OVERHEAD);
    assert_eq!(&apng[..33], &input[..33]);
    assert_eq!(&apng[33 + APNG_OVERHEAD..], &input[33..]);
}

/// Test that the IEND chunk carries its well-known CRC.
#[test]
fn test_iend_crc() {
    let png = png::encode(&noise_raster(7, 5, 1)).unwrap();
    let apng = apng::to_apng(png.as_bytes()).unwrap();
    let tail = &apng[apng.len() - 12..];
    assert_eq!(&tail[0..8], &[0, 0, 0, 0, b'I', b'E', b'N', b'D']);
    assert_eq!(&tail[8..12], &[0xAE, 0x42, 0x60, 0x82]);
}

/// Test that an independent decoder reads the output at its declared size.
#[test]
fn test_independent_decode() {
    for (width, height) in [(1, 1), (3, 17), (64, 48), (250, 3)] {
        let raster = noise_raster(width, height, (width * 31 + height) as u64);
        let png = png::encode(&raster).unwrap();
        let apng = apng::to_apng(png.as_bytes()).unwrap();

        let decoded = image::load_from_memory_with_format(&apng, image::ImageFormat::Png)
            .unwrap()
            .into_rgba8();
        assert_eq!(decoded.dimensions(), (width, height));
        assert_eq!(decoded.as_raw(), raster.pixels());
    }
}

/// Test that large encodings split across several IDAT chunks stay in order.
#[test]
fn test_multiple_idat_chunks() {
    let raster = noise_raster(400, 400, 9);
    let png = png::encode(&raster).unwrap();
    let apng = apng::to_apng(png.as_bytes()).unwrap();

    let info = apng::inspect(&apng).unwrap();
    assert!(info.idat_chunks > 1);
    assert_single_frame_apng(&apng, 400, 400);
}

/// Test that the crate's own parser agrees with the hand-rolled walk.
#[test]
fn test_parse_chunks_matches_walk() {
    let png = png::encode(&noise_raster(33, 9, 4)).unwrap();
    let apng = apng::to_apng(png.as_bytes()).unwrap();

    let walked = walk_chunks(&apng);
    let parsed = parse_chunks(&apng).unwrap();
    assert_eq!(walked.len(), parsed.len());
    for ((chunk_type, data), chunk) in walked.iter().zip(&parsed) {
        assert_eq!(chunk_type, &chunk.chunk_type);
        assert_eq!(data.as_slice(), chunk.data);
        assert_eq!(reference_crc(&apng[chunk.span.start + 4..chunk.span.end - 4]), chunk.crc);
    }
}

/// Test that the splicer refuses broken streams.
#[test]
fn test_splicer_rejects_malformed() {
    let png = png::encode(&noise_raster(4, 4, 2)).unwrap().into_bytes();

    let mut bad_signature = png.clone();
    bad_signature[1] = b'X';
    let mut bad_crc = png.clone();
    bad_crc[29] ^= 0xFF;
    let truncated = png[..png.len() - 6].to_vec();
    let mut trailing = png.clone();
    trailing.extend_from_slice(b"junk");
    let already_animated = apng::to_apng(&png).unwrap();

    for input in [bad_signature, bad_crc, truncated, trailing, already_animated] {
        assert!(matches!(
            apng::to_apng(&input),
            Err(apngify::Error::MalformedInput(_))
        ));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every spliced output is structurally a single-frame APNG of the same size.
    #[test]
    fn prop_spliced_structure(width in 1u32..64, height in 1u32..64, seed in any::<u64>()) {
        let png = png::encode(&noise_raster(width, height, seed)).unwrap();
        let apng = apng::to_apng(png.as_bytes()).unwrap();

        assert_single_frame_apng(&apng, width, height);
        let info = apng::inspect(&apng).unwrap();
        prop_assert_eq!((info.frame.width, info.frame.height), (info.width, info.height));
        prop_assert_eq!(info.animation.num_frames, 1);
        prop_assert_eq!(info.frame.sequence_number, 0);
        prop_assert_eq!((info.frame.x_offset, info.frame.y_offset), (0, 0));
    }
}
