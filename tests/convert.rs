//! End-to-end conversion tests.
//!
//! Drives the public pipeline with real encoded inputs in every supported
//! format and checks the budget and failure behaviour.

use std::io::Cursor;

use apngify::apng;
use apngify::downscale::{next_dimensions, DEFAULT_SAFETY_MARGIN};
use apngify::{
    convert, png, ConvertOptions, Converter, Error, ImageFormat, Raster, DEFAULT_BUDGET,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn noise_raster(width: u32, height: u32, seed: u64) -> Raster {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    rng.fill(pixels.as_mut_slice());
    Raster::new(width, height, pixels).unwrap()
}

fn encode_with_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 3) as u8, (y * 3) as u8, ((x ^ y) * 5) as u8])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

/// Test a noisy image far over budget, as a photo would be.
#[test]
fn test_oversized_noise_is_downscaled() {
    let raster = noise_raster(600, 400, 42);
    let input = png::encode(&raster).unwrap();
    let budget = 500 * 1024;
    assert!(input.len() as u64 > budget);

    let conversion = Converter::new()
        .with_options(ConvertOptions {
            budget,
            ..ConvertOptions::default()
        })
        .run(input.as_bytes(), ImageFormat::Png)
        .unwrap();

    assert!(conversion.steps >= 1);
    assert!(conversion.apng.len() as u64 <= budget);
    assert_eq!(
        (conversion.source_width, conversion.source_height),
        (600, 400)
    );
    assert!(conversion.width < 600 && conversion.height < 400);

    let info = apng::inspect(&conversion.apng).unwrap();
    assert_eq!(
        (info.frame.width, info.frame.height),
        (conversion.width, conversion.height)
    );
}

/// Full-size photo scenario; slow, run with `--ignored`.
#[test]
#[ignore]
fn test_photo_sized_noise_is_downscaled() {
    let raster = noise_raster(6000, 4000, 7);
    let input = png::encode(&raster).unwrap();

    let conversion = Converter::new()
        .run(input.as_bytes(), ImageFormat::Png)
        .unwrap();

    assert!(conversion.steps >= 1);
    assert!(conversion.apng.len() as u64 <= DEFAULT_BUDGET);
    let info = apng::inspect(&conversion.apng).unwrap();
    assert_ne!((info.frame.width, info.frame.height), (6000, 4000));
}

/// Test every allow-listed format through the full pipeline.
#[test]
fn test_all_formats() {
    let cases = [
        (image::ImageFormat::Png, "image/png"),
        (image::ImageFormat::Jpeg, "image/jpeg"),
        (image::ImageFormat::Gif, "image/gif"),
        (image::ImageFormat::Bmp, "image/bmp"),
        (image::ImageFormat::Tiff, "image/tiff"),
        (image::ImageFormat::WebP, "image/webp"),
    ];
    for (encoder_format, mime) in cases {
        let input = encode_with_image(48, 32, encoder_format);
        let format = ImageFormat::from_mime(mime).unwrap();
        let apng = convert(&input, format, DEFAULT_BUDGET)
            .unwrap_or_else(|e| panic!("{mime}: {e}"));

        let info = apng::inspect(&apng).unwrap();
        assert_eq!((info.width, info.height), (48, 32), "{mime}");
    }
}

/// Test that a tag outside the allow-list is refused before decoding.
#[test]
fn test_unsupported_tag_rejected() {
    assert_eq!(
        ImageFormat::from_mime("audio/mpeg"),
        Err(Error::UnsupportedFormat("audio/mpeg".into()))
    );
}

/// Test that corrupt bytes under a valid tag fail to decode.
#[test]
fn test_corrupt_jpeg_fails_decode() {
    let mut jpeg = encode_with_image(32, 32, image::ImageFormat::Jpeg);
    jpeg.truncate(20);
    let empty: &[u8] = &[];

    for input in [jpeg.as_slice(), b"not a jpeg at all".as_slice(), empty] {
        let result = convert(input, ImageFormat::Jpeg, DEFAULT_BUDGET);
        assert!(
            matches!(
                result,
                Err(Error::Decode {
                    format: ImageFormat::Jpeg,
                    ..
                })
            ),
            "got {result:?}"
        );
    }
}

/// Test that bytes are decoded as the claimed format, not by content.
#[test]
fn test_claimed_format_wins() {
    let png_bytes = encode_with_image(8, 8, image::ImageFormat::Png);
    let result = convert(&png_bytes, ImageFormat::Gif, DEFAULT_BUDGET);
    assert!(matches!(
        result,
        Err(Error::Decode {
            format: ImageFormat::Gif,
            ..
        })
    ));
}

/// Test that a budget no 1x1 image fits reports what was reached.
#[test]
fn test_unattainable_budget() {
    let input = png::encode(&noise_raster(20, 20, 5)).unwrap();
    match convert(input.as_bytes(), ImageFormat::Png, 64) {
        Err(Error::BudgetUnattainable {
            budget, smallest, ..
        }) => {
            assert_eq!(budget, 64);
            assert!(smallest > 64);
        }
        other => panic!("expected BudgetUnattainable, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Output never exceeds the budget; the only other outcome is giving up.
    #[test]
    fn prop_output_within_budget(
        width in 1u32..48,
        height in 1u32..48,
        seed in any::<u64>(),
        budget in 60u64..6000,
    ) {
        let input = png::encode(&noise_raster(width, height, seed)).unwrap();
        match convert(input.as_bytes(), ImageFormat::Png, budget) {
            Ok(apng) => {
                prop_assert!(apng.len() as u64 <= budget);
                apng::inspect(&apng).unwrap();
            }
            Err(Error::BudgetUnattainable { budget: reported, .. }) => {
                prop_assert_eq!(reported, budget);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// The shrink sequence never grows and always reaches 1x1.
    #[test]
    fn prop_shrink_terminates(
        width in 1u32..20_000,
        height in 1u32..20_000,
        ratio in 1.0001f64..1000.0,
    ) {
        let budget = 1_000_000u64;
        let encoded_len = (budget as f64 * ratio) as u64 + 1;
        let (mut w, mut h) = (width, height);
        let mut rounds = 0u64;
        while (w, h) != (1, 1) {
            let (nw, nh) = next_dimensions(w, h, encoded_len, budget, DEFAULT_SAFETY_MARGIN);
            prop_assert!(nw >= 1 && nh >= 1);
            prop_assert!(nw <= w && nh <= h);
            prop_assert!((nw, nh) != (w, h));
            (w, h) = (nw, nh);
            rounds += 1;
        }
        prop_assert!(rounds <= width as u64 + height as u64);
    }
}
