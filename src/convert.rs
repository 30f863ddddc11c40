//! End-to-end conversion: decode, fit to budget, splice.

use log::{error, info};

use crate::apng::{self, constants::APNG_OVERHEAD};
use crate::codec::{ImageCodec, StandardCodec};
use crate::downscale::{self, DownscaleOptions};
use crate::error::{Error, Result};
use crate::format::ImageFormat;
use crate::png::PngOptions;

/// Default output budget: 5 MiB.
pub const DEFAULT_BUDGET: u64 = 5 * 1024 * 1024;

/// Convert `bytes` (claimed to be `format`) into a single-frame APNG of at
/// most `budget` bytes, using [`StandardCodec`] and default options.
///
/// # Example
///
/// ```rust
/// use apngify::{convert, ImageFormat};
///
/// let mut png = Vec::new();
/// image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 255]))
///     .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
///     .unwrap();
///
/// let apng = convert(&png, ImageFormat::Png, 4096).unwrap();
/// assert!(apng.len() <= 4096);
/// ```
pub fn convert(bytes: &[u8], format: ImageFormat, budget: u64) -> Result<Vec<u8>> {
    Converter::new()
        .with_options(ConvertOptions {
            budget,
            ..ConvertOptions::default()
        })
        .convert(bytes, format)
}

/// Settings for a [`Converter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    /// Maximum size of the final APNG in bytes.
    pub budget: u64,
    /// Downscale loop settings.
    pub downscale: DownscaleOptions,
    /// PNG encoder settings.
    pub png: PngOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            downscale: DownscaleOptions::default(),
            png: PngOptions::default(),
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The APNG file.
    pub apng: Vec<u8>,
    /// Width of the decoded input.
    pub source_width: u32,
    /// Height of the decoded input.
    pub source_height: u32,
    /// Width of the output frame.
    pub width: u32,
    /// Height of the output frame.
    pub height: u32,
    /// Downscale steps taken.
    pub steps: u32,
}

impl Conversion {
    /// Whether the output had to be shrunk to fit.
    pub fn was_downscaled(&self) -> bool {
        self.steps > 0
    }
}

/// Image to APNG pipeline over a pluggable codec.
#[derive(Debug, Clone, Default)]
pub struct Converter<C = StandardCodec> {
    codec: C,
    options: ConvertOptions,
}

impl Converter<StandardCodec> {
    /// A converter with the standard codec and default options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ImageCodec> Converter<C> {
    /// A converter using `codec` for decoding and resampling.
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            options: ConvertOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert and return only the APNG bytes.
    pub fn convert(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
        self.run(bytes, format).map(|c| c.apng)
    }

    /// Convert and report what happened.
    ///
    /// Any stage failure aborts the conversion; there are no retries.
    pub fn run(&self, bytes: &[u8], format: ImageFormat) -> Result<Conversion> {
        let budget = self.options.budget;
        let overhead = APNG_OVERHEAD as u64;

        let raster = self.codec.decode(bytes, format)?;
        let (source_width, source_height) = raster.dimensions();

        let png_budget = budget.saturating_sub(overhead);
        let fitted = downscale::fit_to_budget(
            &self.codec,
            raster,
            png_budget,
            &self.options.downscale,
            &self.options.png,
        )
        .map_err(|e| match e {
            Error::BudgetUnattainable {
                smallest, steps, ..
            } => Error::BudgetUnattainable {
                budget,
                smallest: smallest.saturating_add(overhead),
                steps,
            },
            other => other,
        })?;

        let (width, height) = (fitted.image.width(), fitted.image.height());
        let apng = apng::to_apng(fitted.image.as_bytes()).inspect_err(|e| {
            error!("splicing encoder output failed: {e}");
        })?;

        info!(
            "{format} {source_width}x{source_height} ({} bytes) -> APNG {width}x{height} ({} bytes, {} steps)",
            bytes.len(),
            apng.len(),
            fitted.steps
        );

        Ok(Conversion {
            apng,
            source_width,
            source_height,
            width,
            height,
            steps: fitted.steps,
        })
    }
}
