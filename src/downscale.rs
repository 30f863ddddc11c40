//! Size-bounded downscaling.
//!
//! Encodes a raster, and while the PNG is over budget, shrinks the raster by
//! the square root of the size ratio (PNG size tracks pixel count, so a
//! linear scale of `sqrt(budget / size)` roughly hits the target) times a
//! safety margin, then tries again. The decoded raster is always the source
//! of the next resample; encoded PNGs are never decoded again.

use log::{debug, warn};

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::png::{self, EncodedImage, PngOptions};
use crate::raster::Raster;

/// Default cap on resample steps.
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

/// Default multiplier applied to the ideal linear scale.
pub const DEFAULT_SAFETY_MARGIN: f64 = 0.9;

/// Downscale loop settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownscaleOptions {
    /// Maximum number of resample steps before giving up.
    pub max_iterations: u32,
    /// Factor in `(0, 1]` applied to `sqrt(budget / size)`.
    pub safety_margin: f64,
}

impl Default for DownscaleOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl DownscaleOptions {
    fn validate(&self) -> Result<()> {
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(Error::InvalidOption(format!(
                "safety margin {} must be in (0, 1]",
                self.safety_margin
            )));
        }
        Ok(())
    }
}

/// Result of a successful fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
    /// The final PNG, at or under budget.
    pub image: EncodedImage,
    /// Number of resample steps taken (0 if the original fit).
    pub steps: u32,
}

/// Dimensions for the next attempt after an encode of `encoded_len` bytes
/// overshot `budget`.
///
/// Each axis becomes `max(1, round(dim * sqrt(budget / encoded_len) * margin))`,
/// never larger than before. When rounding would leave the size unchanged,
/// every axis above 1 loses one pixel instead, so repeated calls always
/// reach 1x1.
pub fn next_dimensions(
    width: u32,
    height: u32,
    encoded_len: u64,
    budget: u64,
    margin: f64,
) -> (u32, u32) {
    let scale = (budget as f64 / encoded_len.max(1) as f64).sqrt() * margin;
    let shrink = |dim: u32| ((dim as f64 * scale).round() as u32).clamp(1, dim.max(1));

    let next = (shrink(width), shrink(height));
    if next == (width, height) {
        (width.saturating_sub(1).max(1), height.saturating_sub(1).max(1))
    } else {
        next
    }
}

/// Encode `raster`, shrinking it until the PNG is at most `budget` bytes.
///
/// Fails with [`Error::BudgetUnattainable`] if a 1x1 image is still too big
/// or `max_iterations` resample steps were not enough. Never returns an
/// over-budget image.
pub fn fit_to_budget<C: ImageCodec + ?Sized>(
    codec: &C,
    raster: Raster,
    budget: u64,
    options: &DownscaleOptions,
    png_options: &PngOptions,
) -> Result<Fitted> {
    options.validate()?;

    let mut current = raster;
    let mut steps = 0u32;
    let mut smallest = u64::MAX;

    loop {
        let (width, height) = current.dimensions();
        let encoded = png::encode_with_options(&current, png_options)?;
        let len = encoded.len() as u64;
        smallest = smallest.min(len);
        debug!("step {steps}: {width}x{height} encoded to {len} bytes (budget {budget})");

        if len <= budget {
            return Ok(Fitted {
                image: encoded,
                steps,
            });
        }

        if (width, height) == (1, 1) || steps >= options.max_iterations {
            warn!(
                "giving up at {width}x{height} after {steps} steps: {len} bytes > {budget} bytes"
            );
            return Err(Error::BudgetUnattainable {
                budget,
                smallest,
                steps,
            });
        }
        drop(encoded);

        let (next_width, next_height) =
            next_dimensions(width, height, len, budget, options.safety_margin);
        let resampled = codec.resample(&current, next_width, next_height)?;
        if resampled.dimensions() != (next_width, next_height) {
            let (w, h) = resampled.dimensions();
            return Err(Error::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        current = resampled;
        steps += 1;
    }
}
