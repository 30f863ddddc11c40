//! RGBA raster resampling.
//!
//! Two smoothing filters are provided:
//! - **Bilinear**: tent kernel, fast (default)
//! - **Lanczos3**: windowed-sinc, sharper on large downscales
//!
//! Both map pixel centers (`(dst + 0.5) * scale - 0.5`) and widen their
//! kernel by the scale factor when shrinking, so every source pixel
//! contributes. Filtering runs on premultiplied alpha.

use std::f32::consts::PI;

use crate::error::Result;
use crate::raster::{self, Raster, BYTES_PER_PIXEL};

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    /// Bilinear interpolation: fast with smooth results.
    #[default]
    Bilinear,
    /// Lanczos3 resampling: highest quality, slowest.
    Lanczos3,
}

/// Resample `src` to `dst_width` x `dst_height`.
///
/// # Errors
///
/// Fails if the target dimensions are zero or too large.
pub fn resize(
    src: &Raster,
    dst_width: u32,
    dst_height: u32,
    filter: ResampleFilter,
) -> Result<Raster> {
    let output_len = raster::byte_len(dst_width, dst_height)?;

    if src.dimensions() == (dst_width, dst_height) {
        return Ok(src.clone());
    }

    let mut output = vec![0u8; output_len];
    resize_separable(&mut output, src, dst_width, dst_height, filter);

    Raster::new(dst_width, dst_height, output)
}

impl ResampleFilter {
    /// Kernel radius in source pixels at scale 1.
    fn support(self) -> f32 {
        match self {
            ResampleFilter::Bilinear => 1.0,
            ResampleFilter::Lanczos3 => 3.0,
        }
    }

    #[inline]
    fn kernel(self, x: f32) -> f32 {
        match self {
            ResampleFilter::Bilinear => triangle_kernel(x),
            ResampleFilter::Lanczos3 => lanczos_kernel(x, 3.0),
        }
    }
}

/// Tent kernel; bilinear interpolation at scale 1.
#[inline]
fn triangle_kernel(x: f32) -> f32 {
    (1.0 - x.abs()).max(0.0)
}

/// Lanczos kernel function.
#[inline]
fn lanczos_kernel(x: f32, a: f32) -> f32 {
    if x.abs() < f32::EPSILON {
        1.0
    } else if x.abs() >= a {
        0.0
    } else {
        let pi_x = PI * x;
        let pi_x_a = PI * x / a;
        (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x_a)
    }
}

/// Normalized source weights contributing to one destination pixel.
#[derive(Clone)]
struct Contribution {
    start: usize,
    weights: Vec<f32>,
}

/// Precompute the contributions of `filter` for a 1D resample.
fn precompute_contributions(
    src_size: usize,
    dst_size: usize,
    filter: ResampleFilter,
) -> Vec<Contribution> {
    let scale = src_size as f32 / dst_size as f32;
    // For downscaling, widen the kernel so every source pixel contributes.
    let filter_scale = scale.max(1.0);
    let support = filter.support() * filter_scale;

    (0..dst_size)
        .map(|dst_idx| {
            let center = (dst_idx as f32 + 0.5) * scale - 0.5;
            let start = ((center - support).floor() as isize).max(0) as usize;
            let end = (((center + support).ceil() as isize + 1).max(0) as usize).min(src_size);
            let start = start.min(end.saturating_sub(1));

            let mut weights: Vec<f32> = (start..end)
                .map(|src_idx| filter.kernel((src_idx as f32 - center) / filter_scale))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() > f32::EPSILON {
                weights.iter_mut().for_each(|w| *w /= sum);
            } else {
                // Nearest source pixel.
                let nearest = (center.round().max(0.0) as usize).clamp(start, end - 1);
                weights.iter_mut().for_each(|w| *w = 0.0);
                weights[nearest - start] = 1.0;
            }

            Contribution { start, weights }
        })
        .collect()
}

/// Weighted sum of `BYTES_PER_PIXEL` channels read through `sample`.
#[inline]
fn convolve(
    contrib: &Contribution,
    sample: impl Fn(usize, usize) -> f32,
) -> [f32; BYTES_PER_PIXEL] {
    let mut sums = [0.0f32; BYTES_PER_PIXEL];
    for (i, &weight) in contrib.weights.iter().enumerate() {
        for (c, sum) in sums.iter_mut().enumerate() {
            *sum += sample(contrib.start + i, c) * weight;
        }
    }
    sums
}

/// Premultiplied channel value of `pixel[c]`.
#[inline]
fn premultiplied(pixel: &[u8], c: usize) -> f32 {
    let alpha = pixel[3] as f32;
    if c == 3 {
        alpha
    } else {
        pixel[c] as f32 * alpha / 255.0
    }
}

/// Convert premultiplied sums back to straight RGBA8.
#[inline]
fn unpremultiply(sums: [f32; BYTES_PER_PIXEL], out: &mut [u8]) {
    let alpha = sums[3].round().clamp(0.0, 255.0);
    if alpha == 0.0 {
        out.fill(0);
        return;
    }
    let unscale = 255.0 / sums[3];
    for (o, sum) in out[..3].iter_mut().zip(&sums[..3]) {
        *o = (sum * unscale).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = alpha as u8;
}

/// Separable resampling (horizontal then vertical) on premultiplied alpha,
/// so transparent pixels do not bleed their color into opaque neighbours.
fn resize_separable(
    output: &mut [u8],
    src: &Raster,
    dst_width: u32,
    dst_height: u32,
    filter: ResampleFilter,
) {
    let (src_width, src_height) = (src.width() as usize, src.height() as usize);
    let (dst_width, dst_height) = (dst_width as usize, dst_height as usize);
    let data = src.pixels();

    let h_contribs = precompute_contributions(src_width, dst_width, filter);
    let v_contribs = precompute_contributions(src_height, dst_height, filter);

    let src_stride = src_width * BYTES_PER_PIXEL;
    let dst_stride = dst_width * BYTES_PER_PIXEL;

    // Pass 1: horizontal, src_height rows x dst_width columns, premultiplied.
    let mut temp = vec![0.0f32; src_height * dst_stride];
    let horizontal = |y: usize, temp_row: &mut [f32]| {
        let src_row = &data[y * src_stride..(y + 1) * src_stride];
        for (x, contrib) in h_contribs.iter().enumerate() {
            let sums = convolve(contrib, |sx, c| {
                premultiplied(&src_row[sx * BYTES_PER_PIXEL..], c)
            });
            temp_row[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL].copy_from_slice(&sums);
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        temp.par_chunks_mut(dst_stride)
            .enumerate()
            .for_each(|(y, row)| horizontal(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    for (y, row) in temp.chunks_mut(dst_stride).enumerate() {
        horizontal(y, row);
    }

    // Pass 2: vertical, one destination row at a time.
    let vertical = |dst_y: usize, dst_row: &mut [u8]| {
        let contrib = &v_contribs[dst_y];
        for x in 0..dst_width {
            let sums = convolve(contrib, |sy, c| {
                temp[sy * dst_stride + x * BYTES_PER_PIXEL + c]
            });
            unpremultiply(sums, &mut dst_row[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL]);
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        output
            .par_chunks_mut(dst_stride)
            .enumerate()
            .for_each(|(y, row)| vertical(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    for (y, row) in output.chunks_mut(dst_stride).enumerate() {
        vertical(y, row);
    }
}
