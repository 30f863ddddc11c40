//! PNG scanline filtering.
//!
//! Each row of the image is stored with a leading filter-type byte followed
//! by the row's residuals against a predictor. Good filter choices turn
//! smooth regions into long runs of small values, which DEFLATE compresses
//! far better than raw samples.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::FilterStrategy;

/// Filter type bytes as defined by PNG specification.
const FILTER_NONE: u8 = 0;
const FILTER_SUB: u8 = 1;
const FILTER_UP: u8 = 2;
const FILTER_AVERAGE: u8 = 3;
const FILTER_PAETH: u8 = 4;

/// Rows below this count are filtered serially even with `parallel`.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_ROWS: usize = 32;

/// Apply PNG filtering to raw image data, prefixing each row with its filter byte.
///
/// Output length is `height * (1 + width * bytes_per_pixel)`.
pub fn apply_filters(
    data: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    strategy: FilterStrategy,
) -> Vec<u8> {
    let row_bytes = width as usize * bytes_per_pixel;
    let filtered_row_size = row_bytes + 1;
    let height = height as usize;
    let mut output = vec![0u8; filtered_row_size * height];

    #[cfg(feature = "parallel")]
    {
        if height >= PARALLEL_MIN_ROWS {
            output
                .par_chunks_mut(filtered_row_size)
                .enumerate()
                .for_each(|(y, out)| {
                    filter_one_row(data, y, row_bytes, bytes_per_pixel, strategy, out);
                });
            return output;
        }
    }

    for (y, out) in output.chunks_mut(filtered_row_size).enumerate() {
        filter_one_row(data, y, row_bytes, bytes_per_pixel, strategy, out);
    }

    output
}

/// Filter row `y` of `data` into `out` (filter byte + residuals).
#[inline]
fn filter_one_row(
    data: &[u8],
    y: usize,
    row_bytes: usize,
    bpp: usize,
    strategy: FilterStrategy,
    out: &mut [u8],
) {
    let row = &data[y * row_bytes..(y + 1) * row_bytes];
    let prev = if y == 0 {
        None
    } else {
        Some(&data[(y - 1) * row_bytes..y * row_bytes])
    };

    match strategy {
        FilterStrategy::None => filter_row(FILTER_NONE, row, prev, bpp, out),
        FilterStrategy::Sub => filter_row(FILTER_SUB, row, prev, bpp, out),
        FilterStrategy::Up => filter_row(FILTER_UP, row, prev, bpp, out),
        FilterStrategy::Average => filter_row(FILTER_AVERAGE, row, prev, bpp, out),
        FilterStrategy::Paeth => filter_row(FILTER_PAETH, row, prev, bpp, out),
        FilterStrategy::Adaptive => adaptive_filter(row, prev, bpp, out),
    }
}

/// Write `filter_type` and the filtered residuals of `row` into `out`.
fn filter_row(filter_type: u8, row: &[u8], prev: Option<&[u8]>, bpp: usize, out: &mut [u8]) {
    out[0] = filter_type;
    let out = &mut out[1..];

    for i in 0..row.len() {
        let left = if i >= bpp { row[i - bpp] } else { 0 };
        let above = prev.map_or(0, |p| p[i]);
        let upper_left = match prev {
            Some(p) if i >= bpp => p[i - bpp],
            _ => 0,
        };

        let predicted = match filter_type {
            FILTER_SUB => left,
            FILTER_UP => above,
            FILTER_AVERAGE => ((left as u16 + above as u16) / 2) as u8,
            FILTER_PAETH => paeth_predictor(left, above, upper_left),
            _ => 0,
        };
        out[i] = row[i].wrapping_sub(predicted);
    }
}

/// Paeth predictor function.
///
/// Selects the value (a, b, or c) closest to p = a + b - c.
#[inline]
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let a_i = a as i16;
    let b_i = b as i16;
    let c_i = c as i16;

    let p = a_i + b_i - c_i;
    let pa = (p - a_i).abs();
    let pb = (p - b_i).abs();
    let pc = (p - c_i).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Try every filter on the row and keep the one with the lowest score.
fn adaptive_filter(row: &[u8], prev: Option<&[u8]>, bpp: usize, out: &mut [u8]) {
    let mut scratch = vec![0u8; out.len()];
    let mut best_score = u64::MAX;

    for filter_type in [
        FILTER_NONE,
        FILTER_SUB,
        FILTER_UP,
        FILTER_AVERAGE,
        FILTER_PAETH,
    ] {
        filter_row(filter_type, row, prev, bpp, &mut scratch);
        let score = score_filter(&scratch[1..]);
        if score < best_score {
            best_score = score;
            out.copy_from_slice(&scratch);
            if score == 0 {
                break;
            }
        }
    }
}

/// Minimum sum of absolute values, treating residuals as signed bytes.
/// Lower scores typically result in better compression.
#[inline]
fn score_filter(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| (b as i8).unsigned_abs() as u64)
        .sum()
}
