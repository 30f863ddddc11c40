//! Baseline PNG encoder.
//!
//! Produces 8-bit RGBA, non-interlaced PNG streams: signature, `IHDR`, one or
//! more `IDAT` chunks, `IEND`. No ancillary chunks are written.

pub mod chunk;
pub mod filter;

use crate::compress::zlib;
use crate::error::{Error, Result};
use crate::raster::{Raster, BYTES_PER_PIXEL};

/// PNG file signature (magic bytes).
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG color type 6: truecolor with alpha.
const COLOR_TYPE_RGBA: u8 = 6;

/// Largest payload written into a single IDAT chunk.
const IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// PNG encoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngOptions {
    /// Compression level (1-9, default 6).
    pub compression_level: u8,
    /// Filter selection strategy.
    pub filter_strategy: FilterStrategy,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self::balanced()
    }
}

impl PngOptions {
    /// Speed-focused preset.
    pub fn fast() -> Self {
        Self {
            compression_level: 2,
            filter_strategy: FilterStrategy::Sub,
        }
    }

    /// Balanced preset (the default).
    pub fn balanced() -> Self {
        Self {
            compression_level: 6,
            filter_strategy: FilterStrategy::Adaptive,
        }
    }

    /// Highest compression preset; slowest.
    pub fn max_compression() -> Self {
        Self {
            compression_level: 9,
            filter_strategy: FilterStrategy::Adaptive,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.compression_level) {
            return Err(Error::InvalidCompressionLevel(self.compression_level));
        }
        Ok(())
    }
}

/// PNG filter selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStrategy {
    /// Always use no filter (fastest encoding).
    None,
    /// Always use Sub filter.
    Sub,
    /// Always use Up filter.
    Up,
    /// Always use Average filter.
    Average,
    /// Always use Paeth filter.
    Paeth,
    /// Choose best filter per row (best compression, slower).
    #[default]
    Adaptive,
}

/// An encoded PNG stream together with the dimensions it encodes.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// The encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a PNG stream is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Width of the encoded image.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the encoded image.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode a raster as an RGBA8 PNG with default options.
pub fn encode(raster: &Raster) -> Result<EncodedImage> {
    encode_with_options(raster, &PngOptions::default())
}

/// Encode a raster as an RGBA8 PNG.
///
/// Given a valid raster and options this only fails if the compressor does.
pub fn encode_with_options(raster: &Raster, options: &PngOptions) -> Result<EncodedImage> {
    options.validate()?;
    let (width, height) = raster.dimensions();

    let filtered = filter::apply_filters(
        raster.pixels(),
        width,
        height,
        BYTES_PER_PIXEL,
        options.filter_strategy,
    );
    let compressed = zlib::compress(&filtered, options.compression_level)?;
    drop(filtered);

    let idat_count = compressed.len().div_ceil(IDAT_CHUNK_SIZE).max(1);
    let mut output = Vec::with_capacity(
        PNG_SIGNATURE.len()
            + (chunk::CHUNK_OVERHEAD + 13)
            + compressed.len()
            + idat_count * chunk::CHUNK_OVERHEAD
            + chunk::CHUNK_OVERHEAD,
    );
    output.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut output, width, height);
    write_idat_chunks(&mut output, &compressed);
    write_iend(&mut output);

    Ok(EncodedImage {
        bytes: output,
        width,
        height,
    })
}

/// Write IHDR (image header) chunk.
fn write_ihdr(output: &mut Vec<u8>, width: u32, height: u32) {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&width.to_be_bytes());
    ihdr_data.extend_from_slice(&height.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(COLOR_TYPE_RGBA);
    ihdr_data.push(0); // compression: DEFLATE
    ihdr_data.push(0); // filter method: adaptive
    ihdr_data.push(0); // interlace: none
    chunk::write_chunk(output, b"IHDR", &ihdr_data);
}

/// Write IDAT (image data) chunks.
fn write_idat_chunks(output: &mut Vec<u8>, compressed: &[u8]) {
    for chunk_data in compressed.chunks(IDAT_CHUNK_SIZE) {
        chunk::write_chunk(output, b"IDAT", chunk_data);
    }
}

/// Write IEND (image end) chunk.
fn write_iend(output: &mut Vec<u8>) {
    chunk::write_chunk(output, b"IEND", &[]);
}
