//! zlib stream compression for IDAT data.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Compress `data` into a complete zlib stream (header, DEFLATE body, Adler-32).
///
/// `level` is a 1-9 compression level. The only failure mode is the
/// underlying writer running out of memory or otherwise erroring.
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(level.clamp(1, 9) as u32),
    );
    encoder
        .write_all(data)
        .map_err(|e| Error::Encode(e.to_string()))?;
    encoder.finish().map_err(|e| Error::Encode(e.to_string()))
}
