//! PNG chunk framing.
//!
//! A chunk is `[length: u32 BE][type: 4 bytes][payload][CRC-32 of type+payload]`.
//! [`write_chunk`] frames a payload; [`parse_chunks`] walks an existing byte
//! stream into [`Chunk`] records that remember where each chunk lives, so
//! callers can copy chunks verbatim without relying on fixed offsets.

use std::ops::Range;

use crate::compress::crc32::chunk_crc;
use crate::error::{Error, Result};

use super::PNG_SIGNATURE;

/// Bytes of framing around each payload (length + type + CRC).
pub const CHUNK_OVERHEAD: usize = 12;

/// Write a PNG chunk (length, type, data, CRC32) to the output buffer.
pub fn write_chunk(output: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    output.reserve(CHUNK_OVERHEAD + data.len());
    output.extend_from_slice(&(data.len() as u32).to_be_bytes());
    output.extend_from_slice(chunk_type);
    output.extend_from_slice(data);
    output.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
}

/// One parsed chunk, borrowing its payload from the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Four-byte ASCII type tag.
    pub chunk_type: [u8; 4],
    /// Payload bytes.
    pub data: &'a [u8],
    /// CRC stored in the stream (verified during parsing).
    pub crc: u32,
    /// Byte range of the whole framed chunk in the source buffer.
    pub span: Range<usize>,
}

impl Chunk<'_> {
    /// Whether this chunk has the given type tag.
    #[inline]
    pub fn is(&self, chunk_type: &[u8; 4]) -> bool {
        &self.chunk_type == chunk_type
    }

    /// The type tag as text, for messages.
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

/// Parse a complete PNG byte stream into its chunks.
///
/// Checks the signature, the framing and CRC of every chunk, that the first
/// chunk is a 13-byte `IHDR`, and that the stream ends exactly after `IEND`.
/// Any violation is reported as [`Error::MalformedInput`].
pub fn parse_chunks(data: &[u8]) -> Result<Vec<Chunk<'_>>> {
    if data.len() < PNG_SIGNATURE.len() || data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(Error::malformed("missing PNG signature"));
    }

    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();
    let mut seen_iend = false;

    while pos < data.len() {
        if seen_iend {
            return Err(Error::malformed(format!(
                "{} bytes of trailing data after IEND",
                data.len() - pos
            )));
        }

        let chunk = read_chunk(data, pos)?;

        if chunks.is_empty() {
            if !chunk.is(b"IHDR") {
                return Err(Error::malformed(format!(
                    "first chunk is {} instead of IHDR",
                    chunk.type_name()
                )));
            }
            if chunk.data.len() != 13 {
                return Err(Error::malformed(format!(
                    "IHDR payload is {} bytes instead of 13",
                    chunk.data.len()
                )));
            }
        }

        seen_iend = chunk.is(b"IEND");
        pos = chunk.span.end;
        chunks.push(chunk);
    }

    if chunks.is_empty() {
        return Err(Error::malformed("missing IHDR chunk"));
    }
    if !seen_iend {
        return Err(Error::malformed("missing IEND chunk"));
    }

    Ok(chunks)
}

/// Read and verify the single chunk starting at `pos`.
fn read_chunk(data: &[u8], pos: usize) -> Result<Chunk<'_>> {
    let header_end = pos
        .checked_add(8)
        .ok_or_else(|| Error::malformed("chunk offset overflow"))?;
    if header_end > data.len() {
        return Err(Error::malformed(format!("truncated chunk header at offset {pos}")));
    }

    let length = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
    // PNG caps chunk lengths at 2^31 - 1.
    if length > i32::MAX as u32 {
        return Err(Error::malformed(format!(
            "chunk length {length} at offset {pos} exceeds 2^31-1"
        )));
    }

    let mut chunk_type = [0u8; 4];
    chunk_type.copy_from_slice(&data[pos + 4..header_end]);

    let data_end = header_end
        .checked_add(length as usize)
        .ok_or_else(|| Error::malformed("chunk length overflow"))?;
    let crc_end = data_end
        .checked_add(4)
        .ok_or_else(|| Error::malformed("chunk length overflow"))?;
    if crc_end > data.len() {
        return Err(Error::malformed(format!(
            "truncated {} chunk at offset {pos}",
            String::from_utf8_lossy(&chunk_type)
        )));
    }

    let payload = &data[header_end..data_end];
    let stored = u32::from_be_bytes([
        data[data_end],
        data[data_end + 1],
        data[data_end + 2],
        data[data_end + 3],
    ]);
    let computed = chunk_crc(&chunk_type, payload);
    if stored != computed {
        return Err(Error::malformed(format!(
            "CRC mismatch in {} chunk: stored {stored:#010x}, computed {computed:#010x}",
            String::from_utf8_lossy(&chunk_type)
        )));
    }

    Ok(Chunk {
        chunk_type,
        data: payload,
        crc: stored,
        span: pos..crc_end,
    })
}

/// Width and height from an IHDR payload.
pub fn ihdr_dimensions(ihdr: &Chunk<'_>) -> Result<(u32, u32)> {
    if !ihdr.is(b"IHDR") || ihdr.data.len() != 13 {
        return Err(Error::malformed("invalid IHDR chunk"));
    }
    let d = ihdr.data;
    let width = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
    let height = u32::from_be_bytes([d[4], d[5], d[6], d[7]]);
    if width == 0 || height == 0 {
        return Err(Error::malformed(format!(
            "IHDR declares zero dimension {width}x{height}"
        )));
    }
    Ok((width, height))
}
