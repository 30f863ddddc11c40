//! Single-frame APNG construction.
//!
//! An APNG is a PNG with two extra chunks: `acTL` (animation control) before
//! the first `IDAT`, and an `fcTL` (frame control) right before the frame's
//! data. When the first frame is the default image, its pixels stay in the
//! ordinary `IDAT` chunks, so turning a baseline PNG into a one-frame APNG is
//! pure chunk surgery:
//!
//! ```text
//! signature | IHDR | acTL | fcTL | IDAT... | IEND
//! ```
//!
//! Everything after `IHDR` is copied byte-for-byte from the input.

pub mod constants;

use crate::error::{Error, Result};
use crate::png::chunk::{ihdr_dimensions, parse_chunks, write_chunk, Chunk};
use crate::png::PNG_SIGNATURE;

use constants::*;

/// `acTL` payload: frame count and loop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationControl {
    /// Number of frames in the animation.
    pub num_frames: u32,
    /// Times to loop; 0 loops forever.
    pub num_plays: u32,
}

impl AnimationControl {
    /// The fixed single-frame, loop-forever control.
    pub const fn single_frame() -> Self {
        Self {
            num_frames: NUM_FRAMES,
            num_plays: NUM_PLAYS,
        }
    }

    /// Big-endian payload bytes.
    pub fn to_bytes(&self) -> [u8; ACTL_LEN] {
        let mut out = [0u8; ACTL_LEN];
        out[0..4].copy_from_slice(&self.num_frames.to_be_bytes());
        out[4..8].copy_from_slice(&self.num_plays.to_be_bytes());
        out
    }

    /// Parse an `acTL` payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let data: &[u8; ACTL_LEN] = data.try_into().map_err(|_| {
            Error::malformed(format!("acTL payload is {} bytes, expected 8", data.len()))
        })?;
        Ok(Self {
            num_frames: be_u32(&data[0..4]),
            num_plays: be_u32(&data[4..8]),
        })
    }
}

/// `fcTL` payload: geometry, timing and compositing for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameControl {
    /// Position in the shared `fcTL`/`fdAT` sequence.
    pub sequence_number: u32,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Horizontal position on the canvas.
    pub x_offset: u32,
    /// Vertical position on the canvas.
    pub y_offset: u32,
    /// Delay numerator.
    pub delay_num: u16,
    /// Delay denominator.
    pub delay_den: u16,
    /// Dispose operation after the frame is shown.
    pub dispose_op: u8,
    /// Blend operation when drawing the frame.
    pub blend_op: u8,
}

impl FrameControl {
    /// The fixed frame control for a single frame covering a `width` x `height` canvas.
    pub const fn full_canvas(width: u32, height: u32) -> Self {
        Self {
            sequence_number: SEQUENCE_NUMBER,
            width,
            height,
            x_offset: X_OFFSET,
            y_offset: Y_OFFSET,
            delay_num: DELAY_NUM,
            delay_den: DELAY_DEN,
            dispose_op: DISPOSE_OP_NONE,
            blend_op: BLEND_OP_SOURCE,
        }
    }

    /// Big-endian payload bytes.
    pub fn to_bytes(&self) -> [u8; FCTL_LEN] {
        let mut out = [0u8; FCTL_LEN];
        out[0..4].copy_from_slice(&self.sequence_number.to_be_bytes());
        out[4..8].copy_from_slice(&self.width.to_be_bytes());
        out[8..12].copy_from_slice(&self.height.to_be_bytes());
        out[12..16].copy_from_slice(&self.x_offset.to_be_bytes());
        out[16..20].copy_from_slice(&self.y_offset.to_be_bytes());
        out[20..22].copy_from_slice(&self.delay_num.to_be_bytes());
        out[22..24].copy_from_slice(&self.delay_den.to_be_bytes());
        out[24] = self.dispose_op;
        out[25] = self.blend_op;
        out
    }

    /// Parse an `fcTL` payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let data: &[u8; FCTL_LEN] = data.try_into().map_err(|_| {
            Error::malformed(format!("fcTL payload is {} bytes, expected 26", data.len()))
        })?;
        Ok(Self {
            sequence_number: be_u32(&data[0..4]),
            width: be_u32(&data[4..8]),
            height: be_u32(&data[8..12]),
            x_offset: be_u32(&data[12..16]),
            y_offset: be_u32(&data[16..20]),
            delay_num: u16::from_be_bytes([data[20], data[21]]),
            delay_den: u16::from_be_bytes([data[22], data[23]]),
            dispose_op: data[24],
            blend_op: data[25],
        })
    }
}

#[inline]
fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

/// Turn a baseline PNG into a valid single-frame APNG.
///
/// Inserts `acTL` and `fcTL` immediately after `IHDR`; every other chunk is
/// copied unchanged. The input must be a complete, CRC-valid PNG without
/// animation chunks, otherwise [`Error::MalformedInput`] is returned.
pub fn to_apng(png: &[u8]) -> Result<Vec<u8>> {
    let chunks = parse_chunks(png)?;
    let ihdr = &chunks[0];
    let (width, height) = ihdr_dimensions(ihdr)?;

    if let Some(c) = chunks
        .iter()
        .find(|c| c.is(b"acTL") || c.is(b"fcTL") || c.is(b"fdAT"))
    {
        return Err(Error::malformed(format!(
            "input already contains an {} chunk",
            c.type_name()
        )));
    }
    if !chunks.iter().any(|c| c.is(b"IDAT")) {
        return Err(Error::malformed("no IDAT chunk"));
    }

    let mut output = Vec::with_capacity(png.len() + APNG_OVERHEAD);
    output.extend_from_slice(&PNG_SIGNATURE);
    output.extend_from_slice(&png[ihdr.span.clone()]);
    write_chunk(
        &mut output,
        b"acTL",
        &AnimationControl::single_frame().to_bytes(),
    );
    write_chunk(
        &mut output,
        b"fcTL",
        &FrameControl::full_canvas(width, height).to_bytes(),
    );
    output.extend_from_slice(&png[ihdr.span.end..]);

    Ok(output)
}

/// Structure of a single-frame APNG as produced by [`to_apng`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApngInfo {
    /// Canvas width from `IHDR`.
    pub width: u32,
    /// Canvas height from `IHDR`.
    pub height: u32,
    /// Decoded `acTL`.
    pub animation: AnimationControl,
    /// Decoded `fcTL`.
    pub frame: FrameControl,
    /// Number of `IDAT` chunks carrying the frame.
    pub idat_chunks: usize,
}

/// Parse and check a single-frame APNG.
///
/// Verifies every chunk's framing and CRC, that chunks appear in the order
/// `IHDR, acTL, fcTL, IDAT+, IEND`, that `acTL` declares one frame, and that
/// the frame is the first in sequence and covers the whole canvas.
pub fn inspect(apng: &[u8]) -> Result<ApngInfo> {
    let chunks = parse_chunks(apng)?;
    let (width, height) = ihdr_dimensions(&chunks[0])?;

    let types: Vec<[u8; 4]> = chunks.iter().map(|c| c.chunk_type).collect();
    let idat_chunks = match types.as_slice() {
        [_ihdr, actl, fctl, rest @ .., iend]
            if actl == b"acTL"
                && fctl == b"fcTL"
                && iend == b"IEND"
                && !rest.is_empty()
                && rest.iter().all(|t| t == b"IDAT") =>
        {
            rest.len()
        }
        _ => {
            let names: Vec<String> = chunks.iter().map(Chunk::type_name).collect();
            return Err(Error::malformed(format!(
                "unexpected chunk order: {}",
                names.join(", ")
            )));
        }
    };

    let animation = AnimationControl::from_bytes(chunks[1].data)?;
    let frame = FrameControl::from_bytes(chunks[2].data)?;

    if (frame.width, frame.height) != (width, height) {
        return Err(Error::malformed(format!(
            "fcTL size {}x{} differs from IHDR size {width}x{height}",
            frame.width, frame.height
        )));
    }
    if animation.num_frames != NUM_FRAMES {
        return Err(Error::malformed(format!(
            "acTL declares {} frames",
            animation.num_frames
        )));
    }
    if frame.sequence_number != SEQUENCE_NUMBER {
        return Err(Error::malformed(format!(
            "fcTL sequence number is {}, expected {SEQUENCE_NUMBER}",
            frame.sequence_number
        )));
    }
    if (frame.x_offset, frame.y_offset) != (X_OFFSET, Y_OFFSET) {
        return Err(Error::malformed(format!(
            "fcTL offset ({}, {}) is not the canvas origin",
            frame.x_offset, frame.y_offset
        )));
    }

    Ok(ApngInfo {
        width,
        height,
        animation,
        frame,
        idat_chunks,
    })
}
