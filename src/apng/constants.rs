//! Fixed field values for the single-frame animation.
//!
//! The output always describes exactly one frame covering the whole canvas,
//! so every field that could vary in a general APNG is pinned here.

/// `acTL.num_frames`: exactly one frame.
pub const NUM_FRAMES: u32 = 1;

/// `acTL.num_plays`: 0 means loop forever.
///
/// Policy choice; a single frame looks identical whatever the play count.
pub const NUM_PLAYS: u32 = 0;

/// `fcTL.sequence_number` of the only frame control chunk.
pub const SEQUENCE_NUMBER: u32 = 0;

/// `fcTL.x_offset`: the frame starts at the canvas origin.
pub const X_OFFSET: u32 = 0;

/// `fcTL.y_offset`: the frame starts at the canvas origin.
pub const Y_OFFSET: u32 = 0;

/// `fcTL.delay_num`: frame delay numerator.
pub const DELAY_NUM: u16 = 1;

/// `fcTL.delay_den`: frame delay denominator (1/100 s).
pub const DELAY_DEN: u16 = 100;

/// `APNG_DISPOSE_OP_NONE`: leave the frame as is.
pub const DISPOSE_OP_NONE: u8 = 0;

/// `APNG_BLEND_OP_SOURCE`: overwrite the output buffer region.
pub const BLEND_OP_SOURCE: u8 = 0;

/// Payload length of an `acTL` chunk.
pub const ACTL_LEN: usize = 8;

/// Payload length of an `fcTL` chunk.
pub const FCTL_LEN: usize = 26;

/// Bytes the splicer adds to a PNG: framed `acTL` plus framed `fcTL`.
pub const APNG_OVERHEAD: usize = (12 + ACTL_LEN) + (12 + FCTL_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead() {
        assert_eq!(APNG_OVERHEAD, 58);
    }
}
