//! Error types for the apngify library.

use thiserror::Error;

use crate::format::ImageFormat;

/// Result type alias for apngify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting an image to APNG.
///
/// Each pipeline stage fails with its own variant so hosts can tell a bad
/// input file apart from a budget that cannot be met.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The claimed input format is not one of the supported formats.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The input bytes are not a valid instance of the claimed format.
    #[error("Failed to decode {format} image: {reason}")]
    Decode {
        /// Format the bytes were decoded as.
        format: ImageFormat,
        /// Decoder message.
        reason: String,
    },

    /// PNG encoding failed (compressor ran out of resources).
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// The downscale loop could not bring the output under the byte budget.
    #[error(
        "Cannot fit image into {budget} bytes: smallest encoding was {smallest} bytes after {steps} downscale steps"
    )]
    BudgetUnattainable {
        /// Requested byte budget.
        budget: u64,
        /// Smallest encoded size reached.
        smallest: u64,
        /// Downscale steps taken before giving up.
        steps: u32,
    },

    /// The splicer was handed bytes that are not a structurally valid PNG.
    #[error("Malformed PNG stream: {0}")]
    MalformedInput(String),

    /// Invalid image dimensions (zero width or height).
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Pixel data length doesn't match expected size.
    #[error("Invalid pixel data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        actual: usize,
    },

    /// Image dimensions exceed maximum supported size.
    #[error("Image {width}x{height} exceeds maximum dimension {max}")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },

    /// Invalid compression level (must be 1-9).
    #[error("Invalid compression level {0}: must be 1-9")]
    InvalidCompressionLevel(u8),

    /// Any other out-of-range option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::UnsupportedFormat("audio/mpeg".into());
        assert_eq!(err.to_string(), "Unsupported image format: audio/mpeg");

        let err = Error::Decode {
            format: ImageFormat::Jpeg,
            reason: "unexpected EOF".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode JPEG image: unexpected EOF"
        );

        let err = Error::BudgetUnattainable {
            budget: 10,
            smallest: 67,
            steps: 3,
        };
        assert!(err.to_string().contains("10 bytes"));
        assert!(err.to_string().contains("67 bytes"));
    }
}
