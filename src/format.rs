//! Input format allow-list.
//!
//! Only six raster formats are accepted. A format tag is either a MIME type
//! (what browsers and most hosts hand over), a file extension, or the result
//! of sniffing magic bytes. The core always decodes with the claimed format;
//! sniffing is a convenience for hosts that have no tag at all.

use std::fmt;

use crate::error::{Error, Result};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// JPEG / JFIF.
    Jpeg,
    /// PNG (including APNG, decoded as its default image).
    Png,
    /// WebP, lossy or lossless.
    WebP,
    /// GIF; only the first frame is used.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// TIFF.
    Tiff,
}

impl ImageFormat {
    /// Every accepted format, in a stable order.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::WebP,
        ImageFormat::Gif,
        ImageFormat::Bmp,
        ImageFormat::Tiff,
    ];

    /// Parse a MIME type such as `image/jpeg`.
    ///
    /// Matching is case-insensitive and ignores parameters after `;`.
    /// Anything outside the allow-list fails with [`Error::UnsupportedFormat`].
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(ImageFormat::Jpeg),
            "image/png" | "image/apng" => Ok(ImageFormat::Png),
            "image/webp" => Ok(ImageFormat::WebP),
            "image/gif" => Ok(ImageFormat::Gif),
            "image/bmp" | "image/x-ms-bmp" | "image/x-bmp" => Ok(ImageFormat::Bmp),
            "image/tiff" | "image/tiff-fx" => Ok(ImageFormat::Tiff),
            _ => Err(Error::UnsupportedFormat(mime.to_string())),
        }
    }

    /// Parse a file extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim_start_matches('.');
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Ok(ImageFormat::Jpeg),
            "png" | "apng" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::WebP),
            "gif" => Ok(ImageFormat::Gif),
            "bmp" | "dib" => Ok(ImageFormat::Bmp),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            _ => Err(Error::UnsupportedFormat(format!(".{ext}"))),
        }
    }

    /// Detect a format from the leading magic bytes.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if header.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: "RIFF" <size> "WEBP"
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }

        if header.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        // TIFF: little-endian "II*\0" or big-endian "MM\0*"
        if header.starts_with(b"II*\0") || header.starts_with(b"MM\0*") {
            return Some(ImageFormat::Tiff);
        }

        None
    }

    /// Canonical MIME type.
    pub const fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }

    /// The matching `image` crate format.
    pub(crate) const fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::WebP => "WebP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains('/') {
            Self::from_mime(s)
        } else {
            Self::from_extension(s)
        }
    }
}
