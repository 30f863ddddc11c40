//! Decode and resample capabilities.
//!
//! The pipeline never touches pixel codecs directly; it goes through
//! [`ImageCodec`]. [`StandardCodec`] is the built-in implementation backed by
//! the `image` crate for decoding and [`crate::resize`] for resampling. Hosts
//! with their own decoders (a browser canvas, a platform image API) can plug
//! them in through [`crate::Converter::with_codec`].

use std::io::Cursor;

use crate::error::{Error, Result};
use crate::format::ImageFormat;
use crate::raster::Raster;
use crate::resize::{self, ResampleFilter};

/// Pixel-level capabilities the conversion pipeline depends on.
pub trait ImageCodec {
    /// Decode `bytes`, which the caller claims are in `format`, to RGBA8.
    ///
    /// Must fail with [`Error::Decode`] for corrupt, truncated or zero-sized
    /// input rather than returning an empty raster.
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<Raster>;

    /// Resample `raster` to exactly `width` x `height` with a smoothing filter.
    fn resample(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster>;
}

impl<C: ImageCodec + ?Sized> ImageCodec for &C {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<Raster> {
        (**self).decode(bytes, format)
    }

    fn resample(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster> {
        (**self).resample(raster, width, height)
    }
}

/// Built-in codec: `image` crate decoders plus [`crate::resize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardCodec {
    /// Filter used by [`ImageCodec::resample`].
    pub filter: ResampleFilter,
}

impl StandardCodec {
    /// A codec resampling with `filter`.
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }
}

impl ImageCodec for StandardCodec {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<Raster> {
        let decode_error = |reason: String| Error::Decode { format, reason };

        if bytes.is_empty() {
            return Err(decode_error("empty input".into()));
        }

        // Decode strictly as the claimed format; never guess from content.
        let reader = image::ImageReader::with_format(Cursor::new(bytes), format.to_image_format());
        let decoded = reader.decode().map_err(|e| decode_error(e.to_string()))?;

        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(decode_error(format!("zero-sized image {width}x{height}")));
        }

        Raster::new(width, height, rgba.into_raw()).map_err(|e| decode_error(e.to_string()))
    }

    fn resample(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster> {
        resize::resize(raster, width, height, self.filter)
    }
}
