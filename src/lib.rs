//! # apngify
//!
//! Convert an image into a single-frame Animated PNG that fits a byte budget.
//!
//! The input (JPEG, PNG, WebP, GIF, BMP or TIFF) is decoded to RGBA8,
//! encoded as PNG, and shrunk step by step until the encoding fits. The final
//! PNG is then spliced into an APNG by inserting `acTL` and `fcTL` chunks
//! right after `IHDR`.
//!
//! ## Features
//!
//! - **Size budget** with the APNG chunks counted in
//! - **Real CRC-32** on every chunk written
//! - **Pluggable codec** via the [`ImageCodec`] trait
//! - Optional parallel filtering and resampling via the `parallel` feature
//! - Optional browser bindings via the `wasm` feature
//!
//! ## Example
//!
//! ```rust
//! use apngify::{apng, Converter, ConvertOptions, ImageFormat};
//!
//! let mut jpeg = Vec::new();
//! image::RgbImage::from_pixel(64, 48, image::Rgb([30, 120, 200]))
//!     .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
//!     .unwrap();
//!
//! let converter = Converter::new().with_options(ConvertOptions {
//!     budget: 64 * 1024,
//!     ..ConvertOptions::default()
//! });
//! let conversion = converter.run(&jpeg, ImageFormat::Jpeg).unwrap();
//!
//! assert!(conversion.apng.len() <= 64 * 1024);
//! let info = apng::inspect(&conversion.apng).unwrap();
//! assert_eq!((info.width, info.height), (64, 48));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod apng;
pub mod codec;
pub mod compress;
pub mod convert;
pub mod downscale;
pub mod error;
pub mod format;
pub mod png;
pub mod raster;
pub mod resize;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use codec::{ImageCodec, StandardCodec};
pub use convert::{convert, Conversion, ConvertOptions, Converter, DEFAULT_BUDGET};
pub use downscale::DownscaleOptions;
pub use error::{Error, Result};
pub use format::ImageFormat;
pub use png::{EncodedImage, FilterStrategy, PngOptions};
pub use raster::Raster;
pub use resize::ResampleFilter;
