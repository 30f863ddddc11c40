//! Checksums and compression used by the PNG encoder and APNG splicer.

pub mod crc32;
pub mod zlib;

pub use crc32::{chunk_crc, crc32, Crc32};
