//! TIFF writing module
//!
//! This module writes decoded nvraw images as TIFF, either as the raw Bayer
//! mosaic or as debayered RGB.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::TiffWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{TiffCompression, ConversionConfig, ConversionConfigBuilder};
