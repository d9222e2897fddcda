use std::io::Write;
use crate::rawfile::common::error::Result;
use crate::rawfile::raw::types::RawImage;
use crate::rawfile::debayer::types::RgbImageData;
use crate::rawfile::tiff::types::ConversionConfig;

pub trait TiffWriter {
    /// Writes the Bayer mosaic as a single-channel 16-bit image.
    fn write_tiff(&self, image: &RawImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
    fn write_rgb_tiff(&self, image: &RgbImageData, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
