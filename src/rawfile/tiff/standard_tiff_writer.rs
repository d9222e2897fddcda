use std::io::{Cursor, Write};

use ::tiff::encoder::colortype::{Gray16, RGB16};
use ::tiff::encoder::compression::DeflateLevel;
use ::tiff::encoder::{Compression, TiffEncoder};
use ::tiff::tags::Predictor;
use tracing::debug;

use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::debayer::types::RgbImageData;
use crate::rawfile::raw::types::RawImage;
use crate::rawfile::tiff::types::{ConversionConfig, TiffCompression};
use crate::rawfile::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

fn encoder<'a>(
    buffer: &'a mut Vec<u8>,
    config: &ConversionConfig,
) -> Result<TiffEncoder<Cursor<&'a mut Vec<u8>>>> {
    let compression = match config.compression {
        TiffCompression::None => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
    };

    let mut encoder = TiffEncoder::new(Cursor::new(buffer))
        .map_err(|e| NvRawError::EncodeError(e.to_string()))?
        .with_compression(compression);

    if let Some(predictor_val) = config.predictor {
        let predictor = match predictor_val {
            2 => Predictor::Horizontal,
            _ => Predictor::None,
        };
        encoder = encoder.with_predictor(predictor);
    }
    Ok(encoder)
}

/// Format-aware samples clamped into the unsigned 16-bit range.
fn mosaic_samples(image: &RawImage) -> Vec<u16> {
    image
        .pixel_data
        .iter()
        .map(|&raw| image.decode_sample(raw).clamp(0, i32::from(u16::MAX)) as u16)
        .collect()
}

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(&self, image: &RawImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding {} mosaic TIFF: {}x{}", image.bayer_phase, image.width, image.height);

        let samples = mosaic_samples(image);
        let mut buffer = Vec::new();
        encoder(&mut buffer, config)?
            .write_image::<Gray16>(image.width as u32, image.height as u32, &samples)
            .map_err(|e| NvRawError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| NvRawError::OutputWriteError(e.to_string()))?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }

    fn write_rgb_tiff(&self, image: &RgbImageData, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding RGB TIFF: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();
        encoder(&mut buffer, config)?
            .write_image::<RGB16>(image.width as u32, image.height as u32, &image.data)
            .map_err(|e| NvRawError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| NvRawError::OutputWriteError(e.to_string()))?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
