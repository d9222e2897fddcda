use std::io::Write;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::rawfile::{
    common::error::{NvRawError, Result},
    conversions::timing::PipelineTimings,
    debayer::CpuDebayer,
    raw::{NvRawReader, RawImage, RawImageReader},
    tiff::{ConversionConfig, StandardTiffWriter, TiffWriter},
};

pub struct NvRawToTiffPipeline<R: RawImageReader, W: TiffWriter> {
    reader: R,
    writer: W,
    debayer: CpuDebayer,
    config: ConversionConfig,
}

impl NvRawToTiffPipeline<NvRawReader, StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(NvRawReader, StandardTiffWriter, config)
    }
}

impl<R: RawImageReader, W: TiffWriter> NvRawToTiffPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            debayer: CpuDebayer,
            config,
        }
    }

    fn validate_dimensions(&self, image: &RawImage) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if image.width == 0 || image.height == 0 {
            return Err(NvRawError::InvalidDimensions(image.width, image.height));
        }
        if self.config.debayer && (image.width < 2 || image.height < 2) {
            warn!("Image {}x{} is smaller than one Bayer tile", image.width, image.height);
            return Err(NvRawError::InvalidDimensions(image.width, image.height));
        }

        Ok(())
    }

    fn validate_samples(&self, image: &RawImage) -> Result<()> {
        if !self.config.check_sample_range {
            return Ok(());
        }
        image.check_sample_range()
    }

    /// Decodes, validates and crops without encoding.
    pub fn prepare(&self, input_data: &[u8], timings: &mut PipelineTimings) -> Result<RawImage> {
        let mut raw_image = {
            let _span = tracing::info_span!("decode_nvraw").entered();
            timings.time("decode_nvraw", || self.reader.read_raw(input_data))?
        };

        {
            let _span = tracing::info_span!("validate",
                width = raw_image.width,
                height = raw_image.height,
                bits = raw_image.bits_per_sample
            ).entered();
            timings.time("validate", || {
                self.validate_dimensions(&raw_image)?;
                self.validate_samples(&raw_image)
            })?;
        }

        if let Some((width, height)) = self.config.crop {
            let _span = tracing::info_span!("crop", width, height).entered();
            timings.time("crop", || raw_image.crop_centered(width, height))?;
        }

        Ok(raw_image)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert_with_timings(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        info!("Starting nvraw to TIFF conversion");

        let raw_image = self.prepare(input_data, &mut timings)?;

        if self.config.debayer {
            let rgb = {
                let _span = tracing::info_span!("debayer").entered();
                timings.time("debayer", || self.debayer.process(&raw_image))?
            };
            let _span = tracing::info_span!("encode_tiff").entered();
            timings.time("encode_tiff", || {
                self.writer.write_rgb_tiff(&rgb, output, &self.config)
            })?;
        } else {
            let _span = tracing::info_span!("encode_tiff").entered();
            timings.time("encode_tiff", || {
                self.writer.write_tiff(&raw_image, output, &self.config)
            })?;
        }

        info!(
            width = raw_image.width,
            height = raw_image.height,
            phase = %raw_image.bayer_phase,
            "Conversion complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        self.convert_with_timings(input_data, output).map(|_| ())
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                NvRawError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        // Encode fully before touching the output path
        let mut encoded = Vec::new();
        let timings = self.convert_with_timings(&input_data, &mut encoded)?;

        {
            let _span = tracing::info_span!("write_output_file").entered();
            std::fs::write(output_path, &encoded).map_err(|e| {
                NvRawError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }

        Ok(timings)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
