use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::info;

use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::debayer::types::RgbImageData;
use crate::rawfile::raw::bayer_phase::BayerPhase;
use crate::rawfile::raw::types::RawImage;

pub struct CpuDebayer;

fn cfa(phase: BayerPhase) -> CFA {
    match phase {
        BayerPhase::Rggb => CFA::RGGB,
        BayerPhase::Grbg => CFA::GRBG,
        BayerPhase::Gbrg => CFA::GBRG,
        BayerPhase::Bggr => CFA::BGGR,
    }
}

/// Red and blue multipliers relative to green, from the AWB gains
/// (R, Gr, Gb, B). Unset gains leave the image unbalanced.
fn white_balance(awb_gains: &[f32; 4]) -> [f32; 3] {
    let green = (awb_gains[1] + awb_gains[2]) / 2.0;
    if green <= 0.0 || awb_gains[0] <= 0.0 || awb_gains[3] <= 0.0 {
        return [1.0; 3];
    }
    [awb_gains[0] / green, 1.0, awb_gains[3] / green]
}

impl CpuDebayer {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn process(&self, raw_image: &RawImage) -> Result<RgbImageData> {
        let width = raw_image.width;
        let height = raw_image.height;
        let phase = raw_image.bayer_phase;
        info!("Starting CPU debayering for {} image {}x{}", phase, width, height);

        // bayer crate only supports 8 and 16 bit
        let (bayer_depth, raster_depth, bytes_per_pixel) = if raw_image.bits_per_sample <= 8 {
            (BayerDepth::Depth8, RasterDepth::Depth8, 1)
        } else {
            (BayerDepth::Depth16LE, RasterDepth::Depth16, 2)
        };

        let max_value = i32::from(u16::MAX);
        let samples = raw_image
            .pixel_data
            .iter()
            .map(|&raw| raw_image.decode_sample(raw).clamp(0, max_value) as u16);
        let bayer_bytes: Vec<u8> = if bytes_per_pixel == 1 {
            samples.map(|val| val.min(0xff) as u8).collect()
        } else {
            samples.flat_map(|val| val.to_le_bytes()).collect()
        };

        let output_buf_size = width * height * 3 * bytes_per_pixel;
        let mut output_buf = vec![0u8; output_buf_size];
        let mut cursor = Cursor::new(&bayer_bytes[..]);

        info!("Running demosaic with depth={:?}, CFA={}, algo=Linear", bayer_depth, phase);

        let mut output_raster = RasterMut::new(width, height, raster_depth, &mut output_buf);
        bayer::run_demosaic(
            &mut cursor,
            bayer_depth,
            cfa(phase),
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| NvRawError::DebayerError(format!("{:?}", e)))?;

        // Stretch sensor range to 16 bit and apply white balance
        let full_scale = ((1u64 << raw_image.bits_per_sample.clamp(1, 16)) - 1) as f32;
        let scale = f32::from(u16::MAX) / full_scale;
        let wb = white_balance(&raw_image.awb_gains);

        let rgb_data: Vec<u16> = output_buf
            .chunks_exact(bytes_per_pixel * 3)
            .flat_map(|pixel_bytes| {
                let rgb: [f32; 3] = if bytes_per_pixel == 1 {
                    [pixel_bytes[0] as f32, pixel_bytes[1] as f32, pixel_bytes[2] as f32]
                } else {
                    [
                        u16::from_le_bytes([pixel_bytes[0], pixel_bytes[1]]) as f32,
                        u16::from_le_bytes([pixel_bytes[2], pixel_bytes[3]]) as f32,
                        u16::from_le_bytes([pixel_bytes[4], pixel_bytes[5]]) as f32,
                    ]
                };
                [0, 1, 2].map(|c| (rgb[c] * scale * wb[c]).round().clamp(0.0, 65535.0) as u16)
            })
            .collect();

        Ok(RgbImageData {
            width,
            height,
            data: rgb_data,
            bits_per_sample: 16,
        })
    }
}
