//! In-memory model of an nvraw image

use std::fmt;

use crate::rawfile::format::RawFormat;
use crate::rawfile::raw::bayer_phase::BayerPhase;

/// How stored 16-bit samples map to sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Plain signed 16-bit samples.
    #[default]
    Int16,
    /// Fixed point with 1 integer bit and 14 fractional bits ("s1.14").
    S1Dot14,
}

impl PixelFormat {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "int16" => Some(PixelFormat::Int16),
            "s1.14" => Some(PixelFormat::S1Dot14),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PixelFormat::Int16 => "int16",
            PixelFormat::S1Dot14 => "s1.14",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One exposure of a multi-exposure (staggered HDR) capture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HdrExposureInfo {
    pub symbol: [u8; 4],
    pub exposure_time: f32,
    pub analog_gains: [f32; 4],
    pub digital_gains: [f32; 4],
}

impl HdrExposureInfo {
    pub fn symbol_str(&self) -> String {
        String::from_utf8_lossy(&self.symbol)
            .trim_end_matches('\0')
            .to_string()
    }
}

/// Characters in a readout scheme, one per cell of the 2x2 tile.
pub const READOUT_SCHEME_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HdrInfo {
    pub number_of_exposures: u32,
    /// Long/short assignment of a 2x2 tile, e.g. "LLSS".
    pub readout_scheme: String,
    pub exposures: Vec<HdrExposureInfo>,
}

impl HdrInfo {
    pub fn has_valid_readout_scheme(&self) -> bool {
        self.readout_scheme.len() == READOUT_SCHEME_LEN
    }
}

/// Header-chunk fields that are carried but not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub samples_per_pixel: u32,
    pub image_count: u32,
    pub time_seconds: u32,
    pub time_microseconds: u32,
    pub flags: u32,
}

/// A decoded nvraw image
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    pub bayer_phase: BayerPhase,
    /// Sample precision (e.g. 10, 12 or 14)
    pub bits_per_sample: u32,
    pub pixel_format: PixelFormat,
    /// Row-major samples, `width * height` of them
    pub pixel_data: Vec<i16>,

    /// Exposure time in seconds
    pub exposure_time: f32,
    pub iso: i32,
    pub sensor_gains: [f32; 4],
    pub awb_gains: [f32; 4],
    pub awb_converge_status: i32,
    pub focus_position: i32,

    pub sensor_id: Vec<u8>,
    pub fuse_id: Vec<u8>,

    pub hdr: Option<HdrInfo>,
    pub frame_info: Option<FrameInfo>,

    /// Codec the image was decoded with, `None` for images built in memory
    pub source_format: Option<RawFormat>,
    /// Header version of legacy files
    pub legacy_version: Option<i32>,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl RawImage {
    pub fn new(width: usize, height: usize, bayer_phase: BayerPhase, bits_per_sample: u32) -> Self {
        Self {
            width,
            height,
            bayer_phase,
            bits_per_sample,
            pixel_data: vec![0; width * height],
            ..Default::default()
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn sensor_id_hex(&self) -> String {
        hex(&self.sensor_id)
    }

    pub fn fuse_id_hex(&self) -> String {
        hex(&self.fuse_id)
    }

    pub fn hdr_exposure_count(&self) -> u32 {
        self.hdr.as_ref().map_or(0, |hdr| hdr.number_of_exposures)
    }
}
