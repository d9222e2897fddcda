//! Legacy nvraw codec (header versions 1 to 4).
//!
//! The header is a fixed-offset structure followed directly by
//! `width * height` little-endian `i16` samples:
//!
//! | offset | content |
//! |-------:|---------|
//! |      0 | magic, version, width, height |
//! |     16 | packed bayer phase, 3 reserved words |
//! |     32 | exposure (16.16), iso, exposure comp (16.16), illuminant, focus |
//! |     52 | reserved RGB gains |
//! |     68 | sensor gains, sensor exposure |
//! |     88 | reserved debug blob |
//! |    104 | integrity sentinel |
//! |    108 | metadata blob |
//! |   1132 | statistics blob |
//! |   3180 | AWB union (used from version 2) |
//! |   3212 | reserved blob |
//! |   3276 | bayer-data sentinel |

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use crate::rawfile::common::binary::{ByteReader, ByteWriter};
use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::format::detect::{LEGACY_MAGIC, RawFormat};
use crate::rawfile::raw::bayer_phase::BayerPhase;
use crate::rawfile::raw::types::{PixelFormat, RawImage};

pub const INTEGRITY_SENTINEL: u32 = 0xDEAD_BEEF;
pub const BAYER_DATA_SENTINEL: u32 = 0xCAFE_F00D;

/// Legacy files always carry 10-bit samples.
pub const LEGACY_BITS_PER_SAMPLE: u32 = 10;

const FIXED_16_16_ONE: f64 = 65536.0;

pub const CORE_HEADER_SIZE: usize = 27 * 4;
pub const METADATA_BLOB_SIZE: usize = 1024;
pub const STATISTICS_BLOB_SIZE: usize = 2048;
pub const AWB_UNION_SIZE: usize = 32;
pub const RESERVED_BLOB_SIZE: usize = 64;

const OFFSET_MAGIC: usize = 0;
const OFFSET_VERSION: usize = 4;
const OFFSET_WIDTH: usize = 8;
const OFFSET_HEIGHT: usize = 12;
const OFFSET_BAYER_PHASE: usize = 16;
const OFFSET_EXPOSURE: usize = 32;
const OFFSET_ISO: usize = 36;
const OFFSET_FOCUS: usize = 48;
const OFFSET_INTEGRITY: usize = 104;

pub const AWB_UNION_OFFSET: usize = CORE_HEADER_SIZE + METADATA_BLOB_SIZE + STATISTICS_BLOB_SIZE;
const OFFSET_AWB_STATUS: usize = AWB_UNION_OFFSET + 12;
const OFFSET_AWB_GAINS: usize = AWB_UNION_OFFSET + 16;

pub const BAYER_SENTINEL_OFFSET: usize = AWB_UNION_OFFSET + AWB_UNION_SIZE + RESERVED_BLOB_SIZE;
pub const LEGACY_HEADER_SIZE: usize = BAYER_SENTINEL_OFFSET + 4;

/// AWB fields appear from this header version on.
const AWB_MIN_VERSION: i32 = 2;

fn dimension(value: i32, other: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        NvRawError::InvalidDimensions(value.max(0) as usize, other.max(0) as usize)
    })
}

/// Unsigned 16.16 seconds; negative, NaN and out-of-range values fail.
fn exposure_to_fixed(seconds: f32) -> Result<u32> {
    let fixed = (f64::from(seconds) * FIXED_16_16_ONE).round();
    if !(0.0..=f64::from(u32::MAX)).contains(&fixed) {
        return Err(NvRawError::InvalidExposure(seconds));
    }
    Ok(fixed as u32)
}

/// Decodes a complete legacy file.
pub fn read_legacy(data: &[u8]) -> Result<RawImage> {
    let mut reader = ByteReader::new(data);

    let _magic = reader.read_i32()?;
    let version = reader.read_i32()?;
    let width = reader.read_i32()?;
    let height = reader.read_i32()?;

    let bayer_code = reader.read_u32()?;
    reader.skip(3 * 4)?;

    let exposure_fixed = reader.read_u32()?;
    let iso = reader.read_i32()?;
    let _exposure_comp = reader.read_i32()?;
    let _illuminant = reader.read_i32()?;
    let focus_position = reader.read_i32()?;

    reader.skip(4 * 4)?;
    let sensor_gains = reader.read_f32_array::<4>()?;
    let _sensor_exposure = reader.read_f32()?;
    reader.skip(16)?;
    let integrity = reader.read_u32()?;

    reader.skip(METADATA_BLOB_SIZE)?;
    reader.skip(STATISTICS_BLOB_SIZE)?;

    let awb = reader.read_bytes(AWB_UNION_SIZE)?;
    reader.skip(RESERVED_BLOB_SIZE)?;

    let sentinel = reader.read_u32()?;
    if sentinel != BAYER_DATA_SENTINEL {
        debug!("Integrity word {:#010x}, bayer sentinel {:#010x}", integrity, sentinel);
        return Err(NvRawError::BadSentinel {
            name: "bayer-data",
            expected: BAYER_DATA_SENTINEL,
            found: sentinel,
        });
    }

    let bayer_phase =
        BayerPhase::from_code(bayer_code).ok_or(NvRawError::InvalidBayerPhase(bayer_code))?;
    let width = dimension(width, height)?;
    let height = dimension(height, width as i32)?;

    let (awb_converge_status, awb_gains) = if version >= AWB_MIN_VERSION {
        let mut union = ByteReader::new(awb);
        union.skip(12)?;
        (union.read_i32()?, union.read_f32_array::<4>()?)
    } else {
        (0, [0.0; 4])
    };

    let pixel_count = width
        .checked_mul(height)
        .ok_or(NvRawError::InvalidDimensions(width, height))?;
    let pixel_data = reader.read_i16_samples(pixel_count).map_err(|_| {
        NvRawError::PixelCountMismatch {
            expected: pixel_count,
            found: reader.remaining() / 2,
        }
    })?;

    debug!(
        "Legacy v{} image {}x{} {}, {} trailing bytes",
        version,
        width,
        height,
        bayer_phase,
        reader.remaining()
    );

    Ok(RawImage {
        width,
        height,
        bayer_phase,
        bits_per_sample: LEGACY_BITS_PER_SAMPLE,
        pixel_format: PixelFormat::Int16,
        pixel_data,
        exposure_time: (f64::from(exposure_fixed) / FIXED_16_16_ONE) as f32,
        iso,
        sensor_gains,
        awb_gains,
        awb_converge_status,
        focus_position,
        source_format: Some(RawFormat::Legacy),
        legacy_version: Some(version),
        ..Default::default()
    })
}

/// Serializes a legacy header for `image`.
///
/// Version 1 is written when every AWB gain is zero, version 2 otherwise.
/// Sensor gains and exposure compensation are written as zero.
pub fn make_legacy_header(image: &RawImage) -> Result<Vec<u8>> {
    let width = i32::try_from(image.width)
        .map_err(|_| NvRawError::InvalidDimensions(image.width, image.height))?;
    let height = i32::try_from(image.height)
        .map_err(|_| NvRawError::InvalidDimensions(image.width, image.height))?;
    let version = if image.awb_gains.iter().all(|&gain| gain == 0.0) {
        1
    } else {
        AWB_MIN_VERSION
    };
    let exposure_fixed = exposure_to_fixed(image.exposure_time)?;

    let mut header = ByteWriter::zeroed(LEGACY_HEADER_SIZE);
    header.put_i32(OFFSET_MAGIC, LEGACY_MAGIC)?;
    header.put_i32(OFFSET_VERSION, version)?;
    header.put_i32(OFFSET_WIDTH, width)?;
    header.put_i32(OFFSET_HEIGHT, height)?;
    header.put_u32(OFFSET_BAYER_PHASE, image.bayer_phase.code())?;
    header.put_u32(OFFSET_EXPOSURE, exposure_fixed)?;
    header.put_i32(OFFSET_ISO, image.iso)?;
    header.put_i32(OFFSET_FOCUS, image.focus_position)?;
    header.put_u32(OFFSET_INTEGRITY, INTEGRITY_SENTINEL)?;

    if version >= AWB_MIN_VERSION {
        header.put_i32(OFFSET_AWB_STATUS, image.awb_converge_status)?;
        header.put_f32_slice(OFFSET_AWB_GAINS, &image.awb_gains)?;
    }

    header.put_u32(BAYER_SENTINEL_OFFSET, BAYER_DATA_SENTINEL)?;

    debug!("Built legacy v{} header, {} bytes", version, header.len());
    Ok(header.into_inner())
}

/// Writes a legacy header followed by the pixel payload.
pub fn write_legacy_file(image: &RawImage, output: &mut dyn Write) -> Result<()> {
    if image.pixel_data.len() != image.pixel_count() {
        return Err(NvRawError::PixelCountMismatch {
            expected: image.pixel_count(),
            found: image.pixel_data.len(),
        });
    }

    let header = make_legacy_header(image)?;
    let mut payload = vec![0u8; image.pixel_data.len() * 2];
    LittleEndian::write_i16_into(&image.pixel_data, &mut payload);

    output.write_all(&header)?;
    output.write_all(&payload)?;
    Ok(())
}
