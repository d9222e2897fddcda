//! Per-kind chunk payloads.
//!
//! Every chunk except the header starts with its own `i32` version. Fields
//! a given version does not define are `None` rather than zero.

use std::io;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, warn};

use crate::rawfile::common::binary::ByteReader;
use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::format::chunked::{CHUNK_TAG_LEN, ChunkKind, RawChunk};
use crate::rawfile::raw::bayer_phase::BayerPhase;
use crate::rawfile::raw::types::{
    FrameInfo, HdrExposureInfo, HdrInfo, PixelFormat, READOUT_SCHEME_LEN, RawImage,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderChunk {
    pub width: u32,
    pub height: u32,
    pub bayer_code: u32,
    pub bits_per_sample: u32,
    pub frame_info: FrameInfo,
}

impl HeaderChunk {
    fn parse(reader: &mut ByteReader<'_>) -> io::Result<Self> {
        Ok(Self {
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            bayer_code: reader.read_u32()?,
            bits_per_sample: reader.read_u32()?,
            frame_info: FrameInfo {
                samples_per_pixel: reader.read_u32()?,
                image_count: reader.read_u32()?,
                time_seconds: reader.read_u32()?,
                time_microseconds: reader.read_u32()?,
                flags: reader.read_u32()?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelDataChunk {
    pub version: i32,
    /// Frame index, not validated
    pub ordinal: Option<i32>,
    pub samples: Option<Vec<i16>>,
}

impl PixelDataChunk {
    fn parse(version: i32, reader: &mut ByteReader<'_>) -> io::Result<Self> {
        if version != 1 {
            return Ok(Self {
                version,
                ordinal: None,
                samples: None,
            });
        }

        let ordinal = reader.read_i32()?;
        let rest = reader.rest();
        let mut samples = vec![0i16; rest.len() / 2];
        LittleEndian::read_i16_into(&rest[..samples.len() * 2], &mut samples);

        Ok(Self {
            version,
            ordinal: Some(ordinal),
            samples: Some(samples),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureParams {
    pub exposure_time: f32,
    pub exposure_compensation: f32,
    pub iso: i32,
    pub focus_position: i32,
    pub sensor_gains: [f32; 4],
    pub snr: f32,
    pub lux: f32,
    pub flash: i32,
    pub frame_rate: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureChunk {
    pub version: i32,
    /// Version 2 and later
    pub params: Option<CaptureParams>,
    /// Version 3 and later
    pub rolling_shutter: Option<f32>,
    /// Version 4 and later
    pub pixel_format: Option<String>,
}

impl CaptureChunk {
    fn parse(version: i32, reader: &mut ByteReader<'_>) -> io::Result<Self> {
        let mut chunk = Self {
            version,
            params: None,
            rolling_shutter: None,
            pixel_format: None,
        };

        if version >= 2 {
            chunk.params = Some(CaptureParams {
                exposure_time: reader.read_f32()?,
                exposure_compensation: reader.read_f32()?,
                iso: reader.read_i32()?,
                focus_position: reader.read_i32()?,
                sensor_gains: reader.read_f32_array::<4>()?,
                snr: reader.read_f32()?,
                lux: reader.read_f32()?,
                flash: reader.read_i32()?,
                frame_rate: reader.read_f32()?,
            });
        }
        if version >= 3 {
            chunk.rolling_shutter = Some(reader.read_f32()?);
        }
        if version >= 4 {
            let tag = reader.read_len_prefixed()?;
            chunk.pixel_format = Some(String::from_utf8_lossy(tag).into_owned());
        }
        Ok(chunk)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwbState {
    pub converge_status: i32,
    pub gains: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraStateChunk {
    pub version: i32,
    pub awb: Option<AwbState>,
}

impl CameraStateChunk {
    fn parse(version: i32, reader: &mut ByteReader<'_>) -> io::Result<Self> {
        let awb = if version == 1 {
            Some(AwbState {
                converge_status: reader.read_i32()?,
                gains: reader.read_f32_array::<4>()?,
            })
        } else {
            None
        };
        Ok(Self { version, awb })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorIds {
    pub sensor_id: Vec<u8>,
    pub fuse_id: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfoChunk {
    pub version: i32,
    pub ids: Option<SensorIds>,
}

impl SensorInfoChunk {
    fn parse(version: i32, reader: &mut ByteReader<'_>) -> io::Result<Self> {
        // the trailing module id is left unread
        let ids = if version == 1 {
            Some(SensorIds {
                sensor_id: reader.read_len_prefixed()?.to_vec(),
                fuse_id: reader.read_len_prefixed()?.to_vec(),
            })
        } else {
            None
        };
        Ok(Self { version, ids })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HdrChunk {
    pub version: i32,
    pub info: HdrInfo,
}

impl HdrChunk {
    fn parse(version: i32, reader: &mut ByteReader<'_>) -> io::Result<Self> {
        let number_of_exposures = reader.read_u32()?;
        let readout_scheme = String::from_utf8_lossy(reader.read_len_prefixed()?).into_owned();

        let mut exposures = Vec::new();
        for _ in 0..number_of_exposures {
            exposures.push(HdrExposureInfo {
                symbol: reader.read_array::<4>()?,
                exposure_time: reader.read_f32()?,
                analog_gains: reader.read_f32_array::<4>()?,
                digital_gains: reader.read_f32_array::<4>()?,
            });
        }

        let info = HdrInfo {
            number_of_exposures,
            readout_scheme,
            exposures,
        };
        if info.number_of_exposures > 0 && !info.has_valid_readout_scheme() {
            warn!(
                "HDR readout scheme '{}' is not {} characters, LLSS will be used",
                info.readout_scheme, READOUT_SCHEME_LEN
            );
        }

        Ok(Self { version, info })
    }
}

/// A decoded chunk, one variant per known kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Header(HeaderChunk),
    PixelData(PixelDataChunk),
    Capture(CaptureChunk),
    CameraState(CameraStateChunk),
    SensorInfo(SensorInfoChunk),
    Hdr(HdrChunk),
    Unrecognized([u8; CHUNK_TAG_LEN]),
}

fn too_short(kind: ChunkKind, version: i32) -> impl FnOnce(io::Error) -> NvRawError {
    move |e| NvRawError::ChunkTooShort {
        chunk: kind.name(),
        version,
        reason: e.to_string(),
    }
}

impl Chunk {
    pub fn decode(raw: &RawChunk<'_>) -> Result<Self> {
        let kind = raw.kind();
        let mut reader = ByteReader::new(raw.payload);

        let parse: fn(i32, &mut ByteReader<'_>) -> io::Result<Chunk> = match kind {
            ChunkKind::Unrecognized => return Ok(Chunk::Unrecognized(raw.tag)),
            ChunkKind::Header => {
                return HeaderChunk::parse(&mut reader)
                    .map(Chunk::Header)
                    .map_err(too_short(kind, 0));
            }
            ChunkKind::PixelData => |v, r| PixelDataChunk::parse(v, r).map(Chunk::PixelData),
            ChunkKind::Capture => |v, r| CaptureChunk::parse(v, r).map(Chunk::Capture),
            ChunkKind::CameraState => |v, r| CameraStateChunk::parse(v, r).map(Chunk::CameraState),
            ChunkKind::SensorInfo => |v, r| SensorInfoChunk::parse(v, r).map(Chunk::SensorInfo),
            ChunkKind::Hdr => |v, r| HdrChunk::parse(v, r).map(Chunk::Hdr),
        };

        let version = reader.read_i32().map_err(too_short(kind, 0))?;
        parse(version, &mut reader).map_err(too_short(kind, version))
    }

    /// Moves the chunk's fields into `image`.
    pub fn apply(self, image: &mut RawImage) -> Result<()> {
        match self {
            Chunk::Header(header) => {
                image.bayer_phase = BayerPhase::from_code(header.bayer_code)
                    .ok_or(NvRawError::InvalidBayerPhase(header.bayer_code))?;
                image.width = header.width as usize;
                image.height = header.height as usize;
                image.bits_per_sample = header.bits_per_sample;
                image.frame_info = Some(header.frame_info);
            }
            Chunk::PixelData(pixels) => match pixels.samples {
                Some(samples) => image.pixel_data = samples,
                None => debug!("Skipping pixel data version {}", pixels.version),
            },
            Chunk::Capture(capture) => {
                if let Some(params) = capture.params {
                    image.exposure_time = params.exposure_time;
                    image.iso = params.iso;
                    image.focus_position = params.focus_position;
                    image.sensor_gains = params.sensor_gains;
                }
                if let Some(tag) = capture.pixel_format {
                    match PixelFormat::from_tag(&tag) {
                        Some(format) => image.pixel_format = format,
                        None => warn!("Unknown pixel format '{}', keeping {}", tag, image.pixel_format),
                    }
                }
            }
            Chunk::CameraState(state) => {
                if let Some(awb) = state.awb {
                    image.awb_converge_status = awb.converge_status;
                    image.awb_gains = awb.gains;
                }
            }
            Chunk::SensorInfo(info) => {
                if let Some(ids) = info.ids {
                    image.sensor_id = ids.sensor_id;
                    image.fuse_id = ids.fuse_id;
                }
            }
            Chunk::Hdr(hdr) => image.hdr = Some(hdr.info),
            Chunk::Unrecognized(tag) => {
                debug!("Skipping unrecognized chunk '{}'", String::from_utf8_lossy(&tag));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawfile::format::chunked::test_support::*;
    use crate::rawfile::raw::hdr::HdrReadoutTable;
    use crate::rawfile::format::chunked::{
        CAMERA_STATE_TAG, CAPTURE_TAG, HDR_TAG, PIXEL_DATA_TAG, SENSOR_INFO_TAG, enumerate_chunks,
        read_chunked,
    };

    fn decode_one(bytes: &[u8]) -> Result<Chunk> {
        let chunks = enumerate_chunks(bytes);
        assert_eq!(chunks.len(), 1);
        Chunk::decode(&chunks[0])
    }

    fn capture_payload(version: u32) -> Vec<u8> {
        let mut payload = words(&[version]);
        payload.extend(floats(&[0.01, 0.5]));
        payload.extend(words(&[200, 450]));
        payload.extend(floats(&[1.0, 1.25, 1.5, 2.0, 38.0, 120.0]));
        payload.extend(words(&[0]));
        payload.extend(floats(&[30.0]));
        payload
    }

    fn hdr_payload(scheme: &[u8]) -> Vec<u8> {
        let mut payload = words(&[1, 2]);
        payload.extend(string(scheme));
        payload.extend_from_slice(b"L\0\0\0");
        payload.extend(floats(&[0.02, 4.0, 4.0, 4.0, 4.0, 1.0, 1.0, 1.0, 1.0]));
        payload.extend_from_slice(b"S\0\0\0");
        payload.extend(floats(&[0.001, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]));
        payload
    }

    #[test]
    fn test_capture_version_2() {
        let chunk = decode_one(&chunk(CAPTURE_TAG, &capture_payload(2))).unwrap();
        let Chunk::Capture(capture) = chunk else {
            panic!("expected capture chunk");
        };

        let params = capture.params.unwrap();
        assert_eq!(params.exposure_time, 0.01);
        assert_eq!(params.iso, 200);
        assert_eq!(params.focus_position, 450);
        assert_eq!(params.sensor_gains, [1.0, 1.25, 1.5, 2.0]);
        assert_eq!(params.frame_rate, 30.0);
        assert_eq!(capture.rolling_shutter, None);
        assert_eq!(capture.pixel_format, None);
    }

    #[test]
    fn test_capture_version_4_reads_pixel_format() {
        let mut payload = capture_payload(4);
        payload.extend(floats(&[0.033]));
        payload.extend(string(b"s1.14"));

        let mut image = RawImage::default();
        decode_one(&chunk(CAPTURE_TAG, &payload))
            .unwrap()
            .apply(&mut image)
            .unwrap();

        assert_eq!(image.pixel_format, PixelFormat::S1Dot14);
        assert_eq!(image.iso, 200);
        assert_eq!(image.sensor_gains, [1.0, 1.25, 1.5, 2.0]);
    }

    #[test]
    fn test_capture_version_1_leaves_defaults() {
        let mut image = RawImage::default();
        decode_one(&chunk(CAPTURE_TAG, &words(&[1])))
            .unwrap()
            .apply(&mut image)
            .unwrap();
        assert_eq!(image, RawImage::default());
    }

    #[test]
    fn test_unknown_pixel_format_keeps_default() {
        let mut payload = capture_payload(4);
        payload.extend(floats(&[0.0]));
        payload.extend(string(b"float32"));

        let mut image = RawImage::default();
        decode_one(&chunk(CAPTURE_TAG, &payload))
            .unwrap()
            .apply(&mut image)
            .unwrap();
        assert_eq!(image.pixel_format, PixelFormat::Int16);
    }

    #[test]
    fn test_short_capture_is_an_error() {
        let mut payload = capture_payload(3);
        payload.truncate(payload.len() - 4);
        payload.extend_from_slice(&[0, 0]);

        assert!(matches!(
            decode_one(&chunk(CAPTURE_TAG, &payload)),
            Err(NvRawError::ChunkTooShort { chunk: "capture", version: 3, .. })
        ));
    }

    #[test]
    fn test_camera_state() {
        let mut payload = words(&[1, 2]);
        payload.extend(floats(&[1.9, 1.0, 1.0, 1.6]));

        let mut image = RawImage::default();
        decode_one(&chunk(CAMERA_STATE_TAG, &payload))
            .unwrap()
            .apply(&mut image)
            .unwrap();
        assert_eq!(image.awb_converge_status, 2);
        assert_eq!(image.awb_gains, [1.9, 1.0, 1.0, 1.6]);
    }

    #[test]
    fn test_camera_state_unknown_version() {
        let chunk = decode_one(&chunk(CAMERA_STATE_TAG, &words(&[2, 1]))).unwrap();
        assert_eq!(chunk, Chunk::CameraState(CameraStateChunk { version: 2, awb: None }));
    }

    #[test]
    fn test_sensor_info_ignores_module_id() {
        let mut payload = words(&[1]);
        payload.extend(string(&[0xde, 0xad]));
        payload.extend(string(&[0x01, 0x02, 0x03]));
        payload.extend(string(b"module-7"));

        let mut image = RawImage::default();
        decode_one(&chunk(SENSOR_INFO_TAG, &payload))
            .unwrap()
            .apply(&mut image)
            .unwrap();
        assert_eq!(image.sensor_id_hex(), "dead");
        assert_eq!(image.fuse_id_hex(), "010203");
    }

    #[test]
    fn test_hdr_exposures() {
        let chunk = decode_one(&chunk(HDR_TAG, &hdr_payload(b"LLSS"))).unwrap();
        let Chunk::Hdr(hdr) = chunk else {
            panic!("expected hdr chunk");
        };

        assert_eq!(hdr.info.number_of_exposures, 2);
        assert_eq!(hdr.info.readout_scheme, "LLSS");
        assert_eq!(hdr.info.exposures.len(), 2);
        assert_eq!(hdr.info.exposures[0].symbol_str(), "L");
        assert_eq!(hdr.info.exposures[0].analog_gains, [4.0; 4]);
        assert_eq!(hdr.info.exposures[1].exposure_time, 0.001);
        assert_eq!(hdr.info.exposures[1].digital_gains, [2.0; 4]);
    }

    #[test]
    fn test_hdr_short_scheme_is_kept_and_falls_back() {
        let mut payload = words(&[1, 1]);
        payload.extend(string(b"LS"));
        payload.extend_from_slice(b"L\0\0\0");
        payload.extend(floats(&[0.02, 4.0, 4.0, 4.0, 4.0, 1.0, 1.0, 1.0, 1.0]));

        let Chunk::Hdr(hdr) = decode_one(&chunk(HDR_TAG, &payload)).unwrap() else {
            panic!("expected hdr chunk");
        };
        assert_eq!(hdr.info.readout_scheme, "LS");
        assert!(!hdr.info.has_valid_readout_scheme());

        let mut image = RawImage::default();
        Chunk::Hdr(hdr).apply(&mut image).unwrap();
        assert_eq!(image.hdr_readout_table(), HdrReadoutTable::default());
    }

    #[test]
    fn test_hdr_with_missing_exposure_is_an_error() {
        let mut payload = hdr_payload(b"LLSS");
        payload.truncate(payload.len() - 40);
        assert!(matches!(
            decode_one(&chunk(HDR_TAG, &payload)),
            Err(NvRawError::ChunkTooShort { chunk: "hdr", .. })
        ));
    }

    #[test]
    fn test_pixel_data_unknown_version() {
        let mut payload = words(&[2, 0]);
        payload.extend_from_slice(&[1, 0, 2, 0]);
        let chunk = decode_one(&chunk(PIXEL_DATA_TAG, &payload)).unwrap();
        assert!(matches!(chunk, Chunk::PixelData(PixelDataChunk { samples: None, .. })));
    }

    #[test]
    fn test_invalid_header_phase_is_an_error() {
        let mut image = RawImage::default();
        let result = decode_one(&header_chunk(2, 2, 0x1234_5678, 10))
            .unwrap()
            .apply(&mut image);
        assert!(matches!(result, Err(NvRawError::InvalidBayerPhase(0x1234_5678))));
    }

    #[test]
    fn test_full_hdr_file_resolves_effective_fields() {
        let mut file = header_chunk(2, 2, BayerPhase::Rggb.code(), 10);
        file.extend(chunk(CAPTURE_TAG, &capture_payload(2)));
        file.extend(chunk(HDR_TAG, &hdr_payload(b"LSLS")));
        file.extend(pixel_chunk(&[1, 2, 3, 4]));

        let image = read_chunked(&file).unwrap();
        assert_eq!(image.exposure_time, 0.02);
        assert_eq!(image.sensor_gains, [4.0; 4]);
        assert_eq!(image.iso, 200);
        assert_eq!(image.hdr_exposure_count(), 2);
        assert_eq!(image.hdr_readout_table().0, [[0, 1], [0, 1]]);
    }
}
