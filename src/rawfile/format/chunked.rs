//! Chunked nvraw codec.
//!
//! A chunked file is a flat sequence of records:
//! `{16-byte tag}{16-byte checksum}{u32 length}{length bytes}`.
//! The first record is the header chunk, whose tag starts with the file
//! signature. Checksums are carried but never validated.

use tracing::{debug, warn};

use crate::rawfile::common::binary::ByteReader;
use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::format::chunks::Chunk;
use crate::rawfile::format::detect::RawFormat;
use crate::rawfile::raw::types::RawImage;

pub const CHUNK_TAG_LEN: usize = 16;
pub const CHUNK_CHECKSUM_LEN: usize = 16;
/// Tag, checksum and length word.
pub const CHUNK_HEADER_LEN: usize = CHUNK_TAG_LEN + CHUNK_CHECKSUM_LEN + 4;

pub const HEADER_TAG: &[u8; CHUNK_TAG_LEN] = b"NVRAWFILEHEADER\0";
pub const PIXEL_DATA_TAG: &[u8; CHUNK_TAG_LEN] = b"PIXELDATACHUNK\0\0";
pub const CAPTURE_TAG: &[u8; CHUNK_TAG_LEN] = b"CAPTUREPARAMCHNK";
pub const CAMERA_STATE_TAG: &[u8; CHUNK_TAG_LEN] = b"CAMERASTATECHUNK";
pub const SENSOR_INFO_TAG: &[u8; CHUNK_TAG_LEN] = b"SENSORINFOCHUNK\0";
pub const HDR_TAG: &[u8; CHUNK_TAG_LEN] = b"HDRINFOCHUNK\0\0\0\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Header,
    PixelData,
    Capture,
    CameraState,
    SensorInfo,
    Hdr,
    Unrecognized,
}

impl ChunkKind {
    pub const RECOGNIZED: [ChunkKind; 6] = [
        ChunkKind::Header,
        ChunkKind::PixelData,
        ChunkKind::Capture,
        ChunkKind::CameraState,
        ChunkKind::SensorInfo,
        ChunkKind::Hdr,
    ];

    pub fn tag(&self) -> Option<&'static [u8; CHUNK_TAG_LEN]> {
        match self {
            ChunkKind::Header => Some(HEADER_TAG),
            ChunkKind::PixelData => Some(PIXEL_DATA_TAG),
            ChunkKind::Capture => Some(CAPTURE_TAG),
            ChunkKind::CameraState => Some(CAMERA_STATE_TAG),
            ChunkKind::SensorInfo => Some(SENSOR_INFO_TAG),
            ChunkKind::Hdr => Some(HDR_TAG),
            ChunkKind::Unrecognized => None,
        }
    }

    pub fn from_tag(tag: &[u8; CHUNK_TAG_LEN]) -> Self {
        Self::RECOGNIZED
            .into_iter()
            .find(|kind| kind.tag() == Some(tag))
            .unwrap_or(ChunkKind::Unrecognized)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChunkKind::Header => "header",
            ChunkKind::PixelData => "pixel-data",
            ChunkKind::Capture => "capture",
            ChunkKind::CameraState => "camera-state",
            ChunkKind::SensorInfo => "sensor-info",
            ChunkKind::Hdr => "hdr",
            ChunkKind::Unrecognized => "unrecognized",
        }
    }
}

/// A framed chunk borrowing its payload from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk<'a> {
    pub tag: [u8; CHUNK_TAG_LEN],
    pub checksum: [u8; CHUNK_CHECKSUM_LEN],
    pub payload: &'a [u8],
}

impl RawChunk<'_> {
    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_tag(&self.tag)
    }
}

fn next_chunk<'a>(reader: &mut ByteReader<'a>) -> std::io::Result<RawChunk<'a>> {
    let tag = reader.read_array::<CHUNK_TAG_LEN>()?;
    let checksum = reader.read_array::<CHUNK_CHECKSUM_LEN>()?;
    let length = reader.read_u32()? as usize;
    let payload = reader.read_bytes(length)?;
    Ok(RawChunk {
        tag,
        checksum,
        payload,
    })
}

/// Splits `data` into chunks.
///
/// Enumeration stops quietly at the first incomplete chunk: fewer than
/// [`CHUNK_HEADER_LEN`] bytes left, or a length running past the end.
pub fn enumerate_chunks(data: &[u8]) -> Vec<RawChunk<'_>> {
    let mut reader = ByteReader::new(data);
    let mut chunks = Vec::new();

    while reader.remaining() >= CHUNK_HEADER_LEN {
        let offset = reader.position();
        match next_chunk(&mut reader) {
            Ok(chunk) => {
                debug!(
                    "Chunk '{}' at {}, {} bytes",
                    String::from_utf8_lossy(&chunk.tag).trim_end_matches('\0'),
                    offset,
                    chunk.payload.len()
                );
                chunks.push(chunk);
            }
            Err(e) => {
                warn!("Truncated chunk at offset {}: {}; ignoring the rest of the file", offset, e);
                return chunks;
            }
        }
    }

    if reader.remaining() > 0 {
        warn!("Ignoring {} trailing bytes after the last chunk", reader.remaining());
    }
    chunks
}

/// Decodes a complete chunked file.
pub fn read_chunked(data: &[u8]) -> Result<RawImage> {
    let mut image = RawImage {
        source_format: Some(RawFormat::Chunked),
        ..Default::default()
    };
    let mut has_header = false;

    for raw in enumerate_chunks(data) {
        let chunk = Chunk::decode(&raw)?;
        has_header |= matches!(chunk, Chunk::Header(_));
        chunk.apply(&mut image)?;
    }

    if !has_header {
        return Err(NvRawError::MissingChunk(ChunkKind::Header.name()));
    }
    if image.pixel_data.len() != image.pixel_count() {
        return Err(NvRawError::PixelCountMismatch {
            expected: image.pixel_count(),
            found: image.pixel_data.len(),
        });
    }

    image.resolve_hdr();
    Ok(image)
}
