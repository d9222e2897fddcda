//! nvraw format detection
//!
//! Classifies a stream from its first 8 bytes.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

/// Number of bytes needed to classify a stream.
pub const SIGNATURE_LEN: usize = 8;

/// Start of the chunked header tag, doubling as the file signature.
pub const CHUNKED_SIGNATURE: &[u8; SIGNATURE_LEN] = b"NVRAWFIL";

pub const LEGACY_MAGIC: i32 = 1;
pub const LEGACY_MIN_VERSION: i32 = 1;
pub const LEGACY_MAX_VERSION: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// Fixed-offset header, versions 1 to 4
    Legacy,
    /// Sequence of tagged chunks
    Chunked,
    Unknown,
}

impl fmt::Display for RawFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawFormat::Legacy => write!(f, "legacy"),
            RawFormat::Chunked => write!(f, "chunked"),
            RawFormat::Unknown => write!(f, "unknown"),
        }
    }
}

pub fn detect(header: &[u8]) -> RawFormat {
    if header.len() < SIGNATURE_LEN {
        return RawFormat::Unknown;
    }

    if is_chunked(header) {
        RawFormat::Chunked
    } else if is_legacy(header) {
        RawFormat::Legacy
    } else {
        RawFormat::Unknown
    }
}

fn is_chunked(header: &[u8]) -> bool {
    &header[..SIGNATURE_LEN] == CHUNKED_SIGNATURE
}

fn is_legacy(header: &[u8]) -> bool {
    let magic = LittleEndian::read_i32(&header[0..4]);
    let version = LittleEndian::read_i32(&header[4..8]);
    magic == LEGACY_MAGIC && (LEGACY_MIN_VERSION..=LEGACY_MAX_VERSION).contains(&version)
}
