//! nvraw image reader.
//!
//! Classifies the input by its signature and hands it to the legacy or
//! chunked codec. The image is only returned once every structural check
//! has passed, so callers never see a partially decoded file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument};

use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::format::detect::{RawFormat, SIGNATURE_LEN, detect};
use crate::rawfile::format::{read_chunked, read_legacy};
use crate::rawfile::raw::reader::RawImageReader;
use crate::rawfile::raw::types::RawImage;

/// Reader for both the legacy and the chunked nvraw layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NvRawReader;

impl RawImageReader for NvRawReader {
    /// Decodes an nvraw file held in memory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nvraw::rawfile::{NvRawReader, RawImageReader};
    ///
    /// let bytes = std::fs::read("capture.nvraw").unwrap();
    /// let image = NvRawReader.read_raw(&bytes).unwrap();
    /// println!("{}x{} {}", image.width, image.height, image.bayer_phase);
    /// ```
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        let format = detect(data);
        debug!("Decoding {} nvraw image, {} bytes", format, data.len());

        match format {
            RawFormat::Legacy => read_legacy(data),
            RawFormat::Chunked => read_chunked(data),
            RawFormat::Unknown => Err(NvRawError::UnrecognizedFormat(
                data[..data.len().min(SIGNATURE_LEN)].to_vec(),
            )),
        }
    }
}

/// Reads and decodes the nvraw file at `path`.
#[instrument(skip(path))]
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<RawImage> {
    let path = path.as_ref();
    let mut data = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut data))
        .map_err(|e| NvRawError::InputReadError(format!("{}: {}", path.display(), e)))?;

    NvRawReader.read_raw(&data)
}

impl RawImage {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_file(path)
    }
}
