//! nvraw image file support
//!
//! Reading and writing of NVIDIA camera-stack raw captures in both the
//! legacy fixed-header layout and the chunked container, plus conversion of
//! the decoded Bayer data to TIFF.

pub mod common;
pub mod conversions;
pub mod debayer;
pub mod format;
pub mod raw;
pub mod tiff;

pub use common::{NvRawError, Result};

pub use raw::{
    BayerPhase,
    ChannelAverages,
    FrameInfo,
    HdrChannelAverages,
    HdrExposureInfo,
    HdrInfo,
    HdrReadoutTable,
    NvRawReader,
    PixelFormat,
    RawImage,
    RawImageReader,
    Region,
    RowLevels,
    read_file,
};

pub use format::{
    RawFormat,
    detect,
    make_legacy_header,
    write_legacy_file,
};

pub use tiff::{
    ConversionConfig,
    ConversionConfigBuilder,
    StandardTiffWriter,
    TiffCompression,
    TiffWriter,
};

pub use debayer::{CpuDebayer, RgbImageData};

pub use conversions::{NvRawToTiffPipeline, PipelineTimings};
