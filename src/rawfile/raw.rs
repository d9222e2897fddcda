//! nvraw image model and reading
//!
//! This module holds the decoded image type, its pixel accessors, the
//! derived HDR state and center-region statistics, plus the reader that
//! dispatches to the codecs.

pub mod bayer_phase;
pub mod hdr;
mod nvraw_reader;
mod pixels;
mod reader;
pub mod stats;
pub mod types;

pub use bayer_phase::BayerPhase;
pub use hdr::HdrReadoutTable;
pub use nvraw_reader::{NvRawReader, read_file};
pub use reader::RawImageReader;
pub use stats::{ChannelAverages, HdrChannelAverages, Region, RowLevels};
pub use types::{FrameInfo, HdrExposureInfo, HdrInfo, PixelFormat, RawImage};
