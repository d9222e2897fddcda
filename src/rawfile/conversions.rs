//! Pipeline conversions module
//!
//! Orchestrates decoding an nvraw capture and writing it out as TIFF.

mod nvraw_to_tiff;
mod timing;


pub use nvraw_to_tiff::NvRawToTiffPipeline;
pub use timing::{PipelineTimings, StepTiming, Timer};
