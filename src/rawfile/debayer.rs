//! Debayering module for converting Bayer mosaic images to RGB

pub mod cpu_debayer;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use types::RgbImageData;
