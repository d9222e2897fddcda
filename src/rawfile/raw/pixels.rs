//! Format-aware pixel access and centered cropping

use tracing::debug;

use crate::rawfile::common::error::{NvRawError, Result};
use crate::rawfile::raw::types::{PixelFormat, RawImage};

/// Number of fractional bits in an s1.14 sample.
const S1_14_FRACTION_BITS: u32 = 14;

impl RawImage {
    /// Right shift that turns a stored sample into a `bits_per_sample` value.
    pub fn sample_shift(&self) -> u32 {
        match self.pixel_format {
            PixelFormat::Int16 => 0,
            PixelFormat::S1Dot14 => S1_14_FRACTION_BITS.saturating_sub(self.bits_per_sample),
        }
    }

    pub fn decode_sample(&self, raw: i16) -> i32 {
        i32::from(raw) >> self.sample_shift()
    }

    /// Sample value at `(x, y)`, or `None` outside the image.
    pub fn pixel_value(&self, x: usize, y: usize) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixel_data
            .get(y * self.width + x)
            .map(|&raw| self.decode_sample(raw))
    }

    /// Largest sample value in the image (0 when empty).
    pub fn max_pixel_value(&self) -> i32 {
        self.pixel_data
            .iter()
            .max()
            .map_or(0, |&raw| self.decode_sample(raw))
    }

    /// Smallest sample value in the image (0 when empty).
    pub fn min_pixel_value(&self) -> i32 {
        self.pixel_data
            .iter()
            .min()
            .map_or(0, |&raw| self.decode_sample(raw))
    }

    /// Fails when any sample is negative or reaches `2^bits_per_sample`.
    pub fn check_sample_range(&self) -> Result<()> {
        let min = self.min_pixel_value();
        if min < 0 {
            return Err(NvRawError::SampleOutOfRange {
                value: min,
                bits_per_sample: self.bits_per_sample,
            });
        }

        let max = self.max_pixel_value();
        let limit = 1i64 << self.bits_per_sample.min(32);
        if i64::from(max) >= limit {
            return Err(NvRawError::SampleOutOfRange {
                value: max,
                bits_per_sample: self.bits_per_sample,
            });
        }
        Ok(())
    }

    /// Keeps the centered `width` x `height` window and updates the Bayer
    /// phase for the new origin.
    pub fn crop_centered(&mut self, width: usize, height: usize) -> Result<()> {
        if width > self.width || height > self.height {
            return Err(NvRawError::InvalidCrop {
                crop_width: width,
                crop_height: height,
                width: self.width,
                height: self.height,
            });
        }
        if self.pixel_data.len() != self.pixel_count() {
            return Err(NvRawError::PixelCountMismatch {
                expected: self.pixel_count(),
                found: self.pixel_data.len(),
            });
        }

        let x0 = self.width / 2 - width / 2;
        let y0 = self.height / 2 - height / 2;
        debug!("Cropping {}x{} -> {}x{} at ({}, {})", self.width, self.height, width, height, x0, y0);

        let mut cropped = Vec::with_capacity(width * height);
        for row in self.pixel_data.chunks_exact(self.width.max(1)).skip(y0).take(height) {
            cropped.extend_from_slice(&row[x0..x0 + width]);
        }

        self.pixel_data = cropped;
        self.width = width;
        self.height = height;
        self.bayer_phase = self.bayer_phase.shifted(y0 & 1 == 1, x0 & 1 == 1);
        Ok(())
    }
}
