//! Center-region channel statistics.
//!
//! Averages are taken over whole 2x2 Bayer quads inside a centered window
//! of at most 640x480 whose origin and size are even, so every quad starts
//! on the image's own Bayer phase.

use crate::rawfile::raw::types::RawImage;

pub const CENTER_REGION_WIDTH: usize = 640;
pub const CENTER_REGION_HEIGHT: usize = 480;

/// Fraction of the image height where the bottom level row sits.
const BOTTOM_ROW_FRACTION: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn centered(image_width: usize, image_height: usize) -> Self {
        let width = image_width.min(CENTER_REGION_WIDTH) & !1;
        let height = image_height.min(CENTER_REGION_HEIGHT) & !1;
        Self {
            left: ((image_width - width) / 2) & !1,
            top: ((image_height - height) / 2) & !1,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAverages {
    /// R, G and B, with G the mean of both greens
    pub color: [f64; 3],
    /// R, Gr, Gb and B
    pub phase: [f64; 4],
    /// Number of quads averaged
    pub quads: usize,
}

/// Averages split by the HDR readout table. A side is `None` when no quad
/// of the region belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HdrChannelAverages {
    pub long: Option<ChannelAverages>,
    pub short: Option<ChannelAverages>,
}

/// Mean sample of single rows across the center region's columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLevels {
    pub top: f64,
    pub middle: f64,
    pub bottom: f64,
}

#[derive(Default)]
struct Accumulator {
    color: [f64; 3],
    phase: [f64; 4],
    quads: usize,
}

impl Accumulator {
    fn add(&mut self, quad: [i32; 4], indices: [usize; 4]) {
        let channels = indices.map(|i| f64::from(quad[i]));
        let [r, gr, gb, b] = channels;

        self.color[0] += r;
        self.color[1] += (gr + gb) / 2.0;
        self.color[2] += b;
        for (sum, value) in self.phase.iter_mut().zip(channels) {
            *sum += value;
        }
        self.quads += 1;
    }

    fn finish(self) -> Option<ChannelAverages> {
        if self.quads == 0 {
            return None;
        }
        let n = self.quads as f64;
        Some(ChannelAverages {
            color: self.color.map(|sum| sum / n),
            phase: self.phase.map(|sum| sum / n),
            quads: self.quads,
        })
    }
}

impl RawImage {
    pub fn center_region(&self) -> Region {
        Region::centered(self.width, self.height)
    }

    /// Quads of the center region as `(x, y, [top-left, top-right,
    /// bottom-left, bottom-right])`, with `(x, y)` in image coordinates.
    fn center_quads(&self) -> impl Iterator<Item = (usize, usize, [i32; 4])> + '_ {
        let region = self.center_region();
        (region.top..region.top + region.height)
            .step_by(2)
            .flat_map(move |y| {
                (region.left..region.left + region.width)
                    .step_by(2)
                    .map(move |x| (x, y))
            })
            .filter_map(move |(x, y)| {
                let quad = [
                    self.pixel_value(x, y)?,
                    self.pixel_value(x + 1, y)?,
                    self.pixel_value(x, y + 1)?,
                    self.pixel_value(x + 1, y + 1)?,
                ];
                Some((x, y, quad))
            })
    }

    /// Per-channel means over the center region, `None` when it holds no
    /// complete quad.
    pub fn channel_averages(&self) -> Option<ChannelAverages> {
        let indices = self.bayer_phase.channel_indices();
        let mut acc = Accumulator::default();
        for (_, _, quad) in self.center_quads() {
            acc.add(quad, indices);
        }
        acc.finish()
    }

    /// Per-channel means over the center region, split into long and short
    /// exposure quads. Images without a usable readout scheme use LLSS.
    pub fn hdr_channel_averages(&self) -> HdrChannelAverages {
        let table = self.hdr_readout_table();
        let indices = self.bayer_phase.channel_indices();
        let mut long = Accumulator::default();
        let mut short = Accumulator::default();

        for (x, y, quad) in self.center_quads() {
            if table.is_short(x, y) {
                short.add(quad, indices);
            } else {
                long.add(quad, indices);
            }
        }

        HdrChannelAverages {
            long: long.finish(),
            short: short.finish(),
        }
    }

    /// Levels of the first row, the middle row and the row at 90% of the
    /// height, across the center region's columns.
    pub fn row_levels(&self) -> Option<RowLevels> {
        let region = self.center_region();
        if region.width == 0 || self.height == 0 {
            return None;
        }

        let row_mean = |y: usize| -> Option<f64> {
            let mut sum = 0.0;
            for x in region.left..region.left + region.width {
                sum += f64::from(self.pixel_value(x, y)?);
            }
            Some(sum / region.width as f64)
        };

        let bottom = ((self.height as f64 * BOTTOM_ROW_FRACTION) as usize).min(self.height - 1);
        Some(RowLevels {
            top: row_mean(0)?,
            middle: row_mean(self.height / 2)?,
            bottom: row_mean(bottom)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawfile::raw::bayer_phase::BayerPhase;
    use crate::rawfile::raw::types::{HdrInfo, PixelFormat};

    /// Every quad holds `[tl, tr, bl, br]`.
    fn tiled(width: usize, height: usize, phase: BayerPhase, quad: [i16; 4]) -> RawImage {
        let mut image = RawImage::new(width, height, phase, 10);
        for y in 0..height {
            for x in 0..width {
                image.pixel_data[y * width + x] = quad[(y % 2) * 2 + x % 2];
            }
        }
        image
    }

    #[test]
    fn test_center_region_is_even_and_capped() {
        assert_eq!(
            Region::centered(1920, 1080),
            Region { left: 640, top: 300, width: 640, height: 480 }
        );
        assert_eq!(
            Region::centered(5, 3),
            Region { left: 0, top: 0, width: 4, height: 2 }
        );
        assert_eq!(
            Region::centered(646, 484),
            Region { left: 2, top: 2, width: 640, height: 480 }
        );
        assert_eq!(Region::centered(1, 7).width, 0);
    }

    #[test]
    fn test_averages_follow_bayer_phase() {
        let rggb = tiled(4, 4, BayerPhase::Rggb, [100, 200, 300, 400]);
        let averages = rggb.channel_averages().unwrap();
        assert_eq!(averages.color, [100.0, 250.0, 400.0]);
        assert_eq!(averages.phase, [100.0, 200.0, 300.0, 400.0]);
        assert_eq!(averages.quads, 4);

        let gbrg = tiled(4, 4, BayerPhase::Gbrg, [100, 200, 300, 400]);
        let averages = gbrg.channel_averages().unwrap();
        assert_eq!(averages.phase, [300.0, 400.0, 100.0, 200.0]);
        assert_eq!(averages.color, [300.0, 250.0, 200.0]);
    }

    #[test]
    fn test_averages_use_decoded_samples() {
        let mut image = tiled(2, 2, BayerPhase::Rggb, [0x1000, 0x1000, 0x1000, 0x1000]);
        image.pixel_format = PixelFormat::S1Dot14;
        assert_eq!(image.channel_averages().unwrap().color, [256.0; 3]);
    }

    #[test]
    fn test_too_small_for_a_quad() {
        let image = RawImage::new(1, 5, BayerPhase::Rggb, 10);
        assert_eq!(image.channel_averages(), None);
        assert_eq!(image.hdr_channel_averages(), HdrChannelAverages::default());
        assert_eq!(image.row_levels(), None);
    }

    fn banded(scheme: Option<&str>) -> RawImage {
        // quad rows alternate 10 and 50
        let mut image = RawImage::new(8, 8, BayerPhase::Rggb, 10);
        for y in 0..8 {
            for x in 0..8 {
                image.pixel_data[y * 8 + x] = if (y / 2) % 2 == 0 { 10 } else { 50 };
            }
        }
        image.hdr = scheme.map(|scheme| HdrInfo {
            number_of_exposures: 2,
            readout_scheme: scheme.to_string(),
            exposures: Vec::new(),
        });
        image
    }

    #[test]
    fn test_hdr_split_default_scheme() {
        let split = banded(None).hdr_channel_averages();

        let long = split.long.unwrap();
        let short = split.short.unwrap();
        assert_eq!(long.color, [10.0; 3]);
        assert_eq!(short.color, [50.0; 3]);
        assert_eq!((long.quads, short.quads), (8, 8));
    }

    #[test]
    fn test_hdr_split_follows_scheme() {
        let split = banded(Some("ssll")).hdr_channel_averages();
        assert_eq!(split.long.unwrap().phase, [50.0; 4]);
        assert_eq!(split.short.unwrap().phase, [10.0; 4]);

        let split = banded(Some("LLLL")).hdr_channel_averages();
        assert_eq!(split.long.unwrap().color, [30.0; 3]);
        assert_eq!(split.short, None);
    }

    #[test]
    fn test_row_levels() {
        let mut image = RawImage::new(4, 10, BayerPhase::Rggb, 10);
        for y in 0..10 {
            for x in 0..4 {
                image.pixel_data[y * 4 + x] = (y * 10 + x) as i16;
            }
        }

        let levels = image.row_levels().unwrap();
        assert_eq!(levels.top, 1.5);
        assert_eq!(levels.middle, 51.5);
        assert_eq!(levels.bottom, 91.5);
    }
}
