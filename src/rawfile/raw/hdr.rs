//! Derived state for multi-exposure (staggered HDR) captures.

use tracing::{debug, warn};

use crate::rawfile::raw::types::{READOUT_SCHEME_LEN, RawImage};

/// Exposure class of a cell in the 2x2 readout tile.
pub const LONG_EXPOSURE: u8 = 0;
pub const SHORT_EXPOSURE: u8 = 1;

/// "LLSS": top row long, bottom row short.
pub const DEFAULT_READOUT: [[u8; 2]; 2] = [
    [LONG_EXPOSURE, LONG_EXPOSURE],
    [SHORT_EXPOSURE, SHORT_EXPOSURE],
];

/// Long/short assignment of a 2x2 tile, indexed `[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdrReadoutTable(pub [[u8; 2]; 2]);

impl Default for HdrReadoutTable {
    fn default() -> Self {
        Self(DEFAULT_READOUT)
    }
}

impl HdrReadoutTable {
    /// Decodes a 4-character scheme over `L`/`S` (either case).
    ///
    /// Missing schemes, wrong lengths and unknown characters all fall back
    /// to the default `LLSS` table.
    pub fn from_scheme(scheme: Option<&str>) -> Self {
        let Some(scheme) = scheme else {
            debug!("No HDR readout scheme, using LLSS");
            return Self::default();
        };
        if scheme.len() != READOUT_SCHEME_LEN {
            warn!("HDR readout scheme '{}' does not have length 4, using LLSS", scheme);
            return Self::default();
        }

        let mut table = DEFAULT_READOUT;
        for (i, c) in scheme.bytes().enumerate() {
            table[i / 2][i % 2] = match c {
                b'L' | b'l' => LONG_EXPOSURE,
                b'S' | b's' => SHORT_EXPOSURE,
                _ => {
                    warn!(
                        "HDR readout scheme '{}' contains invalid character '{}', using LLSS",
                        scheme, c as char
                    );
                    return Self::default();
                }
            };
        }
        Self(table)
    }

    pub fn for_image(image: &RawImage) -> Self {
        Self::from_scheme(image.hdr.as_ref().map(|hdr| hdr.readout_scheme.as_str()))
    }

    /// Class of the 2x2 Bayer quad containing pixel `(x, y)`.
    pub fn exposure_class(&self, x: usize, y: usize) -> u8 {
        self.0[(y / 2) % 2][(x / 2) % 2]
    }

    pub fn is_short(&self, x: usize, y: usize) -> bool {
        self.exposure_class(x, y) == SHORT_EXPOSURE
    }
}

impl RawImage {
    /// Sources the effective exposure time and sensor gains from the first
    /// HDR exposure record, when there is one. Calling it again is a no-op.
    pub fn resolve_hdr(&mut self) {
        let Some(first) = self
            .hdr
            .as_ref()
            .filter(|hdr| hdr.number_of_exposures > 0)
            .and_then(|hdr| hdr.exposures.first())
        else {
            return;
        };

        self.exposure_time = first.exposure_time;
        self.sensor_gains = first.analog_gains;
        debug!(
            "Effective exposure {}s from HDR exposure '{}'",
            self.exposure_time,
            first.symbol_str()
        );
    }

    pub fn hdr_readout_table(&self) -> HdrReadoutTable {
        HdrReadoutTable::for_image(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rawfile::raw::types::{HdrExposureInfo, HdrInfo};

    fn hdr_image() -> RawImage {
        RawImage {
            exposure_time: 0.5,
            sensor_gains: [1.0; 4],
            hdr: Some(HdrInfo {
                number_of_exposures: 2,
                readout_scheme: "LSSL".to_string(),
                exposures: vec![
                    HdrExposureInfo {
                        symbol: *b"L\0\0\0",
                        exposure_time: 0.03,
                        analog_gains: [2.0, 2.5, 2.5, 3.0],
                        digital_gains: [1.0; 4],
                    },
                    HdrExposureInfo {
                        symbol: *b"S\0\0\0",
                        exposure_time: 0.002,
                        analog_gains: [1.0; 4],
                        digital_gains: [1.0; 4],
                    },
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_scheme_decoding() {
        let table = HdrReadoutTable::from_scheme(Some("LSSL"));
        assert_eq!(table.0, [[0, 1], [1, 0]]);

        let table = HdrReadoutTable::from_scheme(Some("ssll"));
        assert_eq!(table.0, [[1, 1], [0, 0]]);
    }

    #[test]
    fn test_wrong_length_falls_back() {
        assert_eq!(HdrReadoutTable::from_scheme(Some("LS")).0, [[0, 0], [1, 1]]);
        assert_eq!(HdrReadoutTable::from_scheme(Some("LSLSL")).0, [[0, 0], [1, 1]]);
    }

    #[test]
    fn test_invalid_character_falls_back() {
        assert_eq!(HdrReadoutTable::from_scheme(Some("SSXS")).0, DEFAULT_READOUT);
    }

    #[test]
    fn test_missing_scheme_falls_back() {
        assert_eq!(HdrReadoutTable::for_image(&RawImage::default()).0, DEFAULT_READOUT);
    }

    #[test]
    fn test_exposure_class_by_quad() {
        let table = HdrReadoutTable::from_scheme(Some("LSSL"));
        assert_eq!(table.exposure_class(0, 0), LONG_EXPOSURE);
        assert_eq!(table.exposure_class(1, 1), LONG_EXPOSURE);
        assert!(table.is_short(2, 0));
        assert!(table.is_short(3, 1));
        assert!(table.is_short(0, 2));
        assert!(!table.is_short(2, 2));
        assert!(!table.is_short(4, 4));
    }

    #[test]
    fn test_resolve_uses_first_exposure() {
        let mut image = hdr_image();
        image.resolve_hdr();

        assert_eq!(image.exposure_time, 0.03);
        assert_eq!(image.sensor_gains, [2.0, 2.5, 2.5, 3.0]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut image = hdr_image();
        image.resolve_hdr();
        let once = image.clone();
        image.resolve_hdr();
        assert_eq!(image, once);
    }

    #[test]
    fn test_resolve_without_exposures_is_noop() {
        let mut image = hdr_image();
        if let Some(hdr) = image.hdr.as_mut() {
            hdr.number_of_exposures = 0;
            hdr.exposures.clear();
        }
        image.resolve_hdr();
        assert_eq!(image.exposure_time, 0.5);
        assert_eq!(image.sensor_gains, [1.0; 4]);
    }
}
