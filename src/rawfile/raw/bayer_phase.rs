//! Bayer color-filter tiling origin.

use std::fmt;
use std::str::FromStr;

/// The 2x2 CFA tile starting at the image's top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BayerPhase {
    #[default]
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

impl BayerPhase {
    pub const ALL: [BayerPhase; 4] = [
        BayerPhase::Rggb,
        BayerPhase::Grbg,
        BayerPhase::Gbrg,
        BayerPhase::Bggr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BayerPhase::Rggb => "RGGB",
            BayerPhase::Grbg => "GRBG",
            BayerPhase::Gbrg => "GBRG",
            BayerPhase::Bggr => "BGGR",
        }
    }

    pub fn from_token(token: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str().as_bytes() == token)
    }

    /// Decodes the packed form stored in nvraw headers.
    ///
    /// The token is packed most-significant byte first and the word is
    /// stored little-endian, so the bytes on disk read back to front.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_token(&code.to_be_bytes())
    }

    pub fn code(&self) -> u32 {
        let token = self.as_str().as_bytes();
        u32::from_be_bytes([token[0], token[1], token[2], token[3]])
    }

    /// Phase seen from a new origin offset by an odd row and/or column.
    pub fn shifted(self, odd_row: bool, odd_col: bool) -> Self {
        use BayerPhase::*;
        match (odd_row, odd_col) {
            (false, false) => self,
            (false, true) => match self {
                Rggb => Grbg,
                Grbg => Rggb,
                Gbrg => Bggr,
                Bggr => Gbrg,
            },
            (true, false) => match self {
                Rggb => Gbrg,
                Gbrg => Rggb,
                Grbg => Bggr,
                Bggr => Grbg,
            },
            (true, true) => match self {
                Rggb => Bggr,
                Bggr => Rggb,
                Grbg => Gbrg,
                Gbrg => Grbg,
            },
        }
    }

    /// Positions of R, Gr, Gb and B inside the 2x2 tile, in row-major order.
    pub fn channel_indices(&self) -> [usize; 4] {
        match self {
            BayerPhase::Rggb => [0, 1, 2, 3],
            BayerPhase::Grbg => [1, 0, 3, 2],
            BayerPhase::Gbrg => [2, 3, 0, 1],
            BayerPhase::Bggr => [3, 2, 1, 0],
        }
    }
}

impl fmt::Display for BayerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BayerPhase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_token(s.as_bytes()).ok_or_else(|| format!("unknown bayer phase '{}'", s))
    }
}
