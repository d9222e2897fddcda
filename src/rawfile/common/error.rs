use thiserror::Error;

#[derive(Error, Debug)]
pub enum NvRawError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Unrecognized nvraw signature: {0:02x?}")]
    UnrecognizedFormat(Vec<u8>),

    #[error("Bad {name} sentinel: expected {expected:#010x}, found {found:#010x}")]
    BadSentinel {
        name: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Unrecognized bayer phase code: {0:#010x}")]
    InvalidBayerPhase(u32),

    #[error("Missing required {0} chunk")]
    MissingChunk(&'static str),

    #[error("Truncated {chunk} chunk (version {version}): {reason}")]
    ChunkTooShort {
        chunk: &'static str,
        version: i32,
        reason: String,
    },

    #[error("Pixel count mismatch: expected {expected}, found {found}")]
    PixelCountMismatch { expected: usize, found: usize },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid crop {crop_width}x{crop_height} for {width}x{height} image")]
    InvalidCrop {
        crop_width: usize,
        crop_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Pixel value {value} is out of range for {bits_per_sample}-bit samples")]
    SampleOutOfRange { value: i32, bits_per_sample: u32 },

    #[error("Exposure time {0}s does not fit 16.16 fixed point")]
    InvalidExposure(f32),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Debayer failed: {0}")]
    DebayerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NvRawError>;
