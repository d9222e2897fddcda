//! nvraw container formats
//!
//! Format detection plus the legacy and chunked codecs.

pub mod chunked;
pub mod chunks;
pub mod detect;
pub mod legacy;

pub use chunked::{ChunkKind, RawChunk, enumerate_chunks, read_chunked};
pub use chunks::Chunk;
pub use detect::{RawFormat, detect};
pub use legacy::{make_legacy_header, read_legacy, write_legacy_file};
