//! Common utilities module
//!
//! This module contains the error type and the little-endian binary
//! reader/writer shared by both nvraw codecs.

pub mod binary;
pub mod error;

pub use binary::{ByteReader, ByteWriter};
pub use error::{NvRawError, Result};
