use crate::rawfile::common::error::Result;
use crate::rawfile::raw::types::RawImage;

pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage>;
}
