//! Little-endian binary reader and writer.
//!
//! `ByteReader` walks a borrowed byte slice and never reads past its end:
//! every short read surfaces as `io::ErrorKind::UnexpectedEof`.
//! `ByteWriter` owns a zero-filled buffer and packs values at fixed offsets
//! with bounds-checked writes.

use std::io::{self, Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

fn short_read(wanted: usize, available: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("wanted {} bytes, only {} available", wanted, available),
    )
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        self.cursor.read_i32::<LittleEndian>()
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        self.cursor.read_u32::<LittleEndian>()
    }

    pub fn read_f32(&mut self) -> io::Result<f32> {
        self.cursor.read_f32::<LittleEndian>()
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> io::Result<[f32; N]> {
        let mut out = [0.0f32; N];
        self.cursor.read_f32_into::<LittleEndian>(&mut out)?;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut out = [0u8; N];
        self.cursor.read_exact(&mut out)?;
        Ok(out)
    }

    /// Borrows the next `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        let end = start
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| short_read(len, self.remaining()))?;
        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    pub fn skip(&mut self, len: usize) -> io::Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads a `u32` length followed by exactly that many bytes.
    pub fn read_len_prefixed(&mut self) -> io::Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Reads `count` little-endian `i16` samples.
    pub fn read_i16_samples(&mut self, count: usize) -> io::Result<Vec<i16>> {
        let wanted = count
            .checked_mul(2)
            .ok_or_else(|| short_read(usize::MAX, self.remaining()))?;
        if wanted > self.remaining() {
            return Err(short_read(wanted, self.remaining()));
        }
        let mut samples = vec![0i16; count];
        self.cursor.read_i16_into::<LittleEndian>(&mut samples)?;
        Ok(samples)
    }

    /// Everything from the current position to the end.
    pub fn rest(&mut self) -> &'a [u8] {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position().min(data.len());
        self.cursor.set_position(data.len() as u64);
        &data[start..]
    }
}

pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn zeroed(len: usize) -> Self {
        Self { buf: vec![0u8; len] }
    }

    fn slot(&mut self, offset: usize, len: usize) -> io::Result<&mut [u8]> {
        let total = self.buf.len();
        offset
            .checked_add(len)
            .and_then(|end| self.buf.get_mut(offset..end))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "write of {} bytes at offset {} exceeds buffer of {} bytes",
                        len, offset, total
                    ),
                )
            })
    }

    pub fn put_i32(&mut self, offset: usize, value: i32) -> io::Result<()> {
        LittleEndian::write_i32(self.slot(offset, 4)?, value);
        Ok(())
    }

    pub fn put_u32(&mut self, offset: usize, value: u32) -> io::Result<()> {
        LittleEndian::write_u32(self.slot(offset, 4)?, value);
        Ok(())
    }

    pub fn put_f32(&mut self, offset: usize, value: f32) -> io::Result<()> {
        LittleEndian::write_f32(self.slot(offset, 4)?, value);
        Ok(())
    }

    pub fn put_f32_slice(&mut self, offset: usize, values: &[f32]) -> io::Result<()> {
        LittleEndian::write_f32_into(values, self.slot(offset, values.len() * 4)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_stops_at_end() {
        let data = [1u8, 0, 0, 0, 2, 0];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_i32().unwrap(), 1);
        assert_eq!(reader.remaining(), 2);

        let err = reader.read_u32().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_len_prefixed_is_exact() {
        let data = [3u8, 0, 0, 0, b'a', b'b', b'c', b'd'];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_len_prefixed().unwrap(), b"abc");
        assert_eq!(reader.rest(), b"d");
    }

    #[test]
    fn test_len_prefixed_past_end_fails() {
        let data = [9u8, 0, 0, 0, b'a'];
        let mut reader = ByteReader::new(&data);

        assert!(reader.read_len_prefixed().is_err());
    }

    #[test]
    fn test_sample_count_checked_before_allocation() {
        let data = [0u8; 6];
        let mut reader = ByteReader::new(&data);

        assert!(reader.read_i16_samples(usize::MAX).is_err());
        assert_eq!(reader.read_i16_samples(3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_writer_bounds_checked() {
        let mut writer = ByteWriter::zeroed(8);

        writer.put_i32(4, -2).unwrap();
        assert!(writer.put_u32(6, 1).is_err());
        assert!(writer.put_f32(usize::MAX, 1.0).is_err());

        assert_eq!(writer.into_inner(), vec![0, 0, 0, 0, 0xfe, 0xff, 0xff, 0xff]);
    }
}
