//! Binary reader for bounds-checked parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! little-endian values from a byte slice without copying. Every read and
//! seek is bounds-checked; a failed operation leaves the position untouched.

use std::io::SeekFrom;

use zerocopy::FromBytes;

use crate::{simd, Error, Result};

/// A binary reader over a borrowed byte slice.
///
/// # Example
///
/// ```
/// use std::io::SeekFrom;
/// use xiasi_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// reader.seek(SeekFrom::Current(-2)).unwrap();
/// assert_eq!(reader.read_u16s(3).unwrap(), vec![0x0403, 0x0605, 0x0807]);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    ///
    /// Fails if `position` lies past the end of `data`.
    #[inline]
    pub fn new_at(data: &'a [u8], position: usize) -> Result<Self> {
        let mut reader = Self::new(data);
        reader.seek_to(position)?;
        Ok(reader)
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the current position as a file offset.
    #[inline]
    pub const fn tell(&self) -> u64 {
        self.position as u64
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Seek to an absolute or relative position.
    ///
    /// Positioning exactly at the end of the buffer is allowed; anything
    /// beyond it (or before the start) is rejected. Returns the new position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<usize> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => self.position as i128 + i128::from(delta),
            SeekFrom::End(delta) => self.data.len() as i128 + i128::from(delta),
        };

        if target < 0 || target > self.data.len() as i128 {
            return Err(Error::OutOfBounds {
                offset: self.position,
                needed: usize::try_from(target).unwrap_or(usize::MAX),
                available: self.data.len(),
            });
        }

        self.position = target as usize;
        Ok(self.position)
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek_to(&mut self, position: usize) -> Result<()> {
        self.seek(SeekFrom::Start(position as u64)).map(|_| ())
    }

    /// Skip forward by a number of bytes.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(self.out_of_bounds(count));
        }
        self.position += count;
        Ok(())
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    #[inline]
    fn out_of_bounds(&self, needed: usize) -> Error {
        Error::OutOfBounds {
            offset: self.position,
            needed,
            available: self.remaining(),
        }
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(self.out_of_bounds(count));
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian IEEE 754 half-precision float, widened to f32.
    #[inline]
    pub fn read_f16(&mut self) -> Result<f32> {
        self.read_u16()
            .map(|bits| half::f16::from_bits(bits).to_f32())
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read `count` consecutive elements of `size` bytes each.
    ///
    /// The whole span is bounds-checked up front so a failing read consumes
    /// nothing.
    fn read_many<T>(&mut self, count: usize, size: usize, f: fn(&[u8]) -> T) -> Result<Vec<T>> {
        let total = count
            .checked_mul(size)
            .ok_or_else(|| self.out_of_bounds(usize::MAX))?;
        let bytes = self.read_bytes(total)?;
        Ok(bytes.chunks_exact(size).map(f).collect())
    }

    /// Read `count` bytes as a vector.
    pub fn read_u8s(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_bytes(count).map(<[u8]>::to_vec)
    }

    /// Read `count` little-endian u16 values.
    pub fn read_u16s(&mut self, count: usize) -> Result<Vec<u16>> {
        self.read_many(count, 2, |b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read `count` little-endian i16 values.
    pub fn read_i16s(&mut self, count: usize) -> Result<Vec<i16>> {
        self.read_many(count, 2, |b| i16::from_le_bytes([b[0], b[1]]))
    }

    /// Read `count` little-endian u32 values.
    pub fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        self.read_many(count, 4, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read `count` half-precision floats, widened to f32.
    pub fn read_f16s(&mut self, count: usize) -> Result<Vec<f32>> {
        self.read_many(count, 2, |b| {
            half::f16::from_bits(u16::from_le_bytes([b[0], b[1]])).to_f32()
        })
    }

    /// Read `count` little-endian f32 values.
    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>> {
        self.read_many(count, 4, |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a fixed number of u32 values into an array.
    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N]> {
        let bytes = self.read_bytes(N * 4)?;
        let mut out = [0u32; N];
        for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Read a null-terminated UTF-8 string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let remaining = self.remaining_bytes();
        let null_pos = simd::find_null(remaining).ok_or(Error::MissingNullTerminator)?;

        let text = std::str::from_utf8(&remaining[..null_pos])?;
        self.position += null_pos + 1;
        Ok(text)
    }

    /// Read a string from a fixed-size buffer, stopping at the first null.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_fixed_string_lossy(&mut self, buffer_size: usize) -> Result<String> {
        let bytes = self.read_bytes(buffer_size)?;
        let end = simd::find_null(bytes).unwrap_or(buffer_size);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate. Field
    /// values are taken in host byte order.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.peek_bytes(size)?;
        let value = T::read_from_bytes(bytes).map_err(|_| self.out_of_bounds(size))?;
        self.position += size;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_signed_and_float_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-2i16).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&0x3C00u16.to_le_bytes()); // f16 1.0
        data.extend_from_slice(&0xC000u16.to_le_bytes()); // f16 -2.0
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_f16s(2).unwrap(), vec![1.0, -2.0]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_multi_reads_consume_exactly() {
        let data: Vec<u8> = (0u8..16).collect();
        let mut reader = BinaryReader::new(&data);

        let words = reader.read_u32s(3).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(reader.position(), 12);
        assert_eq!(reader.read_u8s(2).unwrap(), vec![12, 13]);
        assert_eq!(reader.tell(), 14);
    }

    #[test]
    fn test_u32_array() {
        let data: Vec<u8> = [7u32, 8, 9].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut reader = BinaryReader::new(&data);

        let arr: [u32; 3] = reader.read_u32_array().unwrap();
        assert_eq!(arr, [7, 8, 9]);
    }

    #[test]
    fn test_seek_modes() {
        let data = [0u8; 10];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.seek(SeekFrom::Start(4)).unwrap(), 4);
        assert_eq!(reader.seek(SeekFrom::Current(3)).unwrap(), 7);
        assert_eq!(reader.seek(SeekFrom::Current(-7)).unwrap(), 0);
        assert_eq!(reader.seek(SeekFrom::End(0)).unwrap(), 10);
        assert!(reader.is_empty());

        assert!(reader.seek(SeekFrom::Start(11)).is_err());
        assert!(reader.seek(SeekFrom::Current(-11)).is_err());
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "world");
        assert_eq!(reader.read_cstring(), Err(Error::MissingNullTerminator));
    }

    #[test]
    fn test_fixed_string_lossy() {
        let mut data = [0u8; 8];
        data[..4].copy_from_slice(b"root");
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_fixed_string_lossy(8).unwrap(), "root");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_bytes(4).unwrap(), &data);
        assert_eq!(reader.position(), 0);
        assert!(reader.peek_bytes(5).is_err());
    }

    #[test]
    fn test_out_of_bounds_leaves_position() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = BinaryReader::new(&data);
        reader.skip(1).unwrap();

        let err = reader.read_u32s(1).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfBounds {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(reader.position(), 1);
        assert!(reader.skip(3).is_err());
        assert!(reader.read_u16s(usize::MAX).is_err());
    }
}
