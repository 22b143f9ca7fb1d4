//! Stream element decoding.
//!
//! Elements are addressed by the declared stride, which may be larger than
//! the bytes actually consumed; trailing per-element bytes are skipped.

use std::ops::Range;

use xiasi_common::BinaryReader;

use crate::mesh::{TexCoord, Triangle, Vertex};
use crate::stream::{StreamId, StreamRecord};
use crate::{Error, Result};

/// Scale applied to 16-bit fixed-point components (`2^-14`).
pub const FIXED_POINT_SCALE: f32 = 1.0 / 16384.0;

/// Stride of a fixed-point vertex element (three i16 plus padding).
pub const FIXED_VERTEX_STRIDE: u32 = 16;

/// Stride of a float vertex element (three f32).
pub const FLOAT_VERTEX_STRIDE: u32 = 12;

/// Bytes consumed per UV element (two halves).
const UV_ELEMENT_SIZE: usize = 4;

/// How a vertex stream is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexEncoding {
    /// Three signed 16-bit values scaled by [`FIXED_POINT_SCALE`].
    FixedPoint,
    /// Three little-endian f32 values.
    Float,
}

impl VertexEncoding {
    /// Pick the encoding for a declared stride.
    pub const fn from_stride(stride: u32) -> Option<Self> {
        match stride {
            FIXED_VERTEX_STRIDE => Some(VertexEncoding::FixedPoint),
            FLOAT_VERTEX_STRIDE => Some(VertexEncoding::Float),
            _ => None,
        }
    }

    /// Bytes read from each element.
    const fn element_size(self) -> usize {
        match self {
            VertexEncoding::FixedPoint => 6,
            VertexEncoding::Float => 12,
        }
    }
}

/// Convert a raw fixed-point component.
#[inline]
pub fn fixed_to_f32(raw: i16) -> f32 {
    f32::from(raw) * FIXED_POINT_SCALE
}

fn overflow(offset: u64, data: &[u8]) -> Error {
    Error::Common(xiasi_common::Error::OutOfBounds {
        offset: usize::try_from(offset).unwrap_or(usize::MAX),
        needed: usize::MAX,
        available: data.len(),
    })
}

/// Read every element of a strided stream.
///
/// The span of the whole stream is checked against the buffer before any
/// element is decoded.
fn read_strided<T>(
    data: &[u8],
    record: &StreamRecord,
    element_size: usize,
    mut read: impl FnMut(&mut BinaryReader<'_>) -> xiasi_common::Result<T>,
) -> Result<Vec<T>> {
    let count = record.count() as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let stride = record.stride() as u64;
    let base = record.body_offset;
    let span = stride
        .checked_mul(count as u64 - 1)
        .and_then(|s| s.checked_add(element_size as u64))
        .and_then(|s| s.checked_add(base))
        .ok_or_else(|| overflow(base, data))?;

    if span > data.len() as u64 {
        return Err(Error::Common(xiasi_common::Error::OutOfBounds {
            offset: base as usize,
            needed: (span - base) as usize,
            available: data.len().saturating_sub(base as usize),
        }));
    }

    let mut reader = BinaryReader::new(data);
    let mut out = Vec::with_capacity(count);
    for n in 0..count as u64 {
        reader.seek_to((base + n * stride) as usize)?;
        out.push(read(&mut reader)?);
    }
    Ok(out)
}

/// Decode the positions of a vertex stream.
///
/// Stride 16 is fixed point, stride 12 is float; anything else is
/// [`Error::UnsupportedEncoding`].
pub fn decode_vertices(data: &[u8], id: StreamId, record: &StreamRecord) -> Result<Vec<Vertex>> {
    let encoding = VertexEncoding::from_stride(record.stride()).ok_or(Error::UnsupportedEncoding {
        stream: id,
        stride: record.stride(),
    })?;

    match encoding {
        VertexEncoding::FixedPoint => {
            read_strided(data, record, encoding.element_size(), |reader| {
                let raw = reader.read_i16s(3)?;
                Ok([fixed_to_f32(raw[0]), fixed_to_f32(raw[1]), fixed_to_f32(raw[2])])
            })
        }
        VertexEncoding::Float => read_strided(data, record, encoding.element_size(), |reader| {
            let v = reader.read_f32s(3)?;
            Ok([v[0], v[1], v[2]])
        }),
    }
}

/// Decode the texture coordinates of a UV stream (two halves per element).
///
/// Elements start every `stride` bytes, so a stride below the element size
/// reads overlapping halves.
pub fn decode_uvs(data: &[u8], record: &StreamRecord) -> Result<Vec<TexCoord>> {
    read_strided(data, record, UV_ELEMENT_SIZE, |reader| {
        let uv = reader.read_f16s(2)?;
        Ok([uv[0], uv[1]])
    })
}

/// Decode a whole index stream as contiguous u16 values.
pub fn decode_indices(data: &[u8], record: &StreamRecord) -> Result<Vec<u16>> {
    let mut reader = BinaryReader::new(data);
    let offset = usize::try_from(record.body_offset).map_err(|_| overflow(record.body_offset, data))?;
    reader.seek_to(offset)?;
    Ok(reader.read_u16s(record.count() as usize)?)
}

/// Take an index slice and group it into triangles.
pub fn slice_triangles(indices: &[u16], range: Range<u64>) -> Result<Vec<Triangle>> {
    let out_of_range = || Error::IndexRange {
        start: range.start,
        end: range.end,
        available: indices.len(),
    };

    if range.end > indices.len() as u64 {
        return Err(out_of_range());
    }

    let slice = &indices[range.start as usize..range.end as usize];
    Ok(slice
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stream::STREAM_HEADER_WORDS;

    fn record(stride: u32, count: u32, body_offset: u64) -> StreamRecord {
        let mut header = [0u32; STREAM_HEADER_WORDS];
        header[3] = stride;
        header[4] = count;
        StreamRecord::new(header, body_offset)
    }

    #[test]
    fn test_fixed_point_scale() {
        assert_eq!(fixed_to_f32(16384), 1.0);
        assert_eq!(fixed_to_f32(-8192), -0.5);
        assert_eq!(fixed_to_f32(1), 2f32.powi(-14));
    }

    #[test]
    fn test_fixed_point_vertices_skip_padding() {
        let mut data = vec![0xEE; 4]; // unrelated leading bytes
        for v in [[16384i16, -16384, 8192], [0, 1, -1]] {
            for c in v {
                data.extend_from_slice(&c.to_le_bytes());
            }
            data.extend_from_slice(&[0xFF; 10]); // per-element padding
        }

        let vertices = decode_vertices(&data, StreamId(1), &record(16, 2, 4)).unwrap();
        assert_eq!(vertices[0], [1.0, -1.0, 0.5]);
        assert_eq!(vertices[1], [0.0, FIXED_POINT_SCALE, -FIXED_POINT_SCALE]);
    }

    #[test]
    fn test_last_fixed_element_needs_no_padding() {
        let mut data = Vec::new();
        for c in [16384i16, 0, 0] {
            data.extend_from_slice(&c.to_le_bytes());
        }

        let vertices = decode_vertices(&data, StreamId(1), &record(16, 1, 0)).unwrap();
        assert_eq!(vertices, vec![[1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_float_vertices_bit_exact() {
        let values = [0.1f32, -3.75, f32::MIN_POSITIVE, 1e30, -0.0, 42.0];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        let vertices = decode_vertices(&data, StreamId(1), &record(12, 2, 0)).unwrap();
        let flat: Vec<u32> = vertices.iter().flatten().map(|v| v.to_bits()).collect();
        let expected: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_unsupported_stride() {
        let data = vec![0u8; 64];
        let err = decode_vertices(&data, StreamId(5), &record(20, 2, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedEncoding);
        assert!(err.to_string().contains("stride 20"));
    }

    #[test]
    fn test_truncated_stream_is_out_of_bounds() {
        let data = vec![0u8; 30];
        let err = decode_vertices(&data, StreamId(1), &record(12, 3, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);

        let err = decode_vertices(&data, StreamId(1), &record(12, u32::MAX, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn test_uvs_with_stride_padding() {
        let mut data = Vec::new();
        for (u, v) in [(0x3C00u16, 0x3800u16), (0x0000, 0xBC00)] {
            data.extend_from_slice(&u.to_le_bytes());
            data.extend_from_slice(&v.to_le_bytes());
            data.extend_from_slice(&[0xAB; 4]);
        }

        let uvs = decode_uvs(&data, &record(8, 2, 0)).unwrap();
        assert_eq!(uvs, vec![[1.0, 0.5], [0.0, -1.0]]);
    }

    #[test]
    fn test_uvs_with_overlapping_stride() {
        let data: Vec<u8> = [0x3C00u16, 0x3800, 0xBC00]
            .iter()
            .flat_map(|h| h.to_le_bytes())
            .collect();

        let uvs = decode_uvs(&data, &record(2, 2, 0)).unwrap();
        assert_eq!(uvs, vec![[1.0, 0.5], [0.5, -1.0]]);

        let err = decode_uvs(&data, &record(2, 3, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn test_decode_indices() {
        let mut data = vec![0u8; 2];
        for i in [5u16, 6, 7, 65535] {
            data.extend_from_slice(&i.to_le_bytes());
        }

        let indices = decode_indices(&data, &record(2, 4, 2)).unwrap();
        assert_eq!(indices, vec![5, 6, 7, 65535]);

        assert!(decode_indices(&data, &record(2, 5, 2)).is_err());
    }

    #[test]
    fn test_slice_triangles() {
        let indices: Vec<u16> = (0..12).collect();

        let tris = slice_triangles(&indices, 3..9).unwrap();
        assert_eq!(tris, vec![[3, 4, 5], [6, 7, 8]]);

        assert!(slice_triangles(&indices, 9..12).is_ok());
        let err = slice_triangles(&indices, 9..15).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountMismatch);
    }
}
