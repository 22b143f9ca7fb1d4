//! Builder for synthetic perm containers.
//!
//! Produces byte-exact containers for tests and tooling without needing
//! game files. Chunks are emitted in the order they are added; the framing
//! modifiers ([`preamble`](ContainerBuilder::preamble),
//! [`slack`](ContainerBuilder::slack),
//! [`declared_length`](ContainerBuilder::declared_length)) apply to the most
//! recently added chunk.
//!
//! ```
//! use xiasi_perm::builder::ContainerBuilder;
//! use xiasi_perm::{MeshDescriptor, StreamId};
//!
//! let mesh = MeshDescriptor::default()
//!     .with_index_stream(StreamId(2))
//!     .with_vertex_stream(StreamId(1))
//!     .with_index_range(0, 1);
//!
//! let bytes = ContainerBuilder::new()
//!     .vertex_stream_f32(1, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
//!     .index_stream(2, &[0, 1, 2])
//!     .model(3, &[mesh])
//!     .build()
//!     .unwrap();
//! # assert!(!bytes.is_empty());
//! ```

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use half::f16;

use crate::chunk::{
    ChunkHeader, CHUNK_PAD, MATERIAL_TAG, MODEL_TAG, SECONDARY_HEADER_WORDS, SKELETON_TAG,
    STREAM_TAG,
};
use crate::descriptor::{MeshDescriptor, DESCRIPTOR_WORDS, MODEL_ENTRY_COUNT_FIELD, MODEL_HEADER_WORDS};
use crate::parts::{
    BONE_NAME_SIZE, MATERIAL_HEADER_WORDS, MATERIAL_PROPERTY_WORDS, SKELETON_HEADER_WORDS,
    SKELETON_RESERVED_SIZE,
};
use crate::stream::STREAM_HEADER_WORDS;
use crate::{Error, Result};

/// Filler written into preambles so that a walker that fails to skip them
/// reads obvious garbage.
const PREAMBLE_FILL: u8 = 0xCD;

/// A chunk waiting to be serialized.
#[derive(Debug, Clone)]
struct PendingChunk {
    tag: u32,
    id: u32,
    preamble: usize,
    payload: Vec<u8>,
    slack: usize,
    declared_length: Option<u32>,
}

impl PendingChunk {
    /// Bytes of the chunk, header included.
    fn len(&self) -> usize {
        ChunkHeader::SIZE
            + self.preamble
            + SECONDARY_HEADER_WORDS * 4
            + CHUNK_PAD
            + self.payload.len()
            + self.slack
    }
}

/// Builder for perm container bytes.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    chunks: Vec<PendingChunk>,
    trailer: Vec<u8>,
}

fn put_words(out: &mut Vec<u8>, words: &[u32]) {
    for &w in words {
        // Writes into a Vec are infallible.
        let _ = out.write_u32::<LittleEndian>(w);
    }
}

impl ContainerBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk with an arbitrary tag and payload.
    pub fn raw_chunk(mut self, tag: u32, id: u32, payload: Vec<u8>) -> Self {
        self.chunks.push(PendingChunk {
            tag,
            id,
            preamble: 0,
            payload,
            slack: 0,
            declared_length: None,
        });
        self
    }

    /// Add a stream declaration with a raw body.
    pub fn stream(self, id: u32, stride: u32, count: u32, body: &[u8]) -> Self {
        let mut header = [0u32; STREAM_HEADER_WORDS];
        header[3] = stride;
        header[4] = count;

        let mut payload = Vec::with_capacity(STREAM_HEADER_WORDS * 4 + body.len());
        put_words(&mut payload, &header);
        payload.extend_from_slice(body);
        self.raw_chunk(STREAM_TAG, id, payload)
    }

    /// Add a stride-12 float vertex stream.
    pub fn vertex_stream_f32(self, id: u32, vertices: &[[f32; 3]]) -> Self {
        let mut body = Vec::with_capacity(vertices.len() * 12);
        for v in vertices {
            for &c in v {
                let _ = body.write_f32::<LittleEndian>(c);
            }
        }
        self.stream(id, 12, vertices.len() as u32, &body)
    }

    /// Add a stride-16 fixed-point vertex stream.
    pub fn vertex_stream_fixed(self, id: u32, vertices: &[[i16; 3]]) -> Self {
        let mut body = Vec::with_capacity(vertices.len() * 16);
        for v in vertices {
            for &c in v {
                let _ = body.write_i16::<LittleEndian>(c);
            }
            body.extend_from_slice(&[0u8; 10]);
        }
        self.stream(id, 16, vertices.len() as u32, &body)
    }

    /// Add a half-float UV stream. Elements are padded out to `stride`.
    pub fn uv_stream(self, id: u32, uvs: &[[f32; 2]], stride: u32) -> Self {
        let pad = (stride as usize).saturating_sub(4);
        let mut body = Vec::with_capacity(uvs.len() * (4 + pad));
        for uv in uvs {
            for &c in uv {
                let _ = body.write_u16::<LittleEndian>(f16::from_f32(c).to_bits());
            }
            body.resize(body.len() + pad, 0);
        }
        self.stream(id, stride, uvs.len() as u32, &body)
    }

    /// Add a u16 index stream.
    pub fn index_stream(self, id: u32, indices: &[u16]) -> Self {
        let mut body = Vec::with_capacity(indices.len() * 2);
        for &i in indices {
            let _ = body.write_u16::<LittleEndian>(i);
        }
        self.stream(id, 2, indices.len() as u32, &body)
    }

    /// Add a model chunk holding the given descriptors.
    ///
    /// Descriptors are packed right after the offset table.
    pub fn model(self, id: u32, descriptors: &[MeshDescriptor]) -> Self {
        let n = descriptors.len();
        let mut header = [0u32; MODEL_HEADER_WORDS];
        header[MODEL_ENTRY_COUNT_FIELD] = n as u32;

        let mut payload = Vec::with_capacity((MODEL_HEADER_WORDS + n + n * DESCRIPTOR_WORDS) * 4);
        put_words(&mut payload, &header);
        for m in 0..n {
            // Entry m lives at table_start + 4m + offset[m].
            let relative = 4 * (n - m) + DESCRIPTOR_WORDS * 4 * m;
            put_words(&mut payload, &[relative as u32]);
        }
        for d in descriptors {
            put_words(&mut payload, d.fields());
        }
        self.raw_chunk(MODEL_TAG, id, payload)
    }

    /// Add a material chunk with `(property tag, value)` entries.
    pub fn material(self, id: u32, properties: &[(u32, u32)]) -> Self {
        let mut header = [0u32; MATERIAL_HEADER_WORDS];
        header[4] = properties.len() as u32;

        let mut payload = Vec::new();
        put_words(&mut payload, &header);
        for &(tag, value) in properties {
            let mut entry = [0u32; MATERIAL_PROPERTY_WORDS];
            entry[0] = tag;
            entry[6] = value;
            put_words(&mut payload, &entry);
        }
        self.raw_chunk(MATERIAL_TAG, id, payload)
    }

    /// Add a skeleton chunk with `(name, raw rotation)` bones.
    pub fn skeleton(self, id: u32, bones: &[(&str, [i16; 4])]) -> Self {
        let mut header = [0u32; SKELETON_HEADER_WORDS];
        header[1] = bones.len() as u32;

        let mut payload = Vec::new();
        put_words(&mut payload, &header);
        payload.resize(payload.len() + SKELETON_RESERVED_SIZE, 0);
        for (name, _) in bones {
            let bytes = name.as_bytes();
            let len = bytes.len().min(BONE_NAME_SIZE - 1);
            let mut entry = [0u8; BONE_NAME_SIZE];
            entry[..len].copy_from_slice(&bytes[..len]);
            payload.extend_from_slice(&entry);
        }
        for (_, rotation) in bones {
            for &c in rotation {
                let _ = payload.write_i16::<LittleEndian>(c);
            }
        }
        self.raw_chunk(SKELETON_TAG, id, payload)
    }

    /// Insert a preamble of `size` bytes before the last chunk's secondary header.
    pub fn preamble(mut self, size: usize) -> Self {
        if let Some(last) = self.chunks.last_mut() {
            last.preamble = size;
        }
        self
    }

    /// Append `size` unread bytes to the end of the last chunk's body.
    pub fn slack(mut self, size: usize) -> Self {
        if let Some(last) = self.chunks.last_mut() {
            last.slack = size;
        }
        self
    }

    /// Override the length field of the last chunk.
    pub fn declared_length(mut self, length: u32) -> Self {
        if let Some(last) = self.chunks.last_mut() {
            last.declared_length = Some(length);
        }
        self
    }

    /// Append raw bytes after the last chunk.
    pub fn trailer(mut self, bytes: Vec<u8>) -> Self {
        self.trailer = bytes;
        self
    }

    /// Serialize the container.
    pub fn build(&self) -> Result<Vec<u8>> {
        let total: usize = self
            .chunks
            .iter()
            .map(PendingChunk::len)
            .sum::<usize>()
            + self.trailer.len();
        let mut out = Vec::with_capacity(total);

        for chunk in &self.chunks {
            let offset = out.len();
            let chunk_len = chunk.len();
            let length = match chunk.declared_length {
                Some(length) => length,
                None => u32::try_from(chunk_len).map_err(|_| Error::MalformedHeader {
                    offset,
                    detail: format!("chunk of {chunk_len} bytes does not fit a u32 length"),
                })?,
            };
            let preamble_size = u32::try_from(chunk.preamble).map_err(|_| Error::MalformedHeader {
                offset,
                detail: format!("preamble of {} bytes does not fit a u32", chunk.preamble),
            })?;

            out.write_u32::<LittleEndian>(chunk.tag)?;
            out.write_u32::<LittleEndian>(length)?;
            out.write_u32::<LittleEndian>(0)?;
            out.write_u32::<LittleEndian>(preamble_size)?;

            out.resize(out.len() + chunk.preamble, PREAMBLE_FILL);

            let mut secondary = [0u32; SECONDARY_HEADER_WORDS];
            secondary[3] = chunk.id;
            put_words(&mut out, &secondary);
            out.resize(out.len() + CHUNK_PAD, 0);

            out.write_all(&chunk.payload)?;
            out.resize(out.len() + chunk.slack, 0);
        }

        out.write_all(&self.trailer)?;
        Ok(out)
    }
}
