//! Model chunks and their mesh descriptors.
//!
//! A model chunk payload starts with a 32-word header whose word 16 is the
//! number of mesh entries. An array of relative offsets follows; entry `m`
//! lives at `table_start + 4 * m + offsets[m]` and is a 36-word
//! [`MeshDescriptor`] naming the streams that make up one mesh.

use std::io::SeekFrom;
use std::ops::Range;

use crate::chunk::Chunk;
use crate::stream::StreamId;
use crate::{Error, Result};

/// Number of u32 words in a model chunk header.
pub const MODEL_HEADER_WORDS: usize = 32;

/// Model header word holding the descriptor count.
pub const MODEL_ENTRY_COUNT_FIELD: usize = 16;

/// Number of u32 words in a mesh descriptor.
pub const DESCRIPTOR_WORDS: usize = 36;

const MATERIAL_ID_FIELD: usize = 3;
const INDEX_STREAM_FIELD: usize = 11;
const VERTEX_STREAM_FIELD: usize = 15;
const UV_STREAM_FIELD: usize = 23;
const INDEX_START_FIELD: usize = 29;
const TRIANGLE_COUNT_FIELD: usize = 30;

/// A mesh descriptor as stored in a model chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDescriptor {
    fields: [u32; DESCRIPTOR_WORDS],
}

impl Default for MeshDescriptor {
    fn default() -> Self {
        Self {
            fields: [0; DESCRIPTOR_WORDS],
        }
    }
}

impl MeshDescriptor {
    /// Create a descriptor from raw words.
    pub const fn from_fields(fields: [u32; DESCRIPTOR_WORDS]) -> Self {
        Self { fields }
    }

    /// Get the raw words.
    pub fn fields(&self) -> &[u32; DESCRIPTOR_WORDS] {
        &self.fields
    }

    pub fn material_id(&self) -> u32 {
        self.fields[MATERIAL_ID_FIELD]
    }

    pub fn index_stream(&self) -> StreamId {
        StreamId(self.fields[INDEX_STREAM_FIELD])
    }

    pub fn vertex_stream(&self) -> StreamId {
        StreamId(self.fields[VERTEX_STREAM_FIELD])
    }

    pub fn uv_stream(&self) -> StreamId {
        StreamId(self.fields[UV_STREAM_FIELD])
    }

    /// First index of this mesh's slice, counted in indices.
    pub fn index_start(&self) -> u32 {
        self.fields[INDEX_START_FIELD]
    }

    pub fn triangle_count(&self) -> u32 {
        self.fields[TRIANGLE_COUNT_FIELD]
    }

    /// The index slice `[start, start + triangles * 3)`.
    ///
    /// Computed in u64 so that no descriptor value can overflow it.
    pub fn index_range(&self) -> Range<u64> {
        let start = u64::from(self.index_start());
        start..start + u64::from(self.triangle_count()) * 3
    }

    /// Set the material ID.
    pub fn with_material(mut self, id: u32) -> Self {
        self.fields[MATERIAL_ID_FIELD] = id;
        self
    }

    /// Set the index stream.
    pub fn with_index_stream(mut self, id: StreamId) -> Self {
        self.fields[INDEX_STREAM_FIELD] = id.0;
        self
    }

    /// Set the vertex stream.
    pub fn with_vertex_stream(mut self, id: StreamId) -> Self {
        self.fields[VERTEX_STREAM_FIELD] = id.0;
        self
    }

    /// Set the UV stream.
    pub fn with_uv_stream(mut self, id: StreamId) -> Self {
        self.fields[UV_STREAM_FIELD] = id.0;
        self
    }

    /// Set the index slice.
    pub fn with_index_range(mut self, start: u32, triangles: u32) -> Self {
        self.fields[INDEX_START_FIELD] = start;
        self.fields[TRIANGLE_COUNT_FIELD] = triangles;
        self
    }
}

/// One readable entry of a model chunk.
#[derive(Debug, Clone, Copy)]
pub struct ModelEntry {
    /// Position of the entry in the chunk's offset table.
    pub index: usize,
    /// Absolute offset of the descriptor.
    pub offset: usize,
    pub descriptor: MeshDescriptor,
}

/// The descriptors of one model chunk.
#[derive(Debug)]
pub struct ModelChunk {
    /// Chunk origin (first byte after the chunk header).
    pub origin: usize,
    /// Chunk-local header words.
    pub header: [u32; MODEL_HEADER_WORDS],
    /// Entries that were read successfully, in table order.
    pub entries: Vec<ModelEntry>,
    /// Entries that could not be read.
    pub failed: Vec<(usize, Error)>,
}

impl ModelChunk {
    /// Read the descriptor table of a model chunk.
    ///
    /// Fails only if the header or offset table cannot be read; a bad
    /// descriptor is recorded in [`ModelChunk::failed`] and the rest are kept.
    pub fn read(chunk: &Chunk<'_>) -> Result<Self> {
        let mut reader = chunk.reader()?;
        let header = reader.read_u32_array::<MODEL_HEADER_WORDS>()?;
        let count = header[MODEL_ENTRY_COUNT_FIELD] as usize;

        let table_start = reader.position();
        let offsets = reader.read_u32s(count)?;

        let mut entries = Vec::with_capacity(count);
        let mut failed = Vec::new();

        for (index, relative) in offsets.iter().enumerate() {
            let target = table_start as u64 + 4 * index as u64 + u64::from(*relative);
            let read = reader
                .seek(SeekFrom::Start(target))
                .and_then(|_| reader.read_u32_array::<DESCRIPTOR_WORDS>());

            match read {
                Ok(fields) => entries.push(ModelEntry {
                    index,
                    offset: target as usize,
                    descriptor: MeshDescriptor::from_fields(fields),
                }),
                Err(e) => failed.push((index, e.into())),
            }
        }

        Ok(Self {
            origin: chunk.origin,
            header,
            entries,
            failed,
        })
    }

    /// Number of entries declared in the header.
    pub fn declared_count(&self) -> usize {
        self.header[MODEL_ENTRY_COUNT_FIELD] as usize
    }
}
