//! Top-level chunk framing.
//!
//! A container is a flat run of chunks. Each chunk starts with a 16-byte
//! [`ChunkHeader`], followed by a variable preamble, a 7-word secondary
//! header, a 36-byte pad and finally the tag-specific payload. The declared
//! length covers the whole chunk, header included, so the next chunk always
//! starts at `offset + length` no matter how much of the payload a handler
//! actually reads.

use xiasi_common::BinaryReader;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::stream::StreamId;
use crate::{Error, Result};

/// Tag of a model chunk (resource type `ModelData`).
pub const MODEL_TAG: u32 = 0x6DF9_63B3;

/// Tag of a stream declaration chunk (resource type `Buffer`).
pub const STREAM_TAG: u32 = 0x7A97_1479;

/// Tag of a material chunk (resource type `Material`).
pub const MATERIAL_TAG: u32 = 0xF5F8_516F;

/// Tag of a skeleton chunk (resource type `BonePalette`).
pub const SKELETON_TAG: u32 = 0x9824_56DB;

/// Number of u32 words in the secondary header.
pub const SECONDARY_HEADER_WORDS: usize = 7;

/// Secondary header word carrying the chunk's stream ID.
const STREAM_ID_FIELD: usize = 3;

/// Fixed pad between the secondary header and the payload.
pub const CHUNK_PAD: usize = 36;

/// On-disk layout of [`ChunkHeader`].
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RawChunkHeader {
    tag: U32,
    length: U32,
    unknown: U32,
    preamble_size: U32,
}

/// Header at the start of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk type tag.
    pub tag: u32,
    /// Byte length of the whole chunk, this header included.
    pub length: u32,
    /// Unknown (possibly flags or version).
    pub unknown: u32,
    /// Size of the preamble that precedes the secondary header.
    pub preamble_size: u32,
}

impl ChunkHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = std::mem::size_of::<RawChunkHeader>();

    /// Read a header from the cursor.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let raw: RawChunkHeader = reader.read_struct()?;
        Ok(Self {
            tag: raw.tag.get(),
            length: raw.length.get(),
            unknown: raw.unknown.get(),
            preamble_size: raw.preamble_size.get(),
        })
    }
}

/// Chunk classification by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Model,
    StreamDeclaration,
    Material,
    Skeleton,
    Unknown(u32),
}

impl ChunkKind {
    /// Classify a raw tag.
    pub const fn from_tag(tag: u32) -> Self {
        match tag {
            MODEL_TAG => ChunkKind::Model,
            STREAM_TAG => ChunkKind::StreamDeclaration,
            MATERIAL_TAG => ChunkKind::Material,
            SKELETON_TAG => ChunkKind::Skeleton,
            other => ChunkKind::Unknown(other),
        }
    }
}

/// A framed chunk, borrowed from the container buffer.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    data: &'a [u8],
    /// The chunk header.
    pub header: ChunkHeader,
    /// Offset of the chunk header.
    pub offset: usize,
    /// Offset of the first byte after the header.
    pub origin: usize,
    /// Secondary header words.
    pub secondary: [u32; SECONDARY_HEADER_WORDS],
    /// Offset of the tag-specific payload.
    pub payload_offset: usize,
}

impl<'a> Chunk<'a> {
    /// Classify this chunk.
    #[inline]
    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_tag(self.header.tag)
    }

    /// The stream ID carried in the secondary header.
    #[inline]
    pub fn stream_id(&self) -> StreamId {
        StreamId(self.secondary[STREAM_ID_FIELD])
    }

    /// Offset of the next chunk.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.header.length as usize
    }

    /// A reader over the whole buffer, positioned at the payload.
    ///
    /// Handlers are not fenced to the chunk; payload tables can point
    /// anywhere in the file.
    pub fn reader(&self) -> Result<BinaryReader<'a>> {
        Ok(BinaryReader::new_at(self.data, self.payload_offset)?)
    }
}

/// Iterator over the top-level chunks of a container.
///
/// A chunk whose preamble cannot be read yields an error and the walk moves
/// on to the next one. A truncated header, or one whose declared length is
/// shorter than the header itself or runs past the buffer end, yields
/// [`Error::MalformedHeader`] and ends the walk.
#[derive(Debug, Clone)]
pub struct ChunkWalker<'a> {
    reader: BinaryReader<'a>,
    finished: bool,
}

impl<'a> ChunkWalker<'a> {
    /// Start walking at the beginning of a buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(data),
            finished: false,
        }
    }

    /// Current position (always at a chunk boundary between items).
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    fn read_header(&mut self, offset: usize) -> Result<ChunkHeader> {
        if self.reader.remaining() < ChunkHeader::SIZE {
            return Err(Error::MalformedHeader {
                offset,
                detail: format!(
                    "{} trailing bytes cannot hold a chunk header",
                    self.reader.remaining()
                ),
            });
        }

        let header = ChunkHeader::read(&mut self.reader)?;
        let length = header.length as usize;
        if length < ChunkHeader::SIZE {
            return Err(Error::MalformedHeader {
                offset,
                detail: format!(
                    "declared length {length} is shorter than the {}-byte header",
                    ChunkHeader::SIZE
                ),
            });
        }

        let fits = offset
            .checked_add(length)
            .is_some_and(|end| end <= self.reader.len());
        if !fits {
            return Err(Error::MalformedHeader {
                offset,
                detail: format!(
                    "declared length {} runs past end of buffer ({} bytes)",
                    header.length,
                    self.reader.len()
                ),
            });
        }

        Ok(header)
    }

    fn read_framing(&mut self, header: &ChunkHeader) -> Result<[u32; SECONDARY_HEADER_WORDS]> {
        self.reader.skip(header.preamble_size as usize)?;
        let secondary = self.reader.read_u32_array::<SECONDARY_HEADER_WORDS>()?;
        self.reader.skip(CHUNK_PAD)?;
        Ok(secondary)
    }
}

impl<'a> Iterator for ChunkWalker<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.reader.is_empty() {
            self.finished = true;
            return None;
        }

        let offset = self.reader.position();
        let header = match self.read_header(offset) {
            Ok(header) => header,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        let origin = offset + ChunkHeader::SIZE;
        let framing = self.read_framing(&header);
        let payload_offset = self.reader.position();

        // read_header has already checked that the end lies inside the buffer.
        if let Err(e) = self.reader.seek_to(offset + header.length as usize) {
            self.finished = true;
            return Some(Err(e.into()));
        }

        Some(framing.map(|secondary| Chunk {
            data: self.reader.data(),
            header,
            offset,
            origin,
            secondary,
            payload_offset,
        }))
    }
}

impl std::iter::FusedIterator for ChunkWalker<'_> {}
