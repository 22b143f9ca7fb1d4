//! Stream declarations and the per-file stream table.
//!
//! Every `Buffer` chunk declares one stream: a 32-word header followed by the
//! raw element data. Streams are keyed by the opaque ID carried in the
//! chunk's secondary header.

use std::fmt;

use tracing::debug;

use crate::FxHashMap;

/// Number of u32 words in a stream declaration header.
pub const STREAM_HEADER_WORDS: usize = 32;

/// Header word holding the element stride in bytes.
const STRIDE_FIELD: usize = 3;

/// Header word holding the element count.
const COUNT_FIELD: usize = 4;

/// Opaque stream identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamId(pub u32);

impl StreamId {
    /// Get the raw ID value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// What a descriptor uses a stream for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamRole {
    Vertex,
    Uv,
    Index,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamRole::Vertex => "vertex",
            StreamRole::Uv => "UV",
            StreamRole::Index => "index",
        })
    }
}

/// A declared stream: its header words and where its body starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRecord {
    /// Raw declaration header.
    pub header: [u32; STREAM_HEADER_WORDS],
    /// Absolute file offset of the first element.
    pub body_offset: u64,
}

impl StreamRecord {
    /// Create a record from a header and body offset.
    pub const fn new(header: [u32; STREAM_HEADER_WORDS], body_offset: u64) -> Self {
        Self {
            header,
            body_offset,
        }
    }

    /// Byte distance between consecutive elements.
    #[inline]
    pub const fn stride(&self) -> u32 {
        self.header[STRIDE_FIELD]
    }

    /// Number of elements in the stream.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.header[COUNT_FIELD]
    }
}

/// Append-only map from stream ID to its most recent declaration.
#[derive(Debug, Clone, Default)]
pub struct StreamTable {
    streams: FxHashMap<StreamId, StreamRecord>,
    declarations: usize,
}

impl StreamTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration, replacing any earlier one with the same ID.
    ///
    /// Returns the shadowed record, if there was one.
    pub fn insert(&mut self, id: StreamId, record: StreamRecord) -> Option<StreamRecord> {
        self.declarations += 1;
        let previous = self.streams.insert(id, record);
        if let Some(old) = &previous {
            debug!(
                stream = %id,
                old_offset = old.body_offset,
                new_offset = record.body_offset,
                "stream redeclared, later declaration wins"
            );
        }
        previous
    }

    /// Look up the most recent declaration for an ID.
    #[inline]
    pub fn lookup(&self, id: StreamId) -> Option<&StreamRecord> {
        self.streams.get(&id)
    }

    /// Number of distinct stream IDs.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Check if no streams have been declared.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Total number of declarations seen, including shadowed ones.
    pub fn declarations(&self) -> usize {
        self.declarations
    }

    /// Iterate over the live records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (StreamId, &StreamRecord)> + '_ {
        self.streams.iter().map(|(id, record)| (*id, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stride: u32, count: u32, body_offset: u64) -> StreamRecord {
        let mut header = [0u32; STREAM_HEADER_WORDS];
        header[STRIDE_FIELD] = stride;
        header[COUNT_FIELD] = count;
        StreamRecord::new(header, body_offset)
    }

    #[test]
    fn test_record_fields() {
        let r = record(12, 40, 256);
        assert_eq!(r.stride(), 12);
        assert_eq!(r.count(), 40);
        assert_eq!(r.body_offset, 256);
    }

    #[test]
    fn test_lookup_missing() {
        let table = StreamTable::new();
        assert!(table.lookup(StreamId(7)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut table = StreamTable::new();
        assert!(table.insert(StreamId(7), record(12, 3, 100)).is_none());
        let shadowed = table.insert(StreamId(7), record(16, 5, 900));

        assert_eq!(shadowed.map(|r| r.body_offset), Some(100));
        let live = table.lookup(StreamId(7)).unwrap();
        assert_eq!(live.stride(), 16);
        assert_eq!(live.body_offset, 900);
        assert_eq!(table.len(), 1);
        assert_eq!(table.declarations(), 2);
    }

    #[test]
    fn test_stream_id_display() {
        assert_eq!(StreamId(0xAB).to_string(), "0x000000AB");
    }
}
