//! Skeleton (bone palette) chunks.

use xiasi_common::BinaryReader;

use crate::decode::fixed_to_f32;
use crate::Result;

/// Number of u32 words in a skeleton header.
pub const SKELETON_HEADER_WORDS: usize = 8;

/// Header word holding the bone count.
const BONE_COUNT_FIELD: usize = 1;

/// Unparsed block between the header and the name table.
pub const SKELETON_RESERVED_SIZE: usize = 160;

/// Fixed size of a bone name entry.
pub const BONE_NAME_SIZE: usize = 64;

/// A named bone and its rest rotation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub name: String,
    /// Quaternion components, fixed point scaled by `2^-14`.
    pub rotation: [f32; 4],
}

/// The bone table of one skeleton chunk.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    /// Chunk origin.
    pub offset: usize,
    /// The chunk's stream ID field.
    pub id: u32,
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Read a skeleton payload.
    ///
    /// Names and rotations are stored as two parallel tables driven by the
    /// same count, so they always pair up by position.
    pub fn read(offset: usize, id: u32, reader: &mut BinaryReader<'_>) -> Result<Self> {
        let header = reader.read_u32_array::<SKELETON_HEADER_WORDS>()?;
        let count = header[BONE_COUNT_FIELD] as usize;
        reader.skip(SKELETON_RESERVED_SIZE)?;

        // Fail before allocating if the tables cannot fit.
        reader.peek_bytes(count.saturating_mul(BONE_NAME_SIZE + 8))?;

        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(reader.read_fixed_string_lossy(BONE_NAME_SIZE)?);
        }

        let mut bones = Vec::with_capacity(count);
        for name in names {
            let raw = reader.read_i16s(4)?;
            bones.push(Bone {
                name,
                rotation: [
                    fixed_to_f32(raw[0]),
                    fixed_to_f32(raw[1]),
                    fixed_to_f32(raw[2]),
                    fixed_to_f32(raw[3]),
                ],
            });
        }

        Ok(Self { offset, id, bones })
    }

    /// Find a bone by name.
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }
}
