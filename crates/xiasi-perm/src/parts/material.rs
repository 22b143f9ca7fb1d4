//! Material chunks.
//!
//! A material payload is an 8-word header whose word 4 counts the property
//! entries that follow. Each property is 8 words: word 0 is the property tag
//! and word 6 holds its value. Only the texture slots are understood.

use xiasi_common::BinaryReader;

use crate::{Error, Result};

/// Number of u32 words in a material header.
pub const MATERIAL_HEADER_WORDS: usize = 8;

/// Number of u32 words in a material property entry.
pub const MATERIAL_PROPERTY_WORDS: usize = 8;

/// Header word holding the property count.
const PROPERTY_COUNT_FIELD: usize = 4;

/// Property entry word holding the value.
const PROPERTY_VALUE_FIELD: usize = 6;

/// Property tag of the diffuse texture slot.
pub const DIFFUSE_TEXTURE_PROPERTY: u32 = 0xDCE0_6689;

/// Property tag of the specular texture slot.
pub const SPECULAR_TEXTURE_PROPERTY: u32 = 0xACBC_7A85;

/// The texture assignments of one material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Material ID (the chunk's stream ID field).
    pub id: u32,
    /// Diffuse texture resource ID.
    pub diffuse_texture_id: Option<u32>,
    /// Specular texture resource ID.
    pub specular_texture_id: Option<u32>,
    /// Number of property entries in the chunk, known or not.
    pub property_count: usize,
    /// Number of property entries actually read.
    pub properties_read: usize,
}

impl Material {
    /// Create a material with no textures assigned.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Read a material payload.
    ///
    /// A header that cannot be read is an error. A property table cut short
    /// keeps the slots read before the cut and returns the failure with them.
    pub fn read(id: u32, reader: &mut BinaryReader<'_>) -> Result<(Self, Option<Error>)> {
        let header = reader.read_u32_array::<MATERIAL_HEADER_WORDS>()?;
        let property_count = header[PROPERTY_COUNT_FIELD] as usize;

        let mut material = Self {
            property_count,
            ..Self::new(id)
        };

        for _ in 0..property_count {
            let property = match reader.read_u32_array::<MATERIAL_PROPERTY_WORDS>() {
                Ok(property) => property,
                Err(e) => return Ok((material, Some(e.into()))),
            };
            material.properties_read += 1;
            let value = property[PROPERTY_VALUE_FIELD];
            match property[0] {
                DIFFUSE_TEXTURE_PROPERTY => material.diffuse_texture_id = Some(value),
                SPECULAR_TEXTURE_PROPERTY => material.specular_texture_id = Some(value),
                _ => {}
            }
        }

        Ok((material, None))
    }

    /// Check if the whole property table was read.
    pub fn is_complete(&self) -> bool {
        self.properties_read == self.property_count
    }

    /// Check if any texture slot is assigned.
    pub fn has_textures(&self) -> bool {
        self.diffuse_texture_id.is_some() || self.specular_texture_id.is_some()
    }
}
