//! Texture resource details.
//!
//! A texture match is followed by its name at `+44`. After the name the
//! zero padding is skipped; the first non-zero byte starts the descriptor:
//!
//! - 4 bytes: format (1 = DXT1, 2 = DXT3, 3 = DXT5)
//! - 4 bytes: unknown
//! - 2 bytes: height
//! - 2 bytes: width
//! - 4 bytes: secondary texture type
//! - 28 bytes: unknown
//! - 4 bytes: raw data offset
//! - 4 bytes: raw data size

use std::fmt;

use xiasi_common::{simd, BinaryReader};

use crate::Result;

/// Distance from the type tag to the texture name.
pub const TEXTURE_NAME_OFFSET: usize = 44;

/// Block compression format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextureFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Unknown(u32),
}

impl TextureFormat {
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => TextureFormat::Dxt1,
            2 => TextureFormat::Dxt3,
            3 => TextureFormat::Dxt5,
            other => TextureFormat::Unknown(other),
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextureFormat::Dxt1 => "DXT1",
            TextureFormat::Dxt3 => "DXT3",
            TextureFormat::Dxt5 => "DXT5",
            TextureFormat::Unknown(_) => "Unknown",
        })
    }
}

/// Header fields of a texture resource.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureInfo {
    pub name: String,
    pub format: TextureFormat,
    pub height: u16,
    pub width: u16,
    pub texture_type2: u32,
    pub unknown: [u8; 28],
    /// Offset of the pixel data in the matching `temp.bin`.
    pub raw_data_offset: u32,
    pub raw_data_size: u32,
}

impl TextureInfo {
    /// Parse the texture detail of a match at `offset`.
    ///
    /// Fails with [`xiasi_common::Error::Utf8`] if the name is not UTF-8 and
    /// with an out-of-bounds error if the fields run past the buffer.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let mut reader = BinaryReader::new_at(data, offset.saturating_add(TEXTURE_NAME_OFFSET))?;
        let name = reader.read_cstring()?.to_string();

        let padding = simd::find_nonzero(reader.remaining_bytes())
            .ok_or(xiasi_common::Error::OutOfBounds {
                offset: reader.position(),
                needed: 1,
                available: reader.remaining(),
            })?;
        reader.skip(padding)?;

        let format = TextureFormat::from_raw(reader.read_u32()?);
        reader.skip(4)?;
        let height = reader.read_u16()?;
        let width = reader.read_u16()?;
        let texture_type2 = reader.read_u32()?;

        let mut unknown = [0u8; 28];
        unknown.copy_from_slice(reader.read_bytes(28)?);

        let raw_data_offset = reader.read_u32()?;
        let raw_data_size = reader.read_u32()?;

        Ok(Self {
            name,
            format,
            height,
            width,
            texture_type2,
            unknown,
            raw_data_offset,
            raw_data_size,
        })
    }

    /// Display properties, one `Key: value` string each.
    pub fn properties(&self) -> Vec<String> {
        vec![
            format!("Type: {}", self.format),
            format!("Height: {}", self.height),
            format!("Width: {}", self.width),
            format!("TextureType2: {}", self.texture_type2),
            format!("RawDataOffset: {}", self.raw_data_offset),
            format!("RawDataSize: {}", self.raw_data_size),
        ]
    }
}
