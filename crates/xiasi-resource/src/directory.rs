//! Known resource types.
//!
//! Every resource in a pack is introduced by a 32-bit type tag. The table is
//! kept in its traditional order, which is also the order scan results are
//! grouped in.

use std::fmt;

/// Tag of a texture resource.
pub const TEXTURE_TAG: u32 = 0xCDBF_A090;

/// A named resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceType {
    pub tag: u32,
    pub name: &'static str,
}

impl ResourceType {
    /// The tag as it appears in a file.
    pub const fn signature(&self) -> [u8; 4] {
        self.tag.to_le_bytes()
    }

    pub fn is_texture(&self) -> bool {
        self.tag == TEXTURE_TAG
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name, self.tag)
    }
}

#[rustfmt::skip]
const RESOURCE_TYPES: &[(u32, &str)] = &[
    (0x4BCE_8537, "ActionTreeResource"),
    (0x1BCF_F4D5, "AlphaState"),
    (0x8ACF_9964, "Animation"),
    (0x3D0E_BC72, "AnimationGroupResource"),
    (0xAF88_70AB, "AudioFXSettings"),
    (0x2C5C_40A8, "BIGFile"),
    (0x1640_13D5, "BIGFileNameLookup"),
    (0x4F05_B59A, "BSP"),
    (0xE2C5_C78C, "BSPDebugData"),
    (0x80EF_0B08, "BeamSettings"),
    (0xE691_BB97, "BlendTreeResource"),
    (0x9824_56DB, "BonePalette"),
    (0x7A97_1479, "Buffer"),
    (0x45E0_61F6, "BufferD3DResource"),
    (0xE445_B80C, "ChunkFileFatIndex"),
    (0x7040_F7D2, "ChunkFileIndex"),
    (0x0652_6B66, "Cloud"),
    (0xD49B_8DA4, "CloudScene"),
    (0xA0B2_CC13, "CollisionInstance"),
    (0xBD22_6A08, "CollisionMeshBundle"),
    (0x9D63_78CC, "CoronaFlareSettings"),
    (0x5DEB_3457, "CoverData"),
    (0xDCAE_C503, "DecalSettings"),
    (0xE515_0CC0, "DynamicCoverData"),
    (0x7117_991B, "DynamicCoverGroupBundle"),
    (0x230C_8A9C, "DynamicLightGroupSettings"),
    (0x8D0E_8333, "DynamicLightSettings"),
    (0xD9B1_0F14, "EffectEmitterSettings"),
    (0x7755_4FC5, "FXForceSettings"),
    (0x1228_9ADB, "FXSettings"),
    (0xF40E_78D9, "FarGroundLayout"),
    (0x8357_4C18, "FlareSettings"),
    (0x2A1B_E612, "Font"),
    (0x52A8_963A, "GeoSettings"),
    (0xAEDF_1081, "ImposterGroup"),
    (0x7480_E00F, "LightGroup"),
    (0xB4AE_E124, "LightningSettings"),
    (0x1550_6061, "Locators"),
    (0xF5F8_516F, "Material"),
    (0xEB9F_E716, "MaterialTable"),
    (0x6DF9_63B3, "ModelData"),
    (0xF270_0F96, "eVertexDecl_UVN"),
    (0x9BA6_8DBC, "eVertexDecl_UVNT"),
    (0x911E_1A51, "eVertexDecl_UVNTC"),
    (0x7892_1EA0, "eVertexDecl_UV2NTC"),
    (0x276B_9567, "eVertexDecl_Skinned"),
    (0xE234_EF7A, "eVertexDecl_VehicleUVNTC"),
    (0x7E0D_7533, "eVertexDecl_SlimUV"),
    (0xAC5D_89E2, "eVertexDecl_SkinnedUVNT"),
    (0x02CD_0C47, "MorphTargets"),
    (0xE945_3F67, "MovieResourceData"),
    (0xC762_C801, "NISSpatialData"),
    (0xDD3C_7B19, "NavMeshData"),
    (0xBDE5_3ECA, "ParkourContainer"),
    (0x12D3_A53D, "ParkourContainerBundle"),
    (0xC315_01A5, "ParkourInstance"),
    (0xD05B_6976, "ParticleEmitterSettings"),
    (0x5B9B_F81E, "PropertySet"),
    (0xB27A_4B38, "RasterState"),
    (0x616A_903F, "ReflectResource"),
    (0xD53B_5BAC, "ReflectionGroup"),
    (0x1418_DD74, "Rig"),
    (0x036C_2E8E, "RigInfoResource"),
    (0x5C66_C6BD, "RigInstance"),
    (0x9413_2761, "RoadNetwork"),
    (0xE7F2_3AEE, "SceneLayer"),
    (0x7480_E00B, "SceneryGroup"),
    (0x6571_92D6, "ScreenParticleEmitterSettings"),
    (0x89A7_BDF7, "SectionEffects"),
    (0x3E50_F7D5, "SectionLayout"),
    (0x985B_E50C, "ShaderBinary"),
    (0x0C46_AEEF, "ShaderTemplate"),
    (0x2C81_C14B, "Sidewalk"),
    (0xAF01_5A94, "StateBlock"),
    (0xE486_8DBE, "SymbolTableResource"),
    (0xC462_DD28, "TerrainData"),
    (0xCDBF_A090, "Texture"),
    (0x501B_8E62, "TextureD3DResource"),
    (0x86DE_69F6, "TrackStripSettings"),
    (0x90EE_F023, "TrueCrowdDataBase"),
    (0x3289_0C01, "UELFragmentTable"),
    (0x90CE_6B7A, "UILocalization"),
    (0x9F34_FF46, "UIMinimapTile"),
    (0x442A_39D9, "UIScreen"),
    (0x2C40_FA26, "UniqueUIDTableResource"),
    (0xF7FC_6B2D, "VertexDecl"),
    (0xA8EB_0D0C, "VolumetricEffectSettings"),
    (0x1146_D4C8, "WeightSetGroupResource"),
    (0x24D0_C3A0, "XMLFile"),
    (0x43FF_83A9, "ZoneLayout"),
];

/// Look up the name of a resource type.
pub fn lookup(tag: u32) -> Option<&'static str> {
    RESOURCE_TYPES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| *name)
}

/// Look up the tag of a named resource type.
pub fn tag_of(name: &str) -> Option<u32> {
    RESOURCE_TYPES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(tag, _)| *tag)
}

/// Iterate over every known resource type in table order.
pub fn iter() -> impl ExactSizeIterator<Item = ResourceType> {
    RESOURCE_TYPES
        .iter()
        .map(|&(tag, name)| ResourceType { tag, name })
}

/// Number of known resource types.
pub fn len() -> usize {
    RESOURCE_TYPES.len()
}
