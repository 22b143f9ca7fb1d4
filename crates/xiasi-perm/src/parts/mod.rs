//! Auxiliary chunk handlers.
//!
//! Materials and skeletons are decoded alongside the geometry but are not
//! needed to resolve it:
//! - [`Material`]: diffuse and specular texture IDs, keyed by material ID
//! - [`Skeleton`]: bone names with a rest rotation per bone

mod material;
mod skeleton;

pub use material::{
    Material, DIFFUSE_TEXTURE_PROPERTY, MATERIAL_HEADER_WORDS, MATERIAL_PROPERTY_WORDS,
    SPECULAR_TEXTURE_PROPERTY,
};
pub use skeleton::{
    Bone, Skeleton, BONE_NAME_SIZE, SKELETON_HEADER_WORDS, SKELETON_RESERVED_SIZE,
};
