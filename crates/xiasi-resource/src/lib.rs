//! Resource discovery for perm.bin packs.
//!
//! - [`directory`] - The table of known resource type tags
//! - [`scan`] - Tag signature scanning with texture header details
//! - [`browse`] - Zone/resource/texture classification of an install tree
//!
//! # Example
//!
//! ```no_run
//! use xiasi_resource::find_resources;
//!
//! let data = std::fs::read("city.perm.bin")?;
//! let results = find_resources(&data);
//! print!("{}", results.to_tree("city.perm.bin"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod browse;
pub mod directory;
mod error;
pub mod scan;
mod texture;

pub use browse::{browse, BrowseEntry, EntryKind};
pub use directory::{ResourceType, TEXTURE_TAG};
pub use error::{Error, Result};
pub use scan::{find_resources, scan_types, ResourceGroup, ResourceMatch, ScanResults, SignatureScan};
pub use texture::{TextureFormat, TextureInfo, TEXTURE_NAME_OFFSET};
