//! Xiasi - asset extraction for perm.bin resource packs.
//!
//! This crate provides a unified interface to the Xiasi library crates.
//!
//! # Crates
//!
//! - [`xiasi_common`] - Common utilities (binary reading, result trees)
//! - [`xiasi_perm`] - Chunk walking and mesh stream resolution
//! - [`xiasi_resource`] - Resource type directory, signature scan, browsing
//!
//! # Example
//!
//! ```no_run
//! use xiasi::prelude::*;
//!
//! let file = PermFile::open("hero.perm.bin")?;
//! let report = file.decode(&DecodeOptions::new(Profile::Pooled));
//! report.write_meshes("meshes")?;
//!
//! let resources = find_resources(file.data());
//! println!("{} resource tags found", resources.total());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use xiasi_common as common;
pub use xiasi_perm as perm;
pub use xiasi_resource as resource;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use xiasi_common::{BinaryReader, TreeNode};
    pub use xiasi_perm::{
        Container, DecodeOptions, DecodeReport, DecodedMesh, Diagnostic, PermFile, Profile,
        Severity, StreamId,
    };
    pub use xiasi_resource::{browse, find_resources, EntryKind, ScanResults, SignatureScan};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
