//! Decoder for perm.bin resource containers.
//!
//! A container is a flat run of tagged chunks. Stream chunks declare raw
//! element buffers under an opaque ID; model chunks carry mesh descriptors
//! that reference those IDs for their vertex, UV and index data. This crate
//! walks the chunks once, then resolves every descriptor into a
//! [`DecodedMesh`].
//!
//! # Chunk Layout
//!
//! - 16 bytes: [`ChunkHeader`] (tag, length, unknown, preamble size)
//! - N bytes: preamble
//! - 28 bytes: secondary header (word 3 is the stream ID)
//! - 36 bytes: pad
//! - payload, interpreted by tag
//!
//! The next chunk starts `length` bytes after the start of the header.
//!
//! # Example
//!
//! ```no_run
//! use xiasi_perm::{DecodeOptions, PermFile, Profile};
//!
//! let file = PermFile::open("hero.perm.bin")?;
//! let report = file.decode(&DecodeOptions::new(Profile::PerMesh));
//! println!("{}", report.summary());
//!
//! for mesh in &report.meshes {
//!     println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
//! }
//! report.write_meshes("out")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Decoding never fails once the bytes are in memory; problems are reported
//! as [`Diagnostic`]s in the [`DecodeReport`].

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

pub mod builder;
pub mod chunk;
mod container;
pub mod decode;
mod descriptor;
mod error;
mod mesh;
pub mod parts;
mod report;
mod resolve;
mod stream;

pub use chunk::{Chunk, ChunkHeader, ChunkKind, ChunkWalker};
pub use container::{decode, Container, PermFile};
pub use descriptor::{MeshDescriptor, ModelChunk, ModelEntry};
pub use error::{Error, ErrorKind, Result};
pub use mesh::{format_float, DecodedMesh, TexCoord, Triangle, Vertex};
pub use parts::{Bone, Material, Skeleton};
pub use report::{
    DecodeReport, DecodeStats, Diagnostic, Location, MeshSummary, ReportDigest, Severity,
    SkippedMesh,
};
pub use resolve::{DecodeOptions, ParseProfileError, Profile};
pub use stream::{StreamId, StreamRecord, StreamRole, StreamTable};

/// Hash map keyed with the Fx hasher.
pub(crate) type FxHashMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Hash set keyed with the Fx hasher.
pub(crate) type FxHashSet<T> = hashbrown::HashSet<T, BuildHasherDefault<FxHasher>>;
