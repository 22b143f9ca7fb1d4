//! Mesh descriptor resolution.
//!
//! Runs after the walk over the buffered descriptors, so a stream may be
//! declared before or after the descriptor that references it. A mesh is
//! emitted whenever its index stream resolves; missing or undecodable
//! vertex and UV streams only strip that part of the mesh.

use std::fmt;
use std::str::FromStr;

use hashbrown::hash_map::Entry;
use thiserror::Error;
use tracing::debug;

use crate::container::Container;
use crate::decode::{decode_indices, decode_uvs, decode_vertices, slice_triangles};
use crate::descriptor::{MeshDescriptor, ModelChunk, ModelEntry};
use crate::mesh::{DecodedMesh, TexCoord, Triangle, Vertex};
use crate::report::{Diagnostics, Location, SkippedMesh};
use crate::stream::{StreamId, StreamRecord, StreamRole};
use crate::{Error, ErrorKind, FxHashMap, Result};

/// How vertex and UV data is scoped across the meshes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Profile {
    /// Every descriptor decodes its own vertex, UV and index streams.
    #[default]
    PerMesh,
    /// One vertex pool and one UV pool are shared by every descriptor;
    /// each descriptor contributes only its index slice.
    Pooled,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::PerMesh, Profile::Pooled];

    pub const fn name(self) -> &'static str {
        match self {
            Profile::PerMesh => "per-mesh",
            Profile::Pooled => "pooled",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown profile name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown profile `{0}`, expected `per-mesh` or `pooled`")]
pub struct ParseProfileError(String);

impl FromStr for Profile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-mesh" | "permesh" | "mesh" => Ok(Profile::PerMesh),
            "pooled" | "pool" => Ok(Profile::Pooled),
            _ => Err(ParseProfileError(s.to_string())),
        }
    }
}

/// Options controlling a decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub profile: Profile,
}

impl DecodeOptions {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }
}

/// Output of a resolution pass.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub meshes: Vec<DecodedMesh>,
    pub skipped: Vec<SkippedMesh>,
    pub diagnostics: Diagnostics,
}

/// Resolve every buffered descriptor of a container.
pub(crate) fn resolve(container: &Container<'_>, profile: Profile) -> Resolution {
    let mut resolver = Resolver::new(container);
    match profile {
        Profile::PerMesh => resolver.per_mesh(),
        Profile::Pooled => resolver.pooled(),
    }
    resolver.out
}

/// Every readable descriptor in file order.
fn entries<'c>(
    container: &'c Container<'_>,
) -> impl Iterator<Item = (&'c ModelChunk, &'c ModelEntry)> + 'c {
    container
        .models()
        .iter()
        .flat_map(|model| model.entries.iter().map(move |entry| (model, entry)))
}

fn mesh_location(model: &ModelChunk, entry: &ModelEntry) -> Location {
    Location::Mesh {
        model_offset: model.origin,
        descriptor: entry.index,
    }
}

struct Resolver<'c, 'a> {
    container: &'c Container<'a>,
    /// Decoded index streams, shared by descriptors that slice the same one.
    indices: FxHashMap<StreamId, Vec<u16>>,
    out: Resolution,
}

impl<'c, 'a> Resolver<'c, 'a> {
    fn new(container: &'c Container<'a>) -> Self {
        Self {
            container,
            indices: FxHashMap::default(),
            out: Resolution::default(),
        }
    }

    fn lookup(&self, role: StreamRole, id: StreamId) -> Result<&'c StreamRecord> {
        self.container
            .streams()
            .lookup(id)
            .ok_or(Error::StreamNotFound { role, id })
    }

    /// Record a part of a mesh that had to be dropped.
    fn drop_part(&mut self, location: Location, err: &Error) {
        match err.kind() {
            ErrorKind::StreamNotFound
            | ErrorKind::UnsupportedEncoding
            | ErrorKind::CountMismatch => self.out.diagnostics.warn(location, err),
            _ => self.out.diagnostics.error(location, err),
        }
    }

    fn skip(&mut self, model: &ModelChunk, entry: &ModelEntry, err: &Error) {
        self.out.diagnostics.warn(mesh_location(model, entry), err);
        self.out.skipped.push(SkippedMesh {
            model_offset: model.origin,
            descriptor_index: entry.index,
            kind: err.kind(),
            reason: err.to_string(),
        });
    }

    fn cached_indices(&mut self, id: StreamId, record: &StreamRecord) -> Result<&[u16]> {
        let data = self.container.data();
        match self.indices.entry(id) {
            Entry::Occupied(e) => Ok(e.into_mut().as_slice()),
            Entry::Vacant(e) => Ok(e.insert(decode_indices(data, record)?).as_slice()),
        }
    }

    /// Slice a descriptor's triangles out of its index stream.
    ///
    /// `None` means the index stream is not declared and no mesh should be
    /// emitted for this descriptor.
    fn triangles(&mut self, model: &ModelChunk, entry: &ModelEntry) -> Option<Vec<Triangle>> {
        let d = &entry.descriptor;
        let record = match self.lookup(StreamRole::Index, d.index_stream()) {
            Ok(record) => record,
            Err(e) => {
                self.skip(model, entry, &e);
                return None;
            }
        };

        let sliced = match self.cached_indices(d.index_stream(), record) {
            Ok(indices) => slice_triangles(indices, d.index_range()),
            Err(e) => Err(e),
        };

        match sliced {
            Ok(triangles) => Some(triangles),
            Err(e) => {
                self.out
                    .diagnostics
                    .error(mesh_location(model, entry), &e);
                Some(Vec::new())
            }
        }
    }

    fn vertices(&self, d: &MeshDescriptor) -> Result<Vec<Vertex>> {
        let id = d.vertex_stream();
        let record = self.lookup(StreamRole::Vertex, id)?;
        decode_vertices(self.container.data(), id, record)
    }

    fn uvs(&self, d: &MeshDescriptor) -> Result<Vec<TexCoord>> {
        let record = self.lookup(StreamRole::Uv, d.uv_stream())?;
        decode_uvs(self.container.data(), record)
    }

    /// Keep UVs only if they pair up with the vertices.
    fn pair_uvs(
        &mut self,
        location: Location,
        uvs: Vec<TexCoord>,
        vertex_count: usize,
    ) -> Option<Vec<TexCoord>> {
        if uvs.len() == vertex_count {
            return (!uvs.is_empty()).then_some(uvs);
        }
        let err = Error::UvCountMismatch {
            uvs: uvs.len(),
            vertices: vertex_count,
        };
        self.out.diagnostics.warn(location, &err);
        None
    }

    fn emit(
        &mut self,
        model: &ModelChunk,
        entry: &ModelEntry,
        vertices: Vec<Vertex>,
        uvs: Option<Vec<TexCoord>>,
        triangles: Vec<Triangle>,
    ) {
        let material_id = entry.descriptor.material_id();
        self.out.meshes.push(DecodedMesh {
            descriptor_index: entry.index,
            model_offset: model.origin,
            material_id,
            material: self.container.material(material_id).cloned(),
            vertices,
            uvs,
            triangles,
        });
    }

    fn per_mesh(&mut self) {
        let container = self.container;
        for (model, entry) in entries(container) {
            let Some(triangles) = self.triangles(model, entry) else {
                continue;
            };
            let location = mesh_location(model, entry);

            let vertices = self.vertices(&entry.descriptor).unwrap_or_else(|e| {
                self.drop_part(location, &e);
                Vec::new()
            });

            let uvs = match self.uvs(&entry.descriptor) {
                Ok(uvs) => self.pair_uvs(location, uvs, vertices.len()),
                Err(e) => {
                    self.drop_part(location, &e);
                    None
                }
            };

            self.emit(model, entry, vertices, uvs, triangles);
        }
    }

    /// Find the first descriptor whose stream decodes to a non-empty pool.
    fn first_pool<T>(
        &self,
        role: StreamRole,
        decode: impl Fn(&Self, &MeshDescriptor) -> Result<Vec<T>>,
    ) -> Option<(StreamId, Vec<T>)> {
        entries(self.container).find_map(|(model, entry)| {
            let d = &entry.descriptor;
            let id = match role {
                StreamRole::Vertex => d.vertex_stream(),
                _ => d.uv_stream(),
            };
            match decode(self, d) {
                Ok(pool) if !pool.is_empty() => Some((id, pool)),
                Ok(_) => None,
                Err(e) => {
                    debug!(
                        model_offset = model.origin,
                        descriptor = entry.index,
                        "no {role} pool from stream {id}: {e}"
                    );
                    None
                }
            }
        })
    }

    fn pooled(&mut self) {
        let vertices = match self.first_pool(StreamRole::Vertex, Self::vertices) {
            Some((id, pool)) => {
                debug!(stream = %id, vertices = pool.len(), "vertex pool selected");
                pool
            }
            None => {
                if self.container.models().iter().any(|m| !m.entries.is_empty()) {
                    self.out.diagnostics.warn(Location::File, &Error::NoVertexPool);
                }
                Vec::new()
            }
        };

        let uvs = self
            .first_pool(StreamRole::Uv, Self::uvs)
            .and_then(|(id, pool)| {
                debug!(stream = %id, uvs = pool.len(), "UV pool selected");
                self.pair_uvs(Location::File, pool, vertices.len())
            });

        let container = self.container;
        for (model, entry) in entries(container) {
            let Some(triangles) = self.triangles(model, entry) else {
                continue;
            };
            self.emit(model, entry, vertices.clone(), uvs.clone(), triangles);
        }
    }
}
