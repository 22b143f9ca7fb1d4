//! Container walking and file access.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, debug_span, trace};

use crate::chunk::{Chunk, ChunkKind, ChunkWalker};
use crate::descriptor::ModelChunk;
use crate::error::Error;
use crate::mesh::assign_file_names;
use crate::parts::{Material, Skeleton};
use crate::report::{DecodeReport, DecodeStats, Diagnostic, Diagnostics, Location};
use crate::resolve::{resolve, DecodeOptions};
use crate::stream::{StreamRecord, StreamTable, STREAM_HEADER_WORDS};
use crate::{FxHashMap, Result};

/// The result of one walk over a container buffer.
///
/// Holds everything the chunk handlers collected. Descriptor resolution
/// happens later, in [`Container::decode`].
#[derive(Debug)]
pub struct Container<'a> {
    data: &'a [u8],
    streams: StreamTable,
    models: Vec<ModelChunk>,
    materials: FxHashMap<u32, Material>,
    skeletons: Vec<Skeleton>,
    stats: DecodeStats,
    diagnostics: Diagnostics,
}

impl<'a> Container<'a> {
    /// Walk a container buffer.
    ///
    /// Never fails: chunks that cannot be read are recorded as diagnostics
    /// and the walk moves on, or stops at a malformed header.
    pub fn parse(data: &'a [u8]) -> Self {
        let mut container = Self {
            data,
            streams: StreamTable::new(),
            models: Vec::new(),
            materials: FxHashMap::default(),
            skeletons: Vec::new(),
            stats: DecodeStats::default(),
            diagnostics: Diagnostics::default(),
        };

        let mut walker = ChunkWalker::new(data);
        loop {
            let offset = walker.position();
            let Some(item) = walker.next() else {
                break;
            };
            match item {
                Ok(chunk) => {
                    container.stats.chunks += 1;
                    container.dispatch(&chunk);
                }
                Err(e) => container.diagnostics.error(Location::Chunk { offset }, &e),
            }
        }

        debug!(
            bytes = data.len(),
            chunks = container.stats.chunks,
            streams = container.streams.len(),
            models = container.models.len(),
            "container walk finished"
        );
        container
    }

    fn dispatch(&mut self, chunk: &Chunk<'a>) {
        let result = match chunk.kind() {
            ChunkKind::StreamDeclaration => self.declare_stream(chunk),
            ChunkKind::Model => self.read_model(chunk),
            ChunkKind::Material => self.read_material(chunk),
            ChunkKind::Skeleton => self.read_skeleton(chunk),
            ChunkKind::Unknown(tag) => {
                self.stats.unknown_chunks += 1;
                trace!(offset = chunk.offset, "ignoring chunk with tag 0x{tag:08X}");
                Ok(())
            }
        };

        if let Err(e) = result {
            self.diagnostics
                .error(Location::Chunk { offset: chunk.offset }, &e);
        }
    }

    fn declare_stream(&mut self, chunk: &Chunk<'a>) -> Result<()> {
        let mut reader = chunk.reader()?;
        let header = reader.read_u32_array::<STREAM_HEADER_WORDS>()?;
        let record = StreamRecord::new(header, reader.tell());

        self.stats.stream_declarations += 1;
        if self.streams.insert(chunk.stream_id(), record).is_some() {
            self.stats.shadowed_streams += 1;
        }
        Ok(())
    }

    fn read_model(&mut self, chunk: &Chunk<'a>) -> Result<()> {
        let model = ModelChunk::read(chunk)?;
        for (index, e) in &model.failed {
            self.diagnostics.error(
                Location::Mesh {
                    model_offset: model.origin,
                    descriptor: *index,
                },
                e,
            );
        }

        self.stats.model_chunks += 1;
        self.stats.descriptors += model.declared_count();
        self.models.push(model);
        Ok(())
    }

    fn read_material(&mut self, chunk: &Chunk<'a>) -> Result<()> {
        let id = chunk.stream_id().value();
        let (material, truncated) = Material::read(id, &mut chunk.reader()?)?;
        if let Some(e) = truncated {
            self.diagnostics.warn(Location::Chunk { offset: chunk.offset }, &e);
        }

        self.stats.material_chunks += 1;
        if self.materials.insert(id, material).is_some() {
            debug!(material = id, "material redeclared, later declaration wins");
        }
        Ok(())
    }

    fn read_skeleton(&mut self, chunk: &Chunk<'a>) -> Result<()> {
        let id = chunk.stream_id().value();
        let skeleton = Skeleton::read(chunk.origin, id, &mut chunk.reader()?)?;

        self.stats.skeleton_chunks += 1;
        self.skeletons.push(skeleton);
        Ok(())
    }

    /// The underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn streams(&self) -> &StreamTable {
        &self.streams
    }

    /// Model chunks in file order.
    pub fn models(&self) -> &[ModelChunk] {
        &self.models
    }

    pub fn material(&self, id: u32) -> Option<&Material> {
        self.materials.get(&id)
    }

    /// Materials sorted by ID.
    pub fn materials(&self) -> Vec<&Material> {
        let mut materials: Vec<&Material> = self.materials.values().collect();
        materials.sort_by_key(|m| m.id);
        materials
    }

    pub fn skeletons(&self) -> &[Skeleton] {
        &self.skeletons
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Diagnostics raised during the walk.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    /// Resolve every descriptor and assemble the report.
    pub fn decode(&self, source: &str, options: &DecodeOptions) -> DecodeReport {
        let resolution = resolve(self, options.profile);

        let mut diagnostics = self.diagnostics.clone();
        diagnostics.extend(resolution.diagnostics);

        let names = assign_file_names(source, options.profile, &resolution.meshes);
        for (n, name) in names.renamed {
            let mesh = &resolution.meshes[n];
            diagnostics.warn(
                Location::Mesh {
                    model_offset: mesh.model_offset,
                    descriptor: mesh.descriptor_index,
                },
                &Error::NameCollision {
                    name,
                    renamed: names.names[n].clone(),
                },
            );
        }

        let mut stats = self.stats;
        stats.meshes = resolution.meshes.len();
        stats.skipped_meshes = resolution.skipped.len();

        DecodeReport {
            source: source.to_string(),
            profile: options.profile,
            meshes: resolution.meshes,
            skipped: resolution.skipped,
            materials: self.materials().into_iter().cloned().collect(),
            skeletons: self.skeletons.clone(),
            diagnostics: diagnostics.into_vec(),
            stats,
        }
    }
}

/// Decode a container buffer in one call.
pub fn decode(source: &str, data: &[u8], options: &DecodeOptions) -> DecodeReport {
    let _span = debug_span!("decode", source, profile = %options.profile).entered();
    let report = Container::parse(data).decode(source, options);
    debug!("{}", report.summary());
    report
}

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// A container file held in memory.
#[derive(Debug)]
pub struct PermFile {
    name: String,
    backing: Backing,
}

impl PermFile {
    /// Open a container file (memory-mapped).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        // Mapping an empty file fails on some platforms.
        let backing = if file.metadata()?.len() == 0 {
            Backing::Owned(Vec::new())
        } else {
            Backing::Mapped(unsafe { Mmap::map(&file)? })
        };

        Ok(Self { name, backing })
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            backing: Backing::Owned(data),
        }
    }

    /// File name, including extensions.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(data) => data,
        }
    }

    /// Walk the file without resolving descriptors.
    pub fn container(&self) -> Container<'_> {
        Container::parse(self.data())
    }

    /// Decode the file.
    pub fn decode(&self, options: &DecodeOptions) -> DecodeReport {
        decode(&self.name, self.data(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContainerBuilder;
    use crate::descriptor::MeshDescriptor;
    use crate::error::ErrorKind;
    use crate::parts::{DIFFUSE_TEXTURE_PROPERTY, SPECULAR_TEXTURE_PROPERTY};
    use crate::report::Severity;
    use crate::resolve::Profile;
    use crate::stream::StreamId;

    const VERTS: u32 = 0x10;
    const UVS: u32 = 0x20;
    const INDICES: u32 = 0x30;

    fn descriptor() -> MeshDescriptor {
        MeshDescriptor::default()
            .with_material(0x77)
            .with_vertex_stream(StreamId(VERTS))
            .with_uv_stream(StreamId(UVS))
            .with_index_stream(StreamId(INDICES))
    }

    fn quad() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]
    }

    fn quad_uvs() -> Vec<[f32; 2]> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
    }

    fn per_mesh(data: &[u8]) -> DecodeReport {
        decode("test.perm.bin", data, &DecodeOptions::default())
    }

    fn pooled(data: &[u8]) -> DecodeReport {
        decode("test.perm.bin", data, &DecodeOptions::new(Profile::Pooled))
    }

    #[test]
    fn test_round_trip_mesh() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .uv_stream(UVS, &quad_uvs(), 8)
            .index_stream(INDICES, &[0, 1, 2, 0, 2, 3])
            .material(0x77, &[(DIFFUSE_TEXTURE_PROPERTY, 0xD1), (SPECULAR_TEXTURE_PROPERTY, 0x5E)])
            .model(1, &[descriptor().with_index_range(0, 2)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.meshes.len(), 1);

        let mesh = &report.meshes[0];
        assert_eq!(mesh.vertices, quad());
        assert_eq!(mesh.uvs.as_deref(), Some(quad_uvs().as_slice()));
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        let material = mesh.material.as_ref().unwrap();
        assert_eq!(material.diffuse_texture_id, Some(0xD1));
        assert_eq!(material.specular_texture_id, Some(0x5E));

        assert_eq!(report.stats.stream_declarations, 3);
        assert_eq!(report.stats.material_chunks, 1);
        assert_eq!(report.stats.meshes, 1);
    }

    #[test]
    fn test_vertex_count_matches_declared_count() {
        let raw: Vec<[i16; 3]> = (0..37).map(|n| [n, -n, 2 * n]).collect();
        let data = ContainerBuilder::new()
            .vertex_stream_fixed(VERTS, &raw)
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        let mesh = &report.meshes[0];
        assert_eq!(mesh.vertex_count(), 37);
        assert_eq!(mesh.vertices[2], [2.0 / 16384.0, -2.0 / 16384.0, 4.0 / 16384.0]);
    }

    #[test]
    fn test_uv_count_mismatch_drops_uvs() {
        let vertices: Vec<[f32; 3]> = (0..10).map(|n| [n as f32, 0.0, 0.0]).collect();
        let uvs = vec![[0.5, 0.5]; 8];
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &vertices)
            .uv_stream(UVS, &uvs, 4)
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        let mesh = &report.meshes[0];
        assert_eq!(mesh.vertex_count(), 10);
        assert!(mesh.uvs.is_none());

        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::CountMismatch);
        assert!(warnings[0].message.contains("UV count 8"));
    }

    #[test]
    fn test_index_slice() {
        let indices: Vec<u16> = (0..12).collect();
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &indices)
            .model(
                1,
                &[
                    descriptor().with_index_range(3, 2),
                    descriptor().with_index_range(9, 2),
                ],
            )
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.meshes.len(), 2);
        assert_eq!(report.meshes[0].triangles, vec![[3, 4, 5], [6, 7, 8]]);

        // 9 + 2 * 3 runs past the 12 decoded indices.
        assert!(report.meshes[1].triangles.is_empty());
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::CountMismatch);
        assert_eq!(
            errors[0].location,
            Location::Mesh {
                model_offset: report.meshes[1].model_offset,
                descriptor: 1
            }
        );
    }

    #[test]
    fn test_missing_index_stream_skips_mesh() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &[0, 1, 2])
            .model(
                1,
                &[
                    descriptor().with_index_stream(StreamId(0xDEAD)).with_index_range(0, 1),
                    descriptor().with_index_range(0, 1),
                ],
            )
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.meshes.len(), 1);
        assert_eq!(report.meshes[0].descriptor_index, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].descriptor_index, 0);
        assert_eq!(report.skipped[0].kind, ErrorKind::StreamNotFound);
    }

    #[test]
    fn test_missing_vertex_stream_keeps_indices() {
        let data = ContainerBuilder::new()
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        let mesh = &report.meshes[0];
        assert!(mesh.vertices.is_empty());
        assert!(mesh.uvs.is_none());
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert!(mesh.material.is_none());
        assert_eq!(report.warnings().count(), 2);
        assert!(report.warnings().all(|w| w.kind == ErrorKind::StreamNotFound));
    }

    #[test]
    fn test_unsupported_stride_is_warning() {
        let data = ContainerBuilder::new()
            .stream(VERTS, 20, 1, &[0u8; 20])
            .index_stream(INDICES, &[0, 0, 0])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.meshes.len(), 1);
        assert!(report.meshes[0].vertices.is_empty());
        assert!(report.has_kind(ErrorKind::UnsupportedEncoding));
    }

    #[test]
    fn test_unknown_chunk_does_not_disturb_later_chunks() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .raw_chunk(0xCDBF_A090, 99, vec![0xFF; 123])
            .preamble(7)
            .slack(9)
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.stats.unknown_chunks, 1);
        assert_eq!(report.stats.chunks, 4);
        assert_eq!(report.meshes[0].vertex_count(), 4);
        assert_eq!(report.meshes[0].triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_later_stream_declaration_wins() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &[[9.0, 9.0, 9.0]])
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.meshes[0].vertices, quad());
        assert_eq!(report.stats.shadowed_streams, 1);
    }

    #[test]
    fn test_streams_declared_after_descriptor() {
        let before = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .uv_stream(UVS, &quad_uvs(), 4)
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();
        let after = ContainerBuilder::new()
            .model(1, &[descriptor().with_index_range(0, 1)])
            .index_stream(INDICES, &[0, 1, 2])
            .uv_stream(UVS, &quad_uvs(), 4)
            .vertex_stream_f32(VERTS, &quad())
            .build()
            .unwrap();

        for profile in Profile::ALL {
            let options = DecodeOptions::new(profile);
            let a = decode("x", &before, &options);
            let b = decode("x", &after, &options);
            assert_eq!(a.meshes.len(), 1);
            assert_eq!(a.meshes[0].vertices, b.meshes[0].vertices);
            assert_eq!(a.meshes[0].uvs, b.meshes[0].uvs);
            assert_eq!(a.meshes[0].triangles, b.meshes[0].triangles);
            assert!(b.diagnostics.is_empty());
        }
    }

    #[test]
    fn test_malformed_length_keeps_earlier_results() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .raw_chunk(0x1234, 0, vec![0; 8])
            .declared_length(u32::MAX)
            .build()
            .unwrap();

        let report = per_mesh(&data);
        assert_eq!(report.meshes.len(), 1);
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MalformedHeader);
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_pooled_meshes_share_first_pool() {
        let second: Vec<[f32; 3]> = vec![[5.0, 5.0, 5.0]; 6];
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .vertex_stream_f32(0x11, &second)
            .uv_stream(UVS, &quad_uvs(), 4)
            .index_stream(INDICES, &[0, 1, 2, 2, 3, 0])
            .model(
                1,
                &[
                    // Unresolvable vertex stream: the pool comes from the next one.
                    descriptor()
                        .with_vertex_stream(StreamId(0xBAD))
                        .with_index_range(0, 1),
                    descriptor().with_index_range(3, 1),
                    descriptor()
                        .with_vertex_stream(StreamId(0x11))
                        .with_index_range(0, 2),
                ],
            )
            .build()
            .unwrap();

        let report = pooled(&data);
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.meshes.len(), 3);
        for mesh in &report.meshes {
            assert_eq!(mesh.vertices, quad());
            assert_eq!(mesh.uvs.as_deref(), Some(quad_uvs().as_slice()));
        }
        assert_eq!(report.meshes[1].triangles, vec![[2, 3, 0]]);
        assert_eq!(report.meshes[2].triangle_count(), 2);
        assert_eq!(report.mesh_file_names()[2], "test.perm.bin_mesh_2.txt");
    }

    #[test]
    fn test_pooled_meshes_of_two_models_get_distinct_files() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &[0, 1, 2, 2, 1, 0])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .model(2, &[descriptor().with_index_range(3, 1)])
            .build()
            .unwrap();

        let report = pooled(&data);
        assert_eq!(report.meshes.len(), 2);
        let names = report.mesh_file_names();
        assert_eq!(names[0], "test.perm.bin_mesh_0.txt");
        assert_eq!(
            names[1],
            format!(
                "test.perm.bin_offset_{}_mesh_0.txt",
                report.meshes[1].model_offset
            )
        );

        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::NameCollision);

        let dir = std::env::temp_dir().join(format!("xiasi-pooled-{}", std::process::id()));
        let written = report.write_meshes(&dir).unwrap();
        assert_ne!(written[0], written[1]);
        let second = std::fs::read_to_string(&written[1]).unwrap();
        assert!(second.ends_with("index start\n2 1 0\nindex end\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pooled_uv_mismatch_drops_uvs() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .uv_stream(UVS, &[[0.0, 0.0]; 3], 4)
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = pooled(&data);
        assert!(report.meshes[0].uvs.is_none());
        assert_eq!(report.meshes[0].vertex_count(), 4);
        let warning = report.warnings().next().unwrap();
        assert_eq!(warning.kind, ErrorKind::CountMismatch);
        assert_eq!(warning.location, Location::File);
    }

    #[test]
    fn test_pooled_without_vertex_pool() {
        let data = ContainerBuilder::new()
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();

        let report = pooled(&data);
        assert_eq!(report.meshes.len(), 1);
        assert!(report.meshes[0].vertices.is_empty());
        assert!(report.has_kind(ErrorKind::StreamNotFound));
    }

    #[test]
    fn test_skeleton_and_material_records() {
        let data = ContainerBuilder::new()
            .material(3, &[(DIFFUSE_TEXTURE_PROPERTY, 1)])
            .material(3, &[(DIFFUSE_TEXTURE_PROPERTY, 2)])
            .material(1, &[])
            .skeleton(8, &[("pelvis", [0, 0, 0, 16384])])
            .build()
            .unwrap();

        let container = Container::parse(&data);
        assert_eq!(container.material(3).unwrap().diffuse_texture_id, Some(2));
        let ids: Vec<u32> = container.materials().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let skeleton = &container.skeletons()[0];
        assert_eq!(skeleton.id, 8);
        assert_eq!(skeleton.bones[0].name, "pelvis");
        assert_eq!(skeleton.bones[0].rotation[3], 1.0);
    }

    #[test]
    fn test_truncated_material_keeps_read_slots() {
        let mut data = ContainerBuilder::new()
            .material(3, &[(DIFFUSE_TEXTURE_PROPERTY, 1)])
            .build()
            .unwrap();
        // Property count lives in word 4 of the payload header.
        let chunk = ChunkWalker::new(&data).next().unwrap().unwrap();
        let count_at = chunk.payload_offset + 16;
        data[count_at..count_at + 4].copy_from_slice(&50u32.to_le_bytes());

        let container = Container::parse(&data);
        let material = container.material(3).unwrap();
        assert_eq!(material.diffuse_texture_id, Some(1));
        assert_eq!(material.properties_read, 1);
        assert_eq!(container.diagnostics().len(), 1);
        assert_eq!(container.diagnostics()[0].kind, ErrorKind::OutOfBounds);
        assert_eq!(container.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_perm_file_open() {
        let data = ContainerBuilder::new()
            .vertex_stream_f32(VERTS, &quad())
            .index_stream(INDICES, &[0, 1, 2])
            .model(1, &[descriptor().with_index_range(0, 1)])
            .build()
            .unwrap();
        let path = std::env::temp_dir().join(format!("xiasi-open-{}.perm.bin", std::process::id()));
        std::fs::write(&path, &data).unwrap();

        let file = PermFile::open(&path).unwrap();
        assert!(file.name().ends_with(".perm.bin"));
        assert_eq!(file.data(), data.as_slice());
        let report = file.decode(&DecodeOptions::default());
        assert_eq!(report.source, file.name());
        assert_eq!(report.meshes.len(), 1);

        let _ = std::fs::remove_file(&path);
        assert!(PermFile::open(&path).is_err());
    }

    #[test]
    fn test_empty_input() {
        let report = PermFile::from_bytes("empty.perm.bin", Vec::new()).decode(&DecodeOptions::default());
        assert!(report.meshes.is_empty());
        assert!(report.diagnostics.is_empty());
    }
}
