//! Decode reports and diagnostics.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, warn};
use xiasi_common::TreeNode;

use crate::error::{Error, ErrorKind};
use crate::mesh::{assign_file_names, DecodedMesh};
use crate::parts::{Material, Skeleton};
use crate::resolve::Profile;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Part of a unit was dropped; the rest was kept.
    Warning,
    /// A whole unit was lost.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Where a diagnostic applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "scope", rename_all = "lowercase"))]
pub enum Location {
    File,
    Chunk { offset: usize },
    Mesh { model_offset: usize, descriptor: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File => f.write_str("file"),
            Location::Chunk { offset } => write!(f, "chunk at {offset}"),
            Location::Mesh {
                model_offset,
                descriptor,
            } => write!(f, "mesh {descriptor} of model at {model_offset}"),
        }
    }
}

/// A problem found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic from an error.
    pub fn new(severity: Severity, location: Location, err: &Error) -> Self {
        Self {
            severity,
            location,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn warning(location: Location, err: &Error) -> Self {
        Self::new(Severity::Warning, location, err)
    }

    pub fn error(location: Location, err: &Error) -> Self {
        Self::new(Severity::Error, location, err)
    }

    /// Emit this diagnostic through `tracing`.
    pub fn log(&self) {
        match self.severity {
            Severity::Warning => warn!(location = %self.location, kind = %self.kind, "{}", self.message),
            Severity::Error => error!(location = %self.location, kind = %self.kind, "{}", self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

/// Collects diagnostics, logging each as it arrives.
#[derive(Debug, Clone, Default)]
pub(crate) struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.0.push(diagnostic);
    }

    pub(crate) fn warn(&mut self, location: Location, err: &Error) {
        self.push(Diagnostic::warning(location, err));
    }

    pub(crate) fn error(&mut self, location: Location, err: &Error) {
        self.push(Diagnostic::error(location, err));
    }

    pub(crate) fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub(crate) fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

/// A descriptor that produced no mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedMesh {
    pub model_offset: usize,
    pub descriptor_index: usize,
    pub kind: ErrorKind,
    pub reason: String,
}

/// Counters collected over one decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeStats {
    /// Chunks framed successfully.
    pub chunks: usize,
    pub unknown_chunks: usize,
    pub stream_declarations: usize,
    /// Declarations replaced by a later one with the same ID.
    pub shadowed_streams: usize,
    pub model_chunks: usize,
    pub descriptors: usize,
    pub material_chunks: usize,
    pub skeleton_chunks: usize,
    pub meshes: usize,
    pub skipped_meshes: usize,
}

/// Everything decoded from one container.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// Input file name.
    pub source: String,
    pub profile: Profile,
    /// Emitted meshes in file order.
    pub meshes: Vec<DecodedMesh>,
    pub skipped: Vec<SkippedMesh>,
    /// Materials sorted by ID.
    pub materials: Vec<Material>,
    pub skeletons: Vec<Skeleton>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: DecodeStats,
}

impl DecodeReport {
    /// Iterate over warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Iterate over error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Check if any diagnostic has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    /// Look up a material by ID.
    pub fn material(&self, id: u32) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// One-line summary of what was emitted and skipped.
    pub fn summary(&self) -> String {
        let with_uvs = self.meshes.iter().filter(|m| m.has_uvs()).count();
        format!(
            "{}: {} meshes ({} with UVs), {} skipped, {} materials, {} skeletons, {} warnings, {} errors",
            self.source,
            self.meshes.len(),
            with_uvs,
            self.skipped.len(),
            self.materials.len(),
            self.skeletons.len(),
            self.warnings().count(),
            self.errors().count(),
        )
    }

    /// Output file names of the meshes, in mesh order.
    ///
    /// Names are unique within the report; see [`Error::NameCollision`].
    pub fn mesh_file_names(&self) -> Vec<String> {
        assign_file_names(&self.source, self.profile, &self.meshes).names
    }

    /// Write every mesh as a text file into `dir`, creating it if needed.
    ///
    /// Returns the written paths in mesh order.
    pub fn write_meshes(&self, dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.meshes.len());
        for (mesh, name) in self.meshes.iter().zip(self.mesh_file_names()) {
            let path = dir.join(name);
            let mut out = BufWriter::new(File::create(&path)?);
            mesh.write_text(&mut out)?;
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }

    /// Condensed, serializable view without geometry.
    pub fn digest(&self) -> ReportDigest {
        ReportDigest {
            source: self.source.clone(),
            profile: self.profile,
            meshes: self
                .meshes
                .iter()
                .zip(self.mesh_file_names())
                .map(|(m, file_name)| MeshSummary {
                    file_name,
                    model_offset: m.model_offset,
                    descriptor_index: m.descriptor_index,
                    material_id: m.material_id,
                    vertices: m.vertex_count(),
                    triangles: m.triangle_count(),
                    has_uvs: m.has_uvs(),
                })
                .collect(),
            skipped: self.skipped.clone(),
            materials: self.materials.clone(),
            skeletons: self.skeletons.clone(),
            diagnostics: self.diagnostics.clone(),
            stats: self.stats,
        }
    }

    /// Render the report as a display tree.
    pub fn to_tree(&self) -> TreeNode {
        let meshes = TreeNode::new(format!("Meshes ({})", self.meshes.len())).children(
            self.meshes.iter().zip(self.mesh_file_names()).map(|(m, name)| {
                let uvs = match &m.uvs {
                    Some(uvs) => format!("UVs: {}", uvs.len()),
                    None => "UVs: none".to_string(),
                };
                let material = match &m.material {
                    Some(_) => format!("Material: 0x{:08X}", m.material_id),
                    None => format!("Material: 0x{:08X} (not declared)", m.material_id),
                };
                TreeNode::new(name)
                    .leaf(format!("Vertices: {}", m.vertex_count()))
                    .leaf(uvs)
                    .leaf(format!("Triangles: {}", m.triangle_count()))
                    .leaf(material)
            }),
        );

        let skipped = TreeNode::new(format!("Skipped ({})", self.skipped.len())).children(
            self.skipped.iter().map(|s| {
                TreeNode::new(format!(
                    "mesh {} of model at {}: {}",
                    s.descriptor_index, s.model_offset, s.reason
                ))
            }),
        );

        let materials = TreeNode::new(format!("Materials ({})", self.materials.len())).children(
            self.materials.iter().map(|m| {
                let mut node = TreeNode::new(format!("Material 0x{:08X}", m.id));
                if let Some(id) = m.diffuse_texture_id {
                    node = node.leaf(format!("Diffuse: 0x{id:08X}"));
                }
                if let Some(id) = m.specular_texture_id {
                    node = node.leaf(format!("Specular: 0x{id:08X}"));
                }
                node
            }),
        );

        let skeletons = TreeNode::new(format!("Skeletons ({})", self.skeletons.len())).children(
            self.skeletons.iter().map(|s| {
                TreeNode::new(format!("Skeleton at {} ({} bones)", s.offset, s.bones.len()))
                    .children(s.bones.iter().map(|b| {
                        let [x, y, z, w] = b.rotation;
                        TreeNode::new(format!("{} [{x}, {y}, {z}, {w}]", b.name))
                    }))
            }),
        );

        let diagnostics = TreeNode::new(format!("Diagnostics ({})", self.diagnostics.len()))
            .children(self.diagnostics.iter().map(|d| TreeNode::new(d.to_string())));

        TreeNode::new(format!("{} ({})", self.source, self.profile))
            .child(meshes)
            .child(skipped)
            .child(materials)
            .child(skeletons)
            .child(diagnostics)
    }
}

/// Geometry-free summary of one mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshSummary {
    pub file_name: String,
    pub model_offset: usize,
    pub descriptor_index: usize,
    pub material_id: u32,
    pub vertices: usize,
    pub triangles: usize,
    pub has_uvs: bool,
}

/// Geometry-free view of a [`DecodeReport`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportDigest {
    pub source: String,
    pub profile: Profile,
    pub meshes: Vec<MeshSummary>,
    pub skipped: Vec<SkippedMesh>,
    pub materials: Vec<Material>,
    pub skeletons: Vec<Skeleton>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: DecodeStats,
}
