//! Decoded meshes and their text output.
//!
//! A mesh is written as two delimited blocks:
//!
//! ```text
//! vertex start
//! 0.5 1.0 -2.25 0.0 1.0
//! vertex end
//! index start
//! 0 1 2
//! index end
//! ```
//!
//! Vertex lines carry `u v` only when the mesh has UVs.

use std::io::{self, Write};

use crate::parts::Material;
use crate::resolve::Profile;
use crate::FxHashSet;

/// A vertex position.
pub type Vertex = [f32; 3];

/// A texture coordinate.
pub type TexCoord = [f32; 2];

/// Three vertex indices.
pub type Triangle = [u16; 3];

/// Renderable geometry decoded from one mesh descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedMesh {
    /// Position of the descriptor in its model chunk's table.
    pub descriptor_index: usize,
    /// Origin of the model chunk that declared the descriptor.
    pub model_offset: usize,
    pub material_id: u32,
    /// The material with `material_id`, if the file declares one.
    pub material: Option<Material>,
    pub vertices: Vec<Vertex>,
    /// Parallel to `vertices` when present.
    pub uvs: Option<Vec<TexCoord>>,
    pub triangles: Vec<Triangle>,
}

impl DecodedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Output file name for this mesh.
    pub fn file_name(&self, source: &str, profile: Profile) -> String {
        match profile {
            Profile::PerMesh => format!(
                "{source}_offset_{}_mesh_{}.txt",
                self.model_offset, self.descriptor_index
            ),
            Profile::Pooled => format!("{source}_mesh_{}.txt", self.descriptor_index),
        }
    }

    /// Write the text form of this mesh.
    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "vertex start")?;
        for (n, v) in self.vertices.iter().enumerate() {
            write!(
                out,
                "{} {} {}",
                format_float(v[0]),
                format_float(v[1]),
                format_float(v[2])
            )?;
            if let Some(uv) = self.uvs.as_ref().and_then(|uvs| uvs.get(n)) {
                write!(out, " {} {}", format_float(uv[0]), format_float(uv[1]))?;
            }
            writeln!(out)?;
        }
        writeln!(out, "vertex end")?;

        writeln!(out, "index start")?;
        for t in &self.triangles {
            writeln!(out, "{} {} {}", t[0], t[1], t[2])?;
        }
        writeln!(out, "index end")?;
        Ok(())
    }

    /// Render the text form into a string.
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Output file names for a run of meshes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileNames {
    /// One name per mesh, in mesh order.
    pub names: Vec<String>,
    /// `(mesh index, name it would have had)` for every renamed mesh.
    pub renamed: Vec<(usize, String)>,
}

/// Assign a unique output file name to every mesh.
///
/// A mesh whose profile name is already taken by an earlier mesh is given
/// its per-mesh name instead, which carries the model chunk origin and is
/// unique per descriptor.
pub(crate) fn assign_file_names(source: &str, profile: Profile, meshes: &[DecodedMesh]) -> FileNames {
    let mut taken = FxHashSet::default();
    let mut out = FileNames::default();

    for (n, mesh) in meshes.iter().enumerate() {
        let name = mesh.file_name(source, profile);
        if taken.insert(name.clone()) {
            out.names.push(name);
            continue;
        }

        let fallback = mesh.file_name(source, Profile::PerMesh);
        taken.insert(fallback.clone());
        out.names.push(fallback);
        out.renamed.push((n, name));
    }
    out
}

/// Format a float in shortest round-trip form, keeping `.0` on whole values.
pub fn format_float(value: f32) -> String {
    let mut s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> DecodedMesh {
        DecodedMesh {
            descriptor_index: 2,
            model_offset: 4096,
            vertices: vec![[0.0, 1.0, -0.5], [0.25, 2.0, 3.0], [1.5, -1.0, 0.0]],
            triangles: vec![[0, 1, 2]],
            ..DecodedMesh::default()
        }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f32::NAN), "NaN");
    }

    #[test]
    fn test_text_layout_without_uvs() {
        let text = triangle_mesh().to_text();
        assert_eq!(
            text,
            "vertex start\n\
             0.0 1.0 -0.5\n\
             0.25 2.0 3.0\n\
             1.5 -1.0 0.0\n\
             vertex end\n\
             index start\n\
             0 1 2\n\
             index end\n"
        );
    }

    #[test]
    fn test_text_layout_with_uvs() {
        let mut mesh = triangle_mesh();
        mesh.uvs = Some(vec![[0.0, 1.0], [0.5, 0.5], [1.0, 0.0]]);
        let text = mesh.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "0.0 1.0 -0.5 0.0 1.0");
        assert_eq!(lines[3], "1.5 -1.0 0.0 1.0 0.0");
        assert_eq!(lines.len(), 3 + 2 + 1 + 2);
    }

    #[test]
    fn test_file_names() {
        let mesh = triangle_mesh();
        assert_eq!(
            mesh.file_name("hero.perm.bin", Profile::PerMesh),
            "hero.perm.bin_offset_4096_mesh_2.txt"
        );
        assert_eq!(
            mesh.file_name("hero.perm.bin", Profile::Pooled),
            "hero.perm.bin_mesh_2.txt"
        );
    }

    #[test]
    fn test_pooled_names_from_two_models_stay_distinct() {
        let first = triangle_mesh();
        let second = DecodedMesh {
            model_offset: 8192,
            ..triangle_mesh()
        };
        let meshes = [first.clone(), second, first];

        let names = assign_file_names("hero.perm.bin", Profile::Pooled, &meshes);
        assert_eq!(
            names.names,
            vec![
                "hero.perm.bin_mesh_2.txt",
                "hero.perm.bin_offset_8192_mesh_2.txt",
                "hero.perm.bin_offset_4096_mesh_2.txt",
            ]
        );
        assert_eq!(
            names.renamed,
            vec![
                (1, "hero.perm.bin_mesh_2.txt".to_string()),
                (2, "hero.perm.bin_mesh_2.txt".to_string()),
            ]
        );

        let per_mesh = assign_file_names("hero.perm.bin", Profile::PerMesh, &meshes[..2]);
        assert!(per_mesh.renamed.is_empty());
    }
}
