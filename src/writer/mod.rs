use anyhow::{Context, Result};
use glam::DVec3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mesh::Mesh;

/// Fractional digits written for coordinates.
const DEFAULT_PRECISION: usize = 6;

/// Wavefront OBJ writer.
///
/// Emits one `v x y z` line per vertex in insertion order, followed by one
/// `f i j k` line per triangle with 1-based indices. No normals or texture
/// coordinates are written.
#[derive(Debug, Clone)]
pub struct ObjWriter {
    precision: usize,
}

impl Default for ObjWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjWriter {
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    pub fn export_text(&self, mesh: &Mesh) -> String {
        let mut text = String::with_capacity(mesh.vertex_count() * 40 + mesh.face_count() * 24);
        for v in mesh.vertices() {
            text.push_str(&self.vertex_line(v));
        }
        for face in mesh.faces() {
            text.push_str(&face_line(face));
        }
        text
    }

    pub fn write_to<W: Write>(&self, mesh: &Mesh, out: &mut W) -> std::io::Result<()> {
        for v in mesh.vertices() {
            out.write_all(self.vertex_line(v).as_bytes())?;
        }
        for face in mesh.faces() {
            out.write_all(face_line(face).as_bytes())?;
        }
        out.flush()
    }

    fn vertex_line(&self, v: &DVec3) -> String {
        format!(
            "v {:.p$} {:.p$} {:.p$}\n",
            v.x,
            v.y,
            v.z,
            p = self.precision
        )
    }

    pub fn write(&self, mesh: &Mesh, output_path: &Path) -> Result<()> {
        tracing::info!(
            "Writing OBJ: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.face_count()
        );

        let file = File::create(output_path)
            .with_context(|| format!("Cannot write to file: {}", output_path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_to(mesh, &mut out)
            .with_context(|| format!("Failed to write OBJ data to {}", output_path.display()))?;

        Ok(())
    }
}

/// OBJ indices are 1-based.
fn face_line([a, b, c]: &[u32; 3]) -> String {
    format!("f {} {} {}\n", a + 1, b + 1, c + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshStrip, StripId, StripKind};

    fn sample_mesh() -> Mesh {
        let id = StripId {
            road_id: "1".into(),
            section: 0,
            lane_id: -1,
            kind: StripKind::Lane,
        };
        let columns = [
            (DVec3::new(0.0, -3.5, 0.0), DVec3::new(0.0, 0.0, 0.0)),
            (DVec3::new(10.0, -3.5, 0.25), DVec3::new(10.0, 0.0, 0.25)),
        ];
        let mut mesh = Mesh::new();
        mesh.add_strip(&MeshStrip::from_columns(id, &columns)).unwrap();
        mesh
    }

    #[test]
    fn test_export_text_layout() {
        let text = ObjWriter::new().export_text(&sample_mesh());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "v 0.000000 -3.500000 0.000000",
                "v 0.000000 0.000000 0.000000",
                "v 10.000000 -3.500000 0.250000",
                "v 10.000000 0.000000 0.250000",
                "f 1 3 4",
                "f 1 4 2",
            ]
        );
    }

    #[test]
    fn test_write_matches_export_text() {
        let mesh = sample_mesh();
        let writer = ObjWriter::with_precision(3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        writer.write(&mesh, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, writer.export_text(&mesh));
        assert!(written.starts_with("v 0.000 -3.500 0.000\n"));
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("mesh.obj");
        let err = ObjWriter::new().write(&sample_mesh(), &path).unwrap_err();
        assert!(err.to_string().contains("Cannot write to file"));
    }

    #[test]
    fn test_empty_mesh_writes_nothing() {
        assert_eq!(ObjWriter::new().export_text(&Mesh::new()), "");
    }
}
