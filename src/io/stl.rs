// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import

use crate::geometry::{Geometry, Mesh};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use stl_io::read_stl;

/// Read an ASCII or binary STL file into indexed geometry
pub fn load_stl_geometry(path: &Path) -> Result<Geometry> {
    let file = File::open(path).with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let stl = read_stl(&mut reader).with_context(|| format!("Failed to read STL file: {}", path.display()))?;

    let positions = stl
        .vertices
        .iter()
        .map(|v| Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])))
        .collect();
    let indices = stl.faces.iter().flat_map(|face| face.vertices).collect();

    tracing::debug!(
        path = %path.display(),
        vertices = stl.vertices.len(),
        triangles = stl.faces.len(),
        "Loaded STL"
    );

    Geometry::indexed(positions, indices).with_context(|| format!("Corrupt STL indices in {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Import an STL file as a mesh whose id and name are the file stem
pub fn import_stl(path: &Path) -> Result<Mesh> {
    let stem = file_stem(path);
    import_stl_with_id(path, stem)
}

/// Import an STL file under an explicit id; the name is still the file stem
pub fn import_stl_with_id(path: &Path, id: impl Into<String>) -> Result<Mesh> {
    let geometry = load_stl_geometry(path)?;
    Ok(Mesh::new(id, geometry).with_name(file_stem(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{mesh_surface_area, mesh_volume};
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `geometry` as an ASCII STL
    fn write_ascii_stl(geometry: &Geometry, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "solid test")?;
        for t in geometry.triangles() {
            writeln!(out, "  facet normal 0 0 0")?;
            writeln!(out, "    outer loop")?;
            for p in [t.a, t.b, t.c] {
                writeln!(out, "      vertex {} {} {}", p.x, p.y, p.z)?;
            }
            writeln!(out, "    endloop")?;
            writeln!(out, "  endfacet")?;
        }
        writeln!(out, "endsolid test")
    }

    #[test]
    fn test_import_ascii_cube() {
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();
        write_ascii_stl(&Primitive::unit_cube().to_geometry(), &mut file).unwrap();
        file.flush().unwrap();

        let mesh = import_stl(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(mesh_surface_area(&mesh), 6.0, epsilon = 1e-5);
        assert_relative_eq!(mesh_volume(&mesh), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = import_stl(Path::new("/nonexistent/part.stl")).unwrap_err();
        assert!(err.to_string().contains("Failed to open STL file"));
    }
}
