// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - scene loading, STL import and report writing

mod scene;
mod stl;

pub use scene::{load_scene, parse_scene, MeshSpec, NodeSpec, SceneFile};
pub use stl::{import_stl, import_stl_with_id, load_stl_geometry};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::geometry::SceneNode;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Id of an STL found under `root`: its relative path, `/`-separated, without
/// the extension
fn relative_id(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject node lists in which two entries share an id
pub fn ensure_unique_ids(nodes: &[SceneNode]) -> AnalyzerResult<()> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id()) {
            return Err(AnalyzerError::DuplicateId(node.id().to_string()));
        }
    }
    Ok(())
}

/// Load scene nodes from a JSON scene file, a single STL file, or a
/// directory searched recursively for STL files (sorted by path).
///
/// STL files from a directory are identified by their path relative to it,
/// so `a/wall.stl` and `b/wall.stl` stay distinct. Duplicate ids are rejected.
pub fn load_nodes(path: &Path) -> Result<Vec<SceneNode>> {
    if path.is_dir() {
        let mut files: Vec<_> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && has_extension(p, "stl"))
            .collect();
        files.sort();

        let nodes = files
            .iter()
            .map(|file| import_stl_with_id(file, relative_id(path, file)).map(SceneNode::Mesh))
            .collect::<Result<Vec<_>>>()?;
        ensure_unique_ids(&nodes).with_context(|| format!("Ambiguous STL files under {}", path.display()))?;
        return Ok(nodes);
    }

    if has_extension(path, "json") {
        load_scene(path)
    } else if has_extension(path, "stl") {
        Ok(vec![SceneNode::Mesh(import_stl(path)?)])
    } else {
        Err(AnalyzerError::unsupported_input(format!(
            "{} is not a scene (.json), an STL file or a directory",
            path.display()
        ))
        .into())
    }
}

/// Write `value` as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NodeKind, Renderable};
    use tempfile::TempDir;

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = load_nodes(Path::new("model.ifc")).unwrap_err();
        assert!(err.to_string().contains("not a scene"));
    }

    #[test]
    fn test_empty_directory_has_no_nodes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not geometry").unwrap();
        assert!(load_nodes(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_relative_ids() {
        let root = Path::new("/models");
        assert_eq!(relative_id(root, Path::new("/models/wall.stl")), "wall");
        assert_eq!(relative_id(root, Path::new("/models/level2/wall.STL")), "level2/wall");
    }

    #[test]
    fn test_same_stem_in_two_folders_keeps_both() {
        let dir = TempDir::new().unwrap();
        let stl = "solid t\nfacet normal 0 0 0\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n";
        for folder in ["a", "b"] {
            std::fs::create_dir(dir.path().join(folder)).unwrap();
            std::fs::write(dir.path().join(folder).join("wall.stl"), stl).unwrap();
        }

        let nodes = load_nodes(dir.path()).unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["a/wall", "b/wall"]);
        assert_eq!(nodes[0].as_mesh().unwrap().name(), Some("wall"));
    }

    #[test]
    fn test_ensure_unique_ids() {
        let nodes = vec![SceneNode::other("x", NodeKind::Group), SceneNode::other("y", NodeKind::Light)];
        assert!(ensure_unique_ids(&nodes).is_ok());

        let nodes = vec![SceneNode::other("x", NodeKind::Group), SceneNode::other("x", NodeKind::Light)];
        assert!(matches!(ensure_unique_ids(&nodes), Err(AnalyzerError::DuplicateId(id)) if id == "x"));
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
