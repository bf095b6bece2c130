// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON scene files
//!
//! A scene file lists nodes exported from the viewer:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "type": "mesh", "id": "wall-1", "name": "Wall",
//!       "positions": [[0,0,0],[1,0,0],[0,1,0]], "indices": [0,1,2],
//!       "position": [0,0,0], "rotation": [0,0,90], "scale": [1,1,1] },
//!     { "type": "mesh", "id": "door-3", "stl": "door.stl" },
//!     { "type": "group", "id": "storey-1" }
//!   ]
//! }
//! ```
//!
//! `rotation` holds roll/pitch/yaw angles in degrees. `stl` paths are relative
//! to the scene file.

use super::ensure_unique_ids;
use super::stl::load_stl_geometry;
use crate::error::AnalyzerError;
use crate::geometry::{Geometry, Mesh, NodeKind, SceneNode};
use anyhow::{Context, Result};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSpec {
    Mesh(MeshSpec),
    Group { id: String },
    Light { id: String },
    Helper { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<[f64; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stl: Option<PathBuf>,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl MeshSpec {
    fn geometry(&self, base_dir: &Path) -> Result<Option<Geometry>> {
        match (&self.positions, &self.stl) {
            (Some(_), Some(_)) => Err(AnalyzerError::unsupported_input(format!(
                "mesh '{}' sets both inline positions and an stl path",
                self.id
            ))
            .into()),
            (Some(positions), None) => {
                let positions = positions.iter().map(|&p| Point3::from(p)).collect();
                let geometry = match &self.indices {
                    Some(indices) => Geometry::indexed(positions, indices.clone())
                        .with_context(|| format!("Invalid indices for mesh '{}'", self.id))?,
                    None => Geometry::from_positions(positions),
                };
                Ok(Some(geometry))
            }
            (None, Some(stl)) => load_stl_geometry(&base_dir.join(stl)).map(Some),
            (None, None) => Ok(None),
        }
    }

    fn into_mesh(self, base_dir: &Path) -> Result<Mesh> {
        let mesh = match self.geometry(base_dir)? {
            Some(geometry) => Mesh::new(self.id, geometry),
            None => Mesh::without_geometry(self.id),
        };
        let [roll, pitch, yaw] = self.rotation.map(f64::to_radians);
        let mesh = mesh
            .with_position(Vector3::from(self.position))
            .with_rotation(UnitQuaternion::from_euler_angles(roll, pitch, yaw))
            .with_scale(Vector3::from(self.scale));

        Ok(match self.name {
            Some(name) => mesh.with_name(name),
            None => mesh,
        })
    }
}

impl SceneFile {
    /// Resolve specs into scene nodes; `base_dir` anchors relative STL paths.
    /// Node ids must be unique within the file.
    pub fn into_nodes(self, base_dir: &Path) -> Result<Vec<SceneNode>> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|spec| {
                Ok(match spec {
                    NodeSpec::Mesh(mesh) => SceneNode::Mesh(mesh.into_mesh(base_dir)?),
                    NodeSpec::Group { id } => SceneNode::other(id, NodeKind::Group),
                    NodeSpec::Light { id } => SceneNode::other(id, NodeKind::Light),
                    NodeSpec::Helper { id } => SceneNode::other(id, NodeKind::Helper),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ensure_unique_ids(&nodes)?;
        Ok(nodes)
    }
}

pub fn parse_scene(source: &str, base_dir: &Path) -> Result<Vec<SceneNode>> {
    let scene: SceneFile = serde_json::from_str(source).context("Failed to parse scene JSON")?;
    scene.into_nodes(base_dir)
}

pub fn load_scene(path: &Path) -> Result<Vec<SceneNode>> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let nodes = parse_scene(&source, base_dir).with_context(|| format!("Failed to load scene {}", path.display()))?;

    tracing::info!(path = %path.display(), nodes = nodes.len(), "Loaded scene");
    Ok(nodes)
}
