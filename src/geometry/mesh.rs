// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and scene nodes

use super::BoundingBox;
use crate::error::{AnalyzerError, AnalyzerResult};
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Triangle defined by three points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }
}

/// Vertex buffer with an optional index buffer.
///
/// Indexed geometry reads triangles as consecutive index triples; non-indexed
/// geometry reads consecutive vertex triples. A trailing partial triple is
/// ignored in both cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<Point3<f64>>,
    indices: Option<Vec<usize>>,
}

impl Geometry {
    /// Non-indexed geometry ("triangle soup")
    pub fn from_positions(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Indexed geometry; every index must address an existing vertex
    pub fn indexed(positions: Vec<Point3<f64>>, indices: Vec<usize>) -> AnalyzerResult<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= positions.len()) {
            return Err(AnalyzerError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        Ok(Self {
            positions,
            indices: Some(indices),
        })
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn indices(&self) -> Option<&[usize]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Vertex index triples, synthesized for non-indexed geometry
    pub fn triangle_indices(&self) -> Box<dyn Iterator<Item = [usize; 3]> + '_> {
        match &self.indices {
            Some(indices) => Box::new(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])),
            None => Box::new((0..self.triangle_count()).map(|t| [3 * t, 3 * t + 1, 3 * t + 2])),
        }
    }

    /// Iterate triangles in local (untransformed) coordinates
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangle_indices().map(move |[i, j, k]| {
            Triangle::new(self.positions[i], self.positions[j], self.positions[k])
        })
    }
}

/// Capability the analyzer needs from a scene object.
///
/// Implemented by [`Mesh`]; any scene-node type from a rendering layer can
/// implement it to be measured without copying its buffers.
pub trait Renderable {
    fn id(&self) -> &str;

    fn name(&self) -> Option<&str> {
        None
    }

    /// `None` for objects without geometry; these measure as zero
    fn geometry(&self) -> Option<&Geometry>;

    /// Local non-uniform scale applied to area and volume results
    fn scale(&self) -> Vector3<f64>;

    fn world_transform(&self) -> Matrix4<f64>;

    /// World-space axis-aligned bounds of the transformed vertices
    fn world_bounding_box(&self) -> BoundingBox {
        match self.geometry() {
            Some(geometry) => {
                BoundingBox::from_transformed_points(geometry.positions(), &self.world_transform())
            }
            None => BoundingBox::empty(),
        }
    }
}

/// Mesh instance placed in a scene
#[derive(Debug, Clone)]
pub struct Mesh {
    id: String,
    name: Option<String>,
    geometry: Option<Geometry>,
    position: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    scale: Vector3<f64>,
    parent: Matrix4<f64>,
}

impl Mesh {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::without_geometry(id)
        }
    }

    /// Mesh node whose geometry has not been (or cannot be) loaded
    pub fn without_geometry(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            geometry: None,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            parent: Matrix4::identity(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f64>) -> Self {
        self.scale = scale;
        self
    }

    /// World transform of the parent node this mesh hangs under
    pub fn with_parent_transform(mut self, parent: Matrix4<f64>) -> Self {
        self.parent = parent;
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    /// Local transform: translate * rotate * scale
    pub fn local_transform(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.as_ref().map_or(0, Geometry::vertex_count)
    }

    pub fn triangle_count(&self) -> usize {
        self.geometry.as_ref().map_or(0, Geometry::triangle_count)
    }

    /// Triangles in world space
    pub fn world_triangles(&self) -> Vec<Triangle> {
        let transform = self.world_transform();
        self.geometry
            .iter()
            .flat_map(Geometry::triangles)
            .map(|t| {
                Triangle::new(
                    transform.transform_point(&t.a),
                    transform.transform_point(&t.b),
                    transform.transform_point(&t.c),
                )
            })
            .collect()
    }
}

impl Renderable for Mesh {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    fn scale(&self) -> Vector3<f64> {
        self.scale
    }

    fn world_transform(&self) -> Matrix4<f64> {
        self.parent * self.local_transform()
    }
}

/// Kind of a non-mesh scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Light,
    Helper,
}

/// Entry of a scene collection; only meshes take part in analysis
#[derive(Debug, Clone)]
pub enum SceneNode {
    Mesh(Mesh),
    Other { id: String, kind: NodeKind },
}

impl SceneNode {
    pub fn other(id: impl Into<String>, kind: NodeKind) -> Self {
        Self::Other {
            id: id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Mesh(mesh) => mesh.id(),
            Self::Other { id, .. } => id,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            Self::Other { .. } => None,
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.as_mesh().is_some()
    }
}

impl From<Mesh> for SceneNode {
    fn from(mesh: Mesh) -> Self {
        Self::Mesh(mesh)
    }
}

/// Mesh entries of a collection, in input order
pub fn meshes_of(nodes: &[SceneNode]) -> Vec<&Mesh> {
    nodes.iter().filter_map(SceneNode::as_mesh).collect()
}
