// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surface area, volume and bounding-box measurements

use crate::geometry::{BoundingBox, Geometry, Renderable, SceneNode};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Area of the triangle `v1 v2 v3`; zero when the points are collinear
pub fn triangle_area(v1: &Point3<f64>, v2: &Point3<f64>, v3: &Point3<f64>) -> f64 {
    let edge1 = v2 - v1;
    let edge2 = v3 - v1;
    edge1.cross(&edge2).norm() / 2.0
}

/// Signed volume of the tetrahedron spanned by the origin and the triangle.
///
/// Summed over a closed surface this is the enclosed volume (divergence
/// theorem). Swapping any two vertices flips the sign.
pub fn signed_tetrahedron_volume(v1: &Point3<f64>, v2: &Point3<f64>, v3: &Point3<f64>) -> f64 {
    v1.coords.dot(&v2.coords.cross(&v3.coords)) / 6.0
}

/// Total triangle area scaled by `|sx * sy|`.
///
/// The scale factor is exact only for axis-aligned scaling of faces lying in
/// the XY plane; it mirrors how the viewer reports areas.
pub fn mesh_surface_area<R: Renderable + ?Sized>(mesh: &R) -> f64 {
    let Some(geometry) = mesh.geometry() else {
        return 0.0;
    };
    let scale = mesh.scale();
    let area: f64 = geometry
        .triangles()
        .map(|t| triangle_area(&t.a, &t.b, &t.c))
        .sum();

    area * (scale.x * scale.y).abs()
}

/// Enclosed volume of a closed, consistently wound mesh, scaled by
/// `sx * sy * sz`. Open or inconsistently wound meshes give a meaningless but
/// still non-negative number.
pub fn mesh_volume<R: Renderable + ?Sized>(mesh: &R) -> f64 {
    let Some(geometry) = mesh.geometry() else {
        return 0.0;
    };
    let scale = mesh.scale();
    let volume: f64 = geometry
        .triangles()
        .map(|t| signed_tetrahedron_volume(&t.a, &t.b, &t.c))
        .sum();

    (volume * scale.x * scale.y * scale.z).abs()
}

/// Volume of the world-space axis-aligned bounding box
pub fn bounding_box_volume<R: Renderable + ?Sized>(mesh: &R) -> f64 {
    mesh.world_bounding_box().volume()
}

/// Volume of the axis-aligned bounding box after applying `transform`
pub fn bounding_box_volume_with<R: Renderable + ?Sized>(mesh: &R, transform: &Matrix4<f64>) -> f64 {
    match mesh.geometry() {
        Some(geometry) => BoundingBox::from_transformed_points(geometry.positions(), transform).volume(),
        None => 0.0,
    }
}

/// Measurements of a single mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub surface_area: f64,
    pub volume: f64,
    pub bounding_box_volume: f64,
}

pub fn analyze_mesh<R: Renderable + ?Sized>(mesh: &R) -> AnalysisReport {
    AnalysisReport {
        surface_area: mesh_surface_area(mesh),
        volume: mesh_volume(mesh),
        bounding_box_volume: bounding_box_volume(mesh),
    }
}

/// Totals over a collection of scene nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub total_area: f64,
    pub total_volume: f64,
    /// Every input entry, measured or not
    pub count: usize,
    /// Entries that were meshes and contributed to the totals
    pub mesh_count: usize,
}

/// Sum area and volume over the mesh entries; other entries are counted in
/// `count` but contribute nothing.
pub fn analyze_collection<'a>(nodes: impl IntoIterator<Item = &'a SceneNode>) -> CollectionSummary {
    let mut summary = CollectionSummary {
        total_area: 0.0,
        total_volume: 0.0,
        count: 0,
        mesh_count: 0,
    };

    for node in nodes {
        summary.count += 1;
        if let Some(mesh) = node.as_mesh() {
            summary.total_area += mesh_surface_area(mesh);
            summary.total_volume += mesh_volume(mesh);
            summary.mesh_count += 1;
        }
    }

    tracing::debug!(
        count = summary.count,
        mesh_count = summary.mesh_count,
        "Analyzed collection"
    );
    summary
}

/// Check whether every edge is shared by exactly two triangles.
///
/// Vertices are matched by exact position so duplicated soup vertices still
/// close up. Callers can use this to decide whether a volume is meaningful.
pub fn is_watertight(geometry: &Geometry) -> bool {
    if geometry.is_empty() {
        return false;
    }

    let key = |p: &Point3<f64>| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
    let mut edge_count: HashMap<([u64; 3], [u64; 3]), usize> = HashMap::new();

    for triangle in geometry.triangles() {
        let corners = [key(&triangle.a), key(&triangle.b), key(&triangle.c)];
        for i in 0..3 {
            let (v1, v2) = (corners[i], corners[(i + 1) % 3]);
            let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count.values().all(|&count| count == 2)
}
