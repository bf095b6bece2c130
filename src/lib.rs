// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! bimlens
//!
//! Geometric analysis for BIM viewer scenes: surface area, enclosed volume,
//! bounding-box volume and pairwise clash screening over triangulated meshes.
//! The analysis functions are pure and take every input explicitly, so they
//! run without a rendering context.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod report;

#[cfg(feature = "wasm")]
pub mod ffi;

pub use analysis::{
    analyze_collection, analyze_mesh, bounding_box_volume, check_pairwise_collision,
    detect_all_collisions, mesh_surface_area, mesh_volume, signed_tetrahedron_volume,
    triangle_area, AnalysisReport, CollectionSummary, CollisionKind, CollisionResult,
    CollisionThresholds,
};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, AnalyzerResult};
pub use geometry::{BoundingBox, Geometry, Mesh, Renderable, SceneNode};
pub use report::{CollisionReport, MeasurementReport};

use anyhow::Result;
use std::path::Path;

/// Load a scene, STL file or STL directory and measure every mesh in it
pub fn analyze_path(path: &Path, units: &str) -> Result<(Vec<MeasurementReport>, CollectionSummary)> {
    let nodes = io::load_nodes(path)?;
    let reports = nodes
        .iter()
        .filter_map(SceneNode::as_mesh)
        .map(|mesh| MeasurementReport::from_mesh(mesh, units))
        .collect();
    Ok((reports, analyze_collection(&nodes)))
}
