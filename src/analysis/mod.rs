// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric analysis over meshes - measurements and collision screening
//!
//! Every function here is pure: inputs are never mutated and nothing is
//! cached between calls, so results are reproducible bit for bit.

mod collision;
mod distance;
mod measure;

pub use collision::{
    bounding_sphere_separation, check_pairwise_collision, check_pairwise_collision_with,
    detect_all_collisions, detect_all_collisions_indexed, detect_all_collisions_parallel,
    detect_all_collisions_with, CollisionKind, CollisionOptions, CollisionResult, CollisionScan,
    CollisionThresholds, NarrowPhase,
};
pub use distance::{measure_distance, path_length, Measurement};
pub use measure::{
    analyze_collection, analyze_mesh, bounding_box_volume, bounding_box_volume_with,
    is_watertight, mesh_surface_area, mesh_volume, signed_tetrahedron_volume, triangle_area,
    AnalysisReport, CollectionSummary,
};
