// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pairwise collision and proximity screening between mesh instances
//!
//! Detection runs in two stages. The broad phase rejects pairs whose
//! world-space bounding boxes do not overlap. The narrow phase estimates the
//! separation of the remaining pairs and classifies it against two thresholds.
//!
//! The default narrow phase treats each box as a sphere whose diameter is the
//! box diagonal: `max(0, |cA - cB| - (|sizeA| + |sizeB|) / 2)`. It is cheap
//! and conservative, so it reports many overlapping-box pairs as intersecting.
//! [`NarrowPhase::Exact`] swaps in a triangle-mesh distance query instead,
//! keeping the same threshold semantics.

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::geometry::{BoundingBox, Mesh, Renderable, SceneNode, BVH};
use nalgebra::Point3;
use parry3d::math::{Isometry, Point as ShapePoint, Real};
use parry3d::shape::TriMesh;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Classification of a reported pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    Intersecting,
    Near,
}

impl CollisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intersecting => "intersecting",
            Self::Near => "near",
        }
    }
}

impl std::fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance thresholds, in scene length units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionThresholds {
    /// Separations strictly below this are intersections
    pub intersection: f64,
    /// Separations strictly below this (and not intersections) are near misses
    pub near: f64,
}

impl Default for CollisionThresholds {
    fn default() -> Self {
        Self {
            intersection: 0.01,
            near: 0.1,
        }
    }
}

impl CollisionThresholds {
    pub fn new(intersection: f64, near: f64) -> Self {
        Self { intersection, near }
    }

    pub fn with_intersection(mut self, intersection: f64) -> Self {
        self.intersection = intersection;
        self
    }

    pub fn with_near(mut self, near: f64) -> Self {
        self.near = near;
        self
    }

    /// Both thresholds must be finite and non-negative, with `near` not
    /// below `intersection`
    pub fn validate(&self) -> AnalyzerResult<()> {
        for (name, value) in [("intersection_threshold", self.intersection), ("near_threshold", self.near)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyzerError::invalid_config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        if self.near < self.intersection {
            return Err(AnalyzerError::invalid_config(format!(
                "near_threshold ({}) is below intersection_threshold ({})",
                self.near, self.intersection
            )));
        }

        Ok(())
    }

    /// `None` when the pair is too far apart to report
    pub fn classify(&self, distance: f64) -> Option<CollisionKind> {
        if distance < self.intersection {
            Some(CollisionKind::Intersecting)
        } else if distance < self.near {
            Some(CollisionKind::Near)
        } else {
            None
        }
    }
}

/// How separation is estimated once the broad phase passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrowPhase {
    /// Bounding-sphere heuristic over the world-space boxes
    #[default]
    BoundingSphere,
    /// Closest distance between the triangle surfaces
    Exact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionOptions {
    pub thresholds: CollisionThresholds,
    pub narrow_phase: NarrowPhase,
}

impl CollisionOptions {
    pub fn new(thresholds: CollisionThresholds, narrow_phase: NarrowPhase) -> Self {
        Self {
            thresholds,
            narrow_phase,
        }
    }
}

/// A reported pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResult {
    pub first: String,
    pub second: String,
    /// Display names captured from the meshes themselves, so reports never
    /// depend on ids being unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_name: Option<String>,
    pub kind: CollisionKind,
    /// Approximate separation, never negative
    pub distance: f64,
    /// Midpoint between the two bounding-box centers; not a true contact locus
    pub point: Point3<f64>,
}

/// Bounding-sphere separation between two boxes, clamped at zero
pub fn bounding_sphere_separation(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let center_distance = (a.center() - b.center()).norm();
    let radii = (a.diagonal() + b.diagonal()) / 2.0;
    (center_distance - radii).max(0.0)
}

/// Screen a single pair with the default bounding-sphere narrow phase
pub fn check_pairwise_collision<A, B>(
    a: &A,
    b: &B,
    thresholds: &CollisionThresholds,
) -> Option<CollisionResult>
where
    A: Renderable + ?Sized,
    B: Renderable + ?Sized,
{
    check_pairwise_collision_with(a, b, &CollisionOptions::new(*thresholds, NarrowPhase::BoundingSphere))
}

pub fn check_pairwise_collision_with<A, B>(
    a: &A,
    b: &B,
    options: &CollisionOptions,
) -> Option<CollisionResult>
where
    A: Renderable + ?Sized,
    B: Renderable + ?Sized,
{
    evaluate_pair(&Candidate::new(a), &Candidate::new(b), options)
}

/// Screen every unordered pair of mesh entries; non-mesh entries are skipped.
/// Results are ordered by pair `(i, j)` with `i < j` in mesh order.
pub fn detect_all_collisions(nodes: &[SceneNode], thresholds: &CollisionThresholds) -> Vec<CollisionResult> {
    detect_all_collisions_with(nodes, &CollisionOptions::new(*thresholds, NarrowPhase::BoundingSphere))
}

pub fn detect_all_collisions_with(nodes: &[SceneNode], options: &CollisionOptions) -> Vec<CollisionResult> {
    CollisionScan::new(nodes, *options).collect()
}

/// Same results and order as [`detect_all_collisions_with`], rows spread over
/// the rayon pool
pub fn detect_all_collisions_parallel(nodes: &[SceneNode], options: &CollisionOptions) -> Vec<CollisionResult> {
    let candidates = candidates_of(nodes);
    let n = candidates.len();

    let results: Vec<CollisionResult> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let candidates = &candidates;
            (i + 1..n).filter_map(move |j| evaluate_pair(&candidates[i], &candidates[j], options))
        })
        .collect();

    tracing::debug!(meshes = n, hits = results.len(), "Parallel collision scan complete");
    results
}

/// Same results and order as [`detect_all_collisions_with`], with a BVH over
/// the mesh bounds replacing the all-pairs broad phase
pub fn detect_all_collisions_indexed(nodes: &[SceneNode], options: &CollisionOptions) -> Vec<CollisionResult> {
    let candidates = candidates_of(nodes);
    let bvh = BVH::build(candidates.iter().map(|c| c.bbox).enumerate().collect());

    let mut results = Vec::new();
    let mut tested = 0usize;
    for (i, candidate) in candidates.iter().enumerate() {
        let mut partners: Vec<usize> = bvh
            .query(&candidate.bbox)
            .into_iter()
            .filter(|&j| j > i)
            .collect();
        partners.sort_unstable();
        tested += partners.len();

        results.extend(
            partners
                .into_iter()
                .filter_map(|j| evaluate_pair(candidate, &candidates[j], options)),
        );
    }

    tracing::debug!(
        meshes = candidates.len(),
        tested,
        hits = results.len(),
        "Indexed collision scan complete"
    );
    results
}

/// Incremental all-pairs scan.
///
/// Work can be split into bounded steps or abandoned midway, so interactive
/// callers never block on a large scene. Iterating the scan yields the same
/// results as [`detect_all_collisions_with`].
pub struct CollisionScan<'a> {
    candidates: Vec<Candidate<'a, Mesh>>,
    options: CollisionOptions,
    i: usize,
    j: usize,
    pairs_done: usize,
}

impl<'a> CollisionScan<'a> {
    pub fn new(nodes: &'a [SceneNode], options: CollisionOptions) -> Self {
        Self {
            candidates: candidates_of(nodes),
            options,
            i: 0,
            j: 1,
            pairs_done: 0,
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn total_pairs(&self) -> usize {
        let n = self.candidates.len();
        n * n.saturating_sub(1) / 2
    }

    /// `(pairs evaluated, total pairs)`
    pub fn progress(&self) -> (usize, usize) {
        (self.pairs_done, self.total_pairs())
    }

    pub fn is_finished(&self) -> bool {
        self.i + 1 >= self.candidates.len()
    }

    fn next_pair(&mut self) -> Option<(usize, usize)> {
        if self.is_finished() {
            return None;
        }
        let pair = (self.i, self.j);
        self.j += 1;
        if self.j >= self.candidates.len() {
            self.i += 1;
            self.j = self.i + 1;
        }
        self.pairs_done += 1;
        Some(pair)
    }

    fn evaluate(&self, (i, j): (usize, usize)) -> Option<CollisionResult> {
        evaluate_pair(&self.candidates[i], &self.candidates[j], &self.options)
    }

    /// Evaluate at most `max_pairs` pairs and return what they reported
    pub fn step(&mut self, max_pairs: usize) -> Vec<CollisionResult> {
        let mut results = Vec::new();
        for _ in 0..max_pairs {
            let Some(pair) = self.next_pair() else {
                break;
            };
            results.extend(self.evaluate(pair));
        }
        results
    }

    /// Step in chunks of `chunk_size` pairs until the scan finishes or
    /// `cancel` is raised. Check [`is_finished`](Self::is_finished) afterwards
    /// to tell the two apart.
    pub fn run(&mut self, chunk_size: usize, cancel: &AtomicBool) -> Vec<CollisionResult> {
        let chunk_size = chunk_size.max(1);
        let mut results = Vec::new();
        while !self.is_finished() {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(
                    done = self.pairs_done,
                    total = self.total_pairs(),
                    "Collision scan cancelled"
                );
                break;
            }
            results.extend(self.step(chunk_size));
        }
        results
    }
}

impl Iterator for CollisionScan<'_> {
    type Item = CollisionResult;

    fn next(&mut self) -> Option<CollisionResult> {
        while let Some(pair) = self.next_pair() {
            if let Some(result) = self.evaluate(pair) {
                return Some(result);
            }
        }
        None
    }
}

/// A mesh with its world bounds computed once per scan
struct Candidate<'a, R: Renderable + ?Sized> {
    mesh: &'a R,
    bbox: BoundingBox,
    shape: OnceLock<Option<TriMesh>>,
}

impl<'a, R: Renderable + ?Sized> Candidate<'a, R> {
    fn new(mesh: &'a R) -> Self {
        Self {
            mesh,
            bbox: mesh.world_bounding_box(),
            shape: OnceLock::new(),
        }
    }

    fn shape(&self) -> Option<&TriMesh> {
        self.shape.get_or_init(|| build_trimesh(self.mesh)).as_ref()
    }
}

fn candidates_of(nodes: &[SceneNode]) -> Vec<Candidate<'_, Mesh>> {
    nodes
        .iter()
        .filter_map(SceneNode::as_mesh)
        .map(Candidate::new)
        .collect()
}

fn evaluate_pair<A, B>(a: &Candidate<'_, A>, b: &Candidate<'_, B>, options: &CollisionOptions) -> Option<CollisionResult>
where
    A: Renderable + ?Sized,
    B: Renderable + ?Sized,
{
    if !a.bbox.intersects(&b.bbox) {
        return None;
    }

    let distance = match options.narrow_phase {
        NarrowPhase::BoundingSphere => bounding_sphere_separation(&a.bbox, &b.bbox),
        NarrowPhase::Exact => exact_separation(a, b).unwrap_or_else(|| bounding_sphere_separation(&a.bbox, &b.bbox)),
    };

    let kind = options.thresholds.classify(distance)?;
    Some(CollisionResult {
        first: a.mesh.id().to_string(),
        second: b.mesh.id().to_string(),
        first_name: a.mesh.name().map(str::to_string),
        second_name: b.mesh.name().map(str::to_string),
        kind,
        distance,
        point: nalgebra::center(&a.bbox.center(), &b.bbox.center()),
    })
}

fn exact_separation<A, B>(a: &Candidate<'_, A>, b: &Candidate<'_, B>) -> Option<f64>
where
    A: Renderable + ?Sized,
    B: Renderable + ?Sized,
{
    let (shape_a, shape_b) = (a.shape()?, b.shape()?);
    let identity = Isometry::identity();
    match parry3d::query::distance(&identity, shape_a, &identity, shape_b) {
        Ok(distance) => Some(f64::from(distance).max(0.0)),
        Err(_) => {
            tracing::warn!(
                first = a.mesh.id(),
                second = b.mesh.id(),
                "Exact distance unsupported, falling back to bounding spheres"
            );
            None
        }
    }
}

/// World-space triangle mesh for the exact narrow phase; `None` when there is
/// nothing to build a shape from
fn build_trimesh<R: Renderable + ?Sized>(mesh: &R) -> Option<TriMesh> {
    let geometry = mesh.geometry()?;
    if geometry.is_empty() {
        return None;
    }

    let transform = mesh.world_transform();
    let vertices: Vec<ShapePoint<Real>> = geometry
        .positions()
        .iter()
        .map(|p| {
            let w = transform.transform_point(p);
            ShapePoint::new(w.x as Real, w.y as Real, w.z as Real)
        })
        .collect();
    let indices: Vec<[u32; 3]> = geometry
        .triangle_indices()
        .map(|[i, j, k]| [i as u32, j as u32, k as u32])
        .collect();

    Some(TriMesh::new(vertices, indices))
}
