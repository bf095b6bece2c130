// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WASM bindings using wasm-bindgen
//!
//! The viewer hands over raw vertex buffers (flat `x, y, z` triples, as in a
//! three.js `BufferAttribute`) and gets JSON back.

use crate::analysis::{analyze_mesh, detect_all_collisions, measure_distance, CollisionThresholds};
use crate::geometry::{Geometry, Mesh};
use crate::io::parse_scene;
use nalgebra::{Point3, Vector3};
use std::path::Path;
use wasm_bindgen::prelude::*;

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn geometry_from_buffers(positions: &[f32], indices: Option<Vec<u32>>) -> Result<Geometry, JsValue> {
    if positions.len() % 3 != 0 {
        return Err(JsValue::from_str("Position buffer length must be a multiple of 3"));
    }
    let points = positions
        .chunks_exact(3)
        .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        .collect();

    match indices {
        Some(indices) => Geometry::indexed(points, indices.into_iter().map(|i| i as usize).collect())
            .map_err(|e| js_error("Invalid geometry", e)),
        None => Ok(Geometry::from_positions(points)),
    }
}

/// Surface area, volume and bounding-box volume of one buffer geometry,
/// returned as JSON
#[wasm_bindgen]
pub fn analyze_buffers(
    positions: &[f32],
    indices: Option<Vec<u32>>,
    sx: f64,
    sy: f64,
    sz: f64,
) -> Result<String, JsValue> {
    let geometry = geometry_from_buffers(positions, indices)?;
    let mesh = Mesh::new("buffer", geometry).with_scale(Vector3::new(sx, sy, sz));

    serde_json::to_string(&analyze_mesh(&mesh)).map_err(|e| js_error("JSON serialization error", e))
}

/// Clash screening over a JSON scene with inline geometry
#[wasm_bindgen]
pub fn detect_collisions(scene_json: &str, intersection: f64, near: f64) -> Result<String, JsValue> {
    let thresholds = CollisionThresholds::new(intersection, near);
    thresholds.validate().map_err(|e| js_error("Invalid thresholds", e))?;

    let nodes = parse_scene(scene_json, Path::new(".")).map_err(|e| js_error("Scene error", format!("{:#}", e)))?;
    let results = detect_all_collisions(&nodes, &thresholds);

    serde_json::to_string(&results).map_err(|e| js_error("JSON serialization error", e))
}

/// Straight-line distance between two picked points
#[wasm_bindgen]
pub fn measure_points(x1: f64, y1: f64, z1: f64, x2: f64, y2: f64, z2: f64) -> f64 {
    measure_distance(Point3::new(x1, y1, z1), Point3::new(x2, y2, z2)).distance
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
