// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Serializable reports for display and export

use crate::analysis::{analyze_mesh, CollisionKind, CollisionResult};
use crate::geometry::Renderable;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_UNITS: &str = "m";

/// Area and volume figures for one named object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementReport {
    pub name: String,
    pub surface_area: f64,
    pub volume: f64,
    pub bounding_box_volume: f64,
    pub units: String,
}

impl MeasurementReport {
    pub fn from_mesh<R: Renderable + ?Sized>(mesh: &R, units: &str) -> Self {
        let analysis = analyze_mesh(mesh);
        Self {
            name: mesh.name().unwrap_or("Unnamed Object").to_string(),
            surface_area: analysis.surface_area,
            volume: analysis.volume,
            bounding_box_volume: analysis.bounding_box_volume,
            units: units.to_string(),
        }
    }
}

impl fmt::Display for MeasurementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  Surface area:      {:.2} {}²", self.surface_area, self.units)?;
        writeln!(f, "  Volume:            {:.2} {}³", self.volume, self.units)?;
        write!(f, "  Bounding box vol.: {:.2} {}³", self.bounding_box_volume, self.units)
    }
}

/// One reported pair in a [`CollisionReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionEntry {
    /// 1-based position in the report
    pub id: usize,
    pub object1_name: String,
    pub object2_name: String,
    #[serde(rename = "type")]
    pub kind: CollisionKind,
    pub distance: f64,
    pub position: Point3<f64>,
}

/// Result of a clash run, ready for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionReport {
    pub timestamp: String,
    pub total_collisions: usize,
    pub collisions: Vec<CollisionEntry>,
}

impl CollisionReport {
    /// Build a report from detection results. Meshes without a name show as
    /// "Unnamed".
    pub fn generate(results: &[CollisionResult]) -> Self {
        let name_of = |name: &Option<String>| name.as_deref().unwrap_or("Unnamed").to_string();

        let collisions = results
            .iter()
            .enumerate()
            .map(|(index, result)| CollisionEntry {
                id: index + 1,
                object1_name: name_of(&result.first_name),
                object2_name: name_of(&result.second_name),
                kind: result.kind,
                distance: result.distance,
                position: result.point,
            })
            .collect::<Vec<_>>();

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_collisions: collisions.len(),
            collisions,
        }
    }

    pub fn count_of(&self, kind: CollisionKind) -> usize {
        self.collisions.iter().filter(|c| c.kind == kind).count()
    }
}

impl fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} collision(s) detected", self.total_collisions)?;
        for c in &self.collisions {
            write!(
                f,
                "\n#{} [{}] {} <-> {}  distance {:.3}  at ({:.2}, {:.2}, {:.2})",
                c.id,
                c.kind,
                c.object1_name,
                c.object2_name,
                c.distance,
                c.position.x,
                c.position.y,
                c.position.z
            )?;
        }
        Ok(())
    }
}
