// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{Geometry, Mesh};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives, emitted as indexed, outward-wound geometry
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Cuboid { size: Vector3<f64>, center: bool },
    Sphere { r: f64, segments: u32 },
}

impl Primitive {
    pub fn cuboid(size: Vector3<f64>, center: bool) -> Self {
        Self::Cuboid { size, center }
    }

    /// Unit cube spanning the origin to (1, 1, 1)
    pub fn unit_cube() -> Self {
        Self::cuboid(Vector3::new(1.0, 1.0, 1.0), false)
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn to_geometry(&self) -> Geometry {
        match self {
            Self::Cuboid { size, center } => generate_cuboid(*size, *center),
            Self::Sphere { r, segments } => generate_sphere(*r, *segments),
        }
    }

    pub fn to_mesh(&self, id: impl Into<String>) -> Mesh {
        Mesh::new(id, self.to_geometry())
    }
}

fn generate_cuboid(size: Vector3<f64>, center: bool) -> Geometry {
    let offset = if center { size / 2.0 } else { Vector3::zeros() };
    let (min_x, max_x) = (-offset.x, size.x - offset.x);
    let (min_y, max_y) = (-offset.y, size.y - offset.y);
    let (min_z, max_z) = (-offset.z, size.z - offset.z);

    let positions = vec![
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6,  4, 6, 7, // z+
        1, 0, 3,  1, 3, 2, // z-
        5, 1, 2,  5, 2, 6, // x+
        0, 4, 7,  0, 7, 3, // x-
        7, 6, 2,  7, 2, 3, // y+
        0, 1, 5,  0, 5, 4, // y-
    ];

    Geometry::indexed(positions, indices).unwrap_or_default()
}

fn generate_sphere(radius: f64, segments: u32) -> Geometry {
    let stacks = segments as usize;
    let slices = segments as usize;
    let mut positions = Vec::with_capacity((stacks + 1) * (slices + 1));

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            positions.push(Point3::new(r * theta.cos(), y, r * theta.sin()));
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity(stacks * slices * 6);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            let c = (i + 1) * row + j + 1;
            let d = i * row + j + 1;
            indices.extend_from_slice(&[a, c, b, a, d, c]);
        }
    }

    Geometry::indexed(positions, indices).unwrap_or_default()
}
