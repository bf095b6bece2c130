// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, bounds and spatial indexing

mod bbox;
mod bvh;
mod mesh;
mod primitives;

pub use bbox::BoundingBox;
pub use bvh::{BVHNode, BVH};
pub use mesh::{meshes_of, Geometry, Mesh, NodeKind, Renderable, SceneNode, Triangle};
pub use primitives::Primitive;
