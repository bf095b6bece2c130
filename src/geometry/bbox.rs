// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box that contains nothing; expanding it by any point yields that point
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    /// Bounding box of `points` after mapping each through `transform`
    pub fn from_transformed_points<'a>(
        points: impl IntoIterator<Item = &'a Point3<f64>>,
        transform: &Matrix4<f64>,
    ) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(&transform.transform_point(point));
        }
        bbox
    }

    /// Grow the box to cover `point`. A NaN coordinate poisons that axis for
    /// good, so the NaN shows up in size and volume.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        for axis in 0..3 {
            self.min[axis] = nan_min(self.min[axis], point[axis]);
            self.max[axis] = nan_max(self.max[axis], point[axis]);
        }
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bbox = *self;
        for axis in 0..3 {
            bbox.min[axis] = nan_min(self.min[axis], other.min[axis]);
            bbox.max[axis] = nan_max(self.max[axis], other.max[axis]);
        }
        bbox
    }

    /// True for a box that contains no points. A NaN box is not empty.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// True when any bound is NaN
    pub fn has_nan(&self) -> bool {
        self.min.coords.iter().chain(self.max.coords.iter()).any(|v| v.is_nan())
    }

    /// Inclusive overlap test; boxes that only touch still intersect.
    /// Empty boxes never intersect anything.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Extents along each axis; zero for an empty box
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        Vector3::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z)
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min.x - other.min.x).abs() < tolerance
            && (self.min.y - other.min.y).abs() < tolerance
            && (self.min.z - other.min.z).abs() < tolerance
            && (self.max.x - other.max.x).abs() < tolerance
            && (self.max.y - other.max.y).abs() < tolerance
            && (self.max.z - other.max.z).abs() < tolerance
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        bbox.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        bbox.expand_to_include(&Point3::new(-1.0, -2.0, -3.0));

        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.volume(), 48.0);
    }

    #[test]
    fn test_empty_and_single_point_have_zero_volume() {
        assert!(BoundingBox::empty().is_empty());
        assert_eq!(BoundingBox::empty().volume(), 0.0);
        assert_eq!(BoundingBox::empty().size(), Vector3::zeros());

        let point = Point3::new(4.0, 5.0, 6.0);
        let single = BoundingBox::from_points([&point]);
        assert!(!single.is_empty());
        assert_eq!(single.volume(), 0.0);
    }

    #[test]
    fn test_intersects_is_inclusive() {
        let a = BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let touching = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let apart = BoundingBox::new(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));

        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
        assert!(!a.intersects(&BoundingBox::empty()));
    }

    #[test]
    fn test_nan_coordinates_poison_the_box() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::NAN, 0.5, 0.5),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let bbox = BoundingBox::from_points(&points);
        assert!(bbox.has_nan());
        assert!(!bbox.is_empty());
        assert!(bbox.volume().is_nan());
        assert_eq!(bbox.max.y, 1.0);

        let all_nan = [Point3::new(f64::NAN, f64::NAN, f64::NAN)];
        assert!(BoundingBox::from_points(&all_nan).volume().is_nan());

        let clean = BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(!clean.has_nan());
        assert!(clean.union(&bbox).has_nan());
        assert!(!clean.intersects(&bbox));
    }

    #[test]
    fn test_transformed_points() {
        let points = [Point3::origin(), Point3::new(1.0, 1.0, 1.0)];
        let transform = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 4.0));
        let bbox = BoundingBox::from_transformed_points(&points, &transform);

        let expected = BoundingBox::new(Point3::new(10.0, 0.0, 0.0), Point3::new(12.0, 3.0, 4.0));
        assert!(bbox.approx_eq(&expected, 1e-12));
    }
}
