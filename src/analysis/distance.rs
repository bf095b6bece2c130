// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point-to-point distance measurement

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Distance between two picked points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub distance: f64,
    /// Where a label for this measurement is anchored
    pub midpoint: Point3<f64>,
}

impl Measurement {
    /// Label text with two decimals and the unit suffix, e.g. `"3.61m"`
    pub fn label(&self, units: &str) -> String {
        format!("{:.2}{}", self.distance, units)
    }
}

pub fn measure_distance(start: Point3<f64>, end: Point3<f64>) -> Measurement {
    Measurement {
        start,
        end,
        distance: nalgebra::distance(&start, &end),
        midpoint: nalgebra::center(&start, &end),
    }
}

/// Total length of a polyline through `points`
pub fn path_length(points: &[Point3<f64>]) -> f64 {
    points
        .windows(2)
        .map(|pair| nalgebra::distance(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_measure_distance() {
        let m = measure_distance(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(m.distance, 5.0);
        assert_eq!(m.midpoint, Point3::new(1.5, 2.0, 0.0));
        assert_eq!(m.label("m"), "5.00m");
    }

    #[test]
    fn test_path_length() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        assert_relative_eq!(path_length(&points), 3.0);
        assert_eq!(path_length(&points[..1]), 0.0);
    }
}
