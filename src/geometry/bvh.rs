// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) over object bounds
//! Used as an optional broad phase for scene-wide collision scans

use super::BoundingBox;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Item indices with their own bounds (only for leaf nodes)
    pub items: Vec<(usize, BoundingBox)>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, items: Vec<(usize, BoundingBox)>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            items,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            items: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy keyed by caller-chosen item indices
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    /// Build from `(item_index, bbox)` pairs. Empty and NaN boxes are skipped
    /// since they can never overlap a query.
    pub fn build(items: Vec<(usize, BoundingBox)>) -> Self {
        let items: Vec<_> = items
            .into_iter()
            .filter(|(_, b)| !b.is_empty() && !b.has_nan())
            .collect();
        if items.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }

        Self {
            root: Self::build_recursive(items, 0),
        }
    }

    fn build_recursive(mut items: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 32;
        const MIN_ITEMS: usize = 4;

        if items.len() <= MIN_ITEMS || depth >= MAX_DEPTH {
            let bbox = Self::compute_union_bbox(&items);
            return BVHNode::leaf(bbox, items);
        }

        let split_axis = Self::compute_union_bbox(&items).longest_axis();
        items.sort_by(|(_, a), (_, b)| {
            let (ca, cb) = (a.center(), b.center());
            ca[split_axis].total_cmp(&cb[split_axis])
        });

        // Split at median
        let right_items = items.split_off(items.len() / 2);
        let left = Box::new(Self::build_recursive(items, depth + 1));
        let right = Box::new(Self::build_recursive(right_items, depth + 1));
        let bbox = left.bbox.union(&right.bbox);

        BVHNode::internal(bbox, left, right)
    }

    fn compute_union_bbox(items: &[(usize, BoundingBox)]) -> BoundingBox {
        items
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// Items whose bounds overlap `bbox` (inclusive), in no particular order
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend(
                node.items
                    .iter()
                    .filter(|(_, item_bbox)| item_bbox.intersects(bbox))
                    .map(|(idx, _)| *idx),
            );
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn unit_box_at(x: f64) -> BoundingBox {
        BoundingBox::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_bvh_build() {
        let items = (0..20).map(|i| (i, unit_box_at(i as f64 * 2.0))).collect();
        let bvh = BVH::build(items);
        assert!(!bvh.root().is_leaf());
    }

    #[test]
    fn test_bvh_query() {
        let items = (0..20).map(|i| (i, unit_box_at(i as f64 * 2.0))).collect();
        let bvh = BVH::build(items);

        let mut hits = bvh.query(&unit_box_at(6.5));
        hits.sort_unstable();
        assert_eq!(hits, vec![3]);

        let everything = BoundingBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(100.0, 2.0, 2.0));
        assert_eq!(bvh.query(&everything).len(), 20);
    }

    #[test]
    fn test_bvh_skips_empty_boxes() {
        let bvh = BVH::build(vec![(0, BoundingBox::empty()), (1, unit_box_at(0.0))]);
        let hits = bvh.query(&unit_box_at(0.0));
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_bvh_leaf_filters_items() {
        // Three items share one leaf whose union box covers the query
        let items = vec![(0, unit_box_at(0.0)), (1, unit_box_at(2.0)), (2, unit_box_at(4.0))];
        let bvh = BVH::build(items);
        assert!(bvh.root().is_leaf());
        assert_eq!(bvh.query(&unit_box_at(2.2)), vec![1]);
        assert!(bvh.query(&BoundingBox::new(Point3::new(1.2, 0.0, 0.0), Point3::new(1.8, 1.0, 1.0))).is_empty());
    }

    #[test]
    fn test_bvh_skips_nan_boxes() {
        let nan_box = BoundingBox::new(Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let bvh = BVH::build(vec![(0, nan_box), (1, unit_box_at(0.0)), (2, unit_box_at(0.5))]);
        let mut hits = bvh.query(&unit_box_at(0.0));
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2]);
    }
}
