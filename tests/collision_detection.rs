// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision screening tests

use anyhow::Result;
use approx::assert_relative_eq;
use bimlens::analysis::{
    check_pairwise_collision_with, detect_all_collisions_indexed, detect_all_collisions_parallel,
    detect_all_collisions_with, CollisionOptions, CollisionScan, NarrowPhase,
};
use bimlens::geometry::{Mesh, NodeKind, Primitive, SceneNode};
use bimlens::{check_pairwise_collision, detect_all_collisions, CollisionKind, CollisionReport, CollisionThresholds};
use nalgebra::{UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::AtomicBool;

fn cube_at(id: &str, x: f64, y: f64, z: f64) -> Mesh {
    Primitive::unit_cube()
        .to_mesh(id)
        .with_position(Vector3::new(x, y, z))
}

/// Random cubes and spheres packed tightly enough to produce both kinds
fn random_scene(seed: u64, count: usize) -> Vec<SceneNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nodes = Vec::with_capacity(count + count / 5);

    for i in 0..count {
        let position = Vector3::new(
            rng.gen_range(0.0..12.0),
            rng.gen_range(0.0..12.0),
            rng.gen_range(0.0..3.0),
        );
        let primitive = if rng.gen_bool(0.5) {
            Primitive::cuboid(
                Vector3::new(rng.gen_range(0.2..2.0), rng.gen_range(0.2..2.0), rng.gen_range(0.2..2.0)),
                true,
            )
        } else {
            Primitive::sphere(rng.gen_range(0.1..1.0), 12)
        };
        nodes.push(SceneNode::Mesh(
            primitive
                .to_mesh(format!("element-{}", i))
                .with_position(position),
        ));

        if i % 5 == 0 {
            nodes.push(SceneNode::other(format!("group-{}", i), NodeKind::Group));
        }
    }
    nodes
}

#[test]
fn test_offset_cubes_intersect() -> Result<()> {
    let a = cube_at("a", 0.0, 0.0, 0.0);
    let b = cube_at("b", 0.001, 0.0, 0.0);

    let result = check_pairwise_collision(&a, &b, &CollisionThresholds::default())
        .ok_or_else(|| anyhow::anyhow!("expected a collision"))?;

    println!("Result: {:?}", result);
    assert_eq!(result.kind, CollisionKind::Intersecting);
    assert_eq!(result.first, "a");
    assert_eq!(result.second, "b");
    assert!(result.distance >= 0.0);
    assert_relative_eq!(result.point.x, 0.5005, epsilon = 1e-12);

    Ok(())
}

#[test]
fn test_distant_cubes_do_not_collide() -> Result<()> {
    let a = cube_at("a", 0.0, 0.0, 0.0);
    let b = cube_at("b", 5.0, 0.0, 0.0);

    assert!(check_pairwise_collision(&a, &b, &CollisionThresholds::default()).is_none());

    let nodes = vec![SceneNode::Mesh(a), SceneNode::Mesh(b)];
    assert!(detect_all_collisions(&nodes, &CollisionThresholds::default()).is_empty());

    Ok(())
}

#[test]
fn test_touching_boxes_pass_the_broad_phase() -> Result<()> {
    // Faces meet exactly at x = 1; the inclusive overlap test keeps the pair
    let a = cube_at("a", 0.0, 0.0, 0.0);
    let b = cube_at("b", 1.0, 0.0, 0.0);

    let result = check_pairwise_collision(&a, &b, &CollisionThresholds::default());
    assert_eq!(result.map(|r| r.kind), Some(CollisionKind::Intersecting));

    Ok(())
}

#[test]
fn test_pair_order_and_non_mesh_skipping() -> Result<()> {
    let nodes = vec![
        SceneNode::Mesh(cube_at("a", 0.0, 0.0, 0.0)),
        SceneNode::other("sun", NodeKind::Light),
        SceneNode::Mesh(cube_at("b", 0.5, 0.0, 0.0)),
        SceneNode::Mesh(cube_at("c", 20.0, 0.0, 0.0)),
        SceneNode::Mesh(cube_at("d", 0.0, 0.5, 0.0)),
    ];

    let results = detect_all_collisions(&nodes, &CollisionThresholds::default());
    let pairs: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.first.as_str(), r.second.as_str()))
        .collect();

    assert_eq!(pairs, vec![("a", "b"), ("a", "d"), ("b", "d")]);

    Ok(())
}

#[test]
fn test_strategies_agree_on_random_scenes() -> Result<()> {
    let options = CollisionOptions::default();

    for seed in 0..5 {
        let nodes = random_scene(seed, 60);
        let sequential = detect_all_collisions_with(&nodes, &options);
        let parallel = detect_all_collisions_parallel(&nodes, &options);
        let indexed = detect_all_collisions_indexed(&nodes, &options);

        let mut scan = CollisionScan::new(&nodes, options);
        let mut stepped = Vec::new();
        while !scan.is_finished() {
            stepped.extend(scan.step(37));
        }

        println!(
            "Seed {}: {} hits ({} intersecting)",
            seed,
            sequential.len(),
            sequential
                .iter()
                .filter(|r| r.kind == CollisionKind::Intersecting)
                .count()
        );

        assert!(!sequential.is_empty());
        assert_eq!(sequential, parallel);
        assert_eq!(sequential, indexed);
        assert_eq!(sequential, stepped);
    }

    Ok(())
}

#[test]
fn test_cancelled_scan_returns_a_prefix() -> Result<()> {
    let nodes = random_scene(42, 40);
    let options = CollisionOptions::default();
    let full = detect_all_collisions_with(&nodes, &options);

    let mut scan = CollisionScan::new(&nodes, options);
    let mut partial = scan.step(100);
    assert!(!scan.is_finished());

    let cancel = AtomicBool::new(true);
    partial.extend(scan.run(64, &cancel));
    assert_eq!(scan.progress().0, 100);
    assert_eq!(partial.as_slice(), &full[..partial.len()]);

    let resumed = scan.run(64, &AtomicBool::new(false));
    assert!(scan.is_finished());
    partial.extend(resumed);
    assert_eq!(partial, full);

    Ok(())
}

#[test]
fn test_exact_narrow_phase_clears_rotated_neighbour() -> Result<()> {
    // The boxes overlap, and the spheres built on their diagonals overlap too,
    // but the rotated cube's nearest edge stays about 0.36 away from the corner
    let a = cube_at("a", 0.0, 0.0, 0.0);
    let b = Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0), true)
        .to_mesh("b")
        .with_rotation(UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_4))
        .with_position(Vector3::new(1.6071, 1.6071, 0.5));

    let heuristic = check_pairwise_collision(&a, &b, &CollisionThresholds::default());
    assert_eq!(heuristic.map(|r| r.kind), Some(CollisionKind::Intersecting));

    let exact = CollisionOptions::new(CollisionThresholds::default(), NarrowPhase::Exact);
    assert!(check_pairwise_collision_with(&a, &b, &exact).is_none());

    let wide = CollisionOptions::new(CollisionThresholds::new(0.01, 0.5), NarrowPhase::Exact);
    let result = check_pairwise_collision_with(&a, &b, &wide).ok_or_else(|| anyhow::anyhow!("expected near"))?;
    println!("Exact separation: {:.4}", result.distance);
    assert_eq!(result.kind, CollisionKind::Near);
    assert_relative_eq!(result.distance, 0.3585, epsilon = 1e-3);

    Ok(())
}

#[test]
fn test_exact_narrow_phase_reports_overlap() -> Result<()> {
    let a = cube_at("a", 0.0, 0.0, 0.0);
    let b = cube_at("b", 0.5, 0.5, 0.0);
    let exact = CollisionOptions::new(CollisionThresholds::default(), NarrowPhase::Exact);

    let result = check_pairwise_collision_with(&a, &b, &exact).ok_or_else(|| anyhow::anyhow!("expected overlap"))?;
    assert_eq!(result.kind, CollisionKind::Intersecting);
    assert_eq!(result.distance, 0.0);

    Ok(())
}

#[test]
fn test_report_from_detected_collisions() -> Result<()> {
    let nodes = vec![
        SceneNode::Mesh(cube_at("a", 0.0, 0.0, 0.0).with_name("Wall")),
        SceneNode::Mesh(cube_at("b", 0.2, 0.0, 0.0)),
    ];
    let results = detect_all_collisions(&nodes, &CollisionThresholds::default());
    let report = CollisionReport::generate(&results);

    assert_eq!(report.total_collisions, 1);
    assert_eq!(report.collisions[0].id, 1);
    assert_eq!(report.collisions[0].object1_name, "Wall");
    assert_eq!(report.collisions[0].object2_name, "Unnamed");
    assert_eq!(report.count_of(CollisionKind::Intersecting), 1);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["collisions"][0]["type"], "intersecting");

    Ok(())
}
