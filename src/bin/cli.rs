// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! bimlens CLI

use anyhow::{Context, Result};
use bimlens::analysis::{
    analyze_collection, detect_all_collisions_indexed, detect_all_collisions_parallel, is_watertight,
    measure_distance, path_length, CollisionResult, CollisionScan, NarrowPhase,
};
use bimlens::cli::{init_logging, Reporter};
use bimlens::config::{AnalyzerConfig, BroadPhase};
use bimlens::geometry::{meshes_of, Renderable, SceneNode};
use bimlens::{io, CollisionKind, CollisionReport, MeasurementReport};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Point3;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bimlens")]
#[command(about = "Area, volume and clash analysis for BIM meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./bimlens.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure surface area and volume of every mesh
    Analyze {
        /// Scene JSON, STL file, or directory of STL files
        input: PathBuf,

        /// Write the measurements as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Screen all mesh pairs for intersections and near misses
    Collisions {
        /// Scene JSON, STL file, or directory of STL files
        input: PathBuf,

        /// Separation below which a pair intersects
        #[arg(long)]
        intersection_threshold: Option<f64>,

        /// Separation below which a pair is reported as near
        #[arg(long)]
        near_threshold: Option<f64>,

        /// Use exact triangle-mesh distances instead of bounding spheres
        #[arg(long)]
        exact: bool,

        /// Use a BVH broad phase
        #[arg(long)]
        indexed: bool,

        /// Run the scan on all cores
        #[arg(long)]
        parallel: bool,

        /// Exit with status 1 when any pair intersects
        #[arg(long)]
        fail_on_collision: bool,

        /// Write the collision report as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Distance along a path of points: X1 Y1 Z1 X2 Y2 Z2 [X3 Y3 Z3 ...]
    Measure {
        #[arg(num_args = 6.., value_name = "COORD", allow_negative_numbers = true)]
        coords: Vec<f64>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            let mut config = AnalyzerConfig::from_file(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => AnalyzerConfig::load()?,
    };

    match cli.command {
        Commands::Analyze { input, json } => {
            analyze_command(&input, json.as_deref(), &config)?;
        }
        Commands::Collisions {
            input,
            intersection_threshold,
            near_threshold,
            exact,
            indexed,
            parallel,
            fail_on_collision,
            json,
        } => {
            let mut config = config;
            let collision = &mut config.collision;
            if let Some(value) = intersection_threshold {
                collision.intersection_threshold = value;
            }
            if let Some(value) = near_threshold {
                collision.near_threshold = value;
            }
            if exact {
                collision.narrow_phase = NarrowPhase::Exact;
            }
            if indexed {
                collision.broad_phase = BroadPhase::Indexed;
            }
            collision.parallel |= parallel;
            config.validate()?;

            let report = collisions_command(&input, json.as_deref(), &config, cli.verbose)?;
            if fail_on_collision && report.count_of(CollisionKind::Intersecting) > 0 {
                std::process::exit(1);
            }
        }
        Commands::Measure { coords } => {
            measure_command(&coords, &config.report.units)?;
        }
        Commands::Version => {
            println!("bimlens v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn measure_command(coords: &[f64], units: &str) -> Result<()> {
    if coords.len() % 3 != 0 {
        anyhow::bail!("Expected x y z triples, got {} coordinates", coords.len());
    }
    let points: Vec<Point3<f64>> = coords.chunks_exact(3).map(|c| Point3::new(c[0], c[1], c[2])).collect();

    for pair in points.windows(2) {
        Reporter::report_distance(&measure_distance(pair[0], pair[1]), units);
    }
    if points.len() > 2 {
        println!();
        Reporter::report_info(&format!("Path length: {:.2}{}", path_length(&points), units));
    }
    Ok(())
}

fn load_input(input: &Path) -> Result<Vec<SceneNode>> {
    if !input.exists() {
        Reporter::report_error(&format!("Input not found: {}", input.display()));
        std::process::exit(1);
    }
    io::load_nodes(input).with_context(|| format!("Failed to load {}", input.display()))
}

fn analyze_command(input: &Path, json: Option<&Path>, config: &AnalyzerConfig) -> Result<()> {
    let nodes = load_input(input)?;
    let units = &config.report.units;
    if !nodes.iter().any(SceneNode::is_mesh) {
        Reporter::report_warning(&format!("No meshes found in {}", input.display()));
    }

    let mut reports = Vec::new();
    for mesh in meshes_of(&nodes) {
        let report = MeasurementReport::from_mesh(mesh, units);
        let watertight = mesh.geometry().map_or(true, is_watertight);
        Reporter::report_measurement(&report, watertight);
        reports.push(report);
    }

    let summary = analyze_collection(&nodes);
    Reporter::report_summary(&summary, units);

    if let Some(path) = json {
        let output = serde_json::json!({ "objects": reports, "summary": summary });
        io::write_json(path, &output)?;
        Reporter::success(&format!("Wrote {}", path.display()));
    }

    Ok(())
}

fn collisions_command(
    input: &Path,
    json: Option<&Path>,
    config: &AnalyzerConfig,
    verbose: bool,
) -> Result<CollisionReport> {
    let nodes = load_input(input)?;
    let options = config.collision.options();
    if verbose {
        Reporter::report_info(&format!(
            "{} nodes, {:?} broad phase, {:?} narrow phase",
            nodes.len(),
            config.collision.broad_phase,
            options.narrow_phase
        ));
    }

    let start = Instant::now();
    let results: Vec<CollisionResult> = match (config.collision.broad_phase, config.collision.parallel) {
        (BroadPhase::Indexed, _) => detect_all_collisions_indexed(&nodes, &options),
        (BroadPhase::AllPairs, true) => detect_all_collisions_parallel(&nodes, &options),
        (BroadPhase::AllPairs, false) => {
            let mut scan = CollisionScan::new(&nodes, options);
            let pb = if verbose {
                let p = ProgressBar::new(scan.total_pairs() as u64);
                p.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({eta})")?
                        .progress_chars("#>-"),
                );
                Some(p)
            } else {
                None
            };

            let mut results = Vec::new();
            while !scan.is_finished() {
                results.extend(scan.step(config.collision.chunk_size));
                if let Some(ref p) = pb {
                    p.set_position(scan.progress().0 as u64);
                }
            }
            if let Some(p) = pb {
                p.finish_and_clear();
            }
            results
        }
    };
    let duration = start.elapsed();

    let report = CollisionReport::generate(&results);
    Reporter::report_collisions(&report, &config.report.units, duration);

    if let Some(path) = json {
        io::write_json(path, &report)?;
        Reporter::success(&format!("Wrote {}", path.display()));
    }

    Ok(report)
}
