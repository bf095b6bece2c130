// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Analyzer configuration system

use crate::analysis::{CollisionOptions, CollisionThresholds, NarrowPhase};
use crate::error::AnalyzerError;
use crate::report::DEFAULT_UNITS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "bimlens.toml";

/// Broad-phase strategy for scene-wide scans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// Test every pair's bounding boxes
    #[default]
    AllPairs,
    /// Query a BVH over the mesh bounds
    Indexed,
}

/// Collision screening settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub intersection_threshold: f64,
    pub near_threshold: f64,
    pub narrow_phase: NarrowPhase,
    pub broad_phase: BroadPhase,
    /// Spread the all-pairs scan over the rayon pool
    pub parallel: bool,
    /// Pairs evaluated per step of a chunked scan
    pub chunk_size: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        let thresholds = CollisionThresholds::default();
        Self {
            intersection_threshold: thresholds.intersection,
            near_threshold: thresholds.near,
            narrow_phase: NarrowPhase::default(),
            broad_phase: BroadPhase::default(),
            parallel: false,
            chunk_size: 4096,
        }
    }
}

impl CollisionConfig {
    pub fn thresholds(&self) -> CollisionThresholds {
        CollisionThresholds::new(self.intersection_threshold, self.near_threshold)
    }

    pub fn options(&self) -> CollisionOptions {
        CollisionOptions::new(self.thresholds(), self.narrow_phase)
    }
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Length unit label appended to figures
    pub units: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            units: DEFAULT_UNITS.to_string(),
        }
    }
}

/// Analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub collision: CollisionConfig,
    pub report: ReportConfig,
}

impl AnalyzerConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `bimlens.toml` from the working directory if present, then apply
    /// environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `BIMLENS_*` environment overrides and re-validate
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("BIMLENS_INTERSECTION_THRESHOLD") {
            self.collision.intersection_threshold = value
                .parse()
                .with_context(|| format!("BIMLENS_INTERSECTION_THRESHOLD is not a number: {value}"))?;
        }

        if let Ok(value) = std::env::var("BIMLENS_NEAR_THRESHOLD") {
            self.collision.near_threshold = value
                .parse()
                .with_context(|| format!("BIMLENS_NEAR_THRESHOLD is not a number: {value}"))?;
        }

        if let Ok(value) = std::env::var("BIMLENS_NARROW_PHASE") {
            self.collision.narrow_phase = match value.to_lowercase().as_str() {
                "bounding_sphere" => NarrowPhase::BoundingSphere,
                "exact" => NarrowPhase::Exact,
                other => {
                    return Err(AnalyzerError::invalid_config(format!("unknown narrow phase '{other}'")).into())
                }
            };
        }

        if let Ok(units) = std::env::var("BIMLENS_UNITS") {
            self.report.units = units;
        }

        self.validate()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        let c = &self.collision;
        c.thresholds().validate()?;

        if c.chunk_size == 0 {
            return Err(AnalyzerError::invalid_config("chunk_size must be positive"));
        }

        Ok(())
    }
}
