// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the fallible edges of the analyzer

use thiserror::Error;

/// Result alias for analyzer operations that can fail
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors raised while building geometry, loading inputs or validating config.
///
/// The measurement and collision functions themselves never fail; these only
/// surface at construction and I/O boundaries.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A triangle index points past the end of the vertex buffer
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: usize, vertex_count: usize },

    /// Configuration values are inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file kind or content is not understood
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Two scene nodes share an id, so results could not name them apart
    #[error("duplicate node id '{0}'")]
    DuplicateId(String),
}

impl AnalyzerError {
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    pub fn unsupported_input(details: impl Into<String>) -> Self {
        Self::UnsupportedInput(details.into())
    }
}
