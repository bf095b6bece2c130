// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for bimlens

pub mod reporter;

pub use reporter::Reporter;

/// Install the tracing subscriber used by the binaries.
///
/// `RUST_LOG` wins when set; otherwise `verbose` raises the crate's level from
/// `warn` to `debug`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,bimlens=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
