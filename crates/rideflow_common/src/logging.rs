//! Logging utilities for the Rideflow application.
//!
//! This module provides a standardized approach to logging across all
//! crates in the workspace. Call [`init`] (or [`init_with_level`]) once at
//! startup; everything else logs through the `tracing` macros.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default level (INFO).
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific minimum log level.
///
/// Honours `RUST_LOG` when set; otherwise applies the given level to the
/// `rideflow` crates. Safe to call more than once: subsequent calls are
/// no-ops if a global subscriber is already installed.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("rideflow={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
