//! Tracing subscriber setup for hosts embedding goalfit.
//!
//! The library only emits `tracing` events. Host binaries call
//! [`init_logging`] once to route them to stderr, filtered by `RUST_LOG`.

use crate::result::{GoalfitError, GoalfitResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install a global subscriber
///
/// `default_level` applies when `RUST_LOG` is unset. Fails if a global
/// subscriber is already installed.
pub fn init_logging(format: LogFormat, default_level: &str) -> GoalfitResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| GoalfitError::Config {
        message: format!("failed to install tracing subscriber: {}", e),
    })
}
