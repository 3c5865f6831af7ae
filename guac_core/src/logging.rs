//! Logging utilities for diff and write-path output.

// Re-exports for convenience
pub use tracing::metadata::LevelFilter;
pub use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Set up basic logging.
///
/// `RUST_LOG` drives the filter when set; an explicit `level` overrides
/// it for the formatted output layer.
pub fn setup(level: Option<LevelFilter>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(level.unwrap_or(LevelFilter::INFO));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    debug!("logging set up");
}
