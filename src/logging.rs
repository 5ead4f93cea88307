//! Sets up log output for programs that embed the expense tracker.
//!
//! The library itself only emits events with the `tracing` macros: writes are
//! logged at `debug`, startup and shutdown at `info`, and storage failures at
//! `error`. Nothing is printed until a subscriber is installed.

use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Install a global subscriber that writes log events to stdout.
///
/// Events below `default_level` are dropped unless the `RUST_LOG` environment
/// variable asks for them, e.g. `RUST_LOG=expense_tracker=debug`.
///
/// # Errors
/// Returns an error if a global subscriber has already been installed.
pub fn setup_logging(default_level: LevelFilter) -> Result<(), TryInitError> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .try_init()
}
