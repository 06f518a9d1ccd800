//! Logging initialization.
//!
//! `tracing` events go to stderr so the banner on stdout stays clean.  The
//! filter defaults to `info` and can be changed through `RUST_LOG`
//! (e.g. `RUST_LOG=pinch_brightness=debug` to see every frame's reading).

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{AppError, Result};

pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!("pinch_brightness v{} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}
