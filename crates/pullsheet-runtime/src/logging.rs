#![forbid(unsafe_code)]

//! Subscriber installation for binaries embedding pullsheet.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! application's choice. These helpers cover the common cases and respect
//! `RUST_LOG`, falling back to `default_directive` when it is unset:
//!
//! - `RUST_LOG=pullsheet.settle=debug` - settle starts, supersessions, finishes
//! - `RUST_LOG=pullsheet.drag=trace` - every drag sample
//!
//! Targets: `pullsheet.drag`, `pullsheet.settle`, `pullsheet.coupling`,
//! `pullsheet.transition`.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Failure to install a global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

fn build_filter(from_env: Option<&str>, default_directive: &str) -> Result<EnvFilter, LoggingError> {
    if let Some(filter) = from_env
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
    {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(default_directive)?)
}

fn filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(from_env.as_deref(), default_directive)
}

/// Install a human-readable fmt subscriber.
pub fn init_subscriber(default_directive: &str) -> Result<(), LoggingError> {
    let layer = tracing_subscriber::fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(filter(default_directive)?)
        .with(layer)
        .try_init()?;
    Ok(())
}

/// Install a JSON subscriber, one object per line.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber(default_directive: &str) -> Result<(), LoggingError> {
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true);
    tracing_subscriber::registry()
        .with(filter(default_directive)?)
        .with(layer)
        .try_init()?;
    Ok(())
}
