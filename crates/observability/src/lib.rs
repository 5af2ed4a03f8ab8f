//! Tracing and logging (shared setup).

/// Environment-driven configuration.
pub mod config;

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use config::{ConfigError, LogFormat, ObservabilityConfig};

/// Initialize process-wide observability (tracing/logging) from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() -> Result<(), ConfigError> {
    let config = ObservabilityConfig::from_env()?;
    tracing::init_with(&config);
    Ok(())
}
