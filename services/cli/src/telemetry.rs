//! Logging setup for the binary. Events go to stderr without timestamps so
//! stdout stays clean for command output and pipes.

use std::fmt;

use concierge::config::TelemetryConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub struct TelemetryError {
    detail: String,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to set up logging: {}", self.detail)
    }
}

impl std::error::Error for TelemetryError {}

/// A `RUST_LOG` directive wins over the configured `APP_LOG_LEVEL`, so a
/// one-off run can turn up verbosity without touching the environment file.
fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|err| TelemetryError {
            detail: format!("invalid APP_LOG_LEVEL '{}': {err}", config.log_level),
        }),
    }
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
        .map_err(|err| TelemetryError {
            detail: err.to_string(),
        })
}
