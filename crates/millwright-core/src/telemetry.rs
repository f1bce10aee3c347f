//! Telemetry initialization
//!
//! Installs a `tracing-subscriber` fmt layer with environment-filter
//! support. `RUST_LOG` wins over the configured level so operators can
//! raise verbosity without editing configuration.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name included in the startup log line
    pub service_name: String,
    /// Log level filter used when RUST_LOG is unset
    pub log_level: String,
    /// Whether to include target paths in output
    pub with_targets: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "millwright".to_string(),
            log_level: "info".to_string(),
            with_targets: false,
        }
    }
}

impl TelemetryConfig {
    /// Create a configuration with the given service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the fallback log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Include target paths in log output
    pub fn with_targets(mut self) -> Self {
        self.with_targets = true;
        self
    }
}

/// Initialize the tracing subscriber
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_targets)
        .try_init()
        .map_err(|e| Error::internal(format!("failed to initialize tracing: {e}")))?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}
