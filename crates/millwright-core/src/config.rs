//! Configuration for Millwright
//!
//! TigerStyle: explicit defaults, validation, environment loading.
//!
//! Configuration is read once at startup from `MILLWRIGHT_*` environment
//! variables and validated before any component is constructed. LLM
//! credentials are owned by `millwright-agent` and are not duplicated here.

use crate::constants::{REMOTE_CONNECT_TIMEOUT_MS_DEFAULT, REMOTE_READ_TIMEOUT_MS_DEFAULT};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default remote MCP endpoint
const REMOTE_URL_DEFAULT: &str = "http://localhost:45345/mcp";

/// Default documentation directory for retrieval ingestion
const RAG_DOCS_DIR_DEFAULT: &str = "./docs";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MillwrightConfig {
    /// Mock backend toggles
    #[serde(default)]
    pub backends: BackendConfig,

    /// Remote MCP server settings
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Retrieval layer settings
    #[serde(default)]
    pub rag: RagConfig,

    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MillwrightConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - `MILLWRIGHT_TELEMETRY_ENABLED`, `MILLWRIGHT_ANALYTICS_ENABLED`,
    ///   `MILLWRIGHT_MAINTENANCE_ENABLED` (default true)
    /// - `MILLWRIGHT_REMOTE_ENABLED` (default false),
    ///   `MILLWRIGHT_REMOTE_URL`, `MILLWRIGHT_REMOTE_BEARER_TOKEN`,
    ///   `MILLWRIGHT_REMOTE_CONNECT_TIMEOUT_MS`,
    ///   `MILLWRIGHT_REMOTE_READ_TIMEOUT_MS`
    /// - `MILLWRIGHT_DOCS_DIR`, `MILLWRIGHT_RAG_ENABLED` (default true)
    /// - `MILLWRIGHT_LOG_LEVEL` (default "info")
    pub fn from_env() -> Self {
        Self {
            backends: BackendConfig {
                telemetry_enabled: env_bool("MILLWRIGHT_TELEMETRY_ENABLED", true),
                analytics_enabled: env_bool("MILLWRIGHT_ANALYTICS_ENABLED", true),
                maintenance_enabled: env_bool("MILLWRIGHT_MAINTENANCE_ENABLED", true),
            },
            remote: RemoteSettings {
                enabled: env_bool("MILLWRIGHT_REMOTE_ENABLED", false),
                url: std::env::var("MILLWRIGHT_REMOTE_URL")
                    .unwrap_or_else(|_| REMOTE_URL_DEFAULT.to_string()),
                bearer_token: std::env::var("MILLWRIGHT_REMOTE_BEARER_TOKEN").ok(),
                connect_timeout_ms: env_u64(
                    "MILLWRIGHT_REMOTE_CONNECT_TIMEOUT_MS",
                    REMOTE_CONNECT_TIMEOUT_MS_DEFAULT,
                ),
                read_timeout_ms: env_u64(
                    "MILLWRIGHT_REMOTE_READ_TIMEOUT_MS",
                    REMOTE_READ_TIMEOUT_MS_DEFAULT,
                ),
            },
            rag: RagConfig {
                enabled: env_bool("MILLWRIGHT_RAG_ENABLED", true),
                docs_dir: std::env::var("MILLWRIGHT_DOCS_DIR")
                    .unwrap_or_else(|_| RAG_DOCS_DIR_DEFAULT.to_string()),
            },
            log_level: std::env::var("MILLWRIGHT_LOG_LEVEL")
                .unwrap_or_else(|_| default_log_level()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.remote.validate()?;
        Ok(())
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Per-backend enable flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Equipment telemetry simulator
    #[serde(default = "default_true")]
    pub telemetry_enabled: bool,
    /// Production analytics simulator
    #[serde(default = "default_true")]
    pub analytics_enabled: bool,
    /// Work-order / inventory simulator
    #[serde(default = "default_true")]
    pub maintenance_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            telemetry_enabled: true,
            analytics_enabled: true,
            maintenance_enabled: true,
        }
    }
}

/// Remote MCP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Whether to connect to the remote server at startup
    #[serde(default)]
    pub enabled: bool,
    /// Streamable-HTTP endpoint
    #[serde(default = "default_remote_url")]
    pub url: String,
    /// Optional bearer token for the Authorization header
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Read timeout for streaming responses in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

fn default_remote_url() -> String {
    REMOTE_URL_DEFAULT.to_string()
}

fn default_connect_timeout() -> u64 {
    REMOTE_CONNECT_TIMEOUT_MS_DEFAULT
}

fn default_read_timeout() -> u64 {
    REMOTE_READ_TIMEOUT_MS_DEFAULT
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_remote_url(),
            bearer_token: None,
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl RemoteSettings {
    fn validate(&self) -> Result<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::invalid_configuration(
                "remote.url",
                "must start with http:// or https://",
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::invalid_configuration(
                "remote.connect_timeout_ms",
                "must be non-zero",
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(Error::invalid_configuration(
                "remote.read_timeout_ms",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Retrieval layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Whether to ingest documents and expose search tools
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory of .md/.txt documents to ingest
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
}

fn default_docs_dir() -> String {
    RAG_DOCS_DIR_DEFAULT.to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            docs_dir: default_docs_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MillwrightConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.backends.telemetry_enabled);
        assert!(!config.remote.enabled);
    }

    #[test]
    fn test_invalid_remote_url() {
        let mut config = MillwrightConfig::default();
        config.remote.url = "localhost:45345".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = MillwrightConfig::default();
        config.remote.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_remote_defaults() {
        let settings = RemoteSettings::default();
        assert_eq!(settings.url, "http://localhost:45345/mcp");
        assert_eq!(settings.connect_timeout_ms, 30_000);
        assert_eq!(settings.read_timeout_ms, 300_000);
        assert!(settings.bearer_token.is_none());
    }
}
