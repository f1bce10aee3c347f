//! Millwright Tools - the MCP tool layer
//!
//! # Overview
//!
//! This crate provides:
//! - A per-backend tool registry ([`ToolSet`]) with tagged invocation
//!   results
//! - Three mock manufacturing backends (telemetry, analytics, maintenance)
//!   that answer with schema-consistent synthetic data
//! - A client for one real remote MCP server over streamable HTTP, with a
//!   TTL cache over tool discovery
//! - A bridge that turns any backend's tools into string-returning
//!   callables for an agent runtime
//!
//! # Example
//!
//! ```rust,ignore
//! use millwright_core::IoContext;
//! use millwright_tools::{bridge_backend, TelemetryBackend};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(TelemetryBackend::new(IoContext::production()));
//! let tools = bridge_backend(backend).await;
//! let reading = tools[0]
//!     .call(serde_json::json!({
//!         "equipment_id": "CNC-Machine-1",
//!         "tag_name": "Temperature"
//!     }))
//!     .await;
//! ```

pub mod backends;
pub mod bridge;
pub mod error;
pub mod http_client;
pub mod registry;
pub mod remote;
pub mod traits;

pub use backends::{AnalyticsBackend, MaintenanceBackend, TelemetryBackend};
pub use bridge::{
    bridge_backend, derive_params, AgentTool, AgentToolFn, ParamSpec, ParamType, PARAM_TYPE_TABLE,
};
pub use error::{RemoteError, RemoteResult, ToolError, ToolResult};
pub use http_client::{default_http_client, ReqwestClient};
pub use registry::ToolSet;
pub use remote::{
    CachedRemote, ContentItem, DiscoveredTool, RemoteBackend, RemoteConfig, RemoteToolServer,
    REMOTE_BACKEND_NAME,
};
pub use traits::{Backend, BackendInfo, Invocation, ToolDescriptor, ToolHandler};

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_core::IoContext;

    #[test]
    fn test_public_types_accessible() {
        let _registry = ToolSet::new("smoke", "smoke test");
        let _backend = TelemetryBackend::new(IoContext::seeded(1, 0));
        let _outcome = Invocation::success(serde_json::json!({}));
    }
}
