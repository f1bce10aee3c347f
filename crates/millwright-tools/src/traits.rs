//! Tool and backend abstractions
//!
//! TigerStyle: explicit value types at every seam.
//!
//! A backend is anything that can list named tools and invoke them:
//! the three in-process simulators and the remote MCP adapter all satisfy
//! [`Backend`]. Handlers return a typed `Result` directly; the registry
//! converts failures into tagged [`Invocation`] values so a single
//! malformed call can never take a backend down.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use millwright_core::PROTOCOL_VERSION;

/// A named tool definition in MCP listing shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    /// Unique tool name within its backend
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// JSON Schema describing accepted arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a descriptor
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Handler owned by the registry that created it
///
/// Takes the argument object and returns either backend-specific data or a
/// typed error. Handlers are synchronous: the simulators never suspend.
pub type ToolHandler = Arc<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

/// Tagged outcome of a tool invocation
///
/// Either `{success: true, data}` or `{success: false, error, error_kind}`.
/// There are no partial-success states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    /// Whether the call succeeded
    pub success: bool,
    /// Backend-specific result data (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error message (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error classification (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl Invocation {
    /// Successful outcome
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Failed outcome from a backend-local error
    pub fn failure(err: &ToolError) -> Self {
        Self::failure_with_kind(err.to_string(), err.kind())
    }

    /// Failed outcome with an explicit classification
    pub fn failure_with_kind(error: impl Into<String>, kind: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: Some(kind.to_string()),
        }
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Backend metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name
    pub name: String,
    /// Backend description
    pub description: String,
    /// Names of the tools it serves
    pub tools: Vec<String>,
    /// Protocol version constant
    pub protocol_version: String,
}

impl BackendInfo {
    /// Create backend metadata with the workspace protocol version
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tools: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tools,
            protocol_version: PROTOCOL_VERSION.to_string(),
        }
    }
}

/// Capability contract every backend satisfies
///
/// Tools are registered at construction time; the set is immutable
/// afterwards and lives for the process lifetime.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Backend description
    fn description(&self) -> &str;

    /// All tool definitions, in registration order
    async fn list_tools(&self) -> Vec<ToolDescriptor>;

    /// Invoke a tool by name
    ///
    /// Never fails structurally: unknown names and handler errors come
    /// back as failure [`Invocation`]s.
    async fn invoke(&self, tool_name: &str, args: Value) -> Invocation;

    /// Backend metadata
    async fn info(&self) -> BackendInfo;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serializes_to_mcp_shape() {
        let descriptor = ToolDescriptor::new(
            "get_realtime_data",
            "Get the current value of a tag",
            json!({"type": "object", "properties": {}}),
        );
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "get_realtime_data");
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn test_invocation_success_shape() {
        let inv = Invocation::success(json!({"value": 71.2}));
        assert!(inv.is_success());
        let value = serde_json::to_value(&inv).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_invocation_failure_carries_kind() {
        let err = ToolError::validation("unknown equipment: Lathe-9");
        let inv = Invocation::failure(&err);
        assert!(!inv.is_success());
        assert_eq!(inv.error_kind.as_deref(), Some("validation"));
        assert!(inv.error.unwrap().contains("Lathe-9"));
    }

    #[test]
    fn test_backend_info_protocol_version() {
        let info = BackendInfo::new("telemetry-sim", "desc", vec!["a".to_string()]);
        assert_eq!(info.protocol_version, "1.0");
    }
}
