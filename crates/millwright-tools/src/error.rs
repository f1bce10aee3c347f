//! Tool error taxonomy
//!
//! TigerStyle: explicit error variants with context.
//!
//! Two families, matching the two propagation policies:
//!
//! - [`ToolError`]: backend-local failures. These never escape a tool
//!   set's `invoke`; they are converted into structured failure results.
//! - [`RemoteError`]: remote MCP client failures. These are raised to the
//!   caller as typed errors, classified so a caller can distinguish
//!   connection-level faults (potentially retriable) from protocol/server
//!   faults. No retry is implemented anywhere in this layer.

use thiserror::Error;

/// Result type for backend-local tool operations
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Backend-local tool errors
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    /// Requested tool name is not registered
    #[error("unknown tool: {name}. Available: {}", .available.join(", "))]
    NotFound { name: String, available: Vec<String> },

    /// A handler rejected its arguments
    #[error("{reason}")]
    Validation { reason: String },

    /// Anything else that went wrong inside a handler
    #[error("internal tool error: {reason}")]
    Internal { reason: String },
}

impl ToolError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Classification string carried in invocation results
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "not_found",
            ToolError::Validation { .. } => "validation",
            ToolError::Internal { .. } => "internal",
        }
    }
}

/// Result type for remote MCP operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote MCP client errors
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    /// Tool absent from the last-discovered set; checked locally before
    /// any network I/O
    #[error("unknown tool: {name}. Available tools: {}. Run discovery to refresh the tool list.", .available.join(", "))]
    ToolNotFound { name: String, available: Vec<String> },

    /// Transport could not connect or timed out
    #[error("connection to MCP server failed: {reason}")]
    Connection { reason: String },

    /// Handshake, discovery, or call failed for any other reason
    #[error("MCP server error: {reason}")]
    Server { reason: String },
}

impl RemoteError {
    /// Create a connection error
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Create a server error
    pub fn server(reason: impl Into<String>) -> Self {
        Self::Server {
            reason: reason.into(),
        }
    }

    /// Classification string carried in invocation results
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::ToolNotFound { .. } => "not_found",
            RemoteError::Connection { .. } => "connection",
            RemoteError::Server { .. } => "server",
        }
    }

    /// Whether this is a connection-level fault
    pub fn is_connection(&self) -> bool {
        matches!(self, RemoteError::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_available_tools() {
        let err = ToolError::NotFound {
            name: "bogus".to_string(),
            available: vec!["get_realtime_data".to_string(), "list_equipment".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        assert!(msg.contains("get_realtime_data"));
        assert!(msg.contains("list_equipment"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ToolError::validation("bad input").kind(), "validation");
        assert_eq!(RemoteError::connection("refused").kind(), "connection");
        assert_eq!(RemoteError::server("handshake failed").kind(), "server");
        assert!(RemoteError::connection("refused").is_connection());
        assert!(!RemoteError::server("oops").is_connection());
    }
}
