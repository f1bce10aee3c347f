//! Agent layer errors

use thiserror::Error;

/// Result type for agent operations
pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Agent layer errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// No LLM credentials available
    #[error("LLM not configured: {reason}")]
    NotConfigured { reason: String },

    /// Transport to the LLM provider failed
    #[error("LLM connection failed: {reason}")]
    Connection { reason: String },

    /// The provider answered with a non-success status
    #[error("LLM API error (HTTP {status}): {reason}")]
    Api { status: u16, reason: String },

    /// The provider's response did not match the expected shape
    #[error("LLM protocol error: {reason}")]
    Protocol { reason: String },
}

impl AgentError {
    /// Create a protocol error
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }
}
