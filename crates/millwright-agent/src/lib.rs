//! Millwright Agent - orchestration layer
//!
//! An LLM-backed orchestrator that answers manufacturing-operations
//! questions by delegating to three specialists (data-retrieval,
//! analysis, reporting), each scoped to a subset of the bridged tools.
//! The LLM transport is the `HttpClient` trait, so every loop in this
//! crate is testable with scripted responses.

pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod subagent;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AgentError, AgentResult};
pub use llm::{
    AssistantTurn, ChatMessage, LlmClient, LlmConfig, ToolCall, ToolDefinition,
};
pub use orchestrator::{Orchestrator, QueryOutcome};
pub use subagent::Subagent;
