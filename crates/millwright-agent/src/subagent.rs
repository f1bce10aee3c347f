//! Task-scoped subagent with a bounded tool-calling loop
//!
//! A subagent owns a system prompt and a subset of the bridged tools.
//! `run` drives the LLM through up to [`AGENT_TURNS_COUNT_MAX`] rounds:
//! each round either ends with assistant text or issues tool calls, which
//! are dispatched sequentially and answered with their string results.
//! Tool dispatch never raises; an unknown tool name is answered with an
//! error string the model can react to.

use crate::error::AgentResult;
use crate::llm::{AssistantTurn, ChatMessage, LlmClient, ToolCall, ToolDefinition};
use std::sync::Arc;
use tracing::{debug, info};

use millwright_core::AGENT_TURNS_COUNT_MAX;
use millwright_tools::AgentTool;

/// A specialist agent scoped to a subset of tools
pub struct Subagent {
    /// Subagent name
    pub name: String,
    /// Description shown to the orchestrator
    pub description: String,
    system_prompt: String,
    tools: Vec<AgentTool>,
    llm: Arc<LlmClient>,
}

impl Subagent {
    /// Create a subagent
    pub fn new(
        llm: Arc<LlmClient>,
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: Vec<AgentTool>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            tools,
            llm,
        }
    }

    /// Names of the tools this subagent can call
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    /// Run one task to completion
    pub async fn run(&self, task: &str) -> AgentResult<String> {
        let tool_definitions: Vec<ToolDefinition> = self
            .tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema(),
            })
            .collect();

        let mut messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(task),
        ];

        let mut last_text: Option<String> = None;
        for turn_index in 0..AGENT_TURNS_COUNT_MAX {
            let turn = self.llm.chat(&messages, &tool_definitions).await?;

            if turn.tool_calls.is_empty() {
                let answer = turn.content.unwrap_or_default();
                info!(agent = %self.name, turns = turn_index + 1, "Subagent finished");
                return Ok(answer);
            }

            last_text = turn.content.clone().or(last_text);
            messages.push(ChatMessage::assistant(&turn));
            self.dispatch_calls(&turn, &mut messages).await;
        }

        info!(agent = %self.name, "Subagent hit turn limit");
        Ok(last_text.unwrap_or_else(|| {
            format!(
                "Agent '{}' stopped after {AGENT_TURNS_COUNT_MAX} turns without a final answer.",
                self.name
            )
        }))
    }

    async fn dispatch_calls(&self, turn: &AssistantTurn, messages: &mut Vec<ChatMessage>) {
        for call in &turn.tool_calls {
            let result = self.dispatch(call).await;
            messages.push(ChatMessage::tool_result(&call.id, result));
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> String {
        debug!(agent = %self.name, tool = %call.name, "Dispatching tool call");
        match self.tools.iter().find(|t| t.name == call.name) {
            Some(tool) => tool.call(call.arguments.clone()).await,
            None => format!(
                "Error: unknown tool: {}. Available: {}",
                call.name,
                self.tool_names().join(", ")
            ),
        }
    }
}
