//! LLM client for agent message processing
//!
//! OpenAI-compatible chat completions with function calling, spoken over
//! the `HttpClient` trait so tests can script responses without a network.
//! Tool definitions are built from bridged tools' parameter schemas.

use crate::error::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use millwright_core::http::{HttpClient, HttpRequest};

/// Default chat completion endpoint base
const OPENAI_BASE_URL_DEFAULT: &str = "https://api.openai.com/v1";

/// Default model
const MODEL_DEFAULT: &str = "gpt-4o";

/// Default sampling temperature
const TEMPERATURE_DEFAULT: f64 = 0.7;

/// Default completion token budget
const MAX_TOKENS_DEFAULT: u32 = 2048;

/// Request timeout for chat completions (2 minutes)
const LLM_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// LLM provider configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL (OpenAI-compatible)
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Model to use
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Max tokens in the response
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Create a configuration with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL_DEFAULT.to_string(),
            api_key: api_key.into(),
            model: MODEL_DEFAULT.to_string(),
            temperature: TEMPERATURE_DEFAULT,
            max_tokens: MAX_TOKENS_DEFAULT,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`,
    /// `MILLWRIGHT_MODEL`, and `MILLWRIGHT_TEMPERATURE`.
    pub fn from_env() -> AgentResult<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| AgentError::NotConfigured {
            reason: "OPENAI_API_KEY is not set".to_string(),
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("MILLWRIGHT_MODEL") {
            config.model = model;
        }
        if let Ok(temperature) = env::var("MILLWRIGHT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                config.temperature = value;
            }
        }
        Ok(config)
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for the arguments
    pub parameters: Value,
}

/// Chat message in OpenAI wire shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: String,
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls issued by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallPayload>>,
    /// Id of the tool call a tool message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Assistant message echoing a model turn (text and/or tool calls)
    pub fn assistant(turn: &AssistantTurn) -> Self {
        let tool_calls = if turn.tool_calls.is_empty() {
            None
        } else {
            Some(
                turn.tool_calls
                    .iter()
                    .map(|call| ToolCallPayload {
                        id: call.id.clone(),
                        call_type: "function".to_string(),
                        function: FunctionPayload {
                            name: call.name.clone(),
                            arguments: call.arguments.to_string(),
                        },
                    })
                    .collect(),
            )
        };
        Self {
            role: "assistant".to_string(),
            content: turn.content.clone(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Tool result message answering one tool call
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Tool call payload in OpenAI wire shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionPayload,
}

/// Function payload of a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionPayload {
    pub name: String,
    /// Arguments as a JSON-encoded string, per the wire format
    pub arguments: String,
}

/// One parsed tool call from the model
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Provider-assigned call id
    pub id: String,
    /// Tool name
    pub name: String,
    /// Parsed arguments; malformed JSON degrades to an empty object
    pub arguments: Value,
}

/// One assistant turn: text and/or tool calls
#[derive(Debug, Clone, Default)]
pub struct AssistantTurn {
    /// Assistant text, if any
    pub content: Option<String>,
    /// Tool calls, if any
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

/// OpenAI-compatible chat client
pub struct LlmClient {
    config: LlmConfig,
    http: Arc<dyn HttpClient>,
}

impl LlmClient {
    /// Create a client over the given transport
    pub fn new(config: LlmConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    /// Model identifier in use
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One chat completion round trip
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> AgentResult<AssistantTurn> {
        let mut body = Map::new();
        body.insert("model".to_string(), json!(self.config.model));
        body.insert("messages".to_string(), json!(messages));
        body.insert("temperature".to_string(), json!(self.config.temperature));
        body.insert("max_tokens".to_string(), json!(self.config.max_tokens));
        if !tools.is_empty() {
            let tool_payloads: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body.insert("tools".to_string(), json!(tool_payloads));
        }

        let request = HttpRequest::post(format!("{}/chat/completions", self.config.base_url))
            .with_header("Authorization", format!("Bearer {}", self.config.api_key))
            .with_json_body(&Value::Object(body))
            .with_timeout(Duration::from_millis(LLM_REQUEST_TIMEOUT_MS));

        let response = self.http.execute(request).await.map_err(|e| {
            AgentError::Connection {
                reason: e.to_string(),
            }
        })?;

        if !response.is_success() {
            let reason: String = response.body.chars().take(500).collect();
            return Err(AgentError::Api {
                status: response.status,
                reason,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)
            .map_err(|e| AgentError::protocol(format!("invalid completion response: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::protocol("completion response had no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|payload| {
                let arguments = serde_json::from_str(&payload.function.arguments)
                    .unwrap_or_else(|_| json!({}));
                ToolCall {
                    id: payload.id,
                    name: payload.function.name,
                    arguments,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            model = %self.config.model,
            tool_calls = tool_calls.len(),
            "Chat completion received"
        );

        Ok(AssistantTurn {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{text_completion, tool_call_completion, ScriptedHttp};
    use millwright_core::http::{HttpError, HttpResponse};

    fn client(http: Arc<ScriptedHttp>) -> LlmClient {
        LlmClient::new(
            LlmConfig::new("test-key").with_model("test-model"),
            http,
        )
    }

    #[tokio::test]
    async fn test_chat_returns_text_turn() {
        let http = ScriptedHttp::new(vec![text_completion("All lines nominal.")]);
        let turn = client(http.clone())
            .chat(&[ChatMessage::user("status?")], &[])
            .await
            .unwrap();

        assert_eq!(turn.content.as_deref(), Some("All lines nominal."));
        assert!(turn.tool_calls.is_empty());

        let request = http.last_request();
        assert!(request.url.ends_with("/chat/completions"));
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer test-key")
        );
        // No tools were supplied, so none are advertised.
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_chat_parses_tool_calls() {
        let http = ScriptedHttp::new(vec![tool_call_completion(
            "call_1",
            "get_realtime_data",
            r#"{"equipment_id": "CNC-Machine-1", "tag_name": "Temperature"}"#,
        )]);
        let tools = vec![ToolDefinition {
            name: "get_realtime_data".to_string(),
            description: "reads a tag".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];

        let turn = client(http)
            .chat(&[ChatMessage::user("temp?")], &tools)
            .await
            .unwrap();
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "get_realtime_data");
        assert_eq!(turn.tool_calls[0].arguments["tag_name"], "Temperature");
    }

    #[tokio::test]
    async fn test_malformed_arguments_degrade_to_empty_object() {
        let http = ScriptedHttp::new(vec![tool_call_completion(
            "call_1",
            "list_equipment",
            "{not json",
        )]);
        let turn = client(http)
            .chat(&[ChatMessage::user("list")], &[])
            .await
            .unwrap();
        assert_eq!(turn.tool_calls[0].arguments, json!({}));
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let http = ScriptedHttp::new(vec![Ok(HttpResponse::new(429, "slow down"))]);
        let err = client(http)
            .chat(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_is_connection() {
        let http = ScriptedHttp::new(vec![Err(HttpError::ConnectionFailed {
            reason: "refused".to_string(),
        })]);
        let err = client(http)
            .chat(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Connection { .. }));
    }

    #[test]
    fn test_tool_message_wire_shape() {
        let message = ChatMessage::tool_result("call_9", "72.4");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_9");
        assert!(value.get("tool_calls").is_none());
    }
}
