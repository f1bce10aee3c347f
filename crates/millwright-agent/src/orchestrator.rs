//! The orchestrator: a planning agent over specialist subagents
//!
//! The orchestrator is itself a [`Subagent`] whose tool set is the full
//! bridged backend surface plus one `delegate_<name>` tool per
//! specialist. Delegation runs the specialist's own tool loop and returns
//! its text, so a delegation failure surfaces to the orchestrator as an
//! error string rather than an exception.
//!
//! Specialist wiring:
//! - data-retrieval: every backend tool
//! - analysis: the two retrieval (RAG) search tools
//! - reporting: no tools

use crate::llm::LlmClient;
use crate::prompts::{
    ANALYSIS_PROMPT, DATA_RETRIEVAL_PROMPT, ORCHESTRATOR_PROMPT, REPORTING_PROMPT,
};
use crate::subagent::Subagent;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use millwright_tools::{AgentTool, AgentToolFn, ParamSpec, ParamType};

/// Outcome of one orchestrated query
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// Whether the query produced an answer
    pub success: bool,
    /// The answer text (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Error message (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Conversation id for correlation
    pub conversation_id: String,
}

/// The top-level agent
pub struct Orchestrator {
    agent: Subagent,
    subagent_names: Vec<String>,
}

impl Orchestrator {
    /// Build the orchestrator and its three specialists
    ///
    /// `backend_tools` is the bridged surface of every enabled backend;
    /// `retrieval_tools` are the RAG search tools for the analysis
    /// specialist.
    pub fn new(
        llm: Arc<LlmClient>,
        backend_tools: Vec<AgentTool>,
        retrieval_tools: Vec<AgentTool>,
    ) -> Self {
        let specialists = vec![
            Arc::new(Subagent::new(
                llm.clone(),
                "data-retrieval",
                "Fetches data from the plant telemetry, analytics, and maintenance systems",
                DATA_RETRIEVAL_PROMPT,
                backend_tools.clone(),
            )),
            Arc::new(Subagent::new(
                llm.clone(),
                "analysis",
                "Analyzes manufacturing data for trends, anomalies, and insights",
                ANALYSIS_PROMPT,
                retrieval_tools,
            )),
            Arc::new(Subagent::new(
                llm.clone(),
                "reporting",
                "Formats analysis results into clear, actionable reports",
                REPORTING_PROMPT,
                Vec::new(),
            )),
        ];

        let subagent_names = specialists.iter().map(|s| s.name.clone()).collect();

        let mut orchestrator_tools = backend_tools;
        for specialist in &specialists {
            orchestrator_tools.push(delegate_tool(specialist.clone()));
        }

        let agent = Subagent::new(
            llm,
            "orchestrator",
            "Coordinates the manufacturing-operations workflow",
            ORCHESTRATOR_PROMPT,
            orchestrator_tools,
        );

        Self {
            agent,
            subagent_names,
        }
    }

    /// Names of the configured specialists
    pub fn subagent_names(&self) -> &[String] {
        &self.subagent_names
    }

    /// Run a user query through the orchestrator
    ///
    /// Never panics; LLM failures come back as a failed outcome.
    pub async fn run_query(&self, query: &str) -> QueryOutcome {
        let conversation_id = Uuid::new_v4().to_string();
        info!(
            conversation_id = %conversation_id,
            query = %truncate(query, 100),
            "Running query"
        );

        match self.agent.run(query).await {
            Ok(response) => {
                info!(
                    conversation_id = %conversation_id,
                    response_length = response.len(),
                    "Query completed"
                );
                QueryOutcome {
                    success: true,
                    response: Some(response),
                    error: None,
                    conversation_id,
                }
            }
            Err(err) => {
                error!(
                    conversation_id = %conversation_id,
                    error = %err,
                    "Query failed"
                );
                QueryOutcome {
                    success: false,
                    response: None,
                    error: Some(err.to_string()),
                    conversation_id,
                }
            }
        }
    }
}

/// Wrap a specialist as a delegate tool for the orchestrator
fn delegate_tool(specialist: Arc<Subagent>) -> AgentTool {
    let tool_name = format!("delegate_{}", specialist.name.replace('-', "_"));
    let description = format!(
        "Delegate a task to the {} specialist: {}",
        specialist.name, specialist.description
    );
    let parameters = vec![ParamSpec {
        name: "task".to_string(),
        param_type: ParamType::String,
        description: "Self-contained task description for the specialist".to_string(),
        required: true,
        default: None,
    }];

    let handler: AgentToolFn = Arc::new(move |args: Value| {
        let specialist = specialist.clone();
        Box::pin(async move {
            let Some(task) = args.get("task").and_then(Value::as_str) else {
                return "Error: missing required parameter 'task'".to_string();
            };
            match specialist.run(task).await {
                Ok(answer) => answer,
                Err(err) => format!("Error: delegation to {} failed: {err}", specialist.name),
            }
        })
    });

    AgentTool::from_fn(tool_name, description, parameters, handler)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmConfig;
    use crate::test_support::{text_completion, tool_call_completion, ScriptedHttp};
    use millwright_core::http::HttpError;

    fn orchestrator(http: Arc<ScriptedHttp>) -> Orchestrator {
        let llm = Arc::new(LlmClient::new(LlmConfig::new("k"), http));
        Orchestrator::new(llm, Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let http = ScriptedHttp::new(vec![text_completion("All quiet on Line-A.")]);
        let outcome = orchestrator(http).run_query("How is Line-A?").await;

        assert!(outcome.success);
        assert_eq!(outcome.response.as_deref(), Some("All quiet on Line-A."));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_delegation_runs_specialist_loop() {
        // Orchestrator delegates to reporting; the specialist answers
        // in one turn; the orchestrator then finishes.
        let http = ScriptedHttp::new(vec![
            tool_call_completion(
                "call_1",
                "delegate_reporting",
                r#"{"task": "format: Line-A at 97% efficiency"}"#,
            ),
            text_completion("# Line-A Report\nEfficiency: 97%"),
            text_completion("Line-A is at 97% efficiency; report attached."),
        ]);
        let outcome = orchestrator(http.clone()).run_query("report on Line-A").await;

        assert!(outcome.success);
        assert!(outcome.response.unwrap().contains("97%"));
        // orchestrator turn + specialist turn + orchestrator finish
        assert_eq!(http.request_count(), 3);
    }

    #[tokio::test]
    async fn test_llm_failure_is_failed_outcome_not_panic() {
        let http = ScriptedHttp::new(vec![Err(HttpError::ConnectionFailed {
            reason: "refused".to_string(),
        })]);
        let outcome = orchestrator(http).run_query("anything").await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("connection"));
    }

    #[tokio::test]
    async fn test_specialist_failure_becomes_error_string_for_orchestrator() {
        // Delegation's inner LLM call fails; the orchestrator sees an
        // error string and still finishes.
        let http = ScriptedHttp::new(vec![
            tool_call_completion("call_1", "delegate_analysis", r#"{"task": "analyze"}"#),
            Err(HttpError::ConnectionFailed {
                reason: "refused".to_string(),
            }),
            text_completion("Analysis unavailable right now."),
        ]);
        let outcome = orchestrator(http).run_query("analyze trends").await;

        assert!(outcome.success);
        assert_eq!(
            outcome.response.as_deref(),
            Some("Analysis unavailable right now.")
        );
    }

    #[tokio::test]
    async fn test_subagent_names() {
        let http = ScriptedHttp::new(vec![]);
        let orchestrator = orchestrator(http);
        assert_eq!(
            orchestrator.subagent_names(),
            ["data-retrieval", "analysis", "reporting"]
        );
    }
}
