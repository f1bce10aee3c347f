//! Retrieval tools exposed to agents
//!
//! Two named search tools over the vector store, following the same
//! convention as every bridged tool: arguments in, a plain string out,
//! never an error. Failures (unknown collection, embedding trouble)
//! render as `Error: `-prefixed text.

use crate::store::VectorStore;
use millwright_core::SEARCH_RESULTS_COUNT_DEFAULT;
use millwright_tools::{AgentTool, AgentToolFn, ParamSpec, ParamType};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Collection holding plant documentation and SOPs
pub const DOCS_COLLECTION: &str = "manufacturing_docs";

/// Collection holding historical maintenance logs
pub const MAINTENANCE_COLLECTION: &str = "maintenance_logs";

/// Build a search tool over one collection
pub fn search_tool(
    store: Arc<VectorStore>,
    collection: &'static str,
    tool_name: &str,
    description: &str,
) -> AgentTool {
    let parameters = vec![
        ParamSpec {
            name: "query".to_string(),
            param_type: ParamType::String,
            description: "The search query to find relevant documentation".to_string(),
            required: true,
            default: None,
        },
        ParamSpec {
            name: "k".to_string(),
            param_type: ParamType::Integer,
            description: "Number of results to return".to_string(),
            required: false,
            default: Some(json!(SEARCH_RESULTS_COUNT_DEFAULT)),
        },
    ];

    let name_for_log = tool_name.to_string();
    let handler: AgentToolFn = Arc::new(move |args: Value| {
        let store = store.clone();
        let name_for_log = name_for_log.clone();
        Box::pin(async move {
            let Some(query) = args.get("query").and_then(Value::as_str) else {
                return "Error: missing required parameter 'query'".to_string();
            };
            let k = args
                .get("k")
                .and_then(Value::as_u64)
                .unwrap_or(SEARCH_RESULTS_COUNT_DEFAULT as u64) as usize;

            match store.query_similarity(collection, query, k).await {
                Ok(hits) if hits.is_empty() => "No relevant documentation found.".to_string(),
                Ok(hits) => {
                    let mut rendered =
                        format!("Found {} relevant documents:\n\n", hits.len());
                    for (i, hit) in hits.iter().enumerate() {
                        rendered.push_str(&format!(
                            "--- Result {} (Source: {}) ---\n{}\n\n",
                            i + 1,
                            hit.document.source,
                            hit.document.content
                        ));
                    }
                    rendered
                }
                Err(err) => {
                    warn!(tool = %name_for_log, error = %err, "Retrieval failed");
                    format!("Error searching documentation: {err}")
                }
            }
        })
    });

    AgentTool::from_fn(tool_name, description, parameters, handler)
}

/// Search tool over plant documentation and SOPs
pub fn docs_search_tool(store: Arc<VectorStore>) -> AgentTool {
    search_tool(
        store,
        DOCS_COLLECTION,
        "search_manufacturing_docs",
        "Search manufacturing documentation, SOPs, and manuals for guidelines and procedures.",
    )
}

/// Search tool over historical maintenance logs
pub fn maintenance_search_tool(store: Arc<VectorStore>) -> AgentTool {
    search_tool(
        store,
        MAINTENANCE_COLLECTION,
        "search_maintenance_history",
        "Search historical maintenance logs for past issues and resolutions.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;

    async fn seeded_store() -> Arc<VectorStore> {
        let store = Arc::new(VectorStore::new(Arc::new(HashEmbedder::default())));
        store
            .add_documents(
                DOCS_COLLECTION,
                vec![(
                    "bearing-sop.md".to_string(),
                    "Bearing replacement requires lockout tagout first".to_string(),
                )],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_returns_formatted_hits() {
        let tool = docs_search_tool(seeded_store().await);
        let rendered = tool.call(json!({"query": "bearing replacement"})).await;
        assert!(rendered.starts_with("Found 1 relevant documents"));
        assert!(rendered.contains("bearing-sop.md"));
        assert!(rendered.contains("lockout tagout"));
    }

    #[tokio::test]
    async fn test_missing_query_is_error_string() {
        let tool = docs_search_tool(seeded_store().await);
        let rendered = tool.call(json!({})).await;
        assert!(rendered.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_unknown_collection_is_error_string() {
        // Maintenance collection never ingested on this store.
        let tool = maintenance_search_tool(seeded_store().await);
        let rendered = tool.call(json!({"query": "anything"})).await;
        assert!(rendered.starts_with("Error searching documentation:"));
    }

    #[tokio::test]
    async fn test_default_k_applied_through_bridge_contract() {
        let store = seeded_store().await;
        let docs: Vec<(String, String)> = (0..10)
            .map(|i| ("notes.md".to_string(), format!("procedure step {i}")))
            .collect();
        store.add_documents(DOCS_COLLECTION, docs).await.unwrap();

        let tool = docs_search_tool(store);
        let rendered = tool.call(json!({"query": "procedure"})).await;
        // Default k = 4 bounds the hit count.
        assert!(rendered.starts_with("Found 4 relevant documents"));
    }

    #[tokio::test]
    async fn test_tool_names_follow_convention() {
        let store = seeded_store().await;
        assert_eq!(
            docs_search_tool(store.clone()).name,
            "search_manufacturing_docs"
        );
        assert_eq!(
            maintenance_search_tool(store).name,
            "search_maintenance_history"
        );
    }
}
