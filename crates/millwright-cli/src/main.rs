//! Millwright CLI
//!
//! Entry point wiring the whole stack: configuration, telemetry, the mock
//! backends, the optional remote MCP server, the retrieval store, and the
//! orchestrator. Runs either an interactive session or a single query.

mod repl;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use millwright_agent::{LlmClient, LlmConfig, Orchestrator};
use millwright_core::{IoContext, MillwrightConfig};
use millwright_rag::{
    docs_search_tool, load_directory, maintenance_search_tool, HashEmbedder, VectorStore,
    DOCS_COLLECTION, MAINTENANCE_COLLECTION,
};
use millwright_tools::{
    bridge_backend, default_http_client, AgentTool, AnalyticsBackend, Backend, CachedRemote,
    MaintenanceBackend, RemoteBackend, RemoteConfig, RemoteToolServer, TelemetryBackend,
};

/// Millwright: a manufacturing-operations agent
#[derive(Parser, Debug)]
#[command(name = "millwright")]
#[command(about = "LLM agent for manufacturing-operations questions")]
#[command(version)]
struct Cli {
    /// Run mode
    #[arg(long, value_enum, default_value = "interactive")]
    mode: Mode,

    /// Query to run in single mode
    #[arg(long)]
    query: Option<String>,

    /// Documentation directory for retrieval ingestion
    #[arg(long)]
    docs_dir: Option<String>,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Interactive chat session
    Interactive,
    /// One query, one answer
    Single,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let fallback = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    let mut config = MillwrightConfig::from_env();
    if let Some(docs_dir) = &cli.docs_dir {
        config.rag.docs_dir = docs_dir.clone();
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        mode = ?cli.mode,
        remote_enabled = config.remote.enabled,
        "Starting millwright"
    );

    let orchestrator = build_orchestrator(&config).await?;

    match cli.mode {
        Mode::Single => {
            let Some(query) = cli.query else {
                bail!("--query is required in single mode");
            };
            run_single(&orchestrator, &query).await
        }
        Mode::Interactive => repl::run(&orchestrator, &config).await,
    }
}

/// Wire backends, retrieval, and the LLM into an orchestrator
async fn build_orchestrator(config: &MillwrightConfig) -> Result<Orchestrator> {
    let io = IoContext::production();
    let http = default_http_client().context("failed to build HTTP client")?;

    // Mock backends, per enable flags
    let mut backends: Vec<Arc<dyn Backend>> = Vec::new();
    if config.backends.telemetry_enabled {
        backends.push(Arc::new(TelemetryBackend::new(io.clone())));
    }
    if config.backends.analytics_enabled {
        backends.push(Arc::new(AnalyticsBackend::new(io.clone())));
    }
    if config.backends.maintenance_enabled {
        backends.push(Arc::new(MaintenanceBackend::new(io.clone())));
    }

    // Remote MCP server: discovery failure is logged, not fatal; its
    // tools stay unavailable until a later refresh succeeds.
    if config.remote.enabled {
        let server = Arc::new(RemoteToolServer::new(
            RemoteConfig::from_settings(&config.remote),
            http.clone(),
        ));
        let cache = CachedRemote::new(server.clone(), io.time.clone());
        match cache.get(false).await {
            Ok(_) => {
                let tool_count = server.discovered_tools().await.len();
                tracing::info!(tools = tool_count, "Remote MCP server connected");
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Remote MCP server unavailable");
            }
        }
        backends.push(Arc::new(RemoteBackend::new(server)));
    }

    let mut backend_tools: Vec<AgentTool> = Vec::new();
    for backend in &backends {
        let tools = bridge_backend(backend.clone()).await;
        tracing::info!(backend = backend.name(), tools = tools.len(), "Backend bridged");
        backend_tools.extend(tools);
    }

    // Retrieval layer
    let retrieval_tools = if config.rag.enabled {
        let store = Arc::new(VectorStore::new(Arc::new(HashEmbedder::default())));
        ingest_documents(&store, &config.rag.docs_dir).await?;
        vec![
            docs_search_tool(store.clone()),
            maintenance_search_tool(store),
        ]
    } else {
        Vec::new()
    };

    let llm_config = LlmConfig::from_env().context("LLM configuration missing")?;
    tracing::info!(model = %llm_config.model, "LLM configured");
    let llm = Arc::new(LlmClient::new(llm_config, http));

    Ok(Orchestrator::new(llm, backend_tools, retrieval_tools))
}

/// Ingest plant docs and maintenance logs into their collections
///
/// `<docs_dir>/*.{md,txt}` feeds the documentation collection;
/// `<docs_dir>/maintenance/*.{md,txt}` feeds the maintenance-log
/// collection. Missing directories simply ingest nothing.
async fn ingest_documents(
    store: &Arc<VectorStore>,
    docs_dir: &str,
) -> Result<()> {
    let docs = load_directory(docs_dir).context("failed to load documentation")?;
    if !docs.is_empty() {
        store
            .add_documents(DOCS_COLLECTION, docs)
            .await
            .context("failed to ingest documentation")?;
    }

    let maintenance_dir = format!("{docs_dir}/maintenance");
    let logs = load_directory(&maintenance_dir).context("failed to load maintenance logs")?;
    if !logs.is_empty() {
        store
            .add_documents(MAINTENANCE_COLLECTION, logs)
            .await
            .context("failed to ingest maintenance logs")?;
    }

    Ok(())
}

/// Single-query mode: print the answer or fail with a non-zero exit
async fn run_single(orchestrator: &Orchestrator, query: &str) -> Result<()> {
    println!("\n{}", "=".repeat(60));
    println!("{}", "Millwright - Single Query".bold());
    println!("{}", "=".repeat(60));
    println!("\nQuery: {query}\n");

    let outcome = orchestrator.run_query(query).await;

    if outcome.success {
        println!("Response:");
        println!("{}", "-".repeat(60));
        println!("{}", outcome.response.unwrap_or_default());
        println!("\n{}", "=".repeat(60));
        Ok(())
    } else {
        let error = outcome.error.unwrap_or_else(|| "unknown error".to_string());
        eprintln!("{} {error}", "✗".red());
        bail!("query failed");
    }
}
