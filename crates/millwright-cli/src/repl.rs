//! Interactive chat loop

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use millwright_agent::Orchestrator;
use millwright_core::MillwrightConfig;

/// Run the interactive session until exit/quit or EOF
pub async fn run(orchestrator: &Orchestrator, config: &MillwrightConfig) -> Result<()> {
    print_banner(config);

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("\n🏭 You: ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if matches!(query.to_lowercase().as_str(), "exit" | "quit" | "q") {
                    println!("\nGoodbye!");
                    break;
                }
                let _ = editor.add_history_entry(query);

                println!("\n{} thinking...", "🤖 Agent:".bold());
                let outcome = orchestrator.run_query(query).await;
                if outcome.success {
                    println!("{}", outcome.response.unwrap_or_default());
                } else {
                    let error =
                        outcome.error.unwrap_or_else(|| "unknown error".to_string());
                    println!("{} {error}", "✗".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                tracing::error!(error = %err, "Readline failed");
                break;
            }
        }
    }

    Ok(())
}

fn print_banner(config: &MillwrightConfig) {
    println!("{}", "=".repeat(60));
    println!(
        "{}",
        "Millwright - Manufacturing Operations Agent".bold().cyan()
    );
    println!("{}", "=".repeat(60));
    println!("\nConfiguration:");
    println!(
        "  • Backends: telemetry={} analytics={} maintenance={}",
        config.backends.telemetry_enabled,
        config.backends.analytics_enabled,
        config.backends.maintenance_enabled
    );
    println!(
        "  • Remote MCP: {}",
        if config.remote.enabled {
            config.remote.url.as_str()
        } else {
            "disabled"
        }
    );
    println!("  • Docs: {}", config.rag.docs_dir);
    println!("\nThe agent can:");
    println!("  - Fetch real-time equipment data");
    println!("  - Analyze production metrics and quality trends");
    println!("  - Query work orders and inventory");
    println!("  - Create maintenance tickets");
    println!("\nType 'exit' or 'quit' to end the session");
    println!("{}", "=".repeat(60));
}
