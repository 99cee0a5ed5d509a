use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use explorer_agent::{config, demo, logging};
use explorer_engine::session::StageContext;
use explorer_engine::{runner, EngineConfig};
use explorer_types::{Credentials, NormalizedUrl, SessionId};
use tracing::info;

/// Autonomous web-exploration agent: drives a headless browser through an
/// LLM-powered decision loop and records discovered states as a graph.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to config/explorer.toml, then
    /// the platform config dir).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG when set.
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Explore a real site. Requires a `BrowserDriver`/`GraphStore` pair
    /// to be wired in by the integrator — this CLI ships only the trait
    /// boundary and the in-memory test doubles.
    Run {
        /// Starting URL.
        #[arg(long)]
        start_url: String,
        /// Login username, if the target requires authentication.
        #[arg(long)]
        username: Option<String>,
        /// Login password, if the target requires authentication.
        #[arg(long)]
        password: Option<String>,
        /// Override the configured recursion limit.
        #[arg(long)]
        recursion_limit: Option<u32>,
    },
    /// Run the self-contained demo scenario (scripted browser/LLM/graph
    /// store, no network calls) to exercise the full loop end-to-end.
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = config::load(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(&cli.log_level, loaded.log_file.as_ref())?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting explorer-agent");

    match cli.command {
        Commands::Run { start_url, username, password, recursion_limit } => {
            run_real(loaded.engine, start_url, username, password, recursion_limit).await
        }
        Commands::Demo => run_demo().await,
    }
}

async fn run_real(
    mut engine_config: EngineConfig,
    start_url: String,
    username: Option<String>,
    password: Option<String>,
    recursion_limit: Option<u32>,
) -> Result<()> {
    if let Some(limit) = recursion_limit {
        engine_config.recursion_limit = limit;
    }

    Err(anyhow!(
        "no BrowserDriver/GraphStore implementation is linked in; integrate one against \
         explorer_engine::traits::{{BrowserDriver, GraphStore}} or run `explorer demo` to see \
         the loop run end-to-end against the built-in test doubles \
         (requested start_url={start_url}, has_credentials={})",
        username.is_some() && password.is_some()
    ))
}

async fn run_demo() -> Result<()> {
    let (browser, llm, graph) = demo::build_collaborators();
    let credentials = Some(Credentials::new("admin", "admin123"));

    let ctx = StageContext::new(
        SessionId::new(),
        EngineConfig::default(),
        browser,
        llm,
        graph,
        credentials,
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize(demo::DEMO_START_URL)).await;

    info!(status = ?final_state.exploration_status, steps = final_state.action_history.len(), "demo run finished");
    for entry in &final_state.action_history {
        println!("[{}] {}", entry.stage, entry.summary);
    }
    Ok(())
}
