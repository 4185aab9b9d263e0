//! # autoresearch
//!
//! Command-line front end for the research workflow.
//!
//! ## Quick Start
//! ```bash
//! export GOOGLE_API_KEY=... TAVILY_API_KEY=...
//! cargo run -- "solid-state batteries"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use autoresearch_agent::artifacts::{write_artifacts, LogBundle, ResearchDepth};
use autoresearch_agent::{
    build_generator, research_graph, Config, LlmProvider, ResearchController, ResearchError,
    SearchError,
};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "autoresearch",
    version,
    about = "Autonomous research agent: plan, search, evaluate, and write a cited report",
    long_about = r#"
Autoresearch - autonomous web research with cited reports.

The agent:
  1. Drafts a short research plan
  2. Searches the web (Tavily)
  3. Judges whether the evidence is sufficient, searching again if not
  4. Writes a report with inline source links

REQUIRED ENVIRONMENT:
  TAVILY_API_KEY                 web search
  GOOGLE_API_KEY                 for --provider gemini (default)
  OPENAI_API_KEY                 for --provider openai
  OLLAMA_API_BASE_URL            for --provider ollama (default http://localhost:11434)

EXAMPLES:
  autoresearch "solid-state batteries"
  autoresearch --provider openai --model gpt-4.1 "CRISPR off-target effects"
  autoresearch --output-dir reports --depth detailed "Rust in the Linux kernel"
  autoresearch --graph
"#
)]
struct Args {
    /// The research topic
    #[arg(value_name = "TOPIC", required_unless_present = "graph")]
    topic: Option<String>,

    /// LLM provider (overrides LLM_PROVIDER)
    #[arg(short = 'p', long = "provider", value_enum, env = "LLM_PROVIDER")]
    provider: Option<LlmProvider>,

    /// Model name (overrides LLM_MODEL)
    #[arg(short = 'm', long = "model", env = "LLM_MODEL")]
    model: Option<String>,

    /// Research depth, recorded in the log bundle
    #[arg(short = 'd', long = "depth", value_enum, default_value_t = ResearchDepth::Standard)]
    depth: ResearchDepth,

    /// Write the report and agent_logs.json into this directory
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the JSON log bundle instead of the human-readable view
    #[arg(long = "json")]
    json: bool,

    /// Print the workflow graph as Mermaid and exit
    #[arg(long = "graph")]
    graph: bool,

    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    if args.graph {
        println!("{}", research_graph()?.to_mermaid());
        return Ok(());
    }

    let topic = args.topic.clone().context("a research topic is required")?;
    if topic.trim().is_empty() {
        bail!("Please enter a topic first");
    }

    let mut config = Config::from_env()?;
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = args.model.clone() {
        info!(model = %model, "Using model from command line");
        config.model = Some(model);
    }
    config.validate()?;

    info!(
        provider = %config.provider,
        model = %config.model(),
        rounds = config.max_research_rounds,
        "Configuration loaded"
    );

    let generator = build_generator(&config)?;
    let search = Arc::new(config.build_search()?);
    let controller =
        ResearchController::new(generator, search)?.with_options(config.research_options());

    let outcome = match controller.run(&topic).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\n❌ Research failed: {}", e);
            if let Some(tip) = failure_tip(&e) {
                eprintln!("\n💡 Tip: {}", tip);
            }
            return Err(e.into());
        }
    };

    let bundle = LogBundle::new(&topic, args.depth, &outcome);

    if args.json {
        println!("{}", bundle.to_json_pretty()?);
    } else {
        for step in &outcome.steps {
            println!("✔️ {}", step);
        }
        println!("\n{}", "=".repeat(60));
        println!("RESEARCH REPORT: {}", topic);
        println!("{}\n", "=".repeat(60));
        println!("{}", outcome.final_report.report);
        println!("\n{}", "=".repeat(60));
    }

    if let Some(dir) = &args.output_dir {
        let paths = write_artifacts(dir, &bundle)
            .with_context(|| format!("failed to write artifacts to {}", dir.display()))?;
        eprintln!("📄 Report: {}", paths.report.display());
        eprintln!("🗂️ Logs:   {}", paths.log.display());
    }

    info!("Research completed successfully");
    Ok(())
}

/// Suggestion for the most common failure causes
fn failure_tip(err: &ResearchError) -> Option<&'static str> {
    match err {
        ResearchError::Search(SearchError::Unauthorized) => {
            Some("Check that TAVILY_API_KEY is set to a valid key.")
        }
        ResearchError::Search(SearchError::RateLimited) => {
            Some("Tavily rate limit hit; wait a moment or check your plan's quota.")
        }
        ResearchError::Search(SearchError::Timeout | SearchError::Connection(_)) => {
            Some("Could not reach the search API; check your network or raise REQUEST_TIMEOUT_SECS.")
        }
        _ => None,
    }
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins unless `--verbose` is given. Output goes to stderr so
/// stdout only ever carries results.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = log_filter(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

/// Filter directives: `debug` when verbose, else `RUST_LOG`, else `info`.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
