//! # Autoresearch Agent
//!
//! An autonomous research workflow: given a topic, plan the research, search
//! the web, judge whether the evidence is sufficient (searching again if not),
//! and synthesize a cited report.
//!
//! ```text
//! planner ──▶ researcher ──▶ evaluator ──sufficient──▶ synthesizer ──▶ END
//!                 ▲              │
//!                 └─insufficient─┘
//! ```
//!
//! The workflow talks to the outside world through two capabilities, both
//! injected into the [`ResearchController`]:
//!
//! - [`TextGenerator`]: prompt in, text out (Rig-backed Gemini, OpenAI, Ollama)
//! - [`SearchProvider`]: query in, URL-tagged documents out (Tavily)
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use autoresearch_agent::{build_generator, Config, ResearchController};
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//!
//! let controller = ResearchController::new(
//!     build_generator(&config)?,
//!     Arc::new(config.build_search()?),
//! )?
//! .with_options(config.research_options());
//!
//! let outcome = controller.run("solid-state batteries").await?;
//! for step in &outcome.steps {
//!     println!("✔️ {}", step);
//! }
//! println!("{}", outcome.final_report.report);
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod llm;
pub mod search;
pub mod workflow;

pub use artifacts::{write_artifacts, LogBundle, ResearchDepth};
pub use config::Config;
pub use error::{ArtifactError, GraphBuildError, LlmError, ResearchError, SearchError};
pub use llm::{build_generator, LlmProvider, RigGenerator, TextGenerator};
pub use search::{SearchDepth, SearchHit, SearchOptions, SearchProvider, TavilyClient};
pub use workflow::{
    research_graph, FinalReport, ResearchController, ResearchOptions, ResearchOutcome,
    ResearchState, StateUpdate, StepKind,
};
