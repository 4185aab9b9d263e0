//! Research controller
//!
//! Drives a [`BuiltGraph`] from its entry point to `END`: invoke the current
//! step, merge its update into the running state, ask the graph for the next
//! step. Steps run strictly one after another.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::graph::{research_graph, BuiltGraph, Next, StepKind};
use super::state::{FinalReport, ResearchState, StateUpdate};
use super::steps::{self, ResearchOptions, StepContext};
use crate::error::ResearchError;
use crate::llm::TextGenerator;
use crate::search::SearchProvider;

/// What a completed run hands back to its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutcome {
    /// Ordered trace log, one entry per step invocation
    pub steps: Vec<String>,
    pub final_report: FinalReport,
}

impl From<ResearchState> for ResearchOutcome {
    fn from(state: ResearchState) -> Self {
        Self {
            steps: state.steps,
            // Only a custom graph that never reaches the synthesizer leaves this unset
            final_report: state.final_report.unwrap_or_default(),
        }
    }
}

/// Runs research workflows.
///
/// Capabilities are injected once and shared by every run; each run owns its
/// own [`ResearchState`].
///
/// # Example
/// ```ignore
/// let controller = ResearchController::new(generator, search)?;
/// let outcome = controller.run("solid-state batteries").await?;
/// println!("{}", outcome.final_report.report);
/// ```
pub struct ResearchController {
    generator: Arc<dyn TextGenerator>,
    search: Arc<dyn SearchProvider>,
    options: ResearchOptions,
    graph: BuiltGraph,
}

impl ResearchController {
    /// Controller over the standard research graph
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self, ResearchError> {
        Ok(Self {
            generator,
            search,
            options: ResearchOptions::default(),
            graph: research_graph()?,
        })
    }

    pub fn with_options(mut self, options: ResearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the graph (alternative wirings, tests)
    pub fn with_graph(mut self, graph: BuiltGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn options(&self) -> &ResearchOptions {
        &self.options
    }

    pub fn graph(&self) -> &BuiltGraph {
        &self.graph
    }

    /// Run the workflow and return the trace log and final report.
    pub async fn run(&self, topic: &str) -> Result<ResearchOutcome, ResearchError> {
        self.execute(topic).await.map(ResearchOutcome::from)
    }

    /// Run the workflow and return the terminal state.
    pub async fn execute(&self, topic: &str) -> Result<ResearchState, ResearchError> {
        if topic.trim().is_empty() {
            return Err(ResearchError::EmptyTopic);
        }

        info!(
            topic = %topic,
            graph = self.graph.name(),
            provider = self.generator.name(),
            model = self.generator.model(),
            "Starting research run"
        );

        let ctx = StepContext {
            generator: self.generator.as_ref(),
            search: self.search.as_ref(),
            options: &self.options,
        };

        let mut state = ResearchState::new(topic);
        let mut current = Next::Step(self.graph.entry_point());
        let mut invocations = 0usize;

        while let Next::Step(step) = current {
            if invocations >= self.options.max_steps {
                return Err(ResearchError::StepLimitExceeded(self.options.max_steps));
            }
            invocations += 1;

            debug!(step = %step, invocation = invocations, "Running step");
            let update = invoke(step, ctx, &state).await?;
            state.apply(update);

            current = self.graph.next(step, &state)?;
            debug!(from = %step, to = %current, "Transition");
        }

        info!(
            topic = %topic,
            steps = invocations,
            iterations = state.iterations,
            evidence = state.content.len(),
            "Research run complete"
        );
        Ok(state)
    }
}

async fn invoke(
    step: StepKind,
    ctx: StepContext<'_>,
    state: &ResearchState,
) -> Result<StateUpdate, ResearchError> {
    let update = match step {
        StepKind::Planner => steps::planner(ctx, state).await,
        StepKind::Researcher => steps::researcher(ctx, state).await?,
        StepKind::Evaluator => steps::evaluator(ctx, state).await,
        StepKind::Synthesizer => steps::synthesizer(ctx, state).await,
    };
    Ok(update)
}
