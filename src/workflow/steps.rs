//! Step functions
//!
//! Each step reads the current state, may call a capability, and returns a
//! [`StateUpdate`]. None of them touch the state directly.
//!
//! Failure handling differs per step:
//!
//! | Step        | On capability failure                         |
//! |-------------|-----------------------------------------------|
//! | planner     | fixed fallback plan                           |
//! | researcher  | error propagates, run aborts                  |
//! | evaluator   | sufficient = true (fail open)                 |
//! | synthesizer | report body is the error message              |

use tracing::{debug, info, warn};

use super::prompts::{trace, ResearchPrompts, FALLBACK_PLAN, SUFFICIENCY_TOKEN};
use super::state::{ResearchState, StateUpdate};
use crate::error::SearchError;
use crate::llm::TextGenerator;
use crate::search::{SearchHit, SearchOptions, SearchProvider};

/// Default number of research rounds before the evaluator stops the loop
pub const DEFAULT_MAX_ITERATIONS: u32 = 2;

/// Default number of evidence items shown to the evaluator
pub const DEFAULT_EVIDENCE_PREVIEW: usize = 2;

/// Default ceiling on step invocations per run
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Tunables shared by the step functions and the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchOptions {
    pub search: SearchOptions,

    /// Research rounds after which the evaluator declares sufficiency
    pub max_iterations: u32,

    /// Evidence items included in the sufficiency prompt
    pub evidence_preview: usize,

    /// Step invocations allowed before the controller gives up
    pub max_steps: usize,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            evidence_preview: DEFAULT_EVIDENCE_PREVIEW,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl ResearchOptions {
    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Set the round limit, raising `max_steps` so the standard graph can
    /// always finish the last round and synthesize.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self.max_steps = self.max_steps.max(steps_for_rounds(max));
        self
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }
}

/// Step invocations of a standard run with `rounds` research rounds:
/// planner, researcher + evaluator per round, synthesizer.
pub fn steps_for_rounds(rounds: u32) -> usize {
    (rounds as usize).saturating_mul(2).saturating_add(2)
}

/// Capabilities and options handed to every step
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub generator: &'a dyn TextGenerator,
    pub search: &'a dyn SearchProvider,
    pub options: &'a ResearchOptions,
}

/// Draft a research outline.
pub async fn planner(ctx: StepContext<'_>, state: &ResearchState) -> StateUpdate {
    let prompt = ResearchPrompts::planner(&state.topic);

    let plan = match ctx.generator.generate(&prompt).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "Planner generation failed, using fallback plan");
            FALLBACK_PLAN.to_string()
        }
    };

    debug!(plan_chars = plan.len(), "Plan ready");
    StateUpdate::new()
        .with_plan(plan)
        .with_step(trace::PLAN_CREATED)
}

/// Run one search round for the topic and record the results as evidence.
pub async fn researcher(
    ctx: StepContext<'_>,
    state: &ResearchState,
) -> Result<StateUpdate, SearchError> {
    let round = state.iterations + 1;
    info!(topic = %state.topic, round, provider = ctx.search.name(), "Searching");

    let hits = ctx.search.search(&state.topic, &ctx.options.search).await?;
    let evidence: Vec<String> = hits.iter().map(SearchHit::to_evidence).collect();

    info!(round, sources = evidence.len(), "Search round complete");
    Ok(StateUpdate::new()
        .with_step(trace::search_completed(evidence.len()))
        .with_content(evidence)
        .with_iterations(round))
}

/// Decide whether the gathered evidence is enough to write the report.
pub async fn evaluator(ctx: StepContext<'_>, state: &ResearchState) -> StateUpdate {
    if state.iterations >= ctx.options.max_iterations {
        info!(iterations = state.iterations, "Round limit reached, moving to synthesis");
        return StateUpdate::new()
            .with_sufficiency(true)
            .with_step(trace::EVALUATION_FINISHED);
    }

    let preview = state.evidence_preview(ctx.options.evidence_preview);
    let prompt = ResearchPrompts::evaluator(&state.topic, preview);

    let is_sufficient = match ctx.generator.generate(&prompt).await {
        Ok(answer) => is_affirmative(&answer),
        Err(e) => {
            warn!(error = %e, "Evaluator generation failed, treating evidence as sufficient");
            true
        }
    };

    info!(iterations = state.iterations, is_sufficient, "Evidence evaluated");
    StateUpdate::new()
        .with_sufficiency(is_sufficient)
        .with_step(trace::EVALUATION_COMPLETED)
}

/// Substring test on the normalized answer.
///
/// Any occurrence of the token counts, including inside other words
/// ("EYES") or in mixed answers ("NO, YES").
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_uppercase().contains(SUFFICIENCY_TOKEN)
}

/// Write the final report from all accumulated evidence.
pub async fn synthesizer(ctx: StepContext<'_>, state: &ResearchState) -> StateUpdate {
    info!(topic = %state.topic, evidence = state.content.len(), "Synthesizing report");
    let prompt = ResearchPrompts::synthesizer(&state.topic, &state.content);

    let report = match ctx.generator.generate(&prompt).await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "Synthesis failed, embedding error in report");
            ResearchPrompts::synthesis_failure(&e.to_string())
        }
    };

    StateUpdate::new()
        .with_report(report)
        .with_step(trace::REPORT_SYNTHESIZED)
}
