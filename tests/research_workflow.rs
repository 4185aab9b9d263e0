//! Integration tests for the research workflow
//!
//! Drive the full controller with scripted capabilities and check the
//! observable run: trace log, accumulated evidence, round count, report.

mod common;

use std::sync::Arc;

use autoresearch_agent::workflow::prompts::{trace, FALLBACK_PLAN};
use autoresearch_agent::{
    Config, ResearchController, ResearchError, ResearchOptions, SearchDepth, SearchError,
};

use common::{hits, Reply, ScriptedGenerator, ScriptedSearch};

fn controller(
    generator: &Arc<ScriptedGenerator>,
    search: &Arc<ScriptedSearch>,
) -> ResearchController {
    ResearchController::new(generator.clone(), search.clone()).unwrap()
}

/// Search returns 5 results both rounds; the evaluator says NO, then the
/// round limit forces sufficiency.
#[tokio::test]
async fn test_insufficient_then_round_limit() {
    let generator = Arc::new(ScriptedGenerator::answering("1. a 2. b 3. c", "NO", "# Report"));
    let search = Arc::new(ScriptedSearch::uniform(5, 2));

    let state = controller(&generator, &search).execute("X").await.unwrap();

    assert_eq!(search.calls(), 2);
    assert_eq!(state.iterations, 2);
    assert_eq!(state.content.len(), 10);
    assert_eq!(
        state.steps,
        vec![
            trace::PLAN_CREATED.to_string(),
            trace::search_completed(5),
            trace::EVALUATION_COMPLETED.to_string(),
            trace::search_completed(5),
            trace::EVALUATION_FINISHED.to_string(),
            trace::REPORT_SYNTHESIZED.to_string(),
        ]
    );
    assert!(state.is_sufficient);
    assert_eq!(state.final_report.unwrap().report, "# Report");
    // planner, one judgment, synthesis; the second evaluation never asks
    assert_eq!(generator.calls(), 3);
}

/// The evaluator accepts the first round.
#[tokio::test]
async fn test_sufficient_on_first_pass() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "Yes.", "report"));
    let search = Arc::new(ScriptedSearch::uniform(5, 2));

    let outcome = controller(&generator, &search).run("Y").await.unwrap();

    assert_eq!(search.calls(), 1);
    assert_eq!(
        outcome.steps,
        vec![
            trace::PLAN_CREATED.to_string(),
            trace::search_completed(5),
            trace::EVALUATION_COMPLETED.to_string(),
            trace::REPORT_SYNTHESIZED.to_string(),
        ]
    );
    assert_eq!(outcome.final_report.report, "report");
}

/// A search failure aborts the run before anything is synthesized.
#[tokio::test]
async fn test_search_failure_aborts_run() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "YES", "report"));
    let search = Arc::new(ScriptedSearch::failing());

    let result = controller(&generator, &search).run("Z").await;

    assert!(matches!(
        result,
        Err(ResearchError::Search(SearchError::RateLimited))
    ));
    // Only the planner reached the generator
    assert_eq!(generator.calls(), 1);
    assert!(!generator.prompts()[0].contains("Synthesize"));
}

/// Every generation call fails: fallback plan, fail-open evaluation, and an
/// error message as the report.
#[tokio::test]
async fn test_generation_always_failing() {
    let generator = Arc::new(ScriptedGenerator::always_failing());
    let search = Arc::new(ScriptedSearch::uniform(5, 2));

    let state = controller(&generator, &search).execute("W").await.unwrap();

    assert_eq!(state.plan.as_deref(), Some(FALLBACK_PLAN));
    assert!(state.is_sufficient);
    assert_eq!(state.iterations, 1);
    assert_eq!(state.content.len(), 5);
    assert_eq!(state.steps.len(), 4);

    let report = state.final_report.unwrap().report;
    assert!(report.starts_with("Error generating report: "));
    assert!(report.contains("service unavailable"));
}

#[tokio::test]
async fn test_fallback_plan_is_topic_independent() {
    for topic in ["fusion power", "medieval trade routes", "x"] {
        let generator = Arc::new(ScriptedGenerator::always_failing());
        let search = Arc::new(ScriptedSearch::uniform(1, 2));

        let state = controller(&generator, &search).execute(topic).await.unwrap();
        assert_eq!(state.plan.as_deref(), Some(FALLBACK_PLAN));
    }
}

/// Evidence accumulates in arrival order and counts match the search results.
#[tokio::test]
async fn test_content_preserves_arrival_order() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "NO", "report"));
    let search = Arc::new(ScriptedSearch::new(vec![Some(hits(1, 3)), Some(hits(2, 2))]));

    let state = controller(&generator, &search).execute("order").await.unwrap();

    assert_eq!(state.content.len(), 5);
    assert_eq!(
        state.content[0],
        "SOURCE (https://source1-1.example): finding 1 from round 1"
    );
    assert_eq!(
        state.content[3],
        "SOURCE (https://source2-1.example): finding 1 from round 2"
    );
    assert!(state.content[..3].iter().all(|c| c.contains("round 1")));
    assert_eq!(state.steps[1], trace::search_completed(3));
    assert_eq!(state.steps[3], trace::search_completed(2));
}

/// Unparseable judgments count as "insufficient".
#[tokio::test]
async fn test_ambiguous_judgment_loops_once() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "Perhaps, hard to say.", "r"));
    let search = Arc::new(ScriptedSearch::uniform(2, 2));

    let state = controller(&generator, &search).execute("topic").await.unwrap();

    assert_eq!(state.iterations, 2);
    assert_eq!(state.steps.len(), 6);
}

/// The round count is 1 or 2 and the trace has one entry per step.
#[tokio::test]
async fn test_round_and_trace_bounds() {
    for judgment in ["YES", "NO", "yes please", "nope"] {
        let generator = Arc::new(ScriptedGenerator::answering("plan", judgment, "r"));
        let search = Arc::new(ScriptedSearch::uniform(4, 2));

        let state = controller(&generator, &search).execute("topic").await.unwrap();

        let rounds = search.calls() as u32;
        assert_eq!(state.iterations, rounds);
        assert!((1..=2).contains(&state.iterations), "judgment {}", judgment);
        // planner + (researcher + evaluator) per round + synthesizer
        assert_eq!(state.steps.len(), 2 + 2 * rounds as usize);
        assert_eq!(state.content.len(), 4 * rounds as usize);
    }
}

/// The evaluator sees only the first two evidence items.
#[tokio::test]
async fn test_evaluator_prompt_uses_preview() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "YES", "r"));
    let search = Arc::new(ScriptedSearch::uniform(5, 1));

    controller(&generator, &search).execute("topic").await.unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    let judgment_prompt = &prompts[1];
    assert!(judgment_prompt.contains("Reply YES or NO"));
    assert!(judgment_prompt.contains("source1-2.example"));
    assert!(!judgment_prompt.contains("source1-3.example"));

    // the report prompt sees everything
    assert!(prompts[2].contains("source1-5.example"));
}

/// Every round searches the topic with 5 results at advanced depth.
#[tokio::test]
async fn test_search_request_settings() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "NO", "r"));
    let search = Arc::new(ScriptedSearch::uniform(1, 2));

    controller(&generator, &search)
        .execute("graphene")
        .await
        .unwrap();

    for (query, options) in search.queries() {
        assert_eq!(query, "graphene");
        assert_eq!(options.max_results, 5);
        assert_eq!(options.depth, SearchDepth::Advanced);
    }
}

#[tokio::test]
async fn test_raised_round_limit() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Reply::text("plan"),
        Reply::text("NO"),
        Reply::text("NO"),
        Reply::text("report"),
    ]));
    let search = Arc::new(ScriptedSearch::uniform(1, 3));

    let state = controller(&generator, &search)
        .with_options(ResearchOptions::default().with_max_iterations(3))
        .execute("deep topic")
        .await
        .unwrap();

    assert_eq!(state.iterations, 3);
    assert_eq!(state.steps.len(), 8);
    assert_eq!(state.final_report.unwrap().report, "report");
}

#[tokio::test]
async fn test_empty_topic_rejected_before_any_call() {
    let generator = Arc::new(ScriptedGenerator::answering("plan", "YES", "r"));
    let search = Arc::new(ScriptedSearch::uniform(1, 1));

    let result = controller(&generator, &search).run("").await;

    assert!(matches!(result, Err(ResearchError::EmptyTopic)));
    assert_eq!(generator.calls(), 0);
    assert_eq!(search.calls(), 0);
}

/// A round limit above the default step ceiling still ends in a report.
#[tokio::test]
async fn test_long_round_limit_still_synthesizes() {
    let config = Config {
        max_research_rounds: 12,
        ..Config::default()
    };
    // Every judgment after the plan is "OK", which never contains YES
    let generator = Arc::new(ScriptedGenerator::new(vec![Reply::text("plan")]));
    let search = Arc::new(ScriptedSearch::uniform(1, 12));

    let state = controller(&generator, &search)
        .with_options(config.research_options())
        .execute("long haul")
        .await
        .unwrap();

    assert_eq!(state.iterations, 12);
    assert_eq!(search.calls(), 12);
    assert_eq!(state.steps.len(), 26);
    assert_eq!(state.steps.last().unwrap(), trace::REPORT_SYNTHESIZED);
    assert!(state.final_report.is_some());
}
