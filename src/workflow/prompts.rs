//! Research workflow prompt templates
//!
//! Prompts for the three steps that call the text generator, plus the fixed
//! strings the steps fall back to or record in the trace log.

/// Plan used when the planner cannot reach the text generator
pub const FALLBACK_PLAN: &str = "1. Search web 2. Gather data 3. Summarize";

/// Token whose presence in the evaluator's answer means "sufficient"
pub const SUFFICIENCY_TOKEN: &str = "YES";

/// Trace log entries
pub mod trace {
    pub const PLAN_CREATED: &str = "📋 Created research plan";
    pub const EVALUATION_FINISHED: &str = "⚖️ Evaluation: Finished";
    pub const EVALUATION_COMPLETED: &str = "⚖️ Evaluation completed";
    pub const REPORT_SYNTHESIZED: &str = "✍️ Professional report synthesized";

    pub fn search_completed(sources: usize) -> String {
        format!("🔍 Research search completed (Found {} sources)", sources)
    }
}

/// Prompt templates for the research workflow
pub struct ResearchPrompts;

impl ResearchPrompts {
    /// Ask for a short three-step outline
    pub fn planner(topic: &str) -> String {
        format!(
            "Create a simple 3-step research plan for: {}. Return only the steps.",
            topic
        )
    }

    /// Yes/no sufficiency judgment over a preview of the evidence
    pub fn evaluator(topic: &str, evidence: &[String]) -> String {
        format!(
            "Is this enough info for '{}'? Reply YES or NO.\n\n{}",
            topic,
            evidence.join(" ")
        )
    }

    /// Final report prompt.
    ///
    /// The evidence items are already tagged with their source URL, so the
    /// model can cite them inline.
    pub fn synthesizer(topic: &str, evidence: &[String]) -> String {
        format!(
            r#"Synthesize a professional research report on: {topic}
Using this gathered data: {context}

IMPORTANT: You MUST place clickable links [Source Name](URL) directly next to the facts you cite.

The report MUST include:
1. 📝 Executive Summary: Overview with [Links].
2. 💡 Key Insights: 3 detailed points with [Links].
3. ⚖️ Contradiction Check: Where sources disagree, with [Links].
4. 🎯 Confidence Score: (0-100%) based on the quality of sources.
5. 🚀 Key Takeaways: Final summary and next steps.
6. 🔗 Reference List: List all clickable links at the end.
"#,
            topic = topic,
            context = evidence.join("\n\n"),
        )
    }

    /// Report body used when synthesis fails
    pub fn synthesis_failure(detail: &str) -> String {
        format!("Error generating report: {}", detail)
    }
}
