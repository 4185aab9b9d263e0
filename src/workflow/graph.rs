//! Workflow graph: steps, edges, and the transition function.
//!
//! ```text
//!   START
//!     │
//!     ▼
//! ┌─────────┐     ┌────────────┐     ┌───────────┐  sufficient   ┌─────────────┐
//! │ planner │ ──▶ │ researcher │ ──▶ │ evaluator │ ────────────▶ │ synthesizer │ ──▶ END
//! └─────────┘     └────────────┘     └─────┬─────┘               └─────────────┘
//!                       ▲                  │ insufficient
//!                       └──────────────────┘
//! ```
//!
//! The graph is plain data: a builder collects one edge rule per step, `build`
//! validates it, and [`BuiltGraph::next`] answers "where do we go from here"
//! given the current state.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::ResearchState;
use crate::error::{GraphBuildError, ResearchError};

/// Label returned by the evaluator router when evidence is sufficient
pub const SUFFICIENT: &str = "sufficient";

/// Label returned by the evaluator router when more research is needed
pub const INSUFFICIENT: &str = "insufficient";

/// A node of the research graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Planner,
    Researcher,
    Evaluator,
    Synthesizer,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::Planner,
        StepKind::Researcher,
        StepKind::Evaluator,
        StepKind::Synthesizer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StepKind::Planner => "planner",
            StepKind::Researcher => "researcher",
            StepKind::Evaluator => "evaluator",
            StepKind::Synthesizer => "synthesizer",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Next {
    Step(StepKind),
    End,
}

impl From<StepKind> for Next {
    fn from(step: StepKind) -> Self {
        Next::Step(step)
    }
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Step(step) => step.fmt(f),
            Next::End => f.write_str("END"),
        }
    }
}

/// Chooses a branch label from the current state
pub type Router = fn(&ResearchState) -> &'static str;

/// Outgoing edge rule of one step
#[derive(Debug, Clone)]
pub enum EdgeRule {
    /// Always go to the same target
    Direct(Next),
    /// Ask the router for a label, then follow the branch declared for it
    Conditional {
        router: Router,
        branches: Vec<(&'static str, Next)>,
    },
}

impl EdgeRule {
    fn targets(&self) -> Vec<Next> {
        match self {
            EdgeRule::Direct(to) => vec![*to],
            EdgeRule::Conditional { branches, .. } => branches.iter().map(|(_, to)| *to).collect(),
        }
    }
}

/// Builder for constructing workflow graphs with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    name: String,
    entry_point: Option<StepKind>,
    rules: Vec<(StepKind, EdgeRule)>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the entry point step.
    pub fn entry(mut self, step: StepKind) -> Self {
        self.entry_point = Some(step);
        self
    }

    /// Add an unconditional edge.
    pub fn edge(mut self, from: StepKind, to: impl Into<Next>) -> Self {
        self.rules.push((from, EdgeRule::Direct(to.into())));
        self
    }

    /// Add a conditional edge: `router` picks one of the labelled branches.
    pub fn conditional_edges(
        mut self,
        from: StepKind,
        router: Router,
        branches: Vec<(&'static str, Next)>,
    ) -> Self {
        self.rules.push((from, EdgeRule::Conditional { router, branches }));
        self
    }

    /// Validate and build the workflow graph.
    pub fn build(self) -> Result<BuiltGraph, GraphBuildError> {
        let entry_point = self.entry_point.ok_or(GraphBuildError::NoEntryPoint)?;

        let mut rules: HashMap<StepKind, EdgeRule> = HashMap::new();
        for (from, rule) in self.rules {
            if let EdgeRule::Conditional { branches, .. } = &rule {
                if branches.is_empty() {
                    return Err(GraphBuildError::EmptyBranches(from));
                }
            }
            if rules.insert(from, rule).is_some() {
                return Err(GraphBuildError::DuplicateEdge(from));
            }
        }

        // Every step reachable from the entry needs a way out
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([entry_point]);
        while let Some(step) = queue.pop_front() {
            if !seen.insert(step) {
                continue;
            }
            let rule = rules.get(&step).ok_or(GraphBuildError::MissingEdge(step))?;
            for target in rule.targets() {
                if let Next::Step(next) = target {
                    queue.push_back(next);
                }
            }
        }

        Ok(BuiltGraph {
            name: self.name,
            entry_point,
            rules,
        })
    }
}

/// Validated workflow graph
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    name: String,
    entry_point: StepKind,
    rules: HashMap<StepKind, EdgeRule>,
}

impl BuiltGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_point(&self) -> StepKind {
        self.entry_point
    }

    /// Transition function: the step after `current` given `state`.
    pub fn next(&self, current: StepKind, state: &ResearchState) -> Result<Next, ResearchError> {
        match self.rules.get(&current) {
            Some(EdgeRule::Direct(to)) => Ok(*to),
            Some(EdgeRule::Conditional { router, branches }) => {
                let label = router(state);
                branches
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, to)| *to)
                    .ok_or_else(|| ResearchError::routing(current, label))
            }
            None => Err(ResearchError::routing(current, "<no edge>")),
        }
    }

    /// Render as a Mermaid flowchart.
    ///
    /// Unconditional edges are solid arrows; conditional branches are dotted
    /// arrows labelled with the branch name.
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["graph TD".to_string(), "    START([START])".to_string()];

        let steps: Vec<StepKind> = StepKind::ALL
            .into_iter()
            .filter(|s| self.rules.contains_key(s))
            .collect();

        for step in &steps {
            lines.push(format!("    {}[{}]", step, step));
        }
        lines.push("    END([END])".to_string());
        lines.push(format!("    START --> {}", self.entry_point));

        for step in &steps {
            match &self.rules[step] {
                EdgeRule::Direct(to) => lines.push(format!("    {} --> {}", step, to)),
                EdgeRule::Conditional { branches, .. } => {
                    for (label, to) in branches {
                        lines.push(format!("    {} -. \"{}\" .-> {}", step, label, to));
                    }
                }
            }
        }

        lines.join("\n")
    }
}

/// Router for the evaluator's conditional edge
pub fn route_after_evaluation(state: &ResearchState) -> &'static str {
    if state.is_sufficient {
        SUFFICIENT
    } else {
        INSUFFICIENT
    }
}

/// The research graph: plan → search → evaluate → {search | synthesize}.
pub fn research_graph() -> Result<BuiltGraph, GraphBuildError> {
    WorkflowGraph::new()
        .name("research_workflow")
        .entry(StepKind::Planner)
        .edge(StepKind::Planner, StepKind::Researcher)
        .edge(StepKind::Researcher, StepKind::Evaluator)
        .conditional_edges(
            StepKind::Evaluator,
            route_after_evaluation,
            vec![
                (SUFFICIENT, Next::Step(StepKind::Synthesizer)),
                (INSUFFICIENT, Next::Step(StepKind::Researcher)),
            ],
        )
        .edge(StepKind::Synthesizer, Next::End)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(is_sufficient: bool) -> ResearchState {
        ResearchState {
            is_sufficient,
            ..ResearchState::new("t")
        }
    }

    #[test]
    fn test_research_graph_transitions() {
        let graph = research_graph().unwrap();
        let state = ResearchState::new("t");

        assert_eq!(graph.entry_point(), StepKind::Planner);
        assert_eq!(
            graph.next(StepKind::Planner, &state).unwrap(),
            Next::Step(StepKind::Researcher)
        );
        assert_eq!(
            graph.next(StepKind::Researcher, &state).unwrap(),
            Next::Step(StepKind::Evaluator)
        );
        assert_eq!(graph.next(StepKind::Synthesizer, &state).unwrap(), Next::End);
    }

    #[test]
    fn test_evaluator_branches() {
        let graph = research_graph().unwrap();

        assert_eq!(
            graph.next(StepKind::Evaluator, &state_with(true)).unwrap(),
            Next::Step(StepKind::Synthesizer)
        );
        assert_eq!(
            graph.next(StepKind::Evaluator, &state_with(false)).unwrap(),
            Next::Step(StepKind::Researcher)
        );
    }

    #[test]
    fn test_missing_entry() {
        let result = WorkflowGraph::new().edge(StepKind::Planner, Next::End).build();
        assert_eq!(result.unwrap_err(), GraphBuildError::NoEntryPoint);
    }

    #[test]
    fn test_reachable_step_without_edge() {
        let result = WorkflowGraph::new()
            .entry(StepKind::Planner)
            .edge(StepKind::Planner, StepKind::Researcher)
            .build();

        assert_eq!(
            result.unwrap_err(),
            GraphBuildError::MissingEdge(StepKind::Researcher)
        );
    }

    #[test]
    fn test_duplicate_edge_rule() {
        let result = WorkflowGraph::new()
            .entry(StepKind::Planner)
            .edge(StepKind::Planner, Next::End)
            .edge(StepKind::Planner, StepKind::Synthesizer)
            .build();

        assert_eq!(
            result.unwrap_err(),
            GraphBuildError::DuplicateEdge(StepKind::Planner)
        );
    }

    #[test]
    fn test_empty_branches_rejected() {
        let result = WorkflowGraph::new()
            .entry(StepKind::Evaluator)
            .conditional_edges(StepKind::Evaluator, route_after_evaluation, vec![])
            .build();

        assert_eq!(
            result.unwrap_err(),
            GraphBuildError::EmptyBranches(StepKind::Evaluator)
        );
    }

    #[test]
    fn test_unmapped_label_is_routing_error() {
        fn always_maybe(_: &ResearchState) -> &'static str {
            "maybe"
        }

        let graph = WorkflowGraph::new()
            .entry(StepKind::Evaluator)
            .conditional_edges(StepKind::Evaluator, always_maybe, vec![(SUFFICIENT, Next::End)])
            .build()
            .unwrap();

        let err = graph.next(StepKind::Evaluator, &ResearchState::new("t")).unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Routing { from: StepKind::Evaluator, ref label } if label == "maybe"
        ));
    }

    #[test]
    fn test_mermaid_rendering() {
        let mermaid = research_graph().unwrap().to_mermaid();

        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("START --> planner"));
        assert!(mermaid.contains("planner --> researcher"));
        assert!(mermaid.contains("evaluator -. \"sufficient\" .-> synthesizer"));
        assert!(mermaid.contains("evaluator -. \"insufficient\" .-> researcher"));
        assert!(mermaid.contains("synthesizer --> END"));
    }
}
