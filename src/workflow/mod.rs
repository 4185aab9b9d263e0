//! Research workflow: state, graph, steps, and the controller that runs them.

pub mod controller;
pub mod graph;
pub mod prompts;
pub mod state;
pub mod steps;

pub use controller::{ResearchController, ResearchOutcome};
pub use graph::{research_graph, BuiltGraph, Next, StepKind, WorkflowGraph};
pub use prompts::ResearchPrompts;
pub use state::{FinalReport, MergePolicy, ResearchState, StateField, StateUpdate};
pub use steps::{ResearchOptions, StepContext};
