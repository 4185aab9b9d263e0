//! Research workflow state
//!
//! One [`ResearchState`] exists per run. Steps never mutate it directly: they
//! return a [`StateUpdate`] and the controller merges it. How each field is
//! merged is declared exactly once, in [`StateField::policy`].
//!
//! | Field           | Policy    |
//! |-----------------|-----------|
//! | `topic`         | overwrite (set at construction only) |
//! | `plan`          | overwrite |
//! | `content`       | append    |
//! | `steps`         | append    |
//! | `iterations`    | overwrite |
//! | `is_sufficient` | overwrite |
//! | `final_report`  | overwrite |

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an incoming value combines with the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergePolicy {
    /// New items are concatenated after existing ones
    Append,
    /// The latest value replaces the previous one
    Overwrite,
}

/// Every field of [`ResearchState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateField {
    Topic,
    Plan,
    Content,
    Steps,
    Iterations,
    IsSufficient,
    FinalReport,
}

impl StateField {
    pub const ALL: [StateField; 7] = [
        StateField::Topic,
        StateField::Plan,
        StateField::Content,
        StateField::Steps,
        StateField::Iterations,
        StateField::IsSufficient,
        StateField::FinalReport,
    ];

    /// The merge policy for this field
    pub const fn policy(self) -> MergePolicy {
        match self {
            StateField::Content | StateField::Steps => MergePolicy::Append,
            StateField::Topic
            | StateField::Plan
            | StateField::Iterations
            | StateField::IsSufficient
            | StateField::FinalReport => MergePolicy::Overwrite,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StateField::Topic => "topic",
            StateField::Plan => "plan",
            StateField::Content => "content",
            StateField::Steps => "steps",
            StateField::Iterations => "iterations",
            StateField::IsSufficient => "is_sufficient",
            StateField::FinalReport => "final_report",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The terminal artifact of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub report: String,
}

impl FinalReport {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
        }
    }
}

/// The single accumulating record threaded through every step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    /// Research topic, fixed for the run
    pub topic: String,

    /// Research outline produced by the planner
    pub plan: Option<String>,

    /// URL-tagged evidence items, in arrival order
    pub content: Vec<String>,

    /// Human-readable trace log
    pub steps: Vec<String>,

    /// Completed research rounds
    pub iterations: u32,

    /// Latest sufficiency judgment
    pub is_sufficient: bool,

    pub final_report: Option<FinalReport>,
}

impl ResearchState {
    /// Initial state for a run: topic set, everything else empty
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Merge a partial update into this state.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            plan,
            content,
            steps,
            iterations,
            is_sufficient,
            final_report,
        } = update;

        merge_value(StateField::Plan, &mut self.plan, plan.map(Some));
        merge_sequence(StateField::Content, &mut self.content, content);
        merge_sequence(StateField::Steps, &mut self.steps, steps);
        merge_value(StateField::Iterations, &mut self.iterations, iterations);
        merge_value(StateField::IsSufficient, &mut self.is_sufficient, is_sufficient);
        merge_value(
            StateField::FinalReport,
            &mut self.final_report,
            final_report.map(Some),
        );
    }

    /// Consuming variant of [`apply`](Self::apply)
    pub fn with_update(mut self, update: StateUpdate) -> Self {
        self.apply(update);
        self
    }

    /// The first `n` evidence items
    pub fn evidence_preview(&self, n: usize) -> &[String] {
        &self.content[..self.content.len().min(n)]
    }
}

fn merge_sequence<T>(field: StateField, current: &mut Vec<T>, incoming: Vec<T>) {
    match field.policy() {
        MergePolicy::Append => current.extend(incoming),
        MergePolicy::Overwrite => {
            if !incoming.is_empty() {
                *current = incoming;
            }
        }
    }
}

fn merge_value<T>(field: StateField, current: &mut T, incoming: Option<T>) {
    debug_assert_eq!(
        field.policy(),
        MergePolicy::Overwrite,
        "scalar field {} cannot be appended",
        field
    );
    if let Some(value) = incoming {
        *current = value;
    }
}

/// Partial update returned by a step.
///
/// Append fields carry only the new items; overwrite fields are `None` when
/// the step leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub plan: Option<String>,
    pub content: Vec<String>,
    pub steps: Vec<String>,
    pub iterations: Option<u32>,
    pub is_sufficient: Option<bool>,
    pub final_report: Option<FinalReport>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn with_content(mut self, items: Vec<String>) -> Self {
        self.content = items;
        self
    }

    /// Add one trace entry
    pub fn with_step(mut self, entry: impl Into<String>) -> Self {
        self.steps.push(entry.into());
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_sufficiency(mut self, is_sufficient: bool) -> Self {
        self.is_sufficient = Some(is_sufficient);
        self
    }

    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.final_report = Some(FinalReport::new(report));
        self
    }

    /// Fields this update would touch
    pub fn touched_fields(&self) -> Vec<StateField> {
        let mut fields = Vec::new();
        if self.plan.is_some() {
            fields.push(StateField::Plan);
        }
        if !self.content.is_empty() {
            fields.push(StateField::Content);
        }
        if !self.steps.is_empty() {
            fields.push(StateField::Steps);
        }
        if self.iterations.is_some() {
            fields.push(StateField::Iterations);
        }
        if self.is_sufficient.is_some() {
            fields.push(StateField::IsSufficient);
        }
        if self.final_report.is_some() {
            fields.push(StateField::FinalReport);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }
}
