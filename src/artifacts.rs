//! Run artifacts: the report text file and the JSON log bundle.
//!
//! ```text
//! <output-dir>/
//! ├── research_<topic>.txt   report body
//! └── agent_logs.json        metadata, trace, report, state summary
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ArtifactError;
use crate::workflow::ResearchOutcome;

/// File name of the JSON log bundle
pub const LOG_FILE_NAME: &str = "agent_logs.json";

/// How thorough the user asked the run to be.
///
/// Recorded in the log bundle; the workflow itself does not read it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ResearchDepth {
    Quick,
    #[default]
    Standard,
    Detailed,
}

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub topic: String,
    pub timestamp: DateTime<Local>,
    pub depth: ResearchDepth,
}

/// Everything worth keeping from one run, in a single JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBundle {
    pub metadata: RunMetadata,
    pub trace_steps: Vec<String>,
    /// Report body
    pub final_report: String,
    /// JSON rendering of the terminal report record
    pub raw_state_summary: String,
}

impl LogBundle {
    /// Bundle an outcome, stamped with the current time
    pub fn new(topic: &str, depth: ResearchDepth, outcome: &ResearchOutcome) -> Self {
        Self::at(topic, depth, outcome, Local::now())
    }

    pub fn at(
        topic: &str,
        depth: ResearchDepth,
        outcome: &ResearchOutcome,
        timestamp: DateTime<Local>,
    ) -> Self {
        let raw_state_summary = serde_json::to_string(&outcome.final_report)
            .unwrap_or_else(|_| outcome.final_report.report.clone());

        Self {
            metadata: RunMetadata {
                topic: topic.to_string(),
                timestamp,
                depth,
            },
            trace_steps: outcome.steps.clone(),
            final_report: outcome.final_report.report.clone(),
            raw_state_summary,
        }
    }

    /// Serialize with four-space indentation
    pub fn to_json_pretty(&self) -> Result<String, ArtifactError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Report file name for a topic: `research_<topic>.txt`.
///
/// Spaces become underscores; path separators are replaced too so the file
/// always lands directly in the output directory.
pub fn report_file_name(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("research_{}.txt", stem)
}

/// Paths of the files written by [`write_artifacts`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub report: PathBuf,
    pub log: PathBuf,
}

/// Write the report and the log bundle into `dir`, creating it if needed.
pub fn write_artifacts(dir: &Path, bundle: &LogBundle) -> Result<ArtifactPaths, ArtifactError> {
    fs::create_dir_all(dir)?;

    let report = dir.join(report_file_name(&bundle.metadata.topic));
    fs::write(&report, &bundle.final_report)?;

    let log = dir.join(LOG_FILE_NAME);
    fs::write(&log, bundle.to_json_pretty()?)?;

    info!(report = %report.display(), log = %log.display(), "Artifacts written");
    Ok(ArtifactPaths { report, log })
}
