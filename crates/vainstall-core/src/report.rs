//! Outcome of a provisioning run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::plan::Block;

/// Lines of command output kept in a failure record.
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded {
        exit_code: Option<i32>,
    },
    Failed {
        exit_code: Option<i32>,
        message: String,
    },
    Skipped {
        reason: String,
    },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub label: String,
    pub block: Block,
    pub command: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    /// Set when the abort policy stopped the run early
    pub aborted: bool,
    /// Libraries not found on the loader search path after the run
    pub missing_libraries: Vec<String>,
}

impl ProvisionReport {
    pub fn new(mode: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            mode: mode.into(),
            started_at: now,
            finished_at: now,
            steps: Vec::new(),
            aborted: false,
            missing_libraries: Vec::new(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.outcome.is_failure())
    }

    pub fn succeeded_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Succeeded { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Last lines of captured output, for failure messages.
pub fn output_tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}
