//! Outcome of every run performed for one test body.

use crate::observer::{RunInfo, RunKind};
use serde::{Deserialize, Serialize};
use variant_core::{Schema, VariantError, VariantResult};

/// How a single run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The body returned normally
    Passed,
    /// The body panicked and the runner caught it
    Panicked {
        /// Panic message
        message: String,
    },
    /// The body visited different choice points than discovery recorded
    Mismatch {
        /// What differed
        reason: String,
    },
}

impl RunOutcome {
    /// Create a panicked outcome
    #[must_use]
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }

    /// Create a structural mismatch outcome
    #[must_use]
    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self::Mismatch {
            reason: reason.into(),
        }
    }

    /// Check if the run passed
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// A run and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run identity
    pub run: RunInfo,
    /// How it ended
    pub outcome: RunOutcome,
}

impl RunRecord {
    /// Create a new run record
    #[must_use]
    pub fn new(run: RunInfo, outcome: RunOutcome) -> Self {
        Self { run, outcome }
    }
}

/// Every run performed for one test body, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantReport {
    /// Schema learned during discovery
    pub schema: Schema,
    /// Runs in execution order, discovery first
    pub runs: Vec<RunRecord>,
}

impl VariantReport {
    /// Create an empty report for a schema
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            runs: Vec::new(),
        }
    }

    /// Add a run record
    pub fn push(&mut self, record: RunRecord) {
        self.runs.push(record);
    }

    /// Total number of body executions
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.runs.len()
    }

    /// Number of replay runs
    #[must_use]
    pub fn replays(&self) -> usize {
        self.runs.iter().filter(|r| r.run.kind == RunKind::Replay).count()
    }

    /// Runs that did not pass
    #[must_use]
    pub fn failures(&self) -> Vec<&RunRecord> {
        self.runs.iter().filter(|r| !r.outcome.is_passed()).collect()
    }

    /// Check if every run passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.runs.iter().all(|r| r.outcome.is_passed())
    }

    /// Run names in execution order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.runs.iter().map(|r| r.run.name.as_str()).collect()
    }

    /// Convert the first failed run into an error
    ///
    /// # Errors
    ///
    /// Returns `RunFailed` if any run did not pass
    pub fn into_result(self) -> VariantResult<Self> {
        let failed = self.runs.iter().find_map(|r| match &r.outcome {
            RunOutcome::Passed => None,
            RunOutcome::Panicked { message } | RunOutcome::Mismatch { reason: message } => {
                Some(VariantError::RunFailed {
                    name: r.run.name.clone(),
                    message: message.clone(),
                })
            }
        });

        match failed {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Serialize to JSON
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Serialize to indented JSON
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialize from JSON
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
