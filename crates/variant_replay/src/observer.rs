//! Hooks for run lifecycle events.
//!
//! The engine never prints. Observers decide how, or whether, discovery
//! and each run are surfaced.

use crate::report::RunOutcome;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use variant_core::{Combination, Schema};

/// Kind of run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunKind {
    /// First run, learning the schema
    Discovery,
    /// Run following one combination
    Replay,
}

/// Identity of one execution of the test body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Position of the combination in odometer order
    pub index: usize,
    /// Generated run name
    pub name: String,
    /// Combination followed by the run
    pub combination: Combination,
    /// Kind of run
    pub kind: RunKind,
}

impl RunInfo {
    /// Info for the discovery run
    #[must_use]
    pub fn discovery(name: impl Into<String>, combination: Combination) -> Self {
        Self {
            index: 0,
            name: name.into(),
            combination,
            kind: RunKind::Discovery,
        }
    }

    /// Info for a replay run
    #[must_use]
    pub fn replay(index: usize, name: impl Into<String>, combination: Combination) -> Self {
        Self {
            index,
            name: name.into(),
            combination,
            kind: RunKind::Replay,
        }
    }

    /// Check if this is the discovery run
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        self.kind == RunKind::Discovery
    }
}

/// Receives engine lifecycle events
pub trait VariantObserver {
    /// Discovery finished with `combinations` total combinations
    fn on_discovered(&mut self, _schema: &Schema, _combinations: usize) {}

    /// A run is about to execute the body
    fn on_run_started(&mut self, _run: &RunInfo) {}

    /// A run returned control to the engine
    fn on_run_finished(&mut self, _run: &RunInfo, _outcome: &RunOutcome) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl VariantObserver for NoopObserver {}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl VariantObserver for TracingObserver {
    fn on_discovered(&mut self, schema: &Schema, combinations: usize) {
        info!(
            choice_points = schema.len(),
            combinations,
            arities = ?schema.arities(),
            "discovered choice points"
        );
    }

    fn on_run_started(&mut self, run: &RunInfo) {
        debug!(
            index = run.index,
            name = %run.name,
            combination = %run.combination,
            kind = ?run.kind,
            "running variant"
        );
    }

    fn on_run_finished(&mut self, run: &RunInfo, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Passed => debug!(name = %run.name, "variant passed"),
            RunOutcome::Panicked { message } => {
                warn!(name = %run.name, combination = %run.combination, %message, "variant failed");
            }
            RunOutcome::Mismatch { reason } => {
                warn!(name = %run.name, combination = %run.combination, %reason, "variant diverged from schema");
            }
        }
    }
}

/// Event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservedEvent {
    /// Discovery finished
    Discovered {
        /// Number of choice points
        choice_points: usize,
        /// Number of combinations
        combinations: usize,
    },
    /// A run started
    RunStarted {
        /// Run name
        name: String,
        /// Kind of run
        kind: RunKind,
    },
    /// A run finished
    RunFinished {
        /// Run name
        name: String,
        /// Whether the run passed
        passed: bool,
    },
}

/// Observer that keeps every event in memory.
///
/// Clones share the same log, so a clone can be handed to the engine and
/// the original inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: ObservedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl VariantObserver for RecordingObserver {
    fn on_discovered(&mut self, schema: &Schema, combinations: usize) {
        self.push(ObservedEvent::Discovered {
            choice_points: schema.len(),
            combinations,
        });
    }

    fn on_run_started(&mut self, run: &RunInfo) {
        self.push(ObservedEvent::RunStarted {
            name: run.name.clone(),
            kind: run.kind,
        });
    }

    fn on_run_finished(&mut self, run: &RunInfo, outcome: &RunOutcome) {
        self.push(ObservedEvent::RunFinished {
            name: run.name.clone(),
            passed: outcome.is_passed(),
        });
    }
}
