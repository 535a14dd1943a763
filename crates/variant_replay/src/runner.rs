//! Execution of named sub-runs.
//!
//! The test framework owns isolation and reporting; a [`SubRunner`] is the
//! seam where a replay run is handed to it under its generated name.

use crate::report::RunOutcome;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Executes one replay run as an independently named unit
pub trait SubRunner {
    /// Run `run` under `name` and report how it ended
    fn run_named(&mut self, name: &str, run: &mut dyn FnMut()) -> RunOutcome;
}

/// Calls each run directly; panics propagate to the caller unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineRunner;

impl SubRunner for InlineRunner {
    fn run_named(&mut self, _name: &str, run: &mut dyn FnMut()) -> RunOutcome {
        run();
        RunOutcome::Passed
    }
}

/// Catches panics per run so every combination executes.
///
/// Requires `panic = "unwind"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatingRunner;

impl IsolatingRunner {
    /// Create a new isolating runner
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SubRunner for IsolatingRunner {
    fn run_named(&mut self, _name: &str, run: &mut dyn FnMut()) -> RunOutcome {
        match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(()) => RunOutcome::Passed,
            Err(payload) => RunOutcome::panicked(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
