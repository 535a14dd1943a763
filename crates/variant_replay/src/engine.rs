//! Replay engine: discovery, then one run per remaining combination.

use crate::config::ReplayConfig;
use crate::observer::{RunInfo, TracingObserver, VariantObserver};
use crate::report::{RunOutcome, RunRecord, VariantReport};
use crate::runner::{InlineRunner, SubRunner};
use crate::session::Session;
use std::sync::Arc;
use tracing::debug;
use variant_core::{Combination, VariantError, VariantResult};

/// Runs a test body once per combination of its choice points
pub struct VariantEngine {
    config: ReplayConfig,
    observer: Box<dyn VariantObserver>,
    runner: Box<dyn SubRunner>,
    partial: Option<VariantReport>,
}

impl VariantEngine {
    /// Create an engine with default config, tracing observer and inline runner
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ReplayConfig::default(),
            observer: Box::new(TracingObserver),
            runner: Box::new(InlineRunner),
            partial: None,
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the lifecycle observer
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn VariantObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the sub-run executor
    #[must_use]
    pub fn with_runner(mut self, runner: Box<dyn SubRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Get the config
    #[must_use]
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Take the runs completed before the last `run` failed on a structural
    /// mismatch, the diverging run included
    pub fn take_partial_report(&mut self) -> Option<VariantReport> {
        self.partial.take()
    }

    /// Discover the body's choice points, then replay every other combination.
    ///
    /// The discovery run executes inline; panics there propagate. Replay
    /// runs go through the configured [`SubRunner`], each with a fresh
    /// [`Session`].
    ///
    /// # Errors
    ///
    /// Returns error if the combination space exceeds the configured limit,
    /// or if a replay visits different choice points than discovery did
    pub fn run<F>(&mut self, mut body: F) -> VariantResult<VariantReport>
    where
        F: FnMut(&mut Session),
    {
        self.partial = None;

        // The discovery run's name is only known once its schema exists.
        let started = RunInfo::discovery(self.config.discovery_name.clone(), Combination::empty());
        self.observer.on_run_started(&started);

        let mut session = Session::discovery();
        body(&mut session);
        let schema = Arc::new(session.into_schema().unwrap_or_default());

        let first = Combination::first(schema.len());
        let discovery = RunInfo::discovery(
            schema.name_with_separator(&first, &self.config.name_separator)?,
            first,
        );
        self.observer.on_run_finished(&discovery, &RunOutcome::Passed);

        let count = schema.combination_count().unwrap_or(usize::MAX);
        if !self.config.allows(count) {
            return Err(VariantError::TooManyCombinations {
                count,
                limit: self.config.max_combinations,
            });
        }
        self.observer.on_discovered(&schema, count);

        let mut report = VariantReport::new((*schema).clone());
        report.push(RunRecord::new(discovery, RunOutcome::Passed));

        for (index, combination) in schema.iter_combinations().enumerate() {
            if index == 0 && self.config.skip_first {
                continue;
            }

            let name = schema.name_with_separator(&combination, &self.config.name_separator)?;
            let info = RunInfo::replay(index, name, combination);
            self.observer.on_run_started(&info);

            let mut finished = Ok(());
            let mut outcome = {
                let mut replay = || {
                    let mut session =
                        Session::replay(Arc::clone(&schema), info.combination.clone(), info.name.clone());
                    body(&mut session);
                    finished = session.finish();
                };
                self.runner.run_named(&info.name, &mut replay)
            };

            if let Err(err) = &finished {
                if outcome.is_passed() {
                    outcome = RunOutcome::mismatch(err.to_string());
                }
            }

            self.observer.on_run_finished(&info, &outcome);
            report.push(RunRecord::new(info, outcome));

            if let Err(err) = finished {
                self.partial = Some(report);
                return Err(err);
            }
        }

        debug!(
            runs = report.total_runs(),
            failures = report.failures().len(),
            "variant runs complete"
        );
        Ok(report)
    }
}

impl Default for VariantEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `body` once per combination with the default engine.
///
/// Meant to be called directly from a `#[test]` function.
///
/// # Panics
///
/// Panics if any run panics, if a replay diverges structurally from
/// discovery, or if the combination space exceeds the default limit
pub fn run_variants<F>(body: F) -> VariantReport
where
    F: FnMut(&mut Session),
{
    match VariantEngine::new().run(body) {
        Ok(report) => report,
        Err(err) => panic!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternatives::Alternatives;
    use crate::observer::{NoopObserver, ObservedEvent, RecordingObserver, RunKind};
    use crate::runner::IsolatingRunner;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};

    fn two_by_two(v: &mut Session, seen: &RefCell<Vec<String>>) {
        let label = RefCell::new(String::new());
        v.choose(
            Alternatives::new()
                .with("first", |_| label.borrow_mut().push('1'))
                .with("second", |_| label.borrow_mut().push('2')),
        );
        v.choose(
            Alternatives::new()
                .with("first suffix", |_| label.borrow_mut().push('A'))
                .with("second prefix", |_| label.borrow_mut().push('B')),
        );
        seen.borrow_mut().push(label.into_inner());
    }

    #[test]
    fn test_engine_new() {
        let engine = VariantEngine::new();
        assert!(engine.config().skip_first);
    }

    #[test]
    fn test_two_by_two_runs_every_combination() {
        let seen = RefCell::new(Vec::new());
        let report = VariantEngine::new()
            .run(|v| two_by_two(v, &seen))
            .unwrap();

        assert_eq!(seen.into_inner(), vec!["1A", "1B", "2A", "2B"]);
        assert_eq!(report.total_runs(), 4);
        assert_eq!(report.replays(), 3);
        assert_eq!(
            report.names(),
            vec![
                "firstfirst suffix",
                "firstsecond prefix",
                "secondfirst suffix",
                "secondsecond prefix",
            ]
        );
        assert!(report.runs[0].run.is_discovery());
        assert!(report.passed());
    }

    #[test]
    fn test_zero_choice_points_runs_once() {
        let calls = Cell::new(0);
        let report = VariantEngine::new().run(|_| calls.set(calls.get() + 1)).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(report.total_runs(), 1);
        assert_eq!(report.replays(), 0);
        assert!(report.schema.is_empty());
    }

    #[test]
    fn test_empty_alternatives_do_not_expand() {
        let calls = Cell::new(0);
        let picks = RefCell::new(Vec::new());
        let report = VariantEngine::new()
            .run(|v| {
                calls.set(calls.get() + 1);
                assert_eq!(v.choose(Alternatives::new()), None);
                picks.borrow_mut().push(v.pick(&["x", "y"]));
            })
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(picks.into_inner(), vec![Some(0), Some(1)]);
        assert_eq!(report.schema.len(), 2);
        assert_eq!(report.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_single_alternative_consumes_slot() {
        let report = VariantEngine::new()
            .run(|v| {
                v.pick(&["only"]);
                let cursor = v.cursor();
                v.pick(&["a", "b"]);
                assert_eq!(cursor, 1);
            })
            .unwrap();

        assert_eq!(report.schema.arities(), vec![1, 2]);
        assert_eq!(report.names(), vec!["onlya", "onlyb"]);
    }

    #[test]
    fn test_nested_choice_points_enumerated() {
        let seen = RefCell::new(Vec::new());
        VariantEngine::new()
            .run(|v| {
                let trail = RefCell::new(String::new());
                let inner = |v: &mut Session, trail: &RefCell<String>| {
                    v.choose(
                        Alternatives::new()
                            .with("x", |_| trail.borrow_mut().push('x'))
                            .with("y", |_| trail.borrow_mut().push('y')),
                    );
                };
                v.choose(
                    Alternatives::new()
                        .with("a", |v| {
                            trail.borrow_mut().push('a');
                            inner(v, &trail);
                        })
                        .with("b", |v| {
                            trail.borrow_mut().push('b');
                            inner(v, &trail);
                        }),
                );
                seen.borrow_mut().push(trail.into_inner());
            })
            .unwrap();

        assert_eq!(seen.into_inner(), vec!["ax", "ay", "bx", "by"]);
    }

    #[test]
    fn test_conditional_choice_point_rejected() {
        let result = VariantEngine::new().run(|v| {
            v.choose(
                Alternatives::new()
                    .with("deep", |v| {
                        v.pick(&["x", "y"]);
                    })
                    .with("shallow", |_| {}),
            );
        });

        match result {
            Err(VariantError::StructuralMismatch { run, cursor, .. }) => {
                assert_eq!(run, "shallowx");
                assert_eq!(cursor, 1);
            }
            other => panic!("expected structural mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_changed_alternatives_rejected() {
        let calls = Cell::new(0);
        let result = VariantEngine::new().run(|v| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                v.pick(&["p", "q"]);
            } else {
                v.pick(&["p", "r"]);
            }
        });

        assert!(matches!(
            result,
            Err(VariantError::StructuralMismatch { cursor: 0, .. })
        ));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_isolating_runner_collects_failures() {
        let report = VariantEngine::new()
            .with_runner(Box::new(IsolatingRunner::new()))
            .run(|v| {
                if v.pick(&["ok", "broken", "fine"]) == Some(1) {
                    panic!("broken variant");
                }
            })
            .unwrap();

        assert_eq!(report.total_runs(), 3);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].run.name, "broken");
        assert_eq!(failures[0].outcome, RunOutcome::panicked("broken variant"));

        assert_eq!(
            report.into_result(),
            Err(VariantError::RunFailed {
                name: "broken".to_string(),
                message: "broken variant".to_string(),
            })
        );
    }

    #[test]
    #[should_panic(expected = "second branch")]
    fn test_inline_runner_propagates_panic() {
        run_variants(|v| {
            if v.pick(&["first", "second"]) == Some(1) {
                panic!("second branch");
            }
        });
    }

    #[test]
    #[should_panic(expected = "Structural mismatch")]
    fn test_run_variants_panics_on_mismatch() {
        let calls = Cell::new(0);
        run_variants(|v| {
            calls.set(calls.get() + 1);
            v.pick(&["a", "b"]);
            if calls.get() > 1 {
                v.pick(&["extra"]);
            }
        });
    }

    #[test]
    fn test_combination_limit() {
        let calls = Cell::new(0);
        let config = ReplayConfig::new().with_max_combinations(3);
        let result = VariantEngine::new().with_config(config).run(|v| {
            calls.set(calls.get() + 1);
            v.pick(&["a", "b"]);
            v.pick(&["x", "y"]);
        });

        assert_eq!(
            result.unwrap_err(),
            VariantError::TooManyCombinations { count: 4, limit: 3 }
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_replay_first_combination_when_configured() {
        let seen = RefCell::new(Vec::new());
        let config = ReplayConfig::new().with_skip_first(false);
        let report = VariantEngine::new()
            .with_config(config)
            .run(|v| two_by_two(v, &seen))
            .unwrap();

        assert_eq!(report.total_runs(), 5);
        assert_eq!(report.replays(), 4);
        assert_eq!(seen.into_inner(), vec!["1A", "1A", "1B", "2A", "2B"]);
    }

    #[test]
    fn test_name_separator() {
        let seen = RefCell::new(Vec::new());
        let config = ReplayConfig::new().with_name_separator(" / ");
        let report = VariantEngine::new()
            .with_config(config)
            .run(|v| two_by_two(v, &seen))
            .unwrap();

        assert_eq!(report.names()[3], "second / second prefix");
    }

    #[test]
    fn test_observer_events() {
        let recorder = RecordingObserver::new();
        let config = ReplayConfig::new().with_discovery_name("learn");
        VariantEngine::new()
            .with_config(config)
            .with_observer(Box::new(recorder.clone()))
            .run(|v| {
                v.pick(&["a", "b"]);
            })
            .unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                ObservedEvent::RunStarted { name: "learn".to_string(), kind: RunKind::Discovery },
                ObservedEvent::RunFinished { name: "a".to_string(), passed: true },
                ObservedEvent::Discovered { choice_points: 1, combinations: 2 },
                ObservedEvent::RunStarted { name: "b".to_string(), kind: RunKind::Replay },
                ObservedEvent::RunFinished { name: "b".to_string(), passed: true },
            ]
        );
    }

    #[test]
    fn test_mismatching_replay_reported_as_failed() {
        let recorder = RecordingObserver::new();
        let mut engine = VariantEngine::new()
            .with_observer(Box::new(recorder.clone()))
            .with_runner(Box::new(IsolatingRunner::new()));

        let result = engine.run(|v| {
            v.pick(&["a", "b"]);
            if !v.is_discovery() {
                v.pick(&["extra"]);
            }
        });

        match result {
            Err(VariantError::StructuralMismatch { run, cursor, .. }) => {
                assert_eq!(run, "b");
                assert_eq!(cursor, 1);
            }
            other => panic!("expected structural mismatch, got {:?}", other),
        }

        assert_eq!(
            recorder.events().last(),
            Some(&ObservedEvent::RunFinished {
                name: "b".to_string(),
                passed: false,
            })
        );

        let partial = engine.take_partial_report().unwrap();
        assert_eq!(partial.names(), vec!["a", "b"]);
        assert!(matches!(
            partial.runs[1].outcome,
            RunOutcome::Mismatch { .. }
        ));
        assert!(engine.take_partial_report().is_none());
    }

    #[test]
    fn test_partial_report_keeps_earlier_failures() {
        let mut engine = VariantEngine::new()
            .with_observer(Box::new(NoopObserver))
            .with_runner(Box::new(IsolatingRunner::new()));

        let result = engine.run(|v| {
            let first = v.pick(&["a", "b", "c"]);
            match first {
                Some(1) => panic!("b broke"),
                Some(2) => {
                    v.pick(&["late"]);
                }
                _ => {}
            }
        });

        assert!(result.is_err());
        let partial = engine.take_partial_report().unwrap();
        assert_eq!(partial.names(), vec!["a", "b", "c"]);
        assert_eq!(partial.runs[1].outcome, RunOutcome::panicked("b broke"));
        assert!(matches!(
            partial.runs[2].outcome,
            RunOutcome::Mismatch { .. }
        ));
    }

    #[test]
    fn test_session_exposes_combination() {
        let seen = RefCell::new(Vec::new());
        VariantEngine::new()
            .run(|v| {
                v.pick(&["a", "b", "c"]);
                seen.borrow_mut()
                    .push((v.is_discovery(), v.combination().cloned(), v.selections().to_vec()));
            })
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (true, None, vec!["a".to_string()]));
        assert_eq!(
            seen[2],
            (false, Some(Combination::new(vec![2])), vec!["c".to_string()])
        );
    }

    proptest! {
        #[test]
        fn prop_every_combination_runs_once(arities in proptest::collection::vec(1usize..4, 0..4)) {
            let names: Vec<Vec<String>> = arities
                .iter()
                .enumerate()
                .map(|(point, &arity)| (0..arity).map(|alt| format!("p{}a{}", point, alt)).collect())
                .collect();
            let seen = RefCell::new(Vec::new());

            let report = VariantEngine::new()
                .run(|v| {
                    let picked: Vec<Option<usize>> = names.iter().map(|n| v.pick(n)).collect();
                    seen.borrow_mut().push(picked);
                })
                .unwrap();

            let seen = seen.into_inner();
            let expected: usize = arities.iter().product();
            prop_assert_eq!(seen.len(), expected);
            prop_assert_eq!(report.total_runs(), expected);

            let mut unique = seen.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), expected);
        }
    }
}
