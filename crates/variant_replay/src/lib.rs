//! Variant Replay Engine
//!
//! Runs a single test body once per combination of its choice points.
//! The first run discovers the schema while always taking the first
//! alternative; every remaining combination is then replayed with a fresh
//! [`Session`] steering each choice point.
//!
//! ```
//! use std::cell::RefCell;
//! use variant_replay::{run_variants, Alternatives};
//!
//! let seen = RefCell::new(Vec::new());
//! run_variants(|v| {
//!     let label = RefCell::new(String::new());
//!     v.choose(
//!         Alternatives::new()
//!             .with("first", |_| label.borrow_mut().push('1'))
//!             .with("second", |_| label.borrow_mut().push('2')),
//!     );
//!     v.choose(
//!         Alternatives::new()
//!             .with("first suffix", |_| label.borrow_mut().push('A'))
//!             .with("second prefix", |_| label.borrow_mut().push('B')),
//!     );
//!     seen.borrow_mut().push(label.into_inner());
//! });
//! assert_eq!(seen.into_inner(), vec!["1A", "1B", "2A", "2B"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alternatives;
pub mod config;
pub mod engine;
pub mod observer;
pub mod report;
pub mod runner;
pub mod session;

pub use alternatives::{Action, Alternatives};
pub use config::ReplayConfig;
pub use engine::{run_variants, VariantEngine};
pub use observer::{
    NoopObserver, ObservedEvent, RecordingObserver, RunInfo, RunKind, TracingObserver,
    VariantObserver,
};
pub use report::{RunOutcome, RunRecord, VariantReport};
pub use runner::{InlineRunner, IsolatingRunner, SubRunner};
pub use session::Session;

pub use variant_core::{Combination, Schema, VariantError, VariantResult};
