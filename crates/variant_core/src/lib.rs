//! Variant Core Types
//!
//! Pure types for replay-driven test variants, with no I/O.
//! A test body exposes choice points; this crate describes the frozen
//! schema of those points and enumerates every combination of their
//! alternatives in odometer order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combination;
pub mod error;
pub mod schema;

// Re-exports
pub use combination::{combination_count, combinations, extend, Combination, CombinationIter};
pub use error::{VariantError, VariantResult};
pub use schema::{ChoicePoint, Schema};
