//! Choice-point schema recorded during the discovery run.

use crate::combination::{combination_count, combinations, Combination, CombinationIter};
use crate::error::{VariantError, VariantResult};
use serde::{Deserialize, Serialize};

/// A location in a test body offering named alternatives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePoint {
    /// Alternative names, in the order the caller supplied them
    names: Vec<String>,
}

impl ChoicePoint {
    /// Create a choice point from its alternative names
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the alternative names
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of alternatives
    #[must_use]
    pub fn arity(&self) -> usize {
        self.names.len()
    }

    /// Check if the point offers no alternatives
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the alternative at `index`
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Check if `names` matches this point exactly, order included
    #[must_use]
    pub fn same_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.names.len() == names.len()
            && self.names.iter().zip(names).all(|(a, b)| a == b.as_ref())
    }
}

/// Ordered registry of choice points, indexed by discovery order.
///
/// Points are only ever appended. Once discovery completes the schema is
/// shared read-only with every replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    points: Vec<ChoicePoint>,
}

impl Schema {
    /// Create an empty schema
    #[must_use]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Append a newly discovered choice point, returning its position
    pub fn record(&mut self, point: ChoicePoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Get the choice point at a cursor position
    #[must_use]
    pub fn get(&self, cursor: usize) -> Option<&ChoicePoint> {
        self.points.get(cursor)
    }

    /// Get all choice points
    #[must_use]
    pub fn points(&self) -> &[ChoicePoint] {
        &self.points
    }

    /// Number of choice points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no choice points were discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raw arity per choice point
    #[must_use]
    pub fn arities(&self) -> Vec<usize> {
        self.points.iter().map(ChoicePoint::arity).collect()
    }

    /// Arity per choice point, with empty points counted as one.
    ///
    /// An empty point keeps its coordinate slot (always 0) so tuples stay
    /// aligned with cursor positions, without changing the product.
    #[must_use]
    pub fn effective_arities(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.arity().max(1)).collect()
    }

    /// Size of the combination space, or `None` on overflow
    #[must_use]
    pub fn combination_count(&self) -> Option<usize> {
        combination_count(&self.effective_arities())
    }

    /// All combinations in odometer order
    #[must_use]
    pub fn combinations(&self) -> Vec<Combination> {
        combinations(&self.effective_arities())
    }

    /// Lazy iterator over all combinations in odometer order
    #[must_use]
    pub fn iter_combinations(&self) -> CombinationIter {
        CombinationIter::new(&self.effective_arities())
    }

    /// Check that a combination fits this schema
    ///
    /// # Errors
    ///
    /// Returns error if the length differs or an index is out of range
    pub fn check(&self, combination: &Combination) -> VariantResult<()> {
        if combination.len() != self.points.len() {
            return Err(VariantError::CombinationLength {
                expected: self.points.len(),
                actual: combination.len(),
            });
        }

        for (cursor, (point, &index)) in self.points.iter().zip(combination.indices()).enumerate() {
            let arity = point.arity().max(1);
            if index >= arity {
                return Err(VariantError::CombinationOutOfRange { cursor, index, arity });
            }
        }

        Ok(())
    }

    /// Concatenated alternative names selected by a combination
    ///
    /// # Errors
    ///
    /// Returns error if the combination does not fit this schema
    pub fn name_for(&self, combination: &Combination) -> VariantResult<String> {
        self.name_with_separator(combination, "")
    }

    /// Selected alternative names joined by `separator`, skipping empty points
    ///
    /// # Errors
    ///
    /// Returns error if the combination does not fit this schema
    pub fn name_with_separator(
        &self,
        combination: &Combination,
        separator: &str,
    ) -> VariantResult<String> {
        self.check(combination)?;

        let parts: Vec<&str> = self
            .points
            .iter()
            .zip(combination.indices())
            .filter_map(|(point, &index)| point.name(index))
            .collect();

        Ok(parts.join(separator))
    }
}
