//! Index tuples and the odometer-order combination generator.
//!
//! A combination holds one alternative index per choice point. Generation
//! is incremental: starting from the single empty tuple, each arity in turn
//! extends every existing tuple by each of its indices, so the last
//! coordinate varies fastest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;

/// One alternative index per choice point, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Combination(Vec<usize>);

impl Combination {
    /// Create a combination from raw indices
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty tuple (no choice points)
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// All-zero tuple of the given length
    #[must_use]
    pub fn first(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Append an index for the next choice point
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.0.push(index);
        self
    }

    /// Get the indices
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Index selected at a cursor position, if the tuple reaches that far
    #[must_use]
    pub fn get(&self, cursor: usize) -> Option<usize> {
        self.0.get(cursor).copied()
    }

    /// Number of coordinates
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the tuple has no coordinates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if every coordinate selects the first alternative
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.0.iter().all(|&index| index == 0)
    }
}

impl From<Vec<usize>> for Combination {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}

/// Extend every tuple by each index in `0..arity`.
///
/// Existing tuples stay in the outer position and the new index in the
/// inner one, so `[[1, 2], [3, 4]]` extended by 3 yields
/// `[1, 2, 0], [1, 2, 1], [1, 2, 2], [3, 4, 0], [3, 4, 1], [3, 4, 2]`.
/// An empty input stays empty.
#[must_use]
pub fn extend(combos: Vec<Combination>, arity: usize) -> Vec<Combination> {
    let mut next = Vec::with_capacity(combos.len().saturating_mul(arity));
    for combo in combos {
        for index in 0..arity {
            next.push(combo.clone().with_index(index));
        }
    }
    next
}

/// Full Cartesian product over `arities`, in odometer order.
///
/// The result holds exactly the product of all arities; an empty
/// `arities` yields the single empty tuple.
#[must_use]
pub fn combinations(arities: &[usize]) -> Vec<Combination> {
    arities
        .iter()
        .fold(vec![Combination::empty()], |combos, &arity| extend(combos, arity))
}

/// Size of the Cartesian product, or `None` if it overflows `usize`
#[must_use]
pub fn combination_count(arities: &[usize]) -> Option<usize> {
    if arities.contains(&0) {
        return Some(0);
    }
    arities.iter().try_fold(1usize, |acc, &arity| acc.checked_mul(arity))
}

/// Lazy odometer iterator over the same sequence as [`combinations`]
#[derive(Debug, Clone)]
pub struct CombinationIter {
    arities: Vec<usize>,
    next: Option<Vec<usize>>,
    remaining: Option<usize>,
}

impl CombinationIter {
    /// Create an iterator over the product of `arities`
    #[must_use]
    pub fn new(arities: &[usize]) -> Self {
        let next = if arities.contains(&0) {
            None
        } else {
            Some(vec![0; arities.len()])
        };

        Self {
            arities: arities.to_vec(),
            next,
            remaining: combination_count(arities),
        }
    }

    fn advance(&self, current: &[usize]) -> Option<Vec<usize>> {
        let mut following = current.to_vec();
        for pos in (0..following.len()).rev() {
            following[pos] += 1;
            if following[pos] < self.arities[pos] {
                return Some(following);
            }
            following[pos] = 0;
        }
        None
    }
}

impl Iterator for CombinationIter {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.advance(&current);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(Combination(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for CombinationIter {}
