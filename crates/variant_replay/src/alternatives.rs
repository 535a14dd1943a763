//! Ordered alternatives offered at a choice point.

use crate::session::Session;
use indexmap::IndexMap;
use std::fmt;

/// Branch invoked when its alternative is selected
pub type Action<'a> = Box<dyn FnOnce(&mut Session) + 'a>;

/// Named alternatives in caller order.
///
/// The insertion order is the alternative order recorded in the schema,
/// so the first alternative added is the one taken during discovery.
/// Adding a name twice replaces the action and keeps the original position.
pub struct Alternatives<'a> {
    entries: IndexMap<String, Action<'a>>,
}

impl<'a> Alternatives<'a> {
    /// Create an empty set of alternatives
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Add an alternative
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(&mut Session) + 'a,
    {
        self.insert(name, action);
        self
    }

    /// Add an alternative in place
    pub fn insert<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: FnOnce(&mut Session) + 'a,
    {
        self.entries.insert(name.into(), Box::new(action));
    }

    /// Number of alternatives
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no alternatives
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alternative names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Consume the set, keeping only the action at `index`
    pub(crate) fn into_action(mut self, index: usize) -> Option<Action<'a>> {
        self.entries.swap_remove_index(index).map(|(_, action)| action)
    }
}

impl Default for Alternatives<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Alternatives<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
