//! Replay engine configuration.

use serde::{Deserialize, Serialize};

/// Replay engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Maximum size of the combination space (0 = unlimited)
    pub max_combinations: usize,
    /// Inserted between alternative names in generated run names
    pub name_separator: String,
    /// Skip replaying the all-first combination already covered by discovery
    pub skip_first: bool,
    /// Name reported when the discovery run starts
    pub discovery_name: String,
}

impl ReplayConfig {
    /// Default guard on the combination space
    pub const DEFAULT_MAX_COMBINATIONS: usize = 65_536;

    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_combinations: Self::DEFAULT_MAX_COMBINATIONS,
            name_separator: String::new(),
            skip_first: true,
            discovery_name: "discovery".to_string(),
        }
    }

    /// Set the combination limit
    #[must_use]
    pub fn with_max_combinations(mut self, max: usize) -> Self {
        self.max_combinations = max;
        self
    }

    /// Set the run name separator
    #[must_use]
    pub fn with_name_separator(mut self, separator: impl Into<String>) -> Self {
        self.name_separator = separator.into();
        self
    }

    /// Set whether the all-first combination is skipped after discovery
    #[must_use]
    pub fn with_skip_first(mut self, skip: bool) -> Self {
        self.skip_first = skip;
        self
    }

    /// Set the discovery run name
    #[must_use]
    pub fn with_discovery_name(mut self, name: impl Into<String>) -> Self {
        self.discovery_name = name.into();
        self
    }

    /// Check a combination count against the limit
    #[must_use]
    pub fn allows(&self, count: usize) -> bool {
        self.max_combinations == 0 || count <= self.max_combinations
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self::new()
    }
}
