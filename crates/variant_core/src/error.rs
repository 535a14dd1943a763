//! Error types for variant discovery and replay.

/// Variant result type
pub type VariantResult<T> = Result<T, VariantError>;

/// Variant error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    /// A replay run diverged from the schema recorded during discovery
    #[error("Structural mismatch in run {run} at choice point {cursor}: {reason}")]
    StructuralMismatch {
        /// Name of the diverging run
        run: String,
        /// Cursor position where the divergence was observed
        cursor: usize,
        /// What differed
        reason: String,
    },

    /// A combination selects an index outside its choice point
    #[error("Combination index {index} out of range at choice point {cursor} (arity {arity})")]
    CombinationOutOfRange {
        /// Choice point position
        cursor: usize,
        /// Offending index
        index: usize,
        /// Arity of the choice point
        arity: usize,
    },

    /// A combination has a different length than the schema
    #[error("Combination length {actual} does not match schema length {expected}")]
    CombinationLength {
        /// Number of choice points in the schema
        expected: usize,
        /// Length of the combination
        actual: usize,
    },

    /// The combination space is larger than the configured limit
    #[error("Too many combinations: {count} exceeds limit {limit}")]
    TooManyCombinations {
        /// Size of the combination space (`usize::MAX` on overflow)
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// A replay run failed under a runner that isolates failures
    #[error("Run {name} failed: {message}")]
    RunFailed {
        /// Generated run name
        name: String,
        /// Failure message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VariantError::TooManyCombinations { count: 10, limit: 4 };
        assert_eq!(err.to_string(), "Too many combinations: 10 exceeds limit 4");

        let err = VariantError::RunFailed {
            name: "secondfirst suffix".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Run secondfirst suffix failed: boom");
    }

    #[test]
    fn test_structural_mismatch_display() {
        let err = VariantError::StructuralMismatch {
            run: "ab".to_string(),
            cursor: 2,
            reason: "extra choice point".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("ab"));
        assert!(s.contains("choice point 2"));
        assert!(s.contains("extra choice point"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = VariantError::CombinationLength { expected: 2, actual: 1 };
        let err2 = VariantError::CombinationLength { expected: 2, actual: 1 };
        assert_eq!(err1, err2);

        let err3 = VariantError::CombinationOutOfRange { cursor: 0, index: 3, arity: 2 };
        assert_ne!(err1, err3);
    }
}
