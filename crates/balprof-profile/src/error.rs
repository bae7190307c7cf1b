//! Error types for profile validation and decoding.

use std::fmt;

use balprof_core::Violation;

/// The outcome of a failed validation run.
///
/// `violations` holds the top-level entries of the run: the engine's
/// violation tree plus any record-level rule failures (dependency,
/// discriminator routing, uniqueness). The flat leaf view, in the order
/// the engine produced them, is [`ValidationFailure::leaves`].
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "profile record failed validation with {} violation(s)",
            self.leaf_count()
        )
    }
}

impl std::error::Error for ValidationFailure {}

impl ValidationFailure {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Leaf violations across all entries, in traversal order.
    pub fn leaves(&self) -> Vec<&Violation> {
        self.violations.iter().flat_map(Violation::leaves).collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.violations.iter().map(|v| v.leaves().len()).sum()
    }

    /// Multi-line report of every violation.
    pub fn format(&self) -> String {
        let mut out = String::new();
        for v in &self.violations {
            out.push_str(&v.format());
        }
        out
    }
}

/// A generic tree that does not decode into the typed payload.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode profile record: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;
    use balprof_core::{Constraint, FieldPath, Value};

    #[test]
    fn leaf_count_spans_entries() {
        let a = Violation::new(
            FieldPath::root().field("a"),
            Value::Int(1),
            Constraint::IntRange { min: 0, max: 0 },
        );
        let b = Violation::with_children(
            FieldPath::root(),
            Value::Null,
            Constraint::InvalidObject,
            vec![a.clone(), a.clone()],
        );
        let failure = ValidationFailure::new(vec![a, b]);
        assert_eq!(failure.leaf_count(), 3);
        assert!(failure.to_string().contains("3 violation(s)"));
    }
}
