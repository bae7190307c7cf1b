//! Violations.
//!
//! A violation is one concrete failure: where it happened, what the value
//! was, which constraint rejected it. Collect-all validation returns a
//! tree: leaves are individual field failures, internal nodes are the
//! synthetic object/array/union aggregates that group them. The flat view
//! recovery works from is [`Violation::leaves`], the tree's leaves in
//! traversal order.

use crate::constraint::Constraint;
use crate::path::FieldPath;
use crate::value::Value;

/// One validation failure, possibly aggregating child failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{path}: {constraint}")]
pub struct Violation {
    pub path: FieldPath,
    pub value: Value,
    pub constraint: Constraint,
    pub children: Vec<Violation>,
}

impl Violation {
    pub fn new(path: FieldPath, value: Value, constraint: Constraint) -> Self {
        Self { path, value, constraint, children: Vec::new() }
    }

    pub fn with_children(
        path: FieldPath,
        value: Value,
        constraint: Constraint,
        children: Vec<Violation>,
    ) -> Self {
        Self { path, value, constraint, children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// All leaf violations under this node, in traversal order.
    ///
    /// A node without children yields itself; aggregates yield their
    /// descendants depth-first, left to right.
    pub fn leaves(&self) -> Vec<&Violation> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Violation>) {
        if self.children.is_empty() {
            out.push(self);
            return;
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Multi-line rendering for logs and console reports.
    pub fn format(&self) -> String {
        let mut out = String::new();
        self.format_into(&mut out, 0);
        out
    }

    fn format_into(&self, out: &mut String, depth: usize) {
        use std::fmt::Write as _;
        let pad = "  ".repeat(depth);
        let _ = writeln!(out, "{pad}{}:", self.path);
        let _ = writeln!(out, "{pad}  value  : {}", self.value);
        let _ = writeln!(out, "{pad}  reason : {}", self.constraint.message());
        for child in &self.children {
            child.format_into(out, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(path: FieldPath, v: i64) -> Violation {
        Violation::new(path, Value::Int(v), Constraint::IntRange { min: 0, max: 10 })
    }

    #[test]
    fn leaves_come_back_in_traversal_order() {
        let root = FieldPath::root();
        let tree = Violation::with_children(
            root.clone(),
            Value::Null,
            Constraint::InvalidObject,
            vec![
                leaf(root.field("a"), 11),
                Violation::with_children(
                    root.field("b"),
                    Value::Null,
                    Constraint::InvalidArray,
                    vec![leaf(root.field("b").index(0), 12), leaf(root.field("b").index(2), 13)],
                ),
            ],
        );

        let leaves = tree.leaves();
        let paths: Vec<String> = leaves.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["a", "b[0]", "b[2]"]);
        assert!(leaves.iter().all(|v| v.is_leaf()));
    }

    #[test]
    fn single_violation_is_its_own_leaf() {
        let v = leaf(FieldPath::root().field("x"), 99);
        assert_eq!(v.leaves().len(), 1);
        assert!(v.format().contains("reason"));
    }
}
