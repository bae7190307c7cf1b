//! The validation walk.
//!
//! [`Validator`] drives a [`Schema`] over a [`Value`] and produces either
//! success or a violation tree. Two modes:
//! - [`Mode::FailFast`] — the first violation anywhere aborts the whole
//!   walk and is returned on its own (cheap accept/reject gating)
//! - [`Mode::CollectAll`] — the walk never aborts; every violation is
//!   gathered into a tree of object/array aggregates
//!
//! Both modes visit mapping fields in declaration order and array
//! elements in index order, so output is deterministic and testable.
//!
//! The walk is pure and synchronous: no I/O, no clocks, no global state.
//! A `Validator` is `Send + Sync` and may be shared across threads as
//! long as each record belongs to a single call.

use crate::config::ValidatorConfig;
use crate::constraint::Constraint;
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::value::{Kind, Value};
use crate::violation::Violation;

/// Violation propagation policy for one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Abort on the first violation and return it immediately.
    FailFast,
    /// Visit everything, return the full violation tree.
    CollectAll,
}

/// The validation engine. Construct once, reuse for every run.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `value` against `schema` from the record root.
    pub fn validate(&self, schema: &Schema, value: &Value, mode: Mode) -> Result<(), Violation> {
        self.validate_at(schema, value, FieldPath::root(), mode)
    }

    /// Validate with an explicit starting path, for callers that check a
    /// subtree in place (e.g. a discriminator-selected sub-schema).
    pub fn validate_at(
        &self,
        schema: &Schema,
        value: &Value,
        path: FieldPath,
        mode: Mode,
    ) -> Result<(), Violation> {
        let collected = self.walk(schema, value, &path, mode)?;
        match collected.len() {
            0 => Ok(()),
            1 => Err(collected.into_iter().next().expect("len checked")),
            _ => Err(Violation::with_children(
                path,
                Value::Null,
                aggregate_for(value),
                collected,
            )),
        }
    }

    /// One node of the walk.
    ///
    /// `Ok(violations)` is the collect-all result for this subtree
    /// (possibly empty); `Err(first)` is the fail-fast abort.
    fn walk(
        &self,
        schema: &Schema,
        value: &Value,
        path: &FieldPath,
        mode: Mode,
    ) -> Result<Vec<Violation>, Violation> {
        let mut out = Vec::new();

        // Nullability gates everything else.
        if value.is_null() {
            if !schema.nullable() {
                emit(
                    mode,
                    &mut out,
                    Violation::new(path.clone(), value.clone(), Constraint::NotNullable),
                )?;
            }
            return Ok(out);
        }

        // Kind check; a mismatched kind short-circuits the node, checks
        // would only produce noise on top of it.
        if let Some(expected) = schema.expected_kind() {
            if value.kind() != expected {
                emit(
                    mode,
                    &mut out,
                    Violation::new(
                        path.clone(),
                        value.clone(),
                        Constraint::Type { expected, actual: value.kind() },
                    ),
                )?;
                return Ok(out);
            }
        }

        match schema {
            Schema::Scalar(scalar) => {
                for check in &scalar.checks {
                    if let Err(constraint) = check.run(value) {
                        emit(
                            mode,
                            &mut out,
                            Violation::new(path.clone(), value.clone(), constraint),
                        )?;
                    }
                }
                Ok(out)
            }

            Schema::Mapping(map) => {
                let mut errs = Vec::new();
                for (name, field_schema) in &map.fields {
                    let child_path = path.field(name.clone());
                    match value.get(name) {
                        None => {
                            if field_schema.required() {
                                let v = Violation::new(
                                    child_path,
                                    Value::Null,
                                    Constraint::Required,
                                );
                                if mode == Mode::FailFast {
                                    return Err(v);
                                }
                                errs.push(v);
                            }
                        }
                        Some(child) => {
                            errs.extend(self.walk(field_schema, child, &child_path, mode)?);
                        }
                    }
                }
                if !errs.is_empty() {
                    out.push(Violation::with_children(
                        path.clone(),
                        Value::Null,
                        Constraint::InvalidObject,
                        errs,
                    ));
                }
                Ok(out)
            }

            Schema::Sequence(seq) => {
                let mut errs = Vec::new();
                // Length bounds first, then elements.
                for check in &seq.checks {
                    if let Err(constraint) = check.run(value) {
                        emit(
                            mode,
                            &mut errs,
                            Violation::new(path.clone(), value.clone(), constraint),
                        )?;
                    }
                }

                let items = value.as_list().expect("kind checked");
                let mut element_errs = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let child_path = path.index(i);
                    element_errs.extend(self.walk(&seq.element, item, &child_path, mode)?);
                }

                // Collapse pathological element reports into one summary.
                let leaf_count: usize =
                    element_errs.iter().map(|v| v.leaves().len()).sum();
                if leaf_count > self.config.element_error_cap {
                    element_errs = vec![Violation::new(
                        path.clone(),
                        Value::Null,
                        Constraint::TooManyErrors { found: leaf_count },
                    )];
                }

                errs.extend(element_errs);
                if !errs.is_empty() {
                    out.push(Violation::with_children(
                        path.clone(),
                        Value::Null,
                        Constraint::InvalidArray,
                        errs,
                    ));
                }
                Ok(out)
            }

            Schema::Union(un) => {
                // Alternatives are probed fail-fast regardless of the
                // outer mode; each failure becomes one child reason.
                let mut failures = Vec::new();
                for alt in &un.alternatives {
                    match self.walk(alt, value, path, Mode::FailFast) {
                        Ok(_) => return Ok(out),
                        Err(failure) => failures.push(failure),
                    }
                }
                let v = Violation::with_children(
                    path.clone(),
                    value.clone(),
                    Constraint::NoAlternative { tried: un.alternatives.len() },
                    failures,
                );
                emit(mode, &mut out, v)?;
                Ok(out)
            }
        }
    }
}

fn emit(mode: Mode, out: &mut Vec<Violation>, v: Violation) -> Result<(), Violation> {
    match mode {
        Mode::FailFast => Err(v),
        Mode::CollectAll => {
            out.push(v);
            Ok(())
        }
    }
}

fn aggregate_for(value: &Value) -> Constraint {
    match value.kind() {
        Kind::Map => Constraint::InvalidObject,
        Kind::List => Constraint::InvalidArray,
        _ => Constraint::InvalidValue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{integer, mapping, sequence, string, union};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn wrong_kind_is_a_type_violation_at_the_root() {
        let schema = Schema::from(string().max_len(5));
        let validator = Validator::default();

        let err = validator
            .validate(&schema, &Value::Int(12), Mode::FailFast)
            .unwrap_err();
        assert!(err.path.is_root());
        assert_matches!(
            err.constraint,
            Constraint::Type { expected: Kind::String, actual: Kind::Int }
        );
    }

    #[test]
    fn null_rejected_unless_nullable() {
        let validator = Validator::default();

        let strict = Schema::from(integer());
        let err = validator.validate(&strict, &Value::Null, Mode::FailFast).unwrap_err();
        assert_matches!(err.constraint, Constraint::NotNullable);

        let lax = Schema::from(integer().nullable());
        validator.validate(&lax, &Value::Null, Mode::FailFast).unwrap();
    }

    #[test]
    fn fields_are_optional_unless_marked_required() {
        let schema = Schema::from(
            mapping()
                .field("must", string().required())
                .field("may", string()),
        );
        let validator = Validator::default();

        validator
            .validate(&schema, &v(json!({ "must": "x" })), Mode::FailFast)
            .unwrap();

        let err = validator
            .validate(&schema, &v(json!({ "may": "x" })), Mode::FailFast)
            .unwrap_err();
        assert_eq!(err.path.to_string(), "must");
        assert_matches!(err.constraint, Constraint::Required);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let schema = Schema::from(mapping().field("a", integer()));
        let validator = Validator::default();
        validator
            .validate(&schema, &v(json!({ "a": 1, "stray": "ok" })), Mode::FailFast)
            .unwrap();
    }

    #[test]
    fn fail_fast_stops_at_first_collect_all_returns_all() {
        // Three independent faults in declaration order: a, b, c.
        let schema = Schema::from(
            mapping()
                .field("a", integer().int_range(0, 10))
                .field("b", string().max_len(2))
                .field("c", integer().int_range(0, 10)),
        );
        let record = v(json!({ "a": 99, "b": "long", "c": -5 }));
        let validator = Validator::default();

        let first = validator.validate(&schema, &record, Mode::FailFast).unwrap_err();
        assert_eq!(first.path.to_string(), "a");
        assert!(first.is_leaf());

        let tree = validator.validate(&schema, &record, Mode::CollectAll).unwrap_err();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 3);
        let paths: Vec<String> = leaves.iter().map(|l| l.path.to_string()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn sequence_checks_length_then_elements() {
        let schema = Schema::from(
            sequence(integer().int_range(0, 100)).min_items(2).max_items(4),
        );
        let validator = Validator::default();

        // Too short and one bad element: both reported in collect mode.
        let err = validator
            .validate(&schema, &v(json!([500])), Mode::CollectAll)
            .unwrap_err();
        let leaves = err.leaves();
        assert_eq!(leaves.len(), 2);
        assert_matches!(leaves[0].constraint, Constraint::MinItems { limit: 2, actual: 1 });
        assert_eq!(leaves[1].path.to_string(), "[0]");

        // Fail-fast stops at the length bound.
        let err = validator
            .validate(&schema, &v(json!([500])), Mode::FailFast)
            .unwrap_err();
        assert_matches!(err.constraint, Constraint::MinItems { .. });
    }

    #[test]
    fn element_errors_collapse_past_the_cap() {
        let validator = Validator::new(ValidatorConfig { element_error_cap: 3 });
        let schema = Schema::from(sequence(integer().int_range(0, 10)));
        let record = v(json!([99, 99, 99, 99, 99]));

        let err = validator.validate(&schema, &record, Mode::CollectAll).unwrap_err();
        let leaves = err.leaves();
        assert_eq!(leaves.len(), 1);
        assert_matches!(leaves[0].constraint, Constraint::TooManyErrors { found: 5 });

        // At or below the cap, entries come through individually.
        let small = v(json!([99, 99, 99]));
        let err = validator.validate(&schema, &small, Mode::CollectAll).unwrap_err();
        assert_eq!(err.leaves().len(), 3);
    }

    #[test]
    fn union_first_match_wins_and_misses_aggregate() {
        let by_value = mapping()
            .field("tag", string().one_of(["VALUE"]).required())
            .field("n", integer().int_range(100, 1000).required());
        let by_index = mapping()
            .field("tag", string().one_of(["INDEX"]).required())
            .field("n", integer().int_range(0, 10).required());
        let schema = Schema::from(union(vec![by_value.into(), by_index.into()]));
        let validator = Validator::default();

        validator
            .validate(&schema, &v(json!({ "tag": "VALUE", "n": 500 })), Mode::FailFast)
            .unwrap();
        validator
            .validate(&schema, &v(json!({ "tag": "INDEX", "n": 5 })), Mode::FailFast)
            .unwrap();

        // Wrong range for its own tag: neither alternative accepts.
        let err = validator
            .validate(&schema, &v(json!({ "tag": "INDEX", "n": 500 })), Mode::CollectAll)
            .unwrap_err();
        assert_matches!(err.constraint, Constraint::NoAlternative { tried: 2 });
        assert_eq!(err.children.len(), 2);
    }

    #[test]
    fn scaled_range_boundaries_are_exact() {
        // [10.0, 3000.0] at divisor 10: stored 100 and 30000 are the
        // exact boundaries.
        let schema = Schema::from(integer().scaled_range(10.0, 3000.0, 10.0));
        let validator = Validator::default();

        for stored in [100, 30000] {
            validator.validate(&schema, &Value::Int(stored), Mode::FailFast).unwrap();
        }
        for stored in [99, 30001] {
            validator
                .validate(&schema, &Value::Int(stored), Mode::FailFast)
                .unwrap_err();
        }
    }

    proptest::proptest! {
        #[test]
        fn scaled_range_matches_the_arithmetic(stored in -1_000_000i64..1_000_000) {
            let schema = Schema::from(integer().scaled_range(-200.0, 200.0, 1000.0));
            let validator = Validator::default();
            let ok = validator
                .validate(&schema, &Value::Int(stored), Mode::FailFast)
                .is_ok();
            let expected = {
                let scaled = stored as f64 / 1000.0;
                (-200.0..=200.0).contains(&scaled)
            };
            proptest::prop_assert_eq!(ok, expected);
        }
    }
}
