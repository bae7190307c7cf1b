//! Schema nodes.
//!
//! A schema is a tree of four node kinds:
//! - `Scalar` — a string/integer/bool with an ordered list of checks
//! - `Mapping` — keyed fields in declaration order, each optional unless
//!   explicitly marked `.required()`
//! - `Sequence` — a homogeneous array with length checks
//! - `Union` — an ordered list of alternatives, first match wins
//!
//! Nodes are plain data built once at startup and immutable afterwards.
//! Checks are data too (no boxed closures), so schemas are `Clone`,
//! `Debug`, `Send` and `Sync` for free and the engine can match on them
//! exhaustively.
//!
//! Fields default to OPTIONAL; `.required()` is an explicit opt-in. Do
//! not invert this — several profile fields rely on the default.

use crate::constraint::Constraint;
use crate::value::{Kind, Value};

/// Expected scalar type of a [`ScalarSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    /// Integers, the storage type of every scaled quantity. Floats are a
    /// distinct kind and do not coerce.
    Int,
    Bool,
}

/// One data-driven check. Kind checking has already happened when a
/// check runs, so each arm can assume its input shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// String length limit, in characters.
    MaxLen(usize),
    /// Closed interval on `stored / divisor`.
    ScaledRange { min: f64, max: f64, divisor: f64 },
    /// Closed interval on the raw integer.
    IntRange { min: i64, max: i64 },
    /// Enumerated choice.
    OneOf(Vec<Value>),
    /// Minimum number of array elements.
    MinItems(usize),
    /// Maximum number of array elements.
    MaxItems(usize),
}

impl Check {
    /// Run the check; `Err` carries the failed constraint.
    pub fn run(&self, value: &Value) -> Result<(), Constraint> {
        match self {
            Self::MaxLen(limit) => {
                let actual = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
                if actual > *limit {
                    return Err(Constraint::MaxLength { limit: *limit, actual });
                }
                Ok(())
            }
            Self::ScaledRange { min, max, divisor } => {
                let stored = value.as_f64().unwrap_or(f64::NAN);
                let scaled = stored / divisor;
                if !(*min <= scaled && scaled <= *max) {
                    return Err(Constraint::ScaledRange {
                        min: *min,
                        max: *max,
                        divisor: *divisor,
                    });
                }
                Ok(())
            }
            Self::IntRange { min, max } => {
                let v = value.as_i64().unwrap_or(i64::MIN);
                if v < *min || v > *max {
                    return Err(Constraint::IntRange { min: *min, max: *max });
                }
                Ok(())
            }
            Self::OneOf(allowed) => {
                if !allowed.contains(value) {
                    return Err(Constraint::OneOf {
                        allowed: allowed.iter().map(|v| v.to_string()).collect(),
                    });
                }
                Ok(())
            }
            Self::MinItems(limit) => {
                let actual = value.as_list().map(<[Value]>::len).unwrap_or(0);
                if actual < *limit {
                    return Err(Constraint::MinItems { limit: *limit, actual });
                }
                Ok(())
            }
            Self::MaxItems(limit) => {
                let actual = value.as_list().map(<[Value]>::len).unwrap_or(0);
                if actual > *limit {
                    return Err(Constraint::MaxItems { limit: *limit, actual });
                }
                Ok(())
            }
        }
    }
}

/// A node in the validation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Scalar(ScalarSchema),
    Mapping(MappingSchema),
    Sequence(SequenceSchema),
    Union(UnionSchema),
}

impl Schema {
    pub fn required(&self) -> bool {
        match self {
            Self::Scalar(s) => s.required,
            Self::Mapping(s) => s.required,
            Self::Sequence(s) => s.required,
            Self::Union(s) => s.required,
        }
    }

    pub fn nullable(&self) -> bool {
        match self {
            Self::Scalar(s) => s.nullable,
            Self::Mapping(s) => s.nullable,
            Self::Sequence(s) => s.nullable,
            Self::Union(s) => s.nullable,
        }
    }

    /// The generic kind this node expects, or `None` for unions (they
    /// decide per alternative).
    pub fn expected_kind(&self) -> Option<Kind> {
        match self {
            Self::Scalar(s) => Some(match s.scalar_type {
                ScalarType::String => Kind::String,
                ScalarType::Int => Kind::Int,
                ScalarType::Bool => Kind::Bool,
            }),
            Self::Mapping(_) => Some(Kind::Map),
            Self::Sequence(_) => Some(Kind::List),
            Self::Union(_) => None,
        }
    }
}

/// A scalar leaf with ordered checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSchema {
    pub scalar_type: ScalarType,
    pub required: bool,
    pub nullable: bool,
    pub checks: Vec<Check>,
}

impl ScalarSchema {
    fn new(scalar_type: ScalarType) -> Self {
        Self { scalar_type, required: false, nullable: false, checks: Vec::new() }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn max_len(self, limit: usize) -> Self {
        self.check(Check::MaxLen(limit))
    }

    /// Closed interval on `stored / divisor`.
    pub fn scaled_range(self, min: f64, max: f64, divisor: f64) -> Self {
        self.check(Check::ScaledRange { min, max, divisor })
    }

    pub fn int_range(self, min: i64, max: i64) -> Self {
        self.check(Check::IntRange { min, max })
    }

    pub fn one_of<I>(self, allowed: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.check(Check::OneOf(allowed.into_iter().map(Into::into).collect()))
    }
}

impl From<ScalarSchema> for Schema {
    fn from(s: ScalarSchema) -> Self {
        Self::Scalar(s)
    }
}

/// A keyed object; fields validate in declaration order. Unknown keys in
/// the value are ignored (open mapping).
#[derive(Debug, Clone, PartialEq)]
pub struct MappingSchema {
    pub required: bool,
    pub nullable: bool,
    pub fields: Vec<(String, Schema)>,
}

impl MappingSchema {
    fn new() -> Self {
        Self { required: false, nullable: false, fields: Vec::new() }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push((name.into(), schema.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, s)| s)
    }
}

impl From<MappingSchema> for Schema {
    fn from(s: MappingSchema) -> Self {
        Self::Mapping(s)
    }
}

/// A homogeneous array with an element schema and length checks.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSchema {
    pub required: bool,
    pub nullable: bool,
    pub element: Box<Schema>,
    pub checks: Vec<Check>,
}

impl SequenceSchema {
    fn new(element: impl Into<Schema>) -> Self {
        Self {
            required: false,
            nullable: false,
            element: Box::new(element.into()),
            checks: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn min_items(mut self, limit: usize) -> Self {
        self.checks.push(Check::MinItems(limit));
        self
    }

    pub fn max_items(mut self, limit: usize) -> Self {
        self.checks.push(Check::MaxItems(limit));
        self
    }
}

impl From<SequenceSchema> for Schema {
    fn from(s: SequenceSchema) -> Self {
        Self::Sequence(s)
    }
}

/// An ordered list of alternatives; a value is valid iff some alternative
/// accepts it, first match wins.
///
/// Alternatives should be mutually exclusive by construction — typically
/// each one pins a discriminator field to a distinct literal — so "first
/// match" and "exactly one match" coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub required: bool,
    pub nullable: bool,
    pub alternatives: Vec<Schema>,
}

impl UnionSchema {
    fn new(alternatives: Vec<Schema>) -> Self {
        Self { required: false, nullable: false, alternatives }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl From<UnionSchema> for Schema {
    fn from(s: UnionSchema) -> Self {
        Self::Union(s)
    }
}

/// A string scalar.
pub fn string() -> ScalarSchema {
    ScalarSchema::new(ScalarType::String)
}

/// An integer scalar (the storage type of every scaled quantity).
pub fn integer() -> ScalarSchema {
    ScalarSchema::new(ScalarType::Int)
}

/// A boolean scalar.
pub fn boolean() -> ScalarSchema {
    ScalarSchema::new(ScalarType::Bool)
}

/// An empty mapping, to be populated with [`MappingSchema::field`].
pub fn mapping() -> MappingSchema {
    MappingSchema::new()
}

/// A sequence of `element`.
pub fn sequence(element: impl Into<Schema>) -> SequenceSchema {
    SequenceSchema::new(element)
}

/// A union over `alternatives`.
pub fn union(alternatives: Vec<Schema>) -> UnionSchema {
    UnionSchema::new(alternatives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_declaration_order() {
        let m = mapping()
            .field("zulu", string())
            .field("alpha", integer())
            .field("mike", boolean());
        let names: Vec<&str> = m.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn optional_is_the_default() {
        assert!(!Schema::from(string()).required());
        assert!(Schema::from(string().required()).required());
        assert!(!Schema::from(string()).nullable());
    }

    #[test]
    fn scaled_range_uses_divisor() {
        let check = Check::ScaledRange { min: 10.0, max: 3000.0, divisor: 10.0 };
        assert!(check.run(&Value::Int(100)).is_ok());
        assert!(check.run(&Value::Int(30000)).is_ok());
        assert!(check.run(&Value::Int(99)).is_err());
        assert!(check.run(&Value::Int(30001)).is_err());
    }

    #[test]
    fn one_of_matches_exact_values() {
        let check = Check::OneOf(vec![Value::from("G1"), Value::from("G7")]);
        assert!(check.run(&Value::from("G7")).is_ok());
        assert!(check.run(&Value::from("g7")).is_err());
        assert!(check.run(&Value::Int(7)).is_err());
    }

    #[test]
    fn max_len_counts_characters() {
        let check = Check::MaxLen(4);
        assert!(check.run(&Value::from("αβγδ")).is_ok());
        assert!(check.run(&Value::from("αβγδε")).is_err());
    }
}
