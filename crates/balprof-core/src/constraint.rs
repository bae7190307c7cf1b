//! The failure taxonomy.
//!
//! Every way a value can be rejected is one `Constraint` variant carrying
//! the arguments of the failed check. Messages are formatted lazily from
//! those arguments, so building a constraint is allocation-light and the
//! human-readable text is produced only when a report is rendered.

use std::fmt;

use crate::value::Kind;

/// One failed check, with enough context to format a reason.
///
/// Variants mirror the checks the engine can run plus the synthetic
/// aggregates the collect-all walk produces (`InvalidObject`,
/// `InvalidArray`, `NoAlternative`, `TooManyErrors`) and the
/// record-level rules a domain schema can raise (`IndexOutOfBounds`,
/// `UnsupportedTag`, `DuplicateValues`).
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Value kind does not match the schema node.
    Type { expected: Kind, actual: Kind },
    /// Null where the schema is not nullable.
    NotNullable,
    /// A required mapping field is absent.
    Required,
    /// String longer than the limit, in characters.
    MaxLength { limit: usize, actual: usize },
    /// Scaled quantity outside `[min, max]` after dividing by `divisor`.
    ScaledRange { min: f64, max: f64, divisor: f64 },
    /// Plain integer outside `[min, max]`.
    IntRange { min: i64, max: i64 },
    /// Value not among an enumerated set.
    OneOf { allowed: Vec<String> },
    /// Too few array elements.
    MinItems { limit: usize, actual: usize },
    /// Too many array elements.
    MaxItems { limit: usize, actual: usize },
    /// No union alternative accepted the value.
    NoAlternative { tried: usize },
    /// Cross-field rule: an index field points past its sibling array.
    IndexOutOfBounds { index: i64, len: usize },
    /// A discriminator holds a tag outside the expected domain.
    UnsupportedTag { tag: String },
    /// Entries that must be unique repeat.
    DuplicateValues { what: &'static str },
    /// Element-level errors past the configured cap, collapsed.
    TooManyErrors { found: usize },
    /// Aggregate parent for a scalar that failed several checks.
    InvalidValue,
    /// Aggregate parent for a mapping with failing fields.
    InvalidObject,
    /// Aggregate parent for an array with failing elements.
    InvalidArray,
}

impl Constraint {
    /// A short stable tag naming the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::NotNullable => "not_nullable",
            Self::Required => "required",
            Self::MaxLength { .. } => "max_length",
            Self::ScaledRange { .. } => "range",
            Self::IntRange { .. } => "int_range",
            Self::OneOf { .. } => "one_of",
            Self::MinItems { .. } => "min_items",
            Self::MaxItems { .. } => "max_items",
            Self::NoAlternative { .. } => "no_alternative",
            Self::IndexOutOfBounds { .. } => "index_out_of_bounds",
            Self::UnsupportedTag { .. } => "unsupported_tag",
            Self::DuplicateValues { .. } => "duplicate_values",
            Self::TooManyErrors { .. } => "too_many_errors",
            Self::InvalidValue => "invalid_value",
            Self::InvalidObject => "invalid_object",
            Self::InvalidArray => "invalid_array",
        }
    }

    /// Format the human-readable reason.
    pub fn message(&self) -> String {
        match self {
            Self::Type { expected, actual } => {
                format!("expected value of type {expected}, got {actual}")
            }
            Self::NotNullable => "value can't be null".to_string(),
            Self::Required => "field is required".to_string(),
            Self::MaxLength { limit, actual } => {
                format!("expected string of at most {limit} characters, got {actual}")
            }
            Self::ScaledRange { min, max, divisor } => {
                if (divisor - 1.0).abs() < f64::EPSILON {
                    format!("expected value in range [{min}, {max}]")
                } else {
                    format!("expected value in range [{min}, {max}] at 1/{divisor} scale")
                }
            }
            Self::IntRange { min, max } => {
                format!("expected integer in range [{min}, {max}]")
            }
            Self::OneOf { allowed } => format!("expected one of {}", allowed.join(", ")),
            Self::MinItems { limit, actual } => {
                format!("expected at least {limit} item(s), got {actual}")
            }
            Self::MaxItems { limit, actual } => {
                format!("expected at most {limit} item(s), got {actual}")
            }
            Self::NoAlternative { tried } => {
                format!("value matched none of the {tried} allowed shapes")
            }
            Self::IndexOutOfBounds { index, len } => {
                format!("index {index} is out of bounds for a table of {len} entries")
            }
            Self::UnsupportedTag { tag } => format!("unsupported tag {tag:?}"),
            Self::DuplicateValues { what } => format!("{what} must be unique"),
            Self::TooManyErrors { found } => {
                format!("too many errors, {found} found; individual entries omitted")
            }
            Self::InvalidValue => "invalid value".to_string(),
            Self::InvalidObject => "invalid object".to_string(),
            Self::InvalidArray => "invalid array".to_string(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
