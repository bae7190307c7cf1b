//! balprof-core
//!
//! Core validation primitives for balprof:
//! - Generic record trees (`Value`) with ordered maps and exhaustive kinds
//! - Field paths with stable rendering
//! - A data-driven constraint/violation taxonomy
//! - Composable schema nodes (scalar, mapping, sequence, union)
//! - The validation walk, fail-fast or collect-all
//!
//! This crate knows nothing about ballistic profiles; the domain schema
//! and recovery logic live in `balprof-profile`. Everything here is pure
//! computation on in-memory values: no I/O, no clocks, no global state.

pub mod config;
pub mod constraint;
pub mod engine;
pub mod path;
pub mod schema;
pub mod value;
pub mod violation;

pub use crate::config::{validate_config, ConfigError, ValidatorConfig};
pub use crate::constraint::Constraint;
pub use crate::engine::{Mode, Validator};
pub use crate::path::{FieldPath, Segment};
pub use crate::value::{Kind, Value};
pub use crate::violation::Violation;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::ValidatorConfig;
    pub use crate::constraint::Constraint;
    pub use crate::engine::{Mode, Validator};
    pub use crate::path::{FieldPath, Segment};
    pub use crate::schema::{
        boolean, integer, mapping, sequence, string, union, Check, MappingSchema, ScalarSchema,
        ScalarType, Schema, SequenceSchema, UnionSchema,
    };
    pub use crate::value::{Kind, Value};
    pub use crate::violation::Violation;
}
