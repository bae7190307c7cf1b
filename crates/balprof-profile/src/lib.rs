//! balprof-profile
//!
//! The ballistic profile domain on top of `balprof-core`:
//! - The typed payload model and its generic-tree conversion pair
//! - The profile schema: ~30 scaled-integer/string/choice fields, the
//!   index-into-table dependency, and the drag-model discriminator
//! - Canned distance/switch/drag tables and a typed profile builder
//! - Two-tier best-effort recovery with full substitution reporting
//!
//! Typical flow: obtain a generic record (from [`model::Payload`] or an
//! external decoder), run [`ProfileValidator::validate`]; on failure,
//! hand the record to [`RecoveryPipeline::run`] and inspect the report.
//! Everything is pure and synchronous; validators, registries, and the
//! pipeline are built once and shared freely across threads.

pub mod builder;
pub mod error;
pub mod model;
pub mod recover;
pub mod schema;
pub mod tables;

pub use crate::error::{DecodeError, ValidationFailure};
pub use crate::model::{BcType, CoefRow, DistanceFrom, Payload, Profile, Switch, TwistDir};
pub use crate::recover::pipeline::{RecoveryPipeline, RecoveryReport};
pub use crate::recover::{FieldKey, FixAction, RecoverResult, RecoveryTier, Registry};
pub use crate::schema::{payload_schema, ProfileValidator};
pub use crate::tables::DistanceTable;

/// Convenience re-exports, including the engine types callers interact
/// with directly.
pub mod prelude {
    pub use balprof_core::{Constraint, FieldPath, Mode, ValidatorConfig, Value, Violation};

    pub use crate::builder::ProfileBuilder;
    pub use crate::error::{DecodeError, ValidationFailure};
    pub use crate::model::{BcType, CoefRow, DistanceFrom, Payload, Profile, Switch, TwistDir};
    pub use crate::recover::pipeline::{RecoveryPipeline, RecoveryReport};
    pub use crate::recover::{FieldKey, FixAction, RecoverResult, RecoveryTier, Registry};
    pub use crate::schema::ProfileValidator;
    pub use crate::tables::DistanceTable;
}
