//! The profile schema and its validator.
//!
//! The bulk of the field table is an ordinary mapping schema built from
//! `balprof-core` primitives. Three rules cannot be expressed as
//! per-field checks and run as explicit post-passes over the already
//! walked record:
//!
//! - `c_zero_distance_idx` must index into `distances`; the violation is
//!   reported at `profile.distances`, since the table is what a user
//!   should fix.
//! - `coef_rows` validates against a sub-schema selected by the
//!   `bc_type` discriminator; an unrecognized tag is reported once on
//!   `bc_type` and suppresses row-level noise.
//! - non-zero `mv` entries in `coef_rows` must be unique.
//!
//! A [`ProfileValidator`] is built once and reused; it is `Send + Sync`
//! and holds no per-run state.

use std::collections::BTreeSet;

use balprof_core::schema::{
    integer, mapping, sequence, string, union, MappingSchema, ScalarSchema, Schema,
    SequenceSchema,
};
use balprof_core::{Constraint, FieldPath, Mode, Validator, ValidatorConfig, Value, Violation};

use crate::error::ValidationFailure;

/// Allowed drag model tags.
pub const BC_TYPES: [&str; 3] = ["G1", "G7", "CUSTOM"];

/// Allowed twist directions.
pub const TWIST_DIRS: [&str; 2] = ["RIGHT", "LEFT"];

/// `c_idx` is an index in 0..=200, or the sentinel 255 meaning "unused".
fn c_idx_schema() -> Schema {
    union(vec![
        integer().one_of([255i64]).into(),
        integer().int_range(0, 200).into(),
    ])
    .into()
}

/// One switch-record alternative, pinned to a `distance_from` tag.
fn switch_variant(tag: &str, distance: ScalarSchema) -> Schema {
    mapping()
        .field("c_idx", c_idx_schema())
        .field("distance_from", string().one_of([tag]).required())
        .field("distance", distance.required())
        .field("reticle_idx", integer().int_range(0, 255).required())
        .field("zoom", integer().int_range(0, 4).required())
        .into()
}

/// The switch record: a union discriminated on `distance_from`.
///
/// `VALUE` carries an absolute scaled distance, `INDEX` an index into
/// the distance table; the alternatives are disjoint by their pinned
/// discriminator literal.
fn switch_schema() -> Schema {
    union(vec![
        switch_variant("VALUE", integer().scaled_range(1.0, 3000.0, 100.0)),
        switch_variant("INDEX", integer().int_range(0, 200)),
    ])
    .into()
}

/// The profile mapping, fields in declaration order.
///
/// `coef_rows` is deliberately absent here: its schema depends on
/// `bc_type` and is routed in [`ProfileValidator::validate`].
fn profile_mapping() -> MappingSchema {
    mapping()
        // descriptor
        .field("profile_name", string().max_len(50).required())
        .field("cartridge_name", string().max_len(50).required())
        .field("bullet_name", string().max_len(50).required())
        .field("short_name_top", string().max_len(8).required())
        .field("short_name_bot", string().max_len(8).required())
        .field("caliber", string().max_len(50).required())
        .field("device_uuid", string().max_len(50))
        .field("user_note", string().max_len(1024))
        // zeroing
        .field("zero_x", integer().scaled_range(-200.0, 200.0, 1000.0).required())
        .field("zero_y", integer().scaled_range(-200.0, 200.0, 1000.0).required())
        // tables
        .field(
            "distances",
            sequence(integer().scaled_range(1.0, 3000.0, 100.0).required())
                .min_items(1)
                .max_items(200),
        )
        .field("switches", sequence(switch_schema()).min_items(4))
        // rifle
        .field("sc_height", integer().scaled_range(-5000.0, 5000.0, 1.0).required())
        .field("r_twist", integer().scaled_range(0.0, 100.0, 100.0).required())
        .field("twist_dir", string().one_of(TWIST_DIRS).required())
        // cartridge
        .field("c_muzzle_velocity", integer().scaled_range(10.0, 3000.0, 10.0).required())
        .field("c_zero_temperature", integer().scaled_range(-100.0, 100.0, 1.0).required())
        .field("c_t_coeff", integer().scaled_range(0.0, 5.0, 1000.0).required())
        // zeroing reference
        .field("c_zero_distance_idx", integer().int_range(0, 200).required())
        .field("c_zero_air_temperature", integer().scaled_range(-100.0, 100.0, 1.0).required())
        .field("c_zero_air_pressure", integer().scaled_range(300.0, 1500.0, 10.0).required())
        .field("c_zero_air_humidity", integer().scaled_range(0.0, 100.0, 1.0).required())
        .field("c_zero_w_pitch", integer().scaled_range(-90.0, 90.0, 10.0).required())
        .field("c_zero_p_temperature", integer().scaled_range(-100.0, 100.0, 1.0).required())
        // bullet
        .field("b_diameter", integer().scaled_range(0.001, 50.0, 1000.0).required())
        .field("b_weight", integer().scaled_range(1.0, 6553.5, 10.0).required())
        .field("b_length", integer().scaled_range(0.01, 200.0, 1000.0).required())
        // drag model discriminator; tags are checked during routing
        .field("bc_type", string().required())
}

/// The full payload schema: one required `profile` key.
pub fn payload_schema() -> Schema {
    mapping().field("profile", profile_mapping().required()).into()
}

/// Row schema for the standard (G1/G7) drag models: 1..=5 rows of
/// coefficient `[0, 1.0]` at 1/10000 and velocity `[0, 3000.0]` at 1/10.
fn standard_rows() -> Schema {
    rows_mapping(
        sequence(
            mapping()
                .field("bc_cd", integer().scaled_range(0.0, 1.0, 10_000.0).required())
                .field("mv", integer().scaled_range(0.0, 3000.0, 10.0).required()),
        )
        .min_items(1)
        .max_items(5)
        .required(),
    )
}

/// Row schema for the custom drag model: 1..=200 rows, both fields
/// `[0, 10.0]` at 1/10000.
fn custom_rows() -> Schema {
    rows_mapping(
        sequence(
            mapping()
                .field("bc_cd", integer().scaled_range(0.0, 10.0, 10_000.0).required())
                .field("mv", integer().scaled_range(0.0, 10.0, 10_000.0).required()),
        )
        .min_items(1)
        .max_items(200)
        .required(),
    )
}

/// Wrap a row sequence in a single-field mapping so presence checking
/// rides on the ordinary mapping walk.
fn rows_mapping(rows: SequenceSchema) -> Schema {
    mapping().field("coef_rows", rows).into()
}

/// Validates complete payload records.
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    engine: Validator,
    schema: Schema,
    standard_rows: Schema,
    custom_rows: Schema,
}

impl Default for ProfileValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl ProfileValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            engine: Validator::new(config),
            schema: payload_schema(),
            standard_rows: standard_rows(),
            custom_rows: custom_rows(),
        }
    }

    /// Validate a generic payload record.
    ///
    /// Fail-fast returns the first violation in declaration order;
    /// collect-all returns every violation, with the record-level rules
    /// appended after the engine's tree.
    pub fn validate(&self, record: &Value, mode: Mode) -> Result<(), ValidationFailure> {
        let mut violations = Vec::new();

        if let Err(v) = self.engine.validate(&self.schema, record, mode) {
            if mode == Mode::FailFast {
                return Err(ValidationFailure::new(vec![v]));
            }
            violations.push(v);
        }

        if let Some(profile) = record.get("profile") {
            for v in self.record_rules(profile, mode) {
                if mode == Mode::FailFast {
                    return Err(ValidationFailure::new(vec![v]));
                }
                violations.push(v);
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(violations))
        }
    }

    /// The cross-field and discriminator-routed rules.
    fn record_rules(&self, profile: &Value, mode: Mode) -> Vec<Violation> {
        let mut out = Vec::new();
        let profile_path = FieldPath::root().field("profile");

        // Index-into-table dependency. Reported on the table, not the
        // index: the table is what the user should fix.
        if let Some(idx) = profile.get("c_zero_distance_idx").and_then(Value::as_i64) {
            let len = profile
                .get("distances")
                .and_then(Value::as_list)
                .map(<[Value]>::len)
                .unwrap_or(0);
            if idx < 0 || idx as usize >= len {
                out.push(Violation::new(
                    profile_path.field("distances"),
                    profile.get("distances").cloned().unwrap_or(Value::Null),
                    Constraint::IndexOutOfBounds { index: idx, len },
                ));
                if mode == Mode::FailFast {
                    return out;
                }
            }
        }

        // Discriminator routing for the drag rows.
        match profile.get("bc_type").and_then(Value::as_str) {
            Some("G1") | Some("G7") => {
                self.route_rows(&self.standard_rows, profile, &profile_path, mode, &mut out);
            }
            Some("CUSTOM") => {
                self.route_rows(&self.custom_rows, profile, &profile_path, mode, &mut out);
            }
            Some(other) => {
                // One violation on the discriminator; no spurious
                // row-level errors on top of it.
                out.push(Violation::new(
                    profile_path.field("bc_type"),
                    Value::from(other),
                    Constraint::UnsupportedTag { tag: other.to_string() },
                ));
            }
            // Absent or mistyped: already reported by the mapping walk.
            None => {}
        }

        out
    }

    fn route_rows(
        &self,
        rows_schema: &Schema,
        profile: &Value,
        profile_path: &FieldPath,
        mode: Mode,
        out: &mut Vec<Violation>,
    ) {
        if let Err(v) =
            self.engine
                .validate_at(rows_schema, profile, profile_path.clone(), mode)
        {
            out.push(v);
            if mode == Mode::FailFast {
                return;
            }
        }

        // Within the rows, non-zero velocity entries must be unique.
        if let Some(rows) = profile.get("coef_rows").and_then(Value::as_list) {
            let mvs: Vec<i64> = rows
                .iter()
                .filter_map(|row| row.get("mv").and_then(Value::as_i64))
                .filter(|mv| *mv != 0)
                .collect();
            let unique: BTreeSet<i64> = mvs.iter().copied().collect();
            if unique.len() != mvs.len() {
                out.push(Violation::new(
                    profile_path.field("coef_rows"),
                    Value::List(rows.to_vec()),
                    Constraint::DuplicateValues { what: "non-zero mv entries" },
                ));
            }
        }
    }
}
