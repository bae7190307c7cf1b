//! Best-effort recovery.
//!
//! A registry maps known profile fields to corrective actions. Recovery
//! walks the leaf violations of a failed validation in engine order,
//! looks each one up, applies the registered fix if there is one, and
//! reports every substitution. An unregistered path is skipped, never an
//! error — final success is always decided by re-validation, not assumed
//! here.
//!
//! Keys are an enum rather than path strings: the compiler keeps the
//! registry and the schema's field set honest, and element-level paths
//! (`profile.distances[3]`) fall back to their owning field.

pub mod pipeline;

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use balprof_core::{FieldPath, Segment, Value, Violation};

use crate::tables::{default_coef_rows, default_switches, DistanceTable};

/// Which of the two default-substitution registries a fix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    /// Schema-shape defaults, applied first.
    Spec,
    /// Record-shape defaults, applied to whatever the first tier left.
    Proto,
}

impl RecoveryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spec => "spec",
            Self::Proto => "proto",
        }
    }
}

/// Compile-time-checked keys: one variant per recoverable profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldKey {
    ProfileName,
    CartridgeName,
    BulletName,
    ShortNameTop,
    ShortNameBot,
    Caliber,
    DeviceUuid,
    UserNote,
    ZeroX,
    ZeroY,
    ScHeight,
    RTwist,
    TwistDir,
    CMuzzleVelocity,
    CZeroTemperature,
    CTCoeff,
    CZeroDistanceIdx,
    CZeroAirTemperature,
    CZeroAirPressure,
    CZeroAirHumidity,
    CZeroWPitch,
    CZeroPTemperature,
    BDiameter,
    BWeight,
    BLength,
    BcType,
    Distances,
    Switches,
    CoefRows,
}

impl FieldKey {
    /// The field's name inside the profile mapping.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::ProfileName => "profile_name",
            Self::CartridgeName => "cartridge_name",
            Self::BulletName => "bullet_name",
            Self::ShortNameTop => "short_name_top",
            Self::ShortNameBot => "short_name_bot",
            Self::Caliber => "caliber",
            Self::DeviceUuid => "device_uuid",
            Self::UserNote => "user_note",
            Self::ZeroX => "zero_x",
            Self::ZeroY => "zero_y",
            Self::ScHeight => "sc_height",
            Self::RTwist => "r_twist",
            Self::TwistDir => "twist_dir",
            Self::CMuzzleVelocity => "c_muzzle_velocity",
            Self::CZeroTemperature => "c_zero_temperature",
            Self::CTCoeff => "c_t_coeff",
            Self::CZeroDistanceIdx => "c_zero_distance_idx",
            Self::CZeroAirTemperature => "c_zero_air_temperature",
            Self::CZeroAirPressure => "c_zero_air_pressure",
            Self::CZeroAirHumidity => "c_zero_air_humidity",
            Self::CZeroWPitch => "c_zero_w_pitch",
            Self::CZeroPTemperature => "c_zero_p_temperature",
            Self::BDiameter => "b_diameter",
            Self::BWeight => "b_weight",
            Self::BLength => "b_length",
            Self::BcType => "bc_type",
            Self::Distances => "distances",
            Self::Switches => "switches",
            Self::CoefRows => "coef_rows",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "profile_name" => Self::ProfileName,
            "cartridge_name" => Self::CartridgeName,
            "bullet_name" => Self::BulletName,
            "short_name_top" => Self::ShortNameTop,
            "short_name_bot" => Self::ShortNameBot,
            "caliber" => Self::Caliber,
            "device_uuid" => Self::DeviceUuid,
            "user_note" => Self::UserNote,
            "zero_x" => Self::ZeroX,
            "zero_y" => Self::ZeroY,
            "sc_height" => Self::ScHeight,
            "r_twist" => Self::RTwist,
            "twist_dir" => Self::TwistDir,
            "c_muzzle_velocity" => Self::CMuzzleVelocity,
            "c_zero_temperature" => Self::CZeroTemperature,
            "c_t_coeff" => Self::CTCoeff,
            "c_zero_distance_idx" => Self::CZeroDistanceIdx,
            "c_zero_air_temperature" => Self::CZeroAirTemperature,
            "c_zero_air_pressure" => Self::CZeroAirPressure,
            "c_zero_air_humidity" => Self::CZeroAirHumidity,
            "c_zero_w_pitch" => Self::CZeroWPitch,
            "c_zero_p_temperature" => Self::CZeroPTemperature,
            "b_diameter" => Self::BDiameter,
            "b_weight" => Self::BWeight,
            "b_length" => Self::BLength,
            "bc_type" => Self::BcType,
            "distances" => Self::Distances,
            "switches" => Self::Switches,
            "coef_rows" => Self::CoefRows,
            _ => return None,
        })
    }

    /// Resolve a violation path to a key.
    ///
    /// The leaf field name wins; paths ending in array indices or in
    /// fields of nested records (switch members, drag rows) fall back to
    /// the nearest enclosing known field.
    pub fn from_path(path: &FieldPath) -> Option<Self> {
        path.segments().iter().rev().find_map(|seg| match seg {
            Segment::Field(name) => Self::from_name(name),
            Segment::Index(_) => None,
        })
    }
}

/// One corrective action against the record.
#[derive(Debug, Clone, PartialEq)]
pub enum FixAction {
    /// Replace the field with a known-safe integer.
    SetInt(i64),
    /// Replace the field with a fixed string.
    SetString(&'static str),
    /// Truncate the string to `limit` characters; a non-string value
    /// becomes `fallback` (truncated too).
    Truncate { limit: usize, fallback: &'static str },
    /// Replace the distance table with the long-range default.
    ResetDistances,
    /// Replace the switch block with the default four positions.
    ResetSwitches,
    /// Replace the drag rows with the single default row.
    ResetCoefRows,
}

impl FixAction {
    fn apply(&self, key: FieldKey, record: &mut Value) {
        let Some(profile) = record.get_mut("profile") else {
            return;
        };
        let field = key.field_name();
        match self {
            Self::SetInt(v) => profile.insert(field, Value::Int(*v)),
            Self::SetString(s) => {
                if key == FieldKey::BcType {
                    warn!("drag model restored to {s}");
                }
                profile.insert(field, Value::from(*s));
            }
            Self::Truncate { limit, fallback } => {
                let source = profile
                    .get(field)
                    .and_then(Value::as_str)
                    .unwrap_or(fallback);
                let truncated: String = source.chars().take(*limit).collect();
                profile.insert(field, Value::String(truncated));
            }
            Self::ResetDistances => {
                let table: Vec<Value> = DistanceTable::LongRange
                    .scaled()
                    .into_iter()
                    .map(Value::Int)
                    .collect();
                profile.insert(field, Value::List(table));
            }
            Self::ResetSwitches => {
                profile.insert(field, to_generic_list(&default_switches()));
            }
            Self::ResetCoefRows => {
                warn!("drag model coefficients restored to 0.1");
                profile.insert(field, to_generic_list(&default_coef_rows()));
            }
        }
    }
}

fn to_generic_list<T: serde::Serialize>(items: &[T]) -> Value {
    // Plain data with string keys; serialization cannot fail.
    Value::from(serde_json::to_value(items).expect("table serializes"))
}

/// The report for one violation handed to recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverResult {
    pub path: FieldPath,
    pub recovered: bool,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl fmt::Display for RecoverResult {
    /// One-line rendering with long values elided; the untruncated
    /// values stay available on the struct.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.recovered { "recovered" } else { "skipped" };
        write!(
            f,
            "{status:<9} : {:<30} : {} -> {}",
            elide(&self.path.to_string(), 30),
            render(self.old_value.as_ref()),
            render(self.new_value.as_ref()),
        )
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) => elide(&v.to_string(), 50),
    }
}

fn elide(s: &str, max: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max {
        return s;
    }
    let head: String = s.chars().take(max / 2).collect();
    let tail: String = s.chars().skip(s.chars().count() - max / 2).collect();
    format!("{head} ... {tail}")
}

/// A path-keyed table of corrective actions, built once and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    tier: RecoveryTier,
    fixes: BTreeMap<FieldKey, FixAction>,
}

impl Registry {
    /// An empty registry for the given tier.
    pub fn new(tier: RecoveryTier) -> Self {
        Self { tier, fixes: BTreeMap::new() }
    }

    pub fn tier(&self) -> RecoveryTier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Register a fix for a field.
    pub fn register(&mut self, key: FieldKey, fix: FixAction) -> anyhow::Result<()> {
        if self.fixes.contains_key(&key) {
            anyhow::bail!("fix already registered for {}", key.field_name());
        }
        self.fixes.insert(key, fix);
        Ok(())
    }

    pub fn get(&self, key: FieldKey) -> Option<&FixAction> {
        self.fixes.get(&key)
    }

    /// Apply registered fixes for each violation, in the order given.
    ///
    /// Every violation yields one result; unrecoverable ones come back
    /// with `recovered: false` and the record untouched at that path.
    pub fn recover(&self, record: &mut Value, violations: &[&Violation]) -> Vec<RecoverResult> {
        violations
            .iter()
            .map(|violation| self.recover_one(record, violation))
            .collect()
    }

    fn recover_one(&self, record: &mut Value, violation: &Violation) -> RecoverResult {
        let fix = FieldKey::from_path(&violation.path).and_then(|key| {
            self.fixes.get(&key).map(|fix| (key, fix))
        });

        let Some((key, fix)) = fix else {
            return RecoverResult {
                path: violation.path.clone(),
                recovered: false,
                old_value: None,
                new_value: None,
            };
        };

        let old_value = record.value_at(&violation.path).cloned();
        fix.apply(key, record);
        let new_value = record.value_at(&violation.path).cloned();

        RecoverResult {
            path: violation.path.clone(),
            recovered: true,
            old_value,
            new_value,
        }
    }

    /// The schema-shape tier: substitutions sized to the schema limits.
    pub fn spec() -> Self {
        Self {
            tier: RecoveryTier::Spec,
            fixes: BTreeMap::from(Self::common_fixes(1024)),
        }
    }

    /// The record-shape tier: same substitutions, transport-level note
    /// limit.
    pub fn proto() -> Self {
        Self {
            tier: RecoveryTier::Proto,
            fixes: BTreeMap::from(Self::common_fixes(250)),
        }
    }

    fn common_fixes(note_limit: usize) -> [(FieldKey, FixAction); 29] {
        use FieldKey as K;
        use FixAction as F;
        [
            (K::ProfileName, F::Truncate { limit: 50, fallback: "nil" }),
            (K::CartridgeName, F::Truncate { limit: 50, fallback: "nil" }),
            (K::BulletName, F::Truncate { limit: 50, fallback: "nil" }),
            (K::ShortNameTop, F::Truncate { limit: 8, fallback: "nil" }),
            (K::ShortNameBot, F::Truncate { limit: 8, fallback: "nil" }),
            (K::Caliber, F::Truncate { limit: 50, fallback: "nil" }),
            (K::DeviceUuid, F::Truncate { limit: 50, fallback: "" }),
            (
                K::UserNote,
                F::Truncate { limit: note_limit, fallback: "Warning: Restored profile" },
            ),
            (K::ZeroX, F::SetInt(0)),
            (K::ZeroY, F::SetInt(0)),
            (K::ScHeight, F::SetInt(90)),
            (K::RTwist, F::SetInt(10)),
            (K::TwistDir, F::SetString("RIGHT")),
            (K::CMuzzleVelocity, F::SetInt(8000)),
            (K::CZeroTemperature, F::SetInt(15)),
            (K::CTCoeff, F::SetInt(1000)),
            (K::CZeroDistanceIdx, F::SetInt(0)),
            (K::CZeroAirTemperature, F::SetInt(15)),
            (K::CZeroAirPressure, F::SetInt(10_000)),
            (K::CZeroAirHumidity, F::SetInt(0)),
            (K::CZeroWPitch, F::SetInt(0)),
            (K::CZeroPTemperature, F::SetInt(15)),
            (K::BDiameter, F::SetInt(338)),
            (K::BWeight, F::SetInt(3000)),
            (K::BLength, F::SetInt(1700)),
            (K::BcType, F::SetString("G7")),
            (K::Distances, F::ResetDistances),
            (K::Switches, F::ResetSwitches),
            (K::CoefRows, F::ResetCoefRows),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balprof_core::Constraint;
    use crate::builder::ProfileBuilder;

    fn violation_at(path: FieldPath, value: Value) -> Violation {
        Violation::new(path, value, Constraint::Required)
    }

    #[test]
    fn key_resolution_prefers_the_leaf_field() {
        let direct = FieldPath::root().field("profile").field("zero_x");
        assert_eq!(FieldKey::from_path(&direct), Some(FieldKey::ZeroX));

        // Element paths fall back to the owning table.
        let element = FieldPath::root().field("profile").field("distances").index(3);
        assert_eq!(FieldKey::from_path(&element), Some(FieldKey::Distances));

        // Nested switch members resolve to the switch block.
        let nested = FieldPath::root()
            .field("profile")
            .field("switches")
            .index(1)
            .field("distance");
        assert_eq!(FieldKey::from_path(&nested), Some(FieldKey::Switches));

        let unknown = FieldPath::root().field("bogus");
        assert_eq!(FieldKey::from_path(&unknown), None);
    }

    #[test]
    fn unregistered_paths_are_skipped_not_failed() {
        let registry = Registry::new(RecoveryTier::Spec);
        let mut record = ProfileBuilder::default().build().unwrap().to_generic();
        let before = record.clone();

        let v = violation_at(
            FieldPath::root().field("profile").field("zero_x"),
            Value::Int(999_999),
        );
        let results = registry.recover(&mut record, &[&v]);

        assert_eq!(results.len(), 1);
        assert!(!results[0].recovered);
        assert_eq!(record, before);
    }

    #[test]
    fn registered_fix_reports_old_and_new_values() {
        let registry = Registry::spec();
        let mut record = ProfileBuilder::default().build().unwrap().to_generic();
        record
            .get_mut("profile")
            .unwrap()
            .insert("c_muzzle_velocity", Value::Int(1));

        let path = FieldPath::root().field("profile").field("c_muzzle_velocity");
        let v = violation_at(path.clone(), Value::Int(1));
        let results = registry.recover(&mut record, &[&v]);

        assert_eq!(results.len(), 1);
        assert!(results[0].recovered);
        assert_eq!(results[0].old_value, Some(Value::Int(1)));
        assert_eq!(results[0].new_value, Some(Value::Int(8000)));
        assert_eq!(record.value_at(&path), Some(&Value::Int(8000)));
    }

    #[test]
    fn truncate_keeps_a_prefix_and_handles_non_strings() {
        let registry = Registry::spec();
        let mut record = ProfileBuilder::default().build().unwrap().to_generic();
        let long_name: String = "x".repeat(80);
        record
            .get_mut("profile")
            .unwrap()
            .insert("profile_name", Value::String(long_name));

        let path = FieldPath::root().field("profile").field("profile_name");
        registry.recover(&mut record, &[&violation_at(path.clone(), Value::Null)]);
        let fixed = record.value_at(&path).and_then(Value::as_str).unwrap();
        assert_eq!(fixed.len(), 50);

        // A mistyped name gets the fallback.
        record
            .get_mut("profile")
            .unwrap()
            .insert("profile_name", Value::Int(7));
        registry.recover(&mut record, &[&violation_at(path.clone(), Value::Int(7))]);
        assert_eq!(record.value_at(&path).and_then(Value::as_str), Some("nil"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new(RecoveryTier::Proto);
        registry.register(FieldKey::ZeroX, FixAction::SetInt(0)).unwrap();
        assert!(registry.register(FieldKey::ZeroX, FixAction::SetInt(1)).is_err());
    }

    #[test]
    fn display_elides_long_values() {
        let result = RecoverResult {
            path: FieldPath::root().field("profile").field("distances"),
            recovered: true,
            old_value: Some(Value::List((0..100).map(Value::Int).collect())),
            new_value: Some(Value::Int(0)),
        };
        let line = result.to_string();
        assert!(line.starts_with("recovered"));
        assert!(line.contains("..."));
        // Programmatic values stay untruncated.
        assert_eq!(result.old_value.as_ref().unwrap().as_list().unwrap().len(), 100);
    }
}
