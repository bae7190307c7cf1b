//! Typed profile payload.
//!
//! The validation engine works on the generic [`Value`] tree, but callers
//! usually hold a strongly-typed record. This module defines that record
//! and the conversion pair the engine's contract requires of any
//! collaborator: `to_generic` and `from_generic` are total inverses over
//! every field, preserving the scaled-integer storage types.
//!
//! Field names in the generic form are the snake_case names used
//! throughout the schema (`profile_name`, `c_muzzle_velocity`, ...).

use serde::{Deserialize, Serialize};

use balprof_core::Value;

use crate::error::DecodeError;

/// Drag model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BcType {
    G1,
    G7,
    Custom,
}

impl BcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G7 => "G7",
            Self::Custom => "CUSTOM",
        }
    }

    /// Standard drag models carry 1..=5 coefficient rows; the custom
    /// model carries a full drag curve of up to 200 rows.
    pub fn is_standard(&self) -> bool {
        matches!(self, Self::G1 | Self::G7)
    }
}

/// Barrel twist direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TwistDir {
    Right,
    Left,
}

/// How a switch position interprets its `distance` field: an absolute
/// scaled distance, or an index into the distance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DistanceFrom {
    Index,
    Value,
}

/// One scope switch position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub c_idx: i64,
    pub distance_from: DistanceFrom,
    pub distance: i64,
    pub reticle_idx: i64,
    pub zoom: i64,
}

/// One drag model row. For G1/G7 the pair is (coefficient, velocity);
/// for CUSTOM it is (drag coefficient, Mach), both at their own scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefRow {
    pub bc_cd: i64,
    pub mv: i64,
}

/// The profile body: rifle/scope metrics, zeroing, atmospheric
/// reference, bullet data, drag model, switch positions, and the
/// distance table. All physical quantities are scaled integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_name: String,
    pub cartridge_name: String,
    pub bullet_name: String,
    pub short_name_top: String,
    pub short_name_bot: String,
    pub caliber: String,
    pub device_uuid: String,
    pub user_note: String,

    pub zero_x: i64,
    pub zero_y: i64,

    pub distances: Vec<i64>,
    pub switches: Vec<Switch>,

    pub sc_height: i64,
    pub r_twist: i64,
    pub twist_dir: TwistDir,

    pub c_muzzle_velocity: i64,
    pub c_zero_temperature: i64,
    pub c_t_coeff: i64,

    pub c_zero_distance_idx: i64,
    pub c_zero_air_temperature: i64,
    pub c_zero_air_pressure: i64,
    pub c_zero_air_humidity: i64,
    pub c_zero_w_pitch: i64,
    pub c_zero_p_temperature: i64,

    pub b_diameter: i64,
    pub b_weight: i64,
    pub b_length: i64,

    pub bc_type: BcType,
    pub coef_rows: Vec<CoefRow>,
}

/// The exchanged record: a single `profile` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub profile: Profile,
}

impl Payload {
    /// Convert into the generic tree the engine validates.
    pub fn to_generic(&self) -> Value {
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_value(self).expect("payload serializes");
        Value::from(json)
    }

    /// Decode a generic tree back into the typed record.
    pub fn from_generic(value: &Value) -> Result<Self, DecodeError> {
        let json = serde_json::Value::from(value.clone());
        Ok(serde_json::from_value(json)?)
    }
}
