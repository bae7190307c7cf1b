//! Profile construction.
//!
//! Typed building blocks for assembling a complete, in-range payload
//! from real-world units: the builder applies the scaled-integer storage
//! convention (meters x100, velocity x10, inches x1000, ...) so callers
//! never hand-scale anything.

use serde::{Deserialize, Serialize};

use crate::model::{BcType, CoefRow, Payload, Profile, Switch, TwistDir};
use crate::tables::{default_switches, DistanceTable};

/// Profile metadata: names and the free-text note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    pub short_name_top: String,
    pub short_name_bot: String,
    pub user_note: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            name: "New profile".to_string(),
            short_name_top: String::new(),
            short_name_bot: String::new(),
            user_note: String::new(),
        }
    }
}

/// Zeroing clicks and reference distance, in real units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zeroing {
    /// Horizontal click offset.
    pub x: f64,
    /// Vertical click offset.
    pub y: f64,
    /// Wind pitch in degrees.
    pub pitch: f64,
    /// Zeroing distance in meters; must appear in the distance table.
    pub distance: f64,
}

impl Default for Zeroing {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, pitch: 0.0, distance: 100.0 }
    }
}

/// Atmospheric reference at zeroing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Celsius.
    pub temperature: i64,
    /// hPa.
    pub pressure: f64,
    /// Percent.
    pub humidity: i64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self { temperature: 15, pressure: 1000.0, humidity: 50 }
    }
}

/// Barrel characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrel {
    pub caliber: String,
    /// Sight height over bore, millimeters.
    pub sight_height: i64,
    /// Twist rate in inches per turn.
    pub twist: f64,
    pub twist_dir: TwistDir,
}

impl Default for Barrel {
    fn default() -> Self {
        Self {
            caliber: "New caliber".to_string(),
            sight_height: 90,
            twist: 9.0,
            twist_dir: TwistDir::Right,
        }
    }
}

/// Cartridge data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    pub name: String,
    /// Meters per second.
    pub muzzle_velocity: f64,
    /// Celsius.
    pub temperature: i64,
    /// Powder temperature sensitivity, percent per 15 C.
    pub powder_sens: f64,
}

impl Default for Cartridge {
    fn default() -> Self {
        Self {
            name: "New cartridge".to_string(),
            muzzle_velocity: 800.0,
            temperature: 15,
            powder_sens: 1.5,
        }
    }
}

/// One point of a drag curve, in real units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DragPoint {
    pub coeff: f64,
    pub velocity: f64,
}

/// Bullet data and drag model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub name: String,
    /// Inches.
    pub diameter: f64,
    /// Grains.
    pub weight: f64,
    /// Inches.
    pub length: f64,
    pub drag_type: BcType,
    pub drag_model: Vec<DragPoint>,
}

impl Default for Bullet {
    fn default() -> Self {
        Self {
            name: "New bullet".to_string(),
            diameter: 0.308,
            weight: 178.0,
            length: 1.2,
            drag_type: BcType::G7,
            drag_model: vec![DragPoint { coeff: 1.0, velocity: 0.0 }],
        }
    }
}

/// The distance table to ship with the profile.
#[derive(Debug, Clone)]
pub enum Distances {
    Table(DistanceTable),
    /// Custom distances in meters.
    Custom(Vec<f64>),
}

impl Default for Distances {
    fn default() -> Self {
        Self::Table(DistanceTable::LongRange)
    }
}

/// Rejected builder inputs.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("the distance table must not be empty")]
    EmptyDistances,
}

/// Assembles a [`Payload`] from typed parts. All parts default to a
/// plausible .308-class profile, so `ProfileBuilder::default().build()`
/// yields a record that validates clean.
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    pub meta: Meta,
    pub barrel: Barrel,
    pub cartridge: Cartridge,
    pub bullet: Bullet,
    pub zeroing: Zeroing,
    pub atmosphere: Atmosphere,
    pub powder_temp: Option<i64>,
    pub distances: Distances,
    pub switches: Option<Vec<Switch>>,
}

impl ProfileBuilder {
    pub fn build(self) -> Result<Payload, BuildError> {
        let meters: Vec<f64> = match &self.distances {
            Distances::Table(table) => table.meters().iter().map(|d| *d as f64).collect(),
            Distances::Custom(ds) => ds.clone(),
        };
        if meters.is_empty() {
            return Err(BuildError::EmptyDistances);
        }

        let zero_idx = meters
            .iter()
            .position(|d| d.round() == self.zeroing.distance.round())
            .unwrap_or(0);

        let short_top = if self.meta.short_name_top.is_empty() {
            self.meta.name.chars().take(6).collect()
        } else {
            self.meta.short_name_top.clone()
        };
        let short_bot = if self.meta.short_name_bot.is_empty() {
            format_weight(self.bullet.weight)
        } else {
            self.meta.short_name_bot.clone()
        };

        let coef_rows: Vec<CoefRow> = self
            .bullet
            .drag_model
            .iter()
            .map(|p| CoefRow {
                bc_cd: scale(p.coeff, 10_000.0),
                mv: scale(p.velocity, 10.0),
            })
            .collect();

        let profile = Profile {
            profile_name: self.meta.name,
            cartridge_name: self.cartridge.name,
            bullet_name: self.bullet.name,
            short_name_top: short_top,
            short_name_bot: short_bot,
            caliber: self.barrel.caliber,
            device_uuid: String::new(),
            user_note: self.meta.user_note,

            // Horizontal clicks store inverted.
            zero_x: scale(self.zeroing.x, -1000.0),
            zero_y: scale(self.zeroing.y, 1000.0),

            distances: meters.iter().map(|d| scale(*d, 100.0)).collect(),
            switches: self.switches.unwrap_or_else(default_switches),

            sc_height: self.barrel.sight_height,
            r_twist: scale(self.barrel.twist, 100.0),
            twist_dir: self.barrel.twist_dir,

            c_muzzle_velocity: scale(self.cartridge.muzzle_velocity, 10.0),
            c_zero_temperature: self.cartridge.temperature,
            c_t_coeff: scale(self.cartridge.powder_sens, 1000.0),

            c_zero_distance_idx: zero_idx as i64,
            c_zero_air_temperature: self.atmosphere.temperature,
            c_zero_air_pressure: scale(self.atmosphere.pressure, 10.0),
            c_zero_air_humidity: self.atmosphere.humidity,
            c_zero_w_pitch: scale(self.zeroing.pitch, 10.0),
            c_zero_p_temperature: self.powder_temp.unwrap_or(15),

            b_diameter: scale(self.bullet.diameter, 1000.0),
            b_weight: scale(self.bullet.weight, 10.0),
            b_length: scale(self.bullet.length, 1000.0),

            bc_type: self.bullet.drag_type,
            coef_rows,
        };

        Ok(Payload { profile })
    }
}

/// Scaled-integer storage: `round(value * scale)`.
fn scale(value: f64, scale: f64) -> i64 {
    (value * scale).round() as i64
}

fn format_weight(grains: f64) -> String {
    if grains.fract() == 0.0 {
        format!("{grains:.0}gr")
    } else {
        format!("{grains:.1}gr")
    }
}
