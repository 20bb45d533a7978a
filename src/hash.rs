//! Coordinate hashing for procedural variety.
//!
//! Every visual choice a renderer makes per cell (which model, which way it
//! faces, its tint, whether a pedestrian or parked car sits there) is derived
//! from the cell's coordinates. Nothing here is stored on the tile, so two
//! frames that read the same grid draw the same city.

use serde::Serialize;

const X_WEIGHT: f64 = 12.9898;
const Y_WEIGHT: f64 = 78.233;
const SCALE: f64 = 43758.5453;

/// Pure hash of a grid coordinate into `[0, 1)`.
pub fn hash(x: i32, y: i32) -> f64 {
    let raw = (f64::from(x) * X_WEIGHT + f64::from(y) * Y_WEIGHT).sin() * SCALE;
    let fract = raw - raw.floor();
    // `raw - floor(raw)` rounds up to exactly 1.0 for tiny negative inputs.
    if fract >= 1.0 {
        0.0
    } else {
        fract
    }
}

/// Hash an independent channel for the same cell.
pub fn hash_salted(x: i32, y: i32, salt: u32) -> f64 {
    let salt = salt as i32;
    hash(
        x.wrapping_add(salt.wrapping_mul(101)),
        y.wrapping_sub(salt.wrapping_mul(37)),
    )
}

/// Map a hash value onto `0..count`.
pub fn pick(value: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    ((value * count as f64) as usize).min(count - 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Variant {
    pub model: usize,
    /// Quarter turns, 0..4.
    pub rotation: u8,
    /// Brightness multiplier in `[0.85, 1.15)`.
    pub tint: f64,
    pub has_agent: bool,
}

const ROTATION_SALT: u32 = 1;
const TINT_SALT: u32 = 2;
const AGENT_SALT: u32 = 3;
const AGENT_CHANCE: f64 = 0.3;

pub fn variant(x: i32, y: i32, model_count: usize) -> Variant {
    Variant {
        model: pick(hash(x, y), model_count),
        rotation: pick(hash_salted(x, y, ROTATION_SALT), 4) as u8,
        tint: 0.85 + hash_salted(x, y, TINT_SALT) * 0.3,
        has_agent: hash_salted(x, y, AGENT_SALT) < AGENT_CHANCE,
    }
}
