//! Lingua Forge - a letter-forging clicker game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tool physics, impacts, heat, flying letters, economy)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality caps, volume)
//! - `audio`: Web Audio sound cues (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest step a single frame may integrate (frame hitches are clamped to this)
    pub const MAX_DT: f32 = 0.04;
    /// Smallest step, keeps implicit velocity `(pos - prev) / dt` finite
    pub const MIN_DT: f32 = 0.0001;
    /// Floor for distances used as normalization denominators
    pub const MIN_DISTANCE: f32 = 1.0;

    /// Heat multiplier gained per banked heat level (multiplier = 1 + 4 * level)
    pub const HEAT_MULTIPLIER_PER_LEVEL: u32 = 4;
    /// Power scalar ceiling for a single strike
    pub const MAX_STRIKE_POWER: f32 = 1.5;
    /// Power = speed / (impact_threshold * POWER_SPEED_SCALE)
    pub const POWER_SPEED_SCALE: f32 = 1.3;

    /// The 22 letters of the Hebrew alphabet, in order
    pub const HEBREW_LETTERS: [char; 22] = [
        'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ',
        'צ', 'ק', 'ר', 'ש', 'ת',
    ];
}

/// Clamp a raw frame delta into the range the integrators accept
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(consts::MIN_DT, consts::MAX_DT)
    } else {
        consts::MIN_DT
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle measured clockwise from "up" in screen space (y down)
#[inline]
pub fn up_rotated(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// Inverse of [`up_rotated`]: the angle from "up" of a screen-space direction
#[inline]
pub fn angle_from_up(dir: Vec2) -> f32 {
    dir.x.atan2(-dir.y)
}

/// Direction of `v` with its length floored, so coincident points still yield a defined axis
#[inline]
pub fn safe_direction(v: Vec2) -> (Vec2, f32) {
    let len = v.length();
    if len < consts::MIN_DISTANCE {
        let dir = if len > f32::EPSILON { v / len } else { Vec2::Y };
        (dir, consts::MIN_DISTANCE)
    } else {
        (v / len, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(1.0), consts::MAX_DT);
        assert_eq!(clamp_dt(0.0), consts::MIN_DT);
        assert_eq!(clamp_dt(f32::NAN), consts::MIN_DT);
        assert!((clamp_dt(0.016) - 0.016).abs() < 1e-7);
    }

    #[test]
    fn test_up_rotated_round_trip() {
        let up = up_rotated(0.0);
        assert!(up.abs_diff_eq(Vec2::new(0.0, -1.0), 1e-6));
        let right = up_rotated(FRAC_PI_2);
        assert!(right.abs_diff_eq(Vec2::new(1.0, 0.0), 1e-6));
        assert!((angle_from_up(right) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_from_up(up_rotated(PI * 0.75)) - PI * 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_safe_direction_zero_vector() {
        let (dir, len) = safe_direction(Vec2::ZERO);
        assert_eq!(len, consts::MIN_DISTANCE);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
