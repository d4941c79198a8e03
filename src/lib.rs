//! Hit-Stop Lab - a combat sandbox for feeling out impact freezes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, weapons, hit resolution, hit-stop)
//! - `renderer`: Draw-command frames, tessellation and the WebGPU pipeline
//! - `platform`: Pointer/touch normalization into simulation intents
//! - `settings`: Session configuration and weapon tuning
//! - `session`: Fixed-timestep driver that hosts embed

pub mod error;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::SandboxError;
pub use session::Session;
pub use settings::{FreezePolicy, HitStopCurve, Settings, WeaponKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation rate; every timer in the sim counts these ticks
    pub const TICK_RATE: u32 = 60;
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (canvas pixels, y grows downward)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 500.0;

    /// Free-body integration (per tick)
    pub const GRAVITY: f32 = 0.5;
    pub const FRICTION: f32 = 0.99;
    pub const BOUNCE: f32 = 0.7;

    /// Attacker body
    pub const ATTACKER_RADIUS: f32 = 20.0;
    pub const ATTACKER_SPAWN: Vec2 = Vec2::new(200.0, 250.0);
    /// Pointer-down closer than this to the attacker grabs it instead of firing
    pub const GRAB_RADIUS: f32 = 30.0;
    /// Throw velocity = pointer delta per tick * sensitivity
    pub const THROW_SENSITIVITY: f32 = 1.0;

    /// Target dummy
    pub const TARGET_RADIUS: f32 = 40.0;
    pub const TARGET_SPAWN: Vec2 = Vec2::new(600.0, 250.0);
    /// HP shown on the bar when the target is in infinite mode
    pub const DEFAULT_MAX_HP: u32 = 100;
    /// Post-freeze recoil: drawn offset and tilt that ease back to rest
    pub const KNOCKBACK_DISTANCE: f32 = 50.0;
    pub const KNOCKBACK_TILT: f32 = 10.0 * std::f32::consts::PI / 180.0;
    pub const KNOCKBACK_TICKS: u32 = 12;

    /// Ball impact curve: linear from (2, 5) to (25, 50)
    pub const BALL_MIN_IMPACT_SPEED: f32 = 2.0;
    pub const BALL_MAX_IMPACT_SPEED: f32 = 25.0;
    pub const BALL_MIN_DAMAGE: f32 = 5.0;
    pub const BALL_MAX_DAMAGE: f32 = 50.0;

    /// Hit-stop bounds
    pub const KO_HIT_STOP_TICKS: u32 = 2 * TICK_RATE;
    pub const MIN_HIT_STOP_TICKS: u32 = 4;
    pub const MAX_HIT_STOP_TICKS: u32 = TICK_RATE;

    /// Sword
    pub const SWORD_SWING_TICKS: u32 = 18;
    pub const SWORD_PHASES: usize = 3;
    pub const SWORD_REACH: f32 = 110.0;
    /// Full angular width of the swing, centred on the facing angle
    pub const SWORD_ARC: f32 = 2.4;
    pub const SWORD_BASE_DAMAGE: f32 = 10.0;
    pub const SWORD_WEIGHT_FACTOR: f32 = 1.5;

    /// Shotgun
    pub const SHOTGUN_PELLETS: usize = 12;
    pub const SHOTGUN_SPREAD: f32 = 0.6;
    pub const SHOTGUN_PELLET_SPEED: f32 = 14.0;
    pub const SHOTGUN_PELLET_RADIUS: f32 = 4.0;
    pub const SHOTGUN_PELLET_LIFETIME: u32 = 45;
    pub const SHOTGUN_COOLDOWN: u32 = 30;

    /// Laser
    pub const LASER_SPEED: f32 = 18.0;
    pub const LASER_LENGTH: f32 = 36.0;
    pub const LASER_RADIUS: f32 = 3.0;
    pub const LASER_LIFETIME: u32 = 120;
    pub const LASER_COOLDOWN: u32 = 12;
    pub const LASER_REFLECT_SPREAD: f32 = 0.35;
    pub const LASER_CHILDREN: usize = 3;
    /// Bolts at this generation die on the wall instead of splitting
    pub const LASER_MAX_GENERATION: u8 = 1;

    /// Giant beam
    pub const GIANT_BEAM_LENGTH: f32 = 160.0;
    pub const GIANT_BEAM_WIDTH: f32 = 80.0;
    pub const GIANT_BEAM_SPEED: f32 = 3.0;
    pub const GIANT_BEAM_LIFETIME: u32 = 300;
    pub const GIANT_BEAM_COOLDOWN: u32 = 90;
    pub const GIANT_BEAM_MAX_HITS: u32 = 5;
    pub const GIANT_BEAM_HIT_INTERVAL: u32 = 6;

    /// Visual effects
    pub const MAX_PARTICLES: usize = 256;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Direction angle of a vector (radians, canvas orientation)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Shortest signed rotation from `from` to `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        assert!((normalize_angle(-2.5 * PI) - (-0.5 * PI)).abs() < 1e-5);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_angle_delta_takes_short_way() {
        let d = angle_delta(170.0_f32.to_radians(), -170.0_f32.to_radians());
        assert!((d - 20.0_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_direction_round_trips_angle() {
        let a = 1.1;
        assert!((angle_of(direction(a)) - a).abs() < 1e-5);
    }
}
