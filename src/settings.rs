//! Session settings and weapon tuning
//!
//! Supplied once when a session starts. Hosts may build them in code or hand
//! over a JSON document; either way everything passes through
//! [`Settings::validated`] before the simulation sees it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SandboxError};

/// The one active weapon of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    #[default]
    Ball,
    Sword,
    Shotgun,
    Laser,
    GiantBeam,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Ball,
        WeaponKind::Sword,
        WeaponKind::Shotgun,
        WeaponKind::Laser,
        WeaponKind::GiantBeam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Ball => "ball",
            WeaponKind::Sword => "sword",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Laser => "laser",
            WeaponKind::GiantBeam => "giant_beam",
        }
    }

    /// Weapons that fire along the pointer direction
    pub fn is_ranged(&self) -> bool {
        matches!(
            self,
            WeaponKind::Shotgun | WeaponKind::Laser | WeaponKind::GiantBeam
        )
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeaponKind {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ball" => Ok(WeaponKind::Ball),
            "sword" => Ok(WeaponKind::Sword),
            "shotgun" => Ok(WeaponKind::Shotgun),
            "laser" => Ok(WeaponKind::Laser),
            "giant_beam" | "beam" => Ok(WeaponKind::GiantBeam),
            _ => Err(SandboxError::UnknownWeapon(s.to_string())),
        }
    }
}

/// Maps the damage of a hit to a freeze length in ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitStopCurve {
    /// Same freeze for every hit
    Fixed { ticks: u32 },
    /// ⌊damage / divisor⌋ ticks
    Proportional { divisor: f32 },
    /// Same freeze for every hit, given in milliseconds
    Millis { ms: u32 },
}

impl HitStopCurve {
    /// Fixed freeze given in milliseconds, rounded to whole ticks
    pub fn from_millis(ms: u32) -> Self {
        let ticks = (ms as f32 * TICK_RATE as f32 / 1000.0).round() as u32;
        HitStopCurve::Fixed { ticks }
    }

    /// Raw freeze length; floor and cap are applied by the resolver
    pub fn ticks_for(&self, damage: f32) -> u32 {
        match *self {
            HitStopCurve::Fixed { ticks } => ticks,
            HitStopCurve::Proportional { divisor } => (damage.max(0.0) / divisor).floor() as u32,
            HitStopCurve::Millis { ms } => HitStopCurve::from_millis(ms).ticks_for(damage),
        }
    }

    /// Millisecond curves become whole ticks here
    fn validated(self) -> Self {
        match self {
            HitStopCurve::Millis { ms } => HitStopCurve::from_millis(ms).validated(),
            HitStopCurve::Fixed { ticks } => HitStopCurve::Fixed {
                ticks: ticks.min(MAX_HIT_STOP_TICKS),
            },
            HitStopCurve::Proportional { divisor } => HitStopCurve::Proportional {
                divisor: if divisor.is_finite() { divisor.max(1.0) } else { 1.0 },
            },
        }
    }
}

/// What keeps moving while the simulation is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FreezePolicy {
    /// Swings, cooldowns and projectiles keep advancing and may land more hits
    #[default]
    ContinueAttacks,
    /// Everything but the freeze timer and the shake holds still
    FreezeAll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    pub hit_stop: HitStopCurve,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            hit_stop: HitStopCurve::Proportional { divisor: 2.0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwordTuning {
    /// Heavier swings hit harder and therefore freeze longer
    pub weight: f32,
    pub hit_stop: HitStopCurve,
}

impl SwordTuning {
    pub fn damage(&self) -> f32 {
        SWORD_BASE_DAMAGE + self.weight * SWORD_WEIGHT_FACTOR
    }
}

impl Default for SwordTuning {
    fn default() -> Self {
        Self {
            weight: 8.0,
            hit_stop: HitStopCurve::Proportional { divisor: 2.0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotgunTuning {
    pub pellet_damage: f32,
    pub cooldown_ticks: u32,
    /// Applied to the summed damage of all pellets landing in one tick
    pub hit_stop: HitStopCurve,
}

impl Default for ShotgunTuning {
    fn default() -> Self {
        Self {
            pellet_damage: 8.0,
            cooldown_ticks: SHOTGUN_COOLDOWN,
            hit_stop: HitStopCurve::Proportional { divisor: 2.5 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTuning {
    pub damage: f32,
    pub cooldown_ticks: u32,
    pub hit_stop: HitStopCurve,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            damage: 30.0,
            cooldown_ticks: LASER_COOLDOWN,
            hit_stop: HitStopCurve::Fixed { ticks: 10 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamTuning {
    pub damage_per_hit: f32,
    pub cooldown_ticks: u32,
    pub hit_stop: HitStopCurve,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            damage_per_hit: 12.0,
            cooldown_ticks: GIANT_BEAM_COOLDOWN,
            hit_stop: HitStopCurve::Fixed { ticks: 4 },
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub weapon: WeaponKind,
    /// `None` keeps the target alive forever; damage still shows up as feedback
    pub max_hp: Option<u32>,

    // === Weapons ===
    pub ball: BallTuning,
    pub sword: SwordTuning,
    pub shotgun: ShotgunTuning,
    pub laser: LaserTuning,
    pub beam: BeamTuning,

    // === Hit-stop ===
    /// Base jitter amplitude in pixels, scaled up by hit weight and knockouts
    pub shake_intensity: f32,
    /// When false the attacker also jitters, at half amplitude
    pub shake_victim_only: bool,
    /// Shortest freeze any damaging hit produces
    pub min_hit_stop_ticks: u32,
    pub freeze_policy: FreezePolicy,

    // === Visual Effects ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Reduced motion (no screen shake)
    pub reduced_motion: bool,
    pub max_particles: usize,

    /// Seed for shake and particle jitter
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weapon: WeaponKind::Ball,
            max_hp: Some(DEFAULT_MAX_HP),

            ball: BallTuning::default(),
            sword: SwordTuning::default(),
            shotgun: ShotgunTuning::default(),
            laser: LaserTuning::default(),
            beam: BeamTuning::default(),

            shake_intensity: 5.0,
            shake_victim_only: true,
            min_hit_stop_ticks: MIN_HIT_STOP_TICKS,
            freeze_policy: FreezePolicy::ContinueAttacks,

            screen_shake: true,
            reduced_motion: false,
            max_particles: MAX_PARTICLES,

            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Default settings with the given weapon
    pub fn for_weapon(weapon: WeaponKind) -> Self {
        Self {
            weapon,
            ..Self::default()
        }
    }

    /// Parse a JSON settings document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Clamp every tunable into its legal range
    pub fn validated(mut self) -> Self {
        self.max_hp = self.max_hp.map(|hp| hp.max(1));

        self.ball.hit_stop = self.ball.hit_stop.validated();
        self.sword.weight = finite_or_zero(self.sword.weight).clamp(0.0, 100.0);
        self.sword.hit_stop = self.sword.hit_stop.validated();
        self.shotgun.pellet_damage = finite_or_zero(self.shotgun.pellet_damage).max(0.0);
        self.shotgun.cooldown_ticks = self.shotgun.cooldown_ticks.max(1);
        self.shotgun.hit_stop = self.shotgun.hit_stop.validated();
        self.laser.damage = finite_or_zero(self.laser.damage).max(0.0);
        self.laser.cooldown_ticks = self.laser.cooldown_ticks.max(1);
        self.laser.hit_stop = self.laser.hit_stop.validated();
        self.beam.damage_per_hit = finite_or_zero(self.beam.damage_per_hit).max(0.0);
        self.beam.cooldown_ticks = self.beam.cooldown_ticks.max(1);
        self.beam.hit_stop = self.beam.hit_stop.validated();

        self.shake_intensity = finite_or_zero(self.shake_intensity).clamp(0.0, 40.0);
        self.min_hit_stop_ticks = self.min_hit_stop_ticks.clamp(1, 30);
        self.max_particles = self.max_particles.min(MAX_PARTICLES * 4);
        self
    }

    /// Freeze mapping of the given weapon
    pub fn hit_stop_curve(&self, weapon: WeaponKind) -> HitStopCurve {
        match weapon {
            WeaponKind::Ball => self.ball.hit_stop,
            WeaponKind::Sword => self.sword.hit_stop,
            WeaponKind::Shotgun => self.shotgun.hit_stop,
            WeaponKind::Laser => self.laser.hit_stop,
            WeaponKind::GiantBeam => self.beam.hit_stop,
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn infinite_hp(&self) -> bool {
        self.max_hp.is_none()
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_from_str() {
        assert_eq!("Laser".parse::<WeaponKind>().unwrap(), WeaponKind::Laser);
        assert_eq!("beam".parse::<WeaponKind>().unwrap(), WeaponKind::GiantBeam);
        assert!("rocket".parse::<WeaponKind>().is_err());
    }

    #[test]
    fn test_validated_clamps_out_of_range_values() {
        let mut settings = Settings::default();
        settings.shotgun.pellet_damage = -4.0;
        settings.laser.cooldown_ticks = 0;
        settings.beam.hit_stop = HitStopCurve::Proportional { divisor: 0.0 };
        settings.max_hp = Some(0);
        settings.min_hit_stop_ticks = 0;

        let settings = settings.validated();
        assert_eq!(settings.shotgun.pellet_damage, 0.0);
        assert_eq!(settings.laser.cooldown_ticks, 1);
        assert_eq!(
            settings.beam.hit_stop,
            HitStopCurve::Proportional { divisor: 1.0 }
        );
        assert_eq!(settings.max_hp, Some(1));
        assert_eq!(settings.min_hit_stop_ticks, 1);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let settings = Settings::from_json(
            r#"{ "weapon": "shotgun", "max_hp": null, "shotgun": { "pellet_damage": 3 } }"#,
        )
        .unwrap();
        assert_eq!(settings.weapon, WeaponKind::Shotgun);
        assert!(settings.infinite_hp());
        assert_eq!(settings.shotgun.pellet_damage, 3.0);
        assert_eq!(settings.shotgun.cooldown_ticks, SHOTGUN_COOLDOWN);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Settings::from_json("{ weapon: "),
            Err(SandboxError::Json(_))
        ));
    }

    #[test]
    fn test_hit_stop_curves() {
        assert_eq!(HitStopCurve::from_millis(150).ticks_for(1.0), 9);
        let curve = HitStopCurve::Proportional { divisor: 2.0 };
        assert_eq!(curve.ticks_for(5.0), 2);
        assert_eq!(curve.ticks_for(50.0), 25);
    }

    #[test]
    fn test_millisecond_hit_stop_from_json() {
        let settings = Settings::from_json(
            r#"{ "weapon": "laser", "laser": { "hit_stop": { "kind": "millis", "ms": 150 } } }"#,
        )
        .unwrap();
        assert_eq!(settings.laser.hit_stop, HitStopCurve::Fixed { ticks: 9 });

        let settings =
            Settings::from_json(r#"{ "ball": { "hit_stop": { "kind": "millis", "ms": 5000 } } }"#)
                .unwrap();
        assert_eq!(
            settings.ball.hit_stop,
            HitStopCurve::Fixed {
                ticks: MAX_HIT_STOP_TICKS
            }
        );
    }
}
