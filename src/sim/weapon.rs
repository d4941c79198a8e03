//! Weapon strategies
//!
//! One weapon is active per session. Each variant carries its own attack
//! state; activation spawns projectiles through the pending queue so nothing
//! is added to the live list mid-iteration.

use glam::Vec2;
use serde::Serialize;

use super::arc::ArcSector;
use super::projectile::Projectile;
use super::state::SimulationState;
use crate::consts::*;
use crate::error::{Result, SandboxError};
use crate::settings::{Settings, WeaponKind};
use crate::{angle_of, direction};

/// A sword swing in progress
#[derive(Debug, Clone, Serialize)]
pub struct Swing {
    /// Ticks advanced since the swing started (0 until the first advance)
    pub elapsed: u32,
    /// Direction the swing is centred on
    pub facing: f32,
    /// Whether each phase has already landed its hit
    pub phase_hits: [bool; SWORD_PHASES],
}

impl Swing {
    pub fn start(facing: f32) -> Self {
        Self {
            elapsed: 0,
            facing,
            phase_hits: [false; SWORD_PHASES],
        }
    }

    /// Swing progress in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed as f32 / SWORD_SWING_TICKS as f32).clamp(0.0, 1.0)
    }

    /// Which third of the swing the blade is in
    pub fn phase(&self) -> usize {
        let ticks = self.elapsed.saturating_sub(1) as usize;
        (ticks * SWORD_PHASES / SWORD_SWING_TICKS as usize).min(SWORD_PHASES - 1)
    }

    /// Area the swing covers around `pivot`
    pub fn sector(&self, pivot: Vec2) -> ArcSector {
        ArcSector::centered(pivot, SWORD_REACH, self.facing, SWORD_ARC)
    }

    /// Current blade tip (sweeps the sector's outer edge over the swing)
    pub fn blade_tip(&self, pivot: Vec2) -> Vec2 {
        self.sector(pivot).tip_at(self.progress())
    }
}

/// Attack state of the active weapon
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaponState {
    /// Thrown by dragging; no separate activation
    Ball,
    Sword { swing: Option<Swing> },
    Shotgun { cooldown: u32 },
    Laser { cooldown: u32 },
    GiantBeam { cooldown: u32 },
}

impl WeaponState {
    pub fn new(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Ball => WeaponState::Ball,
            WeaponKind::Sword => WeaponState::Sword { swing: None },
            WeaponKind::Shotgun => WeaponState::Shotgun { cooldown: 0 },
            WeaponKind::Laser => WeaponState::Laser { cooldown: 0 },
            WeaponKind::GiantBeam => WeaponState::GiantBeam { cooldown: 0 },
        }
    }

    pub fn kind(&self) -> WeaponKind {
        match self {
            WeaponState::Ball => WeaponKind::Ball,
            WeaponState::Sword { .. } => WeaponKind::Sword,
            WeaponState::Shotgun { .. } => WeaponKind::Shotgun,
            WeaponState::Laser { .. } => WeaponKind::Laser,
            WeaponState::GiantBeam { .. } => WeaponKind::GiantBeam,
        }
    }

    /// Ticks until the weapon can fire again
    pub fn cooldown(&self) -> u32 {
        match self {
            WeaponState::Shotgun { cooldown }
            | WeaponState::Laser { cooldown }
            | WeaponState::GiantBeam { cooldown } => *cooldown,
            _ => 0,
        }
    }

    pub fn swing(&self) -> Option<&Swing> {
        match self {
            WeaponState::Sword { swing } => swing.as_ref(),
            _ => None,
        }
    }

    /// Whether an activation would be accepted right now
    pub fn ready(&self) -> std::result::Result<(), &'static str> {
        match self {
            WeaponState::Ball => Err("the ball is thrown by dragging"),
            WeaponState::Sword { swing: Some(_) } => Err("swing in progress"),
            WeaponState::Sword { swing: None } => Ok(()),
            _ if self.cooldown() > 0 => Err("cooling down"),
            _ => Ok(()),
        }
    }

    /// Advance cooldowns and swing progress by one tick
    pub fn advance(&mut self) {
        match self {
            WeaponState::Ball => {}
            WeaponState::Sword { swing } => {
                if let Some(s) = swing {
                    if s.elapsed >= SWORD_SWING_TICKS {
                        *swing = None;
                    } else {
                        s.elapsed += 1;
                    }
                }
            }
            WeaponState::Shotgun { cooldown }
            | WeaponState::Laser { cooldown }
            | WeaponState::GiantBeam { cooldown } => {
                *cooldown = cooldown.saturating_sub(1);
            }
        }
    }

    /// Start an attack from `origin` along `facing`
    ///
    /// Returns the projectiles the attack releases; the caller queues them.
    fn start(
        &mut self,
        origin: Vec2,
        facing: f32,
        settings: &Settings,
    ) -> std::result::Result<Vec<Projectile>, &'static str> {
        self.ready()?;

        let muzzle = origin + direction(facing) * ATTACKER_RADIUS;
        let volley = match self {
            WeaponState::Ball => Vec::new(),
            WeaponState::Sword { swing } => {
                *swing = Some(Swing::start(facing));
                Vec::new()
            }
            WeaponState::Shotgun { cooldown } => {
                *cooldown = settings.shotgun.cooldown_ticks;
                (0..SHOTGUN_PELLETS)
                    .map(|i| {
                        let t = i as f32 / (SHOTGUN_PELLETS - 1) as f32;
                        let angle = facing - SHOTGUN_SPREAD / 2.0 + t * SHOTGUN_SPREAD;
                        Projectile::pellet(muzzle, angle)
                    })
                    .collect()
            }
            WeaponState::Laser { cooldown } => {
                *cooldown = settings.laser.cooldown_ticks;
                let head = muzzle + direction(facing) * LASER_LENGTH;
                vec![Projectile::bolt(head, facing, 0)]
            }
            WeaponState::GiantBeam { cooldown } => {
                *cooldown = settings.beam.cooldown_ticks;
                let center = muzzle + direction(facing) * (GIANT_BEAM_LENGTH / 2.0);
                vec![Projectile::beam(center, facing)]
            }
        };
        Ok(volley)
    }
}

/// Fire or swing the active weapon toward `aim_at`
///
/// Turns the attacker to face the point first, even if the weapon refuses.
pub fn activate(state: &mut SimulationState, aim_at: Vec2) -> Result<()> {
    let attacker = &mut state.attacker;
    let aim = aim_at - attacker.pos;
    if aim.length_squared() > 1e-6 {
        attacker.facing = angle_of(aim);
    }

    let weapon = attacker.weapon.kind();
    if attacker.dragging && weapon.is_ranged() {
        return Err(SandboxError::WeaponUnavailable {
            weapon,
            reason: "attacker is being dragged",
        });
    }

    let origin = attacker.pos;
    let facing = attacker.facing;
    let volley = attacker
        .weapon
        .start(origin, facing, &state.settings)
        .map_err(|reason| SandboxError::WeaponUnavailable { weapon, reason })?;

    if weapon == WeaponKind::Sword {
        state.spawn_slash(origin, facing);
    }
    log::debug!(
        "{weapon} activated at tick {} ({} projectiles)",
        state.time_ticks,
        volley.len()
    );
    for projectile in volley {
        state.spawn(projectile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swing_phases_split_in_thirds() {
        let mut swing = Swing::start(0.0);
        let mut phases = Vec::new();
        for _ in 0..SWORD_SWING_TICKS {
            swing.elapsed += 1;
            phases.push(swing.phase());
        }
        assert_eq!(phases.iter().filter(|&&p| p == 0).count(), 6);
        assert_eq!(phases.iter().filter(|&&p| p == 1).count(), 6);
        assert_eq!(phases.iter().filter(|&&p| p == 2).count(), 6);
    }

    #[test]
    fn test_swing_ends_after_full_sweep() {
        let mut weapon = WeaponState::Sword {
            swing: Some(Swing::start(0.0)),
        };
        for _ in 0..SWORD_SWING_TICKS {
            weapon.advance();
            assert!(weapon.swing().is_some());
        }
        weapon.advance();
        assert!(weapon.swing().is_none());
        assert!(weapon.ready().is_ok());
    }

    #[test]
    fn test_shotgun_volley_and_cooldown() {
        let settings = Settings::for_weapon(WeaponKind::Shotgun);
        let mut weapon = WeaponState::new(WeaponKind::Shotgun);
        let volley = weapon.start(Vec2::new(100.0, 100.0), 0.0, &settings).unwrap();
        assert_eq!(volley.len(), SHOTGUN_PELLETS);
        assert_eq!(weapon.cooldown(), settings.shotgun.cooldown_ticks);
        assert!(weapon.start(Vec2::new(100.0, 100.0), 0.0, &settings).is_err());

        for _ in 0..settings.shotgun.cooldown_ticks {
            weapon.advance();
        }
        assert!(weapon.ready().is_ok());
    }

    #[test]
    fn test_ball_has_no_activation() {
        let mut state = SimulationState::new(Settings::default());
        let result = activate(&mut state, Vec2::new(700.0, 250.0));
        assert!(matches!(
            result,
            Err(SandboxError::WeaponUnavailable {
                weapon: WeaponKind::Ball,
                ..
            })
        ));
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_activation_faces_the_pointer() {
        let mut state = SimulationState::new(Settings::for_weapon(WeaponKind::Laser));
        let below = state.attacker.pos + Vec2::new(0.0, 100.0);
        activate(&mut state, below).unwrap();
        assert!((state.attacker.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(state.pending.len(), 1);
    }
}
