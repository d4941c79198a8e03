//! Cosmetic effects: particles, slash trails, damage popups, impact flashes
//!
//! Effects never feed back into gameplay. They only advance while the
//! simulation is running, so a freeze holds them in place like everything else.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arc::ArcSector;
use super::combat::HitEvent;
use crate::consts::{SWORD_ARC, SWORD_REACH};
use crate::direction;
use crate::settings::WeaponKind;

/// Palette slot an effect is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tint {
    Impact,
    Critical,
    Steel,
    Pellet,
    Laser,
    Beam,
}

impl Tint {
    pub fn for_weapon(weapon: WeaponKind) -> Self {
        match weapon {
            WeaponKind::Ball => Tint::Impact,
            WeaponKind::Sword => Tint::Steel,
            WeaponKind::Shotgun => Tint::Pellet,
            WeaponKind::Laser => Tint::Laser,
            WeaponKind::GiantBeam => Tint::Beam,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
    pub tint: Tint,
}

/// Fading trail of a sword swing
#[derive(Debug, Clone, Serialize)]
pub struct Slash {
    pub sector: ArcSector,
    pub life: f32,
}

/// Floating damage number
#[derive(Debug, Clone, Serialize)]
pub struct DamagePopup {
    pub pos: Vec2,
    pub amount: f32,
    pub critical: bool,
    pub life: f32,
}

/// Brief bright disc at an impact point
#[derive(Debug, Clone, Serialize)]
pub struct ImpactFlash {
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    pub tint: Tint,
}

const PARTICLE_DECAY: f32 = 1.0 / 30.0;
const PARTICLE_DRAG: f32 = 0.95;
const PARTICLE_GRAVITY: f32 = 0.15;
const SLASH_DECAY: f32 = 1.0 / 12.0;
const POPUP_DECAY: f32 = 1.0 / 45.0;
const POPUP_RISE: f32 = 0.8;
const FLASH_DECAY: f32 = 1.0 / 8.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub slashes: Vec<Slash>,
    pub popups: Vec<DamagePopup>,
    pub flashes: Vec<ImpactFlash>,
}

impl Effects {
    /// Age every effect by one tick and drop the expired ones
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y += PARTICLE_GRAVITY;
            p.vel *= PARTICLE_DRAG;
            p.size *= 0.98;
            p.life -= PARTICLE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);

        for s in &mut self.slashes {
            s.life -= SLASH_DECAY;
        }
        self.slashes.retain(|s| s.life > 0.0);

        for popup in &mut self.popups {
            popup.pos.y -= POPUP_RISE;
            popup.life -= POPUP_DECAY;
        }
        self.popups.retain(|p| p.life > 0.0);

        for f in &mut self.flashes {
            f.radius *= 1.08;
            f.life -= FLASH_DECAY;
        }
        self.flashes.retain(|f| f.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.slashes.clear();
        self.popups.clear();
        self.flashes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
            && self.slashes.is_empty()
            && self.popups.is_empty()
            && self.flashes.is_empty()
    }

    /// Spray `count` particles from `pos`, dropping the oldest past `cap`
    pub fn burst(&mut self, rng: &mut Pcg32, pos: Vec2, count: usize, tint: Tint, cap: usize) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.5..6.0);
            self.particles.push(Particle {
                pos,
                vel: direction(angle) * speed,
                size: rng.random_range(2.0..5.0),
                life: 1.0,
                tint,
            });
        }
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Feedback for one landed hit
    pub fn hit(&mut self, rng: &mut Pcg32, hit: &HitEvent, cap: usize) {
        let tint = if hit.critical {
            Tint::Critical
        } else {
            Tint::for_weapon(hit.weapon)
        };
        let count = 4 + (hit.damage / 5.0).min(12.0) as usize;
        self.burst(rng, hit.pos, count, tint, cap);

        self.popups.push(DamagePopup {
            pos: hit.pos,
            amount: hit.damage,
            critical: hit.critical,
            life: 1.0,
        });
        self.flashes.push(ImpactFlash {
            pos: hit.pos,
            radius: 8.0 + hit.damage * 0.4,
            life: 1.0,
            tint,
        });
    }

    pub fn slash(&mut self, pivot: Vec2, facing: f32) {
        self.slashes.push(Slash {
            sector: ArcSector::centered(pivot, SWORD_REACH, facing, SWORD_ARC),
            life: 1.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_effects_expire() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut effects = Effects::default();
        effects.burst(&mut rng, Vec2::new(10.0, 10.0), 10, Tint::Impact, 256);
        effects.slash(Vec2::ZERO, 0.0);
        assert!(!effects.is_empty());

        for _ in 0..60 {
            effects.update();
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut effects = Effects::default();
        effects.burst(&mut rng, Vec2::ZERO, 8, Tint::Impact, 10);
        effects.burst(&mut rng, Vec2::new(50.0, 0.0), 8, Tint::Laser, 10);
        assert_eq!(effects.particles.len(), 10);
        assert_eq!(
            effects
                .particles
                .iter()
                .filter(|p| p.tint == Tint::Laser)
                .count(),
            8
        );
    }
}
