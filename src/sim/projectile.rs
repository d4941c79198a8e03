//! Projectiles: shotgun pellets, laser bolts and giant beams

use glam::Vec2;
use serde::Serialize;

use super::collision::{Wall, clamp_to_arena, reflect_velocity, wall_crossed};
use super::state::SimulationState;
use crate::consts::*;
use crate::settings::WeaponKind;
use crate::{angle_of, direction};

/// Shape-specific projectile data
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectileBody {
    Pellet {
        radius: f32,
    },
    /// Capsule from `pos` (head) back along the velocity for `length`
    Bolt {
        /// 0 for fired bolts, +1 per wall split
        generation: u8,
        length: f32,
        radius: f32,
    },
    /// Rectangle oriented along the velocity
    Beam {
        half_extents: Vec2,
        /// Hits landed so far
        hits: u32,
        /// Ticks until the next hit may land
        hit_cooldown: u32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    /// Assigned when queued
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left before expiry
    pub ttl: u32,
    pub alive: bool,
    pub body: ProjectileBody,
}

impl Projectile {
    fn launch(pos: Vec2, angle: f32, speed: f32, ttl: u32, body: ProjectileBody) -> Self {
        Self {
            id: 0,
            pos,
            vel: direction(angle) * speed,
            ttl,
            alive: true,
            body,
        }
    }

    pub fn pellet(pos: Vec2, angle: f32) -> Self {
        Self::launch(
            pos,
            angle,
            SHOTGUN_PELLET_SPEED,
            SHOTGUN_PELLET_LIFETIME,
            ProjectileBody::Pellet {
                radius: SHOTGUN_PELLET_RADIUS,
            },
        )
    }

    /// Laser bolt with its head at `head`
    pub fn bolt(head: Vec2, angle: f32, generation: u8) -> Self {
        Self::launch(
            head,
            angle,
            LASER_SPEED,
            LASER_LIFETIME,
            ProjectileBody::Bolt {
                generation,
                length: LASER_LENGTH,
                radius: LASER_RADIUS,
            },
        )
    }

    /// Giant beam centred on `center`
    pub fn beam(center: Vec2, angle: f32) -> Self {
        Self::launch(
            center,
            angle,
            GIANT_BEAM_SPEED,
            GIANT_BEAM_LIFETIME,
            ProjectileBody::Beam {
                half_extents: Vec2::new(GIANT_BEAM_LENGTH / 2.0, GIANT_BEAM_WIDTH / 2.0),
                hits: 0,
                hit_cooldown: 0,
            },
        )
    }

    /// Weapon that fired this projectile
    pub fn weapon(&self) -> WeaponKind {
        match self.body {
            ProjectileBody::Pellet { .. } => WeaponKind::Shotgun,
            ProjectileBody::Bolt { .. } => WeaponKind::Laser,
            ProjectileBody::Beam { .. } => WeaponKind::GiantBeam,
        }
    }

    /// Heading in radians
    pub fn angle(&self) -> f32 {
        angle_of(self.vel)
    }

    /// Trailing end of a bolt (the position itself for other shapes)
    pub fn tail(&self) -> Vec2 {
        match self.body {
            ProjectileBody::Bolt { length, .. } => {
                self.pos - self.vel.normalize_or_zero() * length
            }
            _ => self.pos,
        }
    }

    /// Move one tick
    ///
    /// Returns the wall a bolt head crossed; the bolt dies there and may
    /// split. Pellets die silently on walls, beams once fully off-canvas.
    pub fn advance(&mut self) -> Option<Wall> {
        if !self.alive {
            return None;
        }

        // A lifetime of N gives exactly N moves
        if self.ttl == 0 {
            self.alive = false;
            return None;
        }
        self.ttl -= 1;

        self.pos += self.vel;

        match &mut self.body {
            ProjectileBody::Pellet { .. } => {
                if wall_crossed(self.pos).is_some() {
                    self.alive = false;
                }
                None
            }
            ProjectileBody::Bolt { .. } => {
                let wall = wall_crossed(self.pos)?;
                self.alive = false;
                Some(wall)
            }
            ProjectileBody::Beam {
                half_extents,
                hit_cooldown,
                ..
            } => {
                *hit_cooldown = hit_cooldown.saturating_sub(1);
                let margin = half_extents.length();
                let off_canvas = self.pos.x < -margin
                    || self.pos.x > ARENA_WIDTH + margin
                    || self.pos.y < -margin
                    || self.pos.y > ARENA_HEIGHT + margin;
                if off_canvas {
                    self.alive = false;
                }
                None
            }
        }
    }

    /// Child bolts produced when this bolt strikes `wall`
    ///
    /// Children fan around the reflected heading. Bolts at the last
    /// generation produce nothing.
    pub fn split(&self, wall: Wall) -> Vec<Projectile> {
        let ProjectileBody::Bolt { generation, .. } = self.body else {
            return Vec::new();
        };
        if generation >= LASER_MAX_GENERATION {
            return Vec::new();
        }

        let normal = wall.inward_normal();
        let reflected = reflect_velocity(self.vel, normal);
        let base = angle_of(reflected);
        // Impact point pulled back onto the wall
        let impact = clamp_to_arena(self.pos, 0.0);

        (0..LASER_CHILDREN)
            .map(|i| {
                let offset = (i as f32 - (LASER_CHILDREN - 1) as f32 / 2.0) * LASER_REFLECT_SPREAD;
                Projectile::bolt(impact, base + offset, generation + 1)
            })
            .collect()
    }
}

/// Advance every live projectile one tick, queueing split bolts
pub fn advance_projectiles(state: &mut SimulationState) {
    let mut children = Vec::new();
    for projectile in state.projectiles.iter_mut() {
        if let Some(wall) = projectile.advance() {
            let split = projectile.split(wall);
            if !split.is_empty() {
                log::trace!(
                    "Bolt {} split into {} off {:?}",
                    projectile.id,
                    split.len(),
                    wall
                );
            }
            children.extend(split);
        }
    }
    for child in children {
        state.spawn(child);
    }
}
