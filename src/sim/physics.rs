//! Free-body integration and drag-follow for the attacker

use glam::Vec2;

use super::collision::clamp_to_arena;
use super::state::Attacker;
use crate::angle_of;
use crate::consts::*;

/// Below this drag speed the facing is left alone
const DRAG_FACING_MIN_SPEED: f32 = 0.5;

/// Advance the attacker one running tick
pub fn step_attacker(attacker: &mut Attacker) {
    if attacker.dragging {
        follow_pointer(attacker);
    } else {
        integrate(&mut attacker.pos, &mut attacker.vel, attacker.radius);
    }
}

/// Track the pointer while held, sampling the throw velocity
pub fn follow_pointer(attacker: &mut Attacker) {
    attacker.pos = clamp_to_arena(attacker.pointer + attacker.grab_offset, attacker.radius);
    attacker.vel = (attacker.pointer - attacker.last_pointer) * THROW_SENSITIVITY;
    attacker.last_pointer = attacker.pointer;

    if attacker.vel.length() > DRAG_FACING_MIN_SPEED {
        attacker.facing = angle_of(attacker.vel);
    }
}

/// Gravity, friction and wall bounces for a circle of `radius`
///
/// Returns true if any wall was struck this tick.
pub fn integrate(pos: &mut Vec2, vel: &mut Vec2, radius: f32) -> bool {
    vel.y += GRAVITY;
    *vel *= FRICTION;
    *pos += *vel;

    let mut bounced = false;

    if pos.x < radius {
        pos.x = radius;
        vel.x = -vel.x * BOUNCE;
        bounced = true;
    } else if pos.x > ARENA_WIDTH - radius {
        pos.x = ARENA_WIDTH - radius;
        vel.x = -vel.x * BOUNCE;
        bounced = true;
    }

    let vertical = if pos.y < radius {
        pos.y = radius;
        true
    } else if pos.y > ARENA_HEIGHT - radius {
        pos.y = ARENA_HEIGHT - radius;
        true
    } else {
        false
    };
    if vertical {
        vel.y = -vel.y * BOUNCE;
        // Snap tiny bounces so a resting body stays put
        if vel.y.abs() < GRAVITY {
            vel.y = 0.0;
        }
        bounced = true;
    }

    bounced
}
