//! Collision geometry for the sandbox
//!
//! Circle-circle for bodies and pellets, segment-circle for laser capsules,
//! rotated-rectangle-circle for the giant beam, plus the arena walls.

use glam::Vec2;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the second shape (if hit)
    pub point: Vec2,
    /// Unit normal pointing from the second shape toward the first
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Separation axis used when two centres coincide (straight up on the canvas)
pub const DEGENERATE_NORMAL: Vec2 = Vec2::NEG_Y;

/// Check overlap of circle `a` against circle `b`
///
/// Coincident centres count as full overlap and separate straight up.
pub fn circle_circle(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a_pos - b_pos;
    let dist = delta.length();
    let reach = a_radius + b_radius;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > 1e-4 {
        delta / dist
    } else {
        DEGENERATE_NORMAL
    };

    CollisionResult {
        hit: true,
        point: b_pos + normal * b_radius,
        normal,
        penetration: reach - dist,
    }
}

/// Closest point on segment `start..end` to `point`
pub fn closest_point_on_segment(start: Vec2, end: Vec2, point: Vec2) -> Vec2 {
    let line_vec = end - start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < 0.0001 {
        return start; // Degenerate segment
    }

    let t = ((point - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    start + line_vec * t
}

/// Check a capsule (segment thickened by `thickness`) against a circle
///
/// Returns the point on the segment closest to the circle when they touch.
pub fn segment_circle(
    start: Vec2,
    end: Vec2,
    thickness: f32,
    center: Vec2,
    radius: f32,
) -> Option<Vec2> {
    let closest = closest_point_on_segment(start, end, center);
    if (center - closest).length() <= radius + thickness {
        Some(closest)
    } else {
        None
    }
}

/// Express `point` in the local frame of a rectangle centred at `center`
/// and rotated by `angle`
#[inline]
fn to_rect_local(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(-angle).rotate(point - center)
}

/// Whether `point` lies inside a rotated rectangle
pub fn point_in_rotated_rect(point: Vec2, center: Vec2, half_extents: Vec2, angle: f32) -> bool {
    let local = to_rect_local(point, center, angle);
    local.x.abs() <= half_extents.x && local.y.abs() <= half_extents.y
}

/// Check a rotated rectangle against a circle
///
/// The circle centre is moved into the rectangle's frame, clamped to the
/// rectangle, and the clamped point compared against the radius. Returns the
/// contact point in world space.
pub fn rotated_rect_circle(
    center: Vec2,
    half_extents: Vec2,
    angle: f32,
    circle_center: Vec2,
    radius: f32,
) -> Option<Vec2> {
    let local = to_rect_local(circle_center, center, angle);
    let clamped = local.clamp(-half_extents, half_extents);

    if (local - clamped).length() <= radius {
        Some(center + Vec2::from_angle(angle).rotate(clamped))
    } else {
        None
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// One of the four arena walls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Floor,
}

impl Wall {
    /// Normal pointing back into the arena
    pub fn inward_normal(&self) -> Vec2 {
        match self {
            Wall::Left => Vec2::X,
            Wall::Right => Vec2::NEG_X,
            Wall::Top => Vec2::Y,
            Wall::Floor => Vec2::NEG_Y,
        }
    }
}

/// First wall a point has crossed, if any
pub fn wall_crossed(point: Vec2) -> Option<Wall> {
    if point.x < 0.0 {
        Some(Wall::Left)
    } else if point.x > ARENA_WIDTH {
        Some(Wall::Right)
    } else if point.y < 0.0 {
        Some(Wall::Top)
    } else if point.y > ARENA_HEIGHT {
        Some(Wall::Floor)
    } else {
        None
    }
}

/// Clamp a point into the arena
#[inline]
pub fn clamp_to_arena(point: Vec2, margin: f32) -> Vec2 {
    point.clamp(
        Vec2::splat(margin),
        Vec2::new(ARENA_WIDTH - margin, ARENA_HEIGHT - margin),
    )
}
