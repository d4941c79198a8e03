//! Arc sector geometry for the sword swing
//!
//! A sector is defined by:
//! - pivot: the point the blade rotates around
//! - reach: blade length from the pivot
//! - theta_start, theta_end: angular extent swept by the blade

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{angle_of, direction, normalize_angle};

/// A pie-slice swept by a swing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcSector {
    pub pivot: Vec2,
    pub reach: f32,
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl ArcSector {
    pub fn new(pivot: Vec2, reach: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            pivot,
            reach,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Sector of total width `width` centred on `facing`
    pub fn centered(pivot: Vec2, reach: f32, facing: f32, width: f32) -> Self {
        Self::new(pivot, reach, facing - width / 2.0, facing + width / 2.0)
    }

    /// Angular span of the sector (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        let mut span = self.theta_end - self.theta_start;
        if span < 0.0 {
            span += std::f32::consts::TAU;
        }
        span
    }

    /// Check if an angle is within the sector's angular extent
    pub fn contains_angle(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.theta_start;
        let end = self.theta_end;

        if start <= end {
            // No wraparound
            theta >= start && theta <= end
        } else {
            // Wraparound case (e.g., start=170°, end=-170°)
            theta >= start || theta <= end
        }
    }

    /// Whether a circle of `radius` at `point` is touched by the sector
    ///
    /// The blade reaches the circle's near edge; the angle test uses its centre.
    pub fn touches_circle(&self, point: Vec2, radius: f32) -> bool {
        let offset = point - self.pivot;
        offset.length() - radius <= self.reach && self.contains_angle(angle_of(offset))
    }

    /// Blade angle at swing progress `t` in [0, 1]
    pub fn angle_at(&self, t: f32) -> f32 {
        normalize_angle(self.theta_start + t.clamp(0.0, 1.0) * self.angular_span())
    }

    /// Blade tip at swing progress `t`
    pub fn tip_at(&self, t: f32) -> Vec2 {
        self.pivot + direction(self.angle_at(t)) * self.reach
    }
}
