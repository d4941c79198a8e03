//! Read-only view of a match for renderers and hosts

use glam::Vec2;
use serde::Serialize;

use super::effects::Effects;
use super::projectile::Projectile;
use super::state::{Attacker, HitStop, SimulationState, Target};
use crate::error::Result;
use crate::settings::WeaponKind;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub weapon: WeaponKind,
    pub attacker: Attacker,
    pub target: Target,
    pub projectiles: Vec<Projectile>,
    pub effects: Effects,
    pub hit_stop: HitStop,
    /// Whole-frame offset (zero when screen shake is disabled)
    pub screen_shake: Vec2,
    pub respawn_available: bool,
}

impl Snapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let screen_shake = if state.settings.effective_screen_shake() {
            state.screen_shake
        } else {
            Vec2::ZERO
        };

        Self {
            tick: state.time_ticks,
            weapon: state.attacker.weapon.kind(),
            attacker: state.attacker.clone(),
            target: state.target.clone(),
            projectiles: state.projectiles.clone(),
            effects: state.effects.clone(),
            hit_stop: state.hit_stop.clone(),
            screen_shake,
            respawn_available: state.respawn_available(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
