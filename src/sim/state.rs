//! Simulation state and core entity types
//!
//! One `SimulationState` owns everything a running match needs. Nothing here
//! is global; the tick function is the only writer between host commands.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::combat::HitEvent;
use super::effects::Effects;
use super::projectile::Projectile;
use super::weapon::WeaponState;
use crate::consts::*;
use crate::error::{Result, SandboxError};
use crate::settings::Settings;

/// The player-controlled body carrying the active weapon
#[derive(Debug, Clone, Serialize)]
pub struct Attacker {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Under direct pointer control: gravity suspended, velocity estimated
    pub dragging: bool,
    /// Attacker position minus pointer position at grab time
    pub grab_offset: Vec2,
    /// Latest pointer position seen by the simulation
    pub pointer: Vec2,
    /// Pointer position at the previous drag sample
    pub last_pointer: Vec2,
    /// Aim direction for ranged weapons and swings
    pub facing: f32,
    /// Ball is overlapping the target; a new hit needs a fresh contact
    pub in_contact: bool,
    pub weapon: WeaponState,
    /// Visual jitter while frozen (never feeds back into physics)
    pub shake_offset: Vec2,
}

impl Attacker {
    pub fn new(weapon: WeaponState) -> Self {
        Self {
            pos: ATTACKER_SPAWN,
            vel: Vec2::ZERO,
            radius: ATTACKER_RADIUS,
            dragging: false,
            grab_offset: Vec2::ZERO,
            pointer: ATTACKER_SPAWN,
            last_pointer: ATTACKER_SPAWN,
            facing: 0.0,
            in_contact: false,
            weapon,
            shake_offset: Vec2::ZERO,
        }
    }

    /// Whether a pointer at `pos` grabs the attacker
    pub fn within_grab(&self, pos: Vec2) -> bool {
        (pos - self.pos).length() <= GRAB_RADIUS.max(self.radius)
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.dragging = true;
        self.grab_offset = self.pos - pointer;
        self.pointer = pointer;
        self.last_pointer = pointer;
        self.vel = Vec2::ZERO;
    }

    /// Release keeps the last sampled throw velocity
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.grab_offset = Vec2::ZERO;
    }
}

/// The HP-bearing dummy
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    /// Current position (baseline plus shake while frozen)
    pub pos: Vec2,
    pub base_pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// HP never drops; hits only produce feedback
    pub infinite: bool,
    pub visible: bool,
    pub ko_in_progress: bool,
    /// Visual recoil after a freeze; never moves `base_pos`
    pub recoil: Recoil,
}

/// Knock-back pose the renderer draws on top of the target's position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Recoil {
    /// Full displacement at the start of the recoil
    pub push: Vec2,
    /// Full tilt in radians at the start of the recoil
    pub tilt: f32,
    pub remaining: u32,
}

impl Recoil {
    /// Recoil away from a hit coming from `from`
    pub fn away_from(from: Vec2, target: Vec2) -> Self {
        let away = (target - from).try_normalize().unwrap_or(Vec2::X);
        Self {
            push: away * KNOCKBACK_DISTANCE,
            tilt: KNOCKBACK_TILT * if away.x < 0.0 { -1.0 } else { 1.0 },
            remaining: KNOCKBACK_TICKS,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Share of the full pose still applied, easing out to 0
    fn amount(&self) -> f32 {
        let t = self.remaining as f32 / KNOCKBACK_TICKS as f32;
        t * t
    }

    pub fn offset(&self) -> Vec2 {
        self.push * self.amount()
    }

    pub fn angle(&self) -> f32 {
        self.tilt * self.amount()
    }

    pub fn update(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Outcome of applying one hit to the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageApplied {
    /// Damage actually removed (clamped to remaining HP in finite mode)
    pub dealt: f32,
    pub knocked_out: bool,
}

impl Target {
    pub fn new(max_hp: Option<u32>) -> Self {
        let (max, infinite) = match max_hp {
            Some(hp) => (hp as f32, false),
            None => (DEFAULT_MAX_HP as f32, true),
        };
        Self {
            pos: TARGET_SPAWN,
            base_pos: TARGET_SPAWN,
            radius: TARGET_RADIUS,
            hp: max,
            max_hp: max,
            infinite,
            visible: true,
            ko_in_progress: false,
            recoil: Recoil::default(),
        }
    }

    /// Whether hits may land at all
    pub fn hittable(&self) -> bool {
        self.visible && !self.ko_in_progress
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Apply one discrete hit; `None` when the target cannot be hit
    pub fn apply_damage(&mut self, amount: f32) -> Option<DamageApplied> {
        if !self.hittable() {
            return None;
        }
        let amount = amount.max(0.0);

        if self.infinite {
            return Some(DamageApplied {
                dealt: amount,
                knocked_out: false,
            });
        }

        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        let knocked_out = self.hp <= 0.0;
        if knocked_out {
            self.hp = 0.0;
            self.ko_in_progress = true;
        }
        Some(DamageApplied { dealt, knocked_out })
    }

    /// Snap back to the baseline once the freeze ends
    pub fn settle(&mut self) {
        self.pos = self.base_pos;
    }

    /// Where the body is drawn: position plus any recoil
    pub fn draw_pos(&self) -> Vec2 {
        self.pos + self.recoil.offset()
    }
}

/// Simulation freeze timer plus the shake it drives
#[derive(Debug, Clone, Default, Serialize)]
pub struct HitStop {
    /// Ticks of freeze remaining
    pub remaining: u32,
    /// Length the timer was last armed with
    pub duration: u32,
    /// Jitter amplitude in pixels for this freeze
    pub shake: f32,
    /// Freeze was triggered by a knockout
    pub knockout: bool,
}

impl HitStop {
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Set (never add to) the freeze
    pub fn arm(&mut self, ticks: u32, shake: f32, knockout: bool) {
        self.remaining = ticks;
        self.duration = ticks;
        self.shake = shake;
        self.knockout = knockout;
    }

    /// Count one frozen tick; floors at zero
    pub fn tick_down(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Ticks spent frozen since the last arm
    pub fn elapsed(&self) -> u32 {
        self.duration.saturating_sub(self.remaining)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Validated session settings
    pub settings: Settings,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub attacker: Attacker,
    pub target: Target,
    /// Live projectiles (insertion order)
    pub projectiles: Vec<Projectile>,
    /// Spawned this tick; merged into `projectiles` at the tick boundary
    pub pending: Vec<Projectile>,
    /// Visual effects (never affect gameplay)
    pub effects: Effects,
    pub hit_stop: HitStop,
    /// Whole-frame translation while frozen
    pub screen_shake: Vec2,
    /// Seeded jitter source
    rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl SimulationState {
    /// Create a new match from settings (validated here)
    pub fn new(settings: Settings) -> Self {
        let settings = settings.validated();
        Self {
            time_ticks: 0,
            attacker: Attacker::new(WeaponState::new(settings.weapon)),
            target: Target::new(settings.max_hp),
            projectiles: Vec::new(),
            pending: Vec::new(),
            effects: Effects::default(),
            hit_stop: HitStop::default(),
            screen_shake: Vec2::ZERO,
            rng: Pcg32::seed_from_u64(settings.seed),
            next_id: 1,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue a projectile for the next tick boundary
    pub fn spawn(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        self.pending.push(projectile);
    }

    /// Move spawned projectiles into the live list
    pub fn merge_pending(&mut self) {
        self.projectiles.append(&mut self.pending);
    }

    /// Uniform jitter in [-magnitude, magnitude] on both axes
    pub fn jitter(&mut self, magnitude: f32) -> Vec2 {
        if magnitude <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.random_range(-magnitude..=magnitude),
            self.rng.random_range(-magnitude..=magnitude),
        )
    }

    /// Particles, popup and flash for a landed hit
    pub fn spawn_hit_effects(&mut self, hit: &HitEvent) {
        self.effects
            .hit(&mut self.rng, hit, self.settings.max_particles);
    }

    /// Slash trail for a swing starting at `pivot`
    pub fn spawn_slash(&mut self, pivot: Vec2, facing: f32) {
        self.effects.slash(pivot, facing);
    }

    /// Knockout freeze has drained and the target is gone
    pub fn respawn_available(&self) -> bool {
        !self.target.visible
    }

    /// Bring the target (and the rest of the match) back for a new life
    ///
    /// Only valid once the knockout freeze has fully elapsed.
    pub fn respawn(&mut self) -> Result<()> {
        if !self.respawn_available() {
            return Err(SandboxError::RespawnUnavailable);
        }

        self.target = Target::new(self.settings.max_hp);
        self.attacker = Attacker::new(WeaponState::new(self.settings.weapon));
        self.projectiles.clear();
        self.pending.clear();
        self.effects.clear();
        self.hit_stop.clear();
        self.screen_shake = Vec2::ZERO;

        log::info!("Target respawned at tick {}", self.time_ticks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero_and_knocks_out() {
        let mut target = Target::new(Some(100));
        target.hp = 5.0;

        let applied = target.apply_damage(10.0).unwrap();
        assert_eq!(applied.dealt, 5.0);
        assert!(applied.knocked_out);
        assert_eq!(target.hp, 0.0);
        assert!(target.ko_in_progress);

        // Further hits are no-ops
        assert!(target.apply_damage(10.0).is_none());
        assert_eq!(target.hp, 0.0);
    }

    #[test]
    fn test_infinite_target_pins_hp() {
        let mut target = Target::new(None);
        let applied = target.apply_damage(1000.0).unwrap();
        assert_eq!(applied.dealt, 1000.0);
        assert!(!applied.knocked_out);
        assert_eq!(target.hp, target.max_hp);
    }

    #[test]
    fn test_hit_stop_floors_at_zero() {
        let mut hit_stop = HitStop::default();
        hit_stop.arm(2, 1.0, false);
        hit_stop.tick_down();
        hit_stop.tick_down();
        hit_stop.tick_down();
        assert_eq!(hit_stop.remaining, 0);
        assert_eq!(hit_stop.elapsed(), 2);
    }

    #[test]
    fn test_respawn_rejected_while_target_visible() {
        let mut state = SimulationState::new(Settings::default());
        assert!(matches!(
            state.respawn(),
            Err(SandboxError::RespawnUnavailable)
        ));
    }

    #[test]
    fn test_spawned_projectiles_wait_for_merge() {
        use super::super::projectile::Projectile;

        let mut state = SimulationState::new(Settings::default());
        state.spawn(Projectile::pellet(Vec2::new(10.0, 10.0), 0.0));
        assert!(state.projectiles.is_empty());
        assert_eq!(state.pending.len(), 1);
        state.merge_pending();
        assert_eq!(state.projectiles.len(), 1);
        assert!(state.pending.is_empty());
    }
}
