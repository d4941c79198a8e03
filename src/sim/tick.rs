//! Fixed timestep simulation tick
//!
//! Each tick is either running (physics, attacks, hit checks, effects) or
//! frozen (count the hit-stop down and shake). Under the default freeze
//! policy attacks keep advancing while frozen, so a swing or volley can keep
//! landing through its own freeze.

use glam::Vec2;

use super::combat::{self, HitEvent, ResolvePass};
use super::physics;
use super::projectile::advance_projectiles;
use super::state::{Recoil, SimulationState};
use super::weapon;
use crate::angle_of;
use crate::settings::FreezePolicy;

/// Host intent for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Pointer pressed: grab when over the attacker, otherwise attack
    Press(Vec2),
    /// Pointer moved
    Aim(Vec2),
    /// Pointer released
    Release,
    /// Fire or swing toward a point regardless of grab range
    Fire(Vec2),
    /// Grab the attacker regardless of grab range
    Grab(Vec2),
}

/// Input commands for a single tick, applied in order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intents: Vec<Intent>,
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub hits: Vec<HitEvent>,
    /// The tick ran in the frozen branch
    pub frozen: bool,
    /// A freeze drained on this tick
    pub freeze_ended: bool,
    /// The knockout freeze drained and the target disappeared
    pub knocked_out: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut SimulationState, input: &TickInput) -> TickReport {
    state.time_ticks += 1;
    apply_intents(state, input);

    let mut report = TickReport::default();
    if state.hit_stop.is_active() {
        report.frozen = true;
        frozen_step(state, &mut report);
    } else {
        running_step(state, &mut report);
    }

    if state.hit_stop.is_active() {
        apply_shake(state);
    }

    state.projectiles.retain(|p| p.alive);
    state.merge_pending();
    report
}

fn apply_intents(state: &mut SimulationState, input: &TickInput) {
    for intent in &input.intents {
        match *intent {
            Intent::Aim(pos) => {
                let attacker = &mut state.attacker;
                attacker.pointer = pos;
                if !attacker.dragging {
                    let aim = pos - attacker.pos;
                    if aim.length_squared() > 1e-6 {
                        attacker.facing = angle_of(aim);
                    }
                }
            }
            Intent::Press(pos) => {
                state.attacker.pointer = pos;
                if state.attacker.dragging {
                    continue;
                }
                if state.attacker.within_grab(pos) {
                    state.attacker.begin_drag(pos);
                } else {
                    fire(state, pos);
                }
            }
            Intent::Fire(pos) => fire(state, pos),
            Intent::Grab(pos) => state.attacker.begin_drag(pos),
            Intent::Release => {
                if state.attacker.dragging {
                    state.attacker.end_drag();
                }
            }
        }
    }
}

fn fire(state: &mut SimulationState, pos: Vec2) {
    if let Err(e) = weapon::activate(state, pos) {
        log::debug!("Activation ignored: {e}");
    }
}

/// Weapon timers and projectile motion
fn advance_attacks(state: &mut SimulationState) {
    state.attacker.weapon.advance();
    advance_projectiles(state);
}

fn running_step(state: &mut SimulationState, report: &mut TickReport) {
    physics::step_attacker(&mut state.attacker);
    advance_attacks(state);
    report.hits = combat::resolve(state, ResolvePass::Running);
    state.effects.update();

    // A fresh freeze shakes around the baseline, not the recoil pose
    if state.hit_stop.is_active() {
        state.target.recoil = Recoil::default();
    } else {
        state.target.recoil.update();
    }
}

fn frozen_step(state: &mut SimulationState, report: &mut TickReport) {
    state.hit_stop.tick_down();

    // The body holds still; keep the drag sample current so release
    // after a freeze doesn't fling it
    let attacker = &mut state.attacker;
    if attacker.dragging {
        attacker.last_pointer = attacker.pointer;
    }

    if state.settings.freeze_policy == FreezePolicy::ContinueAttacks {
        advance_attacks(state);
        report.hits = combat::resolve(state, ResolvePass::Frozen);
    }

    if !state.hit_stop.is_active() {
        finish_freeze(state, report);
    }
}

fn finish_freeze(state: &mut SimulationState, report: &mut TickReport) {
    report.freeze_ended = true;
    state.target.settle();
    state.attacker.shake_offset = Vec2::ZERO;
    state.screen_shake = Vec2::ZERO;

    if state.hit_stop.knockout {
        state.target.visible = false;
        report.knocked_out = true;
        log::info!("Target down at tick {}; respawn available", state.time_ticks);
    } else {
        state.target.recoil = Recoil::away_from(state.attacker.pos, state.target.base_pos);
    }
    state.hit_stop.clear();
}

fn apply_shake(state: &mut SimulationState) {
    let magnitude = state.hit_stop.shake;

    let offset = state.jitter(magnitude);
    state.target.pos = state.target.base_pos + offset;
    state.screen_shake = state.jitter(magnitude);
    state.attacker.shake_offset = if state.settings.shake_victim_only {
        Vec2::ZERO
    } else {
        state.jitter(magnitude / 2.0)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::{Settings, WeaponKind};
    use crate::sim::projectile::{Projectile, ProjectileBody};

    fn run(state: &mut SimulationState, ticks: u32) -> Vec<HitEvent> {
        let mut hits = Vec::new();
        for _ in 0..ticks {
            hits.extend(tick(state, &TickInput::default()).hits);
        }
        hits
    }

    fn press(pos: Vec2) -> TickInput {
        TickInput {
            intents: vec![Intent::Press(pos)],
        }
    }

    #[test]
    fn test_freeze_counts_down_to_zero() {
        let mut state = SimulationState::new(Settings::default());
        state.hit_stop.arm(5, 2.0, false);

        for expected in (0..5).rev() {
            let report = tick(&mut state, &TickInput::default());
            assert!(report.frozen);
            assert_eq!(state.hit_stop.remaining, expected);
        }
        assert!(!tick(&mut state, &TickInput::default()).frozen);
    }

    #[test]
    fn test_attacker_holds_still_while_frozen() {
        let mut state = SimulationState::new(Settings::default());
        state.attacker.vel = Vec2::new(3.0, -2.0);
        state.hit_stop.arm(10, 2.0, false);
        let before = state.attacker.pos;

        for _ in 0..9 {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.attacker.pos, before);
        }
    }

    #[test]
    fn test_target_shakes_then_settles() {
        let mut state = SimulationState::new(Settings::default());
        state.hit_stop.arm(3, 6.0, false);

        tick(&mut state, &TickInput::default());
        let offset = state.target.pos - state.target.base_pos;
        assert!(offset.x.abs() <= 6.0 && offset.y.abs() <= 6.0);

        let report = run_until_thawed(&mut state);
        assert!(report.freeze_ended);
        assert_eq!(state.target.pos, state.target.base_pos);
        assert_eq!(state.screen_shake, Vec2::ZERO);
    }

    fn run_until_thawed(state: &mut SimulationState) -> TickReport {
        loop {
            let report = tick(state, &TickInput::default());
            if report.freeze_ended {
                return report;
            }
        }
    }

    #[test]
    fn test_dropped_ball_hits_target_once_at_floor_freeze() {
        let mut state = SimulationState::new(Settings::default());
        state.attacker.pos = state.target.pos - Vec2::new(50.0, 0.0);

        let report = tick(&mut state, &TickInput::default());
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].damage, BALL_MIN_DAMAGE);
        assert_eq!(state.target.hp, 95.0);
        assert_eq!(state.hit_stop.remaining, MIN_HIT_STOP_TICKS);
    }

    #[test]
    fn test_laser_knockout_then_respawn() {
        let mut state = SimulationState::new(Settings::for_weapon(WeaponKind::Laser));
        state.target.hp = 5.0;
        state.spawn(Projectile::bolt(state.target.pos, 0.0, 0));
        state.merge_pending();

        // The bolt moves one step, still overlapping the target
        let report = tick(&mut state, &TickInput::default());
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].damage, 5.0);
        assert_eq!(state.target.hp, 0.0);
        assert_eq!(state.hit_stop.remaining, KO_HIT_STOP_TICKS);

        assert!(state.respawn().is_err());
        for _ in 0..KO_HIT_STOP_TICKS - 1 {
            tick(&mut state, &TickInput::default());
            assert!(state.target.visible);
        }
        let report = tick(&mut state, &TickInput::default());
        assert!(report.knocked_out);
        assert!(!state.target.visible);

        state.respawn().unwrap();
        assert!(state.target.visible);
        assert_eq!(state.target.hp, state.target.max_hp);
        assert!(!state.target.ko_in_progress);
    }

    fn knock_out_with_bolt(state: &mut SimulationState) {
        state.target.hp = 1.0;
        state.spawn(Projectile::bolt(state.target.pos, 0.0, 0));
        state.merge_pending();
        while !tick(state, &TickInput::default()).knocked_out {}
    }

    fn assert_fresh_match(state: &SimulationState) {
        assert!(state.target.visible);
        assert_eq!(state.target.hp, state.target.max_hp);
        assert_eq!(state.target.pos, state.target.base_pos);
        assert!(!state.target.recoil.is_active());
        assert!(!state.hit_stop.is_active());
        assert!(!state.hit_stop.knockout);
        assert_eq!(state.screen_shake, Vec2::ZERO);
        assert_eq!(state.attacker.shake_offset, Vec2::ZERO);
        assert_eq!(state.attacker.pos, ATTACKER_SPAWN);
        assert!(state.projectiles.is_empty());
        assert!(state.pending.is_empty());
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_respawn_resets_everything_every_time() {
        let mut state = SimulationState::new(Settings::for_weapon(WeaponKind::Laser));
        for _ in 0..2 {
            knock_out_with_bolt(&mut state);
            assert!(state.respawn_available());
            // Leave a stray bolt flying so respawn has something to clear
            state.spawn(Projectile::bolt(Vec2::new(100.0, 100.0), 0.5, 0));
            state.merge_pending();
            state.spawn(Projectile::bolt(Vec2::new(100.0, 100.0), 0.5, 0));

            state.respawn().unwrap();
            assert_fresh_match(&state);
            assert!(state.respawn().is_err());
        }
    }

    #[test]
    fn test_attacker_shakes_at_half_amplitude_unless_victim_only() {
        let mut settings = Settings::default();
        settings.shake_victim_only = false;
        let mut state = SimulationState::new(settings);
        state.hit_stop.arm(20, 8.0, false);

        let mut moved = false;
        for _ in 0..19 {
            tick(&mut state, &TickInput::default());
            let offset = state.attacker.shake_offset;
            assert!(offset.x.abs() <= 4.0 && offset.y.abs() <= 4.0);
            moved |= offset != Vec2::ZERO;
        }
        assert!(moved);

        run_until_thawed(&mut state);
        assert_eq!(state.attacker.shake_offset, Vec2::ZERO);

        let mut state = SimulationState::new(Settings::default());
        state.hit_stop.arm(5, 8.0, false);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.attacker.shake_offset, Vec2::ZERO);
    }

    #[test]
    fn test_target_recoils_after_freeze_then_returns() {
        let mut state = SimulationState::new(Settings::default());
        state.hit_stop.arm(3, 4.0, false);
        run_until_thawed(&mut state);

        // Pushed away from the attacker on its left, baseline untouched
        assert_eq!(state.target.pos, state.target.base_pos);
        assert!(state.target.recoil.is_active());
        assert!(state.target.draw_pos().x > state.target.base_pos.x);
        assert!(state.target.recoil.angle() > 0.0);

        let mut last = state.target.recoil.offset().length();
        for _ in 0..KNOCKBACK_TICKS {
            tick(&mut state, &TickInput::default());
            let now = state.target.recoil.offset().length();
            assert!(now <= last);
            last = now;
        }
        assert!(!state.target.recoil.is_active());
        assert_eq!(state.target.draw_pos(), state.target.base_pos);
    }

    #[test]
    fn test_knockout_freeze_ends_without_recoil() {
        let mut state = SimulationState::new(Settings::for_weapon(WeaponKind::Laser));
        knock_out_with_bolt(&mut state);
        assert!(!state.target.recoil.is_active());
    }

    #[test]
    fn test_sword_lands_three_hits_per_swing() {
        let mut settings = Settings::for_weapon(WeaponKind::Sword);
        settings.max_hp = None;
        let mut state = SimulationState::new(settings);
        // Resting on the floor so the swing pivot stays put
        state.attacker.pos = Vec2::new(300.0, ARENA_HEIGHT - ATTACKER_RADIUS);
        state.target.base_pos = Vec2::new(380.0, ARENA_HEIGHT - 40.0);
        state.target.pos = state.target.base_pos;

        let target = state.target.pos;
        let mut hits = tick(&mut state, &press(target)).hits;
        hits.extend(run(&mut state, 120));
        assert_eq!(hits.len(), 3);
        let phases: Vec<_> = hits.iter().map(|h| h.source).collect();
        assert_eq!(
            phases,
            vec![
                combat::HitSource::Sword { phase: 0 },
                combat::HitSource::Sword { phase: 1 },
                combat::HitSource::Sword { phase: 2 },
            ]
        );

        // A fresh swing lands a fresh set
        let mut hits = tick(&mut state, &press(target)).hits;
        hits.extend(run(&mut state, 120));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_beam_hits_five_times_spaced_out() {
        let mut settings = Settings::for_weapon(WeaponKind::GiantBeam);
        settings.max_hp = None;
        let mut state = SimulationState::new(settings);
        state.attacker.pos = Vec2::new(100.0, 250.0);
        state.target.base_pos = Vec2::new(400.0, 250.0);
        state.target.pos = state.target.base_pos;

        let mut hit_ticks = Vec::new();
        tick(&mut state, &press(Vec2::new(400.0, 250.0)));
        for _ in 0..GIANT_BEAM_LIFETIME + 10 {
            let report = tick(&mut state, &TickInput::default());
            if !report.hits.is_empty() {
                hit_ticks.push(state.time_ticks);
            }
        }

        assert_eq!(hit_ticks.len(), GIANT_BEAM_MAX_HITS as usize);
        for pair in hit_ticks.windows(2) {
            assert!(pair[1] - pair[0] >= GIANT_BEAM_HIT_INTERVAL as u64);
        }
    }

    #[test]
    fn test_split_bolts_do_not_split_again() {
        let mut state = SimulationState::new(Settings::for_weapon(WeaponKind::Laser));
        state.spawn(Projectile::bolt(Vec2::new(100.0, 50.0), -std::f32::consts::FRAC_PI_2, 0));
        state.merge_pending();

        let mut max_alive = 0;
        for _ in 0..LASER_LIFETIME * 2 {
            tick(&mut state, &TickInput::default());
            max_alive = max_alive.max(state.projectiles.len());
            for p in &state.projectiles {
                if let ProjectileBody::Bolt { generation, .. } = p.body {
                    assert!(generation <= LASER_MAX_GENERATION);
                }
            }
        }
        assert_eq!(max_alive, LASER_CHILDREN);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_freeze_all_holds_projectiles() {
        let mut settings = Settings::for_weapon(WeaponKind::Shotgun);
        settings.freeze_policy = FreezePolicy::FreezeAll;
        let mut state = SimulationState::new(settings);
        state.spawn(Projectile::pellet(Vec2::new(100.0, 100.0), 0.0));
        state.merge_pending();
        state.hit_stop.arm(4, 1.0, false);

        let before = state.projectiles[0].pos;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.projectiles[0].pos, before);
    }

    #[test]
    fn test_same_seed_same_match() {
        let script = |state: &mut SimulationState| {
            let target = state.target.pos;
            let mut log = Vec::new();
            for i in 0..300u32 {
                let input = if i % 40 == 0 { press(target) } else { TickInput::default() };
                for hit in tick(state, &input).hits {
                    log.push((state.time_ticks, hit.damage));
                }
            }
            (log, state.target.pos, state.screen_shake)
        };

        let mut a = SimulationState::new(Settings::for_weapon(WeaponKind::Shotgun));
        let mut b = SimulationState::new(Settings::for_weapon(WeaponKind::Shotgun));
        assert_eq!(script(&mut a), script(&mut b));
    }

    #[test]
    fn test_press_on_attacker_starts_drag() {
        let mut state = SimulationState::new(Settings::default());
        let grab = state.attacker.pos + Vec2::new(5.0, 0.0);
        tick(&mut state, &press(grab));
        assert!(state.attacker.dragging);

        tick(
            &mut state,
            &TickInput {
                intents: vec![Intent::Aim(grab + Vec2::new(20.0, 0.0))],
            },
        );
        tick(
            &mut state,
            &TickInput {
                intents: vec![Intent::Release],
            },
        );
        assert!(!state.attacker.dragging);
        assert!(state.attacker.vel.x > 0.0);
    }
}
