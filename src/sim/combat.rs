//! Hit resolution: who touched the target this tick, for how much, and how
//! long the world freezes because of it

use glam::Vec2;
use serde::Serialize;

use super::collision::{circle_circle, reflect_velocity, rotated_rect_circle, segment_circle};
use super::projectile::ProjectileBody;
use super::state::{SimulationState, Target};
use super::weapon::WeaponState;
use crate::consts::*;
use crate::settings::{Settings, WeaponKind};

/// Shake multiplier for knockout freezes
const KO_SHAKE_SCALE: f32 = 3.0;
/// Damage at which shake amplitude doubles
const SHAKE_DAMAGE_SCALE: f32 = 25.0;

/// What delivered a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitSource {
    Ball,
    Sword { phase: usize },
    /// Projectile by entity ID
    Projectile { id: u32 },
}

/// One landed hit
#[derive(Debug, Clone, Serialize)]
pub struct HitEvent {
    pub source: HitSource,
    pub weapon: WeaponKind,
    /// Damage actually removed from the target
    pub damage: f32,
    pub pos: Vec2,
    pub critical: bool,
    pub knocked_out: bool,
}

/// Which checks a resolve pass runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePass {
    /// Body contact, swing and projectiles
    Running,
    /// Attacker body is frozen; only the attacks keep landing
    Frozen,
}

/// Ball impact damage from speed at first contact
///
/// Slow touches still deal the minimum; fast throws scale linearly to the cap.
pub fn ball_damage(speed: f32) -> f32 {
    if !speed.is_finite() || speed < BALL_MIN_IMPACT_SPEED {
        return BALL_MIN_DAMAGE;
    }
    let t = (speed - BALL_MIN_IMPACT_SPEED) / (BALL_MAX_IMPACT_SPEED - BALL_MIN_IMPACT_SPEED);
    (BALL_MIN_DAMAGE + t * (BALL_MAX_DAMAGE - BALL_MIN_DAMAGE)).clamp(BALL_MIN_DAMAGE, BALL_MAX_DAMAGE)
}

/// Freeze length for `damage` dealt by `weapon`, floored and capped
pub fn hit_stop_ticks(settings: &Settings, weapon: WeaponKind, damage: f32) -> u32 {
    settings
        .hit_stop_curve(weapon)
        .ticks_for(damage)
        .clamp(settings.min_hit_stop_ticks, MAX_HIT_STOP_TICKS)
}

/// Shake amplitude for a hit of `damage`
pub fn shake_for(settings: &Settings, damage: f32) -> f32 {
    settings.shake_intensity * (1.0 + damage.max(0.0) / SHAKE_DAMAGE_SCALE)
}

/// Apply one hit and record it; false if the target could not take it
fn land(
    target: &mut Target,
    hits: &mut Vec<HitEvent>,
    source: HitSource,
    weapon: WeaponKind,
    amount: f32,
    pos: Vec2,
    critical: bool,
) -> bool {
    // Harmless contact still stops the projectile but is not a hit
    if amount <= 0.0 {
        return target.hittable();
    }
    let Some(applied) = target.apply_damage(amount) else {
        return false;
    };

    log::debug!(
        "{weapon} hit for {:.1} ({:?}) hp={:.1}",
        applied.dealt,
        source,
        target.hp
    );
    if applied.knocked_out {
        log::info!("Target knocked out by {weapon}");
    }

    hits.push(HitEvent {
        source,
        weapon,
        damage: applied.dealt,
        pos,
        critical,
        knocked_out: applied.knocked_out,
    });
    true
}

/// Attacker body against the target
///
/// The body is pushed out of overlap every tick; only the Ball deals damage,
/// and only on the first tick of a contact.
fn resolve_body(state: &mut SimulationState, hits: &mut Vec<HitEvent>) {
    let attacker = &mut state.attacker;
    let target = &mut state.target;

    if !target.visible {
        attacker.in_contact = false;
        return;
    }

    let contact = circle_circle(attacker.pos, attacker.radius, target.pos, target.radius);
    if !contact.hit {
        attacker.in_contact = false;
        return;
    }

    if !attacker.in_contact && matches!(attacker.weapon, WeaponState::Ball) {
        let damage = ball_damage(attacker.vel.length());
        land(
            target,
            hits,
            HitSource::Ball,
            WeaponKind::Ball,
            damage,
            contact.point,
            damage >= BALL_MAX_DAMAGE,
        );
    }
    attacker.in_contact = true;

    attacker.pos += contact.normal * contact.penetration;
    if !attacker.dragging && attacker.vel.dot(contact.normal) < 0.0 {
        attacker.vel = reflect_velocity(attacker.vel, contact.normal) * BOUNCE;
    }
}

/// Active sword swing against the target, one hit per phase
fn resolve_swing(state: &mut SimulationState, hits: &mut Vec<HitEvent>) {
    let damage = state.settings.sword.damage();
    let attacker = &mut state.attacker;
    let pivot = attacker.pos;

    let WeaponState::Sword { swing: Some(swing) } = &mut attacker.weapon else {
        return;
    };
    if swing.elapsed == 0 {
        return;
    }

    let phase = swing.phase();
    if swing.phase_hits[phase] {
        return;
    }

    let target = &mut state.target;
    if !swing.sector(pivot).touches_circle(target.pos, target.radius) {
        return;
    }

    let pos = target.pos + (pivot - target.pos).normalize_or_zero() * target.radius;
    let critical = phase == SWORD_PHASES - 1;
    if land(
        target,
        hits,
        HitSource::Sword { phase },
        WeaponKind::Sword,
        damage,
        pos,
        critical,
    ) {
        swing.phase_hits[phase] = true;
    }
}

/// Live projectiles against the target
fn resolve_projectiles(state: &mut SimulationState, hits: &mut Vec<HitEvent>) {
    let settings = &state.settings;
    let target = &mut state.target;

    for projectile in state.projectiles.iter_mut() {
        if !target.hittable() {
            break;
        }
        if !projectile.alive {
            continue;
        }

        let source = HitSource::Projectile { id: projectile.id };
        let weapon = projectile.weapon();
        let angle = projectile.angle();
        let tail = projectile.tail();

        match &mut projectile.body {
            ProjectileBody::Pellet { radius } => {
                let contact = circle_circle(projectile.pos, *radius, target.pos, target.radius);
                if contact.hit
                    && land(
                        target,
                        hits,
                        source,
                        weapon,
                        settings.shotgun.pellet_damage,
                        contact.point,
                        false,
                    )
                {
                    projectile.alive = false;
                }
            }
            ProjectileBody::Bolt { radius, .. } => {
                let Some(pos) =
                    segment_circle(tail, projectile.pos, *radius, target.pos, target.radius)
                else {
                    continue;
                };
                if land(
                    target,
                    hits,
                    source,
                    weapon,
                    settings.laser.damage,
                    pos,
                    true,
                ) {
                    projectile.alive = false;
                }
            }
            ProjectileBody::Beam {
                half_extents,
                hits: landed,
                hit_cooldown,
            } => {
                if *landed >= GIANT_BEAM_MAX_HITS || *hit_cooldown > 0 {
                    continue;
                }
                let Some(pos) = rotated_rect_circle(
                    projectile.pos,
                    *half_extents,
                    angle,
                    target.pos,
                    target.radius,
                ) else {
                    continue;
                };
                if land(
                    target,
                    hits,
                    source,
                    weapon,
                    settings.beam.damage_per_hit,
                    pos,
                    false,
                ) {
                    *landed += 1;
                    *hit_cooldown = GIANT_BEAM_HIT_INTERVAL;
                }
            }
        }
    }
}

/// Arm the freeze for this tick's hits
///
/// A knockout wins outright; otherwise the tick's total damage goes through
/// the weapon's curve. A running knockout freeze is never replaced.
pub fn arm_hit_stop(state: &mut SimulationState, hits: &[HitEvent]) {
    if hits.is_empty() || (state.hit_stop.knockout && state.hit_stop.is_active()) {
        return;
    }

    if hits.iter().any(|h| h.knocked_out) {
        let shake = state.settings.shake_intensity * KO_SHAKE_SCALE;
        state.hit_stop.arm(KO_HIT_STOP_TICKS, shake, true);
        return;
    }

    let weapon = hits[0].weapon;
    let total: f32 = hits.iter().map(|h| h.damage).sum();
    let heaviest = hits.iter().map(|h| h.damage).fold(0.0, f32::max);

    let ticks = hit_stop_ticks(&state.settings, weapon, total);
    let shake = shake_for(&state.settings, heaviest);
    log::trace!("Hit-stop armed: {ticks} ticks, shake {shake:.1}");
    state.hit_stop.arm(ticks, shake, false);
}

/// Run one resolve pass and apply its consequences
///
/// Returns the hits landed, in resolution order.
pub fn resolve(state: &mut SimulationState, pass: ResolvePass) -> Vec<HitEvent> {
    let mut hits = Vec::new();

    if pass == ResolvePass::Running {
        resolve_body(state, &mut hits);
    }
    resolve_swing(state, &mut hits);
    resolve_projectiles(state, &mut hits);

    for hit in &hits {
        state.spawn_hit_effects(hit);
    }
    arm_hit_stop(state, &hits);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::Projectile;
    use proptest::prelude::*;

    fn state_with(weapon: WeaponKind) -> SimulationState {
        SimulationState::new(Settings::for_weapon(weapon))
    }

    #[test]
    fn test_ball_damage_curve() {
        assert_eq!(ball_damage(0.0), BALL_MIN_DAMAGE);
        assert_eq!(ball_damage(1.9), BALL_MIN_DAMAGE);
        assert_eq!(ball_damage(BALL_MIN_IMPACT_SPEED), BALL_MIN_DAMAGE);
        assert_eq!(ball_damage(BALL_MAX_IMPACT_SPEED), BALL_MAX_DAMAGE);
        assert_eq!(ball_damage(1000.0), BALL_MAX_DAMAGE);
        let mid = ball_damage(13.5);
        assert!((mid - 27.5).abs() < 1e-3);
    }

    #[test]
    fn test_slow_ball_contact_hits_once_at_floor_freeze() {
        let mut state = state_with(WeaponKind::Ball);
        state.attacker.pos = state.target.pos - Vec2::new(50.0, 0.0);

        let hits = resolve(&mut state, ResolvePass::Running);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].damage, BALL_MIN_DAMAGE);
        assert_eq!(state.target.hp, 95.0);
        assert_eq!(state.hit_stop.remaining, state.settings.min_hit_stop_ticks);

        // Still touching: no second hit until contact breaks
        state.attacker.pos = state.target.pos - Vec2::new(50.0, 0.0);
        assert!(resolve(&mut state, ResolvePass::Running).is_empty());

        state.attacker.pos = Vec2::new(100.0, 100.0);
        assert!(resolve(&mut state, ResolvePass::Running).is_empty());
        state.attacker.pos = state.target.pos - Vec2::new(50.0, 0.0);
        assert_eq!(resolve(&mut state, ResolvePass::Running).len(), 1);
    }

    #[test]
    fn test_body_is_pushed_out_of_target() {
        let mut state = state_with(WeaponKind::Sword);
        state.attacker.pos = state.target.pos - Vec2::new(30.0, 0.0);
        state.attacker.vel = Vec2::new(5.0, 0.0);

        let hits = resolve(&mut state, ResolvePass::Running);
        assert!(hits.is_empty(), "only the ball damages on contact");
        let gap = (state.attacker.pos - state.target.pos).length();
        assert!((gap - (ATTACKER_RADIUS + TARGET_RADIUS)).abs() < 1e-3);
        assert!(state.attacker.vel.x < 0.0);
    }

    #[test]
    fn test_shotgun_volley_lands_every_pellet() {
        let mut state = state_with(WeaponKind::Shotgun);
        for _ in 0..SHOTGUN_PELLETS {
            state.spawn(Projectile::pellet(state.target.pos, 0.0));
        }
        state.merge_pending();

        let hits = resolve(&mut state, ResolvePass::Running);
        assert_eq!(hits.len(), SHOTGUN_PELLETS);
        let total: f32 = hits.iter().map(|h| h.damage).sum();
        assert_eq!(total, 96.0);
        assert_eq!(state.target.hp, 4.0);
        assert!(state.projectiles.iter().all(|p| !p.alive));
        // floor(96 / 2.5)
        assert_eq!(state.hit_stop.remaining, 38);
    }

    #[test]
    fn test_knockout_clamps_and_arms_long_freeze() {
        let mut state = state_with(WeaponKind::Laser);
        state.target.hp = 5.0;
        state.spawn(Projectile::bolt(state.target.pos, 0.0, 0));
        state.spawn(Projectile::bolt(state.target.pos, 0.0, 0));
        state.merge_pending();

        let hits = resolve(&mut state, ResolvePass::Running);
        assert_eq!(hits.len(), 1, "second bolt finds a knocked-out target");
        assert_eq!(hits[0].damage, 5.0);
        assert!(hits[0].knocked_out);
        assert_eq!(state.target.hp, 0.0);
        assert_eq!(state.hit_stop.remaining, KO_HIT_STOP_TICKS);
        assert!(state.hit_stop.knockout);
        assert!(state.target.visible);
    }

    #[test]
    fn test_beam_respects_hit_interval() {
        let mut state = state_with(WeaponKind::GiantBeam);
        state.target.infinite = true;
        state.spawn(Projectile::beam(state.target.pos, 0.0));
        state.merge_pending();

        assert_eq!(resolve(&mut state, ResolvePass::Frozen).len(), 1);
        assert!(resolve(&mut state, ResolvePass::Frozen).is_empty());
    }

    #[test]
    fn test_invisible_target_takes_nothing() {
        let mut state = state_with(WeaponKind::Shotgun);
        state.target.visible = false;
        state.spawn(Projectile::pellet(state.target.pos, 0.0));
        state.merge_pending();

        assert!(resolve(&mut state, ResolvePass::Running).is_empty());
        assert!(state.projectiles[0].alive);
        assert!(!state.hit_stop.is_active());
    }

    #[test]
    fn test_harmless_pellet_does_not_freeze() {
        let mut settings = Settings::for_weapon(WeaponKind::Shotgun);
        settings.shotgun.pellet_damage = 0.0;
        let mut state = SimulationState::new(settings);
        state.spawn(Projectile::pellet(state.target.pos, 0.0));
        state.merge_pending();

        assert!(resolve(&mut state, ResolvePass::Running).is_empty());
        assert!(!state.projectiles[0].alive);
        assert!(!state.hit_stop.is_active());
        assert!(state.effects.popups.is_empty());
        assert_eq!(state.target.hp, state.target.max_hp);
    }

    #[test]
    fn test_projectile_hits_report_their_weapon() {
        let mut state = state_with(WeaponKind::GiantBeam);
        state.target.infinite = true;
        state.spawn(Projectile::beam(state.target.pos, 0.0));
        state.merge_pending();

        let hits = resolve(&mut state, ResolvePass::Running);
        assert_eq!(hits[0].weapon, WeaponKind::GiantBeam);
    }

    proptest! {
        #[test]
        fn prop_ball_damage_monotonic_and_bounded(a in 0.0f32..100.0, b in 0.0f32..100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ball_damage(lo) <= ball_damage(hi));
            prop_assert!(ball_damage(hi) <= BALL_MAX_DAMAGE);
            prop_assert!(ball_damage(lo) >= BALL_MIN_DAMAGE);
        }

        #[test]
        fn prop_freeze_within_floor_and_cap(damage in 0.0f32..10_000.0) {
            let settings = Settings::default();
            for weapon in WeaponKind::ALL {
                let ticks = hit_stop_ticks(&settings, weapon, damage);
                prop_assert!(ticks >= settings.min_hit_stop_ticks);
                prop_assert!(ticks <= MAX_HIT_STOP_TICKS);
            }
        }
    }
}
