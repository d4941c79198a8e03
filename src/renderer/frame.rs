//! Snapshot → draw commands
//!
//! Building a frame reads the snapshot and nothing else, so the same
//! snapshot always yields the same frame. Commands come out back to front.

use glam::Vec2;
use serde::Serialize;

use super::vertex::colors;
use crate::consts::*;
use crate::direction;
use crate::settings::WeaponKind;
use crate::sim::effects::Tint;
use crate::sim::{Attacker, ProjectileBody, Snapshot, Target, WeaponState};

pub type Color = [f32; 4];

/// Grid spacing in arena pixels
const GRID_SPACING: f32 = 50.0;
/// Hit-stop ring growth per frozen tick
const RING_GROWTH: f32 = 3.0;
const HP_BAR_HEIGHT: f32 = 8.0;
const HP_BAR_GAP: f32 = 14.0;

/// Draw order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Background,
    Target,
    Attacker,
    Projectiles,
    Effects,
    HitStopRing,
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DrawCommand {
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Ring {
        center: Vec2,
        inner: f32,
        outer: f32,
        color: Color,
    },
    /// Rectangle rotated by `angle` around its centre
    Rect {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
        color: Color,
    },
    /// Annular band between two radii over an angular span
    Sector {
        pivot: Vec2,
        inner: f32,
        outer: f32,
        theta_start: f32,
        span: f32,
        color: Color,
    },
    /// Left to the host overlay; not tessellated
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    pub layer: Layer,
    pub command: DrawCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Whole-frame translation (screen shake)
    pub translate: Vec2,
    pub clear: Color,
    pub items: Vec<DrawItem>,
}

impl Frame {
    fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.items.push(DrawItem { layer, command });
    }

    /// Commands on one layer, in draw order
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.items
            .iter()
            .filter(move |item| item.layer == layer)
            .map(|item| &item.command)
    }
}

/// Build the frame for a snapshot
pub fn build_frame(snapshot: &Snapshot) -> Frame {
    let mut frame = Frame {
        translate: snapshot.screen_shake,
        clear: colors::BACKGROUND,
        items: Vec::new(),
    };

    grid(&mut frame);
    target(&mut frame, snapshot);
    attacker(&mut frame, &snapshot.attacker);
    projectiles(&mut frame, snapshot);
    effects(&mut frame, snapshot);
    hit_stop_ring(&mut frame, snapshot);

    if snapshot.respawn_available {
        frame.push(
            Layer::Overlay,
            DrawCommand::Text {
                pos: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
                text: "RESPAWN".to_string(),
                size: 36.0,
                color: colors::RESPAWN,
            },
        );
    }

    frame
}

fn grid(frame: &mut Frame) {
    let mut x = 0.0;
    while x <= ARENA_WIDTH {
        frame.push(
            Layer::Background,
            DrawCommand::Line {
                from: Vec2::new(x, 0.0),
                to: Vec2::new(x, ARENA_HEIGHT),
                width: 1.0,
                color: colors::GRID,
            },
        );
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= ARENA_HEIGHT {
        frame.push(
            Layer::Background,
            DrawCommand::Line {
                from: Vec2::new(0.0, y),
                to: Vec2::new(ARENA_WIDTH, y),
                width: 1.0,
                color: colors::GRID,
            },
        );
        y += GRID_SPACING;
    }
}

/// Green at full HP through yellow to red
pub fn hp_color(fraction: f32) -> Color {
    if fraction > 0.5 {
        colors::mix(colors::HP_HALF, colors::HP_FULL, (fraction - 0.5) * 2.0)
    } else {
        colors::mix(colors::HP_LOW, colors::HP_HALF, fraction * 2.0)
    }
}

fn target(frame: &mut Frame, snapshot: &Snapshot) {
    let target: &Target = &snapshot.target;
    if !target.visible {
        return;
    }

    let body = if target.ko_in_progress {
        colors::TARGET_DOWN
    } else if snapshot.hit_stop.remaining > 0 {
        colors::TARGET_STRUCK
    } else {
        colors::TARGET
    };
    let pos = target.draw_pos();
    frame.push(
        Layer::Target,
        DrawCommand::Circle {
            center: pos,
            radius: target.radius,
            color: body,
        },
    );
    // Belt across the body shows the recoil tilt
    frame.push(
        Layer::Target,
        DrawCommand::Rect {
            center: pos,
            half_extents: Vec2::new(target.radius * 0.9, 4.0),
            angle: target.recoil.angle(),
            color: colors::TARGET_BELT,
        },
    );

    // HP bar sits above the body and shakes with it
    let bar_center = pos - Vec2::new(0.0, target.radius + HP_BAR_GAP);
    let half = Vec2::new(target.radius, HP_BAR_HEIGHT / 2.0);
    frame.push(
        Layer::Target,
        DrawCommand::Rect {
            center: bar_center,
            half_extents: half,
            angle: 0.0,
            color: colors::HP_BAR_BG,
        },
    );

    if target.infinite {
        frame.push(
            Layer::Target,
            DrawCommand::Rect {
                center: bar_center,
                half_extents: half,
                angle: 0.0,
                color: colors::INFINITE,
            },
        );
        frame.push(
            Layer::Target,
            DrawCommand::Text {
                pos: bar_center - Vec2::new(0.0, 14.0),
                text: "∞".to_string(),
                size: 20.0,
                color: colors::INFINITE,
            },
        );
        return;
    }

    let fraction = target.hp_fraction();
    if fraction > 0.0 {
        let width = half.x * fraction;
        frame.push(
            Layer::Target,
            DrawCommand::Rect {
                center: Vec2::new(bar_center.x - half.x + width, bar_center.y),
                half_extents: Vec2::new(width, half.y),
                angle: 0.0,
                color: hp_color(fraction),
            },
        );
    }
}

fn attacker(frame: &mut Frame, attacker: &Attacker) {
    let pos = attacker.pos + attacker.shake_offset;
    let facing = attacker.facing;
    let aim = direction(facing);

    match &attacker.weapon {
        WeaponState::Ball => {}
        WeaponState::Sword { swing } => {
            let tip = swing
                .as_ref()
                .map_or(pos + aim * SWORD_REACH, |s| s.blade_tip(pos));
            frame.push(
                Layer::Attacker,
                DrawCommand::Line {
                    from: pos,
                    to: tip,
                    width: 5.0,
                    color: colors::BLADE,
                },
            );
        }
        WeaponState::Shotgun { .. } => {
            frame.push(
                Layer::Attacker,
                DrawCommand::Rect {
                    center: pos + aim * (attacker.radius + 8.0),
                    half_extents: Vec2::new(14.0, 5.0),
                    angle: facing,
                    color: colors::BARREL,
                },
            );
        }
        WeaponState::Laser { .. } => {
            let tip = pos + aim * (attacker.radius + 14.0);
            frame.push(
                Layer::Attacker,
                DrawCommand::Line {
                    from: pos,
                    to: tip,
                    width: 4.0,
                    color: colors::BARREL,
                },
            );
            frame.push(
                Layer::Attacker,
                DrawCommand::Circle {
                    center: tip,
                    radius: 4.0,
                    color: colors::LASER,
                },
            );
        }
        WeaponState::GiantBeam { .. } => {
            frame.push(
                Layer::Attacker,
                DrawCommand::Rect {
                    center: pos + aim * (attacker.radius + 4.0),
                    half_extents: Vec2::new(12.0, 16.0),
                    angle: facing,
                    color: colors::BARREL,
                },
            );
        }
    }

    frame.push(
        Layer::Attacker,
        DrawCommand::Circle {
            center: pos,
            radius: attacker.radius,
            color: colors::ATTACKER,
        },
    );

    if attacker.dragging {
        frame.push(
            Layer::Attacker,
            DrawCommand::Ring {
                center: pos,
                inner: attacker.radius + 3.0,
                outer: attacker.radius + 5.0,
                color: colors::GRAB_RING,
            },
        );
    }
}

fn projectiles(frame: &mut Frame, snapshot: &Snapshot) {
    for projectile in snapshot.projectiles.iter().filter(|p| p.alive) {
        match projectile.body {
            ProjectileBody::Pellet { radius } => frame.push(
                Layer::Projectiles,
                DrawCommand::Circle {
                    center: projectile.pos,
                    radius,
                    color: colors::PELLET,
                },
            ),
            ProjectileBody::Bolt { radius, .. } => {
                let tail = projectile.tail();
                frame.push(
                    Layer::Projectiles,
                    DrawCommand::Line {
                        from: tail,
                        to: projectile.pos,
                        width: radius * 2.0,
                        color: colors::LASER,
                    },
                );
                frame.push(
                    Layer::Projectiles,
                    DrawCommand::Line {
                        from: tail,
                        to: projectile.pos,
                        width: radius * 0.8,
                        color: colors::LASER_CORE,
                    },
                );
            }
            ProjectileBody::Beam { half_extents, .. } => {
                let angle = projectile.angle();
                frame.push(
                    Layer::Projectiles,
                    DrawCommand::Rect {
                        center: projectile.pos,
                        half_extents,
                        angle,
                        color: colors::BEAM,
                    },
                );
                frame.push(
                    Layer::Projectiles,
                    DrawCommand::Rect {
                        center: projectile.pos,
                        half_extents: half_extents * Vec2::new(1.0, 0.4),
                        angle,
                        color: colors::BEAM_CORE,
                    },
                );
            }
        }
    }
}

pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Impact => colors::IMPACT,
        Tint::Critical => colors::CRITICAL,
        Tint::Steel => colors::STEEL,
        Tint::Pellet => colors::PELLET,
        Tint::Laser => colors::LASER,
        Tint::Beam => colors::BEAM_CORE,
    }
}

fn effects(frame: &mut Frame, snapshot: &Snapshot) {
    let effects = &snapshot.effects;

    for slash in &effects.slashes {
        frame.push(
            Layer::Effects,
            DrawCommand::Sector {
                pivot: slash.sector.pivot,
                inner: slash.sector.reach * 0.55,
                outer: slash.sector.reach,
                theta_start: slash.sector.theta_start,
                span: slash.sector.angular_span(),
                color: colors::fade(colors::STEEL, slash.life * 0.5),
            },
        );
    }

    for flash in &effects.flashes {
        frame.push(
            Layer::Effects,
            DrawCommand::Circle {
                center: flash.pos,
                radius: flash.radius,
                color: colors::fade(tint_color(flash.tint), flash.life * 0.7),
            },
        );
    }

    for p in &effects.particles {
        frame.push(
            Layer::Effects,
            DrawCommand::Circle {
                center: p.pos,
                radius: p.size,
                color: colors::fade(tint_color(p.tint), p.life),
            },
        );
    }

    for popup in &effects.popups {
        let (size, color) = if popup.critical {
            (26.0, colors::CRITICAL)
        } else {
            (18.0, colors::TEXT)
        };
        frame.push(
            Layer::Effects,
            DrawCommand::Text {
                pos: popup.pos,
                text: format!("{:.0}", popup.amount),
                size,
                color: colors::fade(color, popup.life),
            },
        );
    }
}

/// Expanding ring around the target while frozen
pub fn hit_stop_ring_radius(target_radius: f32, elapsed: u32) -> f32 {
    target_radius + 6.0 + elapsed as f32 * RING_GROWTH
}

fn hit_stop_ring(frame: &mut Frame, snapshot: &Snapshot) {
    let hit_stop = &snapshot.hit_stop;
    if hit_stop.remaining == 0 || !snapshot.target.visible {
        return;
    }

    let elapsed = hit_stop.elapsed();
    let radius = hit_stop_ring_radius(snapshot.target.radius, elapsed);
    let fade = 1.0 - elapsed as f32 / hit_stop.duration.max(1) as f32;
    let color = if hit_stop.knockout {
        colors::KO_RING
    } else {
        colors::HIT_STOP_RING
    };

    frame.push(
        Layer::HitStopRing,
        DrawCommand::Ring {
            center: snapshot.target.base_pos,
            inner: radius,
            outer: radius + 3.0,
            color: colors::fade(color, fade.max(0.15)),
        },
    );
}

/// Short weapon label for HUDs
pub fn weapon_label(weapon: WeaponKind) -> &'static str {
    match weapon {
        WeaponKind::Ball => "Ball",
        WeaponKind::Sword => "Sword",
        WeaponKind::Shotgun => "Shotgun",
        WeaponKind::Laser => "Laser",
        WeaponKind::GiantBeam => "Giant Beam",
    }
}
