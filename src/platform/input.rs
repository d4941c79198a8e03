//! Input router
//!
//! Mouse and touch arrive as the same three pointer events. The router turns
//! them into ordered simulation intents and hands a batch to each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::sim::{Intent, TickInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event already in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pos: Vec2,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn down(pos: Vec2) -> Self {
        Self {
            pos,
            kind: PointerKind::Down,
        }
    }

    pub fn moved(pos: Vec2) -> Self {
        Self {
            pos,
            kind: PointerKind::Move,
        }
    }

    pub fn up(pos: Vec2) -> Self {
        Self {
            pos,
            kind: PointerKind::Up,
        }
    }
}

/// Maps client (page) coordinates onto the arena
///
/// The canvas may be scaled by CSS; `size` is its displayed size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    /// Top-left of the canvas in client coordinates
    pub origin: Vec2,
    /// Displayed size in client pixels
    pub size: Vec2,
}

impl CanvasMapping {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }

    pub fn to_arena(&self, client_x: f32, client_y: f32) -> Vec2 {
        let local = Vec2::new(client_x, client_y) - self.origin;
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return local;
        }
        local / self.size * Vec2::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

/// Buffers intents between ticks
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    pending: Vec<Intent>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one pointer event
    ///
    /// Consecutive moves collapse into the latest one. A release also moves
    /// the pointer to where it was lifted.
    pub fn pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerKind::Down => self.pending.push(Intent::Press(event.pos)),
            PointerKind::Move => self.aim(event.pos),
            PointerKind::Up => {
                self.aim(event.pos);
                self.pending.push(Intent::Release);
            }
        }
    }

    fn aim(&mut self, pos: Vec2) {
        if let Some(Intent::Aim(last)) = self.pending.last_mut() {
            *last = pos;
        } else {
            self.pending.push(Intent::Aim(pos));
        }
    }

    /// Queue a direct command
    pub fn push(&mut self, intent: Intent) {
        self.pending.push(intent);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drain everything queued since the last tick
    pub fn take(&mut self) -> TickInput {
        TickInput {
            intents: std::mem::take(&mut self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_coalesce() {
        let mut router = InputRouter::new();
        router.pointer(PointerEvent::moved(Vec2::new(1.0, 1.0)));
        router.pointer(PointerEvent::moved(Vec2::new(2.0, 2.0)));
        router.pointer(PointerEvent::moved(Vec2::new(3.0, 3.0)));

        let input = router.take();
        assert_eq!(input.intents, vec![Intent::Aim(Vec2::new(3.0, 3.0))]);
        assert!(router.is_empty());
    }

    #[test]
    fn test_press_and_release_keep_order() {
        let mut router = InputRouter::new();
        router.pointer(PointerEvent::down(Vec2::new(10.0, 10.0)));
        router.pointer(PointerEvent::moved(Vec2::new(20.0, 10.0)));
        router.pointer(PointerEvent::up(Vec2::new(30.0, 10.0)));

        assert_eq!(
            router.take().intents,
            vec![
                Intent::Press(Vec2::new(10.0, 10.0)),
                Intent::Aim(Vec2::new(30.0, 10.0)),
                Intent::Release,
            ]
        );
    }

    #[test]
    fn test_canvas_mapping_scales_to_arena() {
        let mapping = CanvasMapping::new(100.0, 50.0, 400.0, 250.0);
        assert_eq!(mapping.to_arena(100.0, 50.0), Vec2::ZERO);
        assert_eq!(
            mapping.to_arena(500.0, 300.0),
            Vec2::new(ARENA_WIDTH, ARENA_HEIGHT)
        );
    }
}
