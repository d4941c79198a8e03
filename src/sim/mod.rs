//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, spawns merged at tick end)
//! - No rendering or platform dependencies

pub mod arc;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod physics;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod weapon;

pub use arc::ArcSector;
pub use combat::{HitEvent, HitSource, ball_damage, hit_stop_ticks};
pub use effects::{Effects, Tint};
pub use projectile::{Projectile, ProjectileBody};
pub use snapshot::Snapshot;
pub use state::{Attacker, HitStop, Recoil, SimulationState, Target};
pub use tick::{Intent, TickInput, TickReport, tick};
pub use weapon::{Swing, WeaponState, activate};
