//! Error types for the host boundary.
//!
//! The simulation itself never fails: invalid gameplay input is a no-op.
//! These errors surface only where a host asks for something explicitly.

use thiserror::Error;

use crate::settings::WeaponKind;

/// Result type alias using [`SandboxError`].
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors reported to the embedding host.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Settings or snapshot JSON could not be (de)serialized.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Weapon name not recognised.
    #[error("unknown weapon: {0}")]
    UnknownWeapon(String),

    /// Respawn requested while the target is still visible.
    #[error("respawn unavailable: target has not finished its knockout")]
    RespawnUnavailable,

    /// Explicit activation refused by the active weapon.
    #[error("{weapon} cannot fire: {reason}")]
    WeaponUnavailable {
        /// Active weapon.
        weapon: WeaponKind,
        /// Why the activation was refused.
        reason: &'static str,
    },
}
