//! Platform abstraction layer
//!
//! Mouse and touch normalization for the web host (native hosts feed
//! pointer events directly).

pub mod input;

pub use input::{CanvasMapping, InputRouter, PointerEvent, PointerKind};
