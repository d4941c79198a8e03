//! Rendering module
//!
//! `frame` turns a snapshot into draw commands and is usable by any host;
//! `shapes` and `pipeline` draw those commands with WebGPU.

pub mod frame;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use frame::{DrawCommand, DrawItem, Frame, Layer, build_frame};
pub use pipeline::RenderState;
pub use vertex::Vertex;
