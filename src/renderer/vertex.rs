//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for sandbox elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.04, 0.04, 0.07, 1.0];
    pub const GRID: [f32; 4] = [0.15, 0.15, 0.22, 1.0];

    pub const TARGET: [f32; 4] = [0.85, 0.3, 0.3, 1.0];
    pub const TARGET_STRUCK: [f32; 4] = [1.0, 0.85, 0.85, 1.0];
    pub const TARGET_DOWN: [f32; 4] = [0.35, 0.25, 0.25, 1.0];
    pub const TARGET_BELT: [f32; 4] = [0.45, 0.12, 0.12, 1.0];
    pub const HP_BAR_BG: [f32; 4] = [0.1, 0.1, 0.12, 0.9];
    pub const HP_FULL: [f32; 4] = [0.2, 0.85, 0.35, 1.0];
    pub const HP_HALF: [f32; 4] = [0.95, 0.85, 0.2, 1.0];
    pub const HP_LOW: [f32; 4] = [0.95, 0.2, 0.15, 1.0];
    pub const INFINITE: [f32; 4] = [0.4, 0.7, 1.0, 1.0];

    pub const ATTACKER: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
    pub const GRAB_RING: [f32; 4] = [1.0, 1.0, 1.0, 0.6];
    pub const BLADE: [f32; 4] = [0.85, 0.88, 0.95, 1.0];
    pub const BARREL: [f32; 4] = [0.55, 0.55, 0.6, 1.0];

    pub const PELLET: [f32; 4] = [1.0, 0.8, 0.3, 1.0];
    pub const LASER: [f32; 4] = [1.0, 0.2, 0.4, 1.0];
    pub const LASER_CORE: [f32; 4] = [1.0, 0.85, 0.9, 1.0];
    pub const BEAM: [f32; 4] = [0.3, 0.9, 1.0, 0.45];
    pub const BEAM_CORE: [f32; 4] = [0.85, 1.0, 1.0, 0.8];

    pub const IMPACT: [f32; 4] = [1.0, 0.95, 0.7, 1.0];
    pub const CRITICAL: [f32; 4] = [1.0, 0.45, 0.1, 1.0];
    pub const STEEL: [f32; 4] = [0.8, 0.85, 1.0, 1.0];

    pub const HIT_STOP_RING: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const KO_RING: [f32; 4] = [1.0, 0.25, 0.2, 1.0];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const RESPAWN: [f32; 4] = [1.0, 0.9, 0.4, 1.0];

    /// Same color with alpha scaled by `alpha`
    pub fn fade(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
    }

    /// Linear blend from `a` to `b`
    pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        std::array::from_fn(|i| a[i] * (1.0 - t) + b[i] * t)
    }
}
