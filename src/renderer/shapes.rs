//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in arena coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::frame::{DrawCommand, Frame};
use super::vertex::Vertex;

/// Segments for a circle of the given radius
fn circle_segments(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(8, 48)
}

fn push_quad(vertices: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));

    vertices.push(Vertex::new(c.x, c.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(d.x, d.y, color));
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a band between two radii over an angular span
///
/// A full turn gives a ring.
pub fn band(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    theta_start: f32,
    span: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(1);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = theta_start + (i as f32 / segments as f32) * span;
        let theta2 = theta_start + ((i + 1) as f32 / segments as f32) * span;
        let (d1, d2) = (Vec2::from_angle(theta1), Vec2::from_angle(theta2));

        push_quad(
            &mut vertices,
            [
                center + d1 * inner_radius,
                center + d1 * outer_radius,
                center + d2 * inner_radius,
                center + d2 * outer_radius,
            ],
            color,
        );
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    band(center, inner_radius, outer_radius, 0.0, 2.0 * PI, color, segments)
}

/// Rectangle rotated by `angle` around its centre
pub fn rect(center: Vec2, half_extents: Vec2, angle: f32, color: [f32; 4]) -> Vec<Vertex> {
    let rot = Vec2::from_angle(angle);
    let corner = |x: f32, y: f32| center + rot.rotate(Vec2::new(x, y));
    let (hx, hy) = (half_extents.x, half_extents.y);

    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        [corner(-hx, -hy), corner(hx, -hy), corner(-hx, hy), corner(hx, hy)],
        color,
    );
    vertices
}

/// Thick line segment
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let delta = to - from;
    if delta.length_squared() < 1e-6 {
        return Vec::new();
    }
    let center = (from + to) / 2.0;
    let half = Vec2::new(delta.length() / 2.0, width / 2.0);
    rect(center, half, delta.y.atan2(delta.x), color)
}

/// Tessellate a whole frame, applying its translation
///
/// Text commands are skipped; the host draws them.
pub fn tessellate(frame: &Frame) -> Vec<Vertex> {
    let t = frame.translate;
    let mut vertices = Vec::new();

    for item in &frame.items {
        let shape = match &item.command {
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => line(*from + t, *to + t, *width, *color),
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => circle(*center + t, *radius, *color, circle_segments(*radius)),
            DrawCommand::Ring {
                center,
                inner,
                outer,
                color,
            } => ring(*center + t, *inner, *outer, *color, circle_segments(*outer)),
            DrawCommand::Rect {
                center,
                half_extents,
                angle,
                color,
            } => rect(*center + t, *half_extents, *angle, *color),
            DrawCommand::Sector {
                pivot,
                inner,
                outer,
                theta_start,
                span,
                color,
            } => {
                let segments = ((span * 8.0) as u32).max(4);
                band(*pivot + t, *inner, *outer, *theta_start, *span, *color, segments)
            }
            DrawCommand::Text { .. } => continue,
        };
        vertices.extend(shape);
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::frame::{DrawItem, Layer};

    #[test]
    fn test_rect_corners() {
        let verts = rect(Vec2::new(10.0, 10.0), Vec2::new(5.0, 2.0), 0.0, [1.0; 4]);
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [5.0, 8.0]);
        assert_eq!(verts[5].position, [15.0, 12.0]);
    }

    #[test]
    fn test_ring_segment_count() {
        assert_eq!(ring(Vec2::ZERO, 10.0, 12.0, [1.0; 4], 16).len(), 16 * 6);
    }

    #[test]
    fn test_tessellate_skips_text_and_translates() {
        let frame = Frame {
            translate: Vec2::new(3.0, 4.0),
            clear: [0.0; 4],
            items: vec![
                DrawItem {
                    layer: Layer::Target,
                    command: DrawCommand::Rect {
                        center: Vec2::ZERO,
                        half_extents: Vec2::ONE,
                        angle: 0.0,
                        color: [1.0; 4],
                    },
                },
                DrawItem {
                    layer: Layer::Overlay,
                    command: DrawCommand::Text {
                        pos: Vec2::ZERO,
                        text: "RESPAWN".into(),
                        size: 12.0,
                        color: [1.0; 4],
                    },
                },
            ],
        };

        let verts = tessellate(&frame);
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [2.0, 3.0]);
    }

    #[test]
    fn test_zero_length_line_is_empty() {
        assert!(line(Vec2::ONE, Vec2::ONE, 2.0, [1.0; 4]).is_empty());
    }
}
