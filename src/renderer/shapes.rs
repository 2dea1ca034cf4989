//! Triangle-list tessellation of recorded draw calls

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::f32::consts::PI;

use super::font;
use super::surface::{DrawCmd, DrawList, Surface, TextAlign};

/// Playfield-space vertex with straight-alpha color
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

    fn at(p: Vec2, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

pub fn push_triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::at(a, color));
    out.push(Vertex::at(b, color));
    out.push(Vertex::at(c, color));
}

/// Axis-aligned quad from `(x0, y0)` to `(x1, y1)`
pub fn push_quad(out: &mut Vec<Vertex>, x0: f32, y0: f32, x1: f32, y1: f32, color: [f32; 4]) {
    out.push(Vertex::new(x0, y0, color));
    out.push(Vertex::new(x1, y0, color));
    out.push(Vertex::new(x0, y1, color));

    out.push(Vertex::new(x0, y1, color));
    out.push(Vertex::new(x1, y0, color));
    out.push(Vertex::new(x1, y1, color));
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        push_triangle(
            out,
            center,
            center + radius * Vec2::from_angle(theta1),
            center + radius * Vec2::from_angle(theta2),
            color,
        );
    }
}

/// Hollow circle band between two radii
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

        let inner1 = center + inner_radius * d1;
        let outer1 = center + outer_radius * d1;
        let inner2 = center + inner_radius * d2;
        let outer2 = center + outer_radius * d2;

        push_triangle(out, inner1, outer1, inner2, color);
        push_triangle(out, inner2, outer1, outer2, color);
    }
}

/// Segment of the given width centred on `a -> b`
pub fn thick_line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Extend by half a width so joined outlines have no notches at corners
    let a = a - dir * width / 2.0;
    let b = b + dir * width / 2.0;
    let side = dir.perp() * width / 2.0;

    push_triangle(out, a + side, a - side, b + side, color);
    push_triangle(out, b + side, a - side, b - side, color);
}

/// Fan triangulation, exact for convex and star-shaped-from-first-point outlines
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
    if points.len() < 3 {
        return;
    }
    for pair in points[1..].windows(2) {
        push_triangle(out, points[0], pair[0], pair[1], color);
    }
}

pub fn polygon_outline(out: &mut Vec<Vertex>, points: &[Vec2], width: f32, color: [f32; 4]) {
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        thick_line(out, a, b, width, color);
    }
}

/// Outline centred on the rectangle edge
pub fn rect_outline(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, width: f32, color: [f32; 4]) {
    let hw = width / 2.0;
    push_quad(out, x - hw, y - hw, x + w + hw, y + hw, color);
    push_quad(out, x - hw, y + h - hw, x + w + hw, y + h + hw, color);
    push_quad(out, x - hw, y + hw, x + hw, y + h - hw, color);
    push_quad(out, x + w - hw, y + hw, x + w + hw, y + h - hw, color);
}

/// Convert a whole recording into one triangle list, in painter's order
pub fn tessellate(list: &DrawList, circle_segments: u32) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(list.len() * 12);
    let size = list.size();

    for cmd in list.commands() {
        match cmd {
            DrawCmd::Clear(color) => push_quad(&mut out, 0.0, 0.0, size.x, size.y, color.to_array()),
            DrawCmd::FillRect { x, y, w, h, color } => {
                push_quad(&mut out, *x, *y, x + w, y + h, color.to_array())
            }
            DrawCmd::StrokeRect {
                x,
                y,
                w,
                h,
                width,
                color,
            } => rect_outline(&mut out, *x, *y, *w, *h, *width, color.to_array()),
            DrawCmd::FillCircle {
                center,
                radius,
                color,
            } => circle(&mut out, *center, *radius, color.to_array(), circle_segments),
            DrawCmd::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => ring(
                &mut out,
                *center,
                (radius - width / 2.0).max(0.0),
                radius + width / 2.0,
                color.to_array(),
                circle_segments,
            ),
            DrawCmd::FillPolygon { points, color } => polygon(&mut out, points, color.to_array()),
            DrawCmd::StrokePolygon {
                points,
                width,
                color,
            } => polygon_outline(&mut out, points, *width, color.to_array()),
            DrawCmd::Line { a, b, width, color } => {
                thick_line(&mut out, *a, *b, *width, color.to_array())
            }
            DrawCmd::Text {
                pos,
                size,
                align,
                color,
                text,
            } => {
                let origin = match align {
                    TextAlign::Left => *pos,
                    TextAlign::Center => *pos - Vec2::new(font::measure(text, *size) / 2.0, 0.0),
                };
                font::text_quads(text, origin, *size, color.to_array(), &mut out);
            }
        }
    }

    out
}
