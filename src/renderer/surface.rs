//! 2D drawing surface
//!
//! Games paint through the `Surface` trait in playfield pixels (origin top
//! left, y down). `DrawList` records the calls; the GPU backend tessellates
//! the recording and tests inspect it directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA colour, components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Shared UI colours
pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color::WHITE;
    pub const HUD_DIM: Color = Color::hex(0xa1a1aa);
    pub const OVERLAY: Color = Color::rgba(0.0, 0.0, 0.0, 0.8);
    pub const PROMPT: Color = Color::hex(0x4ade80);
    pub const GAME_OVER: Color = Color::hex(0xff4444);
    pub const STAR: Color = Color::WHITE;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// `pos` is the top-left corner
    Left,
    /// `pos` is the top-centre
    Center,
}

/// Immediate-mode 2D drawing
pub trait Surface {
    /// Playfield size in pixels
    fn size(&self) -> Vec2;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    /// Filled polygon, fan-triangulated from the first point
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Closed polygon outline
    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Color);

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color);

    /// Text with cap height `size`
    fn text(&mut self, pos: Vec2, size: f32, align: TextAlign, color: Color, text: &str);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    Line {
        a: Vec2,
        b: Vec2,
        width: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        size: f32,
        align: TextAlign,
        color: Color,
        text: String,
    },
}

/// Recording surface
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop the recording but keep the allocation for the next frame
    pub fn reset(&mut self, size: Vec2) {
        self.size = size;
        self.commands.clear();
    }

    /// Background colour of the last `clear`, if any
    pub fn clear_color(&self) -> Option<Color> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            DrawCmd::Clear(color) => Some(*color),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    /// Number of filled shapes drawn in exactly `color`
    pub fn count_fills(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|cmd| match cmd {
                DrawCmd::FillRect { color: c, .. }
                | DrawCmd::FillCircle { color: c, .. }
                | DrawCmd::FillPolygon { color: c, .. } => *c == color,
                _ => false,
            })
            .count()
    }
}

impl Surface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(DrawCmd::FillRect { x, y, w, h, color });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: Color) {
        self.commands.push(DrawCmd::StrokeRect {
            x,
            y,
            w,
            h,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCmd::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.commands.push(DrawCmd::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() >= 3 {
            self.commands.push(DrawCmd::FillPolygon {
                points: points.to_vec(),
                color,
            });
        }
    }

    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() >= 2 {
            self.commands.push(DrawCmd::StrokePolygon {
                points: points.to_vec(),
                width,
                color,
            });
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCmd::Line { a, b, width, color });
    }

    fn text(&mut self, pos: Vec2, size: f32, align: TextAlign, color: Color, text: &str) {
        if !text.is_empty() {
            self.commands.push(DrawCmd::Text {
                pos,
                size,
                align,
                color,
                text: text.to_string(),
            });
        }
    }
}

/// Deterministic backdrop stars scattered with golden-ish strides
pub fn starfield(surface: &mut dyn Surface, count: u32, color: Color) {
    let size = surface.size();
    for i in 0..count {
        let x = (i as f32 * 137.5) % size.x;
        let y = (i as f32 * 241.3) % size.y;
        let s = if i % 3 == 0 { 2.0 } else { 1.0 };
        surface.fill_rect(x, y, s, s, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        let c = Color::hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.with_alpha(0.5).a, 0.5);
    }

    #[test]
    fn test_clear_discards_earlier_commands() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        list.fill_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);
        list.clear(Color::BLACK);
        assert_eq!(list.len(), 1);
        assert_eq!(list.clear_color(), Some(Color::BLACK));
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        list.fill_polygon(&[Vec2::ZERO, Vec2::ONE], Color::WHITE);
        list.text(Vec2::ZERO, 10.0, TextAlign::Left, Color::WHITE, "");
        assert!(list.is_empty());
    }

    #[test]
    fn test_starfield_stays_on_screen() {
        let mut list = DrawList::new(Vec2::new(900.0, 600.0));
        starfield(&mut list, 150, colors::STAR);
        assert_eq!(list.len(), 150);
        for cmd in list.commands() {
            if let DrawCmd::FillRect { x, y, .. } = cmd {
                assert!(*x >= 0.0 && *x < 900.0);
                assert!(*y >= 0.0 && *y < 600.0);
            }
        }
    }
}
