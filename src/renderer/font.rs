//! 5x7 bitmap font for HUD and overlay text
//!
//! Each glyph is seven rows of five bits, most significant bit on the left.
//! Lowercase letters render with the uppercase glyphs.

use glam::Vec2;

use super::shapes::Vertex;

pub const GLYPH_COLS: u32 = 5;
pub const GLYPH_ROWS: u32 = 7;
/// Horizontal advance in glyph cells, including one column of spacing
const ADVANCE: f32 = 6.0;

pub fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        _ => return None,
    };
    Some(rows)
}

/// Rendered width of `text` at cap height `size`
pub fn measure(text: &str, size: f32) -> f32 {
    let cell = size / GLYPH_ROWS as f32;
    let chars = text.chars().count() as f32;
    if chars == 0.0 {
        0.0
    } else {
        (chars * ADVANCE - 1.0) * cell
    }
}

/// Append quads for `text` with its top-left corner at `origin`.
///
/// Lit pixels in a glyph row are merged into horizontal runs, one quad each.
pub fn text_quads(text: &str, origin: Vec2, size: f32, color: [f32; 4], out: &mut Vec<Vertex>) {
    let cell = size / GLYPH_ROWS as f32;
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let gx = origin.x + i as f32 * ADVANCE * cell;
        for (row, &bits) in rows.iter().enumerate() {
            let y = origin.y + row as f32 * cell;
            let mut col = 0;
            while col < GLYPH_COLS {
                if bits & (0x10 >> col) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < GLYPH_COLS && bits & (0x10 >> col) != 0 {
                    col += 1;
                }
                let x0 = gx + start as f32 * cell;
                let x1 = gx + col as f32 * cell;
                super::shapes::push_quad(out, x0, y, x1, y + cell, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_hud_character_has_a_glyph() {
        for c in "SCORE: 0123456789 LEVEL LIVES HIGH! +500 BONUS".chars() {
            assert!(c == ' ' || glyph(c).is_some(), "missing glyph {c:?}");
        }
    }

    #[test]
    fn test_lowercase_uses_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("", 14.0), 0.0);
        // One glyph is five cells wide, cell = 2px at size 14
        assert_eq!(measure("A", 14.0), 10.0);
        assert_eq!(measure("AB", 14.0), 22.0);
    }

    #[test]
    fn test_runs_merge_into_quads() {
        let mut out = Vec::new();
        // '-' is a single five-pixel run
        text_quads("-", Vec2::ZERO, 7.0, [1.0; 4], &mut out);
        assert_eq!(out.len(), 6);
        let mut out = Vec::new();
        text_quads(" ", Vec2::ZERO, 7.0, [1.0; 4], &mut out);
        assert!(out.is_empty());
    }
}
