//! Tetris on a 10x20 well
//!
//! Pieces fall on a millisecond timer that shortens every ten cleared lines.
//! The side panels (score, lines, level, next piece) are drawn by the game
//! itself rather than the shared HUD.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::{Color, Surface, TextAlign, colors};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, View};

pub const ROWS: usize = 20;
pub const COLS: usize = 10;
pub const BLOCK_SIZE: f32 = 30.0;
pub const GRID_OFFSET: Vec2 = Vec2::new(200.0, 10.0);
pub const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];
pub const LINES_PER_LEVEL: u32 = 10;

const PREVIEW_ORIGIN: Vec2 = Vec2::new(540.0, 80.0);
const PREVIEW_CELL: f32 = 20.0;
const GRID_LINE: Color = Color::hex(0x2a2a2a);
const PREVIEW_BORDER: Color = Color::hex(0x444444);
const PANEL_DIM: Color = Color::hex(0x999999);

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::Tetris,
    title: "Tetris",
    tagline: "Clear lines to score points and level up!",
    instructions: &[
        "Use Left and Right arrows to move",
        "Up arrow to rotate",
        "Down arrow for soft drop",
        "SPACE for hard drop",
    ],
    width: 700.0,
    height: 620.0,
    background: Color::hex(0x1a1a1a),
    accent: Color::hex(0xa000f0),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn color(self) -> Color {
        match self {
            PieceKind::I => Color::hex(0x00f0f0),
            PieceKind::O => Color::hex(0xf0f000),
            PieceKind::T => Color::hex(0xa000f0),
            PieceKind::S => Color::hex(0x00f000),
            PieceKind::Z => Color::hex(0xf00000),
            PieceKind::J => Color::hex(0x0000f0),
            PieceKind::L => Color::hex(0xf0a000),
        }
    }

    /// Spawn orientation as a square matrix
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
        };
        Shape(
            rows.iter()
                .map(|row| row.iter().map(|&c| c != 0).collect())
                .collect(),
        )
    }
}

/// Square occupancy matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<Vec<bool>>);

impl Shape {
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Clockwise quarter turn
    pub fn rotated(&self) -> Shape {
        let n = self.size();
        Shape(
            (0..n)
                .map(|i| (0..n).rev().map(|j| self.0[j][i]).collect())
                .collect(),
        )
    }

    /// Offsets of the filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    fn spawn(kind: PieceKind) -> Self {
        let shape = kind.shape();
        let x = (COLS / 2) as i32 - (shape.size() / 2) as i32;
        Self { kind, shape, x, y: 0 }
    }
}

pub type Board = Vec<[Option<PieceKind>; COLS]>;

fn empty_board() -> Board {
    vec![[None; COLS]; ROWS]
}

/// True when any filled cell is outside the well or on a settled block.
/// Cells above the top edge are allowed.
pub fn collides(board: &Board, shape: &Shape, x: i32, y: i32) -> bool {
    shape.cells().any(|(cx, cy)| {
        let (bx, by) = (x + cx, y + cy);
        if bx < 0 || bx >= COLS as i32 || by >= ROWS as i32 {
            return true;
        }
        by >= 0 && board[by as usize][bx as usize].is_some()
    })
}

/// Remove full rows, shifting everything above down. Returns rows removed.
pub fn clear_lines(board: &mut Board) -> u32 {
    let before = board.len();
    board.retain(|row| row.iter().any(Option::is_none));
    let cleared = before - board.len();
    for _ in 0..cleared {
        board.insert(0, [None; COLS]);
    }
    cleared as u32
}

/// Milliseconds between gravity steps
pub fn drop_interval_ms(level: u32) -> f32 {
    (1000.0 - (level.saturating_sub(1)) as f32 * 100.0).max(100.0)
}

pub struct Tetris {
    rng: GameRng,
    pub board: Board,
    pub current: Option<Piece>,
    pub next: PieceKind,
    drop_counter_ms: f32,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
}

impl Tetris {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let next = PieceKind::ALL[rng.index(PieceKind::ALL.len())];
        let mut tetris = Self {
            rng,
            board: empty_board(),
            current: None,
            next,
            drop_counter_ms: 0.0,
            score: 0,
            lines: 0,
            level: 1,
        };
        tetris.reset();
        tetris
    }

    fn random_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.index(PieceKind::ALL.len())]
    }

    /// Promote the preview piece; false when it cannot enter the well
    fn spawn_piece(&mut self) -> bool {
        let piece = Piece::spawn(self.next);
        self.next = self.random_kind();
        let blocked = collides(&self.board, &piece.shape, piece.x, piece.y);
        self.current = Some(piece);
        !blocked
    }

    pub fn move_horizontal(&mut self, dx: i32) {
        if let Some(piece) = &mut self.current
            && !collides(&self.board, &piece.shape, piece.x + dx, piece.y)
        {
            piece.x += dx;
        }
    }

    /// Rotate in place; rejected outright if the result overlaps
    pub fn rotate(&mut self) {
        if let Some(piece) = &mut self.current {
            let rotated = piece.shape.rotated();
            if !collides(&self.board, &rotated, piece.x, piece.y) {
                piece.shape = rotated;
            }
        }
    }

    /// One row down, or lock and spawn. False means game over.
    pub fn move_down(&mut self) -> bool {
        let Some(piece) = &mut self.current else {
            return true;
        };
        if !collides(&self.board, &piece.shape, piece.x, piece.y + 1) {
            piece.y += 1;
            return true;
        }
        self.lock_piece();
        self.spawn_piece()
    }

    /// Drop straight to the floor for two points per row, then lock
    pub fn hard_drop(&mut self) -> bool {
        let Some(piece) = &mut self.current else {
            return true;
        };
        let mut distance = 0;
        while !collides(&self.board, &piece.shape, piece.x, piece.y + distance + 1) {
            distance += 1;
        }
        piece.y += distance;
        self.score += distance as u64 * 2;
        self.move_down()
    }

    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        for (cx, cy) in piece.shape.cells() {
            let (x, y) = (piece.x + cx, piece.y + cy);
            if y >= 0 {
                self.board[y as usize][x as usize] = Some(piece.kind);
            }
        }

        let cleared = clear_lines(&mut self.board);
        if cleared > 0 {
            // Scored at the level in effect before the clear
            self.score += LINE_POINTS[cleared as usize] * self.level as u64;
            self.lines += cleared;
            self.level = self.lines / LINES_PER_LEVEL + 1;
            log::debug!("Cleared {} lines, level {}", cleared, self.level);
        }
    }

    fn draw_cell(surface: &mut dyn Surface, x: i32, y: i32, color: Color) {
        surface.fill_rect(
            GRID_OFFSET.x + x as f32 * BLOCK_SIZE + 1.0,
            GRID_OFFSET.y + y as f32 * BLOCK_SIZE + 1.0,
            BLOCK_SIZE - 2.0,
            BLOCK_SIZE - 2.0,
            color,
        );
    }

    fn draw_panel(&self, surface: &mut dyn Surface, view: &View) {
        // Panel rows are laid out by baseline
        fn left(surface: &mut dyn Surface, y: f32, size: f32, color: Color, text: &str) {
            surface.text(Vec2::new(40.0, y - size), size, TextAlign::Left, color, text);
        }
        left(surface, 60.0, 24.0, colors::WHITE, "SCORE");
        left(surface, 95.0, 28.0, colors::WHITE, &self.score.to_string());
        left(surface, 150.0, 20.0, colors::WHITE, "LINES");
        left(surface, 180.0, 24.0, colors::WHITE, &self.lines.to_string());
        left(surface, 230.0, 20.0, colors::WHITE, "LEVEL");
        left(surface, 260.0, 24.0, colors::WHITE, &self.level.to_string());
        left(surface, 320.0, 14.0, PANEL_DIM, "HIGH SCORE");
        left(surface, 345.0, 18.0, PANEL_DIM, &view.high_score.max(self.score).to_string());

        surface.text(
            Vec2::new(PREVIEW_ORIGIN.x, 40.0),
            20.0,
            TextAlign::Left,
            colors::WHITE,
            "NEXT",
        );
        surface.stroke_rect(
            PREVIEW_ORIGIN.x - 5.0,
            PREVIEW_ORIGIN.y - 5.0,
            90.0,
            90.0,
            2.0,
            PREVIEW_BORDER,
        );
        let shape = self.next.shape();
        let inset = (80.0 - shape.size() as f32 * PREVIEW_CELL) / 2.0;
        let origin = PREVIEW_ORIGIN + Vec2::splat(inset);
        for (x, y) in shape.cells() {
            surface.fill_rect(
                origin.x + x as f32 * PREVIEW_CELL + 1.0,
                origin.y + y as f32 * PREVIEW_CELL + 1.0,
                PREVIEW_CELL - 2.0,
                PREVIEW_CELL - 2.0,
                self.next.color(),
            );
        }
    }
}

impl Game for Tetris {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn reset(&mut self) {
        self.board = empty_board();
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.drop_counter_ms = 0.0;
        self.next = self.random_kind();
        self.spawn_piece();
    }

    fn tick(&mut self, input: &mut Input, dt: f32) -> Outcome {
        for key in input.take_pressed() {
            let alive = match key {
                Key::Left => {
                    self.move_horizontal(-1);
                    true
                }
                Key::Right => {
                    self.move_horizontal(1);
                    true
                }
                Key::Up => {
                    self.rotate();
                    true
                }
                Key::Down => {
                    self.drop_counter_ms = 0.0;
                    self.score += 1;
                    self.move_down()
                }
                Key::Space => self.hard_drop(),
                _ => true,
            };
            if !alive {
                return Outcome::GameOver;
            }
        }

        self.drop_counter_ms += dt * 1000.0;
        if self.drop_counter_ms > drop_interval_ms(self.level) {
            self.drop_counter_ms = 0.0;
            if !self.move_down() {
                return Outcome::GameOver;
            }
        }
        Outcome::Continue
    }

    fn advance_level(&mut self) {}

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn hud(&self) -> Vec<HudLine> {
        Vec::new()
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!("Lines Cleared: {}", self.lines),
            format!("Level: {}", self.level),
        ]
    }

    fn render(&self, surface: &mut dyn Surface, view: &View) {
        surface.clear(INFO.background);
        self.draw_panel(surface, view);

        let width = COLS as f32 * BLOCK_SIZE;
        let height = ROWS as f32 * BLOCK_SIZE;
        for row in 0..=ROWS {
            let y = GRID_OFFSET.y + row as f32 * BLOCK_SIZE;
            surface.line(
                Vec2::new(GRID_OFFSET.x, y),
                Vec2::new(GRID_OFFSET.x + width, y),
                1.0,
                GRID_LINE,
            );
        }
        for col in 0..=COLS {
            let x = GRID_OFFSET.x + col as f32 * BLOCK_SIZE;
            surface.line(
                Vec2::new(x, GRID_OFFSET.y),
                Vec2::new(x, GRID_OFFSET.y + height),
                1.0,
                GRID_LINE,
            );
        }

        for (y, row) in self.board.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(kind) = cell {
                    Self::draw_cell(surface, x as i32, y as i32, kind.color());
                }
            }
        }

        if let Some(piece) = &self.current {
            for (cx, cy) in piece.shape.cells() {
                Self::draw_cell(surface, piece.x + cx, piece.y + cy, piece.kind.color());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::renderer::DrawList;
    use proptest::prelude::*;

    fn fill_row(board: &mut Board, y: usize, gap: Option<usize>) {
        for x in 0..COLS {
            board[y][x] = if Some(x) == gap { None } else { Some(PieceKind::O) };
        }
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let t = PieceKind::T.shape().rotated();
        let expected = Shape(vec![
            vec![false, true, false],
            vec![false, true, true],
            vec![false, true, false],
        ]);
        assert_eq!(t, expected);
        let i = PieceKind::I.shape();
        assert_eq!(i.rotated().rotated().rotated().rotated(), i);
    }

    #[test]
    fn test_spawn_position_is_centered() {
        assert_eq!(Piece::spawn(PieceKind::I).x, 3);
        assert_eq!(Piece::spawn(PieceKind::O).x, 4);
        assert_eq!(Piece::spawn(PieceKind::T).x, 4);
    }

    #[test]
    fn test_collision_allows_cells_above_the_top() {
        let board = empty_board();
        let shape = PieceKind::O.shape();
        assert!(!collides(&board, &shape, 0, -1));
        assert!(collides(&board, &shape, -1, 0));
        assert!(collides(&board, &shape, COLS as i32 - 1, 0));
        assert!(collides(&board, &shape, 0, ROWS as i32 - 1));
    }

    #[test]
    fn test_drop_interval_schedule() {
        assert_eq!(drop_interval_ms(1), 1000.0);
        assert_eq!(drop_interval_ms(5), 600.0);
        assert_eq!(drop_interval_ms(10), 100.0);
        assert_eq!(drop_interval_ms(15), 100.0);
    }

    #[test]
    fn test_adjacent_full_rows_clear_together() {
        let mut board = empty_board();
        fill_row(&mut board, 19, None);
        fill_row(&mut board, 18, None);
        fill_row(&mut board, 17, Some(3));
        assert_eq!(clear_lines(&mut board), 2);
        assert_eq!(board.len(), ROWS);
        assert!(board[19][0].is_some());
        assert!(board[19][3].is_none());
        assert!(board[18].iter().all(Option::is_none));
    }

    #[test]
    fn test_line_score_uses_level_before_clear() {
        let mut game = Tetris::new(5);
        game.lines = 9;
        game.level = 1;
        fill_row(&mut game.board, 19, Some(0));
        // Vertical I into the gap at column 0
        game.current = Some(Piece {
            kind: PieceKind::I,
            shape: PieceKind::I.shape().rotated(),
            x: -2,
            y: 10,
        });
        let before = game.score;
        assert!(game.hard_drop());
        assert_eq!(game.lines, 10);
        assert_eq!(game.level, 2);
        // 100 for the line at level 1, plus hard drop rows
        assert_eq!(game.score - before, 100 + 2 * 6);
    }

    #[test]
    fn test_soft_drop_scores_and_resets_timer() {
        let mut game = Tetris::new(5);
        let y = game.current.as_ref().map(|p| p.y);
        let mut input = Input::new();
        input.key_down(Key::Down);
        assert_eq!(game.tick(&mut input, SIM_DT), Outcome::Continue);
        assert_eq!(game.score, 1);
        assert_eq!(game.current.as_ref().map(|p| p.y), y.map(|y| y + 1));
    }

    #[test]
    fn test_gravity_steps_after_interval() {
        let mut game = Tetris::new(5);
        let mut input = Input::new();
        for _ in 0..59 {
            game.tick(&mut input, SIM_DT);
        }
        assert_eq!(game.current.as_ref().map(|p| p.y), Some(0));
        for _ in 0..3 {
            game.tick(&mut input, SIM_DT);
        }
        assert_eq!(game.current.as_ref().map(|p| p.y), Some(1));
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut game = Tetris::new(5);
        for y in 0..ROWS {
            fill_row(&mut game.board, y, Some(0));
        }
        let mut input = Input::new();
        input.key_down(Key::Space);
        assert_eq!(game.tick(&mut input, SIM_DT), Outcome::GameOver);
    }

    #[test]
    fn test_render_draws_own_panel() {
        let game = Tetris::new(5);
        assert!(game.hud().is_empty());
        let mut list = DrawList::new(Vec2::new(INFO.width, INFO.height));
        game.render(&mut list, &View::default());
        assert!(list.contains_text("SCORE"));
        assert!(list.contains_text("NEXT"));
        let piece = game.current.as_ref().map(|p| p.kind.color());
        assert!(piece.is_some_and(|c| list.count_fills(c) >= 4));
    }

    proptest! {
        #[test]
        fn prop_clear_removes_exactly_full_rows(
            rows in prop::collection::vec(prop::option::of(0usize..COLS), ROWS)
        ) {
            // None: full row, Some(x): gap at x
            let mut board = empty_board();
            for (y, gap) in rows.iter().enumerate() {
                fill_row(&mut board, y, *gap);
            }
            let full = rows.iter().filter(|g| g.is_none()).count();
            let survivors: Vec<usize> = rows.iter().filter_map(|g| *g).collect();

            prop_assert_eq!(clear_lines(&mut board) as usize, full);
            prop_assert_eq!(board.len(), ROWS);
            for row in &board[..full] {
                prop_assert!(row.iter().all(Option::is_none));
            }
            for (row, gap) in board[full..].iter().zip(&survivors) {
                prop_assert!(row[*gap].is_none());
                prop_assert_eq!(row.iter().filter(|c| c.is_some()).count(), COLS - 1);
            }
        }
    }
}
