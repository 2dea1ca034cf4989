//! Snake on a 30x30 grid
//!
//! The snake steps on its own timer, independent of the 60 Hz tick. Eating
//! food grows it by one segment and shortens the step interval.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::{Color, Surface};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, View};

pub const GRID_SIZE: f32 = 20.0;
pub const TILE_COUNT: i32 = 30;
pub const START_INTERVAL_MS: f32 = 100.0;
pub const MIN_INTERVAL_MS: f32 = 50.0;
pub const SPEEDUP_MS: f32 = 2.0;
pub const FOOD_POINTS: u64 = 10;

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::Snake,
    title: "Snake",
    tagline: "The snake gets faster as you eat more food!",
    instructions: &[
        "Use the arrow keys to control the snake",
        "Eat the red food to grow",
        "Don't hit the walls or yourself",
    ],
    width: TILE_COUNT as f32 * GRID_SIZE,
    height: TILE_COUNT as f32 * GRID_SIZE,
    background: Color::hex(0x1a1a1a),
    accent: Color::hex(0x00ff00),
};

const GRID_LINE: Color = Color::hex(0x2a2a2a);
const FOOD: Color = Color::hex(0xff4444);
const HEAD: Color = Color::hex(0x00ff00);
const BODY: Color = Color::hex(0x00cc00);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    fn in_bounds(self) -> bool {
        (0..TILE_COUNT).contains(&self.x) && (0..TILE_COUNT).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

pub struct Snake {
    rng: GameRng,
    /// Head first
    pub body: VecDeque<Cell>,
    pub direction: Direction,
    /// Direction committed on the next step
    pub next_direction: Direction,
    pub food: Cell,
    pub interval_ms: f32,
    timer_ms: f32,
    pub score: u64,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mut snake = Self {
            rng: GameRng::new(seed),
            body: VecDeque::new(),
            direction: Direction::Right,
            next_direction: Direction::Right,
            food: Cell::new(0, 0),
            interval_ms: START_INTERVAL_MS,
            timer_ms: 0.0,
            score: 0,
        };
        snake.reset();
        snake
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Uniform pick among free cells; `None` once the snake fills the board
    fn spawn_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..TILE_COUNT)
            .flat_map(|y| (0..TILE_COUNT).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.occupied(*c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.index(free.len())])
    }

    /// Request a turn; reversing onto the pending direction is ignored
    pub fn steer(&mut self, dir: Direction) {
        if dir != self.next_direction.opposite() {
            self.next_direction = dir;
        }
    }

    /// Move one cell
    pub fn step(&mut self) -> Outcome {
        self.direction = self.next_direction;
        let Some(&head) = self.body.front() else {
            return Outcome::GameOver;
        };
        let next = head.step(self.direction);

        if !next.in_bounds() {
            return Outcome::GameOver;
        }
        // The tail moves out of the way this step
        let keep = self.body.len().saturating_sub(1);
        if self.body.iter().take(keep).any(|c| *c == next) {
            return Outcome::GameOver;
        }

        self.body.push_front(next);
        if next == self.food {
            self.score += FOOD_POINTS;
            self.interval_ms = (self.interval_ms - SPEEDUP_MS).max(MIN_INTERVAL_MS);
            match self.spawn_food() {
                Some(food) => self.food = food,
                None => return Outcome::GameOver,
            }
        } else {
            self.body.pop_back();
        }
        Outcome::Continue
    }
}

impl Game for Snake {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn reset(&mut self) {
        let center = TILE_COUNT / 2;
        self.body = (0..3).map(|i| Cell::new(center - i, center)).collect();
        self.direction = Direction::Right;
        self.next_direction = Direction::Right;
        self.interval_ms = START_INTERVAL_MS;
        self.timer_ms = 0.0;
        self.score = 0;
        if let Some(food) = self.spawn_food() {
            self.food = food;
        }
    }

    fn tick(&mut self, input: &mut Input, dt: f32) -> Outcome {
        for key in input.take_pressed() {
            if let Some(dir) = Direction::from_key(key) {
                self.steer(dir);
            }
        }

        self.timer_ms += dt * 1000.0;
        if self.timer_ms < self.interval_ms {
            return Outcome::Continue;
        }
        self.timer_ms -= self.interval_ms;
        self.step()
    }

    fn advance_level(&mut self) {}

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        1
    }

    fn hud(&self) -> Vec<HudLine> {
        vec![
            HudLine::large(format!("Score: {}", self.score)),
            HudLine::dim(format!("Length: {}", self.body.len())),
        ]
    }

    fn summary(&self) -> Vec<String> {
        vec![format!("Length: {}", self.body.len())]
    }

    fn render(&self, surface: &mut dyn Surface, _view: &View) {
        let size = surface.size();
        surface.clear(INFO.background);

        let mut i = 0.0;
        while i <= size.x {
            surface.line(Vec2::new(i, 0.0), Vec2::new(i, size.y), 0.5, GRID_LINE);
            surface.line(Vec2::new(0.0, i), Vec2::new(size.x, i), 0.5, GRID_LINE);
            i += GRID_SIZE;
        }

        surface.fill_rect(
            self.food.x as f32 * GRID_SIZE + 2.0,
            self.food.y as f32 * GRID_SIZE + 2.0,
            GRID_SIZE - 4.0,
            GRID_SIZE - 4.0,
            FOOD,
        );

        for (index, cell) in self.body.iter().enumerate() {
            let color = if index == 0 { HEAD } else { BODY };
            surface.fill_rect(
                cell.x as f32 * GRID_SIZE + 1.0,
                cell.y as f32 * GRID_SIZE + 1.0,
                GRID_SIZE - 2.0,
                GRID_SIZE - 2.0,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::renderer::DrawList;
    use proptest::prelude::*;

    #[test]
    fn test_initial_layout() {
        let snake = Snake::new(1);
        let body: Vec<Cell> = snake.body.iter().copied().collect();
        assert_eq!(body, vec![Cell::new(15, 15), Cell::new(14, 15), Cell::new(13, 15)]);
        assert_eq!(snake.direction, Direction::Right);
        assert!(!snake.body.contains(&snake.food));
    }

    #[test]
    fn test_reverse_of_pending_direction_is_ignored() {
        let mut snake = Snake::new(1);
        snake.steer(Direction::Left);
        assert_eq!(snake.next_direction, Direction::Right);
        snake.steer(Direction::Up);
        // Now Down reverses the pending Up, Left is allowed again
        snake.steer(Direction::Down);
        assert_eq!(snake.next_direction, Direction::Up);
        snake.steer(Direction::Left);
        assert_eq!(snake.next_direction, Direction::Left);
    }

    #[test]
    fn test_steps_on_interval() {
        let mut snake = Snake::new(1);
        snake.food = Cell::new(0, 0);
        let mut input = Input::new();
        for _ in 0..5 {
            snake.tick(&mut input, SIM_DT);
        }
        assert_eq!(snake.body[0], Cell::new(15, 15));
        // Six ticks is 100 ms give or take float rounding
        snake.tick(&mut input, SIM_DT);
        snake.tick(&mut input, SIM_DT);
        assert_eq!(snake.body[0], Cell::new(16, 15));
        assert_eq!(snake.body.len(), 3);
    }

    #[test]
    fn test_eating_grows_and_speeds_up() {
        let mut snake = Snake::new(1);
        snake.food = Cell::new(16, 15);
        assert_eq!(snake.step(), Outcome::Continue);
        assert_eq!(snake.body.len(), 4);
        assert_eq!(snake.score, 10);
        assert_eq!(snake.interval_ms, 98.0);
        assert!(!snake.body.contains(&snake.food));
    }

    #[test]
    fn test_hud_tracks_length() {
        let mut snake = Snake::new(1);
        assert!(snake.hud().contains(&HudLine::dim("Length: 3")));
        snake.food = Cell::new(16, 15);
        snake.step();
        assert_eq!(
            snake.hud(),
            vec![HudLine::large("Score: 10"), HudLine::dim("Length: 4")]
        );
    }

    #[test]
    fn test_interval_floor() {
        let mut snake = Snake::new(1);
        snake.interval_ms = 51.0;
        snake.food = Cell::new(16, 15);
        snake.step();
        assert_eq!(snake.interval_ms, MIN_INTERVAL_MS);
    }

    #[test]
    fn test_wall_ends_game() {
        let mut snake = Snake::new(1);
        snake.body = VecDeque::from(vec![Cell::new(29, 3), Cell::new(28, 3), Cell::new(27, 3)]);
        snake.food = Cell::new(0, 0);
        assert_eq!(snake.step(), Outcome::GameOver);
    }

    #[test]
    fn test_moving_into_vacated_tail_is_allowed() {
        let mut snake = Snake::new(1);
        // 2x2 loop: head at (5,5) heading down into the tail at (5,6)
        snake.body = VecDeque::from(vec![
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
        ]);
        snake.direction = Direction::Down;
        snake.next_direction = Direction::Down;
        snake.food = Cell::new(0, 0);
        assert_eq!(snake.step(), Outcome::Continue);
        assert_eq!(snake.body[0], Cell::new(5, 6));
    }

    #[test]
    fn test_biting_body_ends_game() {
        let mut snake = Snake::new(1);
        snake.body = VecDeque::from(vec![
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
            Cell::new(4, 6),
        ]);
        snake.direction = Direction::Down;
        snake.next_direction = Direction::Down;
        snake.food = Cell::new(0, 0);
        assert_eq!(snake.step(), Outcome::GameOver);
    }

    #[test]
    fn test_render_draws_every_segment() {
        let snake = Snake::new(3);
        let mut list = DrawList::new(Vec2::new(600.0, 600.0));
        snake.render(&mut list, &View::default());
        assert_eq!(list.count_fills(HEAD), 1);
        assert_eq!(list.count_fills(BODY), 2);
        assert_eq!(list.count_fills(FOOD), 1);
    }

    proptest! {
        #[test]
        fn prop_food_never_on_snake(
            cells in proptest::collection::hash_set((0..TILE_COUNT, 0..TILE_COUNT), 1..400),
            seed in any::<u64>(),
        ) {
            let mut snake = Snake::new(seed);
            snake.body = cells.iter().map(|&(x, y)| Cell::new(x, y)).collect();
            let food = snake.spawn_food();
            prop_assert!(food.is_some());
            if let Some(food) = food {
                prop_assert!(food.in_bounds());
                prop_assert!(!snake.body.contains(&food));
            }
        }
    }
}
