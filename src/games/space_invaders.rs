//! Space Invaders: a marching alien grid, four destructible shields and a
//! cannon that slides along the bottom edge

use glam::Vec2;

use crate::renderer::{Color, Surface, colors, starfield};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, Rect, View};

pub const WIDTH: f32 = 900.0;
pub const HEIGHT: f32 = 600.0;
pub const PLAYER_START: Rect = Rect::new(400.0, 550.0, 40.0, 30.0);
pub const PLAYER_SPEED: f32 = 5.0;
pub const MAX_PLAYER_BULLETS: usize = 3;
pub const PLAYER_BULLET_SPEED: f32 = 8.0;
pub const ALIEN_BULLET_SPEED: f32 = 5.0;
pub const BULLET_SIZE: Vec2 = Vec2::new(4.0, 10.0);

pub const ALIEN_ROWS: usize = 5;
pub const ALIEN_COLS: usize = 11;
pub const ALIEN_SIZE: Vec2 = Vec2::new(30.0, 25.0);
pub const ALIEN_SPACING: f32 = 15.0;
pub const ALIEN_ORIGIN: Vec2 = Vec2::new(100.0, 60.0);
pub const MARCH_STEP: f32 = 10.0;
pub const MARCH_DROP: f32 = 15.0;
pub const EDGE_MARGIN: f32 = 10.0;
pub const FIRE_INTERVAL_TICKS: u32 = 60;
pub const FIRE_CHANCE: f32 = 0.3;

pub const SHIELD_COUNT: usize = 4;
pub const SHIELD_Y: f32 = 480.0;
pub const SHIELD_CELL: f32 = 4.0;
pub const SHIELD_ROWS: usize = 10;
pub const SHIELD_COLS: usize = 15;

pub const INVINCIBLE_TICKS: u32 = 120;
pub const START_LIVES: u32 = 3;

const PLAYER: Color = Color::hex(0x00ff00);
const PLAYER_NOSE: Color = Color::hex(0x00cc00);
const SHIELD: Color = Color::hex(0x00ff00);
const ALIEN_BULLET: Color = Color::hex(0xff0000);
const STAR_COUNT: u32 = 100;

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::SpaceInvaders,
    title: "Space Invaders",
    tagline: "Defend Earth from the alien invasion!",
    instructions: &[
        "Left and Right arrows to move",
        "SPACE to shoot",
        "Destroy all aliens to advance!",
    ],
    width: WIDTH,
    height: HEIGHT,
    background: Color::hex(0x0a0a0a),
    accent: PLAYER,
};

/// Alien class by formation row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlienKind {
    /// Top row
    Squid,
    /// Rows 1 and 2
    Crab,
    /// Bottom two rows
    Octopus,
}

impl AlienKind {
    fn for_row(row: usize) -> Self {
        match row {
            0 => AlienKind::Squid,
            1 | 2 => AlienKind::Crab,
            _ => AlienKind::Octopus,
        }
    }

    pub fn points(self) -> u64 {
        match self {
            AlienKind::Squid => 10,
            AlienKind::Crab => 20,
            AlienKind::Octopus => 30,
        }
    }

    fn color(self) -> Color {
        match self {
            AlienKind::Squid => Color::hex(0x00ffff),
            AlienKind::Crab => Color::hex(0xffff00),
            AlienKind::Octopus => Color::hex(0xff00ff),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alien {
    pub rect: Rect,
    pub kind: AlienKind,
    pub alive: bool,
}

/// Bullet position is its top-left corner
pub type Bullet = Vec2;

fn bullet_rect(b: Bullet) -> Rect {
    Rect::new(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shield {
    pub origin: Vec2,
    pub cells: [[bool; SHIELD_COLS]; SHIELD_ROWS],
}

impl Shield {
    fn new(origin: Vec2) -> Self {
        Self {
            origin,
            cells: [[true; SHIELD_COLS]; SHIELD_ROWS],
        }
    }

    /// Knock out the cell under `point`; false when there is nothing to hit
    pub fn absorb(&mut self, point: Vec2) -> bool {
        let col = ((point.x - self.origin.x) / SHIELD_CELL).floor();
        let row = ((point.y - self.origin.y) / SHIELD_CELL).floor();
        if col < 0.0 || row < 0.0 {
            return false;
        }
        let (col, row) = (col as usize, row as usize);
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if *cell => {
                *cell = false;
                true
            }
            _ => false,
        }
    }

    pub fn intact_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }
}

fn build_aliens() -> Vec<Alien> {
    (0..ALIEN_ROWS)
        .flat_map(|row| {
            (0..ALIEN_COLS).map(move |col| Alien {
                rect: Rect::new(
                    ALIEN_ORIGIN.x + col as f32 * (ALIEN_SIZE.x + ALIEN_SPACING),
                    ALIEN_ORIGIN.y + row as f32 * (ALIEN_SIZE.y + ALIEN_SPACING),
                    ALIEN_SIZE.x,
                    ALIEN_SIZE.y,
                ),
                kind: AlienKind::for_row(row),
                alive: true,
            })
        })
        .collect()
}

fn build_shields() -> Vec<Shield> {
    (0..SHIELD_COUNT)
        .map(|i| Shield::new(Vec2::new(150.0 + 150.0 * i as f32, SHIELD_Y)))
        .collect()
}

pub struct SpaceInvaders {
    rng: GameRng,
    pub player: Rect,
    pub aliens: Vec<Alien>,
    pub shields: Vec<Shield>,
    pub player_bullets: Vec<Bullet>,
    pub alien_bullets: Vec<Bullet>,
    /// +1 marching right, -1 left
    pub direction: f32,
    march_timer: u32,
    fire_timer: u32,
    pub invincible_ticks: u32,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
}

impl SpaceInvaders {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: GameRng::new(seed),
            player: PLAYER_START,
            aliens: Vec::new(),
            shields: Vec::new(),
            player_bullets: Vec::new(),
            alien_bullets: Vec::new(),
            direction: 1.0,
            march_timer: 0,
            fire_timer: 0,
            invincible_ticks: 0,
            score: 0,
            lives: START_LIVES,
            level: 1,
        };
        game.reset();
        game
    }

    fn start_level(&mut self) {
        self.player = PLAYER_START;
        self.aliens = build_aliens();
        self.shields = build_shields();
        self.player_bullets.clear();
        self.alien_bullets.clear();
        self.direction = 1.0;
        self.march_timer = 0;
        self.fire_timer = 0;
        self.invincible_ticks = INVINCIBLE_TICKS;
    }

    /// Formation speed multiplier
    pub fn march_speed(&self) -> f32 {
        1.0 + (self.level - 1) as f32 * 0.3
    }

    fn fire(&mut self) {
        if self.player_bullets.len() < MAX_PLAYER_BULLETS {
            self.player_bullets.push(Vec2::new(
                self.player.x + self.player.w / 2.0 - 2.0,
                self.player.y,
            ));
        }
    }

    /// One formation step. Returns true if an alien reached the player row.
    pub fn march(&mut self) -> bool {
        let direction = self.direction;
        let at_edge = self.aliens.iter().filter(|a| a.alive).any(|a| {
            (direction > 0.0 && a.rect.right() >= WIDTH - EDGE_MARGIN)
                || (direction < 0.0 && a.rect.x <= EDGE_MARGIN)
        });
        if at_edge {
            self.direction = -self.direction;
        }

        let mut landed = false;
        for alien in self.aliens.iter_mut().filter(|a| a.alive) {
            alien.rect.x += self.direction * MARCH_STEP;
            if at_edge {
                alien.rect.y += MARCH_DROP;
                landed |= alien.rect.bottom() >= self.player.y;
            }
        }
        landed
    }

    fn alien_fire(&mut self) {
        let alive: Vec<&Alien> = self.aliens.iter().filter(|a| a.alive).collect();
        if alive.is_empty() || !self.rng.chance(FIRE_CHANCE) {
            return;
        }
        let shooter = alive[self.rng.index(alive.len())].rect;
        self.alien_bullets.push(Vec2::new(
            shooter.x + shooter.w / 2.0 - 2.0,
            shooter.bottom(),
        ));
    }

    fn move_bullets(&mut self) {
        for b in &mut self.player_bullets {
            b.y -= PLAYER_BULLET_SPEED;
        }
        self.player_bullets.retain(|b| b.y >= 0.0);
        for b in &mut self.alien_bullets {
            b.y += ALIEN_BULLET_SPEED;
        }
        self.alien_bullets.retain(|b| b.y <= HEIGHT);
    }

    /// Resolve every hit for this tick. Returns false when the last life goes.
    fn resolve_hits(&mut self) -> bool {
        for i in (0..self.player_bullets.len()).rev() {
            let rect = bullet_rect(self.player_bullets[i]);
            if let Some(alien) = self
                .aliens
                .iter_mut()
                .rev()
                .find(|a| a.alive && rect.overlaps(&a.rect))
            {
                alien.alive = false;
                self.score += alien.kind.points();
                self.player_bullets.remove(i);
            }
        }

        for i in (0..self.player_bullets.len()).rev() {
            let b = self.player_bullets[i];
            if self.shields.iter_mut().any(|s| s.absorb(b)) {
                self.player_bullets.remove(i);
            }
        }

        if self.invincible_ticks == 0 {
            let hit = (0..self.alien_bullets.len())
                .rev()
                .find(|&i| bullet_rect(self.alien_bullets[i]).overlaps(&self.player));
            if let Some(i) = hit {
                self.alien_bullets.remove(i);
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    return false;
                }
                self.player.x = PLAYER_START.x;
                self.invincible_ticks = INVINCIBLE_TICKS;
            }
        }

        for i in (0..self.alien_bullets.len()).rev() {
            let b = self.alien_bullets[i];
            if self.shields.iter_mut().any(|s| s.absorb(b)) {
                self.alien_bullets.remove(i);
            }
        }
        true
    }

    fn draw_player(&self, surface: &mut dyn Surface) {
        let p = self.player;
        surface.fill_rect(p.x, p.y, p.w, p.h, PLAYER);
        surface.fill_polygon(
            &[
                Vec2::new(p.x + p.w / 2.0, p.y),
                Vec2::new(p.x, p.bottom()),
                Vec2::new(p.right(), p.bottom()),
            ],
            PLAYER_NOSE,
        );
    }
}

impl Game for SpaceInvaders {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn reset(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.start_level();
    }

    fn tick(&mut self, input: &mut Input, _dt: f32) -> Outcome {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);

        for key in input.take_pressed() {
            if key == Key::Space {
                self.fire();
            }
        }
        if input.is_held(Key::Left) {
            self.player.x -= PLAYER_SPEED;
        }
        if input.is_held(Key::Right) {
            self.player.x += PLAYER_SPEED;
        }
        self.player.x = self.player.x.clamp(0.0, WIDTH - self.player.w);

        self.move_bullets();

        self.march_timer += 1;
        if self.march_timer as f32 > 60.0 / self.march_speed() {
            self.march_timer = 0;
            if self.march() {
                log::info!("Invaders reached the ground");
                return Outcome::GameOver;
            }
        }

        self.fire_timer += 1;
        if self.fire_timer > FIRE_INTERVAL_TICKS {
            self.fire_timer = 0;
            self.alien_fire();
        }

        if !self.resolve_hits() {
            return Outcome::GameOver;
        }

        if self.aliens.iter().all(|a| !a.alive) {
            Outcome::LevelCleared { pause_ticks: 0 }
        } else {
            Outcome::Continue
        }
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.start_level();
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn hud(&self) -> Vec<HudLine> {
        vec![
            HudLine::large(format!("Score: {}", self.score)),
            HudLine::normal(format!("Level: {}", self.level)),
            HudLine::Lives(self.lives),
        ]
    }

    fn render(&self, surface: &mut dyn Surface, view: &View) {
        surface.clear(INFO.background);
        if view.starfield {
            starfield(surface, STAR_COUNT, colors::STAR);
        }

        if !(self.invincible_ticks > 0 && view.blink_hidden()) {
            self.draw_player(surface);
        }

        for alien in self.aliens.iter().filter(|a| a.alive) {
            let r = alien.rect;
            surface.fill_rect(r.x, r.y, r.w, r.h, alien.kind.color());
            surface.fill_rect(r.x + 8.0, r.y + 8.0, 5.0, 5.0, Color::BLACK);
            surface.fill_rect(r.right() - 13.0, r.y + 8.0, 5.0, 5.0, Color::BLACK);
        }

        for shield in &self.shields {
            for (row, cells) in shield.cells.iter().enumerate() {
                for (col, _) in cells.iter().enumerate().filter(|(_, c)| **c) {
                    surface.fill_rect(
                        shield.origin.x + col as f32 * SHIELD_CELL,
                        shield.origin.y + row as f32 * SHIELD_CELL,
                        SHIELD_CELL,
                        SHIELD_CELL,
                        SHIELD,
                    );
                }
            }
        }

        for b in &self.player_bullets {
            surface.fill_rect(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y, colors::WHITE);
        }
        for b in &self.alien_bullets {
            surface.fill_rect(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y, ALIEN_BULLET);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_formation_layout_and_points() {
        let game = SpaceInvaders::new(4);
        assert_eq!(game.aliens.len(), 55);
        assert_eq!(game.aliens[0].rect, Rect::new(100.0, 60.0, 30.0, 25.0));
        assert_eq!(game.aliens[0].kind.points(), 10);
        assert_eq!(game.aliens[ALIEN_COLS].kind.points(), 20);
        assert_eq!(game.aliens[3 * ALIEN_COLS].kind.points(), 30);
        assert_eq!(game.shields.len(), 4);
        assert_eq!(game.shields[3].origin, Vec2::new(600.0, 480.0));
    }

    #[test]
    fn test_march_reverses_and_drops_at_edge() {
        let mut game = SpaceInvaders::new(4);
        let rightmost = game.aliens.iter().map(|a| a.rect.right()).fold(0.0, f32::max);
        // Shift the block so its right edge sits on the margin
        let shift = WIDTH - EDGE_MARGIN - rightmost;
        for a in &mut game.aliens {
            a.rect.x += shift;
        }
        let before = game.aliens[0].rect;
        assert!(!game.march());
        assert_eq!(game.direction, -1.0);
        assert_eq!(game.aliens[0].rect.x, before.x - MARCH_STEP);
        assert_eq!(game.aliens[0].rect.y, before.y + MARCH_DROP);
    }

    #[test]
    fn test_edge_hit_moves_only_living_aliens_and_reverses_once() {
        let mut game = SpaceInvaders::new(4);
        // Empty the rightmost column; the next one in now leads the block
        for a in game.aliens.iter_mut().skip(ALIEN_COLS - 1).step_by(ALIEN_COLS) {
            a.alive = false;
        }
        let lead = game
            .aliens
            .iter()
            .filter(|a| a.alive)
            .map(|a| a.rect.right())
            .fold(0.0, f32::max);
        let shift = WIDTH - EDGE_MARGIN - lead;
        for a in &mut game.aliens {
            a.rect.x += shift;
        }
        let dead_before = game.aliens[ALIEN_COLS - 1].rect;
        let live_before = game.aliens[0].rect;

        assert!(!game.march());
        assert_eq!(game.direction, -1.0);
        assert_eq!(game.aliens[ALIEN_COLS - 1].rect, dead_before);
        assert_eq!(game.aliens[0].rect.y, live_before.y + MARCH_DROP);

        // Still near the right wall but marching away from it: no second flip
        assert!(!game.march());
        assert_eq!(game.direction, -1.0);
        assert_eq!(game.aliens[0].rect.y, live_before.y + MARCH_DROP);
        assert_eq!(game.aliens[0].rect.x, live_before.x - 2.0 * MARCH_STEP);
        assert_eq!(game.aliens[ALIEN_COLS - 1].rect, dead_before);
    }

    #[test]
    fn test_march_timer_scales_with_level() {
        let mut game = SpaceInvaders::new(4);
        game.fire_timer = 0;
        let x0 = game.aliens[0].rect.x;
        let mut input = Input::new();
        for _ in 0..60 {
            game.tick(&mut input, SIM_DT);
        }
        assert_eq!(game.aliens[0].rect.x, x0);
        game.tick(&mut input, SIM_DT);
        assert_eq!(game.aliens[0].rect.x, x0 + MARCH_STEP);

        game.level = 3;
        assert!((game.march_speed() - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_landing_ends_game() {
        let mut game = SpaceInvaders::new(4);
        game.aliens.retain(|a| a.kind == AlienKind::Squid);
        for a in &mut game.aliens {
            a.rect.y = game.player.y - a.rect.h - 5.0;
        }
        game.aliens[0].rect.x = EDGE_MARGIN;
        game.direction = -1.0;
        assert!(game.march());
    }

    #[test]
    fn test_bullet_kills_one_alien() {
        let mut game = SpaceInvaders::new(4);
        let target = game.aliens[4 * ALIEN_COLS].rect;
        game.player_bullets = vec![Vec2::new(target.x + 5.0, target.y + 5.0)];
        assert!(game.resolve_hits());
        assert_eq!(game.score, 30);
        assert!(game.player_bullets.is_empty());
        assert_eq!(game.aliens.iter().filter(|a| !a.alive).count(), 1);
    }

    #[test]
    fn test_shield_cell_absorbs_once() {
        let mut shield = Shield::new(Vec2::new(150.0, 480.0));
        assert!(shield.absorb(Vec2::new(151.0, 481.0)));
        assert!(!shield.absorb(Vec2::new(151.0, 481.0)));
        assert!(!shield.absorb(Vec2::new(149.0, 481.0)));
        assert!(!shield.absorb(Vec2::new(150.0 + 60.0, 481.0)));
        assert_eq!(shield.intact_cells(), SHIELD_ROWS * SHIELD_COLS - 1);
    }

    #[test]
    fn test_alien_bullet_costs_life() {
        let mut game = SpaceInvaders::new(4);
        game.invincible_ticks = 0;
        game.player.x = 50.0;
        game.alien_bullets = vec![Vec2::new(60.0, 555.0)];
        assert!(game.resolve_hits());
        assert_eq!(game.lives, 2);
        assert_eq!(game.player.x, PLAYER_START.x);
        assert_eq!(game.invincible_ticks, INVINCIBLE_TICKS);
        assert!(game.alien_bullets.is_empty());

        game.invincible_ticks = 0;
        game.lives = 1;
        game.alien_bullets = vec![Vec2::new(410.0, 555.0)];
        assert!(!game.resolve_hits());
    }

    #[test]
    fn test_player_is_clamped() {
        let mut game = SpaceInvaders::new(4);
        game.player.x = 2.0;
        let mut input = Input::new();
        input.key_down(Key::Left);
        game.tick(&mut input, SIM_DT);
        assert_eq!(game.player.x, 0.0);
    }

    #[test]
    fn test_empty_formation_clears_level() {
        let mut game = SpaceInvaders::new(4);
        for a in &mut game.aliens {
            a.alive = false;
        }
        let mut input = Input::new();
        assert_eq!(
            game.tick(&mut input, SIM_DT),
            Outcome::LevelCleared { pause_ticks: 0 }
        );
        game.advance_level();
        assert_eq!(game.level, 2);
        assert!(game.aliens.iter().all(|a| a.alive));
    }
}
