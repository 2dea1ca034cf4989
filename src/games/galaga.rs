//! Galaga: enemies swoop into a swaying formation, then peel off to dive at
//! the player
//!
//! Waves advance through a short "WAVE COMPLETE!" pause; every third wave
//! raises the level, which shortens the time between dives.

use std::f32::consts::PI;

use glam::Vec2;

use crate::renderer::{Color, Surface, TextAlign, colors, starfield};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, Rect, View};

pub const WIDTH: f32 = 900.0;
pub const HEIGHT: f32 = 600.0;
pub const PLAYER_START: Rect = Rect::new(400.0, 550.0, 40.0, 30.0);
pub const PLAYER_SPEED: f32 = 6.0;
pub const MAX_PLAYER_BULLETS: usize = 2;
pub const PLAYER_BULLET_SPEED: f32 = 10.0;
pub const ENEMY_BULLET_SPEED: f32 = 6.0;
/// Hit box; bullets are drawn 2 px taller
pub const BULLET_SIZE: Vec2 = Vec2::new(4.0, 10.0);

pub const ENEMY_ROWS: usize = 4;
pub const ENEMY_COLS: usize = 8;
pub const ENEMY_SIZE: Vec2 = Vec2::new(35.0, 30.0);
pub const FORMATION_SPACING: Vec2 = Vec2::new(55.0, 50.0);
pub const FORMATION_ORIGIN: Vec2 = Vec2::new(200.0, 80.0);
pub const SWAY: f32 = 10.0;

pub const ENTRY_STAGGER_TICKS: u32 = 3;
pub const ENTRY_TICKS: f32 = 60.0;
pub const DIVE_PATH_TICKS: f32 = 120.0;
pub const DIVE_DROP: f32 = 5.0;
pub const DIVE_CHANCE: f32 = 0.3;
pub const DIVE_FIRE_EVERY: u32 = 20;
pub const DIVE_FIRE_CHANCE: f32 = 0.4;
pub const RETURN_TICKS: f32 = 80.0;
pub const RETURN_EASE: f32 = 0.05;

pub const WAVE_PAUSE_TICKS: u32 = 120;
pub const INVINCIBLE_TICKS: u32 = 120;
pub const START_LIVES: u32 = 3;

const PLAYER: Color = Color::hex(0x00ff00);
const PLAYER_WING: Color = Color::hex(0x00cc00);
const ENEMY_BULLET: Color = Color::hex(0xff0000);
const BANNER: Color = Color::hex(0xffff00);
const STAR_COUNT: u32 = 150;

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::Galaga,
    title: "Galaga",
    tagline: "Fight off waves of alien attackers!",
    instructions: &[
        "Left and Right arrows to move",
        "SPACE to shoot",
        "Watch out for diving enemies!",
    ],
    width: WIDTH,
    height: HEIGHT,
    background: Color::BLACK,
    accent: PLAYER,
};

/// Ticks between dive attempts at a given level
pub fn dive_interval(level: u32) -> u32 {
    90u32.saturating_sub(level.saturating_sub(1) * 10).max(30)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Drone,
    Escort,
    Boss,
}

impl EnemyKind {
    fn for_row(row: usize) -> Self {
        match row {
            0 => EnemyKind::Boss,
            1 => EnemyKind::Escort,
            _ => EnemyKind::Drone,
        }
    }

    pub fn points(self) -> u64 {
        match self {
            EnemyKind::Drone => 100,
            EnemyKind::Escort => 200,
            EnemyKind::Boss => 400,
        }
    }

    fn color(self) -> Color {
        match self {
            EnemyKind::Drone => Color::hex(0x4169e1),
            EnemyKind::Escort => Color::hex(0xffd700),
            EnemyKind::Boss => Color::hex(0xff1493),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    /// Flying the entry curve; stays off screen until its stagger elapses
    Entering,
    Formation,
    Diving { path: u32 },
    Returning { path: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub pos: Vec2,
    pub slot: Vec2,
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub alive: bool,
    /// Cosmetic heading while off formation
    pub angle: f32,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, ENEMY_SIZE.x, ENEMY_SIZE.y)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let center = self.pos + ENEMY_SIZE / 2.0;
        let angle = if self.state == EnemyState::Formation {
            0.0
        } else {
            self.angle
        };
        let rotation = Vec2::from_angle(angle);
        let mut part = |x: f32, y: f32, w: f32, h: f32, color: Color| {
            let corners = [
                Vec2::new(x, y),
                Vec2::new(x + w, y),
                Vec2::new(x + w, y + h),
                Vec2::new(x, y + h),
            ]
            .map(|c| center + rotation.rotate(c - ENEMY_SIZE / 2.0));
            surface.fill_polygon(&corners, color);
        };
        let (w, h) = (ENEMY_SIZE.x, ENEMY_SIZE.y);
        let body = self.kind.color();
        part(5.0, 0.0, w - 10.0, h, body);
        part(0.0, 10.0, w, h - 15.0, body);
        part(10.0, 8.0, 6.0, 6.0, colors::WHITE);
        part(w - 16.0, 8.0, 6.0, 6.0, colors::WHITE);
    }
}

fn build_wave() -> Vec<Enemy> {
    (0..ENEMY_ROWS)
        .flat_map(|row| {
            (0..ENEMY_COLS).map(move |col| Enemy {
                pos: Vec2::splat(-100.0),
                slot: FORMATION_ORIGIN
                    + Vec2::new(col as f32, row as f32) * FORMATION_SPACING,
                kind: EnemyKind::for_row(row),
                state: EnemyState::Entering,
                alive: true,
                angle: 0.0,
            })
        })
        .collect()
}

fn bullet_rect(b: Vec2) -> Rect {
    Rect::new(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y)
}

pub struct Galaga {
    rng: GameRng,
    pub player: Rect,
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Vec2>,
    pub enemy_bullets: Vec<Vec2>,
    enter_timer: u32,
    dive_timer: u32,
    /// Simulation time driving the formation sway
    sway_clock_ms: f32,
    pub invincible_ticks: u32,
    pub score: u64,
    pub lives: u32,
    pub wave: u32,
    pub level: u32,
}

impl Galaga {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: GameRng::new(seed),
            player: PLAYER_START,
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            enter_timer: 0,
            dive_timer: 0,
            sway_clock_ms: 0.0,
            invincible_ticks: 0,
            score: 0,
            lives: START_LIVES,
            wave: 1,
            level: 1,
        };
        game.reset();
        game
    }

    fn start_wave(&mut self) {
        self.player = PLAYER_START;
        self.enemies = build_wave();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.enter_timer = 0;
        self.dive_timer = 0;
    }

    pub fn entering(&self) -> bool {
        self.enemies
            .iter()
            .any(|e| e.alive && e.state == EnemyState::Entering)
    }

    fn update_player(&mut self, input: &mut Input) {
        for key in input.take_pressed() {
            if key == Key::Space && self.player_bullets.len() < MAX_PLAYER_BULLETS {
                self.player_bullets.push(Vec2::new(
                    self.player.x + self.player.w / 2.0 - 2.0,
                    self.player.y,
                ));
            }
        }
        if input.is_held(Key::Left) {
            self.player.x -= PLAYER_SPEED;
        }
        if input.is_held(Key::Right) {
            self.player.x += PLAYER_SPEED;
        }
        self.player.x = self.player.x.clamp(0.0, WIDTH - self.player.w);
    }

    fn move_bullets(&mut self) {
        for b in &mut self.player_bullets {
            b.y -= PLAYER_BULLET_SPEED;
        }
        self.player_bullets.retain(|b| b.y >= 0.0);
        for b in &mut self.enemy_bullets {
            b.y += ENEMY_BULLET_SPEED;
        }
        self.enemy_bullets.retain(|b| b.y <= HEIGHT);
    }

    fn update_entry(&mut self) {
        self.enter_timer += 1;
        let t = self.enter_timer;
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            let delay = index as u32 * ENTRY_STAGGER_TICKS;
            if enemy.state != EnemyState::Entering || t <= delay {
                continue;
            }
            let progress = ((t - delay) as f32 / ENTRY_TICKS).min(1.0);
            if progress < 1.0 {
                let start = Vec2::new(if index % 2 == 0 { -50.0 } else { WIDTH + 50.0 }, -50.0);
                enemy.pos = start.lerp(enemy.slot, progress)
                    + Vec2::new(0.0, (progress * PI * 4.0).sin() * 50.0);
                enemy.angle = progress * PI * 4.0;
            } else {
                enemy.pos = enemy.slot;
                enemy.state = EnemyState::Formation;
            }
        }
    }

    fn update_attacks(&mut self, dt: f32) {
        self.sway_clock_ms += dt * 1000.0;
        let sway = (self.sway_clock_ms / 500.0).sin() * SWAY;
        for enemy in &mut self.enemies {
            if enemy.alive && enemy.state == EnemyState::Formation {
                enemy.pos.x = enemy.slot.x + sway;
            }
        }

        self.dive_timer += 1;
        if self.dive_timer > dive_interval(self.level) {
            self.dive_timer = 0;
            let idle: Vec<usize> = (0..self.enemies.len())
                .filter(|&i| {
                    self.enemies[i].alive && self.enemies[i].state == EnemyState::Formation
                })
                .collect();
            if !idle.is_empty() && self.rng.chance(DIVE_CHANCE) {
                let diver = idle[self.rng.index(idle.len())];
                self.enemies[diver].state = EnemyState::Diving { path: 0 };
            }
        }

        let target_x = self.player.x;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            match enemy.state {
                EnemyState::Diving { path } => {
                    let path = path + 1;
                    let progress = path as f32 / DIVE_PATH_TICKS;
                    if progress >= 0.5 {
                        enemy.state = EnemyState::Returning { path: 0 };
                        continue;
                    }
                    let pull = (target_x - enemy.pos.x) * 0.02;
                    enemy.pos.x += pull + (progress * PI * 6.0).cos() * 5.0;
                    enemy.pos.y += DIVE_DROP;
                    enemy.angle = DIVE_DROP.atan2(pull);
                    enemy.state = EnemyState::Diving { path };

                    if path % DIVE_FIRE_EVERY == 0 && self.rng.chance(DIVE_FIRE_CHANCE) {
                        self.enemy_bullets.push(Vec2::new(
                            enemy.pos.x + ENEMY_SIZE.x / 2.0 - 2.0,
                            enemy.pos.y + ENEMY_SIZE.y,
                        ));
                    }
                    if enemy.pos.y > HEIGHT + 50.0 {
                        enemy.state = EnemyState::Returning { path: 0 };
                    }
                }
                EnemyState::Returning { path } => {
                    let path = path + 1;
                    let to_slot = enemy.slot - enemy.pos;
                    enemy.pos += to_slot * RETURN_EASE;
                    enemy.angle = to_slot.y.atan2(to_slot.x);
                    if path as f32 >= RETURN_TICKS {
                        enemy.pos = enemy.slot;
                        enemy.state = EnemyState::Formation;
                    } else {
                        enemy.state = EnemyState::Returning { path };
                    }
                }
                EnemyState::Entering | EnemyState::Formation => {}
            }
        }
    }

    fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return false;
        }
        self.player.x = PLAYER_START.x;
        self.invincible_ticks = INVINCIBLE_TICKS;
        true
    }

    /// Returns false when the last life is lost
    fn resolve_hits(&mut self) -> bool {
        for i in (0..self.player_bullets.len()).rev() {
            let rect = bullet_rect(self.player_bullets[i]);
            if let Some(enemy) = self
                .enemies
                .iter_mut()
                .rev()
                .find(|e| e.alive && rect.overlaps(&e.rect()))
            {
                enemy.alive = false;
                self.score += enemy.kind.points();
                self.player_bullets.remove(i);
            }
        }

        if self.invincible_ticks == 0 {
            let hit = (0..self.enemy_bullets.len())
                .rev()
                .find(|&i| bullet_rect(self.enemy_bullets[i]).overlaps(&self.player));
            if let Some(i) = hit {
                self.enemy_bullets.remove(i);
                if !self.lose_life() {
                    return false;
                }
            }
        }

        if self.invincible_ticks == 0 {
            let player = self.player;
            let rammer = self.enemies.iter_mut().find(|e| {
                e.alive && matches!(e.state, EnemyState::Diving { .. }) && e.rect().overlaps(&player)
            });
            if let Some(enemy) = rammer {
                enemy.alive = false;
                if !self.lose_life() {
                    return false;
                }
            }
        }
        true
    }

    fn draw_player(&self, surface: &mut dyn Surface) {
        let p = self.player;
        surface.fill_polygon(
            &[
                Vec2::new(p.x + p.w / 2.0, p.y),
                Vec2::new(p.x, p.bottom()),
                Vec2::new(p.x + p.w / 2.0, p.bottom() - 10.0),
                Vec2::new(p.right(), p.bottom()),
            ],
            PLAYER,
        );
        surface.fill_rect(p.x, p.y + 15.0, 10.0, 10.0, PLAYER_WING);
        surface.fill_rect(p.right() - 10.0, p.y + 15.0, 10.0, 10.0, PLAYER_WING);
    }
}

impl Game for Galaga {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn reset(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.wave = 1;
        self.level = 1;
        self.sway_clock_ms = 0.0;
        self.invincible_ticks = INVINCIBLE_TICKS;
        self.start_wave();
    }

    fn tick(&mut self, input: &mut Input, dt: f32) -> Outcome {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
        self.update_player(input);

        if self.entering() {
            self.update_entry();
        } else {
            self.update_attacks(dt);
        }

        self.move_bullets();
        if !self.resolve_hits() {
            return Outcome::GameOver;
        }

        if self.enemies.iter().all(|e| !e.alive) {
            log::info!("Galaga wave {} complete", self.wave);
            Outcome::LevelCleared {
                pause_ticks: WAVE_PAUSE_TICKS,
            }
        } else {
            Outcome::Continue
        }
    }

    fn tick_transition(&mut self, input: &mut Input, _dt: f32) {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
        self.update_player(input);
        self.move_bullets();
    }

    fn advance_level(&mut self) {
        self.wave += 1;
        if self.wave % 3 == 1 {
            self.level += 1;
        }
        self.start_wave();
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
            HudLine::normal(format!("Wave: {}", self.wave)),
            HudLine::normal(format!("Level: {}", self.level)),
            HudLine::Lives(self.lives),
        ]
    }

    fn summary(&self) -> Vec<String> {
        vec![
            format!("Wave Reached: {}", self.wave),
            format!("Level: {}", self.level),
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
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            enemy.draw(surface);
        }
        for b in &self.player_bullets {
            surface.fill_rect(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y + 2.0, colors::WHITE);
        }
        for b in &self.enemy_bullets {
            surface.fill_rect(b.x, b.y, BULLET_SIZE.x, BULLET_SIZE.y + 2.0, ENEMY_BULLET);
        }

        if view.in_transition() {
            surface.text(
                Vec2::new(WIDTH / 2.0, HEIGHT / 2.0 - 36.0),
                36.0,
                TextAlign::Center,
                BANNER,
                "WAVE COMPLETE!",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::renderer::DrawList;
    use crate::sim::Phase;

    fn in_formation(game: &mut Galaga) {
        for e in &mut game.enemies {
            e.pos = e.slot;
            e.state = EnemyState::Formation;
        }
    }

    #[test]
    fn test_wave_layout() {
        let game = Galaga::new(8);
        assert_eq!(game.enemies.len(), 32);
        assert_eq!(game.enemies[0].slot, Vec2::new(200.0, 80.0));
        assert_eq!(game.enemies[9].slot, Vec2::new(255.0, 130.0));
        assert_eq!(game.enemies[0].kind.points(), 400);
        assert_eq!(game.enemies[8].kind.points(), 200);
        assert_eq!(game.enemies[31].kind.points(), 100);
        assert!(game.entering());
    }

    #[test]
    fn test_entry_finishes_in_formation() {
        let mut game = Galaga::new(8);
        let mut input = Input::new();
        let last_arrival = 31 * ENTRY_STAGGER_TICKS + ENTRY_TICKS as u32;
        for _ in 0..last_arrival {
            game.tick(&mut input, SIM_DT);
        }
        assert!(!game.entering());
        assert!(game.enemies.iter().all(|e| e.state == EnemyState::Formation));
        assert_eq!(game.enemies[31].pos, game.enemies[31].slot);
    }

    #[test]
    fn test_staggered_entry() {
        let mut game = Galaga::new(8);
        game.update_entry();
        game.update_entry();
        assert_ne!(game.enemies[0].pos, Vec2::splat(-100.0));
        // Index 1 waits for three ticks
        assert_eq!(game.enemies[1].pos, Vec2::splat(-100.0));
    }

    #[test]
    fn test_dive_interval_floor() {
        assert_eq!(dive_interval(1), 90);
        assert_eq!(dive_interval(4), 60);
        assert_eq!(dive_interval(7), 30);
        assert_eq!(dive_interval(20), 30);
    }

    #[test]
    fn test_dive_then_return() {
        let mut game = Galaga::new(8);
        in_formation(&mut game);
        game.enemies[5].state = EnemyState::Diving { path: 0 };
        let y0 = game.enemies[5].pos.y;
        for _ in 0..59 {
            game.update_attacks(SIM_DT);
        }
        assert_eq!(game.enemies[5].state, EnemyState::Diving { path: 59 });
        assert!((game.enemies[5].pos.y - (y0 + 59.0 * DIVE_DROP)).abs() < 1e-3);
        game.update_attacks(SIM_DT);
        assert_eq!(game.enemies[5].state, EnemyState::Returning { path: 0 });
        for _ in 0..80 {
            game.update_attacks(SIM_DT);
        }
        assert_eq!(game.enemies[5].state, EnemyState::Formation);
    }

    #[test]
    fn test_rammer_dies_without_score() {
        let mut game = Galaga::new(8);
        in_formation(&mut game);
        game.invincible_ticks = 0;
        let enemy = &mut game.enemies[3];
        enemy.state = EnemyState::Diving { path: 10 };
        enemy.pos = Vec2::new(game.player.x, game.player.y);
        assert!(game.resolve_hits());
        assert!(!game.enemies[3].alive);
        assert_eq!(game.score, 0);
        assert_eq!(game.lives, 2);
        assert_eq!(game.invincible_ticks, INVINCIBLE_TICKS);
    }

    #[test]
    fn test_bullet_scores_boss() {
        let mut game = Galaga::new(8);
        in_formation(&mut game);
        let slot = game.enemies[0].slot;
        game.player_bullets = vec![slot + Vec2::new(10.0, 5.0)];
        assert!(game.resolve_hits());
        assert_eq!(game.score, 400);
        assert!(game.player_bullets.is_empty());
    }

    #[test]
    fn test_wave_progression_and_level() {
        let mut game = Galaga::new(8);
        for e in &mut game.enemies {
            e.alive = false;
        }
        let mut input = Input::new();
        assert_eq!(
            game.tick(&mut input, SIM_DT),
            Outcome::LevelCleared { pause_ticks: WAVE_PAUSE_TICKS }
        );
        game.advance_level();
        assert_eq!((game.wave, game.level), (2, 1));
        game.advance_level();
        game.advance_level();
        assert_eq!((game.wave, game.level), (4, 2));
        assert_eq!(game.enemies.len(), 32);
    }

    #[test]
    fn test_player_moves_during_wave_pause() {
        let mut game = Galaga::new(8);
        let mut input = Input::new();
        input.key_down(Key::Right);
        let x0 = game.player.x;
        game.tick_transition(&mut input, SIM_DT);
        assert_eq!(game.player.x, x0 + PLAYER_SPEED);
    }

    #[test]
    fn test_full_wave_pause_moves_player_but_freezes_enemies() {
        let mut game = Galaga::new(8);
        in_formation(&mut game);
        for e in &mut game.enemies {
            e.alive = false;
        }
        game.enemy_bullets = vec![Vec2::new(300.0, 100.0)];
        let mut input = Input::new();
        assert_eq!(
            game.tick(&mut input, SIM_DT),
            Outcome::LevelCleared { pause_ticks: WAVE_PAUSE_TICKS }
        );
        let bullet_y = game.enemy_bullets[0].y;
        let enemies = game.enemies.clone();
        let (dive_timer, sway_clock) = (game.dive_timer, game.sway_clock_ms);
        let x0 = game.player.x;

        input.key_down(Key::Right);
        for _ in 0..10 {
            game.tick_transition(&mut input, SIM_DT);
        }
        assert_eq!(game.player.x, x0 + 10.0 * PLAYER_SPEED);
        assert_eq!(game.enemy_bullets[0].y, bullet_y + 10.0 * ENEMY_BULLET_SPEED);

        for _ in 10..WAVE_PAUSE_TICKS {
            game.tick_transition(&mut input, SIM_DT);
        }
        assert_eq!(game.player.x, WIDTH - game.player.w);
        assert!(game.enemy_bullets.is_empty());
        assert_eq!(game.enemies, enemies);
        assert_eq!(game.dive_timer, dive_timer);
        assert_eq!(game.sway_clock_ms, sway_clock);
        assert_eq!(game.wave, 1);

        game.advance_level();
        assert_eq!(game.wave, 2);
        assert!(game.entering());
    }

    #[test]
    fn test_banner_only_in_transition() {
        let game = Galaga::new(8);
        let size = Vec2::new(WIDTH, HEIGHT);
        let mut list = DrawList::new(size);
        game.render(&mut list, &View::default());
        assert!(!list.contains_text("WAVE COMPLETE!"));
        let view = View {
            phase: Phase::LevelTransition { remaining: 60 },
            ..View::default()
        };
        list.reset(size);
        game.render(&mut list, &view);
        assert!(list.contains_text("WAVE COMPLETE!"));
    }
}
