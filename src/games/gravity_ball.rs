//! Gravity Ball: steer a ball by turning gravity itself
//!
//! The first three levels are hand-built; later levels are generated from the
//! game's seed, growing denser as the level number rises.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::{Color, Surface, TextAlign, colors};
use crate::sim::collision::{bounce_in_bounds, circles_overlap, resolve_circle_rect};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, Rect, View};

pub const WIDTH: f32 = 900.0;
pub const HEIGHT: f32 = 600.0;
pub const BALL_RADIUS: f32 = 15.0;
pub const GRAVITY: f32 = 0.5;
pub const DAMPING: f32 = 0.99;
pub const RESTITUTION: f32 = 0.5;
pub const GOAL_SIZE: f32 = 40.0;
pub const GOAL_BONUS: u64 = 500;
/// Length of the "LEVEL COMPLETE!" hold
pub const LEVEL_PAUSE_TICKS: u32 = 91;
pub const INVINCIBLE_TICKS: u32 = 120;
pub const START_LIVES: u32 = 3;

const PLATFORM: Color = Color::hex(0x444444);
const PLATFORM_EDGE: Color = Color::hex(0x666666);
const SPIKE: Color = Color::hex(0xff0000);
const ORB: Color = Color::hex(0xffff00);
const ORB_EDGE: Color = Color::hex(0xffaa00);
const GOAL_EDGE: Color = Color::hex(0x00ff00);
const BALL: Color = Color::hex(0x00ffff);
const BALL_EDGE: Color = Color::hex(0x00cccc);

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::GravityBall,
    title: "Gravity Ball",
    tagline: "Control gravity to navigate to the goal!",
    instructions: &[
        "Use Arrow keys or WASD to change gravity direction",
        "Navigate to the green goal square",
        "Collect yellow orbs for points",
        "Avoid red spikes!",
    ],
    width: WIDTH,
    height: HEIGHT,
    background: Color::hex(0x0a0a0a),
    accent: Color::hex(0x22d3ee),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gravity {
    Up,
    Down,
    Left,
    Right,
}

impl Gravity {
    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up | Key::W => Some(Gravity::Up),
            Key::Down | Key::S => Some(Gravity::Down),
            Key::Left | Key::A => Some(Gravity::Left),
            Key::Right | Key::D => Some(Gravity::Right),
            _ => None,
        }
    }

    pub fn vector(self) -> Vec2 {
        match self {
            Gravity::Up => Vec2::NEG_Y,
            Gravity::Down => Vec2::Y,
            Gravity::Left => Vec2::NEG_X,
            Gravity::Right => Vec2::X,
        }
    }

    /// Rotation that turns an up-pointing arrow toward the pull
    fn arrow_angle(self) -> f32 {
        match self {
            Gravity::Up => 0.0,
            Gravity::Right => FRAC_PI_2,
            Gravity::Down => PI,
            Gravity::Left => -FRAC_PI_2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub pos: Vec2,
    pub radius: f32,
    pub points: u64,
    pub collected: bool,
}

impl Collectible {
    fn new(x: f32, y: f32, points: u64) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius: 10.0,
            points,
            collected: false,
        }
    }
}

/// Static layout of one level
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub platforms: Vec<Rect>,
    pub collectibles: Vec<Collectible>,
    pub spikes: Vec<Rect>,
    pub goal: Rect,
    pub ball_start: Vec2,
}

fn goal_at(x: f32, y: f32) -> Rect {
    Rect::new(x, y, GOAL_SIZE, GOAL_SIZE)
}

/// Build the layout for `level`, drawing from `rng` past the canned levels
pub fn build_level(level: u32, rng: &mut GameRng) -> Layout {
    match level {
        1 => Layout {
            platforms: vec![
                Rect::new(0.0, 550.0, 900.0, 50.0),
                Rect::new(200.0, 450.0, 150.0, 20.0),
                Rect::new(450.0, 350.0, 150.0, 20.0),
                Rect::new(700.0, 250.0, 150.0, 20.0),
            ],
            collectibles: vec![
                Collectible::new(275.0, 420.0, 100),
                Collectible::new(525.0, 320.0, 100),
                Collectible::new(775.0, 220.0, 100),
            ],
            spikes: vec![Rect::new(400.0, 530.0, 50.0, 20.0)],
            goal: goal_at(800.0, 180.0),
            ball_start: Vec2::new(100.0, 500.0),
        },
        2 => Layout {
            platforms: vec![
                Rect::new(0.0, 550.0, 200.0, 50.0),
                Rect::new(700.0, 550.0, 200.0, 50.0),
                Rect::new(350.0, 400.0, 200.0, 20.0),
                Rect::new(100.0, 250.0, 200.0, 20.0),
                Rect::new(600.0, 100.0, 200.0, 20.0),
            ],
            collectibles: vec![
                Collectible::new(450.0, 360.0, 150),
                Collectible::new(200.0, 210.0, 150),
                Collectible::new(700.0, 60.0, 150),
            ],
            spikes: vec![
                Rect::new(250.0, 530.0, 400.0, 20.0),
                Rect::new(300.0, 380.0, 30.0, 20.0),
            ],
            goal: goal_at(700.0, 30.0),
            ball_start: Vec2::new(100.0, 500.0),
        },
        3 => Layout {
            platforms: vec![
                Rect::new(0.0, 550.0, 150.0, 50.0),
                Rect::new(750.0, 550.0, 150.0, 50.0),
                Rect::new(0.0, 0.0, 150.0, 50.0),
                Rect::new(750.0, 0.0, 150.0, 50.0),
                Rect::new(400.0, 300.0, 100.0, 20.0),
            ],
            collectibles: vec![
                Collectible::new(450.0, 260.0, 200),
                Collectible::new(100.0, 300.0, 200),
                Collectible::new(800.0, 300.0, 200),
            ],
            spikes: vec![
                Rect::new(200.0, 530.0, 500.0, 20.0),
                Rect::new(200.0, 50.0, 500.0, 20.0),
            ],
            goal: goal_at(800.0, 80.0),
            ball_start: Vec2::new(75.0, 500.0),
        },
        n => {
            let mut platforms = vec![Rect::new(0.0, 550.0, 900.0, 50.0)];
            for _ in 0..5 + n {
                platforms.push(Rect::new(
                    rng.range(0.0, 700.0),
                    rng.range(50.0, 500.0),
                    rng.range(100.0, 200.0),
                    20.0,
                ));
            }
            let collectibles = (0..3 + n)
                .map(|_| {
                    let x = rng.range(25.0, 875.0);
                    let y = rng.range(25.0, 525.0);
                    Collectible::new(x, y, 100 + n as u64 * 50)
                })
                .collect();
            let spikes = (0..2 + n / 2)
                .map(|_| {
                    let x = rng.range(0.0, 800.0);
                    let y = rng.range(50.0, 550.0);
                    Rect::new(x, y, rng.range(40.0, 80.0), 20.0)
                })
                .collect();
            Layout {
                platforms,
                collectibles,
                spikes,
                goal: goal_at(800.0, 100.0),
                ball_start: Vec2::new(100.0, 500.0),
            }
        }
    }
}

/// Up-pointing triangle of `size` rotated to `gravity`, centred on `center`
fn arrow(center: Vec2, size: f32, gravity: Gravity) -> [Vec2; 3] {
    let rotation = Vec2::from_angle(gravity.arrow_angle());
    [
        Vec2::new(0.0, -size / 2.0),
        Vec2::new(size / 3.0, size / 2.0),
        Vec2::new(-size / 3.0, size / 2.0),
    ]
    .map(|p| center + rotation.rotate(p))
}

pub struct GravityBall {
    rng: GameRng,
    pub layout: Layout,
    pub ball: Vec2,
    pub vel: Vec2,
    pub gravity: Gravity,
    pub invincible_ticks: u32,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
}

impl GravityBall {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let layout = build_level(1, &mut rng);
        let mut game = Self {
            rng,
            ball: layout.ball_start,
            layout,
            vel: Vec2::ZERO,
            gravity: Gravity::Down,
            invincible_ticks: 0,
            score: 0,
            lives: START_LIVES,
            level: 1,
        };
        game.reset();
        game
    }

    /// Rebuild the current level with the ball at its start
    fn load_level(&mut self) {
        self.layout = build_level(self.level, &mut self.rng);
        self.ball = self.layout.ball_start;
        self.vel = Vec2::ZERO;
        self.gravity = Gravity::Down;
    }

    fn ball_box(&self) -> Rect {
        Rect::around_circle(self.ball, BALL_RADIUS)
    }

    pub fn integrate(&mut self) {
        self.vel += self.gravity.vector() * GRAVITY;
        self.vel *= DAMPING;
        self.ball += self.vel;

        for platform in &self.layout.platforms {
            resolve_circle_rect(&mut self.ball, &mut self.vel, BALL_RADIUS, platform, RESTITUTION);
        }
        bounce_in_bounds(
            &mut self.ball,
            &mut self.vel,
            BALL_RADIUS,
            Vec2::new(WIDTH, HEIGHT),
            RESTITUTION,
        );
    }

    fn collect(&mut self) {
        for orb in self.layout.collectibles.iter_mut().filter(|c| !c.collected) {
            if circles_overlap(self.ball, BALL_RADIUS, orb.pos, orb.radius) {
                orb.collected = true;
                self.score += orb.points;
            }
        }
    }

    /// Spike contact; false once the last life is spent
    fn check_spikes(&mut self) -> bool {
        if self.invincible_ticks > 0 {
            return true;
        }
        let ball = self.ball_box();
        if !self.layout.spikes.iter().any(|s| ball.overlaps(s)) {
            return true;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return false;
        }
        self.load_level();
        self.invincible_ticks = INVINCIBLE_TICKS;
        true
    }

    fn draw_spikes(&self, surface: &mut dyn Surface) {
        for spike in &self.layout.spikes {
            let mut i = 0.0;
            while i < spike.w {
                surface.fill_polygon(
                    &[
                        Vec2::new(spike.x + i, spike.bottom()),
                        Vec2::new(spike.x + i + 10.0, spike.y),
                        Vec2::new(spike.x + i + 20.0, spike.bottom()),
                    ],
                    SPIKE,
                );
                i += 20.0;
            }
        }
    }

    fn draw_controls(surface: &mut dyn Surface) {
        let (x, y) = (WIDTH - 140.0, 24.0);
        surface.fill_rect(x, y, 116.0, 92.0, Color::BLACK.with_alpha(0.5));
        let lines = ["GRAVITY:", "Up/W: Up", "Down/S: Down", "Left/A: Left", "Right/D: Right"];
        for (i, line) in lines.iter().enumerate() {
            surface.text(
                Vec2::new(x + 10.0, y + 10.0 + i as f32 * 15.0),
                11.0,
                TextAlign::Left,
                colors::WHITE,
                line,
            );
        }
    }
}

impl Game for GravityBall {
    fn info(&self) -> &'static GameInfo {
        &INFO
    }

    fn reset(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.invincible_ticks = 0;
        self.load_level();
    }

    fn tick(&mut self, input: &mut Input, _dt: f32) -> Outcome {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);

        for key in input.take_pressed() {
            if let Some(gravity) = Gravity::from_key(key) {
                self.gravity = gravity;
            }
        }

        self.integrate();
        self.collect();
        if !self.check_spikes() {
            return Outcome::GameOver;
        }

        if self.ball_box().overlaps(&self.layout.goal) {
            self.score += GOAL_BONUS;
            log::info!("Gravity Ball level {} complete", self.level);
            return Outcome::LevelCleared {
                pause_ticks: LEVEL_PAUSE_TICKS,
            };
        }
        Outcome::Continue
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.load_level();
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

        let hint = colors::WHITE.with_alpha(0.1);
        for i in 0..5 {
            for j in 0..5 {
                let center = Vec2::new(
                    (i + 1) as f32 * WIDTH / 6.0,
                    (j + 1) as f32 * HEIGHT / 6.0,
                );
                surface.fill_polygon(&arrow(center, 30.0, self.gravity), hint);
            }
        }

        for p in &self.layout.platforms {
            surface.fill_rect(p.x, p.y, p.w, p.h, PLATFORM);
            surface.stroke_rect(p.x, p.y, p.w, p.h, 2.0, PLATFORM_EDGE);
        }
        self.draw_spikes(surface);

        let orb_scale = view.pulse(200.0, 0.8, 0.2);
        for orb in self.layout.collectibles.iter().filter(|c| !c.collected) {
            surface.fill_circle(orb.pos, orb.radius * orb_scale, ORB);
            surface.stroke_circle(orb.pos, orb.radius * orb_scale, 2.0, ORB_EDGE);
        }

        let g = self.layout.goal;
        surface.fill_rect(g.x, g.y, g.w, g.h, GOAL_EDGE.with_alpha(view.pulse(300.0, 0.9, 0.1)));
        surface.stroke_rect(g.x, g.y, g.w, g.h, 3.0, GOAL_EDGE);

        if !(self.invincible_ticks > 0 && view.blink_hidden()) {
            surface.fill_circle(self.ball, BALL_RADIUS, BALL);
            surface.stroke_circle(self.ball, BALL_RADIUS, 3.0, BALL_EDGE);
            surface.fill_polygon(&arrow(self.ball, BALL_RADIUS, self.gravity), colors::WHITE);
        }

        Self::draw_controls(surface);

        if view.in_transition() {
            surface.fill_rect(0.0, 0.0, WIDTH, HEIGHT, Color::BLACK.with_alpha(0.7));
            surface.text(
                Vec2::new(WIDTH / 2.0, HEIGHT / 2.0 - 48.0),
                48.0,
                TextAlign::Center,
                GOAL_EDGE,
                "LEVEL COMPLETE!",
            );
            surface.text(
                Vec2::new(WIDTH / 2.0, HEIGHT / 2.0 + 26.0),
                24.0,
                TextAlign::Center,
                colors::WHITE,
                "+500 BONUS",
            );
        }
    }
}
