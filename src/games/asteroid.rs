//! Asteroid: a rotating, thrusting ship in a wrapping field of rocks
//!
//! Movement is expressed per tick (one tick = 1/60 s), so velocities are in
//! pixels per tick.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;

use crate::renderer::{Color, Surface, colors, starfield};
use crate::sim::collision::{circles_overlap, wrap};
use crate::sim::{Game, GameInfo, GameRng, HudLine, Input, Key, Outcome, View};

pub const WIDTH: f32 = 1200.0;
pub const HEIGHT: f32 = 800.0;
pub const SHIP_RADIUS: f32 = 15.0;
pub const ROTATION_SPEED: f32 = 0.1;
pub const THRUST: f32 = 0.15;
pub const FRICTION: f32 = 0.99;
pub const MAX_BULLETS: usize = 5;
pub const BULLET_SPEED: f32 = 5.0;
pub const BULLET_RADIUS: f32 = 2.0;
pub const BULLET_LIFESPAN: u32 = 60;
pub const ROCK_RADIUS: f32 = 50.0;
pub const ROCK_SPIN: f32 = 0.01;
pub const SAFE_SPAWN_DISTANCE: f32 = 150.0;
pub const INVINCIBLE_TICKS: u32 = 180;
pub const START_LIVES: u32 = 3;

const SHIP: Color = Color::hex(0x00ff00);
const FLAME: Color = Color::hex(0xff6600);
const ROCK: Color = Color::hex(0x888888);
const STAR_COUNT: u32 = 100;

pub static INFO: GameInfo = GameInfo {
    id: crate::games::GameId::Asteroid,
    title: "Asteroid",
    tagline: "Destroy all asteroids to advance to the next level!",
    instructions: &[
        "Left and Right arrows to rotate",
        "Up arrow to thrust",
        "SPACE to shoot",
    ],
    width: WIDTH,
    height: HEIGHT,
    background: Color::hex(0x1a1a1a),
    accent: SHIP,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub thrusting: bool,
}

impl Ship {
    fn spawn() -> Self {
        Self {
            pos: Vec2::new(WIDTH / 2.0, HEIGHT / 2.0),
            vel: Vec2::ZERO,
            angle: -FRAC_PI_2,
            thrusting: false,
        }
    }

    fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifespan: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rock {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub radius: f32,
    /// Per-vertex radius multipliers, 8 to 12 of them
    pub offsets: Vec<f32>,
}

impl Rock {
    fn new(rng: &mut GameRng, pos: Vec2, radius: f32) -> Self {
        let vertices = 8 + rng.index(5);
        let offsets = (0..vertices).map(|_| rng.range(0.5, 1.0)).collect();
        let heading = rng.angle();
        Self {
            pos,
            vel: Vec2::from_angle(heading) * (50.0 / radius),
            angle: rng.angle(),
            radius,
            offsets,
        }
    }

    /// Points earned for destroying a rock of this size
    pub fn points(&self) -> u64 {
        if self.radius > 30.0 {
            20
        } else if self.radius > 15.0 {
            50
        } else {
            100
        }
    }

    fn outline(&self) -> Vec<Vec2> {
        let n = self.offsets.len() as f32;
        let rotation = Vec2::from_angle(self.angle);
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let local = Vec2::from_angle(i as f32 / n * TAU) * self.radius * offset;
                self.pos + rotation.rotate(local)
            })
            .collect()
    }
}

pub struct Asteroid {
    rng: GameRng,
    pub ship: Ship,
    pub bullets: Vec<Bullet>,
    pub rocks: Vec<Rock>,
    pub invincible_ticks: u32,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
}

impl Asteroid {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: GameRng::new(seed),
            ship: Ship::spawn(),
            bullets: Vec::new(),
            rocks: Vec::new(),
            invincible_ticks: 0,
            score: 0,
            lives: START_LIVES,
            level: 1,
        };
        game.reset();
        game
    }

    /// Fresh ship, no bullets and a new field for the current level
    fn start_level(&mut self) {
        self.ship = Ship::spawn();
        self.bullets.clear();
        self.invincible_ticks = INVINCIBLE_TICKS;

        let center = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        let count = 3 + self.level;
        self.rocks = (0..count)
            .map(|_| {
                let pos = loop {
                    let p = Vec2::new(self.rng.range(0.0, WIDTH), self.rng.range(0.0, HEIGHT));
                    if p.distance(center) >= SAFE_SPAWN_DISTANCE {
                        break p;
                    }
                };
                Rock::new(&mut self.rng, pos, ROCK_RADIUS)
            })
            .collect();
        log::debug!("Asteroid level {} with {} rocks", self.level, count);
    }

    fn fire(&mut self) {
        if self.bullets.len() >= MAX_BULLETS {
            return;
        }
        let heading = self.ship.heading();
        self.bullets.push(Bullet {
            pos: self.ship.pos + heading * SHIP_RADIUS,
            vel: heading * BULLET_SPEED,
            lifespan: BULLET_LIFESPAN,
        });
    }

    fn update_ship(&mut self, input: &Input) {
        let ship = &mut self.ship;
        if input.is_held(Key::Left) {
            ship.angle -= ROTATION_SPEED;
        }
        if input.is_held(Key::Right) {
            ship.angle += ROTATION_SPEED;
        }
        ship.thrusting = input.is_held(Key::Up);
        if ship.thrusting {
            ship.vel += ship.heading() * THRUST;
        }
        ship.vel *= FRICTION;
        ship.pos += ship.vel;
        wrap(&mut ship.pos, Vec2::new(WIDTH, HEIGHT), 0.0);
    }

    fn update_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.pos += bullet.vel;
            bullet.lifespan = bullet.lifespan.saturating_sub(1);
            wrap(&mut bullet.pos, Vec2::new(WIDTH, HEIGHT), 0.0);
        }
        self.bullets.retain(|b| b.lifespan > 0);
    }

    fn update_rocks(&mut self) {
        for rock in &mut self.rocks {
            rock.pos += rock.vel;
            rock.angle += ROCK_SPIN;
            wrap(&mut rock.pos, Vec2::new(WIDTH, HEIGHT), rock.radius);
        }
    }

    /// Each bullet destroys at most one rock; newest bullets and rocks first
    fn bullet_collisions(&mut self) {
        for i in (0..self.bullets.len()).rev() {
            let bullet = self.bullets[i].pos;
            let hit = (0..self.rocks.len())
                .rev()
                .find(|&j| circles_overlap(bullet, BULLET_RADIUS, self.rocks[j].pos, self.rocks[j].radius));
            let Some(j) = hit else {
                continue;
            };
            let rock = self.rocks.remove(j);
            self.bullets.remove(i);
            self.score += rock.points();
            if rock.radius > 15.0 {
                let radius = rock.radius / 2.0;
                for _ in 0..2 {
                    let piece = Rock::new(&mut self.rng, rock.pos, radius);
                    self.rocks.push(piece);
                }
            }
        }
    }

    /// False when the last life is lost
    fn ship_collisions(&mut self) -> bool {
        if self.invincible_ticks > 0 {
            return true;
        }
        let hit = self
            .rocks
            .iter()
            .any(|r| circles_overlap(self.ship.pos, SHIP_RADIUS, r.pos, r.radius));
        if !hit {
            return true;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            return false;
        }
        self.ship.pos = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        self.ship.vel = Vec2::ZERO;
        self.invincible_ticks = INVINCIBLE_TICKS;
        true
    }

    fn draw_ship(&self, surface: &mut dyn Surface) {
        let r = SHIP_RADIUS;
        let rotation = self.ship.heading();
        let to_world = |x: f32, y: f32| self.ship.pos + rotation.rotate(Vec2::new(x, y));
        let hull = [
            to_world(r, 0.0),
            to_world(-r, -r / 2.0),
            to_world(-r / 2.0, 0.0),
            to_world(-r, r / 2.0),
        ];
        surface.stroke_polygon(&hull, 2.0, SHIP);
        if self.ship.thrusting {
            let flame = [
                to_world(-r / 2.0, 0.0),
                to_world(-r * 1.5, -r / 3.0),
                to_world(-r * 1.5, r / 3.0),
            ];
            surface.fill_polygon(&flame, FLAME);
        }
    }
}

impl Game for Asteroid {
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

        self.update_ship(input);
        self.update_bullets();
        self.update_rocks();
        self.bullet_collisions();
        if !self.ship_collisions() {
            return Outcome::GameOver;
        }

        if self.rocks.is_empty() {
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
            self.draw_ship(surface);
        }

        for bullet in &self.bullets {
            surface.fill_circle(bullet.pos, BULLET_RADIUS, colors::WHITE);
        }
        for rock in &self.rocks {
            surface.stroke_polygon(&rock.outline(), 2.0, ROCK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::renderer::{DrawCmd, DrawList};

    fn rock_at(game: &mut Asteroid, pos: Vec2, radius: f32) -> Rock {
        let mut rock = Rock::new(&mut game.rng, pos, radius);
        rock.vel = Vec2::ZERO;
        rock
    }

    #[test]
    fn test_level_one_layout() {
        let game = Asteroid::new(11);
        assert_eq!(game.rocks.len(), 4);
        let center = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        for rock in &game.rocks {
            assert!(rock.pos.distance(center) >= SAFE_SPAWN_DISTANCE);
            assert!((8..=12).contains(&rock.offsets.len()));
            assert!((rock.vel.length() - 1.0).abs() < 1e-4);
        }
        assert_eq!(game.invincible_ticks, INVINCIBLE_TICKS);
    }

    #[test]
    fn test_bullet_cap() {
        let mut game = Asteroid::new(11);
        game.rocks.clear();
        for _ in 0..8 {
            game.fire();
        }
        assert_eq!(game.bullets.len(), MAX_BULLETS);
        let tip = game.ship.pos + Vec2::new(0.0, -SHIP_RADIUS);
        assert!(game.bullets[0].pos.distance(tip) < 1e-3);
    }

    #[test]
    fn test_bullets_expire() {
        let mut game = Asteroid::new(11);
        game.rocks.clear();
        game.fire();
        for _ in 0..BULLET_LIFESPAN - 1 {
            game.update_bullets();
        }
        assert_eq!(game.bullets.len(), 1);
        game.update_bullets();
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn test_large_rock_splits() {
        let mut game = Asteroid::new(11);
        let rock = rock_at(&mut game, Vec2::new(100.0, 100.0), ROCK_RADIUS);
        game.rocks = vec![rock];
        game.bullets = vec![Bullet {
            pos: Vec2::new(100.0, 120.0),
            vel: Vec2::ZERO,
            lifespan: 10,
        }];
        game.bullet_collisions();
        assert_eq!(game.score, 20);
        assert!(game.bullets.is_empty());
        assert_eq!(game.rocks.len(), 2);
        assert!(game.rocks.iter().all(|r| r.radius == 25.0));
    }

    #[test]
    fn test_smallest_rock_vanishes() {
        let mut game = Asteroid::new(11);
        let rock = rock_at(&mut game, Vec2::new(100.0, 100.0), 12.5);
        game.rocks = vec![rock];
        game.bullets = vec![Bullet {
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            lifespan: 10,
        }];
        game.bullet_collisions();
        assert_eq!(game.score, 100);
        assert!(game.rocks.is_empty());
    }

    #[test]
    fn test_hit_costs_life_and_respawns() {
        let mut game = Asteroid::new(11);
        game.invincible_ticks = 0;
        game.ship.pos = Vec2::new(300.0, 300.0);
        game.ship.vel = Vec2::new(2.0, 0.0);
        let rock = rock_at(&mut game, Vec2::new(300.0, 300.0), ROCK_RADIUS);
        game.rocks = vec![rock];
        assert!(game.ship_collisions());
        assert_eq!(game.lives, 2);
        assert_eq!(game.ship.pos, Vec2::new(WIDTH / 2.0, HEIGHT / 2.0));
        assert_eq!(game.ship.vel, Vec2::ZERO);
        assert_eq!(game.invincible_ticks, INVINCIBLE_TICKS);
        // Invincible: a second overlap is ignored
        game.ship.pos = Vec2::new(300.0, 300.0);
        assert!(game.ship_collisions());
        assert_eq!(game.lives, 2);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut game = Asteroid::new(11);
        game.invincible_ticks = 1;
        game.lives = 1;
        let ship_pos = game.ship.pos;
        let rock = rock_at(&mut game, ship_pos, ROCK_RADIUS);
        game.rocks = vec![rock];
        let mut input = Input::new();
        assert_eq!(game.tick(&mut input, SIM_DT), Outcome::GameOver);
    }

    #[test]
    fn test_clearing_field_advances_level() {
        let mut game = Asteroid::new(11);
        game.rocks.clear();
        let mut input = Input::new();
        assert_eq!(
            game.tick(&mut input, SIM_DT),
            Outcome::LevelCleared { pause_ticks: 0 }
        );
        game.advance_level();
        assert_eq!(game.level, 2);
        assert_eq!(game.rocks.len(), 5);
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn test_thrust_and_friction() {
        let mut game = Asteroid::new(11);
        let mut input = Input::new();
        input.key_down(Key::Up);
        game.update_ship(&input);
        // Facing up: thrust pulls negative y
        assert!((game.ship.vel.y + THRUST * FRICTION).abs() < 1e-5);
        assert!(game.ship.vel.x.abs() < 1e-5);
        assert!(game.ship.thrusting);
    }

    #[test]
    fn test_invincible_ship_blinks() {
        let game = Asteroid::new(11);
        let strokes = |list: &DrawList| {
            list.commands()
                .iter()
                .filter(|c| matches!(c, DrawCmd::StrokePolygon { color, .. } if *color == SHIP))
                .count()
        };
        let size = Vec2::new(WIDTH, HEIGHT);
        let mut hidden = DrawList::new(size);
        game.render(&mut hidden, &View { clock_ms: 0.0, ..View::default() });
        assert_eq!(strokes(&hidden), 0);
        let mut shown = DrawList::new(size);
        game.render(&mut shown, &View { clock_ms: 150.0, ..View::default() });
        assert_eq!(strokes(&shown), 1);
        // Flashing disabled keeps the ship visible
        let mut steady = DrawList::new(size);
        game.render(&mut steady, &View { flashing: false, ..View::default() });
        assert_eq!(strokes(&steady), 1);
    }
}
