//! The game catalog
//!
//! Six independent games; none shares state with another.

pub mod asteroid;
pub mod galaga;
pub mod gravity_ball;
pub mod snake;
pub mod space_invaders;
pub mod tetris;

use serde::{Deserialize, Serialize};

use crate::sim::{Game, GameInfo};

pub use asteroid::Asteroid;
pub use galaga::Galaga;
pub use gravity_ball::GravityBall;
pub use snake::Snake;
pub use space_invaders::SpaceInvaders;
pub use tetris::Tetris;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    Asteroid,
    Snake,
    Tetris,
    SpaceInvaders,
    Galaga,
    GravityBall,
}

impl GameId {
    /// Landing page order; the first entry is featured
    pub const ALL: [GameId; 6] = [
        GameId::Asteroid,
        GameId::Snake,
        GameId::Tetris,
        GameId::SpaceInvaders,
        GameId::Galaga,
        GameId::GravityBall,
    ];

    /// Route segment, as in `#/games/<slug>`
    pub fn slug(self) -> &'static str {
        match self {
            GameId::Asteroid => "asteroid",
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::SpaceInvaders => "space-invaders",
            GameId::Galaga => "galaga",
            GameId::GravityBall => "gravity-ball",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.slug() == slug)
    }

    pub fn featured(self) -> bool {
        self == GameId::Asteroid
    }

    pub fn icon(self) -> &'static str {
        match self {
            GameId::Asteroid => "🚀",
            GameId::Snake => "🐍",
            GameId::Tetris => "🎮",
            GameId::SpaceInvaders => "👾",
            GameId::Galaga => "🛸",
            GameId::GravityBall => "⚡",
        }
    }

    /// Landing page blurb
    pub fn description(self) -> &'static str {
        match self {
            GameId::Asteroid => {
                "Navigate your spaceship through an asteroid field. Shoot and destroy asteroids while avoiding collisions."
            }
            GameId::Snake => {
                "Classic snake game with a modern twist. Eat food, grow longer, and avoid hitting yourself!"
            }
            GameId::Tetris => {
                "Stack blocks and clear lines in this timeless puzzle game. The classic that never gets old!"
            }
            GameId::SpaceInvaders => {
                "Defend Earth from waves of alien invaders. Shoot them down before they reach you!"
            }
            GameId::Galaga => {
                "Battle against diving alien fighters in this arcade classic. Watch out for their attack patterns!"
            }
            GameId::GravityBall => {
                "Control gravity to navigate through challenging levels. Change direction to reach the goal!"
            }
        }
    }

    pub fn info(self) -> &'static GameInfo {
        match self {
            GameId::Asteroid => &asteroid::INFO,
            GameId::Snake => &snake::INFO,
            GameId::Tetris => &tetris::INFO,
            GameId::SpaceInvaders => &space_invaders::INFO,
            GameId::Galaga => &galaga::INFO,
            GameId::GravityBall => &gravity_ball::INFO,
        }
    }

    /// Fresh game state seeded for this visit
    pub fn create(self, seed: u64) -> Box<dyn Game> {
        match self {
            GameId::Asteroid => Box::new(Asteroid::new(seed)),
            GameId::Snake => Box::new(Snake::new(seed)),
            GameId::Tetris => Box::new(Tetris::new(seed)),
            GameId::SpaceInvaders => Box::new(SpaceInvaders::new(seed)),
            GameId::Galaga => Box::new(Galaga::new(seed)),
            GameId::GravityBall => Box::new(GravityBall::new(seed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawList;
    use crate::sim::{Input, Key, View};
    use glam::Vec2;

    #[test]
    fn test_slugs_round_trip() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_slug(id.slug()), Some(id));
            assert_eq!(id.info().id, id);
        }
        assert_eq!(GameId::from_slug("pong"), None);
    }

    #[test]
    fn test_exactly_one_featured() {
        assert_eq!(GameId::ALL.iter().filter(|id| id.featured()).count(), 1);
    }

    #[test]
    fn test_every_game_survives_a_scripted_minute() {
        let keys = [Key::Left, Key::Space, Key::Up, Key::Right, Key::Down, Key::D];
        for id in GameId::ALL {
            let mut game = id.create(99);
            game.reset();
            let mut input = Input::new();
            let mut last_score = 0;
            for t in 0..3600u32 {
                if t % 20 == 0 {
                    let key = keys[(t / 20) as usize % keys.len()];
                    input.key_down(key);
                    input.key_up(key);
                }
                let outcome = game.tick(&mut input, crate::consts::SIM_DT);
                assert!(game.score() >= last_score, "{} score went down", id.slug());
                last_score = game.score();
                match outcome {
                    crate::sim::Outcome::GameOver => break,
                    crate::sim::Outcome::LevelCleared { .. } => game.advance_level(),
                    crate::sim::Outcome::Continue => {}
                }
            }
            let info = id.info();
            let mut list = DrawList::new(Vec2::new(info.width, info.height));
            game.render(&mut list, &View::default());
            assert!(!list.is_empty());
        }
    }
}
