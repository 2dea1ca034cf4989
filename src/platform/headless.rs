//! Windowless runs for the native binary
//!
//! Each game is driven through a `Session` with a fixed key script and drawn
//! into a `DrawList` every tick, so both the simulation and the paint code run.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::{Parser, ValueEnum};
use glam::Vec2;

use crate::consts::TICK_MS;
use crate::games::GameId;
use crate::renderer::DrawList;
use crate::settings::Settings;
use crate::sim::{Key, RunSummary, Session};

pub const DEFAULT_TICKS: u64 = 3600;
/// One simulated hour
pub const MAX_TICKS: u64 = 216_000;

/// Ticks each scripted key stays held
const KEY_HOLD_TICKS: u64 = 15;

const SCRIPT: [Key; 8] = [
    Key::Left,
    Key::Space,
    Key::Up,
    Key::Right,
    Key::Space,
    Key::Down,
    Key::D,
    Key::Space,
];

/// Which games to run
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameChoice {
    All,
    Asteroid,
    Snake,
    Tetris,
    SpaceInvaders,
    Galaga,
    GravityBall,
}

#[cfg(not(target_arch = "wasm32"))]
impl GameChoice {
    pub fn games(self) -> Vec<GameId> {
        let one = match self {
            GameChoice::All => return GameId::ALL.to_vec(),
            GameChoice::Asteroid => GameId::Asteroid,
            GameChoice::Snake => GameId::Snake,
            GameChoice::Tetris => GameId::Tetris,
            GameChoice::SpaceInvaders => GameId::SpaceInvaders,
            GameChoice::Galaga => GameId::Galaga,
            GameChoice::GravityBall => GameId::GravityBall,
        };
        vec![one]
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "arcade-reborn")]
#[command(about = "Play the arcade games headlessly and print one JSON summary per run")]
pub struct RunnerArgs {
    /// Game to run
    #[arg(value_enum, default_value_t = GameChoice::All)]
    pub game: GameChoice,

    /// Simulation ticks per game (60 per second)
    #[arg(
        long,
        value_name = "TICKS",
        default_value_t = DEFAULT_TICKS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TICKS)
    )]
    pub ticks: u64,

    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// RNG seed, defaults to the current time
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Play `id` for at most `ticks` steps. A run still alive at the end is
/// summarised as it stands.
pub fn run_game(id: GameId, ticks: u64, seed: u64, settings: &Settings) -> RunSummary {
    let info = id.info();
    let mut session = Session::new(id.create(seed));
    let mut list = DrawList::new(Vec2::new(info.width, info.height));
    session.key_down(Key::Enter);
    session.key_up(Key::Enter);

    let mut held: Option<Key> = None;
    for t in 0..ticks {
        if t % KEY_HOLD_TICKS == 0 {
            if let Some(key) = held.take() {
                session.key_up(key);
            }
            let key = SCRIPT[(t / KEY_HOLD_TICKS) as usize % SCRIPT.len()];
            session.key_down(key);
            held = Some(key);
        }
        session.step();

        list.reset(Vec2::new(info.width, info.height));
        session.render(&mut list, t as f64 * TICK_MS as f64, settings);

        if let Some(run) = session.take_finished() {
            return run;
        }
    }

    log::debug!("{} still running after {} ticks", id.slug(), ticks);
    let game = session.game();
    RunSummary {
        game: id,
        score: game.score(),
        level: game.level(),
        new_high_score: false,
        ticks: session.ticks(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<RunnerArgs, clap::Error> {
        RunnerArgs::try_parse_from(std::iter::once("arcade-reborn").chain(list.iter().copied()))
    }

    #[test]
    fn test_default_args_run_everything() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.game.games(), GameId::ALL.to_vec());
        assert_eq!(parsed.ticks, DEFAULT_TICKS);
        assert_eq!(parsed.settings, None);
        assert_eq!(parsed.seed, None);
    }

    #[test]
    fn test_explicit_args() {
        let parsed = args(&[
            "space-invaders",
            "--ticks",
            "120",
            "--settings",
            "low.json",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(parsed.game.games(), vec![GameId::SpaceInvaders]);
        assert_eq!(parsed.ticks, 120);
        assert_eq!(parsed.settings, Some(PathBuf::from("low.json")));
        assert_eq!(parsed.seed, Some(7));
    }

    #[test]
    fn test_choices_match_slugs() {
        for id in GameId::ALL {
            let parsed = args(&[id.slug()]).unwrap();
            assert_eq!(parsed.game.games(), vec![id]);
        }
    }

    #[test]
    fn test_bad_args() {
        let err = args(&["pong"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(args(&["--ticks", "0"]).is_err());
        assert!(args(&["--ticks", "many"]).is_err());
        assert!(args(&["--ticks", "216001"]).is_err());
        assert!(args(&["all", "--ticks", "216000"]).is_ok());
    }

    #[test]
    fn test_run_is_reproducible() {
        let settings = Settings::default();
        for id in GameId::ALL {
            let a = run_game(id, 600, 7, &settings);
            let b = run_game(id, 600, 7, &settings);
            assert_eq!(a, b, "{} diverged", id.slug());
            assert_eq!(a.game, id);
            assert!(a.ticks <= 600);
            assert!(a.level >= 1);
        }
    }

    #[test]
    fn test_summary_serialises() {
        let run = run_game(GameId::Snake, 30, 1, &Settings::default());
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"game\":\"snake\""));
    }
}
