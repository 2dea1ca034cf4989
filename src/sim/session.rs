//! Session driver: phase state machine, fixed-timestep accumulator,
//! high score and the start / game-over overlays shared by every game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::game::{Game, HudLine, HudStyle, Outcome, View};
use super::input::{Input, Key};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::games::GameId;
use crate::renderer::{Color, Surface, TextAlign, colors};
use crate::settings::Settings;

/// Lifecycle of a game screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Start overlay visible, nothing moves
    NotStarted,
    /// Active gameplay
    Running,
    /// Between levels; the game decides whether anything still moves
    LevelTransition { remaining: u32 },
    /// Run ended, waiting for restart
    GameOver,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub game: GameId,
    pub score: u64,
    pub level: u32,
    pub new_high_score: bool,
    /// Simulation ticks the run lasted
    pub ticks: u64,
}

pub struct Session<G: Game> {
    game: G,
    phase: Phase,
    input: Input,
    accumulator: f32,
    ticks: u64,
    high_score: u64,
    finished: Option<RunSummary>,
    /// Leaderboard place of the last finished run
    rank: Option<usize>,
}

impl<G: Game> Session<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            phase: Phase::NotStarted,
            input: Input::new(),
            accumulator: 0.0,
            ticks: 0,
            high_score: 0,
            finished: None,
            rank: None,
        }
    }

    /// Carry a best score over from an earlier mount
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.high_score = high_score;
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Begin (or restart) a run
    pub fn start(&mut self) {
        self.game.reset();
        self.input.take_pressed();
        self.accumulator = 0.0;
        self.ticks = 0;
        self.finished = None;
        self.rank = None;
        self.phase = Phase::Running;
        log::info!("{} started", self.game.info().title);
    }

    pub fn key_down(&mut self, key: Key) {
        match self.phase {
            Phase::NotStarted | Phase::GameOver if key == Key::Enter => self.start(),
            _ => self.input.key_down(key),
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    /// Release all keys, used when the screen is torn down
    pub fn release_input(&mut self) {
        self.input.clear();
    }

    /// Feed one display frame. Returns the number of fixed steps run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// One fixed simulation step
    pub fn step(&mut self) {
        match self.phase {
            Phase::NotStarted | Phase::GameOver => {
                self.input.take_pressed();
            }
            Phase::Running => {
                self.ticks += 1;
                match self.game.tick(&mut self.input, SIM_DT) {
                    Outcome::Continue => {}
                    Outcome::LevelCleared { pause_ticks: 0 } => self.advance_level(),
                    Outcome::LevelCleared { pause_ticks } => {
                        self.phase = Phase::LevelTransition {
                            remaining: pause_ticks,
                        };
                    }
                    Outcome::GameOver => self.finish(),
                }
            }
            Phase::LevelTransition { remaining } => {
                self.ticks += 1;
                self.game.tick_transition(&mut self.input, SIM_DT);
                if remaining <= 1 {
                    self.phase = Phase::Running;
                    self.advance_level();
                } else {
                    self.phase = Phase::LevelTransition {
                        remaining: remaining - 1,
                    };
                }
            }
        }
    }

    fn advance_level(&mut self) {
        self.game.advance_level();
        log::info!(
            "{} advanced to level {}",
            self.game.info().title,
            self.game.level()
        );
    }

    fn finish(&mut self) {
        let score = self.game.score();
        let new_high_score = score > self.high_score;
        self.high_score = self.high_score.max(score);
        self.phase = Phase::GameOver;
        log::info!(
            "{} over: score {} level {}{}",
            self.game.info().title,
            score,
            self.game.level(),
            if new_high_score { " (new best)" } else { "" }
        );
        self.finished = Some(RunSummary {
            game: self.game.info().id,
            score,
            level: self.game.level(),
            new_high_score,
            ticks: self.ticks,
        });
    }

    /// Hand out the summary of the run that just ended, once
    pub fn take_finished(&mut self) -> Option<RunSummary> {
        self.finished.take()
    }

    /// Show where the finished run landed on the visit's leaderboard
    pub fn set_rank(&mut self, rank: Option<usize>) {
        self.rank = rank;
    }

    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub fn view(&self, clock_ms: f64, settings: &Settings) -> View {
        View {
            phase: self.phase,
            clock_ms,
            high_score: self.high_score,
            flashing: settings.effective_flashing(),
            starfield: settings.quality.starfield_enabled(),
            circle_segments: settings.quality.circle_segments(),
        }
    }

    /// Paint the game, its HUD and whichever overlay the phase calls for
    pub fn render(&self, surface: &mut dyn Surface, clock_ms: f64, settings: &Settings) {
        let view = self.view(clock_ms, settings);
        self.game.render(surface, &view);
        self.draw_hud(surface);

        match self.phase {
            Phase::NotStarted => self.draw_start_overlay(surface),
            Phase::GameOver => self.draw_game_over_overlay(surface),
            Phase::Running | Phase::LevelTransition { .. } => {}
        }
    }

    fn draw_hud(&self, surface: &mut dyn Surface) {
        let accent = self.game.info().accent;
        let mut lines = self.game.hud();
        if lines.is_empty() {
            return;
        }
        lines.push(HudLine::dim(format!("High: {}", self.high_score)));

        let mut y = 24.0;
        for line in lines {
            match line {
                HudLine::Text { style, text } => {
                    let (size, color, advance) = match style {
                        HudStyle::Large => (24.0, colors::WHITE, 34.0),
                        HudStyle::Normal => (18.0, colors::WHITE, 28.0),
                        HudStyle::Dim => (14.0, colors::HUD_DIM, 24.0),
                    };
                    surface.text(Vec2::new(24.0, y), size, TextAlign::Left, color, &text);
                    y += advance;
                }
                HudLine::Lives(count) => {
                    surface.text(Vec2::new(24.0, y), 18.0, TextAlign::Left, colors::WHITE, "LIVES:");
                    for i in 0..count {
                        let center = Vec2::new(110.0 + i as f32 * 22.0, y + 9.0);
                        surface.fill_circle(center, 8.0, accent);
                    }
                    y += 28.0;
                }
            }
        }
    }

    fn draw_start_overlay(&self, surface: &mut dyn Surface) {
        let info = self.game.info();
        let size = surface.size();
        let cx = size.x / 2.0;
        let lines = info.instructions;
        let block = 40.0 + lines.len() as f32 * 30.0 + 60.0;
        let mut y = (size.y - block) / 2.0;

        surface.fill_rect(0.0, 0.0, size.x, size.y, colors::OVERLAY);
        surface.text(Vec2::new(cx, y), 44.0, TextAlign::Center, colors::WHITE, info.title);
        y += 70.0;
        for line in lines {
            surface.text(Vec2::new(cx, y), 18.0, TextAlign::Center, colors::WHITE, line);
            y += 30.0;
        }
        y += 30.0;
        surface.text(
            Vec2::new(cx, y),
            22.0,
            TextAlign::Center,
            colors::PROMPT,
            "PRESS ENTER TO START",
        );
    }

    fn draw_game_over_overlay(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        let cx = size.x / 2.0;
        let score = self.game.score();
        let summary = self.game.summary();
        let mut y = size.y / 2.0 - 120.0;

        surface.fill_rect(0.0, 0.0, size.x, size.y, colors::OVERLAY);
        surface.text(Vec2::new(cx, y), 44.0, TextAlign::Center, colors::GAME_OVER, "GAME OVER");
        y += 70.0;
        surface.text(
            Vec2::new(cx, y),
            26.0,
            TextAlign::Center,
            colors::WHITE,
            &format!("Final Score: {score}"),
        );
        y += 40.0;
        for line in &summary {
            surface.text(Vec2::new(cx, y), 18.0, TextAlign::Center, colors::WHITE, line);
            y += 28.0;
        }
        if score == self.high_score && score > 0 {
            surface.text(
                Vec2::new(cx, y),
                22.0,
                TextAlign::Center,
                Color::hex(0xffff00),
                "New High Score!",
            );
            y += 34.0;
        }
        if let Some(rank) = self.rank {
            surface.text(
                Vec2::new(cx, y),
                18.0,
                TextAlign::Center,
                colors::HUD_DIM,
                &format!("Rank #{rank} this visit"),
            );
            y += 28.0;
        }
        y += 16.0;
        surface.text(
            Vec2::new(cx, y),
            20.0,
            TextAlign::Center,
            colors::PROMPT,
            "PRESS ENTER TO PLAY AGAIN",
        );
    }
}
