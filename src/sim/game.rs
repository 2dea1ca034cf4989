//! The capability every game provides to the session driver

use crate::games::GameId;
use crate::renderer::{Color, Surface};

use super::input::Input;
use super::session::Phase;

/// Static description of a game
#[derive(Debug)]
pub struct GameInfo {
    pub id: GameId,
    pub title: &'static str,
    /// One-line blurb shown under the title on the game screen
    pub tagline: &'static str,
    /// Start-overlay lines
    pub instructions: &'static [&'static str],
    pub width: f32,
    pub height: f32,
    pub background: Color,
    /// Colour of the life markers in the HUD
    pub accent: Color,
}

/// What a tick asks the session to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Level finished; hold for `pause_ticks` before `advance_level`
    LevelCleared { pause_ticks: u32 },
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudStyle {
    Large,
    Normal,
    Dim,
}

/// One line of the top-left HUD
#[derive(Debug, Clone, PartialEq)]
pub enum HudLine {
    Text { style: HudStyle, text: String },
    Lives(u32),
}

impl HudLine {
    pub fn large(text: impl Into<String>) -> Self {
        HudLine::Text {
            style: HudStyle::Large,
            text: text.into(),
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        HudLine::Text {
            style: HudStyle::Normal,
            text: text.into(),
        }
    }

    pub fn dim(text: impl Into<String>) -> Self {
        HudLine::Text {
            style: HudStyle::Dim,
            text: text.into(),
        }
    }
}

/// Read-only context handed to `Game::render`
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub phase: Phase,
    /// Wall-clock milliseconds, cosmetic animation only
    pub clock_ms: f64,
    pub high_score: u64,
    /// Blinking and pulsing allowed
    pub flashing: bool,
    pub starfield: bool,
    /// Circle tessellation hint forwarded from quality settings
    pub circle_segments: u32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            phase: Phase::Running,
            clock_ms: 0.0,
            high_score: 0,
            flashing: true,
            starfield: true,
            circle_segments: 24,
        }
    }
}

impl View {
    /// Invincibility blink: hidden on even 100 ms slots
    pub fn blink_hidden(&self) -> bool {
        self.flashing && ((self.clock_ms / 100.0).floor() as i64) % 2 == 0
    }

    /// `base + amplitude * sin(t / period)`, steady at `base` without flashing
    pub fn pulse(&self, period_ms: f64, base: f32, amplitude: f32) -> f32 {
        if !self.flashing {
            return base;
        }
        base + amplitude * (self.clock_ms / period_ms).sin() as f32
    }

    pub fn in_transition(&self) -> bool {
        matches!(self.phase, Phase::LevelTransition { .. })
    }
}

/// A single arcade game: owns its state, advances one fixed step at a time
/// and paints itself.
pub trait Game {
    fn info(&self) -> &'static GameInfo;

    /// Fresh run: score 0, first level, full lives
    fn reset(&mut self);

    /// One fixed simulation step while running
    fn tick(&mut self, input: &mut Input, dt: f32) -> Outcome;

    /// Step during a level transition. Most games freeze.
    fn tick_transition(&mut self, input: &mut Input, _dt: f32) {
        input.take_pressed();
    }

    fn advance_level(&mut self);

    fn score(&self) -> u64;

    fn level(&self) -> u32;

    /// Top-left HUD lines. Empty when the game draws its own panel.
    fn hud(&self) -> Vec<HudLine> {
        Vec::new()
    }

    /// Extra game-over lines under the final score
    fn summary(&self) -> Vec<String> {
        vec![format!("Level Reached: {}", self.level())]
    }

    fn render(&self, surface: &mut dyn Surface, view: &View);
}

impl Game for Box<dyn Game> {
    fn info(&self) -> &'static GameInfo {
        (**self).info()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn tick(&mut self, input: &mut Input, dt: f32) -> Outcome {
        (**self).tick(input, dt)
    }

    fn tick_transition(&mut self, input: &mut Input, dt: f32) {
        (**self).tick_transition(input, dt)
    }

    fn advance_level(&mut self) {
        (**self).advance_level()
    }

    fn score(&self) -> u64 {
        (**self).score()
    }

    fn level(&self) -> u32 {
        (**self).level()
    }

    fn hud(&self) -> Vec<HudLine> {
        (**self).hud()
    }

    fn summary(&self) -> Vec<String> {
        (**self).summary()
    }

    fn render(&self, surface: &mut dyn Surface, view: &View) {
        (**self).render(surface, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_slots() {
        let mut view = View::default();
        view.clock_ms = 50.0;
        assert!(view.blink_hidden());
        view.clock_ms = 150.0;
        assert!(!view.blink_hidden());
        view.flashing = false;
        view.clock_ms = 50.0;
        assert!(!view.blink_hidden());
    }

    #[test]
    fn test_pulse_is_steady_without_flashing() {
        let view = View {
            flashing: false,
            clock_ms: 1234.0,
            ..Default::default()
        };
        assert_eq!(view.pulse(200.0, 0.8, 0.2), 0.8);
    }
}
