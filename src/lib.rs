//! Arcade Reborn - six classic arcade games in the browser
//!
//! Core modules:
//! - `sim`: Shared game-loop machinery (input, collision, session phases)
//! - `games`: The six games, each a `Game` implementation
//! - `renderer`: Drawing surface, tessellation and the WebGPU pipeline
//! - `platform`: Browser routing and screen mounting, plus the headless runner
//! - `highscores`: Per-visit best scores
//! - `settings`: Visual preferences loaded from JSON

pub mod games;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use games::GameId;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

/// Loop configuration constants
pub mod consts {
    /// Fixed simulation timestep. Every per-tick constant in `games` assumes 60 Hz.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed into the accumulator (tab switches, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Simulation milliseconds per tick, for games with millisecond timers
    pub const TICK_MS: f32 = SIM_DT * 1000.0;
}
