//! Shared simulation machinery
//!
//! Everything here is deterministic given a seed and an input sequence.
//! Games own their state; the session drives them at a fixed timestep.

pub mod collision;
pub mod game;
pub mod input;
pub mod rng;
pub mod session;

pub use collision::Rect;
pub use game::{Game, GameInfo, HudLine, Outcome, View};
pub use input::{Input, Key};
pub use rng::GameRng;
pub use session::{Phase, RunSummary, Session};
