//! Keyboard input collection
//!
//! Held keys are level-triggered flags. Key-down edges are queued once per
//! frame and drained by the first simulation tick that runs.

use serde::{Deserialize, Serialize};

/// Keys the games understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    W,
    A,
    S,
    D,
}

impl Key {
    pub const COUNT: usize = 11;

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowDown" | "Down" => Some(Key::Down),
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            "w" | "W" => Some(Key::W),
            "a" | "A" => Some(Key::A),
            "s" | "S" => Some(Key::S),
            "d" | "D" => Some(Key::D),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-screen input state
#[derive(Debug, Clone, Default)]
pub struct Input {
    held: [bool; Key::COUNT],
    pressed: Vec<Key>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Auto-repeat events land here too; an edge already
    /// pending for this frame is not queued twice.
    pub fn key_down(&mut self, key: Key) {
        self.held[key.index()] = true;
        if !self.pressed.contains(&key) {
            self.pressed.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held[key.index()] = false;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held[key.index()]
    }

    /// Drain queued key-down edges in arrival order
    pub fn take_pressed(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.pressed)
    }

    pub fn has_pending(&self) -> bool {
        !self.pressed.is_empty()
    }

    /// Forget everything, used on start and teardown
    pub fn clear(&mut self) {
        self.held = [false; Key::COUNT];
        self.pressed.clear();
    }
}
