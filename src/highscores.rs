//! Per-game leaderboards
//!
//! Kept in memory for the page visit only; a reload starts fresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::games::GameId;
use crate::sim::RunSummary;

/// Maximum number of entries per game
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level (or wave) reached
    pub level: u32,
}

/// Top scores of one game, sorted descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed), `None` if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score, returning the rank achieved
    pub fn add_score(&mut self, score: u64, level: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(rank - 1, HighScoreEntry { score, level });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// All leaderboards of the visit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    boards: BTreeMap<GameId, Leaderboard>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score for a game, 0 when it hasn't been played
    pub fn best(&self, game: GameId) -> u64 {
        self.boards
            .get(&game)
            .and_then(Leaderboard::top_score)
            .unwrap_or(0)
    }

    /// File a finished run; returns its rank if it made the board
    pub fn record(&mut self, run: &RunSummary) -> Option<usize> {
        let rank = self
            .boards
            .entry(run.game)
            .or_default()
            .add_score(run.score, run.level);
        if let Some(rank) = rank {
            log::info!("{} score {} ranked #{}", run.game.slug(), run.score, rank);
        }
        rank
    }
}
