//! Persisted best score
//!
//! A single integer scalar. The core submits the final score at session
//! end; the store is only written when the score improves.

use crate::persistence::{HIGH_SCORE_KEY, Storage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Load the stored value; missing or non-numeric data reads as zero
    pub fn load(storage: &dyn Storage) -> Self {
        let best = storage
            .get(HIGH_SCORE_KEY)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Self { best }
    }

    /// Record a finished session's score. Persists and returns true only
    /// on a new best.
    pub fn submit(&mut self, score: u32, storage: &mut dyn Storage) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        storage.set(HIGH_SCORE_KEY, &score.to_string());
        log::info!("new high score: {score}");
        true
    }
}
