//! Difficulty profiles
//!
//! A profile is an immutable preset selected once per session start and
//! persisted by name. Unknown or missing names fall back to Normal.

use crate::persistence::{DIFFICULTY_KEY, Storage};

/// Named difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// The knobs a difficulty turns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub label: &'static str,
    /// Base balloon spawn interval (ms) before level scaling
    pub spawn_ms: f32,
    /// Multiplier on balloon rise speed
    pub speed: f32,
    /// Misses that end the session
    pub miss_limit: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn profile(&self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &DifficultyProfile {
                label: "Easy",
                spawn_ms: 1400.0,
                speed: 0.9,
                miss_limit: 7,
            },
            Difficulty::Normal => &DifficultyProfile {
                label: "Normal",
                spawn_ms: 1200.0,
                speed: 1.0,
                miss_limit: 5,
            },
            Difficulty::Hard => &DifficultyProfile {
                label: "Hard",
                spawn_ms: 1000.0,
                speed: 1.15,
                miss_limit: 4,
            },
        }
    }

    /// Persisted name
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Difficulty::ALL.into_iter().find(|d| d.as_str() == s)
    }

    /// Load the stored selection; anything unrecognized is Normal
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(DIFFICULTY_KEY) {
            Some(name) => Difficulty::from_str(&name).unwrap_or_else(|| {
                log::warn!("unknown stored difficulty {name:?}, using normal");
                Difficulty::Normal
            }),
            None => Difficulty::Normal,
        }
    }

    /// Write-through on selection change
    pub fn save(&self, storage: &mut dyn Storage) {
        storage.set(DIFFICULTY_KEY, self.as_str());
    }
}
