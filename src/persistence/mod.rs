//! Key-value storage seam
//!
//! The core persists exactly three scalar keys: the high score, the
//! difficulty name, and the serialized key-binding map. The host supplies
//! the backing store (LocalStorage in a browser shell, a file, or nothing
//! at all); the in-memory impl backs tests and the headless demo.

use std::collections::HashMap;

pub const HIGH_SCORE_KEY: &str = "balloon-blast-highscore";
pub const DIFFICULTY_KEY: &str = "balloon-blast-difficulty";
pub const BINDINGS_KEY: &str = "balloon-blast-bindings";

/// String key-value store. All persisted values are scalars or small
/// JSON blobs; failures on the host side surface as `None` and the
/// callers fall back to defaults.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Volatile store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(HIGH_SCORE_KEY), None);
        storage.set(HIGH_SCORE_KEY, "42");
        assert_eq!(storage.get(HIGH_SCORE_KEY), Some("42".to_string()));
        storage.set(HIGH_SCORE_KEY, "50");
        assert_eq!(storage.get(HIGH_SCORE_KEY), Some("50".to_string()));
    }
}
