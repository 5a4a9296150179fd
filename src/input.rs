//! Logical actions, rebindable keys, and raw input resolution
//!
//! The host forwards raw key/pointer/touch events into `InputState`; each
//! frame the sim reads a resolved `StepInput` out of it. Key bindings are
//! kept as an explicit bidirectional map so "which action owns this key"
//! is never answered by scanning, and every rebind preserves the
//! invariant that no two actions share a key.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::POINTER_FRESH_MS;
use crate::persistence::{BINDINGS_KEY, Storage};
use crate::sim::StepInput;

/// Logical player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    AimLeft,
    AimRight,
    Shoot,
    Pause,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::AimLeft,
        Action::AimRight,
        Action::Shoot,
        Action::Pause,
    ];

    /// Persisted name (also the host's data-action attribute)
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::AimLeft => "aimLeft",
            Action::AimRight => "aimRight",
            Action::Shoot => "shoot",
            Action::Pause => "pause",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|a| a.as_str() == s)
    }

    fn index(&self) -> usize {
        Action::ALL.iter().position(|a| a == self).unwrap_or(0)
    }

    fn default_key(&self) -> &'static str {
        match self {
            Action::MoveLeft => "a",
            Action::MoveRight => "d",
            Action::AimLeft => "ArrowLeft",
            Action::AimRight => "ArrowRight",
            Action::Shoot => " ",
            Action::Pause => "p",
        }
    }
}

/// Canonical form of a physical key identifier: single characters are
/// case-folded, named keys (Arrow*, Escape, ...) pass through.
pub fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Human-readable key name for binding buttons
pub fn format_key(key: &str) -> String {
    match key {
        " " => "Space".to_string(),
        "ArrowLeft" => "Arrow Left".to_string(),
        "ArrowRight" => "Arrow Right".to_string(),
        "ArrowUp" => "Arrow Up".to_string(),
        "ArrowDown" => "Arrow Down".to_string(),
        k if k.chars().count() == 1 => k.to_uppercase(),
        k => k.to_string(),
    }
}

/// Stored form of the binding map. Every field is optional so a partial
/// or hand-edited blob still overlays onto the defaults; unknown entries
/// are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredBindings {
    move_left: Option<String>,
    move_right: Option<String>,
    aim_left: Option<String>,
    aim_right: Option<String>,
    shoot: Option<String>,
    pause: Option<String>,
}

impl StoredBindings {
    fn snapshot(bindings: &Bindings) -> Self {
        Self {
            move_left: Some(bindings.key_for(Action::MoveLeft).to_string()),
            move_right: Some(bindings.key_for(Action::MoveRight).to_string()),
            aim_left: Some(bindings.key_for(Action::AimLeft).to_string()),
            aim_right: Some(bindings.key_for(Action::AimRight).to_string()),
            shoot: Some(bindings.key_for(Action::Shoot).to_string()),
            pause: Some(bindings.key_for(Action::Pause).to_string()),
        }
    }

    fn key(&self, action: Action) -> Option<&str> {
        let slot = match action {
            Action::MoveLeft => &self.move_left,
            Action::MoveRight => &self.move_right,
            Action::AimLeft => &self.aim_left,
            Action::AimRight => &self.aim_right,
            Action::Shoot => &self.shoot,
            Action::Pause => &self.pause,
        };
        slot.as_deref()
    }
}

/// Action-to-key mapping with its inverse kept in lockstep.
///
/// Binding key K to action A when K already belongs to action B swaps:
/// B receives A's previous key. No two actions ever share a key.
#[derive(Debug, Clone)]
pub struct Bindings {
    keys: [String; 6],
    owners: HashMap<String, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        let keys = Action::ALL.map(|a| a.default_key().to_string());
        let mut owners = HashMap::new();
        for action in Action::ALL {
            owners.insert(action.default_key().to_string(), action);
        }
        Self { keys, owners }
    }
}

impl Bindings {
    /// The key currently bound to `action`
    pub fn key_for(&self, action: Action) -> &str {
        &self.keys[action.index()]
    }

    /// The action owning `key`, if any
    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.owners.get(key).copied()
    }

    /// Bind `key` to `action`, swap-evicting any previous owner
    pub fn bind(&mut self, action: Action, key: &str) {
        let key = normalize_key(key);
        let previous = self.keys[action.index()].clone();
        if previous == key {
            return;
        }

        if let Some(evicted) = self.owners.get(&key).copied() {
            self.keys[evicted.index()] = previous.clone();
            self.owners.insert(previous, evicted);
        } else {
            self.owners.remove(&previous);
        }
        self.owners.insert(key.clone(), action);
        self.keys[action.index()] = key;
        log::debug!(
            "bound {} to {:?}",
            format_key(self.key_for(action)),
            action
        );
    }

    /// Serialize as the action-name -> key JSON map
    pub fn to_json(&self) -> String {
        serde_json::to_string(&StoredBindings::snapshot(self)).unwrap_or_default()
    }

    /// Parse stored bindings, overlaying valid entries onto the defaults.
    /// Malformed data falls back to the defaults silently.
    pub fn from_json(json: &str) -> Self {
        let mut bindings = Self::default();
        let Ok(stored) = serde_json::from_str::<StoredBindings>(json) else {
            log::warn!("malformed stored bindings, using defaults");
            return bindings;
        };
        for action in Action::ALL {
            if let Some(key) = stored.key(action) {
                bindings.bind(action, key);
            }
        }
        bindings
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(BINDINGS_KEY) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        storage.set(BINDINGS_KEY, &self.to_json());
    }
}

/// Pointer position plus the timestamp of its last movement
#[derive(Debug, Clone, Copy)]
struct Pointer {
    pos: Vec2,
    last_move_ms: f64,
}

/// Outcome of a key-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// Key consumed by an in-progress rebind capture
    Rebound(Action),
    /// Rebind capture cancelled by Escape
    BindCancelled,
    /// Normal key; the action it resolves to, if any
    Action(Option<Action>),
}

/// Raw input state written by event handlers, read by the step.
///
/// Single-writer: events are drained on the same task queue as the step,
/// so no handler ever runs concurrently with a frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: std::collections::HashSet<String>,
    touch: [bool; 6],
    pointer: Option<Pointer>,
    awaiting_bind: Option<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key-down. While a rebind capture is pending the key is
    /// consumed (or Escape cancels) and never reaches the held set.
    pub fn key_down(&mut self, key: &str, bindings: &mut Bindings) -> KeyPress {
        let key = normalize_key(key);
        if let Some(action) = self.awaiting_bind.take() {
            if key == "Escape" {
                return KeyPress::BindCancelled;
            }
            bindings.bind(action, &key);
            return KeyPress::Rebound(action);
        }
        self.held.insert(key.clone());
        KeyPress::Action(bindings.action_for(&key))
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize_key(key));
    }

    /// Start capturing the next key-down for `action`
    pub fn begin_bind(&mut self, action: Action) {
        self.awaiting_bind = Some(action);
    }

    pub fn awaiting_bind(&self) -> Option<Action> {
        self.awaiting_bind
    }

    pub fn touch_press(&mut self, action: Action) {
        self.touch[action.index()] = true;
    }

    pub fn touch_release(&mut self, action: Action) {
        self.touch[action.index()] = false;
    }

    pub fn pointer_moved(&mut self, pos: Vec2, now_ms: f64) {
        self.pointer = Some(Pointer {
            pos,
            last_move_ms: now_ms,
        });
    }

    /// An action is active if its bound key is held or its on-screen
    /// button is pressed
    pub fn is_down(&self, action: Action, bindings: &Bindings) -> bool {
        self.held.contains(bindings.key_for(action)) || self.touch[action.index()]
    }

    /// Resolve the current raw state into a `StepInput`. The pointer only
    /// contributes aim while it moved within the freshness window.
    pub fn resolve(&self, bindings: &Bindings, now_ms: f64) -> StepInput {
        let pointer_aim = self
            .pointer
            .filter(|p| now_ms - p.last_move_ms < POINTER_FRESH_MS)
            .map(|p| p.pos);
        StepInput {
            move_left: self.is_down(Action::MoveLeft, bindings),
            move_right: self.is_down(Action::MoveRight, bindings),
            aim_left: self.is_down(Action::AimLeft, bindings),
            aim_right: self.is_down(Action::AimRight, bindings),
            fire: self.is_down(Action::Shoot, bindings),
            pointer_aim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    fn assert_bijective(bindings: &Bindings) {
        for a in Action::ALL {
            for b in Action::ALL {
                if a != b {
                    assert_ne!(
                        bindings.key_for(a),
                        bindings.key_for(b),
                        "{a:?} and {b:?} share a key"
                    );
                }
            }
            assert_eq!(bindings.action_for(bindings.key_for(a)), Some(a));
        }
    }

    #[test]
    fn defaults_are_bijective() {
        assert_bijective(&Bindings::default());
    }

    #[test]
    fn rebind_swaps_previous_owner() {
        // shoot=Space, moveLeft=a; give moveLeft shoot's key
        let mut bindings = Bindings::default();
        bindings.bind(Action::Shoot, "a");
        assert_eq!(bindings.key_for(Action::Shoot), "a");
        // moveLeft inherited shoot's old key
        assert_eq!(bindings.key_for(Action::MoveLeft), " ");
        assert_bijective(&bindings);
    }

    #[test]
    fn rebind_to_fresh_key_frees_old_one() {
        let mut bindings = Bindings::default();
        bindings.bind(Action::Pause, "x");
        assert_eq!(bindings.key_for(Action::Pause), "x");
        assert_eq!(bindings.action_for("p"), None);
        assert_bijective(&bindings);
    }

    #[test]
    fn bind_normalizes_key_case() {
        let mut bindings = Bindings::default();
        bindings.bind(Action::Pause, "X");
        assert_eq!(bindings.key_for(Action::Pause), "x");
    }

    #[test]
    fn json_round_trip_and_fallback() {
        let mut bindings = Bindings::default();
        bindings.bind(Action::Shoot, "f");
        let restored = Bindings::from_json(&bindings.to_json());
        assert_eq!(restored.key_for(Action::Shoot), "f");
        assert_bijective(&restored);

        let fallback = Bindings::from_json("{not json");
        assert_eq!(fallback.key_for(Action::Shoot), " ");
        assert_bijective(&fallback);
    }

    #[test]
    fn corrupt_stored_duplicates_stay_bijective() {
        // Two actions claiming one key in storage: swap-eviction on load
        // keeps the map consistent.
        let json = r#"{"moveLeft":"k","moveRight":"k"}"#;
        let bindings = Bindings::from_json(json);
        assert_bijective(&bindings);
        assert_eq!(bindings.key_for(Action::MoveRight), "k");
    }

    #[test]
    fn stored_blob_may_be_partial_or_noisy() {
        // Unknown entries are ignored; missing actions keep their defaults
        let bindings = Bindings::from_json(r#"{"shoot":"f","volume":"max"}"#);
        assert_eq!(bindings.key_for(Action::Shoot), "f");
        assert_eq!(bindings.key_for(Action::Pause), "p");
        assert_bijective(&bindings);
    }

    #[test]
    fn storage_load_save() {
        let mut storage = MemoryStorage::new();
        let mut bindings = Bindings::default();
        bindings.bind(Action::AimLeft, "q");
        bindings.save(&mut storage);

        let loaded = Bindings::load(&storage);
        assert_eq!(loaded.key_for(Action::AimLeft), "q");
        assert_bijective(&loaded);
    }

    #[test]
    fn bind_capture_consumes_one_key() {
        let mut bindings = Bindings::default();
        let mut input = InputState::new();
        input.begin_bind(Action::Shoot);

        let press = input.key_down("j", &mut bindings);
        assert_eq!(press, KeyPress::Rebound(Action::Shoot));
        assert_eq!(bindings.key_for(Action::Shoot), "j");
        // The captured key was not recorded as held
        assert!(!input.is_down(Action::Shoot, &bindings));

        // Capture is over; the next press resolves normally
        let press = input.key_down("j", &mut bindings);
        assert_eq!(press, KeyPress::Action(Some(Action::Shoot)));
        assert!(input.is_down(Action::Shoot, &bindings));
    }

    #[test]
    fn escape_cancels_bind_capture() {
        let mut bindings = Bindings::default();
        let mut input = InputState::new();
        input.begin_bind(Action::Pause);
        assert_eq!(
            input.key_down("Escape", &mut bindings),
            KeyPress::BindCancelled
        );
        assert_eq!(input.awaiting_bind(), None);
        assert_eq!(bindings.key_for(Action::Pause), "p");
    }

    #[test]
    fn touch_activates_action_without_key() {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        input.touch_press(Action::MoveRight);
        let resolved = input.resolve(&bindings, 0.0);
        assert!(resolved.move_right);
        assert!(!resolved.move_left);

        input.touch_release(Action::MoveRight);
        assert!(!input.resolve(&bindings, 0.0).move_right);
    }

    #[test]
    fn pointer_aim_expires() {
        let bindings = Bindings::default();
        let mut input = InputState::new();
        input.pointer_moved(Vec2::new(100.0, 50.0), 1000.0);

        let fresh = input.resolve(&bindings, 1500.0);
        assert_eq!(fresh.pointer_aim, Some(Vec2::new(100.0, 50.0)));

        let stale = input.resolve(&bindings, 1000.0 + POINTER_FRESH_MS + 1.0);
        assert_eq!(stale.pointer_aim, None);
    }

    proptest! {
        #[test]
        fn arbitrary_rebinds_preserve_bijection(
            ops in proptest::collection::vec((0usize..6, "[a-z]"), 0..40)
        ) {
            let mut bindings = Bindings::default();
            for (idx, key) in ops {
                bindings.bind(Action::ALL[idx], &key);
            }
            for a in Action::ALL {
                for b in Action::ALL {
                    if a != b {
                        prop_assert_ne!(bindings.key_for(a), bindings.key_for(b));
                    }
                }
                prop_assert_eq!(bindings.action_for(bindings.key_for(a)), Some(a));
            }
        }
    }
}
