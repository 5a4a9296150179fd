//! Balloon Blast - a neon balloon-popping arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame simulation (spawning, movement, collisions, power-ups)
//! - `input`: Logical actions, rebindable keys, raw input resolution
//! - `settings`: Difficulty profiles and persisted selection
//! - `highscores`: Persisted best score
//! - `persistence`: Key-value storage seam for the host
//! - `audio`: Sound-effect catalog for the audio collaborator
//!
//! The crate draws nothing and owns no event loop: a host feeds timestamps
//! and raw input in, reads entity state back out each frame, and drains
//! game events for sound/HUD side effects.

pub mod audio;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use input::{Action, Bindings, InputState};
pub use settings::Difficulty;
pub use sim::{FrameClock, GameEvent, GamePhase, GameState, StepInput, step};

/// Game configuration constants
pub mod consts {
    /// Largest dt fed to the integrator (seconds). Caps catch-up after
    /// tab-inactive frames.
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Playfield margin the player cannot cross (pixels from either edge)
    pub const PLAYER_MARGIN: f32 = 50.0;
    pub const PLAYER_RADIUS: f32 = 16.0;
    pub const PLAYER_SPEED: f32 = 420.0;
    /// Turret barrel length; bullets spawn at its tip
    pub const BARREL_LENGTH: f32 = 42.0;
    /// Keyboard aim angular speed (radians/sec)
    pub const AIM_SPEED: f32 = 2.2;
    /// Aim is clamped to an upward-facing arc (y axis points down)
    pub const AIM_MIN: f32 = -std::f32::consts::PI * 0.95;
    pub const AIM_MAX: f32 = -std::f32::consts::PI * 0.05;

    pub const BULLET_SPEED: f32 = 760.0;
    pub const BULLET_RADIUS: f32 = 6.0;
    /// Hits a bullet survives while Piercing Shots is active
    pub const PIERCE_HITS: u32 = 2;
    pub const SHOT_COOLDOWN: f32 = 0.22;
    pub const SHOT_COOLDOWN_MULTI: f32 = 0.28;
    /// Angular spread of the Multi Shot side bullets (radians)
    pub const MULTI_SPREAD: f32 = 0.12;

    /// Balloon spawn interval floor (ms)
    pub const MIN_SPAWN_MS: f32 = 420.0;
    /// Spawn interval reduction per level (ms)
    pub const LEVEL_SPAWN_STEP_MS: f32 = 80.0;
    pub const BALLOON_RADIUS_MIN: f32 = 18.0;
    pub const BALLOON_RADIUS_MAX: f32 = 34.0;

    pub const POWERUP_RADIUS: f32 = 16.0;
    pub const POWERUP_RISE_SPEED: f32 = 70.0;
    /// Power-up spawn delay is re-rolled uniformly in this range (ms)
    pub const POWERUP_DELAY_MIN_MS: f32 = 8500.0;
    pub const POWERUP_DELAY_MAX_MS: f32 = 12000.0;

    /// Bullets are culled this far outside the playfield
    pub const BULLET_CULL_MARGIN: f32 = 50.0;
    /// Power-ups are culled this far above the playfield top
    pub const POWERUP_CULL_MARGIN: f32 = 40.0;

    /// Pop-effect ring growth rate (pixels/sec)
    pub const POP_GROWTH: f32 = 60.0;

    /// Key-aim is overridden while the pointer moved within this window (ms)
    pub const POINTER_FRESH_MS: f64 = 1200.0;

    /// Balloon fill palette
    pub const BALLOON_COLORS: [&str; 5] =
        ["#ff6b6b", "#ffd166", "#06d6a0", "#4d96ff", "#f483ff"];
}
