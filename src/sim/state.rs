//! Session state and core simulation types
//!
//! One `GameState` owns everything a session mutates: entity stores, score
//! counters, power-up flags, spawn accumulators and the seeded RNG. There
//! are no ambient globals; the step function receives this struct.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::settings::Difficulty;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Pre-start; no session has begun
    Idle,
    /// Active gameplay
    Running,
    /// Suspended; no sim time passes
    Paused,
    /// Miss limit reached; terminal until reset
    Ended,
}

/// Power-up types. Effects are mutually exclusive: activating one
/// overwrites whatever was active before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerKind {
    MultiShot,
    SlowTime,
    Pierce,
    DoubleScore,
}

impl PowerKind {
    pub const ALL: [PowerKind; 4] = [
        PowerKind::MultiShot,
        PowerKind::SlowTime,
        PowerKind::Pierce,
        PowerKind::DoubleScore,
    ];

    /// HUD label
    pub fn label(&self) -> &'static str {
        match self {
            PowerKind::MultiShot => "Multi Shot",
            PowerKind::SlowTime => "Slow Time",
            PowerKind::Pierce => "Piercing Shots",
            PowerKind::DoubleScore => "Score x2",
        }
    }

    /// Pickup fill color
    pub fn color(&self) -> &'static str {
        match self {
            PowerKind::MultiShot => "#ffd166",
            PowerKind::SlowTime => "#4d96ff",
            PowerKind::Pierce => "#f483ff",
            PowerKind::DoubleScore => "#06d6a0",
        }
    }

    /// Effect duration in seconds
    pub fn duration(&self) -> f32 {
        match self {
            PowerKind::MultiShot | PowerKind::SlowTime => 6.5,
            PowerKind::Pierce => 7.0,
            PowerKind::DoubleScore => 8.0,
        }
    }
}

/// The player's turret. Singleton; re-centered on resize.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Aim angle in radians, always within [AIM_MIN, AIM_MAX]
    pub aim_angle: f32,
    pub aim_speed: f32,
    /// Seconds until the next shot may fire
    pub cooldown: f32,
    pub barrel: f32,
}

impl Player {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(width * 0.5, height - 80.0),
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            aim_angle: -std::f32::consts::FRAC_PI_2,
            aim_speed: AIM_SPEED,
            cooldown: 0.0,
            barrel: BARREL_LENGTH,
        }
    }

    /// World position of the barrel tip at the given angle
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.pos + Vec2::new(angle.cos(), angle.sin()) * self.barrel
    }
}

/// A projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Balloon hits this bullet survives; 0 = consumed on first hit
    pub pierce: u32,
}

/// A rising target
#[derive(Debug, Clone)]
pub struct Balloon {
    pub pos: Vec2,
    pub radius: f32,
    /// Vertical rise speed before the slow factor is applied
    pub speed: f32,
    /// Signed horizontal sway magnitude
    pub sway: f32,
    pub color: &'static str,
    /// Per-entity phase for the sway oscillation
    pub offset: f32,
}

/// A rising pickup
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub kind: PowerKind,
    pub offset: f32,
}

/// Expanding ring left behind by a destroyed entity. Purely cosmetic.
#[derive(Debug, Clone)]
pub struct PopEffect {
    pub pos: Vec2,
    pub radius: f32,
    /// Seconds of life remaining
    pub life: f32,
}

/// Currently active power-up effect
#[derive(Debug, Clone, Copy)]
pub struct ActivePower {
    pub kind: PowerKind,
    /// Seconds until expiry
    pub remaining: f32,
}

/// Things that happened during a step, for the audio/HUD collaborators.
/// Drained by the host each frame; ignoring them has no sim effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ShotFired,
    BalloonPopped,
    BalloonMissed,
    PowerCollected(PowerKind),
    PowerExpired,
    LevelUp(u32),
    SessionEnded { score: u32 },
}

/// Plain-value HUD view after a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u32,
    pub misses: u32,
    pub max_misses: u32,
    pub level: u32,
    pub power_label: &'static str,
    pub difficulty_label: &'static str,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Playfield size in CSS pixels
    pub width: f32,
    pub height: f32,
    pub difficulty: Difficulty,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub balloons: Vec<Balloon>,
    pub powerups: Vec<PowerUp>,
    pub pops: Vec<PopEffect>,
    pub score: u32,
    pub misses: u32,
    /// Always floor(score / 10) + 1; never set independently
    pub level: u32,
    /// Balloon spawn accumulator (ms)
    pub spawn_timer: f32,
    /// Power-up spawn accumulator (ms)
    pub powerup_timer: f32,
    /// Active effect, if any
    pub active_power: Option<ActivePower>,
    pub multi_shot: bool,
    pub pierce_shots: bool,
    /// 1.0 normally, 0.6 while Slow Time is active
    pub slow_factor: f32,
    /// 1 normally, 2 while Score x2 is active
    pub score_multiplier: u32,
    /// Sim seconds elapsed this session; drives sway oscillation.
    /// Frozen while paused since dt is never applied.
    pub elapsed: f32,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(width: f32, height: f32, difficulty: Difficulty, seed: u64) -> Self {
        Self {
            width,
            height,
            difficulty,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            player: Player::new(width, height),
            bullets: Vec::new(),
            balloons: Vec::new(),
            powerups: Vec::new(),
            pops: Vec::new(),
            score: 0,
            misses: 0,
            level: 1,
            spawn_timer: 0.0,
            powerup_timer: 0.0,
            active_power: None,
            multi_shot: false,
            pierce_shots: false,
            slow_factor: 1.0,
            score_multiplier: 1,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    /// Miss limit for the selected difficulty
    pub fn max_misses(&self) -> u32 {
        self.difficulty.profile().miss_limit
    }

    /// Clear all per-session state back to defaults. Entity stores are
    /// discarded immediately; there is no graceful drain.
    pub fn reset(&mut self) {
        self.bullets.clear();
        self.balloons.clear();
        self.powerups.clear();
        self.pops.clear();
        self.score = 0;
        self.misses = 0;
        self.level = 1;
        self.spawn_timer = 0.0;
        self.powerup_timer = 0.0;
        self.player = Player::new(self.width, self.height);
        self.clear_power();
        self.elapsed = 0.0;
        self.events.clear();
        self.phase = GamePhase::Idle;
    }

    /// Reset and begin a new session
    pub fn start(&mut self) {
        self.reset();
        self.phase = GamePhase::Running;
        log::info!(
            "session started: difficulty={} seed={}",
            self.difficulty.as_str(),
            self.seed
        );
    }

    /// Pause/resume. Has no effect unless a session is active.
    pub fn set_paused(&mut self, paused: bool) {
        match (self.phase, paused) {
            (GamePhase::Running, true) => self.phase = GamePhase::Paused,
            (GamePhase::Paused, false) => self.phase = GamePhase::Running,
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(self.phase == GamePhase::Running);
    }

    /// Playfield resize; re-centers the player
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.player.pos = Vec2::new(width * 0.5, height - 80.0);
    }

    /// Award balloon kills, keeping `level` consistent with `score`
    pub(crate) fn add_score(&mut self, points: u32) {
        self.score += points;
        let next_level = self.score / 10 + 1;
        if next_level != self.level {
            self.level = next_level;
            self.push_event(GameEvent::LevelUp(next_level));
        }
    }

    /// Overwrite whatever effect was active with `kind`
    pub(crate) fn activate_power(&mut self, kind: PowerKind) {
        self.active_power = Some(ActivePower {
            kind,
            remaining: kind.duration(),
        });
        self.multi_shot = kind == PowerKind::MultiShot;
        self.slow_factor = if kind == PowerKind::SlowTime { 0.6 } else { 1.0 };
        self.pierce_shots = kind == PowerKind::Pierce;
        self.score_multiplier = if kind == PowerKind::DoubleScore { 2 } else { 1 };
        self.push_event(GameEvent::PowerCollected(kind));
    }

    /// Restore all effect flags to defaults
    pub(crate) fn clear_power(&mut self) {
        self.active_power = None;
        self.multi_shot = false;
        self.pierce_shots = false;
        self.slow_factor = 1.0;
        self.score_multiplier = 1;
    }

    /// End the session. Entities stay in place for the game-over screen;
    /// the next `start()` discards them.
    pub(crate) fn end_session(&mut self) {
        self.phase = GamePhase::Ended;
        self.push_event(GameEvent::SessionEnded { score: self.score });
        log::info!(
            "session ended: score={} level={} misses={}/{}",
            self.score,
            self.level,
            self.misses,
            self.max_misses()
        );
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// HUD values after the latest step
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            misses: self.misses,
            max_misses: self.max_misses(),
            level: self.level,
            power_label: self
                .active_power
                .map(|p| p.kind.label())
                .unwrap_or("None"),
            difficulty_label: self.difficulty.profile().label,
        }
    }
}
