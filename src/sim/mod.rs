//! Per-frame simulation
//!
//! All gameplay logic lives here. The module is pure with respect to the
//! outside world:
//! - dt comes in through `FrameClock`, already clamped
//! - randomness is a seeded RNG owned by the state
//! - no rendering, audio, or storage calls; side effects surface as
//!   `GameEvent`s for the host to drain

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Hit, circles_overlap, resolve_balloon_hits, resolve_powerup_hits};
pub use state::{
    ActivePower, Balloon, Bullet, GameEvent, GamePhase, GameState, HudSnapshot, Player, PopEffect,
    PowerKind, PowerUp,
};
pub use tick::{FrameClock, StepInput, step};
