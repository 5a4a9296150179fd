//! Sound-effect catalog
//!
//! The core never synthesizes audio. It maps game events to named
//! effects, each carrying the oscillator parameters a host-side audio
//! collaborator needs to realize it. Playback is fire-and-forget: a host
//! with no audio capability simply drops the effects.

use crate::sim::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// Oscillator parameters for one effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundSpec {
    pub freq: f32,
    pub waveform: Waveform,
    /// Seconds
    pub duration: f32,
    /// Peak gain, 0..1
    pub volume: f32,
}

/// Named sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Shoot,
    Pop,
    Power,
    Miss,
    Over,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Pop => "pop",
            SoundEffect::Power => "power",
            SoundEffect::Miss => "miss",
            SoundEffect::Over => "over",
        }
    }

    pub fn spec(&self) -> SoundSpec {
        match self {
            SoundEffect::Shoot => SoundSpec {
                freq: 420.0,
                waveform: Waveform::Square,
                duration: 0.08,
                volume: 0.05,
            },
            SoundEffect::Pop => SoundSpec {
                freq: 620.0,
                waveform: Waveform::Triangle,
                duration: 0.12,
                volume: 0.08,
            },
            SoundEffect::Power => SoundSpec {
                freq: 880.0,
                waveform: Waveform::Sine,
                duration: 0.16,
                volume: 0.08,
            },
            SoundEffect::Miss => SoundSpec {
                freq: 180.0,
                waveform: Waveform::Sawtooth,
                duration: 0.18,
                volume: 0.05,
            },
            SoundEffect::Over => SoundSpec {
                freq: 140.0,
                waveform: Waveform::Sine,
                duration: 0.36,
                volume: 0.07,
            },
        }
    }
}

/// The effect a game event should trigger, if any
pub fn effect_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::ShotFired => Some(SoundEffect::Shoot),
        GameEvent::BalloonPopped => Some(SoundEffect::Pop),
        GameEvent::PowerCollected(_) => Some(SoundEffect::Power),
        GameEvent::BalloonMissed => Some(SoundEffect::Miss),
        GameEvent::SessionEnded { .. } => Some(SoundEffect::Over),
        GameEvent::PowerExpired | GameEvent::LevelUp(_) => None,
    }
}
