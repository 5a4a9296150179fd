//! Headless demo session
//!
//! Runs the full loop the way a browser shell would - clock, input
//! resolution, step, event drain, persistence - with a scripted bot in
//! place of a human and log lines in place of canvas/audio output.

use balloon_blast::audio::effect_for;
use balloon_blast::input::{Action, Bindings, InputState};
use balloon_blast::persistence::MemoryStorage;
use balloon_blast::sim::{FrameClock, GameEvent, GamePhase, GameState, step};
use balloon_blast::{Difficulty, HighScore};

const FRAME_MS: f64 = 1000.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 120; // two minutes of sim time

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut storage = MemoryStorage::new();
    let mut bindings = Bindings::load(&storage);
    let difficulty = Difficulty::load(&storage);
    let mut high_score = HighScore::load(&storage);

    let mut input = InputState::new();
    let mut clock = FrameClock::new();
    let mut state = GameState::new(1280.0, 720.0, difficulty, 0xBA11_00B5);
    state.start();

    // Hold fire for the whole run
    let shoot_key = bindings.key_for(Action::Shoot).to_string();
    input.key_down(&shoot_key, &mut bindings);

    let mut now_ms = 0.0_f64;
    let mut frame = 0u32;

    while frame < MAX_FRAMES && state.phase != GamePhase::Ended {
        frame += 1;
        now_ms += FRAME_MS;

        // Brief pause partway through to show that no sim time leaks
        if frame == 1800 {
            state.set_paused(true);
            log::info!("paused at frame {frame}");
        }
        if frame == 1860 {
            state.set_paused(false);
            clock.resume(now_ms);
            log::info!("resumed at frame {frame}");
        }

        steer(&mut input, &state, now_ms);

        let dt = clock.frame_dt(now_ms);
        let resolved = input.resolve(&bindings, now_ms);
        step(&mut state, &resolved, dt);

        for event in state.take_events() {
            if let Some(effect) = effect_for(&event) {
                log::debug!("sound: {}", effect.name());
            }
            match event {
                GameEvent::LevelUp(level) => log::info!("level up -> {level}"),
                GameEvent::PowerCollected(kind) => {
                    log::info!("power-up collected: {}", kind.label())
                }
                GameEvent::SessionEnded { score } => {
                    if high_score.submit(score, &mut storage) {
                        log::info!("final score {score} is a new best");
                    } else {
                        log::info!("final score {score} (best {})", high_score.best());
                    }
                }
                _ => {}
            }
        }

        if frame % 300 == 0 {
            let hud = state.hud();
            log::info!(
                "t={:>5.1}s score={} misses={}/{} level={} power={}",
                state.elapsed,
                hud.score,
                hud.misses,
                hud.max_misses,
                hud.level,
                hud.power_label,
            );
        }
    }

    let hud = state.hud();
    log::info!(
        "demo finished after {frame} frames: score={} level={} best={}",
        hud.score,
        hud.level,
        high_score.best()
    );
}

/// Point the pointer at the lowest balloon (power-ups win when close)
/// and lean the turret toward it.
fn steer(input: &mut InputState, state: &GameState, now_ms: f64) {
    let target = state
        .powerups
        .iter()
        .map(|p| p.pos)
        .chain(state.balloons.iter().map(|b| b.pos))
        .min_by(|a, b| {
            let da = a.distance(state.player.pos);
            let db = b.distance(state.player.pos);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(target) = target else { return };
    input.pointer_moved(target, now_ms);

    let dx = target.x - state.player.pos.x;
    if dx < -40.0 {
        input.touch_press(Action::MoveLeft);
        input.touch_release(Action::MoveRight);
    } else if dx > 40.0 {
        input.touch_press(Action::MoveRight);
        input.touch_release(Action::MoveLeft);
    } else {
        input.touch_release(Action::MoveLeft);
        input.touch_release(Action::MoveRight);
    }
}
