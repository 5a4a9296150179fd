//! Bullet collision resolution
//!
//! All hit tests are plain circle-circle overlap checks. The original
//! splice-while-iterating approach is replaced by a single forward pass
//! per entity type with a spent-bullet mark set, which keeps removal
//! order-independent and index-shift free. Tie-break when several bullets
//! overlap one target in the same frame: the lowest bullet index wins.

use glam::Vec2;

use super::state::{Balloon, Bullet, PowerKind, PowerUp};

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Where a destroyed entity was, for pop-effect spawning
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub pos: Vec2,
    pub radius: f32,
}

/// Resolve balloon-bullet collisions.
///
/// Each balloon can be hit at most once per frame. A hit removes the
/// balloon and either decrements the bullet's pierce count or marks the
/// bullet spent. Returns one `Hit` per destroyed balloon.
pub fn resolve_balloon_hits(balloons: &mut Vec<Balloon>, bullets: &mut Vec<Bullet>) -> Vec<Hit> {
    let mut hits = Vec::new();
    let mut spent = vec![false; bullets.len()];

    balloons.retain(|balloon| {
        for (i, bullet) in bullets.iter_mut().enumerate() {
            if spent[i] {
                continue;
            }
            if circles_overlap(balloon.pos, balloon.radius, bullet.pos, bullet.radius) {
                if bullet.pierce > 0 {
                    bullet.pierce -= 1;
                } else {
                    spent[i] = true;
                }
                hits.push(Hit {
                    pos: balloon.pos,
                    radius: balloon.radius,
                });
                return false;
            }
        }
        true
    });

    remove_spent(bullets, &spent);
    hits
}

/// Resolve power-up-bullet collisions.
///
/// A hit removes both entities regardless of pierce; collection is not a
/// balloon kill. Returns the collected kinds with their hit locations.
pub fn resolve_powerup_hits(
    powerups: &mut Vec<PowerUp>,
    bullets: &mut Vec<Bullet>,
) -> Vec<(PowerKind, Hit)> {
    let mut collected = Vec::new();
    let mut spent = vec![false; bullets.len()];

    powerups.retain(|powerup| {
        for (i, bullet) in bullets.iter().enumerate() {
            if spent[i] {
                continue;
            }
            if circles_overlap(powerup.pos, powerup.radius, bullet.pos, bullet.radius) {
                spent[i] = true;
                collected.push((
                    powerup.kind,
                    Hit {
                        pos: powerup.pos,
                        radius: powerup.radius,
                    },
                ));
                return false;
            }
        }
        true
    });

    remove_spent(bullets, &spent);
    collected
}

fn remove_spent(bullets: &mut Vec<Bullet>, spent: &[bool]) {
    let mut idx = 0;
    bullets.retain(|_| {
        let keep = !spent[idx];
        idx += 1;
        keep
    });
}
