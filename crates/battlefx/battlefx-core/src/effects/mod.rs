//! Water-move effects built on the scheduler, motion and buffer primitives.
//!
//! Each effect is spawned through its own constructor, which reads battler
//! placement from the host once and then owns all of its state. Left/right
//! mirroring is decided per effect and kept as each effect defines it.

pub mod bubble;
pub mod palette_cycle;
pub mod raindrops;
pub mod sine_wave;
pub mod surf;
pub mod water_sport;

use std::cmp::Ordering;

use crate::host::{BattleEnv, BattlerRole, CoordKind, Side};
use crate::motion::Point;

/// Picture center of `role`, shifted by `offset`.
///
/// The x offset points away from the other combatant: it is subtracted when
/// the attacker stands right of the target, added when left of it, and on a
/// tie the attacker's side decides.
pub(crate) fn battler_anchor(env: &dyn BattleEnv, role: BattlerRole, offset: Point) -> Point {
    let attacker_x = env.battler_coord(BattlerRole::Attacker, CoordKind::X);
    let target_x = env.battler_coord(BattlerRole::Target, CoordKind::X);
    let mirrored = match attacker_x.cmp(&target_x) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => env.battler_side(BattlerRole::Attacker) != Side::Player,
    };
    let dx = if mirrored { -offset.x } else { offset.x };
    env.battler_pic(role) + Point::new(dx, offset.y)
}
