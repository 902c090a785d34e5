//! Undulating beams: projectiles that travel to the target along a sine wave.
//!
//! A [`SinAnimTimer`] task advances `anim_args[7]` every tick; each projectile
//! spawned while it runs picks its starting phase from that shared value, so
//! consecutive projectiles form a continuous wave.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::effects::battler_anchor;
use crate::engine::Engine;
use crate::host::{BattlerRole, SpriteTemplate};
use crate::ids::{SpriteId, TaskId};
use crate::motion::{LinearTranslation, Point, SineWave};
use crate::sprite::SpriteBehavior;
use crate::task::TaskBehavior;
use crate::trig;

/// Argument slot carrying the shared wave phase.
pub const SHARED_PHASE_ARG: usize = 7;
/// Phase advance per timer tick, in 8-bit angle units.
pub const TIMER_PHASE_STEP: i16 = 3;
/// Projectile travel time.
pub const TRAVEL_TICKS: u16 = 30;
/// Total phase swept over the travel, in Q8.8.
const TRAVEL_PHASE_Q8: u32 = 0xD200;
/// The wave restarts once its angle passes this half cycle.
const HALF_CYCLE: u32 = 127;

/// Drives the shared phase in `anim_args[7]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinAnimTimer {
    remaining: u16,
}

impl SinAnimTimer {
    /// Reset the shared phase and run for `ticks` ticks.
    pub fn spawn(engine: &mut Engine, ticks: u16, priority: u8) -> Option<TaskId> {
        let remaining = if ticks == 0 {
            warn!("sin anim timer of 0 ticks clamped to 1");
            1
        } else {
            ticks
        };
        engine.anim_args[SHARED_PHASE_ARG] = 0;
        engine.create_visual_task(TaskBehavior::SinAnimTimer(Self { remaining }), priority)
    }

    #[inline]
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        let arg = &mut engine.anim_args[SHARED_PHASE_ARG];
        *arg = (arg.wrapping_add(TIMER_PHASE_STEP)) & 0xFF;
        self.remaining -= 1;
        if self.remaining == 0 {
            engine.destroy_visual_task(id);
        }
    }
}

/// Projectile from the attacker to the target with a vertical sine wobble.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToTargetInSinWave {
    motion: LinearTranslation,
    wave: SineWave,
}

impl ToTargetInSinWave {
    /// Spawn at the attacker shifted by `offset`, wobbling by up to `amplitude` pixels.
    pub fn spawn(
        engine: &mut Engine,
        template: SpriteTemplate,
        offset: Point,
        amplitude: i16,
    ) -> Option<SpriteId> {
        let env = engine.env();
        let start = battler_anchor(env, BattlerRole::Attacker, offset);
        let end = env.battler_pic(BattlerRole::Target);
        let subpriority = env.battler_subpriority(BattlerRole::Attacker);

        let shared = engine.anim_args[SHARED_PHASE_ARG];
        let (angle, amplitude) = if shared > HALF_CYCLE as i16 {
            (shared - HALF_CYCLE as i16, -(amplitude as i32))
        } else {
            (shared, amplitude as i32)
        };
        let step = (TRAVEL_PHASE_Q8 / TRAVEL_TICKS as u32) as u16;
        let wave = SineWave::new((angle as u16) << 8, step, amplitude);

        let behavior = SpriteBehavior::ToTargetInSinWave(Self {
            motion: LinearTranslation::new(start, end, TRAVEL_TICKS),
            wave,
        });
        engine.create_visual_sprite(template, start, subpriority, behavior)
    }

    pub(crate) fn step(&mut self, id: SpriteId, engine: &mut Engine) -> Option<SpriteBehavior> {
        if self.motion.advance() {
            engine.destroy_anim_sprite(id);
            return None;
        }
        let bulge = trig::sin(self.wave.angle(), self.wave.amplitude);
        if let Some(sprite) = engine.sprite_mut(id) {
            sprite.offset = self.motion.offset() + Point::new(0, bulge);
        }
        let next = self.wave.phase as u32 + self.wave.step as u32;
        if next >> 8 > HALF_CYCLE {
            self.wave.phase = 0;
            self.wave.amplitude = -self.wave.amplitude;
        } else {
            self.wave.phase = next as u16;
        }
        None
    }
}
