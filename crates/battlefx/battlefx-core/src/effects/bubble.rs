//! Bubble projectiles that wobble on their way to the target.
//!
//! The wobble is an elliptical orbit whose state lives in a hidden helper
//! sprite for the duration of the flight. After landing the bubble plays its
//! pop animation, lingers for a few ticks, and goes away with its matrix.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::continuation::WaitCondition;
use crate::engine::Engine;
use crate::host::{BattlerRole, Side, SpriteTemplate};
use crate::ids::SpriteId;
use crate::motion::{LinearTranslation, Point, FIXED_SHIFT};
use crate::sprite::SpriteBehavior;
use crate::trig;

/// Ticks a popped bubble stays on screen.
pub const LINGER_TICKS: u16 = 10;

/// Launch parameters of one bubble.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleParams {
    /// Start offset from the attacker's picture center.
    pub offset: Point,
    /// Orbit radii on each axis.
    pub orbit: Point,
    /// Starting orbit angle.
    pub start_angle: u8,
    /// Orbit phase advance per tick, Q8.8.
    pub phase_step: u16,
    /// Flight time in ticks.
    pub duration: u16,
}

/// Elliptical oscillator carried by a helper sprite; advanced by its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orbit {
    radius: Point,
    phase: u16,
    step: u16,
    remaining: u16,
}

impl Orbit {
    /// Current point on the orbit; advances the phase.
    fn sample(&mut self) -> Point {
        let angle = (self.phase >> FIXED_SHIFT) as i32;
        let p = Point::new(
            trig::sin(angle, self.radius.x),
            trig::cos(angle, self.radius.y),
        );
        self.phase = self.phase.wrapping_add(self.step);
        p
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubblePhase {
    Flight,
    Pop,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleProjectile {
    motion: LinearTranslation,
    helper: SpriteId,
    phase: BubblePhase,
}

impl BubbleProjectile {
    /// Launch a bubble from the attacker toward the target.
    ///
    /// `None` if either the bubble or its helper could not get a slot.
    pub fn spawn(engine: &mut Engine, template: SpriteTemplate, params: BubbleParams) -> Option<SpriteId> {
        let env = engine.env();
        let opponent = env.battler_side(BattlerRole::Attacker) != Side::Player;
        let (dx, radius_x) = if opponent {
            (-params.offset.x, -params.orbit.x)
        } else {
            (params.offset.x, params.orbit.x)
        };
        let start = env.battler_pic(BattlerRole::Attacker) + Point::new(dx, params.offset.y);
        let end = env.battler_pic(BattlerRole::Target);
        let subpriority = env.battler_subpriority(BattlerRole::Attacker);

        let orbit = Orbit {
            radius: Point::new(radius_x, params.orbit.y),
            phase: (params.start_angle as u16) << FIXED_SHIFT,
            step: params.phase_step,
            remaining: params.duration.max(1),
        };
        // center the orbit so the first sample lands on `start`
        let base = start
            - Point::new(
                trig::sin(params.start_angle as i32, orbit.radius.x),
                trig::cos(params.start_angle as i32, orbit.radius.y),
            );

        let helper = engine.create_sprite_with(
            SpriteTemplate::invisible(),
            Point::ZERO,
            0,
            SpriteBehavior::Orbit(orbit),
        )?;
        if let Some(h) = engine.sprite_mut(helper) {
            h.invisible = true;
        }

        let bubble = SpriteBehavior::Bubble(Self {
            motion: LinearTranslation::new(start, end, params.duration),
            helper,
            phase: BubblePhase::Flight,
        });
        let Some(id) = engine.create_visual_sprite(template, base, subpriority, bubble) else {
            engine.destroy_sprite(helper);
            return None;
        };
        if let Some(sprite) = engine.sprite_mut(id) {
            sprite.anim.paused = true;
        }
        Some(id)
    }

    #[inline]
    pub fn phase(&self) -> BubblePhase {
        self.phase
    }

    #[inline]
    pub fn helper(&self) -> SpriteId {
        self.helper
    }

    pub(crate) fn step(&mut self, id: SpriteId, engine: &mut Engine) -> Option<SpriteBehavior> {
        match self.phase {
            BubblePhase::Flight => {
                self.motion.advance();
                let (wobble, landed) = match engine.sprite_behavior_mut(self.helper) {
                    Some(SpriteBehavior::Orbit(orbit)) => {
                        let wobble = orbit.sample();
                        orbit.remaining -= 1;
                        (wobble, orbit.remaining == 0)
                    }
                    _ => (Point::ZERO, true),
                };
                if let Some(sprite) = engine.sprite_mut(id) {
                    sprite.offset = self.motion.offset() + wobble;
                }
                if landed {
                    engine.destroy_sprite(self.helper);
                    self.phase = BubblePhase::Pop;
                    debug!("{id:?} bubble landed");
                }
                None
            }
            BubblePhase::Pop => {
                if let Some(sprite) = engine.sprite_mut(id) {
                    sprite.anim.paused = false;
                }
                Some(SpriteBehavior::wait(
                    WaitCondition::AnimEnded,
                    SpriteBehavior::wait(
                        WaitCondition::Ticks(LINGER_TICKS),
                        SpriteBehavior::DestroyWithMatrix,
                    ),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::{ResourceTag, StaticEnv};

    fn engine(env: StaticEnv) -> Engine {
        Engine::new(Config::default(), Box::new(env)).unwrap()
    }

    fn params() -> BubbleParams {
        BubbleParams {
            offset: Point::new(16, 0),
            orbit: Point::new(8, 8),
            start_angle: 0,
            phase_step: 0x400,
            duration: 20,
        }
    }

    #[test]
    fn first_orbit_sample_lands_on_the_start() {
        let mut e = engine(StaticEnv::singles());
        let template = SpriteTemplate::new(ResourceTag::BUBBLE, true);
        let id = BubbleProjectile::spawn(&mut e, template, params()).unwrap();
        // sin(0) = 0, cos(0) = radius
        assert_eq!(e.sprite(id).unwrap().base, Point::new(72 + 16, 88 - 8));
        e.tick();
        let s = e.sprite(id).unwrap();
        assert!(s.anim.paused);
        // one twentieth of (88, -48), truncated toward the start
        assert_eq!(s.position(), Point::new(88 + 4, 88 - 2));
    }

    #[test]
    fn opponent_mirrors_offset_and_orbit() {
        let mut e = engine(StaticEnv::singles_from_opponent());
        let template = SpriteTemplate::new(ResourceTag::BUBBLE, true);
        let id = BubbleProjectile::spawn(&mut e, template, params()).unwrap();
        assert_eq!(e.sprite(id).unwrap().base, Point::new(176 - 16, 40 - 8));
    }

    #[test]
    fn full_lifecycle_releases_everything() {
        let mut e = engine(StaticEnv::singles());
        let template = SpriteTemplate::new(ResourceTag::BUBBLE, true);
        let id = BubbleProjectile::spawn(&mut e, template, params()).unwrap();
        assert_eq!(e.sprite_count(), 2);
        assert_eq!(e.matrices_in_use(), 1);

        for _ in 0..20 {
            e.tick();
        }
        assert_eq!(e.sprite_count(), 1, "helper gone after the flight");
        e.tick();
        assert!(!e.sprite(id).unwrap().anim.paused);

        e.mark_anim_ended(id);
        for _ in 0..LINGER_TICKS {
            e.tick();
            assert!(e.sprite(id).is_some());
        }
        e.tick();
        assert!(e.sprite(id).is_none());
        assert_eq!(e.matrices_in_use(), 0);
        assert_eq!(e.leaked_matrices(), 0);
        assert!(e.is_idle());
    }
}
