//! Store-and-resume sequencing for multi-phase sprite effects.
//!
//! A sprite waits on a [`WaitCondition`] with the behavior to resume stored
//! alongside it. When the condition holds, the stored behavior is installed and
//! run in the same tick.

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::FxError;
use crate::ids::SpriteId;
use crate::sprite::SpriteBehavior;

/// What a deferred sprite is waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitCondition {
    /// The frame animation reported its end.
    AnimEnded,
    /// The affine animation reported its end.
    AffineAnimEnded,
    /// Counts down once per run and fires when already at zero.
    Ticks(u16),
}

/// A pending condition and the behavior that follows it.
#[derive(Debug)]
pub struct Deferral {
    pub condition: WaitCondition,
    then: SpriteBehavior,
}

impl Deferral {
    pub fn new(condition: WaitCondition, then: SpriteBehavior) -> Self {
        Self { condition, then }
    }

    /// Evaluate the condition for this tick.
    pub(crate) fn poll(&mut self, id: SpriteId, engine: &Engine) -> bool {
        match &mut self.condition {
            WaitCondition::AnimEnded => engine.anim_ended(id),
            WaitCondition::AffineAnimEnded => engine.affine_anim_ended(id),
            WaitCondition::Ticks(0) => true,
            WaitCondition::Ticks(n) => {
                *n -= 1;
                false
            }
        }
    }

    pub(crate) fn take_then(&mut self) -> SpriteBehavior {
        std::mem::replace(&mut self.then, SpriteBehavior::Idle)
    }

    pub fn then(&self) -> &SpriteBehavior {
        &self.then
    }
}

impl SpriteBehavior {
    /// Behavior that waits for `condition` and then continues as `then`.
    pub fn wait(condition: WaitCondition, then: SpriteBehavior) -> Self {
        Self::Deferred(Box::new(Deferral::new(condition, then)))
    }
}

/// Put `sprite` on hold until `condition`, then continue as `then`.
///
/// Works both from outside the tick and from within the sprite's own step.
pub fn defer_until(
    engine: &mut Engine,
    sprite: SpriteId,
    condition: WaitCondition,
    then: SpriteBehavior,
) -> Result<(), FxError> {
    engine.set_sprite_behavior(sprite, SpriteBehavior::wait(condition, then))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::{SpriteTemplate, StaticEnv};

    fn engine() -> Engine {
        Engine::new(Config::default(), Box::new(StaticEnv::singles())).unwrap()
    }

    #[test]
    fn ticks_zero_fires_on_first_run() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        defer_until(&mut e, s, WaitCondition::Ticks(0), SpriteBehavior::Destroy).unwrap();
        e.tick();
        assert!(e.sprite(s).is_none());
    }

    #[test]
    fn ticks_counts_down_before_firing() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        defer_until(&mut e, s, WaitCondition::Ticks(3), SpriteBehavior::Destroy).unwrap();
        for _ in 0..3 {
            e.tick();
            assert!(e.sprite(s).is_some());
        }
        e.tick();
        assert!(e.sprite(s).is_none());
    }

    #[test]
    fn anim_end_resumes_in_the_same_tick() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        defer_until(&mut e, s, WaitCondition::AnimEnded, SpriteBehavior::Destroy).unwrap();
        e.tick();
        e.tick();
        assert!(e.sprite(s).is_some());
        e.mark_anim_ended(s);
        e.tick();
        assert!(e.sprite(s).is_none(), "continuation ran without a gap");
    }

    #[test]
    fn affine_end_resumes_in_the_same_tick() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        e.sprite_mut(s).unwrap().start_affine_anim(1);
        defer_until(&mut e, s, WaitCondition::AffineAnimEnded, SpriteBehavior::Destroy).unwrap();
        e.tick();
        // the frame animation ending is not the affine one
        e.mark_anim_ended(s);
        e.tick();
        assert!(e.sprite(s).is_some());
        e.mark_affine_ended(s);
        e.tick();
        assert!(e.sprite(s).is_none(), "continuation ran without a gap");
    }

    #[test]
    fn restarting_an_animation_clears_its_end_flag() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        e.mark_anim_ended(s);
        e.mark_affine_ended(s);
        assert!(e.anim_ended(s) && e.affine_anim_ended(s));

        let sprite = e.sprite_mut(s).unwrap();
        sprite.anim.frame_index = 4;
        sprite.start_anim(2);
        sprite.affine.paused = true;
        sprite.start_affine_anim(3);
        let sprite = e.sprite(s).unwrap();
        assert_eq!((sprite.anim.sequence, sprite.anim.frame_index), (2, 0));
        assert_eq!(sprite.affine.sequence, 3);
        assert!(!sprite.affine.paused);
        assert!(!e.anim_ended(s) && !e.affine_anim_ended(s));

        defer_until(&mut e, s, WaitCondition::AffineAnimEnded, SpriteBehavior::Destroy).unwrap();
        e.tick();
        assert!(e.sprite(s).is_some(), "stale end flag fired the wait");
    }

    #[test]
    fn stale_sprite_is_rejected() {
        let mut e = engine();
        let s = e.create_sprite(SpriteTemplate::invisible(), 0, 0, 0).unwrap();
        e.destroy_sprite(s);
        let err = defer_until(&mut e, s, WaitCondition::AnimEnded, SpriteBehavior::Idle);
        assert_eq!(err, Err(FxError::StaleSprite { index: s.index() }));
    }
}
