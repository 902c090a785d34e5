//! Sprite entries: a step behavior plus the render state the display reads.
//!
//! Invariants:
//! - the drawn position is always `base + offset`,
//! - `offset` belongs to whichever motion is running; it is assigned from that
//!   motion's own accumulator each tick and never reset behind its back,
//! - a sprite owns at most one affine matrix, released only explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SCRATCH_WORDS;
use crate::continuation::Deferral;
use crate::effects::{
    bubble::{BubbleProjectile, Orbit},
    raindrops::Raindrop,
    sine_wave::ToTargetInSinWave,
    water_sport::WaterSportDroplet,
};
use crate::engine::Engine;
use crate::host::SpriteTemplate;
use crate::ids::{MatrixId, SpriteId};
use crate::motion::{ArcTranslation, LinearTranslation, Point};

/// Host-defined sprite step.
///
/// Returning `Some(next)` replaces the sprite's behavior from the next tick on.
pub trait SpriteStep: fmt::Debug {
    fn step(&mut self, id: SpriteId, engine: &mut Engine) -> Option<SpriteBehavior>;
}

/// Frame animation state. The renderer advances frames and reports the end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimState {
    pub sequence: u8,
    pub frame_index: u16,
    pub paused: bool,
    pub ended: bool,
}

/// Affine animation state and the matrix it drives.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffineState {
    pub sequence: u8,
    pub paused: bool,
    pub ended: bool,
    pub matrix: Option<MatrixId>,
}

/// What a sprite does each tick.
#[derive(Debug)]
pub enum SpriteBehavior {
    Idle,
    /// Linear travel from the base position; installs `then` once arrived.
    Translate {
        motion: LinearTranslation,
        then: Box<SpriteBehavior>,
    },
    /// Arc travel from the base position; installs `then` once landed.
    Arc {
        motion: ArcTranslation,
        then: Box<SpriteBehavior>,
    },
    /// Wait for a condition, then run another behavior.
    Deferred(Box<Deferral>),
    /// Destroy on the next run; any matrix is leaked.
    Destroy,
    /// Release the matrix, then destroy.
    DestroyWithMatrix,
    /// Release the matrix, destroy, and close the visual it was counted as.
    DestroyAnim,
    ToTargetInSinWave(ToTargetInSinWave),
    Bubble(BubbleProjectile),
    Orbit(Orbit),
    WaterSportDroplet(WaterSportDroplet),
    Raindrop(Raindrop),
    Custom(Box<dyn SpriteStep>),
}

impl SpriteBehavior {
    pub fn custom(step: impl SpriteStep + 'static) -> Self {
        Self::Custom(Box::new(step))
    }

    /// Linear travel `from -> to`; `from` must be the sprite's base position.
    pub fn translate(from: Point, to: Point, duration: u16, then: SpriteBehavior) -> Self {
        Self::Translate {
            motion: LinearTranslation::new(from, to, duration),
            then: Box::new(then),
        }
    }

    pub fn arc(from: Point, to: Point, duration: u16, amplitude: i32, then: SpriteBehavior) -> Self {
        Self::Arc {
            motion: ArcTranslation::new(from, to, duration, amplitude),
            then: Box::new(then),
        }
    }

    pub(crate) fn step(&mut self, id: SpriteId, engine: &mut Engine) {
        let next = match self {
            Self::Idle | Self::Orbit(_) => None,
            Self::Translate { motion, then } => {
                let done = motion.advance();
                arrive(engine, id, motion.offset(), done);
                done.then(|| std::mem::replace(then.as_mut(), Self::Idle))
            }
            Self::Arc { motion, then } => {
                let done = motion.advance();
                arrive(engine, id, motion.offset(), done);
                done.then(|| std::mem::replace(then.as_mut(), Self::Idle))
            }
            Self::Deferred(deferral) => {
                if deferral.poll(id, engine) {
                    *self = deferral.take_then();
                    // no gap between the wait ending and the next phase
                    self.step(id, engine);
                }
                None
            }
            Self::Destroy => {
                engine.destroy_sprite(id);
                None
            }
            Self::DestroyWithMatrix => {
                engine.destroy_sprite_and_matrix(id);
                None
            }
            Self::DestroyAnim => {
                engine.destroy_anim_sprite(id);
                None
            }
            Self::ToTargetInSinWave(wave) => wave.step(id, engine),
            Self::Bubble(bubble) => bubble.step(id, engine),
            Self::WaterSportDroplet(drop) => drop.step(id, engine),
            Self::Raindrop(drop) => drop.step(id, engine),
            Self::Custom(step) => step.step(id, engine),
        };
        if let Some(next) = next {
            *self = next;
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Translate { .. } => "translate",
            Self::Arc { .. } => "arc",
            Self::Deferred(_) => "deferred",
            Self::Destroy => "destroy",
            Self::DestroyWithMatrix => "destroy_with_matrix",
            Self::DestroyAnim => "destroy_anim",
            Self::ToTargetInSinWave(_) => "to_target_in_sin_wave",
            Self::Bubble(_) => "bubble",
            Self::Orbit(_) => "orbit",
            Self::WaterSportDroplet(_) => "water_sport_droplet",
            Self::Raindrop(_) => "raindrop",
            Self::Custom(_) => "custom",
        }
    }
}

fn arrive(engine: &mut Engine, id: SpriteId, offset: Point, done: bool) {
    if let Some(sprite) = engine.sprite_mut(id) {
        sprite.offset = offset;
        sprite.motion_complete = done;
    }
}

/// A live sprite.
#[derive(Debug)]
pub struct Sprite {
    pub base: Point,
    pub offset: Point,
    pub anim: AnimState,
    pub affine: AffineState,
    pub invisible: bool,
    /// Draw order among sprites; lower is drawn on top.
    pub subpriority: u8,
    pub template: SpriteTemplate,
    pub scratch: [i16; SCRATCH_WORDS],
    /// Set by the built-in travel behaviors on the tick they arrive.
    pub motion_complete: bool,
    pub(crate) spawned_on: u64,
    pub(crate) counted: bool,
    pub(crate) behavior: Option<SpriteBehavior>,
}

impl Sprite {
    pub(crate) fn new(template: SpriteTemplate, base: Point, subpriority: u8, spawned_on: u64) -> Self {
        Self {
            base,
            offset: Point::ZERO,
            anim: AnimState::default(),
            affine: AffineState::default(),
            invisible: false,
            subpriority,
            template,
            scratch: [0; SCRATCH_WORDS],
            motion_complete: false,
            spawned_on,
            counted: false,
            behavior: Some(SpriteBehavior::Idle),
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.base + self.offset
    }

    /// Fold the offset into the base, leaving the drawn position unchanged.
    pub fn commit_offset(&mut self) {
        self.base += self.offset;
        self.offset = Point::ZERO;
    }

    pub fn start_anim(&mut self, sequence: u8) {
        self.anim = AnimState {
            sequence,
            ..AnimState::default()
        };
    }

    pub fn start_affine_anim(&mut self, sequence: u8) {
        self.affine.sequence = sequence;
        self.affine.paused = false;
        self.affine.ended = false;
    }

    /// The current behavior; `None` while it is running.
    pub fn behavior(&self) -> Option<&SpriteBehavior> {
        self.behavior.as_ref()
    }
}
