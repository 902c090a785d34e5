//! Water Sport: the attacker sprays droplets in a sweeping zig-zag.
//!
//! The task walks an aim point across the screen and back, stepping it up
//! between sweeps, and throws a droplet at it every second tick. Each droplet
//! arcs to the aim point, splashes in a short random hop, and reports back to
//! the task. The task ends once its sweeps are over and every droplet landed.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::host::{BattlerRole, ResourceTag, Side, SpriteTemplate};
use crate::ids::{SpriteId, TaskId};
use crate::motion::{ArcTranslation, Point};
use crate::sprite::SpriteBehavior;
use crate::task::TaskBehavior;

const DROPLET_SUBPRIORITY: u8 = 10;
const THROW_TICKS: u16 = 16;
const THROW_HEIGHT: i32 = -32;
const SPLASH_TICKS: u16 = 6;
/// Aim point moves this far per tick along a sweep.
const SWEEP_SPEED: i32 = 6;
/// And this far up per tick between sweeps.
const CLIMB_SPEED: i32 = 2;
/// Sweeps end when the aim point leaves this range.
const SWEEP_BOUNDS: std::ops::RangeInclusive<i32> = -16..=256;

pub const DROPLET_TEMPLATE: SpriteTemplate = SpriteTemplate::new(ResourceTag::WATER_ORB, false);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SportPhase {
    /// Throw until the first droplet splashes.
    Opening,
    /// Keep throwing at the starting aim.
    Warmup,
    /// Sweep away from the attacker.
    SweepOut,
    ClimbOut,
    /// Sweep back toward the attacker.
    SweepBack,
    ClimbBack,
    /// Wait for the droplets in flight.
    Drain,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSport {
    phase: SportPhase,
    origin: Point,
    aim: Point,
    /// +1 sweeps right first, -1 left first.
    facing: i32,
    counter: u16,
    throw_ticks: u8,
    sweeps: u8,
    in_flight: u16,
    splashed: bool,
}

impl WaterSport {
    pub fn spawn(engine: &mut Engine, priority: u8) -> Option<TaskId> {
        let env = engine.env();
        let origin = env.battler_pic(BattlerRole::Attacker);
        let mut facing = if env.battler_side(BattlerRole::Attacker) == Side::Player {
            1
        } else {
            -1
        };
        if env.is_contest() {
            facing = -facing;
        }
        let sport = Self {
            phase: SportPhase::Opening,
            origin,
            aim: origin + Point::new(facing * 8, -facing * 8),
            facing,
            counter: 0,
            throw_ticks: 0,
            sweeps: 0,
            in_flight: 0,
            splashed: false,
        };
        engine.create_visual_task(TaskBehavior::WaterSport(sport), priority)
    }

    #[inline]
    pub fn phase(&self) -> SportPhase {
        self.phase
    }

    #[inline]
    pub fn aim(&self) -> Point {
        self.aim
    }

    /// Droplets thrown and not yet landed.
    #[inline]
    pub fn in_flight(&self) -> u16 {
        self.in_flight
    }

    fn droplet_landed(&mut self) {
        self.splashed = true;
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        match self.phase {
            SportPhase::Opening => {
                self.throw(id, engine);
                if self.splashed {
                    self.phase = SportPhase::Warmup;
                }
            }
            SportPhase::Warmup => {
                self.throw(id, engine);
                self.counter += 1;
                if self.counter > 16 {
                    self.counter = 0;
                    self.phase = SportPhase::SweepOut;
                }
            }
            SportPhase::SweepOut => {
                self.throw(id, engine);
                self.aim.x += self.facing * SWEEP_SPEED;
                if !SWEEP_BOUNDS.contains(&self.aim.x) {
                    self.sweeps += 1;
                    self.counter = 0;
                    self.phase = if self.sweeps > 2 {
                        SportPhase::Drain
                    } else {
                        SportPhase::ClimbOut
                    };
                }
            }
            SportPhase::ClimbOut | SportPhase::ClimbBack => {
                self.throw(id, engine);
                self.aim.y -= self.facing * CLIMB_SPEED;
                self.counter += 1;
                if self.counter > 7 {
                    self.phase = if self.phase == SportPhase::ClimbOut {
                        SportPhase::SweepBack
                    } else {
                        SportPhase::SweepOut
                    };
                }
            }
            SportPhase::SweepBack => {
                self.throw(id, engine);
                self.aim.x -= self.facing * SWEEP_SPEED;
                if !SWEEP_BOUNDS.contains(&self.aim.x) {
                    self.sweeps += 1;
                    self.counter = 0;
                    self.phase = SportPhase::ClimbBack;
                }
            }
            SportPhase::Drain => {
                if self.in_flight == 0 {
                    self.phase = SportPhase::Done;
                }
            }
            SportPhase::Done => {
                debug!("{id:?} water sport finished after {} sweeps", self.sweeps);
                engine.destroy_visual_task(id);
            }
        }
    }

    /// Every second call, launch a droplet from the attacker at the aim point.
    fn throw(&mut self, owner: TaskId, engine: &mut Engine) {
        self.throw_ticks += 1;
        if self.throw_ticks <= 1 {
            return;
        }
        self.throw_ticks = 0;
        let droplet = SpriteBehavior::WaterSportDroplet(WaterSportDroplet {
            arc: ArcTranslation::new(self.origin, self.aim, THROW_TICKS, THROW_HEIGHT),
            stage: DropletStage::Thrown,
            owner,
        });
        if engine
            .create_sprite_with(DROPLET_TEMPLATE, self.origin, DROPLET_SUBPRIORITY, droplet)
            .is_some()
        {
            self.in_flight += 1;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropletStage {
    Thrown,
    Splash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSportDroplet {
    arc: ArcTranslation,
    stage: DropletStage,
    owner: TaskId,
}

impl WaterSportDroplet {
    pub(crate) fn step(&mut self, id: SpriteId, engine: &mut Engine) -> Option<SpriteBehavior> {
        let landed = self.arc.advance();
        let offset = self.arc.offset();
        if let Some(sprite) = engine.sprite_mut(id) {
            sprite.offset = offset;
        }
        if !landed {
            return None;
        }
        match self.stage {
            DropletStage::Thrown => {
                let Some(sprite) = engine.sprite_mut(id) else {
                    return None;
                };
                sprite.commit_offset();
                let from = sprite.base;
                let dx = (engine.random() & 0x1F) as i32 - 16;
                let dy = (engine.random() & 0x1F) as i32 - 16;
                let height = !((engine.random() & 7) as i32);
                self.arc = ArcTranslation::new(from, from + Point::new(dx, dy), SPLASH_TICKS, height);
                self.stage = DropletStage::Splash;
            }
            DropletStage::Splash => {
                if let Some(TaskBehavior::WaterSport(sport)) = engine.task_behavior_mut(self.owner) {
                    sport.droplet_landed();
                }
                engine.destroy_sprite(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::StaticEnv;

    fn sport_of(e: &Engine, id: TaskId) -> &WaterSport {
        match e.task(id).and_then(|t| t.behavior()) {
            Some(TaskBehavior::WaterSport(s)) => s,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn aim_starts_up_and_forward() {
        let mut e = Engine::new(Config::default(), Box::new(StaticEnv::singles())).unwrap();
        let id = WaterSport::spawn(&mut e, 2).unwrap();
        assert_eq!(sport_of(&e, id).aim(), Point::new(72 + 8, 88 - 8));
    }

    #[test]
    fn throws_every_second_tick() {
        let mut e = Engine::new(Config::default(), Box::new(StaticEnv::singles())).unwrap();
        let id = WaterSport::spawn(&mut e, 2).unwrap();
        for _ in 0..6 {
            e.tick();
        }
        assert_eq!(sport_of(&e, id).in_flight(), 3);
        assert_eq!(e.sprite_count(), 3);
    }

    #[test]
    fn runs_to_completion_and_cleans_up() {
        let env = StaticEnv::singles().with_seed(3);
        let mut e = Engine::new(Config::default(), Box::new(env)).unwrap();
        let id = WaterSport::spawn(&mut e, 2).unwrap();
        let mut ticks = 0;
        while e.task(id).is_some() {
            e.tick();
            ticks += 1;
            assert!(ticks < 2_000, "water sport never finished");
        }
        assert_eq!(e.sprite_count(), 0);
        assert!(e.is_idle());
    }
}
