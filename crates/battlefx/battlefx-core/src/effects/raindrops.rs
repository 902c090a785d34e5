//! Rain Dance: drops spawned at random over the upper half of the screen.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::host::{ResourceTag, SpriteTemplate};
use crate::ids::{SpriteId, TaskId};
use crate::motion::Point;
use crate::sprite::SpriteBehavior;
use crate::task::TaskBehavior;

pub const RAINDROP_TEMPLATE: SpriteTemplate = SpriteTemplate::new(ResourceTag::RAIN_DROPS, false);
const RAINDROP_SUBPRIORITY: u8 = 4;
/// Drops appear within this area.
const SPAWN_WIDTH: u16 = 240;
const SPAWN_HEIGHT: u16 = 80;
/// A drop falls for this many ticks, then waits for its splash to finish.
const FALL_TICKS: u16 = 13;
const FALL_STEP: Point = Point::new(1, 4);

/// Spawner task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raindrops {
    period: u16,
    duration: u16,
    elapsed: u16,
}

impl Raindrops {
    /// Spawn a drop every `period` ticks until `duration` ticks have passed.
    ///
    /// Drops land on ticks where `elapsed % period == 1`, so a period of 1 never
    /// spawns.
    pub fn spawn(engine: &mut Engine, period: u16, duration: u16, priority: u8) -> Option<TaskId> {
        let period = if period == 0 {
            warn!("raindrop period of 0 clamped to 1");
            1
        } else {
            period
        };
        let rain = Self {
            period,
            duration,
            elapsed: 0,
        };
        engine.create_visual_task(TaskBehavior::Raindrops(rain), priority)
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        self.elapsed += 1;
        if self.elapsed % self.period == 1 {
            let x = engine.random() % SPAWN_WIDTH;
            let y = engine.random() % SPAWN_HEIGHT;
            // a full pool just skips this drop
            let _ = engine.create_sprite_with(
                RAINDROP_TEMPLATE,
                Point::new(x as i32, y as i32),
                RAINDROP_SUBPRIORITY,
                SpriteBehavior::Raindrop(Raindrop::default()),
            );
        }
        if self.elapsed >= self.duration {
            engine.destroy_visual_task(id);
        }
    }
}

/// A single falling drop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raindrop {
    fallen: u16,
    drift: Point,
}

impl Raindrop {
    pub(crate) fn step(&mut self, id: SpriteId, engine: &mut Engine) -> Option<SpriteBehavior> {
        if self.fallen < FALL_TICKS {
            self.fallen += 1;
            self.drift += FALL_STEP;
        }
        let drift = self.drift;
        let Some(sprite) = engine.sprite_mut(id) else {
            return None;
        };
        sprite.offset = drift;
        if sprite.anim.ended {
            engine.destroy_sprite(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::StaticEnv;

    fn engine(cfg: Config) -> Engine {
        Engine::new(cfg, Box::new(StaticEnv::singles().with_seed(11))).unwrap()
    }

    #[test]
    fn spawns_on_period_and_stops_after_duration() {
        let mut e = engine(Config::default());
        let id = Raindrops::spawn(&mut e, 4, 12, 2).unwrap();
        for _ in 0..12 {
            e.tick();
        }
        // elapsed 1, 5, 9
        assert_eq!(e.sprite_count(), 3);
        assert!(e.task(id).is_none());
        for s in e.sprite_ids() {
            let p = e.sprite(s).unwrap().base;
            assert!((0..240).contains(&p.x) && (0..80).contains(&p.y));
        }
    }

    #[test]
    fn drop_falls_then_waits_for_its_animation() {
        let mut e = engine(Config::default());
        Raindrops::spawn(&mut e, 100, 2, 2).unwrap();
        e.tick();
        e.tick();
        let drop = e.sprite_ids()[0];
        for _ in 0..20 {
            e.tick();
        }
        assert_eq!(e.sprite(drop).unwrap().offset, Point::new(13, 52));
        e.mark_anim_ended(drop);
        e.tick();
        assert!(e.sprite(drop).is_none());
    }

    #[test]
    fn full_pool_skips_drops() {
        let cfg = Config {
            sprite_capacity: 2,
            ..Config::default()
        };
        let mut e = engine(cfg);
        Raindrops::spawn(&mut e, 2, 40, 2).unwrap();
        for _ in 0..40 {
            e.tick();
        }
        assert_eq!(e.sprite_count(), 2);
        assert!(e.is_idle());
    }
}
