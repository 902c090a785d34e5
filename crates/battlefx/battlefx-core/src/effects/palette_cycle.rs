//! Periodic rotation of a palette window.
//!
//! Used for the rainbow rings of a beam: rotating eight ring colors by one step
//! every few ticks makes the rings appear to spin.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::FxError;
use crate::host::ResourceTag;
use crate::ids::TaskId;
use crate::palette::{Direction, PaletteWindow};
use crate::task::TaskBehavior;

/// Ticks between ring color rotations.
pub const RING_CADENCE: u16 = 3;
/// Ring colors occupy entries 1..=8 of their bank.
pub const RING_COLORS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCycle {
    window: PaletteWindow,
    direction: Direction,
    cadence: u16,
    intervals: u16,
    ticks: u16,
    rotations: u16,
}

impl PaletteCycle {
    /// Rotate `window` once every `cadence` ticks, `intervals` times in total.
    pub fn new(window: PaletteWindow, direction: Direction, cadence: u16, intervals: u16) -> Self {
        let cadence = if cadence == 0 {
            warn!("palette cycle cadence of 0 clamped to 1");
            1
        } else {
            cadence
        };
        Self {
            window,
            direction,
            cadence,
            intervals,
            ticks: 0,
            rotations: 0,
        }
    }

    /// Cycle for the rainbow ring colors in the sprite bank of [`ResourceTag::RAINBOW_RINGS`].
    pub fn ring_colors(engine: &Engine, intervals: u16) -> Result<Self, FxError> {
        let tag = ResourceTag::RAINBOW_RINGS;
        let bank = engine
            .env()
            .palette_bank(tag)
            .ok_or(FxError::MissingPalette { tag: tag.0 })?;
        let window = PaletteWindow::in_bank(bank, true, 1, RING_COLORS, engine.palette.len())?;
        Ok(Self::new(window, Direction::Forward, RING_CADENCE, intervals))
    }

    /// Start the cycle as a visual task.
    pub fn spawn(self, engine: &mut Engine, priority: u8) -> Option<TaskId> {
        engine.create_visual_task(TaskBehavior::PaletteCycle(self), priority)
    }

    #[inline]
    pub fn window(&self) -> PaletteWindow {
        self.window
    }

    #[inline]
    pub fn rotations(&self) -> u16 {
        self.rotations
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        self.ticks += 1;
        if self.ticks >= self.cadence {
            self.ticks = 0;
            engine.palette.rotate(self.window, self.direction);
            self.rotations += 1;
        }
        if self.rotations >= self.intervals {
            debug!("{id:?} palette cycle finished after {} rotations", self.rotations);
            engine.destroy_visual_task(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::StaticEnv;

    fn engine() -> Engine {
        let env = StaticEnv::singles().with_palette(ResourceTag::RAINBOW_RINGS, 2);
        Engine::new(Config::default(), Box::new(env)).unwrap()
    }

    #[test]
    fn ring_window_sits_one_past_the_sprite_bank() {
        let e = engine();
        let cycle = PaletteCycle::ring_colors(&e, 4).unwrap();
        assert_eq!(cycle.window().start(), 256 + 2 * 16 + 1);
        assert_eq!(cycle.window().len(), 8);
    }

    #[test]
    fn missing_palette_is_reported() {
        let e = Engine::new(Config::default(), Box::new(StaticEnv::singles())).unwrap();
        assert_eq!(
            PaletteCycle::ring_colors(&e, 4),
            Err(FxError::MissingPalette {
                tag: ResourceTag::RAINBOW_RINGS.0
            })
        );
    }

    #[test]
    fn rotates_on_cadence_then_ends() {
        let mut e = engine();
        let window = e.palette.window(300, 4).unwrap();
        e.palette.load(300, &[1, 2, 3, 4]).unwrap();
        let id = PaletteCycle::new(window, Direction::Forward, 2, 2)
            .spawn(&mut e, 0)
            .unwrap();

        e.tick();
        assert_eq!(e.palette.colors(window), &[1, 2, 3, 4]);
        e.tick();
        assert_eq!(e.palette.colors(window), &[2, 3, 4, 1]);
        e.tick();
        assert!(e.task(id).is_some());
        e.tick();
        assert_eq!(e.palette.colors(window), &[3, 4, 1, 2]);
        assert!(e.task(id).is_none());
        assert!(e.is_idle());
    }
}
