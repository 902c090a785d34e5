//! Task entries: prioritized step behaviors with no on-screen presence.

use std::fmt;

use crate::config::SCRATCH_WORDS;
use crate::effects::{
    palette_cycle::PaletteCycle,
    raindrops::Raindrops,
    sine_wave::SinAnimTimer,
    surf::{SurfScanline, SurfWave},
    water_sport::WaterSport,
};
use crate::engine::Engine;
use crate::ids::TaskId;

/// Host-defined task step.
///
/// The step may read and write any engine state, create entries, and destroy
/// itself through `engine.destroy_task(id)`.
pub trait TaskStep: fmt::Debug {
    fn step(&mut self, id: TaskId, engine: &mut Engine);
}

/// What a task does each tick.
#[derive(Debug)]
pub enum TaskBehavior {
    /// Runs but does nothing; handy as a placeholder owner of scratch words.
    Idle,
    PaletteCycle(PaletteCycle),
    SurfWave(SurfWave),
    SurfScanline(SurfScanline),
    SinAnimTimer(SinAnimTimer),
    WaterSport(WaterSport),
    Raindrops(Raindrops),
    Custom(Box<dyn TaskStep>),
}

impl TaskBehavior {
    pub fn custom(step: impl TaskStep + 'static) -> Self {
        Self::Custom(Box::new(step))
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        match self {
            Self::Idle => {}
            Self::PaletteCycle(cycle) => cycle.step(id, engine),
            Self::SurfWave(wave) => wave.step(id, engine),
            Self::SurfScanline(scan) => scan.step(id, engine),
            Self::SinAnimTimer(timer) => timer.step(id, engine),
            Self::WaterSport(sport) => sport.step(id, engine),
            Self::Raindrops(rain) => rain.step(id, engine),
            Self::Custom(step) => step.step(id, engine),
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PaletteCycle(_) => "palette_cycle",
            Self::SurfWave(_) => "surf_wave",
            Self::SurfScanline(_) => "surf_scanline",
            Self::SinAnimTimer(_) => "sin_anim_timer",
            Self::WaterSport(_) => "water_sport",
            Self::Raindrops(_) => "raindrops",
            Self::Custom(_) => "custom",
        }
    }
}

/// A live task.
#[derive(Debug)]
pub struct Task {
    /// Lower runs first.
    pub priority: u8,
    pub scratch: [i16; SCRATCH_WORDS],
    pub(crate) seq: u64,
    pub(crate) spawned_on: u64,
    pub(crate) counted: bool,
    /// `None` only while the behavior is executing.
    pub(crate) behavior: Option<TaskBehavior>,
}

impl Task {
    pub(crate) fn new(behavior: TaskBehavior, priority: u8, seq: u64, spawned_on: u64) -> Self {
        Self {
            priority,
            scratch: [0; SCRATCH_WORDS],
            seq,
            spawned_on,
            counted: false,
            behavior: Some(behavior),
        }
    }

    /// The current behavior; `None` while it is running.
    pub fn behavior(&self) -> Option<&TaskBehavior> {
        self.behavior.as_ref()
    }

    /// Allocation order, used to break priority ties.
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}
