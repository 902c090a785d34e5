//! Surf: a scrolling wave background faded in and out through a scanline band.
//!
//! Two cooperating tasks:
//! - [`SurfWave`] (the visual task) scrolls the wave layer, cycles its water
//!   colors, and ramps the blend coefficients up and back down;
//! - [`SurfScanline`] runs one priority step later, so it always sees the
//!   controller's value for the current tick. It writes the blend value for the
//!   wave band into the back scanline buffer and opens the band one line per tick.
//!
//! When the fade-out reaches zero the controller restores the layer in two
//! ticks and signals the scanline task, which disarms the blend stage and ends.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::FxError;
use crate::host::{BattlerRole, Side};
use crate::ids::TaskId;
use crate::palette::{Direction, PaletteWindow};
use crate::scanline::{blend_alpha, BlendTarget};
use crate::task::TaskBehavior;

/// First target bg1, alpha blending, second target everything.
pub const SURF_BLEND_CONTROL: u16 = 0x3F42;
/// Blend value for lines outside the band and at the start of the fade.
pub const SURF_BLEND_HIDDEN: u16 = blend_alpha(0, 16);
/// Wave colors rotate every this many ticks.
const COLOR_CADENCE: u8 = 4;
/// Fade-in steps; afterwards the wave holds at this strength.
const FADE_IN_STEPS: i16 = 13;
/// Step count after which the fade-out starts.
const FADE_OUT_AFTER: i16 = 54;
/// Initial band for waves that sweep in from the side.
const BAND_TOP: usize = 48;
const BAND_BOTTOM: usize = 112;

/// How the band opens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandGrowth {
    /// Starts as `[48, 112)`; the top edge rises to line 0.
    RaiseTop,
    /// Starts empty at line 0; the bottom edge drops to line 112.
    LowerBottom,
}

/// Per-side starting scroll and scroll velocity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Approach {
    scroll: (i16, i16),
    velocity: (i16, i16),
    growth: BandGrowth,
}

impl Approach {
    fn for_battle(engine: &Engine) -> Self {
        let env = engine.env();
        if env.is_contest() {
            Self {
                scroll: (-80, -48),
                velocity: (2, 1),
                growth: BandGrowth::RaiseTop,
            }
        } else if env.battler_side(BattlerRole::Attacker) == Side::Opponent {
            Self {
                scroll: (-224, 256),
                velocity: (2, -1),
                growth: BandGrowth::LowerBottom,
            }
        } else {
            Self {
                scroll: (0, -48),
                velocity: (-2, 1),
                growth: BandGrowth::RaiseTop,
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfPhase {
    /// Scrolling and fading.
    Waves,
    /// Faded out; the renderer clears the wave layer this tick.
    ClearLayer,
    /// Restore scroll and blend registers, release the scanline task.
    Finish,
}

/// Controller task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfWave {
    scanline: TaskId,
    colors: PaletteWindow,
    velocity: (i16, i16),
    phase: SurfPhase,
    color_ticks: u8,
    fade_ticks: u8,
    fade_steps: i16,
    strength: i16,
    blend: u16,
}

impl SurfWave {
    /// Start the wave. The wave layer's colors live in background palette `bank`.
    ///
    /// `Ok(None)` when either task could not get a slot; nothing is left behind.
    /// The scanline task needs a priority above the controller's, so a priority
    /// of 255 runs the controller at 254.
    pub fn spawn(engine: &mut Engine, bank: u8, priority: u8) -> Result<Option<TaskId>, FxError> {
        let priority = if priority == u8::MAX {
            warn!("surf priority {priority} lowered to {}", u8::MAX - 1);
            u8::MAX - 1
        } else {
            priority
        };
        let colors = PaletteWindow::in_bank(bank, false, 1, 7, engine.palette.len())?;
        let approach = Approach::for_battle(engine);

        let (top, bottom) = match approach.growth {
            BandGrowth::RaiseTop => (BAND_TOP, BAND_BOTTOM),
            BandGrowth::LowerBottom => (0, 0),
        };
        engine.scanline.check_band(top, bottom)?;

        let scan = SurfScanline {
            phase: ScanPhase::Setup,
            growth: approach.growth,
            top,
            bottom,
            inside: SURF_BLEND_HIDDEN,
            outside: SURF_BLEND_HIDDEN,
            released: false,
        };
        let Some(scanline) =
            engine.create_task(TaskBehavior::SurfScanline(scan), priority + 1)
        else {
            return Ok(None);
        };

        let wave = SurfWave {
            scanline,
            colors,
            velocity: approach.velocity,
            phase: SurfPhase::Waves,
            color_ticks: 0,
            // the first tick already takes a fade step
            fade_ticks: 1,
            fade_steps: 0,
            strength: 0,
            blend: SURF_BLEND_HIDDEN,
        };
        let Some(id) = engine.create_visual_task(TaskBehavior::SurfWave(wave), priority) else {
            engine.destroy_task(scanline);
            return Ok(None);
        };

        engine.blend.control = SURF_BLEND_CONTROL;
        engine.blend.alpha = SURF_BLEND_HIDDEN;
        engine.bg_scroll.x = approach.scroll.0;
        engine.bg_scroll.y = approach.scroll.1;
        debug!("{id:?} surf started, {:?} band via {scanline:?}", approach.growth);
        Ok(Some(id))
    }

    #[inline]
    pub fn phase(&self) -> SurfPhase {
        self.phase
    }

    /// Blend value currently handed to the band.
    #[inline]
    pub fn blend(&self) -> u16 {
        self.blend
    }

    #[inline]
    pub fn scanline_task(&self) -> TaskId {
        self.scanline
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        match self.phase {
            SurfPhase::Waves => self.waves(engine),
            SurfPhase::ClearLayer => {
                debug!("{id:?} surf faded out");
                self.phase = SurfPhase::Finish;
            }
            SurfPhase::Finish => {
                engine.bg_scroll.reset();
                engine.blend.control = 0;
                engine.blend.alpha = blend_alpha(0, 0);
                if let Some(TaskBehavior::SurfScanline(scan)) = engine.task_behavior_mut(self.scanline) {
                    scan.release();
                }
                engine.destroy_visual_task(id);
            }
        }
    }

    fn waves(&mut self, engine: &mut Engine) {
        engine.bg_scroll.scroll_by(self.velocity.0, self.velocity.1);

        self.color_ticks += 1;
        if self.color_ticks == COLOR_CADENCE {
            self.color_ticks = 0;
            engine.palette.rotate(self.colors, Direction::Backward);
        }

        self.fade_ticks += 1;
        if self.fade_ticks > 1 {
            self.fade_ticks = 0;
            self.fade_steps += 1;
            if self.fade_steps <= FADE_IN_STEPS {
                self.strength += 1;
                self.push_blend(engine);
            }
            if self.fade_steps > FADE_OUT_AFTER {
                self.strength -= 1;
                self.push_blend(engine);
            }
        }

        if self.blend & 0x1F == 0 {
            self.phase = SurfPhase::ClearLayer;
        }
    }

    fn push_blend(&mut self, engine: &mut Engine) {
        let eva = self.strength.clamp(0, 16) as u16;
        self.blend = blend_alpha(eva, 16 - eva);
        if let Some(TaskBehavior::SurfScanline(scan)) = engine.task_behavior_mut(self.scanline) {
            scan.inside = self.blend;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanPhase {
    /// Fill both buffers and arm the blend stage.
    Setup,
    /// Band edge moves one line per tick.
    Opening,
    /// Band fully open; rewritten every tick.
    Open,
}

/// Scanline task owned by a [`SurfWave`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfScanline {
    phase: ScanPhase,
    growth: BandGrowth,
    top: usize,
    bottom: usize,
    /// Blend value inside the band; written by the controller.
    pub inside: u16,
    pub outside: u16,
    released: bool,
}

impl SurfScanline {
    /// Ask the task to disarm the blend stage and end on its next run.
    pub fn release(&mut self) {
        self.released = true;
    }

    #[inline]
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Current band as `[top, bottom)`.
    #[inline]
    pub fn band(&self) -> (usize, usize) {
        (self.top, self.bottom)
    }

    pub(crate) fn step(&mut self, id: TaskId, engine: &mut Engine) {
        match self.phase {
            ScanPhase::Setup => {
                engine
                    .scanline
                    .write_band_both(self.top, self.bottom, self.inside, self.outside);
                engine.blend.arm(BlendTarget::Alpha);
                self.phase = ScanPhase::Opening;
                return;
            }
            ScanPhase::Opening => {
                match self.growth {
                    BandGrowth::RaiseTop => {
                        self.top = self.top.saturating_sub(1);
                        if self.top == 0 {
                            self.phase = ScanPhase::Open;
                        }
                    }
                    BandGrowth::LowerBottom => {
                        let limit = BAND_BOTTOM.min(engine.scanline.lines());
                        self.bottom = (self.bottom + 1).min(limit);
                        if self.bottom >= limit {
                            self.phase = ScanPhase::Open;
                        }
                    }
                }
                self.write(engine);
            }
            ScanPhase::Open => self.write(engine),
        }

        if self.released {
            engine.blend.disarm();
            engine.bg_scroll.reset();
            debug!("{id:?} surf scanline released");
            engine.destroy_task(id);
        }
    }

    fn write(&self, engine: &mut Engine) {
        engine
            .scanline
            .write_band(self.top, self.bottom, self.inside, self.outside);
    }
}
