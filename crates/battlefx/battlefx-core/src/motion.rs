//! Deterministic fixed-point motion primitives.
//!
//! Model:
//! - Positions are integer screen units; sub-unit progress is carried in Q8
//!   accumulators (shift factor of 8 bits) so fractional steps never drift.
//! - Every primitive is advanced exactly once per tick by its owning sprite and
//!   reports completion; the owner assigns the returned offset, it never adds it.
//! - Durations are tick counts. A zero duration is clamped to one tick.

use std::ops::{Add, AddAssign, Neg, Sub};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::trig;

/// Fixed-point shift used by all accumulators.
pub const FIXED_SHIFT: u32 = 8;

/// Phase budget of an arc: half of the 8-bit angle domain, in Q8.
const ARC_HALF_CYCLE_Q8: u32 = 0x8000;

/// Integer screen-space point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

fn clamp_duration(duration: u16) -> u16 {
    if duration == 0 {
        warn!("motion duration of 0 ticks clamped to 1");
        1
    } else {
        duration
    }
}

/// One axis of a linear translation.
///
/// The step is stored as a magnitude plus a direction so the truncated
/// accumulator approaches the target from below and can never overshoot it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct AxisStep {
    step_q8: i32,
    negative: bool,
    acc_q8: i32,
}

impl AxisStep {
    fn new(distance: i32, duration: u16) -> Self {
        Self {
            step_q8: (distance.abs() << FIXED_SHIFT) / duration as i32,
            negative: distance < 0,
            acc_q8: 0,
        }
    }

    fn advance(&mut self) -> i32 {
        self.acc_q8 += self.step_q8;
        let whole = self.acc_q8 >> FIXED_SHIFT;
        if self.negative {
            -whole
        } else {
            whole
        }
    }
}

/// Straight-line travel from `start` to `end` over a fixed number of ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearTranslation {
    start: Point,
    end: Point,
    duration: u16,
    elapsed: u16,
    x: AxisStep,
    y: AxisStep,
    offset: Point,
}

impl LinearTranslation {
    /// Prepare a translation. `duration` of 1 is an instantaneous jump on the first advance.
    pub fn new(start: Point, end: Point, duration: u16) -> Self {
        let duration = clamp_duration(duration);
        let distance = end - start;
        Self {
            start,
            end,
            duration,
            elapsed: 0,
            x: AxisStep::new(distance.x, duration),
            y: AxisStep::new(distance.y, duration),
            offset: Point::ZERO,
        }
    }

    /// Like [`LinearTranslation::new`] but rejects a zero duration instead of clamping it.
    pub fn try_new(start: Point, end: Point, duration: u16) -> Result<Self, FxError> {
        if duration == 0 {
            return Err(FxError::ZeroDuration);
        }
        Ok(Self::new(start, end, duration))
    }

    /// Advance by one tick. Returns `true` once the end point has been reached;
    /// that happens on exactly the `duration`-th call.
    pub fn advance(&mut self) -> bool {
        if self.is_done() {
            return true;
        }
        self.elapsed += 1;
        if self.elapsed == self.duration {
            self.offset = self.end - self.start;
            return true;
        }
        self.offset = Point::new(self.x.advance(), self.y.advance());
        false
    }

    /// Displacement from `start` after the last advance.
    #[inline]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Absolute position after the last advance.
    #[inline]
    pub fn position(&self) -> Point {
        self.start + self.offset
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    #[inline]
    pub fn duration(&self) -> u16 {
        self.duration
    }

    #[inline]
    pub fn elapsed(&self) -> u16 {
        self.elapsed
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Linear travel plus a half-sine vertical bulge, giving a parabola-like hop.
///
/// A negative amplitude bulges upward (screen y grows downward).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcTranslation {
    linear: LinearTranslation,
    amplitude: i32,
    phase_q8: u32,
    phase_step_q8: u32,
    bulge: i32,
}

impl ArcTranslation {
    pub fn new(start: Point, end: Point, duration: u16, amplitude: i32) -> Self {
        let linear = LinearTranslation::new(start, end, duration);
        let phase_step_q8 = ARC_HALF_CYCLE_Q8 / linear.duration() as u32;
        Self {
            linear,
            amplitude,
            phase_q8: 0,
            phase_step_q8,
            bulge: 0,
        }
    }

    /// Advance by one tick; completes on the same tick as the underlying linear travel.
    pub fn advance(&mut self) -> bool {
        if self.linear.advance() {
            // land exactly on the end point
            self.bulge = 0;
            return true;
        }
        self.phase_q8 += self.phase_step_q8;
        self.bulge = trig::sin((self.phase_q8 >> FIXED_SHIFT) as i32, self.amplitude);
        false
    }

    #[inline]
    pub fn offset(&self) -> Point {
        self.linear.offset() + Point::new(0, self.bulge)
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.linear.start() + self.offset()
    }

    #[inline]
    pub fn bulge(&self) -> i32 {
        self.bulge
    }

    #[inline]
    pub fn amplitude(&self) -> i32 {
        self.amplitude
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.linear.is_done()
    }

    #[inline]
    pub fn linear(&self) -> &LinearTranslation {
        &self.linear
    }
}

/// Sample `sin(phase) * amplitude` and advance the caller-owned Q8.8 phase.
///
/// The phase lives with the caller, so any number of oscillators can share the
/// one trig table without sharing state.
#[inline]
pub fn sine_wave(phase: &mut u16, step: u16, amplitude: i32) -> i32 {
    let value = trig::sin((*phase >> FIXED_SHIFT) as i32, amplitude);
    *phase = phase.wrapping_add(step);
    value
}

/// Convenience bundle of a phase accumulator and its parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SineWave {
    pub phase: u16,
    pub step: u16,
    pub amplitude: i32,
}

impl SineWave {
    pub fn new(phase: u16, step: u16, amplitude: i32) -> Self {
        Self {
            phase,
            step,
            amplitude,
        }
    }

    /// Value for this tick; advances the phase.
    #[inline]
    pub fn sample(&mut self) -> i32 {
        sine_wave(&mut self.phase, self.step, self.amplitude)
    }

    /// Current 8-bit angle.
    #[inline]
    pub fn angle(&self) -> i32 {
        (self.phase >> FIXED_SHIFT) as i32
    }
}
