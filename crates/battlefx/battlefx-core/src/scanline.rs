//! Double-buffered per-scanline register values and the blend stage they feed.
//!
//! Model:
//! - the display consumes `front()` one line at a time during the frame,
//! - effects write the next frame into the back buffer,
//! - the engine calls `swap()` exactly once per tick, after all entries ran.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::FxError;

/// Encode blend coefficients as the alpha register expects them.
#[inline]
pub const fn blend_alpha(eva: u16, evb: u16) -> u16 {
    (eva & 0x1F) | ((evb & 0x1F) << 8)
}

/// Front/back pair of per-line values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanlineBuffers {
    buffers: [Vec<u16>; 2],
    front: usize,
}

impl ScanlineBuffers {
    pub fn new(lines: usize) -> Self {
        Self {
            buffers: [vec![0; lines], vec![0; lines]],
            front: 0,
        }
    }

    #[inline]
    pub fn lines(&self) -> usize {
        self.buffers[0].len()
    }

    /// Values the display reads this frame.
    #[inline]
    pub fn front(&self) -> &[u16] {
        &self.buffers[self.front]
    }

    #[inline]
    pub fn back(&self) -> &[u16] {
        &self.buffers[self.front ^ 1]
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut [u16] {
        &mut self.buffers[self.front ^ 1]
    }

    pub fn fill_both(&mut self, value: u16) {
        for buf in &mut self.buffers {
            buf.fill(value);
        }
    }

    /// Exchange front and back.
    #[inline]
    pub fn swap(&mut self) {
        self.front ^= 1;
    }

    /// Check a band against the display before it is written.
    pub fn check_band(&self, start: usize, end: usize) -> Result<(), FxError> {
        if start <= end && end <= self.lines() {
            Ok(())
        } else {
            Err(FxError::ScanlineBoundsOutOfRange {
                start,
                end,
                lines: self.lines(),
            })
        }
    }

    /// Write `inside` for lines in `[start, end)` and `outside` elsewhere, into the back buffer.
    pub fn write_band(&mut self, start: usize, end: usize, inside: u16, outside: u16) {
        let lines = self.lines();
        assert!(
            start <= end && end <= lines,
            "scanline band [{start}, {end}) outside 0..{lines}"
        );
        fill_band(self.back_mut(), start, end, inside, outside);
    }

    /// Same as [`ScanlineBuffers::write_band`] for both halves.
    pub fn write_band_both(&mut self, start: usize, end: usize, inside: u16, outside: u16) {
        let lines = self.lines();
        assert!(
            start <= end && end <= lines,
            "scanline band [{start}, {end}) outside 0..{lines}"
        );
        for buf in &mut self.buffers {
            fill_band(buf, start, end, inside, outside);
        }
    }

    pub fn clear(&mut self) {
        self.fill_both(0);
        self.front = 0;
    }
}

fn fill_band(buf: &mut [u16], start: usize, end: usize, inside: u16, outside: u16) {
    buf[..start].fill(outside);
    buf[start..end].fill(inside);
    buf[end..].fill(outside);
}

/// Register the per-line transfer feeds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendTarget {
    #[default]
    Alpha,
    Brightness,
}

/// Blend control plus the per-line transfer that streams `ScanlineBuffers::front`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendStage {
    armed: bool,
    pub target: BlendTarget,
    /// Which layers take part in blending.
    pub control: u16,
    /// Coefficients used while the transfer is not armed.
    pub alpha: u16,
}

impl BlendStage {
    /// Start streaming the front buffer into `target`. Returns `false` if already armed.
    pub fn arm(&mut self, target: BlendTarget) -> bool {
        if self.armed {
            warn!("blend stage armed twice; keeping {:?}", self.target);
            return false;
        }
        self.armed = true;
        self.target = target;
        true
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Background layer offset shared with the renderer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgScroll {
    pub x: i16,
    pub y: i16,
}

impl BgScroll {
    pub fn scroll_by(&mut self, dx: i16, dy: i16) {
        self.x = self.x.wrapping_add(dx);
        self.y = self.y.wrapping_add(dy);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
