//! Shared color table and windowed rotation.
//!
//! Colors are 15-bit BGR values as the renderer consumes them. Effects never
//! touch the table outside a [`PaletteWindow`] they validated up front.

use serde::{Deserialize, Serialize};

use crate::config::PALETTE_BANK_SIZE;
use crate::error::FxError;

/// Pack 5-bit channels into a 15-bit color.
#[inline]
pub const fn rgb(r: u16, g: u16, b: u16) -> u16 {
    (r & 0x1F) | ((g & 0x1F) << 5) | ((b & 0x1F) << 10)
}

/// First entry of the sprite half of the color table.
pub const SPRITE_PALETTE_START: usize = 256;

/// Rotation direction of a window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `entry[0]` moves to `entry[len - 1]`, every other entry shifts down one.
    Forward,
    /// `entry[len - 1]` moves to `entry[0]`, every other entry shifts up one.
    Backward,
}

/// Contiguous range of the color table, checked against the table size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteWindow {
    start: usize,
    len: usize,
}

impl PaletteWindow {
    pub fn new(start: usize, len: usize, palette_size: usize) -> Result<Self, FxError> {
        match start.checked_add(len) {
            Some(end) if len > 0 && end <= palette_size => Ok(Self { start, len }),
            _ => Err(FxError::PaletteWindowOutOfBounds {
                start,
                len,
                size: palette_size,
            }),
        }
    }

    /// Window inside a background (`sprite == false`) or sprite bank.
    pub fn in_bank(
        bank: u8,
        sprite: bool,
        first: usize,
        len: usize,
        palette_size: usize,
    ) -> Result<Self, FxError> {
        let base = bank as usize * PALETTE_BANK_SIZE + if sprite { SPRITE_PALETTE_START } else { 0 };
        Self::new(base + first, len, palette_size)
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<u16>,
}

impl Palette {
    pub fn new(size: usize) -> Self {
        Self {
            colors: vec![0; size],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.colors
    }

    /// Validate a window against this table.
    pub fn window(&self, start: usize, len: usize) -> Result<PaletteWindow, FxError> {
        PaletteWindow::new(start, len, self.colors.len())
    }

    pub fn colors(&self, window: PaletteWindow) -> &[u16] {
        assert!(window.end() <= self.colors.len(), "palette window {window:?} out of range");
        &self.colors[window.start..window.end()]
    }

    /// Copy `colors` into the table starting at `start`. Stands in for a renderer upload.
    pub fn load(&mut self, start: usize, colors: &[u16]) -> Result<(), FxError> {
        let window = self.window(start, colors.len())?;
        self.colors[window.start..window.end()].copy_from_slice(colors);
        Ok(())
    }

    /// One-step circular rotation of the window.
    pub fn rotate(&mut self, window: PaletteWindow, direction: Direction) {
        assert!(window.end() <= self.colors.len(), "palette window {window:?} out of range");
        let entries = &mut self.colors[window.start..window.end()];
        match direction {
            Direction::Forward => entries.rotate_left(1),
            Direction::Backward => entries.rotate_right(1),
        }
    }

    pub fn clear(&mut self) {
        self.colors.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: usize) -> Palette {
        let mut p = Palette::new(size);
        let colors: Vec<u16> = (0..size as u16).collect();
        p.load(0, &colors).unwrap();
        p
    }

    #[test]
    fn forward_moves_first_entry_to_the_end() {
        let mut p = ramp(32);
        let w = p.window(17, 8).unwrap();
        p.rotate(w, Direction::Forward);
        assert_eq!(p.colors(w), &[18, 19, 20, 21, 22, 23, 24, 17]);
        assert_eq!(p.as_slice()[16], 16, "outside the window is untouched");
        assert_eq!(p.as_slice()[25], 25);
    }

    #[test]
    fn backward_moves_last_entry_to_the_front() {
        let mut p = ramp(16);
        let w = p.window(1, 7).unwrap();
        p.rotate(w, Direction::Backward);
        assert_eq!(p.colors(w), &[7, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn len_rotations_restore_order() {
        let mut p = ramp(64);
        let w = p.window(40, 8).unwrap();
        let before = p.clone();
        for _ in 0..w.len() {
            p.rotate(w, Direction::Forward);
        }
        assert_eq!(p, before);
    }

    #[test]
    fn windows_are_validated() {
        let p = Palette::new(512);
        assert!(matches!(
            p.window(508, 8),
            Err(FxError::PaletteWindowOutOfBounds { size: 512, .. })
        ));
        assert!(p.window(0, 0).is_err());
        let w = PaletteWindow::in_bank(3, true, 1, 8, 512).unwrap();
        assert_eq!(w.start(), 256 + 48 + 1);
        assert!(PaletteWindow::in_bank(15, true, 9, 8, 512).is_err());
    }

    #[test]
    fn rgb_packs_channels() {
        assert_eq!(rgb(31, 0, 0), 0x001F);
        assert_eq!(rgb(0, 31, 0), 0x03E0);
        assert_eq!(rgb(0, 0, 31), 0x7C00);
    }
}
