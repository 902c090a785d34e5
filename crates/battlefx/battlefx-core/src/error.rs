//! Error types for the effect engine.
//!
//! Only construction-time problems are errors. Running out of pool slots is a
//! normal outcome (`None`), and out-of-bounds writes during a tick are defects
//! that panic.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FxError {
    /// Configuration rejected by `Config::validate`
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Palette window does not fit the color table
    #[error("Palette window [{start}, {start}+{len}) exceeds palette of {size} entries")]
    PaletteWindowOutOfBounds { start: usize, len: usize, size: usize },

    /// Scanline band does not fit the display
    #[error("Scanline band [{start}, {end}) outside 0..{lines}")]
    ScanlineBoundsOutOfRange { start: usize, end: usize, lines: usize },

    /// Task handle refers to a destroyed entry
    #[error("Stale task handle (slot {index})")]
    StaleTask { index: usize },

    /// Sprite handle refers to a destroyed entry
    #[error("Stale sprite handle (slot {index})")]
    StaleSprite { index: usize },

    /// Scratch word index past the end of the entry's scratch array
    #[error("Scratch index {slot} out of range (0..{words})")]
    ScratchIndexOutOfRange { slot: usize, words: usize },

    /// Effect needs a palette the renderer has not loaded
    #[error("Palette for resource {tag} is not loaded")]
    MissingPalette { tag: u16 },

    /// Motion requested with a zero-length duration
    #[error("Motion duration must be at least one tick")]
    ZeroDuration,
}

impl FxError {
    /// Whether a caller can skip the optional effect and keep going.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StaleTask { .. }
                | Self::StaleSprite { .. }
                | Self::MissingPalette { .. }
                | Self::ZeroDuration
        )
    }

    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::PaletteWindowOutOfBounds { .. }
            | Self::ScanlineBoundsOutOfRange { .. }
            | Self::ScratchIndexOutOfRange { .. } => "bounds",
            Self::StaleTask { .. } | Self::StaleSprite { .. } => "handle",
            Self::MissingPalette { .. } => "resource",
            Self::ZeroDuration => "motion",
        }
    }
}
