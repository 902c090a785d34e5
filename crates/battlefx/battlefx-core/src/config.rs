//! Engine sizing configuration.

use serde::{Deserialize, Serialize};

use crate::error::FxError;

/// Scratch words per task/sprite entry.
pub const SCRATCH_WORDS: usize = 16;

/// Colors per palette bank.
pub const PALETTE_BANK_SIZE: usize = 16;

/// Pool capacities and shared buffer sizes, fixed for the lifetime of an engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum concurrently live tasks.
    pub task_capacity: usize,
    /// Maximum concurrently live sprites.
    pub sprite_capacity: usize,
    /// Affine transform matrices available to sprites.
    pub matrix_capacity: usize,

    /// Visible display lines; size of each scanline buffer half.
    pub display_lines: usize,
    /// Entries in the shared color table.
    pub palette_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task_capacity: 16,
            sprite_capacity: 64,
            matrix_capacity: 32,
            display_lines: 160,
            palette_size: 512,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), FxError> {
        let invalid = |reason: &str| FxError::InvalidConfig {
            reason: reason.to_string(),
        };
        if self.task_capacity == 0 || self.sprite_capacity == 0 {
            return Err(invalid("pool capacities must be non-zero"));
        }
        if self.task_capacity > u16::MAX as usize || self.sprite_capacity > u16::MAX as usize {
            return Err(invalid("pool capacities must fit a 16-bit slot index"));
        }
        if self.matrix_capacity > u16::MAX as usize {
            return Err(invalid("matrix capacity must fit a 16-bit slot index"));
        }
        if self.display_lines == 0 {
            return Err(invalid("display_lines must be non-zero"));
        }
        if self.palette_size < PALETTE_BANK_SIZE {
            return Err(invalid("palette must hold at least one 16-color bank"));
        }
        Ok(())
    }
}
