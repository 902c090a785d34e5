//! Handles for pool entries and the allocation-order counter.
//!
//! A handle is a slot index plus the generation the slot had when the entry was
//! created. The index is stable for the entry's lifetime and is reused once the
//! entry is destroyed; the generation tells a stale handle from a live one.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! slot_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub(crate) index: u16,
            pub(crate) generation: u32,
        }

        impl $name {
            #[inline]
            pub(crate) const fn new(index: u16, generation: u32) -> Self {
                Self { index, generation }
            }

            /// Stable slot index, valid until the entry is destroyed.
            #[inline]
            pub const fn index(self) -> usize {
                self.index as usize
            }

            #[inline]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}.{}"), self.index, self.generation)
            }
        }
    };
}

slot_handle!(
    /// Handle to an entry of the task pool.
    TaskId,
    "task"
);
slot_handle!(
    /// Handle to an entry of the sprite pool.
    SpriteId,
    "sprite"
);
slot_handle!(
    /// Handle to an affine transform matrix owned by a sprite.
    MatrixId,
    "matrix"
);

/// Monotonic allocation counter; breaks priority ties between tasks.
#[derive(Default, Debug)]
pub struct SequenceAllocator {
    next: u64,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> u64 {
        let seq = self.next;
        self.next = self.next.wrapping_add(1);
        seq
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut seq = SequenceAllocator::new();
        assert_eq!(seq.alloc(), 0);
        assert_eq!(seq.alloc(), 1);
        seq.reset();
        assert_eq!(seq.alloc(), 0);
    }

    #[test]
    fn handles_compare_by_index_and_generation() {
        let a = TaskId::new(3, 0);
        let b = TaskId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(format!("{a:?}"), "task#3.0");
    }
}
