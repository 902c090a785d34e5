//! Fixed-capacity slot pool shared by tasks, sprites and affine matrices.
//!
//! Invariants:
//! - a slot is either free or occupied; capacity never changes after creation,
//! - `insert` picks the lowest free index, so a destroyed entry's slot is the
//!   first candidate for the next allocation,
//! - every removal bumps the slot generation, invalidating outstanding handles.

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    live: usize,
}

impl<T> SlotPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                value: None,
            })
            .collect();
        Self { slots, live: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Occupy the lowest free slot. Returns `(index, generation)` or `None` when full.
    pub fn insert(&mut self, value: T) -> Option<(u16, u32)> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.value.is_none())?;
        slot.value = Some(value);
        self.live += 1;
        Some((index as u16, slot.generation))
    }

    /// Free a slot if the generation still matches. Returns the evicted value.
    pub fn remove(&mut self, index: u16, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, index: u16, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, index: u16, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    #[inline]
    pub fn contains(&self, index: u16, generation: u32) -> bool {
        self.get(index, generation).is_some()
    }

    /// Occupied slots in index order as `(index, generation, &value)`.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u32, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value
                .as_ref()
                .map(|v| (i as u16, s.generation, v))
        })
    }

    /// Drop every entry and invalidate all handles.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.live = 0;
    }
}
