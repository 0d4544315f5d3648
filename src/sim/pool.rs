//! Generic object pool for high-churn simulation objects
//!
//! Slots are recycled through a free list. A checked-out slot is addressed by
//! a [`PoolHandle`] carrying the slot generation, so a stale handle can never
//! reach an object that was released and handed out again.

use crate::error::{GameError, Result};

/// Objects that can live in a [`Pool`]
pub trait Poolable {
    /// Arguments used to (re)initialize an instance on acquire
    type Args;

    /// Build a blank instance
    fn create() -> Self;

    /// Re-initialize every mutable field, reviving the object
    fn reset(&mut self, args: Self::Args);
}

/// Reference to a checked-out pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

/// Occupancy snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub available: usize,
    pub in_use: usize,
    pub total: usize,
    pub max_size: usize,
}

#[derive(Debug, Clone)]
pub struct Pool<T: Poolable> {
    slots: Vec<Slot<T>>,
    /// Indices of slots ready to be handed out
    free: Vec<u32>,
    in_use: usize,
    max_size: usize,
}

impl<T: Poolable> Pool<T> {
    /// Create a pool pre-populated with `initial_size` blank objects
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        let initial_size = initial_size.min(max_size);
        let mut pool = Self {
            slots: Vec::with_capacity(initial_size),
            free: Vec::with_capacity(initial_size),
            in_use: 0,
            max_size,
        };
        for i in 0..initial_size {
            pool.slots.push(Slot {
                value: T::create(),
                generation: 0,
                in_use: false,
            });
            pool.free.push(i as u32);
        }
        pool
    }

    /// Check out an object, recycling a free slot when possible
    pub fn acquire(&mut self, args: T::Args) -> Result<PoolHandle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None if self.slots.len() < self.max_size => {
                self.slots.push(Slot {
                    value: T::create(),
                    generation: 0,
                    in_use: false,
                });
                (self.slots.len() - 1) as u32
            }
            None => {
                log::warn!("Object pool has reached maximum size ({})", self.max_size);
                return Err(GameError::PoolExhausted {
                    capacity: self.max_size,
                });
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.in_use = true;
        slot.value.reset(args);
        self.in_use += 1;

        Ok(PoolHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Return an object to the free list
    pub fn release(&mut self, handle: PoolHandle) -> Result<()> {
        let Some(slot) = self.slot_mut(handle) else {
            log::warn!("Attempting to release object not in use");
            return Err(GameError::NotInUse);
        };
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.in_use -= 1;
        self.free.push(handle.index);
        Ok(())
    }

    /// Reclaim every checked-out object (game restart)
    pub fn release_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.in_use {
                slot.in_use = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.in_use = 0;
    }

    /// Drop every object, checked out or not
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.in_use = 0;
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slot_mut(handle).map(|s| &mut s.value)
    }

    fn slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// True when no further object can be checked out
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty() && self.slots.len() >= self.max_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.free.len(),
            in_use: self.in_use,
            total: self.free.len() + self.in_use,
            max_size: self.max_size,
        }
    }
}
