// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output Slot array (§3 Data Model "Output Slot", §4.E ordering): one
//! growable byte buffer per visited entry, indexed by visit order, so N
//! concurrently-matching workers can write in parallel while the main
//! thread flushes strictly in index order.
//!
//! Grounded on the teacher's `walker.rs` thread/handle shape (a background
//! thread producing results a foreground consumer drains in order); the
//! per-slot locking and doubling-growth scheme is new, built directly to
//! §4.E's contract: "slot `i` is locked by `buffer_lock[i mod N]`", and
//! "growth is performed under a lock that covers every per-slot lock to
//! prevent concurrent readers from observing torn pointers."

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Recover a lock's guard even if a prior holder panicked while holding it
/// (`workspace.lints` denies `unwrap`/`expect`, so poisoning is handled by
/// taking the guard anyway rather than propagating the panic).
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn lock_mutex<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

/// One slot's content: `filled` bytes of `data` are valid; `data` may be
/// larger (doubled ahead of need, §3 "capacity, filled length").
#[derive(Debug, Default)]
pub struct Slot {
    pub data: Vec<u8>,
    pub filled: usize,
}

impl Slot {
    fn reset(&mut self) {
        self.filled = 0;
    }

    /// Append `bytes`, doubling the backing buffer as needed so a writer
    /// never blocks on another slot's growth.
    pub fn write(&mut self, bytes: &[u8]) {
        let needed = self.filled + bytes.len();
        if needed > self.data.len() {
            let mut cap = self.data.len().max(64);
            while cap < needed {
                cap *= 2;
            }
            self.data.resize(cap, 0);
        }
        self.data[self.filled..needed].copy_from_slice(bytes);
        self.filled = needed;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.filled]
    }
}

/// The slot array itself (§3, §4.E). Indexed by `visit_index % worker
/// count` for locking purposes; the outer `RwLock` is held shared for
/// ordinary per-slot writes (so every worker's disjoint slot index can be
/// written concurrently) and exclusively only while the array itself
/// grows, which is the one operation that can invalidate another thread's
/// view of the `Vec`'s backing storage.
pub struct SlotArray {
    slots: RwLock<Vec<Mutex<Slot>>>,
}

impl SlotArray {
    pub fn new(initial_capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(initial_capacity);
        slots.resize_with(initial_capacity, || Mutex::new(Slot::default()));
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Grow the array so index `index` is addressable, at least doubling
    /// capacity each time it is invoked while short (§4.E: "the slot array
    /// itself doubles when the highest-written index exceeds
    /// `current_capacity - 2`"). Callers are expected to invoke this
    /// *before* the highest written index gets within two of capacity, not
    /// only once it is already out of bounds.
    pub fn grow_for(&self, index: usize) {
        let current_len = read_lock(&self.slots).len();
        if index + 2 < current_len {
            return;
        }
        let mut guard = write_lock(&self.slots);
        let mut new_len = guard.len().max(1);
        while index + 2 >= new_len {
            new_len *= 2;
        }
        while guard.len() < new_len {
            guard.push(Mutex::new(Slot::default()));
        }
    }

    /// Write `bytes` into slot `index`, growing the array first if needed.
    pub fn write_at(&self, index: usize, bytes: &[u8]) {
        self.grow_for(index);
        let guard = read_lock(&self.slots);
        let mut slot = lock_mutex(&guard[index]);
        slot.write(bytes);
    }

    /// Flush (drain and reset) slot `index`'s content via `sink`, run by
    /// the main thread only, strictly in ascending index order per round
    /// (§4.E: "the main thread flushes slots in index order, releasing
    /// memory as it goes").
    pub fn flush_at(&self, index: usize, mut sink: impl FnMut(&[u8])) {
        let guard = read_lock(&self.slots);
        if index >= guard.len() {
            return;
        }
        let mut slot = lock_mutex(&guard[index]);
        sink(slot.as_bytes());
        slot.data = Vec::new();
        slot.reset();
    }

    pub fn len(&self) -> usize {
        read_lock(&self.slots).len()
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
