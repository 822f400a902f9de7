// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Lock-free Chase–Lev work-stealing deque
//!
//! A bounded deque of block indices with one owner and any number of
//! thieves. The owner pushes and pops at the bottom; thieves steal from
//! the top. `top` and `bottom` are monotonic counters, never reduced
//! modulo the capacity; slot indexing wraps through a power-of-two mask.
//!
//! On a single-element deque, the owner's pop and a concurrent steal are
//! linearized by the compare-and-swap on `top`: exactly one of them wins.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Work-stealing deque of task indices.
///
/// `top` and `bottom` live on separate cache lines; thieves hammering
/// `top` would otherwise invalidate the owner's `bottom` line.
pub struct WsDeque {
    tasks: Box<[UnsafeCell<usize>]>,
    mask: u64,
    top: CachePadded<AtomicU64>,
    bottom: CachePadded<AtomicU64>,
}

// Slot reads and writes race only within the Chase–Lev protocol: a slot is
// read by a thief only between its publication (release store of `bottom`)
// and its consumption (CAS on `top`).
unsafe impl Send for WsDeque {}
unsafe impl Sync for WsDeque {}

impl WsDeque {
    /// Allocate a deque whose capacity is `requested` rounded up to a
    /// power of two (at least 1).
    pub fn new(requested: usize) -> Self {
        let size = requested.max(1).next_power_of_two();
        WsDeque {
            tasks: (0..size).map(|_| UnsafeCell::new(0)).collect(),
            mask: (size - 1) as u64,
            top: CachePadded::new(AtomicU64::new(0)),
            bottom: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Owner-only: append a task at the bottom.
    ///
    /// Callers size the deque per run, so the buffer can never wrap over
    /// unconsumed entries.
    pub fn push_bottom(&self, task: usize) {
        let b = self.bottom.load(Ordering::Relaxed);
        unsafe { *self.tasks[(b & self.mask) as usize].get() = task };
        // The slot write must be visible to thieves before the new bottom.
        self.bottom.store(b + 1, Ordering::Release);
    }

    /// Owner-only: pop the most recently pushed task.
    ///
    /// When one item remains the owner races thieves for it through the
    /// CAS on `top`; `bottom` is restored afterwards either way so the
    /// deque is left canonically empty.
    pub fn pop_bottom(&self) -> Option<usize> {
        let b = self.bottom.load(Ordering::Relaxed);
        if b == 0 {
            return None;
        }
        let b = b - 1;
        self.bottom.store(b, Ordering::SeqCst);

        let t = self.top.load(Ordering::SeqCst);
        if t <= b {
            let task = unsafe { *self.tasks[(b & self.mask) as usize].get() };
            if t == b {
                // Last item: whoever moves `top` first owns it.
                let won = self
                    .top
                    .compare_exchange(t, t + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok();
                self.bottom.store(b + 1, Ordering::SeqCst);
                if !won {
                    return None;
                }
            }
            return Some(task);
        }

        // Already empty, undo the reservation.
        self.bottom.store(b + 1, Ordering::SeqCst);
        None
    }

    /// Thief: take the oldest task.
    ///
    /// Returns `None` when the deque looks empty or another contender won
    /// the CAS on `top`; callers retry.
    pub fn steal(&self) -> Option<usize> {
        let t = self.top.load(Ordering::Acquire);
        let b = self.bottom.load(Ordering::Acquire);
        if t >= b {
            return None;
        }
        let task = unsafe { *self.tasks[(t & self.mask) as usize].get() };
        if self
            .top
            .compare_exchange(t, t + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(task)
        } else {
            None
        }
    }
}
