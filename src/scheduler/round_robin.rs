// The MIT License (MIT)

// Copyright (c) 2026 Coros Developers

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Round-robin scheduler.
//!
//! Coroutines live in a fixed array of slots and are dispatched strictly by
//! slot order: each dispatch scans from one past the previously chosen slot,
//! so a coroutine that yields goes to the back of the cycle. Each step also
//! synthesizes elapsed-time events from the platform clock and drains the
//! bounded ring of externally posted events.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use log::{debug, trace, warn};

use crate::coro::{Coro, CoroHandle, CoroState};
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSource};
use crate::platform::{self, PlatformTicks};
use crate::queue::Queue;
use crate::scheduler::Scheduler;

/// Default capacity of the external event ring. Exceeding it surfaces as
/// [`Error::NotifyFailed`]; size the ring for the worst burst of events that
/// can arrive between two scheduler steps.
pub const DEFAULT_EXTERNAL_EVENT_CAPACITY: usize = 16;

/// Round-robin scheduler over a fixed set of coroutine slots.
///
/// Slots hold non-owning references: the [`CoroHandle`]s added to the
/// scheduler must outlive it (or be removed first).
pub struct RoundRobin {
    slots: RefCell<Vec<Option<NonNull<Coro>>>>,
    /// Occupied slots, finished or not.
    live_count: Cell<usize>,
    finished_count: Cell<usize>,
    current: Cell<Option<NonNull<Coro>>>,
    /// Slot to consider first on the next dispatch.
    next_slot_index: Cell<usize>,
    external_events: Queue<EventSource>,
    previous_ticks: Cell<PlatformTicks>,
}

impl RoundRobin {
    /// A scheduler with `max_slots` empty coroutine slots and the default
    /// external event ring.
    pub fn new(max_slots: usize) -> RoundRobin {
        Self::with_event_capacity(max_slots, DEFAULT_EXTERNAL_EVENT_CAPACITY)
    }

    /// A scheduler with an explicitly sized external event ring.
    pub fn with_event_capacity(max_slots: usize, event_capacity: usize) -> RoundRobin {
        let event_capacity = event_capacity.max(1);
        RoundRobin {
            slots: RefCell::new(vec![None; max_slots]),
            live_count: Cell::new(0),
            finished_count: Cell::new(0),
            current: Cell::new(None),
            next_slot_index: Cell::new(0),
            external_events: Queue::new(event_capacity)
                .unwrap_or_else(|_| unreachable!("capacity is clamped to at least 1")),
            previous_ticks: Cell::new(0),
        }
    }

    /// A scheduler sized for, and populated with, the given coroutines.
    pub fn with_coros(coros: &[&CoroHandle]) -> RoundRobin {
        let scheduler = Self::new(coros.len());
        for coro in coros {
            // Cannot fail: one slot per coroutine.
            let _ = scheduler.add(coro);
        }
        scheduler
    }

    /// Add a coroutine into the first empty slot.
    ///
    /// A finished coroutine keeps occupying its slot until removed, so the
    /// caller always knows whether the scheduler still references it.
    pub fn add(&self, coro: &CoroHandle) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        for slot in slots.iter_mut() {
            if slot.is_none() {
                *slot = Some(NonNull::from(&**coro));
                self.live_count.set(count_occupied(&slots));
                return Ok(());
            }
        }
        Err(Error::NoMem)
    }

    /// Remove a coroutine from its slot. Ownership stays with the caller's
    /// handle; nothing is freed.
    pub fn remove(&self, coro: &CoroHandle) {
        let target = NonNull::from(&**coro);
        let mut slots = self.slots.borrow_mut();
        for slot in slots.iter_mut() {
            if *slot == Some(target) {
                *slot = None;
                self.live_count.set(count_occupied(&slots));
                return;
            }
        }
    }

    /// Prepare for step-by-step running: baseline the finished count and the
    /// tick counter. Called once, just before the first
    /// [`run_once`](RoundRobin::run_once).
    pub fn start(&self) {
        let slots = self.slots.borrow();
        let finished = slots
            .iter()
            .flatten()
            .filter(|ptr| unsafe { ptr.as_ref() }.state() == CoroState::Finished)
            .count();
        self.finished_count.set(finished);
        self.previous_ticks.set(platform::monotonic_ticks());
    }

    /// Run a single scheduling step: dispatch at most one READY coroutine,
    /// route its outgoing event, advance time and drain external events.
    ///
    /// Returns false once every occupied slot holds a finished coroutine.
    pub fn run_once(&self) -> bool {
        if self.finished_count.get() >= self.live_count.get() {
            return false;
        }

        if let Some(ptr) = self.next_ready() {
            let coro = unsafe { ptr.as_ref() };
            let signal = coro.resume();

            let routed = match signal {
                CoroSignal::NotifyAndDone => {
                    self.finished_count.set(self.finished_count.get() + 1);
                    debug!(
                        "{}/{} coroutines finished",
                        self.finished_count.get(),
                        self.live_count.get()
                    );
                    Some(coro.source())
                }
                CoroSignal::Notify | CoroSignal::NotifyAndWait => Some(coro.source()),
                CoroSignal::Wait => None,
            };
            if let Some(source) = routed {
                self.route(&source);
            }
        }

        // Elapsed time is synthesized as an event and fed through the same
        // external ring every other notifier uses.
        let now = platform::monotonic_ticks();
        let previous = self.previous_ticks.get();
        if now != previous {
            if self.notify(EventSource::ElapsedTicks(now - previous)).is_err() {
                warn!("external event ring full, elapsed-tick event dropped");
            }
            self.previous_ticks.set(now);
        }

        let pending = self.external_events.len();
        for _ in 0..pending {
            match self.external_events.raw_get() {
                Ok(event) => self.route(&event),
                Err(_) => break,
            }
        }

        true
    }

    /// Scan for the next READY coroutine, starting at `next_slot_index`.
    fn next_ready(&self) -> Option<NonNull<Coro>> {
        let slots = self.slots.borrow();
        if slots.is_empty() {
            return None;
        }
        for offset in 0..slots.len() {
            let index = (self.next_slot_index.get() + offset) % slots.len();
            if let Some(ptr) = slots[index] {
                if unsafe { ptr.as_ref() }.state() == CoroState::Ready {
                    trace!("dispatching slot {}", index);
                    self.current.set(Some(ptr));
                    self.next_slot_index.set((index + 1) % slots.len());
                    return Some(ptr);
                }
            }
        }
        None
    }

    /// Offer an event source to every coroutine, in slot order.
    fn route(&self, source: &EventSource) {
        let slots = self.slots.borrow();
        for ptr in slots.iter().flatten() {
            unsafe { ptr.as_ref() }.notify(source);
        }
    }
}

impl Scheduler for RoundRobin {
    fn run(&self) {
        self.start();
        debug!(
            "scheduler running {} coroutines",
            self.live_count.get() - self.finished_count.get()
        );
        while self.run_once() {}
        debug!("scheduler finished");
    }

    fn notify(&self, source: EventSource) -> Result<()> {
        platform::critical_section(|| self.external_events.raw_put(source))
            .map_err(|_| Error::NotifyFailed)
    }

    fn notify_from_isr(&self, source: EventSource) -> Result<()> {
        self.external_events
            .raw_put(source)
            .map_err(|_| Error::NotifyFailed)
    }

    fn current_coro(&self) -> Option<&Coro> {
        self.current.get().map(|ptr| unsafe { &*ptr.as_ptr() })
    }
}

fn count_occupied(slots: &[Option<NonNull<Coro>>]) -> usize {
    slots.iter().flatten().count()
}
