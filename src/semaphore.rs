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

//! Counting semaphore.

use std::cell::Cell;

use crate::coro::Coro;
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT};
use crate::executor;
use crate::platform::{self, PlatformTicks};

/// A counting semaphore with `slot_count` concurrent acquisitions.
///
/// `slots_remaining` always stays within `0..=slot_count`; a release beyond
/// the slot count is an error, so `slots_remaining + outstanding
/// acquisitions == slot_count` holds at all times.
pub struct Semaphore {
    slots_remaining: Cell<usize>,
    slot_count: usize,
}

impl Semaphore {
    /// A semaphore allowing up to `slot_count` concurrent holders.
    pub fn new(slot_count: usize) -> Semaphore {
        Semaphore {
            slots_remaining: Cell::new(slot_count),
            slot_count,
        }
    }

    /// A binary semaphore: one slot.
    pub fn binary() -> Semaphore {
        Semaphore::new(1)
    }

    /// Identity token for this semaphore.
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Slots currently available.
    pub fn slots_remaining(&self) -> usize {
        self.slots_remaining.get()
    }

    /// Total number of slots.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn try_acquire(&self) -> bool {
        platform::critical_section(|| {
            if self.slots_remaining.get() > 0 {
                self.slots_remaining.set(self.slots_remaining.get() - 1);
                true
            } else {
                false
            }
        })
    }

    fn try_release(&self) -> bool {
        platform::critical_section(|| {
            if self.slots_remaining.get() < self.slot_count {
                self.slots_remaining.set(self.slots_remaining.get() + 1);
                true
            } else {
                false
            }
        })
    }

    /// Take a slot, blocking the calling coroutine while none is free.
    pub fn acquire(&self, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(
            SINK_SLOT_PRIMARY,
            EventSink::SemaphoreAcquire(self.subject()),
        );
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            if self.try_acquire() {
                return Ok(());
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }

    /// Return a slot and notify waiters. Yields.
    ///
    /// Releasing past `slot_count` (a double release) returns
    /// [`Error::Overflow`].
    pub fn release(&self) -> Result<()> {
        if !self.try_release() {
            return Err(Error::Overflow);
        }
        Coro::yield_with_event(EventSource::SemaphoreReleased(self.subject()));
        Ok(())
    }

    /// Take a slot from an interrupt-like context; never blocks.
    pub fn acquire_from_isr(&self) -> Result<()> {
        if self.slots_remaining.get() > 0 {
            self.slots_remaining.set(self.slots_remaining.get() - 1);
            Ok(())
        } else {
            Err(Error::Timeout)
        }
    }

    /// Return a slot from an interrupt-like context; waiters learn about it
    /// through the scheduler's ISR notify path.
    pub fn release_from_isr(&self) -> Result<()> {
        if self.slots_remaining.get() >= self.slot_count {
            return Err(Error::Overflow);
        }
        self.slots_remaining.set(self.slots_remaining.get() + 1);
        executor::scheduler()
            .notify_from_isr(EventSource::SemaphoreReleased(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isr_acquire_counts_down_to_zero() {
        let semaphore = Semaphore::new(2);
        assert!(semaphore.acquire_from_isr().is_ok());
        assert!(semaphore.acquire_from_isr().is_ok());
        assert_eq!(semaphore.acquire_from_isr().unwrap_err(), Error::Timeout);
        assert_eq!(semaphore.slots_remaining(), 0);
    }

    #[test]
    fn test_isr_release_overflow_is_detected() {
        let scheduler = crate::scheduler::RoundRobin::new(0);
        crate::executor::install(&scheduler);

        let semaphore = Semaphore::new(1);
        assert!(semaphore.acquire_from_isr().is_ok());
        assert!(semaphore.release_from_isr().is_ok());
        assert_eq!(semaphore.release_from_isr().unwrap_err(), Error::Overflow);
        assert_eq!(semaphore.slots_remaining(), 1);
    }
}
