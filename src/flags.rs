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

//! Event-flag group.
//!
//! A lightweight way for coroutines (and interrupt-like contexts) to signal
//! each other: 32 flag bits, set by producers and consumed by a waiting
//! coroutine. Producers only ever set bits; clearing is the consumer's job,
//! via the `clear_mask` of a successful get. Conforming use has at most one
//! waiting consumer per group.

use std::cell::Cell;

use crate::coro::Coro;
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT};
use crate::executor;
use crate::platform::{self, PlatformTicks};

/// Flag bits carried by an [`EventFlags`] group.
pub type Flags = u32;

/// A group of 32 event flags.
pub struct EventFlags {
    flags: Cell<Flags>,
}

impl EventFlags {
    /// Create a group with the given initial bits.
    pub fn new(initial: Flags) -> EventFlags {
        EventFlags {
            flags: Cell::new(initial),
        }
    }

    /// Identity token for this group.
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Snapshot of the current bits.
    pub fn peek(&self) -> Flags {
        self.flags.get()
    }

    fn predicate(&self, mask: Flags, wait_for_all: bool) -> bool {
        let flags = self.flags.get();
        if wait_for_all {
            flags & mask == mask
        } else {
            flags & mask != 0
        }
    }

    fn capture_and_clear(&self, mask: Flags, clear_mask: Flags) -> Flags {
        platform::critical_section(|| {
            let flags = self.flags.get();
            self.flags.set(flags & !clear_mask);
            flags & mask
        })
    }

    /// Wait until the masked bits are set, then capture them.
    ///
    /// With `wait_for_all` every bit of `mask` must be set at once;
    /// otherwise any one suffices. On success the bits of `clear_mask` are
    /// cleared and the captured `flags & mask` returned. A timeout leaves
    /// the group untouched.
    pub fn get(
        &self,
        mask: Flags,
        clear_mask: Flags,
        wait_for_all: bool,
        timeout: PlatformTicks,
    ) -> Result<Flags> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::EventFlagsGet(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            // No bracket needed for the test: once set, the bits we are
            // after cannot be cleared by anyone but this consumer.
            if self.predicate(mask, wait_for_all) {
                return Ok(self.capture_and_clear(mask, clear_mask));
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }

    /// Single-shot get: capture and clear if any masked bit is set right
    /// now, else return 0.
    pub fn get_no_wait(&self, mask: Flags, clear_mask: Flags) -> Flags {
        platform::critical_section(|| {
            let flags = self.flags.get();
            if flags & mask != 0 {
                self.flags.set(flags & !clear_mask);
                flags & mask
            } else {
                0
            }
        })
    }

    /// Single-shot get from an interrupt-like context.
    pub fn get_from_isr(&self, mask: Flags, clear_mask: Flags) -> Flags {
        let flags = self.flags.get();
        if flags & mask != 0 {
            self.flags.set(flags & !clear_mask);
            flags & mask
        } else {
            0
        }
    }

    /// Set bits from a coroutine and notify waiters. Yields.
    pub fn set(&self, mask: Flags) {
        platform::critical_section(|| self.flags.set(self.flags.get() | mask));
        Coro::yield_with_event(EventSource::EventFlagsSet(self.subject()));
    }

    /// Set bits without yielding; the waiter learns about it through the
    /// scheduler's external event path.
    pub fn set_no_wait(&self, mask: Flags) -> Result<()> {
        platform::critical_section(|| self.flags.set(self.flags.get() | mask));
        executor::scheduler()
            .notify(EventSource::EventFlagsSet(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }

    /// Set bits from an interrupt-like context.
    pub fn set_from_isr(&self, mask: Flags) -> Result<()> {
        self.flags.set(self.flags.get() | mask);
        executor::scheduler()
            .notify_from_isr(EventSource::EventFlagsSet(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_no_wait_captures_and_clears() {
        let flags = EventFlags::new(0b101);
        assert_eq!(flags.get_no_wait(0b001, 0b001), 0b001);
        assert_eq!(flags.peek(), 0b100);
        // Nothing left under the mask.
        assert_eq!(flags.get_no_wait(0b001, 0b001), 0);
    }

    #[test]
    fn test_get_no_wait_clear_mask_is_independent() {
        let flags = EventFlags::new(0b111);
        // Capture bit 0 but clear everything.
        assert_eq!(flags.get_no_wait(0b001, 0b111), 0b001);
        assert_eq!(flags.peek(), 0);
    }

    #[test]
    fn test_setting_overlapping_masks_is_a_union() {
        let scheduler = crate::scheduler::RoundRobin::new(0);
        crate::executor::install(&scheduler);

        let flags = EventFlags::new(0);
        flags.set_from_isr(0b011).unwrap();
        flags.set_from_isr(0b110).unwrap();
        assert_eq!(flags.peek(), 0b111);
    }
}
