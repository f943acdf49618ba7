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

//! Mutual exclusion between coroutines.
//!
//! A mutex is just an owner cell: acquired by the first coroutine to claim
//! it, released by its owner. It is a pure coroutine primitive — there is no
//! ISR surface, interrupt contexts have no identity to own a mutex with.

use std::cell::Cell;

use crate::coro::Coro;
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT};
use crate::executor;
use crate::platform::PlatformTicks;

/// A non-re-entrant mutex owned by at most one coroutine.
pub struct Mutex {
    owner: Cell<Option<SubjectId>>,
}

impl Mutex {
    /// An unowned mutex.
    pub fn new() -> Mutex {
        Mutex {
            owner: Cell::new(None),
        }
    }

    /// Identity token for this mutex.
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Whether some coroutine currently owns the mutex.
    pub fn is_locked(&self) -> bool {
        self.owner.get().is_some()
    }

    /// Acquire the mutex, blocking the calling coroutine while it is held
    /// elsewhere.
    ///
    /// Re-acquiring a mutex the caller already owns is rejected with
    /// [`Error::InvalidState`] — acquisitions are not counted, so a second
    /// acquire could never be matched by its own release.
    pub fn acquire(&self, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        let me = coro.subject();
        if self.owner.get() == Some(me) {
            return Err(Error::InvalidState);
        }

        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::MutexAcquire(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            // No bracket needed: mutex hand-over only ever happens between
            // coroutines on the executor thread.
            if self.owner.get().is_none() {
                self.owner.set(Some(me));
                return Ok(());
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }

    /// Acquire without blocking.
    pub fn acquire_no_wait(&self) -> Result<()> {
        let me = executor::coro().subject();
        match self.owner.get() {
            None => {
                self.owner.set(Some(me));
                Ok(())
            }
            Some(owner) if owner == me => Err(Error::InvalidState),
            Some(_) => Err(Error::MutexOccupied),
        }
    }

    /// Release the mutex and notify waiters. Yields.
    ///
    /// Releasing a mutex held by someone else returns
    /// [`Error::MutexNotOwner`]. Releasing an already-released mutex is
    /// idempotent: the release still succeeds (and still notifies).
    pub fn release(&self) -> Result<()> {
        let me = executor::coro().subject();
        if let Some(owner) = self.owner.get() {
            if owner != me {
                return Err(Error::MutexNotOwner);
            }
        }

        self.owner.set(None);
        Coro::yield_with_event(EventSource::MutexReleased(self.subject()));
        Ok(())
    }
}

impl Default for Mutex {
    fn default() -> Mutex {
        Mutex::new()
    }
}
