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

//! Coroutine-aware FIFO queue.
//!
//! A fixed-capacity ring of typed cells. Items move in and out by value.
//! Three tiers of operations exist:
//!
//! - [`put`](Queue::put) / [`get`](Queue::get) block the calling coroutine
//!   (with a timeout) and notify waiters through the yield protocol,
//! - [`put_no_wait`](Queue::put_no_wait) / [`get_no_wait`](Queue::get_no_wait)
//!   never block but still publish the event through the scheduler,
//! - [`raw_put`](Queue::raw_put) / [`raw_get`](Queue::raw_get) touch only the
//!   ring; they are for queues that no coroutine waits on (the scheduler's
//!   own external event ring is one).

use std::cell::RefCell;
use std::mem::MaybeUninit;

use crate::coro::Coro;
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT};
use crate::executor;
use crate::platform::{self, PlatformTicks};

struct Inner<T> {
    items: Box<[MaybeUninit<T>]>,
    read_idx: usize,
    write_idx: usize,
    count: usize,
}

impl<T> std::fmt::Debug for Inner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inner")
            .field("capacity", &self.items.len())
            .field("read_idx", &self.read_idx)
            .field("write_idx", &self.write_idx)
            .field("count", &self.count)
            .finish()
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let capacity = self.items.len();
        while self.count > 0 {
            unsafe {
                self.items[self.read_idx].assume_init_drop();
            }
            self.read_idx = (self.read_idx + 1) % capacity;
            self.count -= 1;
        }
    }
}

/// Fixed-capacity FIFO queue of `T`.
#[derive(Debug)]
pub struct Queue<T> {
    inner: RefCell<Inner<T>>,
    capacity: usize,
}

impl<T> Queue<T> {
    /// Create a queue holding up to `capacity` items.
    pub fn new(capacity: usize) -> Result<Queue<T>> {
        if capacity == 0 {
            return Err(Error::InvalidValue);
        }
        let items = (0..capacity)
            .map(|_| MaybeUninit::uninit())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Queue {
            inner: RefCell::new(Inner {
                items,
                read_idx: 0,
                write_idx: 0,
                count: 0,
            }),
            capacity,
        })
    }

    /// Identity token for this queue, as carried by queue event sources and
    /// sinks.
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Maximum number of items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        platform::critical_section(|| self.inner.borrow().count)
    }

    /// Whether the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// One protected insert attempt; hands the item back when full.
    fn try_put(&self, item: T) -> std::result::Result<(), T> {
        platform::critical_section(|| {
            let mut queue = self.inner.borrow_mut();
            if queue.count == self.capacity {
                return Err(item);
            }
            let idx = queue.write_idx;
            queue.items[idx].write(item);
            queue.write_idx = (queue.write_idx + 1) % self.capacity;
            queue.count += 1;
            Ok(())
        })
    }

    /// One protected removal attempt.
    fn try_get(&self) -> Option<T> {
        platform::critical_section(|| {
            let mut queue = self.inner.borrow_mut();
            if queue.count == 0 {
                return None;
            }
            let idx = queue.read_idx;
            let item = unsafe { queue.items[idx].assume_init_read() };
            queue.read_idx = (queue.read_idx + 1) % self.capacity;
            queue.count -= 1;
            Some(item)
        })
    }

    /// Put an item, blocking the calling coroutine while the queue is full.
    ///
    /// On success the waiting consumers are notified. On timeout the item is
    /// dropped and [`Error::Timeout`] is returned.
    pub fn put(&self, item: T, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::QueueNotFull(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        let mut pending = Some(item);
        loop {
            if let Some(value) = pending.take() {
                match self.try_put(value) {
                    Ok(()) => break,
                    Err(value) => pending = Some(value),
                }
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }

        coro.set_source(EventSource::QueuePut(self.subject()));
        Coro::yield_with_signal(CoroSignal::Notify);
        Ok(())
    }

    /// Take the oldest item, blocking the calling coroutine while the queue
    /// is empty.
    pub fn get(&self, timeout: PlatformTicks) -> Result<T> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::QueueNotEmpty(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            if let Some(item) = self.try_get() {
                coro.set_source(EventSource::QueueGet(self.subject()));
                Coro::yield_with_signal(CoroSignal::Notify);
                return Ok(item);
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }

    /// Put without blocking; the scheduler is notified through its external
    /// event path. The item is dropped when the queue is full.
    pub fn put_no_wait(&self, item: T) -> Result<()> {
        let scheduler = executor::scheduler();
        match self.try_put(item) {
            Ok(()) => scheduler
                .notify(EventSource::QueuePut(self.subject()))
                .map_err(|_| Error::NotifyFailed),
            Err(_) => Err(Error::QueueFull),
        }
    }

    /// Take without blocking; the scheduler is notified through its external
    /// event path.
    pub fn get_no_wait(&self) -> Result<T> {
        let scheduler = executor::scheduler();
        match self.try_get() {
            Some(item) => scheduler
                .notify(EventSource::QueueGet(self.subject()))
                .map(|_| item)
                .map_err(|_| Error::NotifyFailed),
            None => Err(Error::QueueEmpty),
        }
    }

    /// Put without notifying anything.
    ///
    /// Coroutines blocked on this queue will not learn about the item; only
    /// use this on queues outside the coroutine protocol.
    pub fn raw_put(&self, item: T) -> Result<()> {
        self.try_put(item).map_err(|_| Error::QueueFull)
    }

    /// Take without notifying anything.
    pub fn raw_get(&self) -> Result<T> {
        self.try_get().ok_or(Error::QueueEmpty)
    }
}
