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

//! Single-producer single-consumer byte stream.
//!
//! Streams treat their buffer as a flow of bytes rather than a set of
//! elements, with a send/receive/flush surface. The ring uses free-running
//! read and write indices masked on access, which requires the capacity to
//! be a power of two; the used count is the wrap-safe difference of the two
//! indices. Byte counts travel through `&mut usize` in/out parameters so a
//! timed-out transfer still reports how far it got.

use std::cell::RefCell;

use crate::coro::Coro;
use crate::error::{Error, Result};
use crate::event::{CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT};
use crate::executor;
use crate::platform::PlatformTicks;

#[derive(Debug)]
struct Inner {
    buf: Box<[u8]>,
    read_idx: usize,
    write_idx: usize,
}

/// SPSC byte ring with blocking send/receive.
#[derive(Debug)]
pub struct Stream {
    inner: RefCell<Inner>,
    capacity: usize,
}

impl Stream {
    /// Create a stream over `capacity` bytes. The capacity must be a
    /// non-zero power of two.
    pub fn new(capacity: usize) -> Result<Stream> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(Error::InvalidValue);
        }
        Ok(Stream {
            inner: RefCell::new(Inner {
                buf: vec![0u8; capacity].into_boxed_slice(),
                read_idx: 0,
                write_idx: 0,
            }),
            capacity,
        })
    }

    /// Identity token for this stream.
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently buffered. From the consumer side this is a lower
    /// bound, from the producer side an upper bound.
    pub fn bytes_used(&self) -> usize {
        let inner = self.inner.borrow();
        inner.write_idx.wrapping_sub(inner.read_idx)
    }

    /// Bytes of free space. Mirror guarantee of
    /// [`bytes_used`](Stream::bytes_used).
    pub fn bytes_free(&self) -> usize {
        self.capacity - self.bytes_used()
    }

    /// Copy as much of `data` in as fits right now; returns the count.
    fn write_some(&self, data: &[u8]) -> usize {
        let mut inner = self.inner.borrow_mut();
        let used = inner.write_idx.wrapping_sub(inner.read_idx);
        let n = data.len().min(self.capacity - used);
        let mask = self.capacity - 1;
        for &byte in &data[..n] {
            let idx = inner.write_idx & mask;
            inner.buf[idx] = byte;
            inner.write_idx = inner.write_idx.wrapping_add(1);
        }
        n
    }

    /// Copy as much into `buf` as is available right now; returns the count.
    fn read_some(&self, buf: &mut [u8]) -> usize {
        let mut inner = self.inner.borrow_mut();
        let used = inner.write_idx.wrapping_sub(inner.read_idx);
        let n = buf.len().min(used);
        let mask = self.capacity - 1;
        for slot in buf[..n].iter_mut() {
            *slot = inner.buf[inner.read_idx & mask];
            inner.read_idx = inner.read_idx.wrapping_add(1);
        }
        n
    }

    /// Send all of `data`, blocking the calling coroutine whenever the
    /// stream is full.
    ///
    /// `sent` reports the bytes actually written. Returns `Ok` when
    /// everything went in, [`Error::Timeout`] when the timeout elapsed
    /// first; the prefix written before the timeout stays in the stream and
    /// is still announced to the consumer.
    pub fn send(&self, data: &[u8], sent: &mut usize, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::StreamNotFull(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        let mut written = 0;
        let mut timed_out = false;
        while written < data.len() {
            let n = self.write_some(&data[written..]);
            written += n;

            if n == 0 {
                Coro::yield_with_signal(CoroSignal::Wait);
                if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                    timed_out = true;
                    break;
                }
            }
        }

        if written > 0 {
            // The consumer hears about it even when only a prefix fit.
            coro.set_source(EventSource::StreamBytesWritten(self.subject()));
            Coro::yield_with_signal(CoroSignal::Notify);
        }

        *sent = written;
        if timed_out {
            Err(Error::Timeout)
        } else {
            Ok(())
        }
    }

    /// Receive exactly `buf.len()` bytes, blocking the calling coroutine
    /// whenever the stream is empty.
    ///
    /// `received` reports the bytes actually read; on [`Error::Timeout`] it
    /// is the partial count.
    pub fn receive(&self, buf: &mut [u8], received: &mut usize, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::StreamNotEmpty(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        let mut read = 0;
        let mut timed_out = false;
        while read < buf.len() {
            let n = self.read_some(&mut buf[read..]);
            read += n;

            if n == 0 {
                Coro::yield_with_signal(CoroSignal::Wait);
                if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                    timed_out = true;
                    break;
                }
            }
        }

        if read > 0 {
            coro.set_source(EventSource::StreamBytesRead(self.subject()));
            Coro::yield_with_signal(CoroSignal::Notify);
        }

        *received = read;
        if timed_out {
            Err(Error::Timeout)
        } else {
            Ok(())
        }
    }

    /// Receive up to `buf.len()` bytes in a single pass.
    ///
    /// Blocks once if the stream is empty, then drains whatever is
    /// available; it never loops to fill the whole buffer. Returns
    /// [`Error::Timeout`] when nothing could be read at all.
    pub fn receive_up_to(
        &self,
        buf: &mut [u8],
        received: &mut usize,
        timeout: PlatformTicks,
    ) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::StreamNotEmpty(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        if self.bytes_used() == 0 {
            Coro::yield_with_signal(CoroSignal::Wait);
            // Re-check what arrived no matter which slot fired.
        }

        let n = self.read_some(buf);
        if n > 0 {
            coro.set_source(EventSource::StreamBytesRead(self.subject()));
            Coro::yield_with_signal(CoroSignal::Notify);
        }

        *received = n;
        if n > 0 {
            Ok(())
        } else {
            Err(Error::Timeout)
        }
    }

    /// Block the producer until the consumer has drained everything.
    pub fn flush(&self, timeout: PlatformTicks) -> Result<()> {
        let coro = executor::coro();
        coro.set_sink(SINK_SLOT_PRIMARY, EventSink::StreamNotFull(self.subject()));
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            if self.bytes_used() == 0 {
                return Ok(());
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }

    /// Send what fits without blocking; notifies through the scheduler.
    pub fn send_no_wait(&self, data: &[u8], sent: &mut usize) -> Result<()> {
        let scheduler = executor::scheduler();
        let n = self.write_some(data);
        *sent = n;
        if n == 0 {
            return Err(Error::StreamFull);
        }
        scheduler
            .notify(EventSource::StreamBytesWritten(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }

    /// Send what fits from an interrupt-like context.
    pub fn send_from_isr(&self, data: &[u8], sent: &mut usize) -> Result<()> {
        let scheduler = executor::scheduler();
        let n = self.write_some(data);
        *sent = n;
        if n == 0 {
            return Err(Error::StreamFull);
        }
        scheduler
            .notify_from_isr(EventSource::StreamBytesWritten(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }

    /// Receive what is available without blocking; notifies through the
    /// scheduler.
    pub fn receive_no_wait(&self, buf: &mut [u8], received: &mut usize) -> Result<()> {
        let scheduler = executor::scheduler();
        let n = self.read_some(buf);
        *received = n;
        if n == 0 {
            return Err(Error::StreamEmpty);
        }
        scheduler
            .notify(EventSource::StreamBytesRead(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }

    /// Receive what is available from an interrupt-like context.
    pub fn receive_from_isr(&self, buf: &mut [u8], received: &mut usize) -> Result<()> {
        let scheduler = executor::scheduler();
        let n = self.read_some(buf);
        *received = n;
        if n == 0 {
            return Err(Error::StreamEmpty);
        }
        scheduler
            .notify_from_isr(EventSource::StreamBytesRead(self.subject()))
            .map_err(|_| Error::NotifyFailed)
    }
}
