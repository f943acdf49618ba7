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

//! Scheduler interface.
//!
//! Every scheduler has two jobs: drive each managed coroutine to completion
//! through resumes, and route event sources to the sinks of blocked
//! coroutines. The capability set is deliberately small so alternative
//! policies (priority, deadline) can slot in behind the same interface.

pub mod round_robin;

pub use round_robin::RoundRobin;

use crate::coro::Coro;
use crate::error::Result;
use crate::event::EventSource;
use crate::executor;

/// The operations a scheduler implementation must provide.
///
/// Methods take `&self`: schedulers use interior mutability so the notify
/// paths can be reached re-entrantly from inside running coroutines.
pub trait Scheduler {
    /// Run until every managed coroutine has finished. Coroutines that never
    /// finish keep `run` from returning.
    fn run(&self);

    /// Post an external event source for routing on the next step.
    ///
    /// This is the entry point for code running outside any coroutine.
    /// Returns [`Error::NotifyFailed`](crate::Error::NotifyFailed) when the
    /// event ring is full — a critical configuration error: the event was
    /// dropped and a waiter may stay blocked.
    fn notify(&self, source: EventSource) -> Result<()>;

    /// Post an external event source from an interrupt-like context. Same
    /// contract as [`notify`](Scheduler::notify) but without the
    /// critical-section bracket; the caller must guarantee it cannot be
    /// re-entered.
    fn notify_from_isr(&self, source: EventSource) -> Result<()>;

    /// The coroutine currently being run, if the scheduler is mid-dispatch.
    fn current_coro(&self) -> Option<&Coro>;
}

/// Install `scheduler` as this thread's executor context and run it to
/// completion.
///
/// This is the normal way to start a scheduler: the yield primitives and all
/// communication primitives resolve the active scheduler through the context
/// this installs.
pub fn run(scheduler: &dyn Scheduler) {
    executor::install(scheduler);
    scheduler.run();
}
