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

//! Cooperative multitasking for one thread.
//!
//! `coros` builds applications out of stackful coroutines driven by a
//! user-space scheduler. There is no preemption: a coroutine runs until it
//! yields, and everything — delays, queues, event flags, mutexes,
//! semaphores, byte streams — is expressed through one uniform protocol of
//! event sources (what a coroutine produces) and event sinks (what a blocked
//! coroutine waits for). Interrupt-like contexts join in by posting event
//! sources to the scheduler's bounded external ring.
//!
//! ```
//! use coros::{Builder, Coro, RoundRobin};
//!
//! let hello = Builder::new()
//!     .name("hello")
//!     .spawn(|| {
//!         for _ in 0..5 {
//!             print!("Hello ");
//!             Coro::yield_now();
//!         }
//!     })
//!     .unwrap();
//!
//! let world = Builder::new()
//!     .name("world")
//!     .spawn(|| {
//!         for _ in 0..5 {
//!             println!("World!");
//!             Coro::yield_now();
//!         }
//!     })
//!     .unwrap();
//!
//! let scheduler = RoundRobin::with_coros(&[&hello, &world]);
//! coros::run(&scheduler);
//! ```
//!
//! The scheduler runs until every coroutine's entrypoint has returned; the
//! round-robin policy alternates the two loops, printing "Hello World!"
//! five times.

pub mod builder;
pub mod coro;
pub mod error;
pub mod event;
pub mod executor;
pub mod flags;
pub mod mutex;
pub mod platform;
pub mod queue;
pub mod scheduler;
pub mod semaphore;
pub mod stack;
pub mod stream;

pub use builder::{Builder, Options};
pub use coro::{Coro, CoroHandle, CoroState};
pub use error::{Error, Result};
pub use event::{
    CanUnblockFn, CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_COUNT,
    SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT,
};
pub use flags::{EventFlags, Flags};
pub use mutex::Mutex;
pub use platform::{
    PlatformStackElement, PlatformTicks, DEFAULT_STACK_SIZE, MIN_STACK_SIZE,
    PLATFORM_TICKS_FOREVER,
};
pub use queue::Queue;
pub use scheduler::{run, RoundRobin, Scheduler};
pub use semaphore::Semaphore;
pub use stack::Stack;
pub use stream::Stream;

/// Spawn a coroutine with default options.
///
/// Equivalent to `Coro::spawn`.
pub fn spawn<F>(f: F) -> Result<CoroHandle>
where
    F: FnOnce() + 'static,
{
    Coro::spawn(f)
}

/// The coroutine the active scheduler is currently running, if any.
///
/// Equivalent to `executor::current_coro`.
pub fn current() -> Option<&'static Coro> {
    executor::current_coro()
}

/// Yield the current coroutine, leaving it ready to run again.
///
/// Equivalent to `Coro::yield_now`.
pub fn yield_now() {
    Coro::yield_now()
}

/// Yield the current coroutine for at least `duration_ms` milliseconds.
///
/// Equivalent to `Coro::yield_delay`.
pub fn yield_delay(duration_ms: i64) {
    Coro::yield_delay(duration_ms)
}

/// Block the current coroutine until `target` finishes.
///
/// Equivalent to `Coro::join`.
pub fn join(target: &Coro) {
    Coro::join(target)
}
