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

//! Executor context: which scheduler is driving this thread.
//!
//! Yield primitives and the communication primitives resolve "the current
//! coroutine" and "the scheduler to notify" through this cell instead of
//! threading them through every call. It is written once per
//! [`run`](crate::scheduler::run) invocation and read everywhere else; the
//! ISR notify paths never mutate it.

use std::cell::Cell;
use std::ptr::NonNull;

use crate::coro::Coro;
use crate::scheduler::Scheduler;

thread_local! {
    static ACTIVE: Cell<Option<NonNull<dyn Scheduler>>> = Cell::new(None);
}

/// Install `scheduler` as this thread's active scheduler.
///
/// [`run`](crate::scheduler::run) calls this before entering the scheduling
/// loop; call it directly only when driving a scheduler step by step. The
/// scheduler must stay alive for as long as anything resolves it through
/// this module.
pub fn install(scheduler: &dyn Scheduler) {
    // Erase the borrow's lifetime; the install contract (see module docs)
    // guarantees the scheduler outlives anything that resolves it here.
    let scheduler: &'static dyn Scheduler = unsafe { std::mem::transmute(scheduler) };
    ACTIVE.with(|active| active.set(Some(NonNull::from(scheduler))));
}

/// The scheduler installed on this thread, if any.
pub fn current_scheduler() -> Option<&'static dyn Scheduler> {
    ACTIVE.with(|active| active.get()).map(|ptr|
        // Valid for as long as the install contract holds; the cooperative
        // model guarantees a single writer per thread.
        unsafe { &*ptr.as_ptr() })
}

/// The coroutine the installed scheduler is currently running, if any.
pub fn current_coro() -> Option<&'static Coro> {
    current_scheduler().and_then(|scheduler| scheduler.current_coro())
}

/// The installed scheduler, for paths where its absence is a programming
/// error.
pub(crate) fn scheduler() -> &'static dyn Scheduler {
    current_scheduler().expect("no scheduler installed on this thread")
}

/// The running coroutine, for yield paths that only make sense inside one.
pub(crate) fn coro() -> &'static Coro {
    current_coro().expect("not called from within a running coroutine")
}
