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

//! Stackful coroutines.
//!
//! A [`Coro`] is a task with its own stack, an entrypoint closure, two saved
//! platform contexts and the event slots the scheduler routes through: one
//! outgoing [`EventSource`] and two incoming [`EventSink`]s (primary and
//! timeout). Control moves strictly by symmetric context swaps: the
//! scheduler [`resume`](Coro::resume)s a coroutine, and the coroutine hands
//! control back through one of the yield primitives together with a
//! [`CoroSignal`] describing what it wants next.

use std::cell::{Cell, RefCell, UnsafeCell};
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;

use libc::c_void;
use log::{debug, error, trace};

use crate::error::{Error, Result};
use crate::event::{
    CoroSignal, EventSink, EventSource, SubjectId, SINK_SLOT_COUNT, SINK_SLOT_PRIMARY,
    SINK_SLOT_TIMEOUT,
};
use crate::executor;
use crate::platform::{
    self, PlatformContext, DEFAULT_STACK_SIZE, PLATFORM_TICKS_FOREVER,
};
use crate::stack::Stack;

/// Lifecycle state of a coroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroState {
    /// Waiting to be scheduled.
    Ready,
    /// The coroutine currently holding the CPU.
    Running,
    /// Yielded with a wait; resumes when one of its sinks triggers.
    Blocked,
    /// The entrypoint returned; never scheduled again.
    Finished,
}

/// A cooperatively-scheduled task.
///
/// All fields use interior mutability so the scheduler and the running
/// coroutine itself can both work through shared references; the cooperative
/// model guarantees they never race.
pub struct Coro {
    name: Option<String>,
    state: Cell<CoroState>,
    yield_signal: Cell<CoroSignal>,
    event_source: Cell<EventSource>,
    event_sinks: [Cell<EventSink>; SINK_SLOT_COUNT],
    triggered_sink_slot: Cell<usize>,
    // Ping-pong contexts: suspend holds the scheduler side, resume holds the
    // coroutine side.
    suspend_context: UnsafeCell<PlatformContext>,
    resume_context: UnsafeCell<PlatformContext>,
    entry: RefCell<Option<Box<dyn FnOnce()>>>,
    stack: Stack,
}

/// Owning handle to a coroutine.
///
/// The handle keeps the coroutine record and its stack alive; schedulers
/// only hold non-owning references, so a handle must outlive every scheduler
/// slot it occupies. Dropping a handle while the coroutine is suspended
/// abandons whatever lives on its stack without running destructors.
pub struct CoroHandle(NonNull<Coro>);

impl Deref for CoroHandle {
    type Target = Coro;

    fn deref(&self) -> &Coro {
        unsafe { self.0.as_ref() }
    }
}

impl Drop for CoroHandle {
    fn drop(&mut self) {
        trace!("dropping coroutine '{}'", self.debug_name());
        unsafe {
            drop(Box::from_raw(self.0.as_ptr()));
        }
    }
}

/// First frame of every coroutine: run the entrypoint, then report the
/// coroutine as finished, forever.
extern "C" fn trampoline(arg: *mut c_void) {
    let coro: &Coro = unsafe { &*(arg as *const Coro) };

    let entry = coro.entry.borrow_mut().take();
    if let Some(entry) = entry {
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(entry)) {
            let msg = match cause.downcast_ref::<&'static str>() {
                Some(s) => *s,
                None => match cause.downcast_ref::<String>() {
                    Some(s) => &s[..],
                    None => "Box<dyn Any>",
                },
            };
            error!("coroutine '{}' panicked at '{}'", coro.debug_name(), msg);
        }
    }

    debug!("coroutine '{}' finished", coro.debug_name());
    coro.event_source
        .set(EventSource::CoroFinished(coro.subject()));
    // The context must never unwind past this frame; keep signalling done if
    // something resumes a finished coroutine anyway.
    loop {
        Coro::yield_with_signal(CoroSignal::NotifyAndDone);
    }
}

impl Coro {
    /// Bind `entry` to `stack` and return the owning handle.
    pub(crate) fn create(
        entry: Box<dyn FnOnce()>,
        name: Option<String>,
        mut stack: Stack,
    ) -> Result<CoroHandle> {
        if stack.cells() < 3 {
            // Two sentinels plus at least one usable cell.
            return Err(Error::InvalidValue);
        }
        stack.prepare();

        let coro = Box::new(Coro {
            name,
            state: Cell::new(CoroState::Ready),
            yield_signal: Cell::new(CoroSignal::Notify),
            event_source: Cell::new(EventSource::NoOp),
            event_sinks: [Cell::new(EventSink::None), Cell::new(EventSink::None)],
            triggered_sink_slot: Cell::new(SINK_SLOT_PRIMARY),
            suspend_context: UnsafeCell::new(PlatformContext::new()),
            resume_context: UnsafeCell::new(PlatformContext::new()),
            entry: RefCell::new(Some(entry)),
            stack,
        });

        let ptr = NonNull::new(Box::into_raw(coro)).ok_or(Error::NoMem)?;
        let coro = unsafe { ptr.as_ref() };
        unsafe {
            (*coro.resume_context.get()).make(
                coro.stack.interior_ptr(),
                coro.stack.interior_cells(),
                trampoline,
                ptr.as_ptr() as *mut c_void,
            );
        }

        trace!(
            "created coroutine '{}' with a {}-cell stack",
            coro.debug_name(),
            coro.stack.cells()
        );
        Ok(CoroHandle(ptr))
    }

    /// Spawn a coroutine on a default-sized owned stack.
    pub fn spawn<F>(f: F) -> Result<CoroHandle>
    where
        F: FnOnce() + 'static,
    {
        Coro::create(Box::new(f), None, Stack::alloc(DEFAULT_STACK_SIZE)?)
    }

    /// Spawn a coroutine on the given stack.
    pub fn with_stack<F>(f: F, stack: Stack) -> Result<CoroHandle>
    where
        F: FnOnce() + 'static,
    {
        Coro::create(Box::new(f), None, stack)
    }

    /// The coroutine's name, if it was given one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn debug_name(&self) -> &str {
        self.name().unwrap_or("<unnamed>")
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CoroState {
        self.state.get()
    }

    /// Identity token for this coroutine, as used by
    /// [`EventSource::CoroFinished`] / [`EventSink::WaitCoroFinish`].
    pub fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// The outgoing event source of the last notify-bearing yield.
    pub fn source(&self) -> EventSource {
        self.event_source.get()
    }

    /// Set the outgoing event source for an upcoming yield. Used by
    /// communication primitives before `yield_with_signal`.
    pub fn set_source(&self, source: EventSource) {
        self.event_source.set(source);
    }

    /// Read a sink slot. `slot` must be below [`SINK_SLOT_COUNT`].
    pub fn sink(&self, slot: usize) -> EventSink {
        self.event_sinks[slot].get()
    }

    /// Install a sink. `slot` must be below [`SINK_SLOT_COUNT`]. Sinks stay
    /// installed across wake-ups; primitives overwrite them on the next wait.
    pub fn set_sink(&self, slot: usize, sink: EventSink) {
        self.event_sinks[slot].set(sink);
    }

    /// Index of the sink slot that unblocked this coroutine. Only meaningful
    /// right after a resume from a `Wait` yield; comparing it against
    /// [`SINK_SLOT_TIMEOUT`] distinguishes a timeout from the primary
    /// condition.
    pub fn triggered_sink_slot(&self) -> usize {
        self.triggered_sink_slot.get()
    }

    /// Whether the stack sentinels are still intact.
    pub fn stack_intact(&self) -> bool {
        self.stack.sentinels_intact()
    }

    /// Interior stack cells never written to so far.
    pub fn stack_headroom(&self) -> usize {
        self.stack.untouched_cells()
    }

    /// Offer an event source to this coroutine.
    ///
    /// Only blocked coroutines look at events. Sinks are tested in slot
    /// order (primary, then timeout); the first hit records its slot index,
    /// readies the coroutine and stops the scan. Returns whether the
    /// coroutine was unblocked.
    pub fn notify(&self, source: &EventSource) -> bool {
        if self.state.get() != CoroState::Blocked {
            return false;
        }

        for slot in 0..SINK_SLOT_COUNT {
            let mut sink = self.event_sinks[slot].get();
            let triggered = sink.apply(source);
            // Delay sinks mutate as they absorb elapsed ticks.
            self.event_sinks[slot].set(sink);

            if triggered {
                trace!(
                    "coroutine '{}' unblocked via sink slot {}",
                    self.debug_name(),
                    slot
                );
                self.triggered_sink_slot.set(slot);
                self.state.set(CoroState::Ready);
                return true;
            }
        }
        false
    }

    /// Switch into the coroutine until its next yield.
    ///
    /// Resuming a finished coroutine is a no-op that reports
    /// [`CoroSignal::NotifyAndDone`]. This is a scheduler-level operation;
    /// the executor context must identify this coroutine as current while it
    /// runs, so applications should go through a scheduler rather than call
    /// it directly.
    pub fn resume(&self) -> CoroSignal {
        if self.state.get() == CoroState::Finished {
            return CoroSignal::NotifyAndDone;
        }

        self.state.set(CoroState::Running);
        unsafe {
            PlatformContext::swap(&mut *self.suspend_context.get(), &*self.resume_context.get());
        }

        let signal = self.yield_signal.get();
        match signal {
            CoroSignal::Notify => self.state.set(CoroState::Ready),
            CoroSignal::NotifyAndDone => self.state.set(CoroState::Finished),
            CoroSignal::Wait | CoroSignal::NotifyAndWait => self.state.set(CoroState::Blocked),
        }
        signal
    }

    /// Swap from the running coroutine back to whoever resumed it.
    fn switch_out(&self) {
        unsafe {
            PlatformContext::swap(&mut *self.resume_context.get(), &*self.suspend_context.get());
        }
    }

    /// Yield the current coroutine, leaving it ready to run again.
    pub fn yield_now() {
        let coro = executor::coro();
        coro.event_source.set(EventSource::NoOp);
        coro.yield_signal.set(CoroSignal::Notify);
        coro.switch_out();
    }

    /// Yield the current coroutine for at least `duration_ms` milliseconds.
    ///
    /// Delays are "at least" values: the coroutine will not run before the
    /// time has passed, but the scheduler may resume it later.
    pub fn yield_delay(duration_ms: i64) {
        let coro = executor::coro();
        let ticks = if duration_ms == PLATFORM_TICKS_FOREVER {
            PLATFORM_TICKS_FOREVER
        } else {
            duration_ms * platform::ticks_per_ms()
        };
        coro.event_sinks[SINK_SLOT_PRIMARY].set(EventSink::None);
        coro.event_sinks[SINK_SLOT_TIMEOUT].set(EventSink::Delay {
            ticks_remaining: ticks,
        });
        coro.yield_signal.set(CoroSignal::Wait);
        coro.switch_out();
    }

    /// Yield the current coroutine, publishing `source` to every blocked
    /// coroutine. The caller stays runnable.
    pub fn yield_with_event(source: EventSource) {
        let coro = executor::coro();
        coro.event_source.set(source);
        coro.yield_signal.set(CoroSignal::Notify);
        coro.switch_out();
    }

    /// Yield the current coroutine with an explicit signal.
    ///
    /// Low-level building block for communication primitives: the caller is
    /// expected to have populated the event source and/or sinks to match the
    /// signal.
    pub fn yield_with_signal(signal: CoroSignal) {
        let coro = executor::coro();
        coro.yield_signal.set(signal);
        coro.switch_out();
    }

    /// Block the current coroutine until `target` finishes.
    ///
    /// If `target` already finished this degrades to a plain yield.
    pub fn join(target: &Coro) {
        if target.state.get() == CoroState::Finished {
            Coro::yield_now();
            return;
        }

        let coro = executor::coro();
        coro.event_sinks[SINK_SLOT_PRIMARY].set(EventSink::WaitCoroFinish(target.subject()));
        coro.event_sinks[SINK_SLOT_TIMEOUT].set(EventSink::None);
        Coro::yield_with_signal(CoroSignal::Wait);
    }
}
