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

//! Host platform layer.
//!
//! The runtime consumes a small platform surface: a stack cell type, an
//! opaque execution context with symmetric swap, a monotonic tick counter and
//! critical-section brackets. This module provides the unix host
//! implementation on top of ucontext; embedded targets supply their own
//! equivalent.

use std::mem;
use std::ptr;

use libc::{c_int, c_void, ucontext_t};

/// Element type of a coroutine stack. Stack lengths throughout the library
/// are counted in these cells, not bytes.
pub type PlatformStackElement = u32;

/// Monotonic time in ticks. One tick is one millisecond on the host.
pub type PlatformTicks = i64;

/// Sentinel tick value meaning "no timeout". A delay of this many ticks is
/// never decremented and never fires.
pub const PLATFORM_TICKS_FOREVER: PlatformTicks = i64::MIN;

/// Default coroutine stack length in cells (64 KiB on the host).
pub const DEFAULT_STACK_SIZE: usize = 16 * 1024;

/// Smallest stack length in cells the host will run an entrypoint on.
pub const MIN_STACK_SIZE: usize = 1024;

/// Number of ticks per millisecond.
#[inline]
pub const fn ticks_per_ms() -> PlatformTicks {
    1
}

/// Entry function handed to [`PlatformContext::make`]. Receives the single
/// pointer argument given at `make` time and must never return.
pub type ContextEntry = extern "C" fn(*mut c_void);

extern "C" {
    // Declared here rather than taken from the `libc` re-exports so the
    // variadic call site below has the exact prototype glibc implements.
    fn makecontext(ucp: *mut ucontext_t, func: extern "C" fn(), argc: c_int, ...);
}

/// Saved execution state: registers, signal mask and a stack window.
///
/// A context is either *captured* (holds the caller state as of the last
/// swap away from it) or *made* (set up to enter a fresh entry function on a
/// caller-provided stack). Swapping is the only way control crosses between
/// contexts.
pub struct PlatformContext {
    // ucontext_t is large; box it so PlatformContext stays cheap to move.
    uc: Box<ucontext_t>,
}

impl PlatformContext {
    /// An empty context, ready to be captured into or made.
    pub fn new() -> PlatformContext {
        PlatformContext {
            uc: Box::new(unsafe { mem::zeroed() }),
        }
    }

    /// Capture the current execution state into this context.
    pub fn capture(&mut self) {
        unsafe {
            libc::getcontext(&mut *self.uc);
        }
    }

    /// Arrange for this context to run `entry(arg)` on the given stack when
    /// first swapped to.
    ///
    /// # Safety
    ///
    /// `stack` must point to at least `stack_cells` writable cells that stay
    /// valid (and pinned) for as long as the context can run, and `entry`
    /// must never return.
    pub unsafe fn make(
        &mut self,
        stack: *mut PlatformStackElement,
        stack_cells: usize,
        entry: ContextEntry,
        arg: *mut c_void,
    ) {
        libc::getcontext(&mut *self.uc);
        self.uc.uc_stack.ss_sp = stack as *mut c_void;
        self.uc.uc_stack.ss_size = stack_cells * mem::size_of::<PlatformStackElement>();
        self.uc.uc_stack.ss_flags = 0;
        self.uc.uc_link = ptr::null_mut();

        let boot: extern "C" fn() = mem::transmute(entry);
        makecontext(&mut *self.uc, boot, 1, arg);
    }

    /// Save the current state into `save` and resume `restore`.
    ///
    /// Returns when something later swaps back into `save`.
    ///
    /// # Safety
    ///
    /// `restore` must have been captured or made, and the stack it runs on
    /// must still be valid.
    pub unsafe fn swap(save: &mut PlatformContext, restore: &PlatformContext) {
        libc::swapcontext(&mut *save.uc, &*restore.uc);
    }
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Current monotonic time in ticks (milliseconds on the host).
pub fn monotonic_ticks() -> PlatformTicks {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    ts.tv_sec as PlatformTicks * 1000 + ts.tv_nsec as PlatformTicks / 1_000_000
}

/// Enter a critical section. A no-op on the single-context host; exists so
/// primitives stay correct against ISR-originated event posts on platforms
/// that have them.
#[inline]
pub fn enter_critical_section() {}

/// Leave a critical section.
#[inline]
pub fn exit_critical_section() {}

/// Run `f` inside a critical-section bracket.
#[inline]
pub fn critical_section<R>(f: impl FnOnce() -> R) -> R {
    enter_critical_section();
    let result = f();
    exit_critical_section();
    result
}
