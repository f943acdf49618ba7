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

//! Result codes shared across the whole library.

use thiserror::Error;

/// Errors reported by coroutine, scheduler and primitive operations.
///
/// The first group is recoverable: the operation had no effect beyond its own
/// bookkeeping and may be retried. The second group signals a configuration
/// or capacity problem (`NoMem`, `NotifyFailed`) that the application must
/// address; in particular a `NotifyFailed` means an event source was *not*
/// delivered and a waiter may stay blocked until the scheduler's external
/// event ring is enlarged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No memory available for the requested construction.
    #[error("no memory available")]
    NoMem,

    /// Operation is not valid in the current state.
    #[error("invalid state for operation")]
    InvalidState,

    /// A provided value is outside the accepted range.
    #[error("invalid value")]
    InvalidValue,

    /// The operation would overflow a counter or capacity.
    #[error("operation would overflow")]
    Overflow,

    /// The wait's timeout elapsed before the condition held.
    #[error("timed out")]
    Timeout,

    /// The scheduler's external event ring was full; the event was dropped.
    #[error("scheduler notification failed (event ring full)")]
    NotifyFailed,

    /// Tried to take an item from an empty queue.
    #[error("queue is empty")]
    QueueEmpty,

    /// Tried to put an item into a full queue.
    #[error("queue is full")]
    QueueFull,

    /// The calling coroutine does not own the mutex.
    #[error("mutex is not owned by the caller")]
    MutexNotOwner,

    /// The mutex is held by another coroutine.
    #[error("mutex is occupied")]
    MutexOccupied,

    /// All semaphore slots are already released.
    #[error("semaphore is full")]
    SemaphoreFull,

    /// The stream holds no bytes.
    #[error("stream is empty")]
    StreamEmpty,

    /// The stream has no free space.
    #[error("stream is full")]
    StreamFull,
}

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
