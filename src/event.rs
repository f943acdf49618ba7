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

//! The event protocol between coroutines and the scheduler.
//!
//! Every communication primitive is a thin policy over one mechanism: a
//! yielding coroutine publishes at most one [`EventSource`] and waits on up
//! to two [`EventSink`]s. The scheduler routes each source to every blocked
//! coroutine's sinks; a matching sink readies its coroutine. The pairing
//! rule lives in [`EventSink::apply`] and is total — any combination not
//! listed there is a miss.

use crate::platform::{PlatformTicks, PLATFORM_TICKS_FOREVER};

/// Index of the sink slot a primitive uses for its main wait condition.
pub const SINK_SLOT_PRIMARY: usize = 0;

/// Index of the sink slot reserved for timeouts.
pub const SINK_SLOT_TIMEOUT: usize = 1;

/// Number of sink slots per coroutine. Two covers every primitive: one
/// condition, one timeout.
pub const SINK_SLOT_COUNT: usize = 2;

/// What a coroutine asks of the scheduler when it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroSignal {
    /// Block until one of the configured sinks triggers.
    Wait,
    /// Stay runnable; the outgoing event source is valid and must be routed.
    Notify,
    /// Route the outgoing source, then block on the configured sinks.
    NotifyAndWait,
    /// Route the outgoing source; the coroutine is finished and must not be
    /// scheduled again.
    NotifyAndDone,
}

/// Identity of the primitive (or coroutine) an event is about.
///
/// Sources and sinks pair up by subject identity, which on this library is
/// the subject's address. The token is only ever compared, never
/// dereferenced, except by `Custom` sink predicates that know the concrete
/// type behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectId(*const ());

impl SubjectId {
    /// Identity token for `subject`.
    pub fn of<T>(subject: &T) -> SubjectId {
        SubjectId(subject as *const T as *const ())
    }

    /// The underlying address, for `Custom` predicates that need to look at
    /// their subject.
    pub fn as_ptr(self) -> *const () {
        self.0
    }
}

/// Predicate deciding whether a `Custom` source unblocks a `Custom` sink.
/// Called only after the magic numbers already matched.
pub type CanUnblockFn = fn(sink: &EventSink, source: &EventSource) -> bool;

/// An event a coroutine (or an external notifier) produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventSource {
    /// Nothing to report; never matches any sink.
    NoOp,
    /// Time moved forward by this many ticks.
    ElapsedTicks(PlatformTicks),
    /// An item was taken from the queue, so it has space again.
    QueueGet(SubjectId),
    /// An item was put into the queue, so it has data again.
    QueuePut(SubjectId),
    /// Bits were set on the event-flag group.
    EventFlagsSet(SubjectId),
    /// A semaphore slot was released.
    SemaphoreReleased(SubjectId),
    /// The mutex was released.
    MutexReleased(SubjectId),
    /// The coroutine with this identity finished.
    CoroFinished(SubjectId),
    /// The consumer took bytes out of the stream.
    StreamBytesRead(SubjectId),
    /// The producer wrote bytes into the stream.
    StreamBytesWritten(SubjectId),
    /// Application-defined event, namespaced by `magic`.
    Custom { magic: u32, subject: SubjectId },
}

/// A condition a blocked coroutine is waiting on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventSink {
    /// Disabled slot.
    None,
    /// Waiting for `ticks_remaining` ticks to elapse. A value of
    /// [`PLATFORM_TICKS_FOREVER`] is never decremented and never triggers.
    Delay { ticks_remaining: PlatformTicks },
    /// Waiting for the queue to have space.
    QueueNotFull(SubjectId),
    /// Waiting for the queue to have an item.
    QueueNotEmpty(SubjectId),
    /// Waiting for bits on the event-flag group; the primitive re-checks its
    /// own mask predicate after waking.
    EventFlagsGet(SubjectId),
    /// Waiting for a semaphore slot.
    SemaphoreAcquire(SubjectId),
    /// Waiting for the mutex to be released.
    MutexAcquire(SubjectId),
    /// Waiting for the coroutine with this identity to finish.
    WaitCoroFinish(SubjectId),
    /// Waiting for the stream to have free space.
    StreamNotFull(SubjectId),
    /// Waiting for the stream to hold bytes.
    StreamNotEmpty(SubjectId),
    /// Application-defined condition; triggers when the magics match and the
    /// predicate agrees.
    Custom {
        magic: u32,
        subject: SubjectId,
        can_unblock: CanUnblockFn,
    },
}

impl EventSink {
    /// Apply `source` to this sink, updating it in place.
    ///
    /// Returns true when the sink triggers. Delay sinks absorb elapsed-tick
    /// events incrementally; every other pairing is a pure identity test.
    pub fn apply(&mut self, source: &EventSource) -> bool {
        match *source {
            EventSource::NoOp => false,
            EventSource::ElapsedTicks(delta) => {
                if let EventSink::Delay { ticks_remaining } = self {
                    if *ticks_remaining != PLATFORM_TICKS_FOREVER {
                        *ticks_remaining = ticks_remaining.saturating_sub(delta).max(0);
                        return *ticks_remaining <= 0;
                    }
                }
                false
            }
            EventSource::QueueGet(src) => {
                matches!(*self, EventSink::QueueNotFull(dst) if dst == src)
            }
            EventSource::QueuePut(src) => {
                matches!(*self, EventSink::QueueNotEmpty(dst) if dst == src)
            }
            EventSource::EventFlagsSet(src) => {
                matches!(*self, EventSink::EventFlagsGet(dst) if dst == src)
            }
            EventSource::SemaphoreReleased(src) => {
                matches!(*self, EventSink::SemaphoreAcquire(dst) if dst == src)
            }
            EventSource::MutexReleased(src) => {
                matches!(*self, EventSink::MutexAcquire(dst) if dst == src)
            }
            EventSource::CoroFinished(src) => {
                matches!(*self, EventSink::WaitCoroFinish(dst) if dst == src)
            }
            EventSource::StreamBytesRead(src) => {
                matches!(*self, EventSink::StreamNotFull(dst) if dst == src)
            }
            EventSource::StreamBytesWritten(src) => {
                matches!(*self, EventSink::StreamNotEmpty(dst) if dst == src)
            }
            EventSource::Custom { magic, .. } => {
                if let EventSink::Custom {
                    magic: sink_magic,
                    can_unblock,
                    ..
                } = *self
                {
                    if sink_magic == magic {
                        let snapshot = *self;
                        return can_unblock(&snapshot, source);
                    }
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject_pair() -> (SubjectId, SubjectId) {
        let a = 0u32;
        let b = 0u32;
        (SubjectId::of(&a), SubjectId::of(&b))
    }

    #[test]
    fn test_identity_pairs_trigger_on_same_subject() {
        let (it, other) = subject_pair();
        let table: &[(EventSource, fn(SubjectId) -> EventSink)] = &[
            (EventSource::QueueGet(it), EventSink::QueueNotFull),
            (EventSource::QueuePut(it), EventSink::QueueNotEmpty),
            (EventSource::EventFlagsSet(it), EventSink::EventFlagsGet),
            (EventSource::SemaphoreReleased(it), EventSink::SemaphoreAcquire),
            (EventSource::MutexReleased(it), EventSink::MutexAcquire),
            (EventSource::CoroFinished(it), EventSink::WaitCoroFinish),
            (EventSource::StreamBytesRead(it), EventSink::StreamNotFull),
            (EventSource::StreamBytesWritten(it), EventSink::StreamNotEmpty),
        ];

        for &(source, make_sink) in table {
            let mut sink = make_sink(it);
            assert!(sink.apply(&source), "{:?} should wake {:?}", source, sink);

            let mut sink = make_sink(other);
            assert!(!sink.apply(&source), "{:?} must not wake {:?}", source, sink);
        }
    }

    #[test]
    fn test_mismatched_kinds_never_trigger() {
        let (it, _) = subject_pair();
        let mut sink = EventSink::QueueNotEmpty(it);
        // Same subject, wrong source kind.
        assert!(!sink.apply(&EventSource::QueueGet(it)));
        assert!(!sink.apply(&EventSource::MutexReleased(it)));
        assert!(!sink.apply(&EventSource::NoOp));

        let mut none = EventSink::None;
        assert!(!none.apply(&EventSource::QueuePut(it)));
        assert!(!none.apply(&EventSource::ElapsedTicks(1000)));
    }

    #[test]
    fn test_delay_accumulates_elapsed_ticks() {
        let mut sink = EventSink::Delay { ticks_remaining: 10 };

        assert!(!sink.apply(&EventSource::ElapsedTicks(4)));
        assert_eq!(sink, EventSink::Delay { ticks_remaining: 6 });

        assert!(!sink.apply(&EventSource::ElapsedTicks(5)));
        assert!(sink.apply(&EventSource::ElapsedTicks(3)));
        assert_eq!(sink, EventSink::Delay { ticks_remaining: 0 });
    }

    #[test]
    fn test_delay_overshoot_clamps_to_zero() {
        let mut sink = EventSink::Delay { ticks_remaining: 3 };
        assert!(sink.apply(&EventSource::ElapsedTicks(100)));
        assert_eq!(sink, EventSink::Delay { ticks_remaining: 0 });
    }

    #[test]
    fn test_delay_forever_never_triggers() {
        let mut sink = EventSink::Delay {
            ticks_remaining: PLATFORM_TICKS_FOREVER,
        };
        assert!(!sink.apply(&EventSource::ElapsedTicks(i64::MAX)));
        assert_eq!(
            sink,
            EventSink::Delay {
                ticks_remaining: PLATFORM_TICKS_FOREVER
            }
        );
    }

    #[test]
    fn test_custom_requires_magic_and_predicate() {
        fn always(_: &EventSink, _: &EventSource) -> bool {
            true
        }
        fn never(_: &EventSink, _: &EventSource) -> bool {
            false
        }

        let (it, _) = subject_pair();
        let source = EventSource::Custom {
            magic: 0x8AFF_7321,
            subject: it,
        };

        let mut sink = EventSink::Custom {
            magic: 0x8AFF_7321,
            subject: it,
            can_unblock: always,
        };
        assert!(sink.apply(&source));

        let mut wrong_magic = EventSink::Custom {
            magic: 0x0BAD_0001,
            subject: it,
            can_unblock: always,
        };
        assert!(!wrong_magic.apply(&source));

        let mut vetoed = EventSink::Custom {
            magic: 0x8AFF_7321,
            subject: it,
            can_unblock: never,
        };
        assert!(!vetoed.apply(&source));
    }
}
