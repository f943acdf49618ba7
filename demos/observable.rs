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

//! A user-defined primitive built on the `Custom` event pair.
//!
//! `Observable` holds a value; a coroutine can wait until the value reaches
//! a target. The setter publishes a `Custom` event source namespaced by a
//! magic number, and the waiter installs a `Custom` sink whose predicate
//! checks the target. Nothing here is special-cased by the runtime.
//!
//! One coroutine counts the observable up from 0 to 9 with a 50 ms delay
//! per step; another waits for the value 4 and announces it.

use std::cell::Cell;
use std::rc::Rc;

use coros::{
    Builder, Coro, CoroSignal, Error, EventSink, EventSource, PlatformTicks, RoundRobin,
    SubjectId, PLATFORM_TICKS_FOREVER, SINK_SLOT_PRIMARY, SINK_SLOT_TIMEOUT,
};

/// Namespace tag for observable events.
const OBSERVABLE_MAGIC: u32 = 0x8AFF_7321;

struct Observable {
    value: Cell<u32>,
    target: Cell<u32>,
}

fn target_reached(sink: &EventSink, _source: &EventSource) -> bool {
    if let EventSink::Custom { subject, .. } = sink {
        let observable = unsafe { &*(subject.as_ptr() as *const Observable) };
        observable.value.get() == observable.target.get()
    } else {
        false
    }
}

impl Observable {
    fn new(initial: u32) -> Observable {
        Observable {
            value: Cell::new(initial),
            target: Cell::new(0),
        }
    }

    fn subject(&self) -> SubjectId {
        SubjectId::of(self)
    }

    /// Set the value and wake a waiter whose target this reaches. Yields.
    fn set(&self, value: u32) {
        self.value.set(value);
        Coro::yield_with_event(EventSource::Custom {
            magic: OBSERVABLE_MAGIC,
            subject: self.subject(),
        });
    }

    /// Wait until the value equals `target`.
    fn wait_until(&self, target: u32, timeout: PlatformTicks) -> Result<(), Error> {
        let coro = coros::current().expect("must be called from a coroutine");
        self.target.set(target);

        coro.set_sink(
            SINK_SLOT_PRIMARY,
            EventSink::Custom {
                magic: OBSERVABLE_MAGIC,
                subject: self.subject(),
                can_unblock: target_reached,
            },
        );
        coro.set_sink(
            SINK_SLOT_TIMEOUT,
            EventSink::Delay {
                ticks_remaining: timeout,
            },
        );

        loop {
            if self.value.get() == self.target.get() {
                return Ok(());
            }

            Coro::yield_with_signal(CoroSignal::Wait);
            if coro.triggered_sink_slot() == SINK_SLOT_TIMEOUT {
                return Err(Error::Timeout);
            }
        }
    }
}

fn main() {
    let observable = Rc::new(Observable::new(0));

    let counter = {
        let observable = Rc::clone(&observable);
        Builder::new()
            .name("counter")
            .spawn(move || {
                for cycle in 0..10 {
                    Coro::yield_delay(50);
                    println!("set to {}", cycle);
                    observable.set(cycle);
                }
            })
            .expect("failed to create coroutine")
    };

    let watcher = {
        let observable = Rc::clone(&observable);
        Builder::new()
            .name("watcher")
            .spawn(move || {
                observable
                    .wait_until(4, PLATFORM_TICKS_FOREVER)
                    .expect("wait failed");
                println!("we have counted to 4!");
            })
            .expect("failed to create coroutine")
    };

    let scheduler = RoundRobin::with_coros(&[&counter, &watcher]);
    coros::run(&scheduler);
}
