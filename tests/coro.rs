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

//! Coroutine lifecycle: joining, delays, panics and stack health.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use coros::{
    platform, Builder, Coro, CoroState, RoundRobin, DEFAULT_STACK_SIZE,
    PLATFORM_TICKS_FOREVER,
};

#[test]
fn test_join_waits_for_target() {
    common::init_logging();
    let trace: Rc<RefCell<Vec<&str>>> = Rc::new(RefCell::new(Vec::new()));

    let worker = {
        let trace = Rc::clone(&trace);
        Rc::new(
            Builder::new()
                .name("worker")
                .spawn(move || {
                    for _ in 0..3 {
                        trace.borrow_mut().push("work");
                        Coro::yield_now();
                    }
                })
                .unwrap(),
        )
    };

    let joiner = {
        let trace = Rc::clone(&trace);
        let worker = Rc::clone(&worker);
        Builder::new()
            .name("joiner")
            .spawn(move || {
                Coro::join(&worker);
                trace.borrow_mut().push("joined");
            })
            .unwrap()
    };

    let scheduler = RoundRobin::with_coros(&[&worker, &joiner]);
    coros::run(&scheduler);

    assert_eq!(*trace.borrow(), vec!["work", "work", "work", "joined"]);
}

#[test]
fn test_join_on_finished_target_is_a_plain_yield() {
    common::init_logging();
    let done = Rc::new(RefCell::new(false));

    let early = Rc::new(Builder::new().name("early").spawn(|| {}).unwrap());
    let late = {
        let done = Rc::clone(&done);
        let early = Rc::clone(&early);
        Builder::new()
            .name("late")
            .spawn(move || {
                // The target finishes on the very first dispatch, well
                // before this join runs.
                Coro::yield_now();
                Coro::join(&early);
                *done.borrow_mut() = true;
            })
            .unwrap()
    };

    let scheduler = RoundRobin::with_coros(&[&early, &late]);
    coros::run(&scheduler);
    assert!(*done.borrow());
}

#[test]
fn test_yield_delay_is_at_least_the_requested_time() {
    let elapsed = Rc::new(RefCell::new(0));

    {
        let elapsed = Rc::clone(&elapsed);
        common::run_coros(vec![Box::new(move || {
            let before = platform::monotonic_ticks();
            Coro::yield_delay(50);
            *elapsed.borrow_mut() = platform::monotonic_ticks() - before;
        })]);
    }

    assert!(
        *elapsed.borrow() >= 50,
        "woke after only {} ticks",
        *elapsed.borrow()
    );
}

#[test]
fn test_delay_forever_never_wakes_by_time() {
    common::init_logging();
    let forever = Builder::new()
        .name("forever")
        .spawn(|| Coro::yield_delay(PLATFORM_TICKS_FOREVER))
        .unwrap();

    let scheduler = RoundRobin::with_coros(&[&forever]);
    coros::executor::install(&scheduler);
    scheduler.start();

    assert!(scheduler.run_once());
    assert_eq!(forever.state(), CoroState::Blocked);

    // Let real time pass; elapsed-tick events must leave it blocked.
    std::thread::sleep(std::time::Duration::from_millis(20));
    for _ in 0..10 {
        scheduler.run_once();
    }
    assert_eq!(forever.state(), CoroState::Blocked);
}

#[test]
fn test_panicking_coroutine_finishes_without_poisoning_the_rest() {
    let survived = Rc::new(RefCell::new(false));

    let handles = {
        let survived = Rc::clone(&survived);
        common::run_coros(vec![
            Box::new(|| panic!("panic inside a coroutine!!")),
            Box::new(move || {
                Coro::yield_now();
                *survived.borrow_mut() = true;
            }),
        ])
    };

    assert!(*survived.borrow());
    assert_eq!(handles[0].state(), CoroState::Finished);
    assert_eq!(handles[1].state(), CoroState::Finished);
}

#[test]
fn test_resume_after_finished_reports_done() {
    use coros::CoroSignal;

    common::init_logging();
    let coro = Builder::new().spawn(|| {}).unwrap();
    let scheduler = RoundRobin::with_coros(&[&coro]);
    coros::run(&scheduler);

    assert_eq!(coro.state(), CoroState::Finished);
    // A raw resume of a finished coroutine is a no-op report.
    assert_eq!(coro.resume(), CoroSignal::NotifyAndDone);
    assert_eq!(coro.resume(), CoroSignal::NotifyAndDone);
}

#[test]
fn test_stack_stays_intact_and_shows_use() {
    let handles = common::run_coros(vec![Box::new(|| {
        // A little nested work to move the stack pointer around.
        fn fib(n: u64) -> u64 {
            if n < 2 {
                n
            } else {
                fib(n - 1) + fib(n - 2)
            }
        }
        assert_eq!(fib(15), 610);
        Coro::yield_now();
    })]);

    let coro = &handles[0];
    assert!(coro.stack_intact());
    let headroom = coro.stack_headroom();
    assert!(headroom > 0);
    assert!(headroom < DEFAULT_STACK_SIZE - 2);
}

#[test]
fn test_named_and_anonymous_coroutines() {
    common::init_logging();
    let named = Builder::new().name("janitor").spawn(|| {}).unwrap();
    let anonymous = Coro::spawn(|| {}).unwrap();

    assert_eq!(named.name(), Some("janitor"));
    assert_eq!(anonymous.name(), None);
}
