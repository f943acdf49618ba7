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

//! Semaphore: slot accounting and contention beyond the slot count.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use coros::{Coro, Error, Semaphore, PLATFORM_TICKS_FOREVER};

#[test]
fn test_third_acquirer_waits_for_a_slot() {
    // Two slots, three takers sleeping 500/800/500 ms. The third must wait
    // for the first release, which (by the delays) comes from taker 1.
    let semaphore = Rc::new(Semaphore::new(2));
    let order = Rc::new(RefCell::new(Vec::new()));

    let taker = |id: u32, hold_ms: i64| {
        let semaphore = Rc::clone(&semaphore);
        let order = Rc::clone(&order);
        Box::new(move || {
            semaphore.acquire(PLATFORM_TICKS_FOREVER).unwrap();
            order.borrow_mut().push(format!("{} acquired", id));
            Coro::yield_delay(hold_ms);
            order.borrow_mut().push(format!("{} released", id));
            semaphore.release().unwrap();
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![taker(1, 500), taker(2, 800), taker(3, 500)]);

    assert_eq!(
        *order.borrow(),
        vec![
            "1 acquired",
            "2 acquired",
            "1 released",
            "3 acquired",
            "2 released",
            "3 released",
        ]
    );
    assert_eq!(semaphore.slots_remaining(), 2);
}

#[test]
fn test_slots_are_conserved() {
    let semaphore = Rc::new(Semaphore::new(3));
    let holders = Rc::new(RefCell::new(0usize));
    let violated = Rc::new(RefCell::new(false));

    let worker = {
        let semaphore = Rc::clone(&semaphore);
        let holders = Rc::clone(&holders);
        let violated = Rc::clone(&violated);
        move || {
            let semaphore = Rc::clone(&semaphore);
            let holders = Rc::clone(&holders);
            let violated = Rc::clone(&violated);
            Box::new(move || {
                for _ in 0..5 {
                    semaphore.acquire(PLATFORM_TICKS_FOREVER).unwrap();
                    *holders.borrow_mut() += 1;
                    if semaphore.slots_remaining() + *holders.borrow() != semaphore.slot_count() {
                        *violated.borrow_mut() = true;
                    }
                    Coro::yield_now();
                    *holders.borrow_mut() -= 1;
                    semaphore.release().unwrap();
                }
            }) as Box<dyn FnOnce()>
        }
    };

    common::run_coros(vec![worker(), worker(), worker(), worker(), worker()]);

    assert!(!*violated.borrow());
    assert_eq!(semaphore.slots_remaining(), 3);
}

#[test]
fn test_release_beyond_slot_count_overflows() {
    let semaphore = Rc::new(Semaphore::new(1));
    let result = Rc::new(RefCell::new(None));

    {
        let semaphore = Rc::clone(&semaphore);
        let result = Rc::clone(&result);
        common::run_coros(vec![Box::new(move || {
            *result.borrow_mut() = Some(semaphore.release());
        })]);
    }

    assert_eq!(*result.borrow(), Some(Err(Error::Overflow)));
    assert_eq!(semaphore.slots_remaining(), 1);
}

#[test]
fn test_binary_semaphore_has_one_slot() {
    let semaphore = Semaphore::binary();
    assert_eq!(semaphore.slot_count(), 1);
    assert_eq!(semaphore.slots_remaining(), 1);
}

#[test]
fn test_acquire_times_out_when_starved() {
    let semaphore = Rc::new(Semaphore::new(1));
    let result = Rc::new(RefCell::new(None));

    let hog = {
        let semaphore = Rc::clone(&semaphore);
        Box::new(move || {
            semaphore.acquire(PLATFORM_TICKS_FOREVER).unwrap();
            Coro::yield_delay(100);
            semaphore.release().unwrap();
        }) as Box<dyn FnOnce()>
    };

    let starved = {
        let semaphore = Rc::clone(&semaphore);
        let result = Rc::clone(&result);
        Box::new(move || {
            *result.borrow_mut() = Some(semaphore.acquire(20));
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![hog, starved]);
    assert_eq!(*result.borrow(), Some(Err(Error::Timeout)));
}
