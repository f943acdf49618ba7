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

//! Two coroutines contending for one mutex.
//!
//! Neither yields while inside the critical section, so each prints its
//! whole burst before the other gets the lock: A0..A3, then B0..B3.

use std::rc::Rc;

use coros::{Builder, Mutex, RoundRobin, PLATFORM_TICKS_FOREVER};

fn worker(tag: char, mutex: Rc<Mutex>) -> impl FnOnce() {
    move || {
        mutex
            .acquire(PLATFORM_TICKS_FOREVER)
            .expect("acquire failed");
        for step in 0..4 {
            println!("{}{}", tag, step);
        }
        mutex.release().expect("release failed");
    }
}

fn main() {
    let mutex = Rc::new(Mutex::new());

    let a = Builder::new()
        .name("a")
        .spawn(worker('A', Rc::clone(&mutex)))
        .expect("failed to create coroutine");
    let b = Builder::new()
        .name("b")
        .spawn(worker('B', Rc::clone(&mutex)))
        .expect("failed to create coroutine");

    let scheduler = RoundRobin::with_coros(&[&a, &b]);
    coros::run(&scheduler);
}
