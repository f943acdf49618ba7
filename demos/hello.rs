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

//! The classic hello-world alternation: two coroutines, one prints
//! "Hello ", the other "World!", yielding after every print. Round-robin
//! scheduling interleaves them into five lines of "Hello World!".

use coros::{Builder, Coro, RoundRobin};

fn main() {
    let hello = Builder::new()
        .name("hello")
        .spawn(|| {
            for _ in 0..5 {
                print!("Hello ");
                Coro::yield_now();
            }
        })
        .expect("failed to create coroutine");

    let world = Builder::new()
        .name("world")
        .spawn(|| {
            for _ in 0..5 {
                println!("World!");
                Coro::yield_now();
            }
        })
        .expect("failed to create coroutine");

    let scheduler = RoundRobin::with_coros(&[&hello, &world]);
    coros::run(&scheduler);
}
