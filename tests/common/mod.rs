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

//! Shared harness: run closures as coroutines under a fresh round-robin
//! scheduler and drive it to completion.

#![allow(dead_code)]

use coros::{Builder, CoroHandle, RoundRobin};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Spawn each entry as a coroutine, run them all to completion, and return
/// the handles for post-mortem inspection.
pub fn run_coros(entries: Vec<Box<dyn FnOnce()>>) -> Vec<CoroHandle> {
    init_logging();

    let handles: Vec<CoroHandle> = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Builder::new()
                .name(format!("coro-{}", index))
                .spawn(entry)
                .expect("failed to spawn test coroutine")
        })
        .collect();

    let refs: Vec<&CoroHandle> = handles.iter().collect();
    let scheduler = RoundRobin::with_coros(&refs);
    coros::run(&scheduler);
    handles
}
